//! Node configuration.
//!
//! Everything timing-related that a board may want to tune lives in
//! [`NecConfig`]. It deserializes from JSON with every field optional, and
//! [`NecConfig::validate`] rejects settings the codec cannot work with.
//!
//! ```rust
//! use nec_node::config::NecConfig;
//!
//! let config = NecConfig::from_json(r#"{ "tolerance_percent": 20 }"#).unwrap();
//! assert_eq!(config.tolerance_percent, 20);
//! assert_eq!(config.message_timeout_ms, 20);
//! ```

use crate::nec::{
    NecTiming, PwmSetup, TimeBase, ToleranceWindows, NEC_CARRIER_HZ, NEC_DUTY_CYCLE,
    NEC_MESSAGE_TIMEOUT_MS, NEC_TICK_BASE_US, NEC_TOLERANCE_PERCENT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Tick base must be a positive number of microseconds, got {0}")]
    InvalidTickBase(f32),

    #[error("Tolerance must be below 100%, got {0}%")]
    ToleranceTooWide(u8),

    #[error("Decode windows '{0}' and '{1}' overlap; lower the tolerance")]
    OverlappingWindows(&'static str, &'static str),

    #[error("Message timeout must be at least 1 ms")]
    ZeroMessageTimeout,

    #[error("Carrier duty cycle must be in (0, 1], got {0}")]
    InvalidDutyCycle(f32),

    #[error("Carrier frequency must be nonzero")]
    ZeroCarrier,
}

/// Timing and carrier settings shared by the receiver and transmitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NecConfig {
    /// Microseconds per tick on both the capture and the symbol timer.
    ///
    /// Port setting: the components count in ticks and never read it. A port
    /// programs its timers from [`NecConfig::time_base`].
    pub tick_base_us: f32,

    /// Receive tolerance around each nominal duration, in percent
    pub tolerance_percent: u8,

    /// Silence (ms) after the last edge that closes a frame
    pub message_timeout_ms: u32,

    /// Transmit carrier frequency. Port setting, see [`NecConfig::pwm_setup`].
    pub carrier_hz: u32,

    /// Transmit carrier duty cycle. Port setting, see [`NecConfig::pwm_setup`].
    pub duty_cycle: f32,

    /// Burst table in ticks
    pub timing: NecTiming,
}

impl Default for NecConfig {
    fn default() -> Self {
        Self {
            tick_base_us: NEC_TICK_BASE_US,
            tolerance_percent: NEC_TOLERANCE_PERCENT,
            message_timeout_ms: NEC_MESSAGE_TIMEOUT_MS,
            carrier_hz: NEC_CARRIER_HZ,
            duty_cycle: NEC_DUTY_CYCLE,
            timing: NecTiming::STANDARD,
        }
    }
}

impl NecConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: NecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_base_us.is_finite() && self.tick_base_us > 0.0) {
            return Err(ConfigError::InvalidTickBase(self.tick_base_us));
        }
        if self.tolerance_percent >= 100 {
            return Err(ConfigError::ToleranceTooWide(self.tolerance_percent));
        }
        if let Some((a, b)) = self.windows().first_overlap() {
            return Err(ConfigError::OverlappingWindows(a, b));
        }
        if self.message_timeout_ms == 0 {
            return Err(ConfigError::ZeroMessageTimeout);
        }
        if !(self.duty_cycle > 0.0 && self.duty_cycle <= 1.0) {
            return Err(ConfigError::InvalidDutyCycle(self.duty_cycle));
        }
        if self.carrier_hz == 0 {
            return Err(ConfigError::ZeroCarrier);
        }
        Ok(())
    }

    /// Receive windows derived from the burst table and tolerance.
    pub fn windows(&self) -> ToleranceWindows {
        ToleranceWindows::from_timing(&self.timing, self.tolerance_percent)
    }

    /// Tick arithmetic for the port's capture and symbol timers.
    pub fn time_base(&self) -> TimeBase {
        TimeBase::new(self.tick_base_us)
    }

    /// Carrier PWM settings for a timer clocked at `clock_hz`.
    pub fn pwm_setup(&self, clock_hz: u32) -> PwmSetup {
        PwmSetup::for_clock(clock_hz, self.carrier_hz, self.duty_cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::{Burst, Window};

    #[test]
    fn default_config_is_valid() {
        assert!(NecConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = NecConfig::from_json("{}").unwrap();
        assert_eq!(config, NecConfig::default());
    }

    #[test]
    fn partial_timing_overrides_merge_with_standard() {
        let config =
            NecConfig::from_json(r#"{ "timing": { "epilogue": { "on": 10, "off": 1000 } } }"#)
                .unwrap();

        assert_eq!(config.timing.epilogue, Burst::new(10, 1000));
        assert_eq!(config.timing.prologue, NecTiming::STANDARD.prologue);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let result = NecConfig::from_json("{ tolerance_percent: }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_full_tolerance() {
        let result = NecConfig::from_json(r#"{ "tolerance_percent": 100 }"#);
        assert!(matches!(result, Err(ConfigError::ToleranceTooWide(100))));
    }

    #[test]
    fn rejects_overlapping_windows() {
        let result = NecConfig::from_json(r#"{ "tolerance_percent": 60 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::OverlappingWindows("lead_space", "repeat_space"))
        ));
    }

    #[test]
    fn rejects_bad_tick_base_and_duty() {
        let config = NecConfig {
            tick_base_us: 0.0,
            ..NecConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTickBase(_))
        ));

        let config = NecConfig {
            duty_cycle: 1.5,
            ..NecConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDutyCycle(_))
        ));
    }

    #[test]
    fn rejects_zero_timeout_and_carrier() {
        let config = NecConfig {
            message_timeout_ms: 0,
            ..NecConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroMessageTimeout)
        ));

        let config = NecConfig {
            carrier_hz: 0,
            ..NecConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCarrier)));
    }

    #[test]
    fn windows_follow_tolerance() {
        let config = NecConfig {
            tolerance_percent: 10,
            ..NecConfig::default()
        };
        assert_eq!(config.windows().lead_mark, Window::new(144, 176));
    }

    #[test]
    fn port_settings_drive_timer_arithmetic() {
        let config = NecConfig::default();

        let time_base = config.time_base();
        assert_eq!(time_base.ticks_from_micros(9_000), 160);
        assert_eq!(time_base.reload_for_clock(16_000_000), 899);

        let pwm = config.pwm_setup(16_000_000);
        assert_eq!(pwm, PwmSetup { reload: 420, compare: 210 });
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = NecConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(NecConfig::from_json(&json).unwrap(), config);
    }
}
