//! NEC protocol constants, tolerance windows and tick arithmetic.
//!
//! Every duration in this crate is counted in ticks of a fixed time base
//! (56.25 µs by default, i.e. 1/10 of a bit mark). At that base the canonical
//! NEC timings become small integers:
//!
//! ```text
//!  lead mark    9 ms      160 ticks
//!  lead space   4.5 ms     80 ticks
//!  repeat space 2.25 ms    40 ticks
//!  bit mark     562.5 µs   10 ticks
//!  zero space   562.5 µs   10 ticks
//!  one space    1687.5 µs  30 ticks
//! ```
//!
//! Counters wrap at their fixed width, so every elapsed-time computation is a
//! wrapping subtraction.

use serde::{Deserialize, Serialize};

/// Width of a captured edge timestamp.
pub type EdgeTick = u16;

/// Data bits in one frame.
pub const NEC_FRAME_BITS: u8 = 32;

/// Edges a complete frame can leave in the capture buffer.
///
/// Prologue (2) + 32 bits × 2 + stop (1).
pub const NEC_FRAME_EDGES: usize = 2 + 2 * NEC_FRAME_BITS as usize + 1;

/// Default tick base in microseconds.
pub const NEC_TICK_BASE_US: f32 = 56.25;

/// Carrier frequency of the transmit PWM.
pub const NEC_CARRIER_HZ: u32 = 38_000;

/// Carrier duty cycle (0..=1).
pub const NEC_DUTY_CYCLE: f32 = 0.5;

/// Default receive tolerance around each nominal duration.
pub const NEC_TOLERANCE_PERCENT: u8 = 25;

/// Default silence after the last edge that closes a frame.
pub const NEC_MESSAGE_TIMEOUT_MS: u32 = 20;

/// Ticks elapsed from `earlier` to `later` on a wrapping counter.
///
/// ```rust
/// use nec_node::nec::ticks_between;
///
/// assert_eq!(ticks_between(100, 260), 160);
/// assert_eq!(ticks_between(65_500, 124), 160);
/// ```
pub fn ticks_between(earlier: EdgeTick, later: EdgeTick) -> EdgeTick {
    later.wrapping_sub(earlier)
}

/// One carrier burst followed by a silence, in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    pub on: u32,
    pub off: u32,
}

impl Burst {
    pub const fn new(on: u32, off: u32) -> Self {
        Self { on, off }
    }

    /// Total length of the burst in ticks.
    pub fn total(&self) -> u32 {
        self.on + self.off
    }
}

/// Transmit burst table. The receive windows are derived from it too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NecTiming {
    /// Lead mark and lead space
    pub prologue: Burst,
    /// Logical `0`
    pub zero: Burst,
    /// Logical `1`
    pub one: Burst,
    /// Stop mark and trailing inter-frame gap (~200 ms)
    pub epilogue: Burst,
    /// Space after the lead mark of a repetition code
    pub repeat_space: u32,
}

impl NecTiming {
    pub const STANDARD: NecTiming = NecTiming {
        prologue: Burst::new(160, 80),
        zero: Burst::new(10, 10),
        one: Burst::new(10, 30),
        epilogue: Burst::new(10, 3560),
        repeat_space: 40,
    };

    /// The burst encoding a single bit.
    pub fn bit(&self, set: bool) -> Burst {
        if set {
            self.one
        } else {
            self.zero
        }
    }

    /// Timestamps a jitter-free capture of `code` would hold, starting at
    /// `start`.
    ///
    /// The capture stops at capacity, so the edge closing the stop mark is
    /// not included.
    pub fn ideal_capture(&self, code: u32, start: EdgeTick) -> [EdgeTick; NEC_FRAME_EDGES] {
        let mut edges = [0; NEC_FRAME_EDGES];
        let mut now = start;
        let mut idx = 0;
        let mut push = |delta: u32| {
            now = now.wrapping_add(delta as EdgeTick);
            if idx < NEC_FRAME_EDGES {
                edges[idx] = now;
                idx += 1;
            }
        };

        push(0);
        push(self.prologue.on);
        push(self.prologue.off);
        for bit in (0..NEC_FRAME_BITS).rev() {
            let burst = self.bit(code & (1 << bit) != 0);
            push(burst.on);
            push(burst.off);
        }
        push(self.epilogue.on);
        edges
    }

    /// Timestamps of a jitter-free repetition code starting at `start`.
    pub fn ideal_repetition(&self, start: EdgeTick) -> [EdgeTick; 4] {
        let lead_end = start.wrapping_add(self.prologue.on as EdgeTick);
        let space_end = lead_end.wrapping_add(self.repeat_space as EdgeTick);
        [
            start,
            lead_end,
            space_end,
            space_end.wrapping_add(self.zero.on as EdgeTick),
        ]
    }
}

impl Default for NecTiming {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Inclusive range of accepted tick counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub min: EdgeTick,
    pub max: EdgeTick,
}

impl Window {
    pub const fn new(min: EdgeTick, max: EdgeTick) -> Self {
        Self { min, max }
    }

    /// Widen `nominal` by `tolerance_percent` on each side.
    ///
    /// The lower bound rounds down and the upper bound rounds up, so the
    /// nominal value is always inside.
    pub fn around(nominal: u32, tolerance_percent: u8) -> Self {
        let tol = u64::from(tolerance_percent);
        let nominal = u64::from(nominal);
        let min = nominal * 100u64.saturating_sub(tol) / 100;
        let max = (nominal * (100 + tol)).div_ceil(100);
        Self {
            min: clamp_tick(min),
            max: clamp_tick(max),
        }
    }

    pub fn contains(&self, ticks: EdgeTick) -> bool {
        ticks >= self.min && ticks <= self.max
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

fn clamp_tick(value: u64) -> EdgeTick {
    EdgeTick::try_from(value).unwrap_or(EdgeTick::MAX)
}

/// Accepted tick ranges for every interval the decoder classifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceWindows {
    pub lead_mark: Window,
    pub lead_space: Window,
    pub repeat_space: Window,
    pub bit_mark: Window,
    pub zero_space: Window,
    pub one_space: Window,
}

impl ToleranceWindows {
    pub fn from_timing(timing: &NecTiming, tolerance_percent: u8) -> Self {
        Self {
            lead_mark: Window::around(timing.prologue.on, tolerance_percent),
            lead_space: Window::around(timing.prologue.off, tolerance_percent),
            repeat_space: Window::around(timing.repeat_space, tolerance_percent),
            bit_mark: Window::around(timing.zero.on, tolerance_percent),
            zero_space: Window::around(timing.zero.off, tolerance_percent),
            one_space: Window::around(timing.one.off, tolerance_percent),
        }
    }

    /// Windows that must stay disjoint for decoding to be unambiguous.
    ///
    /// Returns the names of the first overlapping pair found.
    pub fn first_overlap(&self) -> Option<(&'static str, &'static str)> {
        if self.lead_space.overlaps(&self.repeat_space) {
            return Some(("lead_space", "repeat_space"));
        }
        if self.zero_space.overlaps(&self.one_space) {
            return Some(("zero_space", "one_space"));
        }
        None
    }
}

impl Default for ToleranceWindows {
    fn default() -> Self {
        Self::from_timing(&NecTiming::STANDARD, NEC_TOLERANCE_PERCENT)
    }
}

/// Conversion between microseconds and ticks of a fixed time base.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeBase {
    pub tick_us: f32,
}

impl TimeBase {
    pub const fn new(tick_us: f32) -> Self {
        Self { tick_us }
    }

    /// Nearest whole number of ticks covering `micros`.
    pub fn ticks_from_micros(&self, micros: u32) -> u32 {
        (micros as f32 / self.tick_us).round() as u32
    }

    pub fn micros_from_ticks(&self, ticks: u32) -> u32 {
        (ticks as f32 * self.tick_us).round() as u32
    }

    /// Auto-reload value for a timer clocked at `clock_hz` with no prescaler
    /// so that it overflows once per tick.
    pub fn reload_for_clock(&self, clock_hz: u32) -> u32 {
        let cycles = (f64::from(clock_hz) * f64::from(self.tick_us) / 1_000_000.0) as u32;
        cycles.saturating_sub(1)
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new(NEC_TICK_BASE_US)
    }
}

/// Reload/compare pair producing the transmit carrier on a PWM timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwmSetup {
    pub reload: u32,
    pub compare: u32,
}

impl PwmSetup {
    /// Carrier of `carrier_hz` at `duty` (0..=1) on a timer clocked at
    /// `clock_hz` with no prescaler.
    pub fn for_clock(clock_hz: u32, carrier_hz: u32, duty: f32) -> Self {
        let period = clock_hz / carrier_hz.max(1);
        let reload = period.saturating_sub(1);
        let compare = (duty.clamp(0.0, 1.0) * (reload + 1) as f32) as u32;
        Self { reload, compare }
    }
}
