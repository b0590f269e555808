//! Transmitter.
//!
//! A single-state machine: whenever a nonzero code is pending, `fire` sends
//! it as one blocking NEC frame and clears it. The carrier is keyed through
//! an [`OutputPin`] (high = carrier on) and every burst is timed by
//! busy-waiting on a [`TickTimer`].

use super::timing::{Burst, NecTiming, NEC_FRAME_BITS};
use crate::config::{ConfigError, NecConfig};
use crate::core::{FiniteStateMachine, StepResult, TransitionRule};
use crate::port::TickTimer;
use crate::state_enum;
use embedded_hal::digital::OutputPin;
use std::fmt::Debug;
use thiserror::Error;

state_enum! {
    /// Transmitter state. There is only one: frames are sent inside `fire`.
    pub enum TxState {
        Waiting,
    }
}

/// Errors that can occur when sending a frame directly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransmitError<E: Debug> {
    #[error("Carrier pin failed: {0:?}")]
    Carrier(E),

    #[error("Code 0 is reserved for 'nothing pending'")]
    ReservedCode,
}

struct TxContext<T, P> {
    timer: T,
    carrier: P,
    timing: NecTiming,
    code: u32,
}

impl<T: TickTimer, P: OutputPin> TxContext<T, P> {
    fn has_pending_code(&self) -> bool {
        self.code != 0
    }

    fn do_transmit(&mut self) {
        let code = self.code;
        log::debug!("tx: sending {:#010x}", code);
        if let Err(err) = self.encode(code) {
            log::error!("tx: carrier failed, frame {:#010x} aborted: {:?}", code, err);
        }
        self.code = 0;
    }

    /// Send one complete frame, most significant bit first.
    fn encode(&mut self, code: u32) -> Result<(), P::Error> {
        self.timer.start();
        let result = self.send_bursts(code);
        if result.is_err() {
            let _ = self.carrier.set_low();
        }
        self.timer.stop();
        result
    }

    fn send_bursts(&mut self, code: u32) -> Result<(), P::Error> {
        self.burst(self.timing.prologue)?;
        for bit in (0..NEC_FRAME_BITS).rev() {
            self.burst(self.timing.bit(code & (1 << bit) != 0))?;
        }
        self.burst(self.timing.epilogue)
    }

    fn burst(&mut self, burst: Burst) -> Result<(), P::Error> {
        self.carrier.set_high()?;
        self.wait_ticks(burst.on);
        self.carrier.set_low()?;
        self.wait_ticks(burst.off);
        Ok(())
    }

    fn wait_ticks(&self, ticks: u32) {
        let start = self.timer.current_tick();
        while self.timer.current_tick().wrapping_sub(start) < ticks {
            std::hint::spin_loop();
        }
    }
}

/// NEC transmitter over a symbol timer and a carrier pin.
///
/// ```rust
/// # use nec_node::config::NecConfig;
/// # use nec_node::nec::NecTransmitter;
/// # use nec_node::port::TickTimer;
/// # use std::cell::Cell;
/// # use std::convert::Infallible;
/// # struct Counter(Cell<u32>);
/// # impl TickTimer for Counter {
/// #     fn start(&mut self) { self.0.set(0) }
/// #     fn stop(&mut self) {}
/// #     fn current_tick(&self) -> u32 { let t = self.0.get(); self.0.set(t + 1); t }
/// # }
/// # struct Led;
/// # impl embedded_hal::digital::ErrorType for Led { type Error = Infallible; }
/// # impl embedded_hal::digital::OutputPin for Led {
/// #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
/// let mut tx = NecTransmitter::new(Counter(Cell::new(0)), Led, &NecConfig::default());
///
/// tx.set_code(0x00FF_30CF);
/// assert!(tx.fire().is_transition());
/// assert_eq!(tx.code(), 0);
/// assert!(!tx.fire().is_transition());
/// ```
pub struct NecTransmitter<T, P>
where
    T: TickTimer + 'static,
    P: OutputPin + 'static,
{
    fsm: FiniteStateMachine<TxState, TxContext<T, P>>,
    ctx: TxContext<T, P>,
}

impl<T, P> NecTransmitter<T, P>
where
    T: TickTimer + 'static,
    P: OutputPin + 'static,
{
    const TABLE: &'static [TransitionRule<TxState, TxContext<T, P>>] = &[TransitionRule::new(
        TxState::Waiting,
        TxContext::<T, P>::has_pending_code,
        TxState::Waiting,
        Some(TxContext::<T, P>::do_transmit),
    )];

    /// Build a transmitter from a config that passes [`NecConfig::validate`].
    ///
    /// # Panics
    ///
    /// Panics if the config is rejected. Use [`try_new`](Self::try_new) for
    /// configs loaded at runtime.
    pub fn new(timer: T, carrier: P, config: &NecConfig) -> Self {
        match Self::try_new(timer, carrier, config) {
            Ok(transmitter) => transmitter,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build a transmitter, rejecting a config that fails validation.
    pub fn try_new(timer: T, carrier: P, config: &NecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fsm: FiniteStateMachine::new(Self::TABLE),
            ctx: TxContext {
                timer,
                carrier,
                timing: config.timing,
                code: 0,
            },
        })
    }

    /// Queue a code for the next `fire`. Zero is ignored; the last write wins.
    pub fn set_code(&mut self, code: u32) {
        if code != 0 {
            self.ctx.code = code;
        }
    }

    /// Code waiting to be sent, 0 when none.
    pub fn code(&self) -> u32 {
        self.ctx.code
    }

    /// Send the pending code, if any. Blocks for the whole frame.
    pub fn fire(&mut self) -> StepResult<TxState> {
        self.fsm.fire(&mut self.ctx)
    }

    /// Send `code` immediately, bypassing the pending slot.
    pub fn send_now(&mut self, code: u32) -> Result<(), TransmitError<P::Error>> {
        if code == 0 {
            return Err(TransmitError::ReservedCode);
        }
        log::debug!("tx: sending {:#010x}", code);
        self.ctx.encode(code).map_err(TransmitError::Carrier)
    }

    /// Sending happens entirely inside `fire`, so this is always false.
    pub fn is_active(&self) -> bool {
        self.fsm.current_state() != TxState::Waiting
    }

    pub fn destroy(self) -> (T, P) {
        let Self { fsm, ctx } = self;
        fsm.destroy();
        (ctx.timer, ctx.carrier)
    }
}
