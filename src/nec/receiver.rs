//! Receive framer.
//!
//! Watches the edge capture for activity and decides when a frame is over:
//! once edges stop arriving for a full message timeout, the buffered
//! timestamps are handed to a [`NecDecoder`] and the result is kept until the
//! application reads and resets it.
//!
//! | from   | guard             | to     | action                         |
//! |--------|-------------------|--------|--------------------------------|
//! | `Off`  | enabled           | `Idle` | start timer, arm capture       |
//! | `Idle` | disabled          | `Off`  | stop timer, disarm capture     |
//! | `Idle` | edge count moved  | `Wait` | remember count and time        |
//! | `Wait` | disabled          | `Off`  | stop, abandon partial frame    |
//! | `Wait` | edge count moved  | `Wait` | remember count and time        |
//! | `Wait` | timed out         | `Idle` | decode, store frame, clear     |

use super::decoder::NecDecoder;
use super::frame::DecodedFrame;
use super::timing::{EdgeTick, ToleranceWindows, NEC_FRAME_EDGES};
use crate::config::{ConfigError, NecConfig};
use crate::core::{FiniteStateMachine, StepResult, TransitionRule};
use crate::port::{EdgeCapture, MillisClock, TickTimer};
use crate::state_enum;

state_enum! {
    /// Receive framer state.
    pub enum RxState {
        Off,
        Idle,
        Wait,
    }
}

struct RxContext<K, T, E> {
    clock: K,
    timer: T,
    capture: E,
    decoder: Option<NecDecoder>,
    windows: ToleranceWindows,
    message_timeout_ms: u32,
    last_tick: u32,
    edges_seen: usize,
    frame: DecodedFrame,
    enabled: bool,
}

impl<K: MillisClock, T: TickTimer, E: EdgeCapture> RxContext<K, T, E> {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_disabled(&self) -> bool {
        !self.enabled
    }

    fn has_new_edges(&self) -> bool {
        self.capture.edge_count() != self.edges_seen
    }

    fn has_timed_out(&self) -> bool {
        self.clock.now_millis().wrapping_sub(self.last_tick) > self.message_timeout_ms
    }

    fn do_start(&mut self) {
        self.decoder = Some(NecDecoder::new(self.windows));
        self.timer.start();
        self.edges_seen = 0;
        self.capture.clear();
        self.capture.set_enabled(true);
        log::debug!("rx: armed");
    }

    fn do_stop(&mut self) {
        self.timer.stop();
        self.capture.set_enabled(false);
        self.decoder = None;
        self.edges_seen = 0;
        log::debug!("rx: disarmed");
    }

    fn do_note_edges(&mut self) {
        self.last_tick = self.clock.now_millis();
        self.edges_seen = self.capture.edge_count();
    }

    fn do_store_frame(&mut self) {
        let mut edges = [0 as EdgeTick; NEC_FRAME_EDGES];
        let len = self.capture.snapshot(&mut edges);

        if let Some(decoder) = self.decoder.as_mut() {
            self.frame = decoder.decode(&edges[..len]);
            if self.frame.is_repetition {
                log::info!("rx: repetition");
            } else if self.frame.is_error {
                log::warn!("rx: discarded {} noisy edges", len);
            } else {
                log::info!("rx: decoded {:#010x}", self.frame.code);
            }
        }

        self.edges_seen = 0;
        self.capture.clear();
    }
}

/// Receive framer over a clock, a tick timer and an edge capture.
///
/// A new receiver starts `Off` but already enabled, so the first
/// [`fire`](Self::fire) arms the hardware.
pub struct NecReceiver<K, T, E>
where
    K: MillisClock + 'static,
    T: TickTimer + 'static,
    E: EdgeCapture + 'static,
{
    fsm: FiniteStateMachine<RxState, RxContext<K, T, E>>,
    ctx: RxContext<K, T, E>,
}

impl<K, T, E> NecReceiver<K, T, E>
where
    K: MillisClock + 'static,
    T: TickTimer + 'static,
    E: EdgeCapture + 'static,
{
    const TABLE: &'static [TransitionRule<RxState, RxContext<K, T, E>>] = &[
        TransitionRule::new(
            RxState::Off,
            RxContext::<K, T, E>::is_enabled,
            RxState::Idle,
            Some(RxContext::<K, T, E>::do_start),
        ),
        TransitionRule::new(
            RxState::Idle,
            RxContext::<K, T, E>::is_disabled,
            RxState::Off,
            Some(RxContext::<K, T, E>::do_stop),
        ),
        TransitionRule::new(
            RxState::Idle,
            RxContext::<K, T, E>::has_new_edges,
            RxState::Wait,
            Some(RxContext::<K, T, E>::do_note_edges),
        ),
        TransitionRule::new(
            RxState::Wait,
            RxContext::<K, T, E>::is_disabled,
            RxState::Off,
            Some(RxContext::<K, T, E>::do_stop),
        ),
        TransitionRule::new(
            RxState::Wait,
            RxContext::<K, T, E>::has_new_edges,
            RxState::Wait,
            Some(RxContext::<K, T, E>::do_note_edges),
        ),
        TransitionRule::new(
            RxState::Wait,
            RxContext::<K, T, E>::has_timed_out,
            RxState::Idle,
            Some(RxContext::<K, T, E>::do_store_frame),
        ),
    ];

    /// Build a receiver from a config that passes [`NecConfig::validate`].
    ///
    /// # Panics
    ///
    /// Panics if the config is rejected. Use [`try_new`](Self::try_new) for
    /// configs loaded at runtime.
    pub fn new(clock: K, timer: T, capture: E, config: &NecConfig) -> Self {
        match Self::try_new(clock, timer, capture, config) {
            Ok(receiver) => receiver,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build a receiver, rejecting a config that fails validation.
    pub fn try_new(
        clock: K,
        timer: T,
        capture: E,
        config: &NecConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fsm: FiniteStateMachine::new(Self::TABLE),
            ctx: RxContext {
                clock,
                timer,
                capture,
                decoder: None,
                windows: config.windows(),
                message_timeout_ms: config.message_timeout_ms,
                last_tick: 0,
                edges_seen: 0,
                frame: DecodedFrame::default(),
                enabled: true,
            },
        })
    }

    /// Run one step of the framer. Never blocks.
    pub fn fire(&mut self) -> StepResult<RxState> {
        self.fsm.fire(&mut self.ctx)
    }

    /// Last decoded code, 0 when nothing is pending.
    pub fn code(&self) -> u32 {
        self.ctx.frame.code
    }

    pub fn is_repetition(&self) -> bool {
        self.ctx.frame.is_repetition
    }

    pub fn is_error(&self) -> bool {
        self.ctx.frame.is_error
    }

    /// The last decoded frame as a whole.
    pub fn frame(&self) -> DecodedFrame {
        self.ctx.frame
    }

    /// Mark the pending frame as consumed.
    ///
    /// A frame that arrives before this call overwrites the previous one.
    pub fn reset_code(&mut self) {
        self.ctx.frame = DecodedFrame::default();
    }

    /// Request the receiver on or off. Takes effect on the next `fire`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.ctx.enabled = enabled;
    }

    /// True while a frame is being received.
    pub fn is_active(&self) -> bool {
        self.fsm.current_state() == RxState::Wait
    }

    pub fn state(&self) -> RxState {
        self.fsm.current_state()
    }

    /// Stop the hardware and hand the collaborators back.
    pub fn destroy(self) -> (K, T, E) {
        let Self { fsm, mut ctx } = self;
        fsm.destroy();
        ctx.timer.stop();
        ctx.capture.set_enabled(false);
        (ctx.clock, ctx.timer, ctx.capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::NecTiming;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct TestClock(Rc<Cell<u32>>);

    impl TestClock {
        fn advance(&self, ms: u32) {
            self.0.set(self.0.get().wrapping_add(ms));
        }
    }

    impl MillisClock for TestClock {
        fn now_millis(&self) -> u32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct TestTimer {
        running: bool,
    }

    impl TickTimer for TestTimer {
        fn start(&mut self) {
            self.running = true;
        }

        fn stop(&mut self) {
            self.running = false;
        }

        fn current_tick(&self) -> u32 {
            0
        }
    }

    #[derive(Clone, Default)]
    struct TestCapture {
        edges: Rc<RefCell<Vec<EdgeTick>>>,
        enabled: Rc<Cell<bool>>,
    }

    impl TestCapture {
        fn push(&self, edges: &[EdgeTick]) {
            self.edges.borrow_mut().extend_from_slice(edges);
        }
    }

    impl EdgeCapture for TestCapture {
        fn edge_count(&self) -> usize {
            self.edges.borrow().len()
        }

        fn snapshot(&self, out: &mut [EdgeTick; NEC_FRAME_EDGES]) -> usize {
            let edges = self.edges.borrow();
            let len = edges.len().min(NEC_FRAME_EDGES);
            out[..len].copy_from_slice(&edges[..len]);
            len
        }

        fn clear(&mut self) {
            self.edges.borrow_mut().clear();
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled.set(enabled);
        }
    }

    type TestReceiver = NecReceiver<TestClock, TestTimer, TestCapture>;

    fn receiver() -> (TestReceiver, TestClock, TestCapture) {
        let clock = TestClock::default();
        let capture = TestCapture::default();
        let rx = NecReceiver::new(
            clock.clone(),
            TestTimer::default(),
            capture.clone(),
            &NecConfig::default(),
        );
        (rx, clock, capture)
    }

    #[test]
    fn rejects_config_that_fails_validation() {
        let config = NecConfig {
            tolerance_percent: 100,
            ..NecConfig::default()
        };
        let result = NecReceiver::try_new(
            TestClock::default(),
            TestTimer::default(),
            TestCapture::default(),
            &config,
        );
        assert!(matches!(result, Err(ConfigError::ToleranceTooWide(100))));

        let config = NecConfig {
            tolerance_percent: 60,
            ..NecConfig::default()
        };
        let result = NecReceiver::try_new(
            TestClock::default(),
            TestTimer::default(),
            TestCapture::default(),
            &config,
        );
        assert!(matches!(
            result,
            Err(ConfigError::OverlappingWindows("lead_space", "repeat_space"))
        ));
    }

    #[test]
    #[should_panic]
    fn new_panics_on_invalid_config() {
        let config = NecConfig {
            message_timeout_ms: 0,
            ..NecConfig::default()
        };
        let _ = NecReceiver::new(
            TestClock::default(),
            TestTimer::default(),
            TestCapture::default(),
            &config,
        );
    }

    #[test]
    fn valid_config_decodes_full_command() {
        let config = NecConfig {
            tolerance_percent: 30,
            ..NecConfig::default()
        };
        let clock = TestClock::default();
        let capture = TestCapture::default();
        let mut rx =
            NecReceiver::try_new(clock.clone(), TestTimer::default(), capture.clone(), &config)
                .unwrap();
        rx.fire();

        capture.push(&NecTiming::STANDARD.ideal_capture(0x00FF_00FF, 0));
        rx.fire();
        clock.advance(21);
        rx.fire();

        assert_eq!(rx.code(), 0x00FF_00FF);
        assert!(!rx.is_repetition());
    }

    #[test]
    fn first_fire_arms_capture() {
        let (mut rx, _, capture) = receiver();
        assert_eq!(rx.state(), RxState::Off);

        let step = rx.fire();

        assert_eq!(
            step,
            StepResult::Transitioned {
                from: RxState::Off,
                to: RxState::Idle
            }
        );
        assert!(capture.enabled.get());
        assert!(rx.ctx.timer.running);
        assert!(rx.ctx.decoder.is_some());
    }

    #[test]
    fn idle_without_edges_stays_idle() {
        let (mut rx, clock, _) = receiver();
        rx.fire();

        clock.advance(100);
        assert_eq!(rx.fire(), StepResult::Stayed(RxState::Idle));
        assert!(!rx.is_active());
    }

    #[test]
    fn frame_is_decoded_after_timeout() {
        let (mut rx, clock, capture) = receiver();
        rx.fire();

        capture.push(&NecTiming::STANDARD.ideal_capture(0x00FF_00FF, 0));
        rx.fire();
        assert!(rx.is_active());

        clock.advance(20);
        assert_eq!(rx.fire(), StepResult::Stayed(RxState::Wait));

        clock.advance(1);
        rx.fire();

        assert_eq!(rx.state(), RxState::Idle);
        assert_eq!(rx.code(), 0x00FF_00FF);
        assert!(!rx.is_error());
        assert!(!rx.is_repetition());
        assert_eq!(capture.edge_count(), 0);
    }

    #[test]
    fn new_edges_restart_the_timeout() {
        let (mut rx, clock, capture) = receiver();
        rx.fire();

        let edges = NecTiming::STANDARD.ideal_capture(0x1234_5678, 0);
        capture.push(&edges[..30]);
        rx.fire();

        clock.advance(15);
        capture.push(&edges[30..]);
        assert!(rx.fire().is_transition());
        assert_eq!(rx.state(), RxState::Wait);

        clock.advance(15);
        rx.fire();
        assert_eq!(rx.state(), RxState::Wait);

        clock.advance(10);
        rx.fire();
        assert_eq!(rx.code(), 0x1234_5678);
    }

    #[test]
    fn noise_sets_error() {
        let (mut rx, clock, capture) = receiver();
        rx.fire();

        capture.push(&[0, 5, 9]);
        rx.fire();
        clock.advance(25);
        rx.fire();

        assert!(rx.is_error());
        assert_eq!(rx.code(), 0);
    }

    #[test]
    fn reset_code_clears_frame() {
        let (mut rx, clock, capture) = receiver();
        rx.fire();
        capture.push(&NecTiming::STANDARD.ideal_repetition(0));
        rx.fire();
        clock.advance(21);
        rx.fire();
        assert!(rx.is_repetition());

        rx.reset_code();

        assert_eq!(rx.frame(), DecodedFrame::default());
    }

    #[test]
    fn disable_from_idle_turns_off() {
        let (mut rx, _, capture) = receiver();
        rx.fire();

        rx.set_enabled(false);
        rx.fire();

        assert_eq!(rx.state(), RxState::Off);
        assert!(!capture.enabled.get());
        assert!(!rx.ctx.timer.running);
        assert!(rx.ctx.decoder.is_none());
    }

    #[test]
    fn disable_mid_frame_abandons_it() {
        let (mut rx, clock, capture) = receiver();
        rx.fire();
        capture.push(&[0, 160, 240]);
        rx.fire();

        rx.set_enabled(false);
        assert!(rx.fire().is_transition());
        assert_eq!(rx.state(), RxState::Off);

        clock.advance(50);
        rx.fire();
        assert_eq!(rx.code(), 0);
        assert!(!rx.is_error());

        rx.set_enabled(true);
        rx.fire();
        assert_eq!(rx.state(), RxState::Idle);
        assert_eq!(capture.edge_count(), 0);
    }

    #[test]
    fn timeout_survives_clock_wraparound() {
        let (mut rx, clock, capture) = receiver();
        clock.advance(u32::MAX - 5);
        rx.fire();

        capture.push(&NecTiming::STANDARD.ideal_repetition(100));
        rx.fire();

        clock.advance(10);
        rx.fire();
        assert_eq!(rx.state(), RxState::Wait);

        clock.advance(11);
        rx.fire();
        assert!(rx.is_repetition());
    }

    #[test]
    fn destroy_returns_collaborators_stopped() {
        let (mut rx, _, capture) = receiver();
        rx.fire();

        let (_, timer, returned) = rx.destroy();

        assert!(!timer.running);
        assert!(!capture.enabled.get());
        assert_eq!(returned.edge_count(), 0);
    }
}
