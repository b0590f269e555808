//! NEC frame decoder.
//!
//! The decoder walks a captured sequence of edge timestamps and classifies
//! the interval between each edge and the next against the configured
//! [`ToleranceWindows`]. It is a four-state machine:
//!
//! ```text
//!            lead mark                lead space / repeat space
//!   Idle  ─────────────▶  Init  ───────────────────────────────▶  SymbolSilence
//!    ▲ ▲ (noise: skip 2)    │ noise                                 │   ▲
//!    │ └────────────────────┘                             bit mark  │   │ zero/one space
//!    │                                                              ▼   │
//!    └──────── noise / all bits read ─────────────────────────  SymbolPulse
//! ```
//!
//! An IR receiver module demodulates the carrier and drives its output low
//! while the carrier is present, so the intervals the state names call
//! "silence" are carrier bursts (marks) and the "pulses" are spaces.
//!
//! Decoding runs to completion in one call: the machine is fired until fewer
//! than two edges are left to read.

use super::frame::DecodedFrame;
use super::timing::{
    ticks_between, EdgeTick, ToleranceWindows, Window, NEC_FRAME_BITS, NEC_FRAME_EDGES,
};
use crate::core::{FiniteStateMachine, TransitionRule};
use crate::state_enum;

state_enum! {
    /// Decoder position within a frame.
    pub enum DecoderState {
        /// Expecting the lead mark at an even edge
        Idle,
        /// Expecting the lead space or repeat space at an odd edge
        Init,
        /// Expecting the mark that opens a bit
        SymbolSilence,
        /// Expecting the space whose length is the bit value
        SymbolPulse,
    }
}

struct DecoderContext {
    edges: [EdgeTick; NEC_FRAME_EDGES],
    cursor: usize,
    remaining: usize,
    bits_remaining: u8,
    code: u32,
    is_repetition: bool,
    complete: bool,
    windows: ToleranceWindows,
}

impl DecoderContext {
    fn new(windows: ToleranceWindows) -> Self {
        Self {
            edges: [0; NEC_FRAME_EDGES],
            cursor: 0,
            remaining: 0,
            bits_remaining: 0,
            code: 0,
            is_repetition: false,
            complete: false,
            windows,
        }
    }

    fn load(&mut self, edges: &[EdgeTick]) {
        let len = edges.len().min(NEC_FRAME_EDGES);
        self.edges[..len].copy_from_slice(&edges[..len]);
        self.cursor = 0;
        self.remaining = len;
        self.bits_remaining = 0;
        self.code = 0;
        self.is_repetition = false;
        self.complete = false;
    }

    /// Ticks between the current edge and the next one.
    fn interval(&self) -> Option<EdgeTick> {
        if self.remaining < 2 {
            return None;
        }
        let current = *self.edges.get(self.cursor)?;
        let next = *self.edges.get(self.cursor + 1)?;
        Some(ticks_between(current, next))
    }

    fn interval_in(&self, window: Window) -> bool {
        self.interval().is_some_and(|ticks| window.contains(ticks))
    }

    fn advance(&mut self, edges: usize) {
        self.cursor += edges;
        self.remaining = self.remaining.saturating_sub(edges);
    }

    fn push_bit(&mut self, set: bool) {
        self.code = (self.code << 1) | u32::from(set);
        self.bits_remaining = self.bits_remaining.saturating_sub(1);
        if self.bits_remaining == 0 {
            self.complete = true;
        }
        self.advance(1);
    }
}

fn is_lead_mark(ctx: &DecoderContext) -> bool {
    ctx.interval_in(ctx.windows.lead_mark)
}

fn is_lead_mark_noise(ctx: &DecoderContext) -> bool {
    !is_lead_mark(ctx)
}

fn is_lead_space(ctx: &DecoderContext) -> bool {
    ctx.interval_in(ctx.windows.lead_space)
}

fn is_repeat_space(ctx: &DecoderContext) -> bool {
    ctx.interval_in(ctx.windows.repeat_space)
}

fn is_lead_space_noise(ctx: &DecoderContext) -> bool {
    !is_lead_space(ctx) && !is_repeat_space(ctx)
}

fn is_last_symbol(ctx: &DecoderContext) -> bool {
    ctx.bits_remaining == 0
}

fn is_bit_mark(ctx: &DecoderContext) -> bool {
    !is_last_symbol(ctx) && ctx.interval_in(ctx.windows.bit_mark)
}

fn is_bit_mark_noise(ctx: &DecoderContext) -> bool {
    !is_last_symbol(ctx) && !ctx.interval_in(ctx.windows.bit_mark)
}

fn is_zero_space(ctx: &DecoderContext) -> bool {
    ctx.interval_in(ctx.windows.zero_space)
}

fn is_one_space(ctx: &DecoderContext) -> bool {
    ctx.interval_in(ctx.windows.one_space)
}

fn is_bit_space_noise(ctx: &DecoderContext) -> bool {
    !is_zero_space(ctx) && !is_one_space(ctx)
}

fn do_next_edge(ctx: &mut DecoderContext) {
    ctx.advance(1);
}

fn do_reset_and_next_edge(ctx: &mut DecoderContext) {
    ctx.code = 0;
    ctx.complete = false;
    ctx.advance(1);
}

fn do_skip_pair(ctx: &mut DecoderContext) {
    ctx.advance(2);
}

fn do_command_starts(ctx: &mut DecoderContext) {
    ctx.bits_remaining = NEC_FRAME_BITS;
    ctx.is_repetition = false;
    ctx.advance(1);
}

fn do_repetition_starts(ctx: &mut DecoderContext) {
    ctx.bits_remaining = 0;
    ctx.is_repetition = true;
    ctx.complete = true;
    ctx.advance(1);
}

fn do_store_zero(ctx: &mut DecoderContext) {
    ctx.push_bit(false);
}

fn do_store_one(ctx: &mut DecoderContext) {
    ctx.push_bit(true);
}

fn do_set_end(ctx: &mut DecoderContext) {
    ctx.remaining = 0;
}

use DecoderState::{Idle, Init, SymbolPulse, SymbolSilence};

const DECODER_TABLE: &[TransitionRule<DecoderState, DecoderContext>] = &[
    TransitionRule::new(Idle, is_lead_mark, Init, Some(do_reset_and_next_edge)),
    TransitionRule::new(Idle, is_lead_mark_noise, Idle, Some(do_skip_pair)),
    TransitionRule::new(Init, is_lead_space_noise, Idle, Some(do_next_edge)),
    TransitionRule::new(Init, is_repeat_space, SymbolSilence, Some(do_repetition_starts)),
    TransitionRule::new(Init, is_lead_space, SymbolSilence, Some(do_command_starts)),
    TransitionRule::new(SymbolSilence, is_last_symbol, Idle, Some(do_set_end)),
    TransitionRule::new(SymbolSilence, is_bit_mark_noise, Idle, None),
    TransitionRule::new(SymbolSilence, is_bit_mark, SymbolPulse, Some(do_next_edge)),
    TransitionRule::new(SymbolPulse, is_zero_space, SymbolSilence, Some(do_store_zero)),
    TransitionRule::new(SymbolPulse, is_one_space, SymbolSilence, Some(do_store_one)),
    TransitionRule::new(SymbolPulse, is_bit_space_noise, Idle, Some(do_next_edge)),
];

/// Turns a captured edge sequence into a [`DecodedFrame`].
///
/// Each call starts from scratch and only reads its input, so decoding the
/// same capture twice gives the same answer.
///
/// ```rust
/// use nec_node::nec::{NecDecoder, NecTiming, ToleranceWindows};
///
/// let mut decoder = NecDecoder::new(ToleranceWindows::default());
/// let edges = NecTiming::STANDARD.ideal_capture(0x00F7_20DF, 0);
///
/// let frame = decoder.decode(&edges);
/// assert_eq!(frame.code, 0x00F7_20DF);
/// assert!(!frame.is_error);
/// ```
pub struct NecDecoder {
    fsm: FiniteStateMachine<DecoderState, DecoderContext>,
    ctx: DecoderContext,
}

impl NecDecoder {
    pub fn new(windows: ToleranceWindows) -> Self {
        Self {
            fsm: FiniteStateMachine::new(DECODER_TABLE),
            ctx: DecoderContext::new(windows),
        }
    }

    /// Decode a capture of edge timestamps.
    ///
    /// At most [`NEC_FRAME_EDGES`] edges are read; anything beyond is
    /// ignored. A frame that is abandoned before all 32 bits arrive, and is
    /// not a repetition, decodes to `code == 0` with `is_error` set.
    pub fn decode(&mut self, edges: &[EdgeTick]) -> DecodedFrame {
        self.ctx.load(edges);
        self.fsm.set_state(DecoderState::Idle);

        while self.ctx.remaining > 1 {
            if !self.fsm.fire(&mut self.ctx).is_transition() {
                break;
            }
        }

        let code = if self.ctx.complete { self.ctx.code } else { 0 };
        DecodedFrame::new(code, self.ctx.is_repetition)
    }

    /// State the last decode finished in.
    pub fn state(&self) -> DecoderState {
        self.fsm.current_state()
    }

    pub fn windows(&self) -> &ToleranceWindows {
        &self.ctx.windows
    }
}

impl Default for NecDecoder {
    fn default() -> Self {
        Self::new(ToleranceWindows::default())
    }
}
