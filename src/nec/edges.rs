//! Interrupt-fed edge timestamp buffer.
//!
//! The buffer is single-producer/single-consumer: the GPIO edge interrupt is
//! the only writer of slots and of the length, and the receive framer only
//! reads them. The framer snapshots the contents once no edge has arrived for
//! a full message timeout, and resets the buffer with [`EdgeBuffer::reset`]
//! between frames. All state is atomic, so a `static` buffer can be shared
//! with an interrupt handler without locks or `unsafe`.
//!
//! ```rust
//! use nec_node::nec::EdgeBuffer;
//!
//! static EDGES: EdgeBuffer = EdgeBuffer::new();
//!
//! // interrupt side
//! EDGES.set_armed(true);
//! EDGES.record(1200);
//! EDGES.record(1360);
//!
//! // polling side
//! assert_eq!(EDGES.len(), 2);
//! ```

use super::timing::{EdgeTick, NEC_FRAME_EDGES};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

/// Fixed-capacity store of edge timestamps for one frame.
pub struct EdgeBuffer {
    ticks: [AtomicU16; NEC_FRAME_EDGES],
    len: AtomicUsize,
    armed: AtomicBool,
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: AtomicU16 = AtomicU16::new(0);

impl EdgeBuffer {
    pub const fn new() -> Self {
        Self {
            ticks: [EMPTY_SLOT; NEC_FRAME_EDGES],
            len: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Store the timestamp of an edge.
    ///
    /// Returns `false` when the edge was dropped: the buffer is disarmed or
    /// already full. Overflow is lossy; the truncated frame fails to decode.
    pub fn record(&self, tick: EdgeTick) -> bool {
        if !self.armed.load(Ordering::Acquire) {
            return false;
        }
        let idx = self.len.load(Ordering::Acquire);
        if idx >= NEC_FRAME_EDGES {
            return false;
        }
        self.ticks[idx].store(tick, Ordering::Relaxed);
        self.len.store(idx + 1, Ordering::Release);
        true
    }

    /// Store an edge only if the line level fits its position.
    ///
    /// Edges alternate, so the edge stored at an even index must leave the
    /// line low and the one at an odd index must leave it high. Spurious
    /// double-triggers that break the alternation are ignored.
    pub fn record_level(&self, tick: EdgeTick, line_high: bool) -> bool {
        let idx = self.len.load(Ordering::Acquire);
        if line_high != (idx % 2 == 1) {
            return false;
        }
        self.record(tick)
    }

    /// Number of edges stored so far.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Allow or refuse new edges.
    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::Release);
    }

    /// Zero every slot and rewind to the start.
    pub fn reset(&self) {
        self.len.store(0, Ordering::Release);
        for slot in &self.ticks {
            slot.store(0, Ordering::Relaxed);
        }
    }

    /// Copy the stored edges into `out`, returning how many were copied.
    pub fn snapshot(&self, out: &mut [EdgeTick; NEC_FRAME_EDGES]) -> usize {
        let len = self.len().min(NEC_FRAME_EDGES);
        for (dst, src) in out.iter_mut().zip(&self.ticks[..len]) {
            *dst = src.load(Ordering::Relaxed);
        }
        len
    }
}

impl Default for EdgeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> EdgeBuffer {
        let buffer = EdgeBuffer::new();
        buffer.set_armed(true);
        buffer
    }

    #[test]
    fn disarmed_buffer_drops_edges() {
        let buffer = EdgeBuffer::new();
        assert!(!buffer.record(10));
        assert!(buffer.is_empty());
    }

    #[test]
    fn record_appends_in_order() {
        let buffer = armed();
        for tick in [5, 165, 245] {
            assert!(buffer.record(tick));
        }

        let mut out = [0; NEC_FRAME_EDGES];
        let n = buffer.snapshot(&mut out);

        assert_eq!(n, 3);
        assert_eq!(&out[..n], &[5, 165, 245]);
    }

    #[test]
    fn overflow_is_silently_dropped() {
        let buffer = armed();
        for tick in 0..NEC_FRAME_EDGES as u16 {
            assert!(buffer.record(tick));
        }

        assert!(!buffer.record(999));
        assert_eq!(buffer.len(), NEC_FRAME_EDGES);

        let mut out = [0; NEC_FRAME_EDGES];
        buffer.snapshot(&mut out);
        assert_eq!(out[NEC_FRAME_EDGES - 1], NEC_FRAME_EDGES as u16 - 1);
    }

    #[test]
    fn reset_rewinds_and_clears() {
        let buffer = armed();
        buffer.record(7);
        buffer.record(8);

        buffer.reset();

        assert!(buffer.is_empty());
        let mut out = [1; NEC_FRAME_EDGES];
        assert_eq!(buffer.snapshot(&mut out), 0);
        assert!(buffer.record(9));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn record_level_enforces_alternation() {
        let buffer = armed();

        assert!(!buffer.record_level(1, true));
        assert!(buffer.record_level(2, false));
        assert!(!buffer.record_level(3, false));
        assert!(buffer.record_level(4, true));

        let mut out = [0; NEC_FRAME_EDGES];
        let n = buffer.snapshot(&mut out);
        assert_eq!(&out[..n], &[2, 4]);
    }
}
