//! Hardware collaborators the protocol core is driven through.
//!
//! The core never touches registers. A board port implements these traits
//! (and `embedded_hal::digital::OutputPin` for the carrier) and hands the
//! implementations to the receiver and transmitter constructors.

use crate::nec::{EdgeBuffer, EdgeTick, NEC_FRAME_EDGES};

/// Monotonic millisecond clock, wrapping at `u32::MAX`.
pub trait MillisClock {
    fn now_millis(&self) -> u32;
}

/// Free-running counter advancing once per tick of the configured time base.
pub trait TickTimer {
    /// Reset the count to zero and start counting.
    fn start(&mut self);

    fn stop(&mut self);

    /// Current count over the full `u32` range, wrapping from `u32::MAX`
    /// to 0.
    ///
    /// Elapsed ticks are computed with `u32` wrapping subtraction, so a
    /// narrower hardware counter must be widened by the port (for example by
    /// counting its overflows). Returning a raw 16-bit count would cut short
    /// any burst that crosses the 16-bit wrap.
    fn current_tick(&self) -> u32;
}

/// The receive-side view of the edge capture interrupt.
pub trait EdgeCapture {
    /// Edges captured since the last [`clear`](Self::clear).
    fn edge_count(&self) -> usize;

    /// Copy the captured timestamps into `out`, returning how many there are.
    fn snapshot(&self, out: &mut [EdgeTick; NEC_FRAME_EDGES]) -> usize;

    /// Discard every captured edge.
    fn clear(&mut self);

    /// Enable or disable the capture interrupt.
    fn set_enabled(&mut self, enabled: bool);
}

/// A shared buffer is a complete capture: disarming it makes the interrupt
/// handler's `record` calls no-ops.
impl EdgeCapture for &EdgeBuffer {
    fn edge_count(&self) -> usize {
        self.len()
    }

    fn snapshot(&self, out: &mut [EdgeTick; NEC_FRAME_EDGES]) -> usize {
        EdgeBuffer::snapshot(self, out)
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.reset();
        self.set_armed(enabled);
    }
}
