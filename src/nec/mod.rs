//! The NEC infrared protocol built on the core engine.
//!
//! - [`timing`]: protocol constants, burst table and tolerance windows
//! - [`EdgeBuffer`]: interrupt-fed store of edge timestamps
//! - [`NecDecoder`]: edge timestamps to [`DecodedFrame`]
//! - [`NecReceiver`]: decides when a frame is over and keeps the result
//! - [`NecTransmitter`]: keys the carrier for one frame per pending code

mod decoder;
mod edges;
mod frame;
mod receiver;
pub mod timing;
mod transmitter;

pub use decoder::{DecoderState, NecDecoder};
pub use edges::EdgeBuffer;
pub use frame::DecodedFrame;
pub use receiver::{NecReceiver, RxState};
pub use timing::{
    ticks_between, Burst, EdgeTick, NecTiming, PwmSetup, TimeBase, ToleranceWindows, Window,
    NEC_CARRIER_HZ, NEC_DUTY_CYCLE, NEC_FRAME_BITS, NEC_FRAME_EDGES, NEC_MESSAGE_TIMEOUT_MS,
    NEC_TICK_BASE_US, NEC_TOLERANCE_PERCENT,
};
pub use transmitter::{NecTransmitter, TransmitError, TxState};
