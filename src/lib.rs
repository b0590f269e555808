//! nec-node: table-driven state machines for an NEC infrared node
//!
//! The crate is split into a small generic engine and the protocol
//! components built on it. Every component is a `const` transition table of
//! guard and action function pointers plus a context struct the component
//! owns; the application polls each component's `fire` from its main loop.
//!
//! # Modules
//!
//! - [`core`]: the engine (`State`, `TransitionRule`, `FiniteStateMachine`)
//! - [`nec`]: decoder, receive framer, transmitter and the edge buffer
//! - [`port`]: traits a board implements to drive the components
//! - [`config`]: serde-loadable timing configuration
//!
//! # Example
//!
//! ```rust
//! use nec_node::nec::{NecDecoder, NecTiming};
//!
//! let mut decoder = NecDecoder::default();
//!
//! let frame = decoder.decode(&NecTiming::STANDARD.ideal_capture(0x00FF_00FF, 0));
//! assert_eq!(frame.code, 0x00FF_00FF);
//! assert_eq!(frame.command(), Some(0x00));
//!
//! let frame = decoder.decode(&NecTiming::STANDARD.ideal_repetition(0));
//! assert!(frame.is_repetition);
//! ```

mod macros;

pub mod config;
pub mod core;
pub mod nec;
pub mod port;

// Re-export commonly used types
pub use config::{ConfigError, NecConfig};
pub use core::{FiniteStateMachine, FsmError, State, StepResult, TransitionRule};
pub use nec::{DecodedFrame, EdgeBuffer, NecDecoder, NecReceiver, NecTransmitter};
