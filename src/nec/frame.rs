//! The value the decoder hands to its consumer.

use serde::{Deserialize, Serialize};

/// Outcome of decoding one captured frame.
///
/// `code` is 0 at rest; a nonzero value means an unread command is pending.
/// Codes are assembled most significant bit first, so a frame laid out as
/// `0xAAAADDNN` carries a 16-bit address, a command byte and its inverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    pub code: u32,
    pub is_repetition: bool,
    pub is_error: bool,
}

impl DecodedFrame {
    /// Build a frame, deriving `is_error` from the other two fields.
    ///
    /// ```rust
    /// use nec_node::nec::DecodedFrame;
    ///
    /// assert!(DecodedFrame::new(0, false).is_error);
    /// assert!(!DecodedFrame::new(0, true).is_error);
    /// assert!(!DecodedFrame::new(0x00FF_00FF, false).is_error);
    /// ```
    pub fn new(code: u32, is_repetition: bool) -> Self {
        Self {
            code,
            is_repetition,
            is_error: code == 0 && !is_repetition,
        }
    }

    /// True while a command is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.code != 0
    }

    /// Upper 16 bits of the code.
    pub fn address(&self) -> u16 {
        (self.code >> 16) as u16
    }

    /// The command byte, if the last byte is its bitwise inverse.
    pub fn command(&self) -> Option<u8> {
        let [_, _, command, inverse] = self.code.to_be_bytes();
        (command ^ inverse == 0xFF).then_some(command)
    }
}
