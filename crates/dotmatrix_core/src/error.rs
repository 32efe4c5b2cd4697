use thiserror::Error;

/// Errors surfaced by the execution core.
///
/// Two severities exist: fatal conditions abort the run loop (there is no
/// deterministic way to continue past them), while recoverable conditions
/// fail a single operation and leave the live machine state untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Fatal: the fetched opcode byte has no defined decoding.
    ///
    /// `pc` is the address the opcode was fetched from.
    #[error("illegal opcode {opcode:#04x} at pc {pc:#06x}")]
    IllegalOpcode { pc: u16, opcode: u8 },

    /// Recoverable: a save-state payload does not match the component's
    /// fixed field layout. The load is aborted before any field is written.
    #[error("save-state payload length mismatch: expected {expected} bytes, got {actual}")]
    StateSize { expected: usize, actual: usize },
}
