//! Save-state data-transfer contract.
//!
//! Each component serializes its complete mutable state as an ordered
//! sequence of fixed-width little-endian fields. The byte layout of any
//! persisted container (file headers, compression, versioning) is an
//! external collaborator's concern; this module only defines the raw field
//! streams and the length discipline: a payload whose length does not match
//! the component's layout fails the load *before* any field is written.

use crate::error::CoreError;

pub trait SaveState {
    /// Exact payload length of this component's field stream, in bytes.
    fn state_len(&self) -> usize;

    /// Append this component's field stream to `out`.
    fn save_state(&self, out: &mut Vec<u8>);

    /// Restore this component from a field stream produced by
    /// `save_state`. A mismatched payload length leaves the component
    /// untouched.
    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError>;
}

/// Length guard shared by every `load_state` implementation.
pub(crate) fn check_len(expected: usize, data: &[u8]) -> Result<(), CoreError> {
    if data.len() != expected {
        return Err(CoreError::StateSize {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Sequential field reader over a length-checked payload.
pub(crate) struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn u8(&mut self) -> u8 {
        let value = self.data[self.pos];
        self.pos += 1;
        value
    }

    pub(crate) fn u16(&mut self) -> u16 {
        u16::from_le_bytes([self.u8(), self.u8()])
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_le_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }

    pub(crate) fn bytes(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    /// Remaining unread bytes; used by compound components that delegate
    /// trailing sections to their parts.
    pub(crate) fn rest(self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpu;
    use crate::machine::Model;

    #[test]
    fn cpu_state_round_trips() {
        let mut cpu = Cpu::new(Model::Dmg);
        cpu.regs.set_bc(0x1234);
        cpu.regs.sp = 0xCFFE;
        cpu.ime = true;

        let mut payload = Vec::new();
        cpu.save_state(&mut payload);
        assert_eq!(payload.len(), cpu.state_len());

        let mut restored = Cpu::power_on();
        restored.load_state(&payload).unwrap();
        assert_eq!(restored.regs.bc(), 0x1234);
        assert_eq!(restored.regs.sp, 0xCFFE);
        assert_eq!(restored.regs.pc, 0x0100);
        assert!(restored.ime);
    }

    #[test]
    fn short_payload_leaves_cpu_untouched() {
        let mut cpu = Cpu::new(Model::Dmg);
        let before = cpu.regs;

        let err = cpu.load_state(&[0u8; 3]).unwrap_err();
        assert_eq!(
            err,
            CoreError::StateSize {
                expected: cpu.state_len(),
                actual: 3
            }
        );
        assert_eq!(cpu.regs.af(), before.af());
        assert_eq!(cpu.regs.pc, before.pc);
    }
}
