//! Fixed-size opcode dispatch tables.
//!
//! Two 256-entry `const` arrays map each opcode byte to an enumerated
//! operation descriptor: one for the primary set, one for the 0xCB-prefixed
//! set. Execution indexes the table and matches on the descriptor, giving
//! O(1) dispatch with no dynamic lookup. Operand fields (register indices,
//! register-pair selectors, condition codes, bit numbers) are decoded into
//! the descriptor once, at table-build time.
//!
//! Register indices follow the standard opcode-table order:
//! 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.

/// Primary-table operation descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    /// 0xCB: dispatch through the prefixed table.
    Prefix,
    /// LD rr,d16 (rp: 0=BC 1=DE 2=HL 3=SP).
    LdRrD16(u8),
    /// LD r,d8 (r may be 6 for (HL)).
    LdRD8(u8),
    /// LD r,r' over opcodes 0x40-0x7F (0x76 is HALT, not part of this).
    LdRR { dst: u8, src: u8 },
    /// LD (BC/DE/HL+/HL-),A (rp: 0=BC 1=DE 2=HL+ 3=HL-).
    StoreAIndirect(u8),
    /// LD A,(BC/DE/HL+/HL-).
    LoadAIndirect(u8),
    /// LD (a16),SP.
    LdA16Sp,
    /// LDH (a8),A.
    StoreHighA8,
    /// LDH A,(a8).
    LoadHighA8,
    /// LD (C),A.
    StoreHighC,
    /// LD A,(C).
    LoadHighC,
    /// LD (a16),A.
    StoreA16,
    /// LD A,(a16).
    LoadA16,
    LdSpHl,
    /// LD HL,SP+r8.
    LdHlSpR8,
    /// ADD SP,r8.
    AddSpR8,
    /// INC rr (rp as in `LdRrD16`).
    Inc16(u8),
    Dec16(u8),
    /// INC r (r may be 6 for (HL)).
    Inc8(u8),
    Dec8(u8),
    /// ADD HL,rr.
    AddHl(u8),
    /// ALU op against a register or (HL)
    /// (op: 0=ADD 1=ADC 2=SUB 3=SBC 4=AND 5=XOR 6=OR 7=CP).
    AluReg { op: u8, src: u8 },
    /// ALU op against an immediate byte (same op encoding).
    AluImm(u8),
    /// Unprefixed accumulator rotate (0=RLCA 1=RRCA 2=RLA 3=RRA).
    RotateA(u8),
    Daa,
    Cpl,
    Scf,
    Ccf,
    /// JR r8 (unconditional).
    Jr,
    /// JR cc,r8 (cc: 0=NZ 1=Z 2=NC 3=C).
    JrCc(u8),
    JpA16,
    JpCc(u8),
    JpHl,
    CallA16,
    CallCc(u8),
    Ret,
    RetCc(u8),
    Reti,
    /// RST: the payload is the target address (0x00, 0x08, .. 0x38).
    Rst(u8),
    /// PUSH rr (rp2: 0=BC 1=DE 2=HL 3=AF).
    Push(u8),
    Pop(u8),
    /// Opcode hole with no defined decoding; fatal when fetched.
    Illegal,
}

/// Prefixed-table operation descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CbOp {
    /// Rotate/shift family
    /// (kind: 0=RLC 1=RRC 2=RL 3=RR 4=SLA 5=SRA 6=SWAP 7=SRL).
    Rotate { kind: u8, target: u8 },
    Bit { bit: u8, target: u8 },
    Res { bit: u8, target: u8 },
    Set { bit: u8, target: u8 },
}

pub(crate) const PRIMARY: [Op; 256] = build_primary();
pub(crate) const PREFIXED: [CbOp; 256] = build_prefixed();

const fn decode_primary(opcode: u8) -> Op {
    match opcode {
        0x00 => Op::Nop,
        0x10 => Op::Stop,
        0x76 => Op::Halt,
        0xF3 => Op::Di,
        0xFB => Op::Ei,
        0xCB => Op::Prefix,

        0x01 | 0x11 | 0x21 | 0x31 => Op::LdRrD16((opcode >> 4) & 0x03),
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => Op::LdRD8((opcode >> 3) & 0x07),
        0x40..=0x7F => Op::LdRR {
            dst: (opcode >> 3) & 0x07,
            src: opcode & 0x07,
        },
        0x02 | 0x12 | 0x22 | 0x32 => Op::StoreAIndirect((opcode >> 4) & 0x03),
        0x0A | 0x1A | 0x2A | 0x3A => Op::LoadAIndirect((opcode >> 4) & 0x03),
        0x08 => Op::LdA16Sp,
        0xE0 => Op::StoreHighA8,
        0xF0 => Op::LoadHighA8,
        0xE2 => Op::StoreHighC,
        0xF2 => Op::LoadHighC,
        0xEA => Op::StoreA16,
        0xFA => Op::LoadA16,
        0xF9 => Op::LdSpHl,
        0xF8 => Op::LdHlSpR8,
        0xE8 => Op::AddSpR8,

        0x03 | 0x13 | 0x23 | 0x33 => Op::Inc16((opcode >> 4) & 0x03),
        0x0B | 0x1B | 0x2B | 0x3B => Op::Dec16((opcode >> 4) & 0x03),
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => Op::Inc8((opcode >> 3) & 0x07),
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => Op::Dec8((opcode >> 3) & 0x07),
        0x09 | 0x19 | 0x29 | 0x39 => Op::AddHl((opcode >> 4) & 0x03),

        0x80..=0xBF => Op::AluReg {
            op: (opcode >> 3) & 0x07,
            src: opcode & 0x07,
        },
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => Op::AluImm((opcode >> 3) & 0x07),

        0x07 | 0x0F | 0x17 | 0x1F => Op::RotateA((opcode >> 3) & 0x03),
        0x27 => Op::Daa,
        0x2F => Op::Cpl,
        0x37 => Op::Scf,
        0x3F => Op::Ccf,

        0x18 => Op::Jr,
        0x20 | 0x28 | 0x30 | 0x38 => Op::JrCc((opcode >> 3) & 0x03),
        0xC3 => Op::JpA16,
        0xC2 | 0xCA | 0xD2 | 0xDA => Op::JpCc((opcode >> 3) & 0x03),
        0xE9 => Op::JpHl,
        0xCD => Op::CallA16,
        0xC4 | 0xCC | 0xD4 | 0xDC => Op::CallCc((opcode >> 3) & 0x03),
        0xC9 => Op::Ret,
        0xC0 | 0xC8 | 0xD0 | 0xD8 => Op::RetCc((opcode >> 3) & 0x03),
        0xD9 => Op::Reti,
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => Op::Rst(opcode & 0x38),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => Op::Push((opcode >> 4) & 0x03),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => Op::Pop((opcode >> 4) & 0x03),

        // Opcode holes: D3, DB, DD, E3, E4, EB, EC, ED, F4, FC, FD.
        _ => Op::Illegal,
    }
}

const fn decode_prefixed(cb: u8) -> CbOp {
    let target = cb & 0x07;
    let y = (cb >> 3) & 0x07;
    match cb >> 6 {
        0 => CbOp::Rotate { kind: y, target },
        1 => CbOp::Bit { bit: y, target },
        2 => CbOp::Res { bit: y, target },
        _ => CbOp::Set { bit: y, target },
    }
}

const fn build_primary() -> [Op; 256] {
    let mut table = [Op::Illegal; 256];
    let mut opcode = 0usize;
    while opcode < 256 {
        table[opcode] = decode_primary(opcode as u8);
        opcode += 1;
    }
    table
}

const fn build_prefixed() -> [CbOp; 256] {
    let mut table = [CbOp::Rotate { kind: 0, target: 0 }; 256];
    let mut opcode = 0usize;
    while opcode < 256 {
        table[opcode] = decode_prefixed(opcode as u8);
        opcode += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_is_carved_out_of_the_ld_block() {
        assert_eq!(PRIMARY[0x76], Op::Halt);
        assert_eq!(PRIMARY[0x75], Op::LdRR { dst: 6, src: 5 });
        assert_eq!(PRIMARY[0x77], Op::LdRR { dst: 6, src: 7 });
    }

    #[test]
    fn exactly_eleven_opcode_holes() {
        let holes: Vec<u8> = (0u16..256)
            .filter(|&op| PRIMARY[op as usize] == Op::Illegal)
            .map(|op| op as u8)
            .collect();
        assert_eq!(
            holes,
            vec![0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]
        );
    }

    #[test]
    fn rst_targets_are_multiples_of_eight() {
        assert_eq!(PRIMARY[0xC7], Op::Rst(0x00));
        assert_eq!(PRIMARY[0xEF], Op::Rst(0x28));
        assert_eq!(PRIMARY[0xFF], Op::Rst(0x38));
    }

    #[test]
    fn prefixed_table_is_fully_defined() {
        assert_eq!(PREFIXED[0x00], CbOp::Rotate { kind: 0, target: 0 });
        assert_eq!(PREFIXED[0x37], CbOp::Rotate { kind: 6, target: 7 });
        assert_eq!(PREFIXED[0x46], CbOp::Bit { bit: 0, target: 6 });
        assert_eq!(PREFIXED[0x87], CbOp::Res { bit: 0, target: 7 });
        assert_eq!(PREFIXED[0xFE], CbOp::Set { bit: 7, target: 6 });
    }
}
