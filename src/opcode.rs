//! The 65C816 mnemonic set and the 256-entry dispatch table of tagged
//! operation descriptors. Grounded in the teacher's `OpCode` enum (the
//! `is_branch`/`is_jump`/`is_old`/etc. helper methods are carried over
//! unchanged) and `decode_instruction`'s opcode match, restructured per
//! the redesign flag away from function-pointer dispatch and into data
//! plus a single `execute::dispatch()` switch (see `decode.rs`).

use crate::addressing::AddrMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRA, BRK, BRL, BVC, BVS,
    CLC, CLD, CLI, CLV, CMP, COP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY,
    JML, JMP, JSL, JSR, LDA, LDX, LDY, LSR, MVN, MVP, NOP, ORA, PEA, PEI, PER,
    PHA, PHB, PHD, PHK, PHP, PHX, PHY, PLA, PLB, PLD, PLP, PLX, PLY, REP, ROL,
    ROR, RTI, RTL, RTS, SBC, SEC, SED, SEI, SEP, STA, STP, STX, STY, STZ, TAX,
    TAY, TCD, TCS, TDC, TRB, TSB, TSC, TSX, TXA, TXS, TXY, TYA, TYX, WAI, WDM,
    XBA, XCE,
}

impl Opcode {
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Opcode::BCC | Opcode::BCS | Opcode::BEQ | Opcode::BMI | Opcode::BNE
                | Opcode::BPL | Opcode::BRA | Opcode::BVC | Opcode::BVS | Opcode::BRL
        )
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Opcode::JMP | Opcode::JML)
    }

    pub fn is_subroutine(&self) -> bool {
        matches!(self, Opcode::JSR | Opcode::JSL)
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Opcode::RTS | Opcode::RTL | Opcode::RTI)
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, Opcode::BRK | Opcode::COP)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpDescriptor {
    pub opcode: Opcode,
    pub mode: AddrMode,
    /// Nominal cycle count at this addressing mode, for disassembler/UI
    /// display only. The CPU's actual `cycle_count` is never derived from
    /// this — every bus access is ticked individually as it happens (see
    /// `bus::tick_read`/`tick_write`/`tick_idle`), so page-crossing and
    /// other penalties are always reflected even though this field isn't.
    pub base_cycles: u8,
}

macro_rules! op {
    ($op:ident, $mode:ident, $cycles:expr) => {
        OpDescriptor { opcode: Opcode::$op, mode: AddrMode::$mode, base_cycles: $cycles }
    };
}

/// The full 256-entry decode table, standard WDC 65C816 opcode map.
pub static TABLE: [OpDescriptor; 256] = [
    /* 00 */ op!(BRK, Stack, 7), /* 01 */ op!(ORA, DirectIndexedIndirectX, 6),
    /* 02 */ op!(COP, Stack, 7), /* 03 */ op!(ORA, StackRelative, 4),
    /* 04 */ op!(TSB, Direct, 5), /* 05 */ op!(ORA, Direct, 3),
    /* 06 */ op!(ASL, Direct, 5), /* 07 */ op!(ORA, DirectIndirectLong, 6),
    /* 08 */ op!(PHP, Stack, 3), /* 09 */ op!(ORA, ImmediateM, 2),
    /* 0A */ op!(ASL, Accumulator, 2), /* 0B */ op!(PHD, Stack, 4),
    /* 0C */ op!(TSB, Absolute, 6), /* 0D */ op!(ORA, Absolute, 4),
    /* 0E */ op!(ASL, Absolute, 6), /* 0F */ op!(ORA, AbsoluteLong, 5),

    /* 10 */ op!(BPL, Relative, 2), /* 11 */ op!(ORA, DirectIndirectIndexedY, 5),
    /* 12 */ op!(ORA, DirectIndirect, 5), /* 13 */ op!(ORA, StackRelativeIndirectIndexedY, 7),
    /* 14 */ op!(TRB, Direct, 5), /* 15 */ op!(ORA, DirectIndexedX, 4),
    /* 16 */ op!(ASL, DirectIndexedX, 6), /* 17 */ op!(ORA, DirectIndirectLongIndexedY, 6),
    /* 18 */ op!(CLC, Implied, 2), /* 19 */ op!(ORA, AbsoluteIndexedY, 4),
    /* 1A */ op!(INC, Accumulator, 2), /* 1B */ op!(TCS, Implied, 2),
    /* 1C */ op!(TRB, Absolute, 6), /* 1D */ op!(ORA, AbsoluteIndexedX, 4),
    /* 1E */ op!(ASL, AbsoluteIndexedX, 7), /* 1F */ op!(ORA, AbsoluteLongIndexedX, 5),

    /* 20 */ op!(JSR, Absolute, 6), /* 21 */ op!(AND, DirectIndexedIndirectX, 6),
    /* 22 */ op!(JSL, AbsoluteLong, 8), /* 23 */ op!(AND, StackRelative, 4),
    /* 24 */ op!(BIT, Direct, 3), /* 25 */ op!(AND, Direct, 3),
    /* 26 */ op!(ROL, Direct, 5), /* 27 */ op!(AND, DirectIndirectLong, 6),
    /* 28 */ op!(PLP, Stack, 4), /* 29 */ op!(AND, ImmediateM, 2),
    /* 2A */ op!(ROL, Accumulator, 2), /* 2B */ op!(PLD, Stack, 5),
    /* 2C */ op!(BIT, Absolute, 4), /* 2D */ op!(AND, Absolute, 4),
    /* 2E */ op!(ROL, Absolute, 6), /* 2F */ op!(AND, AbsoluteLong, 5),

    /* 30 */ op!(BMI, Relative, 2), /* 31 */ op!(AND, DirectIndirectIndexedY, 5),
    /* 32 */ op!(AND, DirectIndirect, 5), /* 33 */ op!(AND, StackRelativeIndirectIndexedY, 7),
    /* 34 */ op!(BIT, DirectIndexedX, 4), /* 35 */ op!(AND, DirectIndexedX, 4),
    /* 36 */ op!(ROL, DirectIndexedX, 6), /* 37 */ op!(AND, DirectIndirectLongIndexedY, 6),
    /* 38 */ op!(SEC, Implied, 2), /* 39 */ op!(AND, AbsoluteIndexedY, 4),
    /* 3A */ op!(DEC, Accumulator, 2), /* 3B */ op!(TSC, Implied, 2),
    /* 3C */ op!(BIT, AbsoluteIndexedX, 4), /* 3D */ op!(AND, AbsoluteIndexedX, 4),
    /* 3E */ op!(ROL, AbsoluteIndexedX, 7), /* 3F */ op!(AND, AbsoluteLongIndexedX, 5),

    /* 40 */ op!(RTI, Stack, 6), /* 41 */ op!(EOR, DirectIndexedIndirectX, 6),
    /* 42 */ op!(WDM, ImmediateByte, 2), /* 43 */ op!(EOR, StackRelative, 4),
    /* 44 */ op!(MVP, BlockMove, 7), /* 45 */ op!(EOR, Direct, 3),
    /* 46 */ op!(LSR, Direct, 5), /* 47 */ op!(EOR, DirectIndirectLong, 6),
    /* 48 */ op!(PHA, Stack, 3), /* 49 */ op!(EOR, ImmediateM, 2),
    /* 4A */ op!(LSR, Accumulator, 2), /* 4B */ op!(PHK, Stack, 3),
    /* 4C */ op!(JMP, Absolute, 3), /* 4D */ op!(EOR, Absolute, 4),
    /* 4E */ op!(LSR, Absolute, 6), /* 4F */ op!(EOR, AbsoluteLong, 5),

    /* 50 */ op!(BVC, Relative, 2), /* 51 */ op!(EOR, DirectIndirectIndexedY, 5),
    /* 52 */ op!(EOR, DirectIndirect, 5), /* 53 */ op!(EOR, StackRelativeIndirectIndexedY, 7),
    /* 54 */ op!(MVN, BlockMove, 7), /* 55 */ op!(EOR, DirectIndexedX, 4),
    /* 56 */ op!(LSR, DirectIndexedX, 6), /* 57 */ op!(EOR, DirectIndirectLongIndexedY, 6),
    /* 58 */ op!(CLI, Implied, 2), /* 59 */ op!(EOR, AbsoluteIndexedY, 4),
    /* 5A */ op!(PHY, Stack, 3), /* 5B */ op!(TCD, Implied, 2),
    /* 5C */ op!(JMP, AbsoluteLong, 4), /* 5D */ op!(EOR, AbsoluteIndexedX, 4),
    /* 5E */ op!(LSR, AbsoluteIndexedX, 7), /* 5F */ op!(EOR, AbsoluteLongIndexedX, 5),

    /* 60 */ op!(RTS, Stack, 6), /* 61 */ op!(ADC, DirectIndexedIndirectX, 6),
    /* 62 */ op!(PER, Stack, 6), /* 63 */ op!(ADC, StackRelative, 4),
    /* 64 */ op!(STZ, Direct, 3), /* 65 */ op!(ADC, Direct, 3),
    /* 66 */ op!(ROR, Direct, 5), /* 67 */ op!(ADC, DirectIndirectLong, 6),
    /* 68 */ op!(PLA, Stack, 4), /* 69 */ op!(ADC, ImmediateM, 2),
    /* 6A */ op!(ROR, Accumulator, 2), /* 6B */ op!(RTL, Stack, 6),
    /* 6C */ op!(JMP, AbsoluteIndirect, 5), /* 6D */ op!(ADC, Absolute, 4),
    /* 6E */ op!(ROR, Absolute, 6), /* 6F */ op!(ADC, AbsoluteLong, 5),

    /* 70 */ op!(BVS, Relative, 2), /* 71 */ op!(ADC, DirectIndirectIndexedY, 5),
    /* 72 */ op!(ADC, DirectIndirect, 5), /* 73 */ op!(ADC, StackRelativeIndirectIndexedY, 7),
    /* 74 */ op!(STZ, DirectIndexedX, 4), /* 75 */ op!(ADC, DirectIndexedX, 4),
    /* 76 */ op!(ROR, DirectIndexedX, 6), /* 77 */ op!(ADC, DirectIndirectLongIndexedY, 6),
    /* 78 */ op!(SEI, Implied, 2), /* 79 */ op!(ADC, AbsoluteIndexedY, 4),
    /* 7A */ op!(PLY, Stack, 4), /* 7B */ op!(TDC, Implied, 2),
    /* 7C */ op!(JMP, AbsoluteIndexedIndirectX, 6), /* 7D */ op!(ADC, AbsoluteIndexedX, 4),
    /* 7E */ op!(ROR, AbsoluteIndexedX, 7), /* 7F */ op!(ADC, AbsoluteLongIndexedX, 5),

    /* 80 */ op!(BRA, Relative, 2), /* 81 */ op!(STA, DirectIndexedIndirectX, 6),
    /* 82 */ op!(BRL, RelativeLong, 3), /* 83 */ op!(STA, StackRelative, 4),
    /* 84 */ op!(STY, Direct, 3), /* 85 */ op!(STA, Direct, 3),
    /* 86 */ op!(STX, Direct, 3), /* 87 */ op!(STA, DirectIndirectLong, 6),
    /* 88 */ op!(DEY, Implied, 2), /* 89 */ op!(BIT, ImmediateM, 2),
    /* 8A */ op!(TXA, Implied, 2), /* 8B */ op!(PHB, Stack, 3),
    /* 8C */ op!(STY, Absolute, 4), /* 8D */ op!(STA, Absolute, 4),
    /* 8E */ op!(STX, Absolute, 4), /* 8F */ op!(STA, AbsoluteLong, 5),

    /* 90 */ op!(BCC, Relative, 2), /* 91 */ op!(STA, DirectIndirectIndexedY, 6),
    /* 92 */ op!(STA, DirectIndirect, 5), /* 93 */ op!(STA, StackRelativeIndirectIndexedY, 7),
    /* 94 */ op!(STY, DirectIndexedX, 4), /* 95 */ op!(STA, DirectIndexedX, 4),
    /* 96 */ op!(STX, DirectIndexedY, 4), /* 97 */ op!(STA, DirectIndirectLongIndexedY, 6),
    /* 98 */ op!(TYA, Implied, 2), /* 99 */ op!(STA, AbsoluteIndexedY, 5),
    /* 9A */ op!(TXS, Implied, 2), /* 9B */ op!(TXY, Implied, 2),
    /* 9C */ op!(STZ, Absolute, 4), /* 9D */ op!(STA, AbsoluteIndexedX, 5),
    /* 9E */ op!(STZ, AbsoluteIndexedX, 5), /* 9F */ op!(STA, AbsoluteLongIndexedX, 5),

    /* A0 */ op!(LDY, ImmediateX, 2), /* A1 */ op!(LDA, DirectIndexedIndirectX, 6),
    /* A2 */ op!(LDX, ImmediateX, 2), /* A3 */ op!(LDA, StackRelative, 4),
    /* A4 */ op!(LDY, Direct, 3), /* A5 */ op!(LDA, Direct, 3),
    /* A6 */ op!(LDX, Direct, 3), /* A7 */ op!(LDA, DirectIndirectLong, 6),
    /* A8 */ op!(TAY, Implied, 2), /* A9 */ op!(LDA, ImmediateM, 2),
    /* AA */ op!(TAX, Implied, 2), /* AB */ op!(PLB, Stack, 4),
    /* AC */ op!(LDY, Absolute, 4), /* AD */ op!(LDA, Absolute, 4),
    /* AE */ op!(LDX, Absolute, 4), /* AF */ op!(LDA, AbsoluteLong, 5),

    /* B0 */ op!(BCS, Relative, 2), /* B1 */ op!(LDA, DirectIndirectIndexedY, 5),
    /* B2 */ op!(LDA, DirectIndirect, 5), /* B3 */ op!(LDA, StackRelativeIndirectIndexedY, 7),
    /* B4 */ op!(LDY, DirectIndexedX, 4), /* B5 */ op!(LDA, DirectIndexedX, 4),
    /* B6 */ op!(LDX, DirectIndexedY, 4), /* B7 */ op!(LDA, DirectIndirectLongIndexedY, 6),
    /* B8 */ op!(CLV, Implied, 2), /* B9 */ op!(LDA, AbsoluteIndexedY, 4),
    /* BA */ op!(TSX, Implied, 2), /* BB */ op!(TYX, Implied, 2),
    /* BC */ op!(LDY, AbsoluteIndexedX, 4), /* BD */ op!(LDA, AbsoluteIndexedX, 4),
    /* BE */ op!(LDX, AbsoluteIndexedY, 4), /* BF */ op!(LDA, AbsoluteLongIndexedX, 5),

    /* C0 */ op!(CPY, ImmediateX, 2), /* C1 */ op!(CMP, DirectIndexedIndirectX, 6),
    /* C2 */ op!(REP, ImmediateByte, 3), /* C3 */ op!(CMP, StackRelative, 4),
    /* C4 */ op!(CPY, Direct, 3), /* C5 */ op!(CMP, Direct, 3),
    /* C6 */ op!(DEC, Direct, 5), /* C7 */ op!(CMP, DirectIndirectLong, 6),
    /* C8 */ op!(INY, Implied, 2), /* C9 */ op!(CMP, ImmediateM, 2),
    /* CA */ op!(DEX, Implied, 2), /* CB */ op!(WAI, Implied, 3),
    /* CC */ op!(CPY, Absolute, 4), /* CD */ op!(CMP, Absolute, 4),
    /* CE */ op!(DEC, Absolute, 6), /* CF */ op!(CMP, AbsoluteLong, 5),

    /* D0 */ op!(BNE, Relative, 2), /* D1 */ op!(CMP, DirectIndirectIndexedY, 5),
    /* D2 */ op!(CMP, DirectIndirect, 5), /* D3 */ op!(CMP, StackRelativeIndirectIndexedY, 7),
    /* D4 */ op!(PEI, Stack, 6), /* D5 */ op!(CMP, DirectIndexedX, 4),
    /* D6 */ op!(DEC, DirectIndexedX, 6), /* D7 */ op!(CMP, DirectIndirectLongIndexedY, 6),
    /* D8 */ op!(CLD, Implied, 2), /* D9 */ op!(CMP, AbsoluteIndexedY, 4),
    /* DA */ op!(PHX, Stack, 3), /* DB */ op!(STP, Implied, 3),
    /* DC */ op!(JMP, AbsoluteIndirectLong, 6), /* DD */ op!(CMP, AbsoluteIndexedX, 4),
    /* DE */ op!(DEC, AbsoluteIndexedX, 7), /* DF */ op!(CMP, AbsoluteLongIndexedX, 5),

    /* E0 */ op!(CPX, ImmediateX, 2), /* E1 */ op!(SBC, DirectIndexedIndirectX, 6),
    /* E2 */ op!(SEP, ImmediateByte, 3), /* E3 */ op!(SBC, StackRelative, 4),
    /* E4 */ op!(CPX, Direct, 3), /* E5 */ op!(SBC, Direct, 3),
    /* E6 */ op!(INC, Direct, 5), /* E7 */ op!(SBC, DirectIndirectLong, 6),
    /* E8 */ op!(INX, Implied, 2), /* E9 */ op!(SBC, ImmediateM, 2),
    /* EA */ op!(NOP, Implied, 2), /* EB */ op!(XBA, Implied, 3),
    /* EC */ op!(CPX, Absolute, 4), /* ED */ op!(SBC, Absolute, 4),
    /* EE */ op!(INC, Absolute, 6), /* EF */ op!(SBC, AbsoluteLong, 5),

    /* F0 */ op!(BEQ, Relative, 2), /* F1 */ op!(SBC, DirectIndirectIndexedY, 5),
    /* F2 */ op!(SBC, DirectIndirect, 5), /* F3 */ op!(SBC, StackRelativeIndirectIndexedY, 7),
    /* F4 */ op!(PEA, Stack, 5), /* F5 */ op!(SBC, DirectIndexedX, 4),
    /* F6 */ op!(INC, DirectIndexedX, 6), /* F7 */ op!(SBC, DirectIndirectLongIndexedY, 6),
    /* F8 */ op!(SED, Implied, 2), /* F9 */ op!(SBC, AbsoluteIndexedY, 4),
    /* FA */ op!(PLX, Stack, 4), /* FB */ op!(XCE, Implied, 2),
    /* FC */ op!(JSR, AbsoluteIndexedIndirectX, 8), /* FD */ op!(SBC, AbsoluteIndexedX, 4),
    /* FE */ op!(INC, AbsoluteIndexedX, 7), /* FF */ op!(SBC, AbsoluteLongIndexedX, 5),
];
