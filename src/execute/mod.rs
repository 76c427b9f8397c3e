//! Instruction semantics (component C4), split into family modules the
//! way `original_source/Core/Cpu.h` groups its private methods (by
//! comment banner: add/subtract, branch, set/clear flag, ...). Opcodes
//! the teacher already implemented (load/store, compare, shift,
//! transfer, most stack ops) are generalized here to go through `Bus`;
//! everything the teacher left as `todo!()`/`unimplemented!()` — full
//! emulation-mode coverage, JML, JSL/JSR/RTL, MVN/MVP, WAI, STP, full
//! BRK/COP, all eight branches, PEA/PEI/PER, WDM, decimal ADC/SBC — is
//! built out completely here, grounded on the opcode's presence in
//! `original_source/Core/Cpu.h`'s method surface.

mod alu;
mod block_move;
mod branch;
mod flags;
mod interrupt_ops;
mod jump;
mod load_store;
mod shift;
mod stack;
mod transfer;

use crate::addressing::{AddrMode, Resolved};
use crate::bus::{tick_read, tick_write, AccessKind, Bus};
use crate::opcode::{OpDescriptor, Opcode};
use crate::state::CpuState;

/// Fetches the value an opcode operates on: for immediate modes this
/// consumes operand bytes from the instruction stream; for everything
/// else it reads through `resolved.address` at the given width.
/// `use_x_width` selects the X flag instead of M for index-register ops
/// (LDX/LDY/STX/STY/CPX/CPY).
pub(crate) fn fetch_value<B: Bus>(
    state: &mut CpuState,
    bus: &mut B,
    mode: AddrMode,
    resolved: &Resolved,
    use_x_width: bool,
) -> u16 {
    let eight_bit = if use_x_width { state.p.x } else { state.p.m };
    match mode {
        AddrMode::Accumulator => state.a,
        AddrMode::ImmediateByte => {
            let addr = state.full_pc();
            let v = tick_read(state, bus, addr, AccessKind::Fetch);
            state.pc = state.pc.wrapping_add(1);
            v as u16
        }
        AddrMode::ImmediateM | AddrMode::ImmediateX => {
            let addr = state.full_pc();
            let lo = tick_read(state, bus, addr, AccessKind::Fetch);
            state.pc = state.pc.wrapping_add(1);
            if eight_bit {
                lo as u16
            } else {
                let addr2 = state.full_pc();
                let hi = tick_read(state, bus, addr2, AccessKind::Fetch);
                state.pc = state.pc.wrapping_add(1);
                u16::from_le_bytes([lo, hi])
            }
        }
        _ => {
            let addr = resolved.address.expect("data addressing mode must resolve an address");
            let lo = tick_read(state, bus, addr, AccessKind::Read);
            if eight_bit {
                lo as u16
            } else {
                let hi = tick_read(state, bus, addr.wrapping_add(1), AccessKind::Read);
                u16::from_le_bytes([lo, hi])
            }
        }
    }
}

pub(crate) fn store_value<B: Bus>(
    state: &mut CpuState,
    bus: &mut B,
    mode: AddrMode,
    resolved: &Resolved,
    value: u16,
    use_x_width: bool,
) {
    let eight_bit = if use_x_width { state.p.x } else { state.p.m };
    if mode == AddrMode::Accumulator {
        if eight_bit {
            state.a = (state.a & 0xFF00) | (value & 0x00FF);
        } else {
            state.a = value;
        }
        return;
    }
    let addr = resolved.address.expect("data addressing mode must resolve an address");
    tick_write(state, bus, addr, value as u8, AccessKind::Write);
    if !eight_bit {
        tick_write(state, bus, addr.wrapping_add(1), (value >> 8) as u8, AccessKind::Write);
    }
}

pub(crate) fn set_zn(state: &mut CpuState, value: u16, eight_bit: bool) {
    if eight_bit {
        state.p.z = (value as u8) == 0;
        state.p.n = (value as u8) & 0x80 != 0;
    } else {
        state.p.z = value == 0;
        state.p.n = value & 0x8000 != 0;
    }
}

/// Runs one fetched-and-decoded instruction to completion. Every bus
/// access the instruction or its addressing mode performs ticks
/// `state.cycle_count` itself (see `bus::tick_read`/`tick_write`/
/// `tick_idle`); `dispatch` has nothing left to add afterward.
pub fn dispatch<B: Bus>(state: &mut CpuState, bus: &mut B, desc: OpDescriptor) {
    let is_write = matches!(
        desc.opcode,
        Opcode::STA | Opcode::STX | Opcode::STY | Opcode::STZ
            | Opcode::ASL | Opcode::LSR | Opcode::ROL | Opcode::ROR
            | Opcode::INC | Opcode::DEC | Opcode::TRB | Opcode::TSB
    );
    let resolved = crate::addressing::resolve(state, bus, desc.mode, is_write);

    match desc.opcode {
        Opcode::ADC => alu::adc(state, bus, desc.mode, &resolved),
        Opcode::SBC => alu::sbc(state, bus, desc.mode, &resolved),
        Opcode::AND => alu::logic(state, bus, desc.mode, &resolved, alu::LogicOp::And),
        Opcode::ORA => alu::logic(state, bus, desc.mode, &resolved, alu::LogicOp::Or),
        Opcode::EOR => alu::logic(state, bus, desc.mode, &resolved, alu::LogicOp::Xor),
        Opcode::BIT => alu::bit(state, bus, desc.mode, &resolved),
        Opcode::CMP => alu::compare(state, bus, desc.mode, &resolved, false),
        Opcode::CPX => alu::compare(state, bus, desc.mode, &resolved, true),
        Opcode::CPY => alu::compare(state, bus, desc.mode, &resolved, true),
        Opcode::TRB => alu::trb(state, bus, desc.mode, &resolved),
        Opcode::TSB => alu::tsb(state, bus, desc.mode, &resolved),

        Opcode::ASL => shift::asl(state, bus, desc.mode, &resolved),
        Opcode::LSR => shift::lsr(state, bus, desc.mode, &resolved),
        Opcode::ROL => shift::rol(state, bus, desc.mode, &resolved),
        Opcode::ROR => shift::ror(state, bus, desc.mode, &resolved),

        Opcode::LDA => load_store::load_a(state, bus, desc.mode, &resolved),
        Opcode::LDX => load_store::load_x(state, bus, desc.mode, &resolved),
        Opcode::LDY => load_store::load_y(state, bus, desc.mode, &resolved),
        Opcode::STA => load_store::store_a(state, bus, desc.mode, &resolved),
        Opcode::STX => load_store::store_x(state, bus, desc.mode, &resolved),
        Opcode::STY => load_store::store_y(state, bus, desc.mode, &resolved),
        Opcode::STZ => load_store::stz(state, bus, desc.mode, &resolved),
        Opcode::INC => load_store::inc(state, bus, desc.mode, &resolved),
        Opcode::DEC => load_store::dec(state, bus, desc.mode, &resolved),
        Opcode::INX => load_store::inx(state),
        Opcode::INY => load_store::iny(state),
        Opcode::DEX => load_store::dex(state),
        Opcode::DEY => load_store::dey(state),

        Opcode::BCC => branch::branch(state, bus, &resolved, !state.p.c),
        Opcode::BCS => branch::branch(state, bus, &resolved, state.p.c),
        Opcode::BEQ => branch::branch(state, bus, &resolved, state.p.z),
        Opcode::BNE => branch::branch(state, bus, &resolved, !state.p.z),
        Opcode::BMI => branch::branch(state, bus, &resolved, state.p.n),
        Opcode::BPL => branch::branch(state, bus, &resolved, !state.p.n),
        Opcode::BVC => branch::branch(state, bus, &resolved, !state.p.v),
        Opcode::BVS => branch::branch(state, bus, &resolved, state.p.v),
        Opcode::BRA => branch::branch(state, bus, &resolved, true),
        Opcode::BRL => branch::branch_long(state, &resolved),

        Opcode::CLC => flags::clc(state),
        Opcode::CLD => flags::cld(state),
        Opcode::CLI => flags::cli(state),
        Opcode::CLV => flags::clv(state),
        Opcode::SEC => flags::sec(state),
        Opcode::SED => flags::sed(state),
        Opcode::SEI => flags::sei(state),
        Opcode::REP => flags::rep(state, bus, desc.mode, &resolved),
        Opcode::SEP => flags::sep(state, bus, desc.mode, &resolved),

        Opcode::PHA => stack::pha(state, bus),
        Opcode::PHX => stack::phx(state, bus),
        Opcode::PHY => stack::phy(state, bus),
        Opcode::PHB => stack::phb(state, bus),
        Opcode::PHD => stack::phd(state, bus),
        Opcode::PHK => stack::phk(state, bus),
        Opcode::PHP => stack::php(state, bus),
        Opcode::PLA => stack::pla(state, bus),
        Opcode::PLX => stack::plx(state, bus),
        Opcode::PLY => stack::ply(state, bus),
        Opcode::PLB => stack::plb(state, bus),
        Opcode::PLD => stack::pld(state, bus),
        Opcode::PLP => stack::plp(state, bus),
        Opcode::PEA => stack::pea(state, bus),
        Opcode::PEI => stack::pei(state, bus),
        Opcode::PER => stack::per(state, bus),

        Opcode::TAX => transfer::tax(state),
        Opcode::TAY => transfer::tay(state),
        Opcode::TXA => transfer::txa(state),
        Opcode::TYA => transfer::tya(state),
        Opcode::TXY => transfer::txy(state),
        Opcode::TYX => transfer::tyx(state),
        Opcode::TSX => transfer::tsx(state),
        Opcode::TXS => transfer::txs(state),
        Opcode::TCD => transfer::tcd(state),
        Opcode::TDC => transfer::tdc(state),
        Opcode::TCS => transfer::tcs(state),
        Opcode::TSC => transfer::tsc(state),
        Opcode::XBA => transfer::xba(state),
        Opcode::XCE => transfer::xce(state),

        Opcode::MVN => block_move::mvn(state, bus),
        Opcode::MVP => block_move::mvp(state, bus),

        Opcode::JMP => jump::jmp(state, bus, desc.mode, &resolved),
        Opcode::JML => jump::jml(state, &resolved),
        Opcode::JSR => jump::jsr(state, bus, desc.mode, &resolved),
        Opcode::JSL => jump::jsl(state, bus, &resolved),
        Opcode::RTS => jump::rts(state, bus),
        Opcode::RTL => jump::rtl(state, bus),

        Opcode::BRK => interrupt_ops::brk(state, bus),
        Opcode::COP => interrupt_ops::cop(state, bus),
        Opcode::RTI => interrupt_ops::rti(state, bus),
        Opcode::WAI => interrupt_ops::wai(state),
        Opcode::STP => interrupt_ops::stp(state),
        Opcode::NOP => {}
        // Reserved two-byte no-op: the signature byte after the opcode
        // must still be fetched and discarded, or it gets decoded as the
        // next real instruction.
        Opcode::WDM => {
            let _ = fetch_value(state, bus, AddrMode::ImmediateByte, &resolved, false);
        }
    }
}
