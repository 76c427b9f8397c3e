//! Addressing-mode resolution (component C3). Mode variants and the
//! overall shape of effective-address computation are grounded in the
//! teacher's `AddrMode` enum and `calculate_address`, generalized to read
//! through `Bus` instead of `&Console` and to report cycle-penalty flags
//! the executor folds into the final instruction cost, per spec §4.2.

use crate::bus::{tick_idle, tick_read, AccessKind, Bus};
use crate::state::CpuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    /// Width depends on the relevant M/X flag at decode time.
    ImmediateM,
    ImmediateX,
    /// Always one byte regardless of M/X (REP, SEP, WDM signature byte).
    ImmediateByte,
    Direct,
    DirectIndexedX,
    DirectIndexedY,
    DirectIndirect,
    DirectIndexedIndirectX,
    DirectIndirectIndexedY,
    DirectIndirectLong,
    DirectIndirectLongIndexedY,
    Absolute,
    AbsoluteIndexedX,
    AbsoluteIndexedY,
    AbsoluteLong,
    AbsoluteLongIndexedX,
    /// JMP (a)
    AbsoluteIndirect,
    /// JML [a]
    AbsoluteIndirectLong,
    /// JMP/JSR (a,x)
    AbsoluteIndexedIndirectX,
    StackRelative,
    StackRelativeIndirectIndexedY,
    Relative,
    RelativeLong,
    BlockMove,
    /// JSR/JSL/RTS/RTL/PHx/PLx/BRK/COP/PEA/PEI/PER targets: the operand
    /// bytes are fetched inline but there is no "effective address" to
    /// resolve the way a data access has one.
    Stack,
}

/// What an addressing-mode resolution produced: the effective address (or
/// none for implied/accumulator/stack-flavoured modes), the raw operand
/// bytes consumed (for immediate and relative modes), and whether a page
/// boundary was crossed (read-penalty) or this access always costs an
/// extra cycle (write-penalty), per the table in spec §4.2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolved {
    pub address: Option<u32>,
    pub page_crossed: bool,
    pub direct_page_penalty: bool,
}

fn direct_page_low_nonzero(state: &CpuState) -> bool {
    state.d & 0x00FF != 0
}

/// Reads one operand byte from the instruction stream (PC, incrementing).
fn fetch_operand_byte<B: Bus>(state: &mut CpuState, bus: &mut B) -> u8 {
    let addr = state.full_pc();
    let value = tick_read(state, bus, addr, AccessKind::Fetch);
    state.pc = state.pc.wrapping_add(1);
    value
}

fn fetch_operand_word<B: Bus>(state: &mut CpuState, bus: &mut B) -> u16 {
    let lo = fetch_operand_byte(state, bus);
    let hi = fetch_operand_byte(state, bus);
    u16::from_le_bytes([lo, hi])
}

fn fetch_operand_long<B: Bus>(state: &mut CpuState, bus: &mut B) -> u32 {
    let lo = fetch_operand_byte(state, bus);
    let mid = fetch_operand_byte(state, bus);
    let hi = fetch_operand_byte(state, bus);
    u32::from_le_bytes([lo, mid, hi, 0])
}

fn read_word<B: Bus>(state: &mut CpuState, bus: &mut B, addr: u32, kind: AccessKind) -> u16 {
    let lo = tick_read(state, bus, addr, kind);
    let hi = tick_read(state, bus, addr.wrapping_add(1), kind);
    u16::from_le_bytes([lo, hi])
}

fn read_long<B: Bus>(state: &mut CpuState, bus: &mut B, addr: u32, kind: AccessKind) -> u32 {
    let lo = tick_read(state, bus, addr, kind);
    let mid = tick_read(state, bus, addr.wrapping_add(1), kind);
    let hi = tick_read(state, bus, addr.wrapping_add(2), kind);
    u32::from_le_bytes([lo, mid, hi, 0])
}

/// Resolves `mode` against the instruction stream and register file,
/// advancing `state.pc` past the operand bytes and performing whatever
/// bus cycles the addressing mode itself requires (direct-page dummy
/// read, indirection fetches). The caller's opcode handler performs the
/// final data read/write; this only computes *where*.
pub fn resolve<B: Bus>(
    state: &mut CpuState,
    bus: &mut B,
    mode: AddrMode,
    is_write: bool,
) -> Resolved {
    match mode {
        AddrMode::Implied | AddrMode::Accumulator | AddrMode::Stack => Resolved::default(),

        AddrMode::ImmediateM | AddrMode::ImmediateX | AddrMode::ImmediateByte => {
            // Operand consumption (1 or 2 bytes) is handled by the
            // executor, which knows the exact width; addressing only
            // hands back "no address" (the value lives in the stream).
            Resolved::default()
        }

        AddrMode::Direct => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            let addr = if state.emulation_mode && state.d & 0xFF00 == 0 {
                (state.d.wrapping_add(offset as u16)) as u32 & 0xFFFF
            } else {
                state.d.wrapping_add(offset as u16) as u32
            };
            Resolved {
                address: Some(addr),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndexedX => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            tick_idle(state, bus);
            let base = state.d.wrapping_add(offset as u16);
            let addr = base.wrapping_add(state.x_reg) as u32;
            Resolved {
                address: Some(addr & 0xFFFF),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndexedY => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            tick_idle(state, bus);
            let base = state.d.wrapping_add(offset as u16);
            let addr = base.wrapping_add(state.y_reg) as u32;
            Resolved {
                address: Some(addr & 0xFFFF),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndirect => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            let dp_addr = state.d.wrapping_add(offset as u16) as u32;
            let ptr = read_word(state, bus, dp_addr, AccessKind::Internal);
            let addr = ((state.dbr as u32) << 16) | ptr as u32;
            Resolved {
                address: Some(addr),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndexedIndirectX => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            tick_idle(state, bus);
            let dp_addr = (state.d.wrapping_add(offset as u16).wrapping_add(state.x_reg)) as u32;
            let ptr = read_word(state, bus, dp_addr, AccessKind::Internal);
            let addr = ((state.dbr as u32) << 16) | ptr as u32;
            Resolved {
                address: Some(addr),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndirectIndexedY => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            let dp_addr = state.d.wrapping_add(offset as u16) as u32;
            let ptr = read_word(state, bus, dp_addr, AccessKind::Internal);
            let base = ((state.dbr as u32) << 16) + ptr as u32;
            let addr = base.wrapping_add(state.y_reg as u32);
            let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
            if page_crossed || is_write {
                tick_idle(state, bus);
            }
            Resolved {
                address: Some(addr),
                page_crossed,
                direct_page_penalty: direct_page_low_nonzero(state),
            }
        }

        AddrMode::DirectIndirectLong => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            let dp_addr = state.d.wrapping_add(offset as u16) as u32;
            let addr = read_long(state, bus, dp_addr, AccessKind::Internal);
            Resolved {
                address: Some(addr),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::DirectIndirectLongIndexedY => {
            let offset = fetch_operand_byte(state, bus);
            if direct_page_low_nonzero(state) {
                tick_idle(state, bus);
            }
            let dp_addr = state.d.wrapping_add(offset as u16) as u32;
            let base = read_long(state, bus, dp_addr, AccessKind::Internal);
            let addr = base.wrapping_add(state.y_reg as u32);
            Resolved {
                address: Some(addr),
                direct_page_penalty: direct_page_low_nonzero(state),
                ..Default::default()
            }
        }

        AddrMode::Absolute => {
            let offset = fetch_operand_word(state, bus);
            let addr = ((state.dbr as u32) << 16) | offset as u32;
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::AbsoluteIndexedX => {
            let offset = fetch_operand_word(state, bus);
            let base = ((state.dbr as u32) << 16) + offset as u32;
            let addr = base.wrapping_add(state.x_reg as u32);
            let page_crossed = (base & 0xFF0000) != (addr & 0xFF0000)
                || (base & 0xFF00) != (addr & 0xFF00);
            if page_crossed || is_write {
                tick_idle(state, bus);
            }
            Resolved { address: Some(addr), page_crossed, ..Default::default() }
        }

        AddrMode::AbsoluteIndexedY => {
            let offset = fetch_operand_word(state, bus);
            let base = ((state.dbr as u32) << 16) + offset as u32;
            let addr = base.wrapping_add(state.y_reg as u32);
            let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
            if page_crossed || is_write {
                tick_idle(state, bus);
            }
            Resolved { address: Some(addr), page_crossed, ..Default::default() }
        }

        AddrMode::AbsoluteLong => {
            let addr = fetch_operand_long(state, bus);
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::AbsoluteLongIndexedX => {
            let base = fetch_operand_long(state, bus);
            let addr = base.wrapping_add(state.x_reg as u32);
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::AbsoluteIndirect => {
            let offset = fetch_operand_word(state, bus);
            let ptr = read_word(state, bus, offset as u32, AccessKind::Internal);
            Resolved { address: Some(((state.pbr as u32) << 16) | ptr as u32), ..Default::default() }
        }

        AddrMode::AbsoluteIndirectLong => {
            let offset = fetch_operand_word(state, bus);
            let addr = read_long(state, bus, offset as u32, AccessKind::Internal);
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::AbsoluteIndexedIndirectX => {
            let offset = fetch_operand_word(state, bus);
            tick_idle(state, bus);
            let ptr_addr = ((state.pbr as u32) << 16) + offset.wrapping_add(state.x_reg) as u32;
            let ptr = read_word(state, bus, ptr_addr, AccessKind::Internal);
            Resolved { address: Some(((state.pbr as u32) << 16) | ptr as u32), ..Default::default() }
        }

        AddrMode::StackRelative => {
            let offset = fetch_operand_byte(state, bus);
            tick_idle(state, bus);
            let addr = state.full_s().wrapping_add(offset as u16) as u32;
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::StackRelativeIndirectIndexedY => {
            let offset = fetch_operand_byte(state, bus);
            tick_idle(state, bus);
            let dp_addr = state.full_s().wrapping_add(offset as u16) as u32;
            let ptr = read_word(state, bus, dp_addr, AccessKind::Internal);
            tick_idle(state, bus);
            let addr = (((state.dbr as u32) << 16) + ptr as u32).wrapping_add(state.y_reg as u32);
            Resolved { address: Some(addr), ..Default::default() }
        }

        AddrMode::Relative => {
            let offset = fetch_operand_byte(state, bus) as i8;
            let base = state.pc as i32;
            let target = (base + offset as i32) as u16;
            Resolved { address: Some(((state.pbr as u32) << 16) | target as u32), ..Default::default() }
        }

        AddrMode::RelativeLong => {
            let offset = fetch_operand_word(state, bus) as i16;
            let base = state.pc as i32;
            let target = (base + offset as i32) as u16;
            Resolved { address: Some(((state.pbr as u32) << 16) | target as u32), ..Default::default() }
        }

        AddrMode::BlockMove => {
            // Both bank bytes are consumed by the MVN/MVP handler itself
            // (it needs both in source/dest order, not a combined
            // address); addressing just leaves PC pointing at them.
            Resolved::default()
        }
    }
}
