//! MVN/MVP. The teacher never implemented these. Real 65C816 hardware
//! transfers exactly one byte per execution of the opcode and then, if
//! the transfer count (A) hasn't wrapped to `0xFFFF`, backs PC up onto
//! the opcode itself so the next fetch-decode-execute cycle repeats it —
//! which is also exactly how interrupts get sampled between bytes of a
//! block move (each repeat is an ordinary instruction-boundary sample).
//! This module reproduces that one-byte-per-dispatch behavior rather
//! than looping the whole transfer inside a single call, so `cpu.rs`'s
//! normal per-step interrupt sampling applies unchanged.

use crate::bus::{tick_idle, tick_read, tick_write, AccessKind, Bus};
use crate::state::CpuState;

fn step_registers(state: &mut CpuState, increment: bool) {
    if increment {
        state.x_reg = state.x_reg.wrapping_add(1);
        state.y_reg = state.y_reg.wrapping_add(1);
    } else {
        state.x_reg = state.x_reg.wrapping_sub(1);
        state.y_reg = state.y_reg.wrapping_sub(1);
    }
    if state.p.x {
        state.x_reg &= 0x00FF;
        state.y_reg &= 0x00FF;
    }
    state.a = state.a.wrapping_sub(1);
}

fn transfer<B: Bus>(state: &mut CpuState, bus: &mut B, increment: bool) {
    let dst_bank = tick_read(state, bus, state.full_pc(), AccessKind::Fetch);
    state.pc = state.pc.wrapping_add(1);
    let src_bank = tick_read(state, bus, state.full_pc(), AccessKind::Fetch);
    state.pc = state.pc.wrapping_add(1);

    state.dbr = dst_bank;

    let src_addr = ((src_bank as u32) << 16) | state.x_reg as u32;
    let dst_addr = ((dst_bank as u32) << 16) | state.y_reg as u32;
    let value = tick_read(state, bus, src_addr, AccessKind::Read);
    tick_write(state, bus, dst_addr, value, AccessKind::Write);
    tick_idle(state, bus);

    step_registers(state, increment);

    if state.a != 0xFFFF {
        // Not done: rewind onto the opcode byte (1) + the two bank bytes
        // (2) just consumed, so the next step() re-dispatches this MVN/MVP.
        state.pc = state.pc.wrapping_sub(3);
    }
}

pub(super) fn mvn<B: Bus>(state: &mut CpuState, bus: &mut B) {
    transfer(state, bus, true);
}

pub(super) fn mvp<B: Bus>(state: &mut CpuState, bus: &mut B) {
    transfer(state, bus, false);
}
