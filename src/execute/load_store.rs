//! LDA/LDX/LDY/STA/STX/STY/STZ and the register/memory increment-decrement
//! family. Generalized from the teacher's `LoadRegister`/`StoreRegister`-
//! shaped handling (`karstenes-snes/src/cpu.rs`), reusing `fetch_value`/
//! `store_value` for width selection instead of duplicating the
//! M/X-flag branch per opcode.

use crate::addressing::{AddrMode, Resolved};
use crate::bus::Bus;
use crate::state::CpuState;

use super::{fetch_value, set_zn, store_value};

pub(super) fn load_a<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    if state.p.m {
        state.a = (state.a & 0xFF00) | (value & 0x00FF);
    } else {
        state.a = value;
    }
    set_zn(state, state.a, state.p.m);
}

pub(super) fn load_x<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, true);
    state.x_reg = if state.p.x { value & 0x00FF } else { value };
    set_zn(state, state.x_reg, state.p.x);
}

pub(super) fn load_y<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, true);
    state.y_reg = if state.p.x { value & 0x00FF } else { value };
    set_zn(state, state.y_reg, state.p.x);
}

pub(super) fn store_a<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    store_value(state, bus, mode, resolved, state.a, false);
}

pub(super) fn store_x<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    store_value(state, bus, mode, resolved, state.x_reg, true);
}

pub(super) fn store_y<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    store_value(state, bus, mode, resolved, state.y_reg, true);
}

pub(super) fn stz<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    store_value(state, bus, mode, resolved, 0, false);
}

pub(super) fn inc<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let result = if state.p.m {
        ((value as u8).wrapping_add(1)) as u16
    } else {
        value.wrapping_add(1)
    };
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}

pub(super) fn dec<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let result = if state.p.m {
        ((value as u8).wrapping_sub(1)) as u16
    } else {
        value.wrapping_sub(1)
    };
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}

pub(super) fn inx(state: &mut CpuState) {
    state.x_reg = if state.p.x {
        (state.x_reg as u8).wrapping_add(1) as u16
    } else {
        state.x_reg.wrapping_add(1)
    };
    set_zn(state, state.x_reg, state.p.x);
}

pub(super) fn iny(state: &mut CpuState) {
    state.y_reg = if state.p.x {
        (state.y_reg as u8).wrapping_add(1) as u16
    } else {
        state.y_reg.wrapping_add(1)
    };
    set_zn(state, state.y_reg, state.p.x);
}

pub(super) fn dex(state: &mut CpuState) {
    state.x_reg = if state.p.x {
        (state.x_reg as u8).wrapping_sub(1) as u16
    } else {
        state.x_reg.wrapping_sub(1)
    };
    set_zn(state, state.x_reg, state.p.x);
}

pub(super) fn dey(state: &mut CpuState) {
    state.y_reg = if state.p.x {
        (state.y_reg as u8).wrapping_sub(1) as u16
    } else {
        state.y_reg.wrapping_sub(1)
    };
    set_zn(state, state.y_reg, state.p.x);
}
