//! ASL/LSR/ROL/ROR, generalized from the teacher's accumulator/memory
//! shift handling to go through `fetch_value`/`store_value` uniformly for
//! both the accumulator and memory addressing modes.

use crate::addressing::{AddrMode, Resolved};
use crate::bus::Bus;
use crate::state::CpuState;

use super::{fetch_value, set_zn, store_value};

pub(super) fn asl<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let (result, carry) = if state.p.m {
        let v = value as u8;
        (((v << 1) as u16) & 0x00FF, v & 0x80 != 0)
    } else {
        (value << 1, value & 0x8000 != 0)
    };
    state.p.c = carry;
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}

pub(super) fn lsr<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let carry = value & 1 != 0;
    let result = if state.p.m { (value as u8 >> 1) as u16 } else { value >> 1 };
    state.p.c = carry;
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}

pub(super) fn rol<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let carry_in = state.p.c as u16;
    let (result, carry_out) = if state.p.m {
        let v = value as u8;
        let r = ((v << 1) | carry_in as u8) as u16 & 0x00FF;
        (r, v & 0x80 != 0)
    } else {
        let r = (value << 1) | carry_in;
        (r, value & 0x8000 != 0)
    };
    state.p.c = carry_out;
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}

pub(super) fn ror<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let value = fetch_value(state, bus, mode, resolved, false);
    let carry_in = state.p.c;
    let carry_out = value & 1 != 0;
    let result = if state.p.m {
        let v = value as u8;
        (((v >> 1) | if carry_in { 0x80 } else { 0 }) as u16) & 0x00FF
    } else {
        (value >> 1) | if carry_in { 0x8000 } else { 0 }
    };
    state.p.c = carry_out;
    store_value(state, bus, mode, resolved, result, false);
    set_zn(state, result, state.p.m);
}
