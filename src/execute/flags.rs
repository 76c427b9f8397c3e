//! Set/clear-flag instructions and REP/SEP. The teacher implemented
//! CLC/SEC only; the rest (CLD/CLI/CLV/SED/SEI) and REP/SEP's bitmask
//! semantics are built out here.

use crate::addressing::{AddrMode, Resolved};
use crate::bus::Bus;
use crate::state::CpuState;

use super::fetch_value;

pub(super) fn clc(state: &mut CpuState) { state.p.c = false; }
pub(super) fn sec(state: &mut CpuState) { state.p.c = true; }
pub(super) fn cld(state: &mut CpuState) { state.p.d = false; }
pub(super) fn sed(state: &mut CpuState) { state.p.d = true; }
pub(super) fn cli(state: &mut CpuState) { state.p.i = false; }
pub(super) fn sei(state: &mut CpuState) { state.p.i = true; }
pub(super) fn clv(state: &mut CpuState) { state.p.v = false; }

fn apply_mask(state: &mut CpuState, mask: u8, set: bool) {
    if mask & 0x80 != 0 { state.p.n = set; }
    if mask & 0x40 != 0 { state.p.v = set; }
    if mask & 0x20 != 0 { state.p.m = set; }
    if mask & 0x10 != 0 { state.p.x = set; }
    if mask & 0x08 != 0 { state.p.d = set; }
    if mask & 0x04 != 0 { state.p.i = set; }
    if mask & 0x02 != 0 { state.p.z = set; }
    if mask & 0x01 != 0 { state.p.c = set; }
    if state.emulation_mode {
        state.p.m = true;
        state.p.x = true;
    }
    state.enforce_width_invariants();
}

pub(super) fn rep<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let mask = fetch_value(state, bus, mode, resolved, false) as u8;
    apply_mask(state, mask, false);
}

pub(super) fn sep<B: Bus>(state: &mut CpuState, bus: &mut B, mode: AddrMode, resolved: &Resolved) {
    let mask = fetch_value(state, bus, mode, resolved, false) as u8;
    apply_mask(state, mask, true);
}
