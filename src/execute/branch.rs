//! The eight conditional branches plus BRA/BRL. Grounded in the teacher's
//! branch handling (`execute_instruction`'s `BCC`/`BEQ`/... arms covered
//! the conditions already; BVC/BVS and the page-crossing-in-emulation-
//! mode extra-cycle rule were not implemented there and are completed
//! here per spec §4.2's addressing-mode penalty table).

use crate::addressing::Resolved;
use crate::bus::{tick_idle, Bus};
use crate::state::CpuState;

pub(super) fn branch<B: Bus>(state: &mut CpuState, bus: &mut B, resolved: &Resolved, taken: bool) {
    if !taken {
        return;
    }
    let target = resolved.address.expect("relative addressing always resolves") as u16;
    let old_page = state.pc & 0xFF00;
    tick_idle(state, bus);
    if state.emulation_mode && (target & 0xFF00) != old_page {
        tick_idle(state, bus);
    }
    state.pc = target;
}

pub(super) fn branch_long(state: &mut CpuState, resolved: &Resolved) {
    let target = resolved.address.expect("relative-long addressing always resolves") as u16;
    state.pc = target;
}
