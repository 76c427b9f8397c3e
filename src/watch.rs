//! The scriptable memory-watch/event dispatcher (C7). None of this
//! exists in the teacher — `karstenes-snes` has no scripting system at
//! all — so the whole module is built fresh, grounded directly on
//! `original_source/Core/ScriptingContext.cpp` and `Core/ScriptHost.cpp`,
//! re-expressed in the teacher's idiom (struct-of-`Vec` instead of raw C
//! arrays, `Mutex` instead of `SimpleLock`). The C-style
//! `union { SnesMemoryType; uint32_t DirectAccess }` plus sentinel value
//! is replaced by the discriminated `CallbackKind` enum per the
//! redesign flag in spec §9.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use log::trace;

use crate::bus::{Bus, MappedType};
use crate::error::{CoreError, CoreResult};

const LOG_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackType {
    CpuRead,
    CpuWrite,
    CpuExec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuKind {
    Main,
    Sa1,
}

/// Replaces the original's `union { MemoryType; DirectAccess }` plus
/// `DIRECT_ACCESS_VALUE` sentinel with an explicit sum type (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Direct,
    Mapped(MappedType),
}

#[derive(Debug, Clone)]
pub struct MemoryCallback {
    pub start_address: u32,
    pub end_address: u32,
    pub requested_start: u32,
    pub requested_end: u32,
    pub kind: CallbackKind,
    pub cpu_type: CpuKind,
    pub reference: i32,
    /// Don't dedup this reference against other matching callbacks in
    /// the same dispatch pass. Independent from `direct_only` (spec §9
    /// Open Question: the original conflated the two).
    pub multi_reference: bool,
    /// Only ever install the direct-access callback; skip the
    /// mapped-region split in `register`.
    pub direct_only: bool,
}

/// Mirrors `RegisterEventCallback`'s event-kind discriminant; `num_enum`
/// gives us the `usize` conversion the dispatcher indexes with instead of
/// a hand-rolled `as usize` cast, matching the crate's declared stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(usize)]
pub enum EventKind {
    StartFrame,
    Reset,
    Irq,
}

const EVENT_KIND_COUNT: usize = 3;

pub struct SaveStateRegistry {
    slots: HashMap<i32, Vec<u8>>,
    pending_save: Option<i32>,
    pending_load: Option<i32>,
    state_loaded: bool,
}

impl SaveStateRegistry {
    pub fn new() -> Self {
        SaveStateRegistry {
            slots: HashMap::new(),
            pending_save: None,
            pending_load: None,
            state_loaded: false,
        }
    }

    /// Mirrors `RequestSaveState`: saves immediately if called from
    /// inside an exec-op callback, otherwise defers to the next frame
    /// boundary (the host calls `flush_pending` there) and clears any
    /// stale data for the slot in the meantime.
    pub fn request_save(&mut self, slot: i32, in_exec_op: bool, snapshot: impl FnOnce() -> Vec<u8>) {
        self.pending_save = Some(slot);
        if in_exec_op {
            self.slots.insert(slot, snapshot());
            self.pending_save = None;
        } else {
            self.slots.remove(&slot);
        }
    }

    pub fn request_load(
        &mut self,
        slot: i32,
        in_exec_op: bool,
        restore: impl FnOnce(&[u8]) -> bool,
    ) -> CoreResult<bool> {
        let Some(data) = self.slots.get(&slot) else {
            return Err(CoreError::SaveStateUnavailable(slot));
        };
        if in_exec_op {
            let ok = restore(data);
            if ok {
                self.state_loaded = true;
            }
            Ok(ok)
        } else {
            self.pending_load = Some(slot);
            Ok(true)
        }
    }

    /// Called once per frame boundary by the host to perform any save
    /// requested outside an exec-op event.
    pub fn flush_pending_save(&mut self, snapshot: impl FnOnce() -> Vec<u8>) {
        if let Some(slot) = self.pending_save.take() {
            self.slots.insert(slot, snapshot());
        }
    }

    pub fn flush_pending_load(&mut self, restore: impl FnOnce(&[u8]) -> bool) -> bool {
        if let Some(slot) = self.pending_load.take() {
            if let Some(data) = self.slots.get(&slot) {
                let ok = restore(data);
                if ok {
                    self.state_loaded = true;
                }
                return ok;
            }
        }
        false
    }

    pub fn check_state_loaded_flag(&mut self) -> bool {
        let loaded = self.state_loaded;
        self.state_loaded = false;
        loaded
    }

    pub fn data(&self, slot: i32) -> Option<&[u8]> {
        self.slots.get(&slot).map(|v| v.as_slice())
    }

    pub fn clear(&mut self, slot: i32) {
        self.slots.remove(&slot);
    }
}

impl Default for SaveStateRegistry {
    fn default() -> Self { Self::new() }
}

pub struct WatchDispatcher {
    callbacks: [Vec<MemoryCallback>; 3],
    event_callbacks: [Vec<i32>; EVENT_KIND_COUNT],
    log: Mutex<VecDeque<String>>,
    in_exec_op_event: bool,
    in_start_frame_event: bool,
    pub save_states: SaveStateRegistry,
}

impl WatchDispatcher {
    pub fn new() -> Self {
        WatchDispatcher {
            callbacks: [Vec::new(), Vec::new(), Vec::new()],
            event_callbacks: [Vec::new(), Vec::new(), Vec::new()],
            log: Mutex::new(VecDeque::new()),
            in_exec_op_event: false,
            in_start_frame_event: false,
            save_states: SaveStateRegistry::new(),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let mut rows = self.log.lock().expect("watch log mutex poisoned");
        rows.push_back(message.into());
        if rows.len() > LOG_CAP {
            rows.pop_front();
        }
    }

    pub fn log_snapshot(&self) -> String {
        let rows = self.log.lock().expect("watch log mutex poisoned");
        rows.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    pub fn in_exec_op_event(&self) -> bool { self.in_exec_op_event }
    pub fn in_start_frame_event(&self) -> bool { self.in_start_frame_event }

    fn index(t: CallbackType) -> usize {
        match t {
            CallbackType::CpuRead => 0,
            CallbackType::CpuWrite => 1,
            CallbackType::CpuExec => 2,
        }
    }

    /// Mirrors `RegisterMemoryCallback`. Always installs one direct
    /// callback covering `[start_addr, end_addr)`; unless `direct_only`,
    /// additionally splits the range at mapped-region-type boundaries so
    /// indirect accesses through the mapped region are caught too.
    ///
    /// Fixes the original's reliance on short-circuit evaluation order
    /// in its split loop (spec §9 Open Question): the final segment is
    /// always flushed once `addr` reaches `end_addr`, independent of
    /// whether a type change is also detected there.
    pub fn register(
        &mut self,
        bus: &impl Bus,
        t: CallbackType,
        mut start_addr: u32,
        mut end_addr: u32,
        cpu_type: CpuKind,
        reference: i32,
        direct_only: bool,
        multi_reference: bool,
    ) {
        if end_addr < start_addr {
            return;
        }
        if start_addr == 0 && end_addr == 0 {
            start_addr = 0;
            end_addr = 0xFFFFFF;
        }

        self.callbacks[Self::index(t)].push(MemoryCallback {
            start_address: start_addr,
            end_address: end_addr,
            requested_start: start_addr,
            requested_end: end_addr,
            kind: CallbackKind::Direct,
            cpu_type,
            reference,
            multi_reference,
            direct_only,
        });

        if direct_only {
            return;
        }

        let Some((mut current_type, mut segment_mapped_start)) = bus.absolute_address(start_addr) else {
            return;
        };
        let mut last_mapped_end = segment_mapped_start;

        for addr in (start_addr + 1)..=end_addr {
            let resolved = if addr < end_addr { bus.absolute_address(addr) } else { None };
            let type_changed = match resolved {
                Some((t, _)) => t != current_type,
                None => true,
            };
            let at_end = addr == end_addr;

            if at_end || type_changed {
                self.callbacks[Self::index(t)].push(MemoryCallback {
                    start_address: segment_mapped_start,
                    end_address: last_mapped_end + 1,
                    requested_start: start_addr,
                    requested_end: end_addr,
                    kind: CallbackKind::Mapped(current_type),
                    cpu_type,
                    reference,
                    multi_reference,
                    direct_only,
                });

                if !at_end {
                    if let Some((t, a)) = resolved {
                        current_type = t;
                        segment_mapped_start = a;
                    }
                }
            }

            if let Some((_, a)) = resolved {
                last_mapped_end = a;
            }
        }
    }

    /// Mirrors `UnregisterMemoryCallback`: removes every stored record
    /// matching `(reference, cpu_type, requested_start, requested_end)`,
    /// stopping after the first match when `direct_only`. Silently a
    /// no-op on no match, per spec.
    pub fn unregister(
        &mut self,
        t: CallbackType,
        mut start_addr: u32,
        mut end_addr: u32,
        cpu_type: CpuKind,
        reference: i32,
        direct_only: bool,
    ) {
        if end_addr < start_addr {
            return;
        }
        if start_addr == 0 && end_addr == 0 {
            end_addr = 0xFFFFFF;
        }
        let list = &mut self.callbacks[Self::index(t)];
        let mut i = 0;
        while i < list.len() {
            let matches = list[i].reference == reference
                && list[i].cpu_type == cpu_type
                && list[i].requested_start == start_addr
                && list[i].requested_end == end_addr;
            if matches {
                list.remove(i);
                if direct_only {
                    break;
                }
            } else {
                i += 1;
            }
        }
    }

    pub fn register_event_callback(&mut self, kind: EventKind, reference: i32) {
        self.event_callbacks[usize::from(kind)].push(reference);
    }

    pub fn unregister_event_callback(&mut self, kind: EventKind, reference: i32) {
        self.event_callbacks[usize::from(kind)].retain(|r| *r != reference);
    }

    pub fn event_callbacks(&self, kind: EventKind) -> &[i32] {
        &self.event_callbacks[usize::from(kind)]
    }

    /// Mirrors `CallMemoryCallback`: dedups by `reference` within this
    /// dispatch pass unless `multi_reference` is set, and matches either
    /// a direct hit on the requested range or a mapped-region hit.
    pub fn dispatch(
        &mut self,
        bus: &impl Bus,
        addr: u32,
        cpu_type: CpuKind,
        t: CallbackType,
        mut on_match: impl FnMut(i32),
    ) {
        if self.callbacks[Self::index(t)].is_empty() {
            return;
        }
        let mapped = bus.absolute_address(addr);
        self.in_exec_op_event = t == CallbackType::CpuExec;

        let mut visited: Vec<i32> = Vec::new();
        for callback in &self.callbacks[Self::index(t)] {
            if callback.cpu_type != cpu_type {
                continue;
            }
            let direct_hit = callback.requested_start <= addr && addr < callback.requested_end;
            let mapped_hit = match (callback.kind, mapped) {
                (CallbackKind::Mapped(kind), Some((mt, off))) => {
                    kind == mt && callback.start_address <= off && off < callback.end_address
                }
                _ => false,
            };
            if !(direct_hit || mapped_hit) {
                continue;
            }
            if !callback.multi_reference {
                if visited.contains(&callback.reference) {
                    continue;
                }
                visited.push(callback.reference);
            }
            trace!(target: "watch", "dispatch {:?} addr={:#08x} reference={}", t, addr, callback.reference);
            on_match(callback.reference);
        }
        self.in_exec_op_event = false;
    }
}

impl Default for WatchDispatcher {
    fn default() -> Self { Self::new() }
}

/// External hook CORE calls into when a host-provided scripting language
/// needs to load a script. CORE never embeds a scripting runtime (out of
/// scope); this is the external interface `ScriptHost::LoadScript`
/// grounds, narrowed to a boolean success contract per spec §6/§7.
pub trait ScriptLoader {
    fn load_script(&mut self, name: &str, source: &str) -> bool;
}

pub fn load_script(loader: &mut impl ScriptLoader, name: &str, source: &str) -> CoreResult<()> {
    if loader.load_script(name, source) {
        Ok(())
    } else {
        Err(CoreError::ScriptLoadFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::AccessKind;

    struct TestBus {
        mem: Vec<u8>,
    }

    impl Bus for TestBus {
        fn read(&mut self, addr: u32, _kind: AccessKind) -> u8 {
            self.mem[addr as usize % self.mem.len()]
        }
        fn write(&mut self, addr: u32, value: u8, _kind: AccessKind) {
            let len = self.mem.len();
            self.mem[addr as usize % len] = value;
        }
        fn idle(&mut self) {}
        fn absolute_address(&self, addr: u32) -> Option<(MappedType, u32)> {
            if addr < 0x2000 {
                Some((MappedType(0), addr))
            } else if addr < 0x8000 {
                Some((MappedType(1), addr - 0x2000))
            } else {
                Some((MappedType(2), addr - 0x8000))
            }
        }
    }

    fn bus() -> TestBus {
        TestBus { mem: vec![0u8; 0x10000] }
    }

    #[test]
    fn register_splits_at_region_boundary() {
        let mut dispatcher = WatchDispatcher::new();
        let b = bus();
        dispatcher.register(&b, CallbackType::CpuRead, 0x1F00, 0x2100, CpuKind::Main, 1, false, false);
        let mapped: Vec<_> = dispatcher.callbacks[0]
            .iter()
            .filter(|c| matches!(c.kind, CallbackKind::Mapped(_)))
            .collect();
        assert_eq!(mapped.len(), 2, "range straddling 0x2000 should split into two mapped segments");
    }

    #[test]
    fn dispatch_dedups_by_reference_unless_multi() {
        let mut dispatcher = WatchDispatcher::new();
        let b = bus();
        dispatcher.register(&b, CallbackType::CpuRead, 0x10, 0x20, CpuKind::Main, 7, true, false);
        dispatcher.register(&b, CallbackType::CpuRead, 0x10, 0x20, CpuKind::Main, 7, true, false);
        let mut hits = 0;
        dispatcher.dispatch(&b, 0x15, CpuKind::Main, CallbackType::CpuRead, |_| hits += 1);
        assert_eq!(hits, 1);
    }

    #[test]
    fn dispatch_allows_repeat_when_multi_reference() {
        let mut dispatcher = WatchDispatcher::new();
        let b = bus();
        dispatcher.register(&b, CallbackType::CpuRead, 0x10, 0x20, CpuKind::Main, 7, true, true);
        dispatcher.register(&b, CallbackType::CpuRead, 0x10, 0x20, CpuKind::Main, 7, true, true);
        let mut hits = 0;
        dispatcher.dispatch(&b, 0x15, CpuKind::Main, CallbackType::CpuRead, |_| hits += 1);
        assert_eq!(hits, 2);
    }

    #[test]
    fn unregister_removes_matching_reference_only() {
        let mut dispatcher = WatchDispatcher::new();
        let b = bus();
        dispatcher.register(&b, CallbackType::CpuWrite, 0x10, 0x20, CpuKind::Main, 1, true, false);
        dispatcher.register(&b, CallbackType::CpuWrite, 0x10, 0x20, CpuKind::Main, 2, true, false);
        dispatcher.unregister(CallbackType::CpuWrite, 0x10, 0x20, CpuKind::Main, 1, true);
        assert_eq!(dispatcher.callbacks[1].len(), 1);
        assert_eq!(dispatcher.callbacks[1][0].reference, 2);
    }

    #[test]
    fn log_caps_at_500_lines() {
        let dispatcher = WatchDispatcher::new();
        for i in 0..600 {
            dispatcher.log(format!("line {i}"));
        }
        let rows = dispatcher.log.lock().unwrap();
        assert_eq!(rows.len(), LOG_CAP);
        assert_eq!(rows.front().unwrap(), "line 100");
    }

    #[test]
    fn save_state_immediate_inside_exec_op() {
        let mut registry = SaveStateRegistry::new();
        registry.request_save(3, true, || vec![1, 2, 3]);
        assert_eq!(registry.data(3), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn save_state_deferred_outside_exec_op() {
        let mut registry = SaveStateRegistry::new();
        registry.request_save(3, false, || vec![9, 9]);
        assert_eq!(registry.data(3), None);
        registry.flush_pending_save(|| vec![9, 9]);
        assert_eq!(registry.data(3), Some(&[9u8, 9][..]));
    }
}
