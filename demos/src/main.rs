//! Minimal CLI harness: loads a flat binary blob into an in-memory `Bus`,
//! points the CPU at the RESET vector (or a `--pc` override), and
//! single-steps it for a fixed number of instructions, logging register
//! state per step. Grounded in `karstenes-snes/src/main.rs`'s argument
//! handling and ROM-load-then-run shape, minus the ratatui debugger UI
//! and cartridge/mapper parsing (both out of scope for this crate).

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use wdc65c816_core::bus::{AccessKind, Bus, MappedType};
use wdc65c816_core::{Cpu, CpuState};

#[derive(Parser, Debug)]
#[command(about = "Single-steps a flat binary through the wdc65c816-core interpreter")]
struct Args {
    /// Path to a flat binary blob (no header) to load into memory.
    path: PathBuf,

    /// Address the blob is loaded at, e.g. "8000" or "0x8000".
    #[arg(long, default_value = "8000", value_parser = parse_hex_u32)]
    org: u32,

    /// Override the entry PC instead of reading it from the RESET vector.
    #[arg(long, value_parser = parse_hex_u32)]
    pc: Option<u32>,

    /// Number of instructions to step before exiting.
    #[arg(long, default_value_t = 100)]
    steps: u64,
}

fn parse_hex_u32(s: &str) -> Result<u32, std::num::ParseIntError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(s, 16)
}

/// A bare 16MB address space with no mirroring or mapping. Every address
/// reports the same `MappedType`, so watch registrations never split.
struct FlatBus {
    mem: Vec<u8>,
}

impl FlatBus {
    fn new() -> Self {
        FlatBus { mem: vec![0u8; 0x100_0000] }
    }

    fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.mem[(addr as usize + i) & 0x00FF_FFFF] = *b;
        }
    }
}

impl Bus for FlatBus {
    fn read(&mut self, addr: u32, kind: AccessKind) -> u8 {
        let value = self.mem[addr as usize & 0x00FF_FFFF];
        log::trace!("read  {:#08x} = {:#04x} ({:?})", addr, value, kind);
        value
    }

    fn write(&mut self, addr: u32, value: u8, kind: AccessKind) {
        log::trace!("write {:#08x} = {:#04x} ({:?})", addr, value, kind);
        self.mem[addr as usize & 0x00FF_FFFF] = value;
    }

    fn idle(&mut self) {}

    fn absolute_address(&self, addr: u32) -> Option<(MappedType, u32)> {
        Some((MappedType(0), addr & 0x00FF_FFFF))
    }
}

fn format_state(state: &CpuState) -> String {
    format!(
        "PC={:02X}:{:04X} A={:04X} X={:04X} Y={:04X} S={:04X} D={:04X} DBR={:02X} P={:02X} E={} cyc={}",
        state.pbr,
        state.pc,
        state.a,
        state.x_reg,
        state.y_reg,
        state.s,
        state.d,
        state.dbr,
        state.p_byte(),
        state.emulation_mode as u8,
        state.cycle_count,
    )
}

fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    let blob = fs::read(&args.path).expect("failed to read input blob");

    let mut bus = FlatBus::new();
    bus.load(args.org, &blob);

    let mut cpu = Cpu::new(bus);
    cpu.power_on();

    if let Some(pc) = args.pc {
        cpu.state.pc = pc as u16;
        cpu.state.pbr = (pc >> 16) as u8;
    }

    info!("start: {}", format_state(&cpu.state));
    for step in 0..args.steps {
        if cpu.state.stopped {
            info!("stopped at step {step}");
            break;
        }
        cpu.step();
        info!("step {step}: {}", format_state(&cpu.state));
    }
}
