//! famicore emulation core.
//!
//! This crate couples the cycle-stepped CPU and the dot-stepped PPU into
//! one deterministic machine. The master clock emits one step per PPU
//! dot; every third step carries a CPU slot, which the DMA arbiter may
//! steal for the sprite-DMA ($4014) or the sample-DMA (DMC fetches), with
//! the sample-DMA able to preempt the sprite-DMA mid-transfer. The
//! interaction ledger records the edges (VBlank, DMC-active, DMA
//! pause/resume) as monotone timestamps so producers and consumers agree
//! without callbacks.
//!
//! Collaborators - the cartridge mapper, the APU, and the input ports -
//! are supplied as trait objects at construction ([`Console::new`]); the
//! core never owns them conceptually, only drives their narrow hook
//! interfaces.
//!
//! ```no_run
//! use famicore_core::testing::{FlatCartridge, NullApu, NullInput};
//! use famicore_core::{Console, ConsoleVariant};
//!
//! let mut console = Console::new(
//!     ConsoleVariant::NtscFrontLoader,
//!     Box::new(FlatCartridge::new()),
//!     Box::new(NullApu::default()),
//!     Box::new(NullInput),
//! );
//! console.power_on();
//! console.step_frame();
//! ```

#![warn(missing_docs)]

mod bus;
mod clock;
mod console;
mod debug;
mod dma;
mod hooks;
mod ledger;
pub mod testing;
mod variant;

pub use bus::Bus;
pub use clock::{MasterClock, Step, DOTS_PER_SCANLINE};
pub use console::{Console, CoreError, FrameCallback, Snapshot};
pub use debug::{DebugIntent, IntentLog};
pub use dma::DmaArbiter;
pub use hooks::{Apu, DmcRequest, InputPort, Mapper};
pub use ledger::{edge_active, InteractionLedger, PauseSnapshot};
pub use variant::ConsoleVariant;

pub use famicore_cpu::{Cpu, CpuVariant, Status};
pub use famicore_ppu::{Mirroring, Ppu, PpuVariant};
