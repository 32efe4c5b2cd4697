pub mod cpu;
pub mod error;
pub mod interrupts;
pub mod machine;
pub mod ppu;
pub mod state;

pub use error::CoreError;
pub use machine::{EmulationState, FaultPolicy, Machine, Model};
pub use state::SaveState;

/// Logical screen width in pixels for the DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;

/// Elementary clock ticks per machine quantum.
///
/// Four ticks form the indivisible instruction-fetch granularity; every
/// `step()` on the machine, CPU and PPU advances by exactly this amount.
pub const TICKS_PER_STEP: u32 = 4;

/// Elementary clock ticks in one full frame (154 lines x 456 ticks).
pub const TICKS_PER_FRAME: u32 = 70_224;
