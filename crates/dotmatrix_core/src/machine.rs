//! Top-level machine: owns the CPU and system bus and drives both from the
//! master clock, one 4-tick quantum at a time.

use crate::cpu::Cpu;
use crate::error::CoreError;
use crate::state::{check_len, SaveState};
use crate::{TICKS_PER_FRAME, TICKS_PER_STEP};

pub mod bus;
pub mod cartridge;


pub use bus::SystemBus;
pub use cartridge::{Cartridge, FlatCartridge};

/// Machine quanta in one full frame (17 556).
pub const QUANTA_PER_FRAME: u32 = TICKS_PER_FRAME / TICKS_PER_STEP;

/// Hardware profile, selected once at construction. One build supports
/// every profile; the choice only affects the post-boot register pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Model {
    #[default]
    Dmg,
    Cgb,
}

/// Host-facing run state of the machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmulationState {
    #[default]
    Running,
    Paused,
    /// Terminal: emulation has shut down and pending cartridge RAM has
    /// been flushed.
    Stopping,
}

/// What the clock driver does when the CPU faults on an illegal opcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Stop the machine and surface the error to the host.
    #[default]
    Abort,
    /// Log the fault and keep stepping; the offending opcode executes as
    /// a NOP.
    LogAndContinue,
}

pub struct Machine {
    pub cpu: Cpu,
    pub bus: SystemBus,
    model: Model,
    state: EmulationState,
    fault_policy: FaultPolicy,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(Model::Dmg)
    }
}

impl Machine {
    pub fn new(model: Model) -> Self {
        Self {
            cpu: Cpu::new(model),
            bus: SystemBus::default(),
            model,
            state: EmulationState::Running,
            fault_policy: FaultPolicy::Abort,
        }
    }

    /// Load a flat (mapper-less) ROM image and reset the CPU.
    pub fn load_rom(&mut self, rom: Vec<u8>) {
        self.bus.set_cartridge(Box::new(FlatCartridge::new(rom)));
        self.cpu.reset(self.model);
    }

    /// Load a cartridge behind the mapper seam and reset the CPU.
    pub fn load_cartridge(&mut self, cartridge: Box<dyn Cartridge>) {
        self.bus.set_cartridge(cartridge);
        self.cpu.reset(self.model);
    }

    pub fn set_fault_policy(&mut self, policy: FaultPolicy) {
        self.fault_policy = policy;
    }

    /// Advance the whole machine by one quantum: bus-side collaborators
    /// first (peripherals, then PPU), then the CPU's slice.
    ///
    /// A no-op unless the machine is running.
    pub fn step(&mut self) -> Result<(), CoreError> {
        if self.state != EmulationState::Running {
            return Ok(());
        }

        self.bus.tick_quantum();
        match self.cpu.step(&mut self.bus) {
            Ok(()) => Ok(()),
            Err(err) => match self.fault_policy {
                FaultPolicy::Abort => {
                    self.shut_down();
                    Err(err)
                }
                FaultPolicy::LogAndContinue => {
                    // The CPU already logged the full register context.
                    log::warn!("continuing past fault: {err}");
                    Ok(())
                }
            },
        }
    }

    /// Run one full frame's worth of quanta (exactly 70 224 ticks).
    ///
    /// Pausing or stopping mid-frame ends the call early.
    pub fn step_frame(&mut self) -> Result<(), CoreError> {
        for _ in 0..QUANTA_PER_FRAME {
            if self.state != EmulationState::Running {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Suspend stepping without losing any state.
    pub fn pause(&mut self) {
        if self.state == EmulationState::Running {
            self.state = EmulationState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == EmulationState::Paused {
            self.state = EmulationState::Running;
        }
    }

    /// Shut the machine down. Battery-backed cartridge RAM is flushed;
    /// further stepping is a no-op.
    pub fn stop(&mut self) {
        if self.state != EmulationState::Stopping {
            self.shut_down();
        }
    }

    fn shut_down(&mut self) {
        self.state = EmulationState::Stopping;
        self.bus.flush_cartridge();
        log::info!(
            "machine stopped after {} frames",
            self.bus.ppu.frames_presented()
        );
    }

    #[inline]
    pub fn state(&self) -> EmulationState {
        self.state
    }

    #[inline]
    pub fn model(&self) -> Model {
        self.model
    }

    /// The most recently completed frame (see [`crate::ppu::Ppu::frame`]).
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu.frame()
    }

    pub fn frames_presented(&self) -> u64 {
        self.bus.ppu.frames_presented()
    }

    /// Install a per-frame callback fired at the VBlank wrap with the
    /// completed framebuffer.
    pub fn set_frame_callback(&mut self, callback: impl FnMut(&[u8]) + 'static) {
        self.bus.ppu.set_frame_callback(callback);
    }
}

impl SaveState for Machine {
    fn state_len(&self) -> usize {
        self.cpu.state_len() + self.bus.state_len()
    }

    fn save_state(&self, out: &mut Vec<u8>) {
        self.cpu.save_state(out);
        self.bus.save_state(out);
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), CoreError> {
        check_len(self.state_len(), data)?;

        let (cpu_data, bus_data) = data.split_at(self.cpu.state_len());
        self.cpu.load_state(cpu_data)?;
        self.bus.load_state(bus_data)
    }
}
