use alloc::sync::Arc;
use alloc::vec::Vec;

use axerrno::{AxResult, ax_err};
use log::{debug, info, warn};
use spin::Mutex;

use crate::consts::*;
use crate::hart::{HartRegistry, InterruptLine, InterruptSource};
use crate::slot::{PendingWidth, Slot, SlotMode};

/// Device properties of a UINTC instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VUintcConfig {
    /// Guest physical base of the MMIO window, 32-byte aligned.
    pub base_addr: usize,
    /// Hart id driven by output line 0.
    pub hart_id_base: u32,
    /// Number of output lines, one per hart starting at `hart_id_base`.
    pub num_harts: u32,
}

impl Default for VUintcConfig {
    fn default() -> Self {
        Self {
            base_addr: 0,
            hart_id_base: 0,
            num_harts: 1,
        }
    }
}

impl VUintcConfig {
    pub fn validate(&self) -> AxResult {
        if self.num_harts == 0 || self.num_harts as usize > MAX_SLOTS {
            warn!("VUintc: num_harts {} out of range 1..={}", self.num_harts, MAX_SLOTS);
            return ax_err!(InvalidInput, "num_harts out of range");
        }
        if !memory_addr::is_aligned(self.base_addr, UINTC_SLOT_SIZE) {
            warn!("VUintc: base address {:#x} is not 32-byte aligned", self.base_addr);
            return ax_err!(InvalidInput, "misaligned base address");
        }
        if self.hart_id_base.checked_add(self.num_harts - 1).is_none() {
            return ax_err!(InvalidInput, "hart id range overflows");
        }
        Ok(())
    }
}

/// What a send did. Only [`SendOutcome::Delivered`] changes state or raises a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The slot is not active.
    Inactive,
    /// The slot index is past the end of the table.
    InvalidSlot,
    /// The target hart does not exist.
    UnknownHart,
    /// The target hart exists but no output line of this device drives it.
    Unwired,
    /// The bit does not fit the live pending field.
    BitOutOfRange,
}

pub struct VUintc {
    config: VUintcConfig,
    registry: Arc<dyn HartRegistry>,
    lines: Vec<Arc<dyn InterruptLine>>,
    slots: [Mutex<Slot>; MAX_SLOTS],
}

impl VUintc {
    /// Builds the device and wires output line `k` to the user software
    /// interrupt of hart `hart_id_base + k`.
    ///
    /// Any error here is a machine configuration error and should abort
    /// machine construction.
    pub fn new(config: VUintcConfig, registry: Arc<dyn HartRegistry>) -> AxResult<Self> {
        config.validate()?;
        info!(
            "VUintc new: base={:#x}, hart_id_base={:#x}, num_harts={:#x}",
            config.base_addr, config.hart_id_base, config.num_harts
        );

        let mut lines = Vec::with_capacity(config.num_harts as usize);
        for k in 0..config.num_harts {
            let hart_id = config.hart_id_base + k;
            let Some(hart) = registry.lookup(hart_id) else {
                warn!("VUintc: hart {:#x} does not exist", hart_id);
                return ax_err!(NotFound, "target hart does not exist");
            };
            if hart.claim_interrupts(InterruptSource::UserSoft).is_err() {
                warn!("VUintc: USIP of hart {:#x} already claimed", hart_id);
                return ax_err!(AlreadyExists, "USIP already claimed");
            }
            lines.push(hart.irq_input(InterruptSource::UserSoft));
        }

        Ok(Self {
            config,
            registry,
            lines,
            slots: [const { Mutex::new(Slot::new()) }; MAX_SLOTS],
        })
    }

    pub fn create(
        base_addr: usize,
        hart_id_base: u32,
        num_harts: u32,
        registry: Arc<dyn HartRegistry>,
    ) -> AxResult<Self> {
        Self::new(
            VUintcConfig {
                base_addr,
                hart_id_base,
                num_harts,
            },
            registry,
        )
    }

    pub fn base_addr(&self) -> usize {
        self.config.base_addr
    }

    pub fn hart_id_base(&self) -> u32 {
        self.config.hart_id_base
    }

    pub fn num_harts(&self) -> u32 {
        self.config.num_harts
    }

    /// Snapshot of a slot.
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).map(|slot| *slot.lock())
    }

    fn line_for(&self, hart_id: u16) -> Option<&Arc<dyn InterruptLine>> {
        let k = (hart_id as u32).checked_sub(self.config.hart_id_base)?;
        self.lines.get(k as usize)
    }

    /// `(target_hart << 16) | mode`
    pub fn read_low(&self, index: usize) -> Option<u64> {
        let slot = self.slots.get(index)?.lock();
        Some(((slot.target_hart as u64) << LOW_HART_SHIFT) | slot.mode.bits() as u64)
    }

    pub fn write_low(&self, index: usize, val: u64) -> Option<()> {
        let mut slot = self.slots.get(index)?.lock();
        slot.target_hart = (val >> LOW_HART_SHIFT) as u16;
        slot.mode = SlotMode::from_bits(val);
        Some(())
    }

    pub fn read_pending(&self, index: usize) -> Option<u64> {
        Some(self.slots.get(index)?.lock().pending())
    }

    pub fn write_pending(&self, index: usize, val: u64) -> Option<()> {
        self.slots.get(index)?.lock().set_pending(val);
        Some(())
    }

    /// Upper half of the pending window. Only narrow slots answer, with
    /// bits 32..64 of the inactive wide field.
    pub fn read_pending_upper(&self, index: usize) -> Option<u64> {
        let slot = self.slots.get(index)?.lock();
        match slot.mode.width {
            PendingWidth::Narrow => Some(slot.pending_wide >> 32),
            PendingWidth::Wide => None,
        }
    }

    /// Upper half of the pending window. Only wide slots accept it, ORing
    /// the low 32 bits of `val` into bits 32..64.
    pub fn write_pending_upper(&self, index: usize, val: u64) -> Option<()> {
        let mut slot = self.slots.get(index)?.lock();
        match slot.mode.width {
            PendingWidth::Wide => {
                slot.pending_wide |= (val as u32 as u64) << 32;
                Some(())
            }
            PendingWidth::Narrow => None,
        }
    }

    pub fn get_active(&self, index: usize) -> Option<bool> {
        Some(self.slots.get(index)?.lock().mode.active)
    }

    pub fn set_active(&self, index: usize, active: bool) -> Option<()> {
        self.slots.get(index)?.lock().mode.active = active;
        Some(())
    }

    /// Marks `bit` pending in slot `index` and raises the line of its target hart.
    ///
    /// The slot lock is released before the line is raised, so a hart taking
    /// the interrupt always finds its bit already set.
    pub fn send(&self, index: usize, bit: u64) -> SendOutcome {
        let Some(slot) = self.slots.get(index) else {
            return SendOutcome::InvalidSlot;
        };

        let (line, hart_id) = {
            let mut slot = slot.lock();
            if !slot.mode.active {
                return SendOutcome::Inactive;
            }
            let hart_id = slot.target_hart;
            if self.registry.lookup(hart_id as u32).is_none() {
                warn!("VUintc send: invalid hart id {:#x} in slot {}", hart_id, index);
                return SendOutcome::UnknownHart;
            }
            let Some(line) = self.line_for(hart_id) else {
                warn!("VUintc send: hart {:#x} is not wired to this device (slot {})", hart_id, index);
                return SendOutcome::Unwired;
            };
            if let Err(err) = slot.set_pending_bit(bit) {
                warn!(
                    "VUintc send: bit {} out of range for {:?} pending field (slot {})",
                    err.bit, err.width, index
                );
                return SendOutcome::BitOutOfRange;
            }
            (line, hart_id)
        };

        debug!("VUintc send: slot {} bit {} -> hart {:#x}", index, bit, hart_id);
        line.raise();
        SendOutcome::Delivered
    }
}
