//! Interfaces the UINTC consumes from the rest of the machine.

use alloc::sync::Arc;

/// An edge-triggered output wired to some interrupt input at setup time.
pub trait InterruptLine: Send + Sync {
    /// Delivers a single edge.
    fn raise(&self);
}

/// Interrupt inputs of a hart that a device can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptSource {
    /// User-mode software interrupt (`mip.USIP`).
    UserSoft,
}

impl InterruptSource {
    pub const fn mip_mask(self) -> usize {
        match self {
            InterruptSource::UserSoft => 1 << 0,
        }
    }
}

/// The interrupt source is already owned by another device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyClaimed;

/// Interrupt context of one hart.
pub trait VUintcHart: Send + Sync {
    /// Takes exclusive ownership of `source` on this hart.
    fn claim_interrupts(&self, source: InterruptSource) -> Result<(), AlreadyClaimed>;

    /// The input line that drives `source` on this hart.
    fn irq_input(&self, source: InterruptSource) -> Arc<dyn InterruptLine>;
}

/// Lookup of harts by their numeric id.
pub trait HartRegistry: Send + Sync {
    fn lookup(&self, hart_id: u32) -> Option<Arc<dyn VUintcHart>>;
}
