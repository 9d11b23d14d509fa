use axaddrspace::device::AccessWidth;
use axaddrspace::{GuestPhysAddr, GuestPhysAddrRange};
use axdevice_base::{BaseDeviceOps, EmuDeviceType};
use axerrno::AxResult;
use log::{trace, warn};

use crate::consts::{
    UINTC_ACTIVE, UINTC_HALF, UINTC_HIGH, UINTC_LOW, UINTC_SEND, UINTC_SIZE, UINTC_SLOT_SIZE,
};
use crate::vuintc::{SendOutcome, VUintc};

/// Registers of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintcReg {
    Send,
    Low,
    High,
    Active,
}

/// A decoded register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegAccess {
    pub slot: usize,
    pub reg: UintcReg,
    /// Upper 32-bit half of the 8-byte register window.
    pub upper: bool,
}

/// Maps a base-relative offset to a slot register.
pub fn decode(offset: usize) -> Option<RegAccess> {
    if offset >= UINTC_SIZE {
        return None;
    }
    let local = offset % UINTC_SLOT_SIZE;
    let reg = match local & !UINTC_HALF {
        UINTC_SEND => UintcReg::Send,
        UINTC_LOW => UintcReg::Low,
        UINTC_HIGH => UintcReg::High,
        UINTC_ACTIVE => UintcReg::Active,
        _ => return None,
    };
    Some(RegAccess {
        slot: offset / UINTC_SLOT_SIZE,
        reg,
        upper: local & UINTC_HALF != 0,
    })
}

fn access_aligned(offset: usize, width: AccessWidth) -> bool {
    match width {
        AccessWidth::Qword => offset % 8 == 0,
        AccessWidth::Dword => offset % 4 == 0,
        _ => false,
    }
}

impl VUintc {
    fn read_reg(&self, access: RegAccess) -> Option<u64> {
        let RegAccess { slot, reg, upper } = access;
        match (reg, upper) {
            (UintcReg::Send, _) => None,
            (UintcReg::Low, false) => self.read_low(slot),
            (UintcReg::High, false) => self.read_pending(slot),
            (UintcReg::High, true) => self.read_pending_upper(slot),
            (UintcReg::Active, false) => self.get_active(slot).map(u64::from),
            (UintcReg::Low | UintcReg::Active, true) => Some(0),
        }
    }

    fn write_reg(&self, access: RegAccess, val: u64) -> Option<()> {
        let RegAccess { slot, reg, upper } = access;
        match (reg, upper) {
            (UintcReg::Send, false) => match self.send(slot, val) {
                SendOutcome::InvalidSlot => None,
                _ => Some(()),
            },
            (UintcReg::Low, false) => self.write_low(slot, val),
            (UintcReg::High, false) => self.write_pending(slot, val),
            (UintcReg::High, true) => self.write_pending_upper(slot, val),
            (UintcReg::Active, false) => self.set_active(slot, val != 0),
            (UintcReg::Send | UintcReg::Low | UintcReg::Active, true) => Some(()),
        }
    }

    fn decode_access(&self, addr: GuestPhysAddr, width: AccessWidth) -> Option<RegAccess> {
        let offset = addr.as_usize().checked_sub(self.base_addr())?;
        if !access_aligned(offset, width) {
            return None;
        }
        decode(offset)
    }
}

impl BaseDeviceOps<GuestPhysAddrRange> for VUintc {
    fn emu_type(&self) -> EmuDeviceType {
        EmuDeviceType::EmuDeviceTInterruptController
    }

    fn address_range(&self) -> GuestPhysAddrRange {
        GuestPhysAddrRange::from_start_size(self.base_addr().into(), UINTC_SIZE)
    }

    fn handle_read(&self, addr: GuestPhysAddr, width: AccessWidth) -> AxResult<usize> {
        let access = self.decode_access(addr, width);
        trace!("VUintc handle_read: addr={:#x}, width={:?}, access={:?}", addr.as_usize(), width, access);
        let val = match access.and_then(|access| self.read_reg(access)) {
            Some(val) if width == AccessWidth::Dword => val as u32 as u64,
            Some(val) => val,
            None => {
                warn!("VUintc: invalid read: addr={:#x}, width={:?}", addr.as_usize(), width);
                0
            }
        };
        Ok(val as usize)
    }

    fn handle_write(&self, addr: GuestPhysAddr, width: AccessWidth, val: usize) -> AxResult {
        let access = self.decode_access(addr, width);
        trace!(
            "VUintc handle_write: addr={:#x}, width={:?}, access={:?}, val={:#x}",
            addr.as_usize(),
            width,
            access,
            val
        );
        let val = match width {
            AccessWidth::Dword => val as u32 as u64,
            _ => val as u64,
        };
        if access.and_then(|access| self.write_reg(access, val)).is_none() {
            warn!("VUintc: invalid write: addr={:#x}, width={:?}, val={:#x}", addr.as_usize(), width, val);
        }
        Ok(())
    }
}
