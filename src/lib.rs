//! # RISC-V Virtual User Interrupt Controller
//!
//! A per-hart user interrupt controller (UINTC) for RISC-V guests. Software
//! on one hart posts a user software interrupt to another hart by writing a
//! bit number to the SEND register of a configured slot.
//!
//! Every slot occupies 32 bytes of the MMIO window:
//! - `+0x00` SEND: write-only, sets the written bit in the pending field and
//!   raises the target hart's `USIP` line
//! - `+0x08` LOW: `(target_hart << 16) | mode`, mode bit 0 = active, bit 1 = 64-bit pending
//! - `+0x10` HIGH: the live pending field
//! - `+0x18` ACTIVE: the active bit alone

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod consts;
mod devops_impl;
pub mod hart;
pub mod slot;
pub mod vuintc;

pub use consts::*;
pub use devops_impl::{RegAccess, UintcReg, decode};
pub use hart::{AlreadyClaimed, HartRegistry, InterruptLine, InterruptSource, VUintcHart};
pub use slot::{PendingWidth, Slot, SlotMode};
pub use vuintc::{SendOutcome, VUintc, VUintcConfig};
