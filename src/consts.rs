pub const MAX_SLOTS: usize = 512; // 最大支持的 UIRS 表项数量

/// 每个表项占用 32 字节（4 个 8 字节寄存器窗口）
pub const UINTC_SLOT_SIZE: usize = 0x20;

/// 整个 UINTC MMIO 区域大小（= MAX_SLOTS * 32 = 0x4000）
pub const UINTC_SIZE: usize = MAX_SLOTS * UINTC_SLOT_SIZE;

pub const UINTC_SEND: usize = 0x00;
pub const UINTC_LOW: usize = 0x08;
pub const UINTC_HIGH: usize = 0x10;
pub const UINTC_ACTIVE: usize = 0x18;

/// 8 字节寄存器窗口的高 32 位偏移
pub const UINTC_HALF: usize = 0x4;

pub const MODE_ACTIVE: u16 = 0b01;
pub const MODE_WIDE: u16 = 0b10;
pub const MODE_MASK: u64 = 0b11;

pub const LOW_HART_SHIFT: u32 = 16;
