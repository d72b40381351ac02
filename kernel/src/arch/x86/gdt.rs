// flat segments for ring 0 and ring 3, plus the single TSS

use core::arch::asm;
use core::mem::size_of;
use core::ptr::{addr_of, addr_of_mut};

pub const KERNEL_CS: u16 = 0x08;
pub const KERNEL_DS: u16 = 0x10;
pub const USER_CS: u16 = 0x18 | 3;
pub const USER_DS: u16 = 0x20 | 3;
pub const TSS_SELECTOR: u16 = 0x28;

#[repr(C)]
pub struct TaskStateSegment {
    link: u32,
    esp0: u32,
    ss0: u32,
    unused: [u32; 22],
    // high half: offset of the (absent) I/O bitmap
    iomap: u32,
}

static_assertions::const_assert_eq!(size_of::<TaskStateSegment>(), 104);

#[repr(C, packed)]
pub struct DescriptorTablePointer {
    pub limit: u16,
    pub base: u32,
}

static mut TSS: TaskStateSegment = TaskStateSegment {
    link: 0,
    esp0: 0,
    ss0: KERNEL_DS as u32,
    unused: [0; 22],
    iomap: (size_of::<TaskStateSegment>() as u32) << 16,
};

static mut GDT: [u64; 6] = [
    0,
    segment(0, 0xFFFFF, 0x9A, 0xC),
    segment(0, 0xFFFFF, 0x92, 0xC),
    segment(0, 0xFFFFF, 0xFA, 0xC),
    segment(0, 0xFFFFF, 0xF2, 0xC),
    0, // filled in by init, the TSS address is only known at link time
];

const fn segment(base: u32, limit: u32, access: u8, flags: u8) -> u64 {
    let mut descriptor = (limit & 0xFFFF) as u64;
    descriptor |= ((base & 0xFF_FFFF) as u64) << 16;
    descriptor |= (access as u64) << 40;
    descriptor |= (((limit >> 16) & 0xF) as u64) << 48;
    descriptor |= ((flags & 0xF) as u64) << 52;
    descriptor |= ((base >> 24) as u64) << 56;
    return descriptor;
}

pub fn init() {
    unsafe {
        let tss_base = addr_of!(TSS) as u32;
        let tss_limit = size_of::<TaskStateSegment>() as u32 - 1;
        (*addr_of_mut!(GDT))[5] = segment(tss_base, tss_limit, 0x89, 0x0);
        let pointer = DescriptorTablePointer {
            limit: (size_of::<[u64; 6]>() - 1) as u16,
            base: addr_of!(GDT) as u32,
        };
        asm!(
            "lgdt [{ptr}]",
            "push {cs}",
            "lea {tmp}, [2f]",
            "push {tmp}",
            "retf",
            "2:",
            "mov {tmp}, {ds}",
            "mov ds, {tmp:x}",
            "mov es, {tmp:x}",
            "mov fs, {tmp:x}",
            "mov gs, {tmp:x}",
            "mov ss, {tmp:x}",
            ptr = in(reg) addr_of!(pointer),
            cs = const KERNEL_CS as u32,
            ds = const KERNEL_DS as u32,
            tmp = out(reg) _,
        );
        asm!("ltr {0:x}", in(reg) TSS_SELECTOR as u32, options(nostack, preserves_flags));
    }
}

/// The stack the CPU switches to on a ring 3 -> ring 0 transition.
pub fn set_kernel_stack(top: usize) {
    unsafe { (*addr_of_mut!(TSS)).esp0 = top as u32 };
}
