//! Bare-metal i686 back end.

pub mod gdt;
pub mod idt;
pub mod multiboot;

use crate::config::{PROGRAM_IMAGE_START, USER_REGION_END, VIDEO_MEMORY};
use crate::process::SavedContext;
use core::arch::{asm, global_asm};

global_asm!(include_str!("entry.S"));
global_asm!(include_str!("trap.S"));
global_asm!(
    include_str!("transfer.S"),
    user_cs = const gdt::USER_CS,
    user_ds = const gdt::USER_DS,
    eflags_if = const EFLAGS_IF,
);

const EFLAGS_IF: u32 = 1 << 9;
const CR0_PE: u32 = 1 << 0;
const CR0_PG: u32 = 1 << 31;
const CR4_PSE: u32 = 1 << 4;
const COM1: u16 = 0x3F8;

extern "C" {
    fn nestos_enter_user(context: *mut SavedContext, entry: usize, user_stack: usize) -> isize;
    fn nestos_resume(context: *const SavedContext, value: isize) -> !;
}

pub unsafe fn outb(port: u16, value: u8) {
    asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
}

pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
    return value;
}

fn interrupts_enabled() -> bool {
    let flags: u32;
    unsafe { asm!("pushfd", "pop {}", out(reg) flags, options(nomem, preserves_flags)) };
    return flags & EFLAGS_IF != 0;
}

/// Run `f` with maskable interrupts off, restoring the previous state after.
pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
    let enabled = interrupts_enabled();
    if enabled {
        unsafe { asm!("cli", options(nomem, nostack)) };
    }
    let result = f();
    if enabled {
        unsafe { asm!("sti", options(nomem, nostack)) };
    }
    result
}

/// Sleep until the next interrupt has been serviced.
// sti only takes effect after the following instruction, so an interrupt
// raised between the caller's check and hlt still wakes us up
pub fn wait_for_interrupt() {
    if interrupts_enabled() {
        unsafe { asm!("hlt", options(nomem, nostack)) };
    } else {
        unsafe { asm!("sti", "hlt", "cli", options(nomem, nostack)) };
    }
}

/// Point cr3 at `directory` and switch on paging with 4 MiB page support.
pub unsafe fn load_page_directory(directory: usize) {
    asm!(
        "mov cr3, {dir}",
        "mov {tmp}, cr4",
        "or {tmp}, {pse}",
        "mov cr4, {tmp}",
        "mov {tmp}, cr0",
        "or {tmp}, {pg}",
        "mov cr0, {tmp}",
        dir = in(reg) directory,
        tmp = out(reg) _,
        pse = const CR4_PSE,
        pg = const CR0_PG | CR0_PE,
        options(nostack),
    );
}

// reloading cr3 drops every non-global translation
pub fn flush_tlb() {
    unsafe {
        asm!("mov {tmp}, cr3", "mov cr3, {tmp}", tmp = out(reg) _, options(nostack));
    }
}

pub fn set_kernel_stack(top: usize) {
    gdt::set_kernel_stack(top);
}

// linear address of the last page fault
pub fn fault_address() -> usize {
    let addr: usize;
    unsafe {
        asm!("mov {}, cr2", out(reg) addr, options(nomem, nostack, preserves_flags));
    }
    addr
}

/// Save the callee-saved registers into `context` and iret to ring 3.
/// Returns only when some later `resume(context, value)` runs, yielding `value`.
pub unsafe fn enter_user(context: *mut SavedContext, entry: usize, user_stack: usize) -> isize {
    return nestos_enter_user(context, entry, user_stack);
}

pub unsafe fn resume(context: *const SavedContext, value: isize) -> ! {
    nestos_resume(context, value)
}

/// The program image window of the user region currently bound.
pub unsafe fn user_image_window() -> &'static mut [u8] {
    core::slice::from_raw_parts_mut(
        PROGRAM_IMAGE_START as *mut u8,
        USER_REGION_END - PROGRAM_IMAGE_START,
    )
}

/// Whether a system call may touch `[start, start + len)` for the caller.
pub fn user_accessible(start: usize, len: usize) -> bool {
    crate::mem::in_user_region(start, len)
}

pub fn text_buffer() -> *mut u16 {
    VIDEO_MEMORY as *mut u16
}

pub fn serial_init() {
    unsafe {
        outb(COM1 + 1, 0x00); // no serial interrupts
        outb(COM1 + 3, 0x80); // DLAB on
        outb(COM1, 0x01); // 115200 baud
        outb(COM1 + 1, 0x00);
        outb(COM1 + 3, 0x03); // 8n1
        outb(COM1 + 2, 0xC7); // fifo on, cleared
    }
}

pub fn serial_putchar(c: u8) {
    unsafe {
        while inb(COM1 + 5) & 0x20 == 0 {
            core::hint::spin_loop();
        }
        outb(COM1, c);
    }
}

pub fn halt_forever() -> ! {
    loop {
        unsafe { asm!("cli", "hlt", options(nomem, nostack)) };
    }
}
