// host stand-in for the i686 back end

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::process::SavedContext;
use core::ptr::addr_of_mut;
use core::sync::atomic::{AtomicUsize, Ordering};

static KERNEL_STACK: AtomicUsize = AtomicUsize::new(0);
static mut TEXT_BUFFER: [u16; SCREEN_WIDTH * SCREEN_HEIGHT] = [0; SCREEN_WIDTH * SCREEN_HEIGHT];

#[cfg(test)]
std::thread_local! {
    static PORT_WRITES: core::cell::RefCell<std::vec::Vec<(u16, u8)>> =
        core::cell::RefCell::new(std::vec::Vec::new());
}

pub unsafe fn outb(_port: u16, _value: u8) {
    #[cfg(test)]
    PORT_WRITES.with(|log| log.borrow_mut().push((_port, _value)));
}

pub unsafe fn inb(_port: u16) -> u8 {
    0
}

/// Drain the port writes issued by the current thread.
#[cfg(test)]
pub fn take_port_writes() -> std::vec::Vec<(u16, u8)> {
    PORT_WRITES.with(|log| core::mem::take(&mut *log.borrow_mut()))
}

pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
    f()
}

pub fn wait_for_interrupt() {
    core::hint::spin_loop();
}

pub unsafe fn load_page_directory(_directory: usize) {}

pub fn flush_tlb() {}

pub fn set_kernel_stack(top: usize) {
    KERNEL_STACK.store(top, Ordering::Relaxed);
}

pub fn fault_address() -> usize {
    0
}

#[cfg(test)]
pub fn kernel_stack() -> usize {
    KERNEL_STACK.load(Ordering::Relaxed)
}

pub unsafe fn enter_user(_context: *mut SavedContext, entry: usize, _user_stack: usize) -> isize {
    panic!("cannot enter user mode at {:#x} on the host", entry);
}

pub unsafe fn resume(_context: *const SavedContext, value: isize) -> ! {
    panic!("cannot resume a saved context (value {}) on the host", value);
}

pub unsafe fn user_image_window() -> &'static mut [u8] {
    panic!("no user region is mapped on the host");
}

// host buffers live above the 32-bit space the kernel models
pub fn user_accessible(start: usize, len: usize) -> bool {
    crate::mem::in_user_region(start, len)
        || (start > u32::MAX as usize && start.checked_add(len).is_some())
}

pub fn text_buffer() -> *mut u16 {
    unsafe { addr_of_mut!(TEXT_BUFFER) as *mut u16 }
}

pub fn serial_putchar(_c: u8) {}

pub fn halt_forever() -> ! {
    panic!("halt_forever on the host");
}
