#![no_std]
#![feature(linkage)]

#[macro_use]
pub mod console;
mod lang_item;
mod syscall;

use syscall::*;

pub const STDIN: i32 = 0;
pub const STDOUT: i32 = 1;
// a name of at most 32 bytes plus its NUL
const NAME_BUFFER: usize = 33;
const COMMAND_BUFFER: usize = 162;

#[no_mangle]
#[link_section = ".text.entry"]
pub extern "C" fn _start() -> ! {
    clear_bss();
    halt(main() as u8);
}

#[linkage = "weak"]
#[no_mangle]
fn main() -> i32 {
    panic!("Cannot find main!");
}

// the frame behind the user region is reused, so bss may hold an older image
fn clear_bss() {
    extern "C" {
        fn start_bss();
        fn end_bss();
    }
    (start_bss as usize..end_bss as usize).for_each(|addr| unsafe {
        (addr as *mut u8).write_volatile(0);
    });
}

// copy `text` into `buf` with a terminating NUL, cut to fit
fn nul_terminated<'a>(text: &[u8], buf: &'a mut [u8]) -> *const u8 {
    let len = text.len().min(buf.len() - 1);
    buf[..len].copy_from_slice(&text[..len]);
    buf[len] = 0;
    buf.as_ptr()
}

pub fn halt(status: u8) -> ! {
    sys_halt(status)
}

/// Run `command` to completion. Returns its halt status, 256 if it died
/// from an exception, or a negative value if it could not be started.
pub fn execute(command: &[u8]) -> isize {
    let mut buf = [0u8; COMMAND_BUFFER];
    sys_execute(nul_terminated(command, &mut buf))
}

pub fn read(fd: i32, buf: &mut [u8]) -> isize {
    sys_read(fd, buf)
}

pub fn write(fd: i32, buf: &[u8]) -> isize {
    sys_write(fd, buf)
}

pub fn open(name: &[u8]) -> isize {
    let mut buf = [0u8; NAME_BUFFER];
    sys_open(nul_terminated(name, &mut buf))
}

pub fn close(fd: i32) -> isize {
    sys_close(fd)
}

/// The argument string of this program, NUL terminated in `buf`.
pub fn getargs(buf: &mut [u8]) -> isize {
    sys_getargs(buf)
}

/// Map the text-mode screen into this process and return its address.
pub fn vidmap() -> Option<*mut u8> {
    let mut screen: *mut u8 = core::ptr::null_mut();
    if sys_vidmap(&mut screen) < 0 {
        return None;
    }
    Some(screen)
}

pub fn set_handler(signum: i32, handler: usize) -> isize {
    sys_set_handler(signum, handler)
}

pub fn sigreturn() -> isize {
    sys_sigreturn()
}

/// Length of the NUL-terminated prefix of `buf`.
pub fn c_str_len(buf: &[u8]) -> usize {
    buf.iter().position(|&b| b == 0).unwrap_or(buf.len())
}
