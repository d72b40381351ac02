const SYSCALL_HALT: usize = 1;
const SYSCALL_EXECUTE: usize = 2;
const SYSCALL_READ: usize = 3;
const SYSCALL_WRITE: usize = 4;
const SYSCALL_OPEN: usize = 5;
const SYSCALL_CLOSE: usize = 6;
const SYSCALL_GETARGS: usize = 7;
const SYSCALL_VIDMAP: usize = 8;
const SYSCALL_SET_HANDLER: usize = 9;
const SYSCALL_SIGRETURN: usize = 10;

mod file_system;
mod process;

pub use file_system::*;
pub use process::*;

use crate::arch;
use crate::error::{into_return_value, KernelError, SysResult};

// call the corresponding syscall function according to the syscall_id;
// every failure comes back as one negative number
pub fn syscall(syscall_id: usize, args: [usize; 3]) -> isize {
    let result = match syscall_id {
        SYSCALL_HALT => sys_halt(args[0] as u8),
        SYSCALL_EXECUTE => sys_execute(args[0] as *const u8),
        SYSCALL_READ => sys_read(args[0] as i32, args[1] as *mut u8, args[2] as i32),
        SYSCALL_WRITE => sys_write(args[0] as i32, args[1] as *const u8, args[2] as i32),
        SYSCALL_OPEN => sys_open(args[0] as *const u8),
        SYSCALL_CLOSE => sys_close(args[0] as i32),
        SYSCALL_GETARGS => sys_getargs(args[0] as *mut u8, args[1] as i32),
        SYSCALL_VIDMAP => sys_vidmap(args[0] as *mut *mut u8),
        SYSCALL_SET_HANDLER => sys_set_handler(args[0] as i32, args[1]),
        SYSCALL_SIGRETURN => sys_sigreturn(),
        _ => {
            warn!("[kernel] unsupported syscall {}", syscall_id);
            Err(KernelError::InvalidArgument)
        }
    };
    into_return_value(result)
}

/// Bytes of a NUL-terminated user string, looking at most `limit` bytes.
/// A string that runs out of the caller's memory before ending is rejected.
unsafe fn user_str<'a>(ptr: *const u8, limit: usize) -> SysResult<&'a [u8]> {
    if ptr.is_null() {
        return Err(KernelError::InvalidArgument);
    }
    let mut len = 0;
    while len < limit {
        if !arch::user_accessible((ptr as usize).wrapping_add(len), 1) {
            return Err(KernelError::InvalidArgument);
        }
        if *ptr.add(len) == 0 {
            break;
        }
        len += 1;
    }
    Ok(core::slice::from_raw_parts(ptr, len))
}

fn check_user_range(ptr: usize, len: i32) -> SysResult<usize> {
    if ptr == 0 || len < 0 || !arch::user_accessible(ptr, len as usize) {
        return Err(KernelError::InvalidArgument);
    }
    Ok(len as usize)
}

unsafe fn user_slice<'a>(ptr: *const u8, len: i32) -> SysResult<&'a [u8]> {
    let len = check_user_range(ptr as usize, len)?;
    Ok(core::slice::from_raw_parts(ptr, len))
}

unsafe fn user_slice_mut<'a>(ptr: *mut u8, len: i32) -> SysResult<&'a mut [u8]> {
    let len = check_user_range(ptr as usize, len)?;
    Ok(core::slice::from_raw_parts_mut(ptr, len))
}
