// syscalls about process management

use super::{user_slice_mut, user_str};
use crate::arch;
use crate::config::{ARGS_CAPACITY, MAX_NAME_LENGTH};
use crate::error::{KernelError, SysResult};
use crate::mem::ADDRESS_SPACE;
use crate::process::{self, HaltStatus, PROCESS_TABLE};
use core::mem::size_of;

// program name, one separator, then the argument string
const COMMAND_LIMIT: usize = MAX_NAME_LENGTH + 1 + ARGS_CAPACITY;

pub fn sys_halt(status: u8) -> ! {
    process::halt_current(HaltStatus::Exited(status))
}

/// Runs until the child halts. The command is copied out of the caller's
/// region first, since that region is rebound to the child.
pub fn sys_execute(command: *const u8) -> SysResult<isize> {
    let command = unsafe { user_str(command, COMMAND_LIMIT)? };
    let mut line = [0u8; COMMAND_LIMIT];
    line[..command.len()].copy_from_slice(command);
    process::execute(&line[..command.len()])
}

pub fn sys_getargs(buf: *mut u8, nbytes: i32) -> SysResult<isize> {
    let buf = unsafe { user_slice_mut(buf, nbytes)? };
    let table = PROCESS_TABLE.exclusive_access();
    let args = table.current().ok_or(KernelError::InvalidArgument)?.args();
    if args.is_empty() || buf.is_empty() {
        return Err(KernelError::InvalidArgument);
    }
    let count = args.len().min(buf.len() - 1);
    buf[..count].copy_from_slice(&args[..count]);
    buf[count] = 0;
    Ok(0)
}

pub fn sys_vidmap(screen_start: *mut *mut u8) -> SysResult<isize> {
    if screen_start.is_null() || !arch::user_accessible(screen_start as usize, size_of::<usize>()) {
        return Err(KernelError::InvalidArgument);
    }
    let video = {
        let mut space = ADDRESS_SPACE.exclusive_access();
        let video = space.map_user_video();
        space.invalidate_all();
        video
    };
    unsafe { screen_start.write(video.0 as *mut u8) };
    Ok(0)
}

pub fn sys_set_handler(signum: i32, _handler: usize) -> SysResult<isize> {
    debug!("[kernel] set_handler({}) is not supported", signum);
    Err(KernelError::Unsupported)
}

pub fn sys_sigreturn() -> SysResult<isize> {
    Err(KernelError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{USER_REGION_END, VIDEO_MEMORY, VIDMAP_ADDRESS};
    use crate::mem::{PTEFlags, PhyAddr, VirtAddr};
    use crate::test_support;
    use core::ptr;

    fn getargs(len: usize) -> SysResult<Vec<u8>> {
        let mut buf = vec![0xAAu8; len];
        sys_getargs(buf.as_mut_ptr(), len as i32)?;
        Ok(buf)
    }

    #[test]
    fn getargs_copies_with_terminator() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"cat   frame0.txt ");
        assert_eq!(getargs(32).unwrap()[..11], *b"frame0.txt\0");
        // truncated to fit, still terminated
        assert_eq!(getargs(4).unwrap(), b"fra\0");
        assert_eq!(getargs(1).unwrap(), b"\0");
        assert_eq!(getargs(0), Err(KernelError::InvalidArgument));
        assert_eq!(sys_getargs(ptr::null_mut(), 8), Err(KernelError::InvalidArgument));
    }

    #[test]
    fn getargs_fails_without_arguments() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        assert_eq!(getargs(8), Err(KernelError::InvalidArgument));
        test_support::start(b"shell");
        assert_eq!(getargs(8), Err(KernelError::InvalidArgument));
    }

    #[test]
    fn execute_failures_return_to_the_caller() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"shell");
        let missing = b"nonexistent_program\0";
        assert_eq!(sys_execute(missing.as_ptr()), Err(KernelError::NotFound));
        let text = b"frame0.txt\0";
        assert_eq!(sys_execute(text.as_ptr()), Err(KernelError::NotExecutable));
        let blank = b"   \0";
        assert_eq!(sys_execute(blank.as_ptr()), Err(KernelError::EmptyCommand));
        assert_eq!(sys_execute(ptr::null()), Err(KernelError::InvalidArgument));
        let table = PROCESS_TABLE.exclusive_access();
        assert_eq!(table.live_count(), 1);
        assert_eq!(table.current().unwrap().name(), b"shell");
    }

    #[test]
    fn vidmap_checks_the_output_pointer() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"shell");
        assert_eq!(sys_vidmap(ptr::null_mut()), Err(KernelError::InvalidArgument));
        assert_eq!(sys_vidmap(0x0040_0000 as *mut *mut u8), Err(KernelError::InvalidArgument));
        assert_eq!(sys_vidmap(USER_REGION_END as *mut *mut u8), Err(KernelError::InvalidArgument));
        assert_eq!(
            sys_vidmap((USER_REGION_END - 2) as *mut *mut u8),
            Err(KernelError::InvalidArgument)
        );
        // nothing gets mapped for a rejected pointer
        let space = ADDRESS_SPACE.exclusive_access();
        assert!(space.translate(VirtAddr(VIDMAP_ADDRESS)).is_none());
    }

    #[test]
    fn vidmap_maps_the_text_buffer_once() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"shell");
        for _ in 0..2 {
            let mut screen: *mut u8 = ptr::null_mut();
            assert_eq!(sys_vidmap(&mut screen), Ok(0));
            assert_eq!(screen as usize, VIDMAP_ADDRESS);
            let space = ADDRESS_SPACE.exclusive_access();
            let (frame, flags) = space.translate(VirtAddr(VIDMAP_ADDRESS)).unwrap();
            assert_eq!(frame, PhyAddr(VIDEO_MEMORY));
            assert!(flags.contains(PTEFlags::U | PTEFlags::P));
            assert!(!space.is_stale());
        }
    }
}
