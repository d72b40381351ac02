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

use core::arch::asm;

fn syscall(id: usize, args: [usize; 3]) -> isize {
    let mut ret: isize;
    unsafe {
        // ebx may be reserved by the compiler, so the first argument is swapped in
        asm!(
            "xchg {arg0}, ebx",
            "int 0x80",
            "xchg {arg0}, ebx",
            arg0 = inout(reg) args[0] => _,
            inlateout("eax") id as isize => ret, // eax = id, then the return value
            in("ecx") args[1],
            in("edx") args[2],
        );
    }
    ret
}

pub fn sys_halt(status: u8) -> ! {
    syscall(SYSCALL_HALT, [status as usize, 0, 0]);
    unreachable!("halt returned");
}

pub fn sys_execute(command: *const u8) -> isize {
    syscall(SYSCALL_EXECUTE, [command as usize, 0, 0])
}

pub fn sys_read(fd: i32, buffer: &mut [u8]) -> isize {
    syscall(SYSCALL_READ, [fd as usize, buffer.as_mut_ptr() as usize, buffer.len()])
}

pub fn sys_write(fd: i32, buffer: &[u8]) -> isize {
    syscall(SYSCALL_WRITE, [fd as usize, buffer.as_ptr() as usize, buffer.len()])
}

pub fn sys_open(name: *const u8) -> isize {
    syscall(SYSCALL_OPEN, [name as usize, 0, 0])
}

pub fn sys_close(fd: i32) -> isize {
    syscall(SYSCALL_CLOSE, [fd as usize, 0, 0])
}

pub fn sys_getargs(buffer: &mut [u8]) -> isize {
    syscall(SYSCALL_GETARGS, [buffer.as_mut_ptr() as usize, buffer.len(), 0])
}

pub fn sys_vidmap(screen_start: *mut *mut u8) -> isize {
    syscall(SYSCALL_VIDMAP, [screen_start as usize, 0, 0])
}

pub fn sys_set_handler(signum: i32, handler: usize) -> isize {
    syscall(SYSCALL_SET_HANDLER, [signum as usize, handler, 0])
}

pub fn sys_sigreturn() -> isize {
    syscall(SYSCALL_SIGRETURN, [0, 0, 0])
}
