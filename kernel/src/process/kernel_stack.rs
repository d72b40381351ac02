use super::Pid;
use crate::config::{KERNEL_STACK_SIZE, MAX_PROCESSES};
use core::ptr::addr_of;

#[repr(C, align(16))]
#[derive(Clone, Copy)]
struct KernelStack {
    data: [u8; KERNEL_STACK_SIZE],
}

// one stack per process id, never handed out twice at the same time
// because a pid is only reused after its process halted
static mut KERNEL_STACKS: [KernelStack; MAX_PROCESSES] =
    [KernelStack { data: [0; KERNEL_STACK_SIZE] }; MAX_PROCESSES];

/// Return (bottom, top) of the kernel stack of process `pid`.
pub fn kernel_stack_position(pid: Pid) -> (usize, usize) {
    let bottom = unsafe { addr_of!((*addr_of!(KERNEL_STACKS))[pid.0]) } as usize;
    (bottom, bottom + KERNEL_STACK_SIZE)
}
