//! Common landing point for every vector the IDT routes to the kernel.

mod context;

pub use context::TrapFrame;

use crate::arch;
use crate::config::{KEYBOARD_IRQ, PIC_MASTER_VECTOR, RED, RESET, RTC_IRQ, SYSCALL_VECTOR};
use crate::drivers::{keyboard, pic::PIC, rtc};
use crate::process::{self, HaltStatus};
use crate::syscall::syscall;

const EXCEPTION_COUNT: u32 = 32;
const PAGE_FAULT: u32 = 14;
const IRQ_COUNT: u32 = 16;
// lines the PICs report when an interrupt vanished before acknowledgement
const SPURIOUS_MASTER_IRQ: u32 = 7;
const SPURIOUS_SLAVE_IRQ: u32 = 15;
const KEYBOARD_LINE: u32 = KEYBOARD_IRQ as u32;
const RTC_LINE: u32 = RTC_IRQ as u32;

const EXCEPTION_NAMES: [&str; 20] = [
    "divide error",
    "debug",
    "non-maskable interrupt",
    "breakpoint",
    "overflow",
    "bound range exceeded",
    "invalid opcode",
    "device not available",
    "double fault",
    "coprocessor segment overrun",
    "invalid TSS",
    "segment not present",
    "stack-segment fault",
    "general protection fault",
    "page fault",
    "reserved",
    "x87 floating-point exception",
    "alignment check",
    "machine check",
    "SIMD floating-point exception",
];

fn exception_name(vector: u32) -> &'static str {
    EXCEPTION_NAMES.get(vector as usize).copied().unwrap_or("reserved")
}

#[no_mangle]
pub extern "C" fn trap_handler(frame: &mut TrapFrame) {
    dispatch(frame)
}

pub(crate) fn dispatch(frame: &mut TrapFrame) {
    let vector = frame.vector;
    if vector < EXCEPTION_COUNT {
        handle_exception(frame);
    } else if vector == SYSCALL_VECTOR as u32 {
        let args = [frame.ebx as usize, frame.ecx as usize, frame.edx as usize];
        frame.eax = syscall(frame.eax as usize, args) as u32;
    } else if (PIC_MASTER_VECTOR as u32..PIC_MASTER_VECTOR as u32 + IRQ_COUNT).contains(&vector) {
        handle_irq(vector - PIC_MASTER_VECTOR as u32);
    } else {
        warn!("[kernel] unexpected vector {:#x}", vector);
    }
}

fn handle_exception(frame: &TrapFrame) {
    let name = exception_name(frame.vector);
    if !frame.from_user() {
        panic!(
            "{} in kernel at {:#x}, error code {:#x}, fault address {:#x}",
            name,
            frame.eip,
            frame.error_code,
            arch::fault_address()
        );
    }
    if frame.vector == PAGE_FAULT {
        error!(
            "[kernel] page fault at {:#x} touching {:#x}, killing the process",
            frame.eip,
            arch::fault_address()
        );
    } else {
        error!("[kernel] {} at {:#x}, killing the process", name, frame.eip);
    }
    println!("{}{}{}", RED, name, RESET);
    process::halt_current(HaltStatus::Faulted)
}

fn handle_irq(irq: u32) {
    match irq {
        KEYBOARD_LINE => keyboard::handle_interrupt(),
        RTC_LINE => rtc::handle_interrupt(),
        SPURIOUS_MASTER_IRQ | SPURIOUS_SLAVE_IRQ => return,
        _ => trace!("[kernel] unhandled irq {}", irq),
    }
    PIC.send_eoi(irq as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn frame(vector: u32, cs: u32) -> TrapFrame {
        TrapFrame { vector, cs, eip: 0x0804_8100, ..TrapFrame::default() }
    }

    #[test]
    fn syscall_result_lands_in_eax() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"shell");
        let name = b"frame0.txt\0";
        assert_eq!(crate::syscall::sys_open(name.as_ptr()), Ok(2));
        let mut close = frame(SYSCALL_VECTOR as u32, 0x1B);
        close.eax = 6;
        close.ebx = 2;
        dispatch(&mut close);
        assert_eq!(close.eax, 0);
        close.eax = 6;
        dispatch(&mut close);
        assert_eq!(close.eax as i32, -1);
        let mut unknown = frame(SYSCALL_VECTOR as u32, 0x1B);
        unknown.eax = 42;
        dispatch(&mut unknown);
        assert_eq!(unknown.eax as i32, -1);
    }

    #[test]
    #[should_panic(expected = "general protection fault in kernel")]
    fn kernel_exceptions_are_fatal() {
        dispatch(&mut frame(13, 0x08));
    }

    #[test]
    #[should_panic(expected = "cannot resume")]
    fn user_exceptions_halt_the_process() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        test_support::start(b"shell");
        test_support::start(b"hello");
        // halting reaches the parent's saved context, which the host cannot resume
        dispatch(&mut frame(0, 0x1B));
    }

    #[test]
    fn device_interrupts_are_acknowledged() {
        let _guard = test_support::lock();
        test_support::reset_devices();
        arch::take_port_writes();
        dispatch(&mut frame(0x21, 0x08));
        assert_eq!(arch::take_port_writes().last(), Some(&(0x20, 0x61)));
        dispatch(&mut frame(0x28, 0x08));
        let writes = arch::take_port_writes();
        assert_eq!(&writes[writes.len() - 2..], &[(0xA0, 0x60), (0x20, 0x62)]);
        dispatch(&mut frame(0x27, 0x08));
        assert!(arch::take_port_writes().is_empty());
    }

    #[test]
    fn exception_names_cover_the_table() {
        assert_eq!(exception_name(0), "divide error");
        assert_eq!(exception_name(14), "page fault");
        assert_eq!(exception_name(31), "reserved");
    }
}
