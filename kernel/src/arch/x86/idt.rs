// interrupt descriptor table: exceptions, the two PIC banks and int 0x80

use super::gdt::{DescriptorTablePointer, KERNEL_CS};
use crate::config::SYSCALL_VECTOR;
use core::arch::asm;
use core::mem::size_of;
use core::ptr::{addr_of, addr_of_mut};

const GATE_PRESENT: u8 = 0x80;
const GATE_INTERRUPT_32: u8 = 0x0E;
const STUB_COUNT: usize = 48;

#[repr(C)]
#[derive(Clone, Copy)]
struct Gate {
    offset_low: u16,
    selector: u16,
    zero: u8,
    attributes: u8,
    offset_high: u16,
}

static_assertions::assert_eq_size!(Gate, u64);

impl Gate {
    const MISSING: Gate = Gate { offset_low: 0, selector: 0, zero: 0, attributes: 0, offset_high: 0 };

    // every gate is an interrupt gate, so the kernel runs with IF clear
    fn interrupt(handler: usize, privilege: u8) -> Self {
        Gate {
            offset_low: handler as u16,
            selector: KERNEL_CS,
            zero: 0,
            attributes: GATE_PRESENT | (privilege << 5) | GATE_INTERRUPT_32,
            offset_high: (handler >> 16) as u16,
        }
    }
}

extern "C" {
    static nestos_trap_vectors: [usize; STUB_COUNT];
    fn nestos_syscall_entry();
}

static mut IDT: [Gate; 256] = [Gate::MISSING; 256];

pub fn init() {
    unsafe {
        let idt = &mut *addr_of_mut!(IDT);
        for (vector, stub) in (*addr_of!(nestos_trap_vectors)).iter().enumerate() {
            idt[vector] = Gate::interrupt(*stub, 0);
        }
        // the only gate reachable from ring 3
        idt[SYSCALL_VECTOR as usize] = Gate::interrupt(nestos_syscall_entry as usize, 3);
        let pointer = DescriptorTablePointer {
            limit: (size_of::<[Gate; 256]>() - 1) as u16,
            base: addr_of!(IDT) as u32,
        };
        asm!("lidt [{}]", in(reg) addr_of!(pointer), options(readonly, nostack, preserves_flags));
    }
}
