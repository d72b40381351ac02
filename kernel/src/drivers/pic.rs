// cascaded 8259A pair, remapped to vectors 0x20-0x2F

use crate::arch;
use crate::config::{CASCADE_IRQ, PIC_MASTER_VECTOR, PIC_SLAVE_VECTOR};
use core::sync::atomic::{AtomicU8, Ordering};

const MASTER_COMMAND: u16 = 0x20;
const MASTER_DATA: u16 = 0x21;
const SLAVE_COMMAND: u16 = 0xA0;
const SLAVE_DATA: u16 = 0xA1;

const ICW1: u8 = 0x11; // edge triggered, cascade, ICW4 follows
const ICW3_MASTER: u8 = 1 << CASCADE_IRQ;
const ICW3_SLAVE: u8 = CASCADE_IRQ;
const ICW4: u8 = 0x01; // 8086 mode, normal EOI
const SPECIFIC_EOI: u8 = 0x60;
const IRQS_PER_CHIP: u8 = 8;

pub static PIC: Pic = Pic::new();

pub struct Pic {
    master_mask: AtomicU8,
    slave_mask: AtomicU8,
}

impl Pic {
    pub const fn new() -> Self {
        Pic { master_mask: AtomicU8::new(0xFF), slave_mask: AtomicU8::new(0xFF) }
    }

    pub fn masks(&self) -> (u8, u8) {
        (self.master_mask.load(Ordering::Relaxed), self.slave_mask.load(Ordering::Relaxed))
    }

    /// Remap both chips and mask every line except the cascade.
    pub fn init(&self) {
        arch::without_interrupts(|| unsafe {
            arch::outb(MASTER_DATA, 0xFF);
            arch::outb(SLAVE_DATA, 0xFF);
            arch::outb(MASTER_COMMAND, ICW1);
            arch::outb(MASTER_DATA, PIC_MASTER_VECTOR);
            arch::outb(MASTER_DATA, ICW3_MASTER);
            arch::outb(MASTER_DATA, ICW4);
            arch::outb(SLAVE_COMMAND, ICW1);
            arch::outb(SLAVE_DATA, PIC_SLAVE_VECTOR);
            arch::outb(SLAVE_DATA, ICW3_SLAVE);
            arch::outb(SLAVE_DATA, ICW4);
            self.master_mask.store(0xFF, Ordering::Relaxed);
            self.slave_mask.store(0xFF, Ordering::Relaxed);
            arch::outb(MASTER_DATA, 0xFF);
            arch::outb(SLAVE_DATA, 0xFF);
        });
        self.enable_irq(CASCADE_IRQ);
    }

    fn update_mask(&self, irq: u8, masked: bool) {
        if irq >= 2 * IRQS_PER_CHIP {
            warn!("[pic] no such irq {}", irq);
            return;
        }
        let (mask, port, line) = if irq < IRQS_PER_CHIP {
            (&self.master_mask, MASTER_DATA, irq)
        } else {
            (&self.slave_mask, SLAVE_DATA, irq - IRQS_PER_CHIP)
        };
        arch::without_interrupts(|| {
            let old = mask.load(Ordering::Relaxed);
            let new = if masked { old | (1 << line) } else { old & !(1 << line) };
            mask.store(new, Ordering::Relaxed);
            unsafe { arch::outb(port, new) };
        });
    }

    pub fn enable_irq(&self, irq: u8) {
        self.update_mask(irq, false);
    }

    pub fn disable_irq(&self, irq: u8) {
        self.update_mask(irq, true);
    }

    /// Acknowledge `irq`; a slave line also acknowledges the cascade.
    pub fn send_eoi(&self, irq: u8) {
        if irq >= 2 * IRQS_PER_CHIP {
            return;
        }
        unsafe {
            if irq >= IRQS_PER_CHIP {
                arch::outb(SLAVE_COMMAND, SPECIFIC_EOI | (irq - IRQS_PER_CHIP));
                arch::outb(MASTER_COMMAND, SPECIFIC_EOI | CASCADE_IRQ);
            } else {
                arch::outb(MASTER_COMMAND, SPECIFIC_EOI | irq);
            }
        }
    }
}
