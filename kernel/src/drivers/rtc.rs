//! Real-time clock with per-reader virtual rates.
//!
//! The chip interrupts at a fixed 1024 Hz. A requested rate `f` is
//! emulated by raising the ready flag every `1024 / f` hardware ticks, so
//! only powers of two are accepted and the division is exact.

use super::pic::PIC;
use crate::arch;
use crate::config::{RTC_BASE_FREQUENCY, RTC_DEFAULT_FREQUENCY, RTC_IRQ};
use crate::error::{KernelError, SysResult};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

const INDEX_PORT: u16 = 0x70;
const DATA_PORT: u16 = 0x71;
const NMI_DISABLE: u8 = 0x80;
const REGISTER_A: u8 = 0x0A;
const REGISTER_B: u8 = 0x0B;
const REGISTER_C: u8 = 0x0C;
const PERIODIC_ENABLE: u8 = 0x40;
// rate select 6 = 1024 Hz
const RATE_1024HZ: u8 = 0x06;

pub static RTC: Rtc = Rtc::new();

pub struct Rtc {
    divider: AtomicU32,
    countdown: AtomicU32,
    ready: AtomicBool,
}

impl Rtc {
    pub const fn new() -> Self {
        let divider = RTC_BASE_FREQUENCY / RTC_DEFAULT_FREQUENCY;
        Rtc {
            divider: AtomicU32::new(divider),
            countdown: AtomicU32::new(divider),
            ready: AtomicBool::new(false),
        }
    }

    pub fn frequency(&self) -> u32 {
        RTC_BASE_FREQUENCY / self.divider.load(Ordering::Relaxed)
    }

    fn set_rate(&self, frequency: u32) {
        let divider = RTC_BASE_FREQUENCY / frequency;
        self.divider.store(divider, Ordering::Relaxed);
        self.countdown.store(divider, Ordering::Relaxed);
    }

    pub fn open(&self) {
        self.set_rate(RTC_DEFAULT_FREQUENCY);
    }

    pub fn close(&self) {
        self.set_rate(RTC_DEFAULT_FREQUENCY);
    }

    pub fn set_frequency(&self, frequency: i32) -> SysResult<()> {
        let valid = (RTC_DEFAULT_FREQUENCY as i32..=RTC_BASE_FREQUENCY as i32).contains(&frequency)
            && (frequency as u32).is_power_of_two();
        if !valid {
            return Err(KernelError::InvalidArgument);
        }
        self.set_rate(frequency as u32);
        Ok(())
    }

    /// Accepts exactly one little-endian 32-bit frequency.
    pub fn write(&self, buf: &[u8]) -> SysResult<usize> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| KernelError::InvalidArgument)?;
        self.set_frequency(i32::from_le_bytes(bytes))?;
        Ok(bytes.len())
    }

    /// One hardware tick. Returns true when a virtual tick completes.
    pub fn tick(&self) -> bool {
        let left = self.countdown.load(Ordering::Relaxed);
        if left > 1 {
            self.countdown.store(left - 1, Ordering::Relaxed);
            return false;
        }
        self.countdown.store(self.divider.load(Ordering::Relaxed), Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
        true
    }

    /// Block until the next virtual tick.
    pub fn wait(&self) {
        self.ready.store(false, Ordering::Release);
        while !self.ready.load(Ordering::Acquire) {
            arch::wait_for_interrupt();
        }
    }
}

fn read_register(register: u8) -> u8 {
    unsafe {
        arch::outb(INDEX_PORT, NMI_DISABLE | register);
        arch::inb(DATA_PORT)
    }
}

fn write_register(register: u8, value: u8) {
    unsafe {
        arch::outb(INDEX_PORT, NMI_DISABLE | register);
        arch::outb(DATA_PORT, value);
    }
}

/// Program the periodic interrupt at 1024 Hz and unmask IRQ 8.
pub fn init() {
    arch::without_interrupts(|| {
        let b = read_register(REGISTER_B);
        write_register(REGISTER_B, b | PERIODIC_ENABLE);
        let a = read_register(REGISTER_A);
        write_register(REGISTER_A, (a & 0xF0) | RATE_1024HZ);
    });
    PIC.enable_irq(RTC_IRQ);
}

/// IRQ 8. Register C must be read or the chip stops interrupting.
pub fn handle_interrupt() {
    RTC.tick();
    read_register(REGISTER_C);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals_per_second(rtc: &Rtc) -> u32 {
        (0..RTC_BASE_FREQUENCY).filter(|_| rtc.tick()).count() as u32
    }

    #[test]
    fn every_power_of_two_is_exact() {
        let rtc = Rtc::new();
        let mut frequency = 2;
        while frequency <= 1024 {
            rtc.write(&(frequency as i32).to_le_bytes()).unwrap();
            assert_eq!(rtc.frequency(), frequency);
            assert_eq!(signals_per_second(&rtc), frequency);
            frequency *= 2;
        }
    }

    #[test]
    fn rejects_bad_rates_and_sizes() {
        let rtc = Rtc::new();
        for bad in [0, 1, 3, 100, 2048, -2] {
            assert_eq!(rtc.set_frequency(bad), Err(KernelError::InvalidArgument));
        }
        assert_eq!(rtc.write(&[0, 2]), Err(KernelError::InvalidArgument));
        assert_eq!(rtc.write(&[0, 2, 0, 0, 0]), Err(KernelError::InvalidArgument));
        assert_eq!(rtc.frequency(), 2);
    }

    #[test]
    fn open_and_close_restore_two_hertz() {
        let rtc = Rtc::new();
        rtc.set_frequency(256).unwrap();
        rtc.open();
        assert_eq!(rtc.frequency(), 2);
        rtc.set_frequency(64).unwrap();
        rtc.close();
        assert_eq!(signals_per_second(&rtc), 2);
    }

    #[test]
    fn wait_returns_after_the_next_virtual_tick() {
        let rtc = Rtc::new();
        rtc.set_frequency(1024).unwrap();
        let done = AtomicBool::new(false);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    rtc.tick();
                    std::thread::yield_now();
                }
            });
            rtc.wait();
            done.store(true, Ordering::Release);
        });
    }
}
