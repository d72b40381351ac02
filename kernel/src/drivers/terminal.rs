// line-disciplined terminal bound to descriptors 0 and 1

use super::keyboard::KEYBOARD;
use super::vga::SCREEN;
use crate::arch;

pub fn open() {}

pub fn close() {
    arch::without_interrupts(|| KEYBOARD.exclusive_access().discard_input());
}

/// Wait for a complete line and copy up to `buf.len()` bytes of it,
/// without the newline.
pub fn read(buf: &mut [u8]) -> usize {
    if buf.is_empty() {
        return 0;
    }
    loop {
        let line = arch::without_interrupts(|| KEYBOARD.exclusive_access().take_line(buf));
        if let Some(count) = line {
            return count;
        }
        arch::wait_for_interrupt();
    }
}

/// Echo `buf` to the screen. Anything typed but not yet read is dropped.
pub fn write(buf: &[u8]) -> usize {
    arch::without_interrupts(|| {
        SCREEN.exclusive_access().write_bytes(buf);
        KEYBOARD.exclusive_access().discard_input();
    });
    buf.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn read_returns_the_pending_line() {
        let _guard = test_support::lock();
        test_support::reset_devices();
        test_support::type_keys(b"hello world\n");
        let mut buf = [0u8; 32];
        assert_eq!(read(&mut buf), 11);
        assert_eq!(&buf[..11], b"hello world");
        assert_eq!(read(&mut []), 0);
    }

    #[test]
    fn write_echoes_and_discards_backlog() {
        let _guard = test_support::lock();
        test_support::reset_devices();
        test_support::type_keys(b"half typed");
        assert_eq!(write(b"391OS> "), 7);
        assert_eq!(KEYBOARD.exclusive_access().pending(), 0);
        let screen = SCREEN.exclusive_access();
        let shown: Vec<u8> = (0..6).map(|x| screen.byte_at(x, 0)).collect();
        assert_eq!(shown, b"391OS>");
    }
}
