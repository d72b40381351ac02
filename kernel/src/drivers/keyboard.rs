// PS/2 keyboard, scancode set 1, feeding a single line buffer

use super::vga::SCREEN;
use crate::arch;
use crate::config::KEYBOARD_BUFFER_SIZE;
use sync::UPSafeCell;

const DATA_PORT: u16 = 0x60;
const TAB_WIDTH: usize = 4;

const LEFT_SHIFT: u8 = 0x2A;
const RIGHT_SHIFT: u8 = 0x36;
const CAPS_LOCK: u8 = 0x3A;
const CONTROL: u8 = 0x1D;
const BACKSPACE: u8 = 0x0E;
const TAB: u8 = 0x0F;
const ENTER: u8 = 0x1C;
const KEY_L: u8 = 0x26;
const RELEASED: u8 = 0x80;

pub(crate) static NORMAL: &[u8; 58] =
    b"\0\x001234567890-=\0\0qwertyuiop[]\0\0asdfghjkl;'`\0\\zxcvbnm,./\0*\0 ";
static SHIFTED: &[u8; 58] =
    b"\0\0!@#$%^&*()_+\0\0QWERTYUIOP{}\0\0ASDFGHJKL:\"~\0|ZXCVBNM<>?\0*\0 ";

pub static KEYBOARD: UPSafeCell<Keyboard> = unsafe { UPSafeCell::new(Keyboard::new()) };

/// What the screen should do in response to a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Echo(u8),
    Erase(usize),
    ClearScreen,
    Ignored,
}

/// Typed bytes, possibly several completed lines, at most 128 bytes.
pub struct LineBuffer {
    bytes: [u8; KEYBOARD_BUFFER_SIZE],
    len: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        LineBuffer { bytes: [0; KEYBOARD_BUFFER_SIZE], len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    // the last slot is kept for the terminating newline
    fn push_char(&mut self, byte: u8) -> bool {
        if self.len + 1 >= KEYBOARD_BUFFER_SIZE {
            return false;
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        true
    }

    fn push_newline(&mut self) -> bool {
        if self.len == KEYBOARD_BUFFER_SIZE {
            return false;
        }
        self.bytes[self.len] = b'\n';
        self.len += 1;
        true
    }

    // a completed line cannot be edited any more
    fn pop(&mut self) -> Option<u8> {
        match self.len {
            0 => None,
            n if self.bytes[n - 1] == b'\n' => None,
            n => {
                self.len -= 1;
                Some(self.bytes[n - 1])
            }
        }
    }

    /// Move the first complete line (without its newline) into `out`,
    /// truncating to `out.len()`, and drop it from the buffer.
    pub fn take_line(&mut self, out: &mut [u8]) -> Option<usize> {
        let end = self.bytes[..self.len].iter().position(|&b| b == b'\n')?;
        let count = end.min(out.len());
        out[..count].copy_from_slice(&self.bytes[..count]);
        self.bytes.copy_within(end + 1..self.len, 0);
        self.len -= end + 1;
        Some(count)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

pub struct Keyboard {
    shift: bool,
    caps: bool,
    control: bool,
    line: LineBuffer,
}

impl Keyboard {
    pub const fn new() -> Self {
        Keyboard { shift: false, caps: false, control: false, line: LineBuffer::new() }
    }

    fn translate(&self, code: u8) -> Option<u8> {
        let table = if self.shift { SHIFTED } else { NORMAL };
        let byte = *table.get(code as usize)?;
        if byte == 0 {
            return None;
        }
        if self.caps && byte.is_ascii_alphabetic() {
            // caps lock inverts shift for letters only
            return Some(byte ^ 0x20);
        }
        Some(byte)
    }

    pub fn handle_scancode(&mut self, code: u8) -> KeyEvent {
        match code {
            LEFT_SHIFT | RIGHT_SHIFT => self.shift = true,
            c if c == LEFT_SHIFT | RELEASED || c == RIGHT_SHIFT | RELEASED => self.shift = false,
            CONTROL => self.control = true,
            c if c == CONTROL | RELEASED => self.control = false,
            CAPS_LOCK => self.caps = !self.caps,
            KEY_L if self.control => {
                self.line.clear();
                return KeyEvent::ClearScreen;
            }
            _ if self.control || code & RELEASED != 0 => {}
            ENTER => {
                if self.line.push_newline() {
                    return KeyEvent::Echo(b'\n');
                }
            }
            BACKSPACE => {
                if let Some(byte) = self.line.pop() {
                    let cells = if byte == b'\t' { TAB_WIDTH } else { 1 };
                    return KeyEvent::Erase(cells);
                }
            }
            TAB => {
                if self.line.push_char(b'\t') {
                    return KeyEvent::Echo(b'\t');
                }
            }
            _ => {
                if let Some(byte) = self.translate(code) {
                    if self.line.push_char(byte) {
                        return KeyEvent::Echo(byte);
                    }
                }
            }
        }
        KeyEvent::Ignored
    }

    pub fn take_line(&mut self, out: &mut [u8]) -> Option<usize> {
        self.line.take_line(out)
    }

    pub fn discard_input(&mut self) {
        self.line.clear();
    }

    pub fn pending(&self) -> usize {
        self.line.len()
    }
}

/// IRQ 1: translate the scancode and echo the result.
pub fn handle_interrupt() {
    let code = unsafe { arch::inb(DATA_PORT) };
    let event = KEYBOARD.exclusive_access().handle_scancode(code);
    let mut screen = SCREEN.exclusive_access();
    match event {
        KeyEvent::Echo(byte) => screen.write_bytes(&[byte]),
        KeyEvent::Erase(cells) => screen.erase(cells),
        KeyEvent::ClearScreen => screen.clear(),
        KeyEvent::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // scancode for a lowercase letter or digit on a US layout
    fn scancode_of(byte: u8) -> u8 {
        NORMAL.iter().position(|&b| b == byte).unwrap() as u8
    }

    fn type_line(keyboard: &mut Keyboard, text: &[u8]) {
        for &byte in text {
            keyboard.handle_scancode(scancode_of(byte));
        }
        keyboard.handle_scancode(ENTER);
    }

    #[test]
    fn plain_keys_echo_and_complete_a_line() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.handle_scancode(0x23), KeyEvent::Echo(b'h'));
        assert_eq!(keyboard.handle_scancode(0x17), KeyEvent::Echo(b'i'));
        assert_eq!(keyboard.handle_scancode(0x23 | RELEASED), KeyEvent::Ignored);
        let mut out = [0u8; 16];
        assert_eq!(keyboard.take_line(&mut out), None);
        assert_eq!(keyboard.handle_scancode(ENTER), KeyEvent::Echo(b'\n'));
        assert_eq!(keyboard.take_line(&mut out), Some(2));
        assert_eq!(&out[..2], b"hi");
        assert_eq!(keyboard.pending(), 0);
    }

    #[test]
    fn shift_and_caps_lock() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_scancode(LEFT_SHIFT);
        assert_eq!(keyboard.handle_scancode(0x02), KeyEvent::Echo(b'!'));
        assert_eq!(keyboard.handle_scancode(0x1E), KeyEvent::Echo(b'A'));
        keyboard.handle_scancode(LEFT_SHIFT | RELEASED);
        keyboard.handle_scancode(CAPS_LOCK);
        assert_eq!(keyboard.handle_scancode(0x1E), KeyEvent::Echo(b'A'));
        assert_eq!(keyboard.handle_scancode(0x02), KeyEvent::Echo(b'1'));
        keyboard.handle_scancode(RIGHT_SHIFT);
        assert_eq!(keyboard.handle_scancode(0x1E), KeyEvent::Echo(b'a'));
    }

    #[test]
    fn backspace_erases_tabs_as_four_cells_but_not_past_a_line() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_scancode(TAB);
        keyboard.handle_scancode(0x1E);
        assert_eq!(keyboard.handle_scancode(BACKSPACE), KeyEvent::Erase(1));
        assert_eq!(keyboard.handle_scancode(BACKSPACE), KeyEvent::Erase(TAB_WIDTH));
        assert_eq!(keyboard.handle_scancode(BACKSPACE), KeyEvent::Ignored);
        type_line(&mut keyboard, b"ls");
        assert_eq!(keyboard.handle_scancode(BACKSPACE), KeyEvent::Ignored);
    }

    #[test]
    fn control_l_clears_screen_and_pending_input() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_scancode(0x1E);
        keyboard.handle_scancode(CONTROL);
        assert_eq!(keyboard.handle_scancode(KEY_L), KeyEvent::ClearScreen);
        assert_eq!(keyboard.handle_scancode(0x1E), KeyEvent::Ignored);
        keyboard.handle_scancode(CONTROL | RELEASED);
        assert_eq!(keyboard.pending(), 0);
    }

    #[test]
    fn full_buffer_only_accepts_enter_and_backspace() {
        let mut keyboard = Keyboard::new();
        for _ in 0..KEYBOARD_BUFFER_SIZE + 10 {
            keyboard.handle_scancode(0x1E);
        }
        assert_eq!(keyboard.pending(), KEYBOARD_BUFFER_SIZE - 1);
        assert_eq!(keyboard.handle_scancode(0x1E), KeyEvent::Ignored);
        assert_eq!(keyboard.handle_scancode(BACKSPACE), KeyEvent::Erase(1));
        keyboard.handle_scancode(0x1E);
        assert_eq!(keyboard.handle_scancode(ENTER), KeyEvent::Echo(b'\n'));
        let mut out = [0u8; KEYBOARD_BUFFER_SIZE];
        assert_eq!(keyboard.take_line(&mut out), Some(KEYBOARD_BUFFER_SIZE - 1));
    }

    #[test]
    fn short_reads_truncate_and_consume_the_line() {
        let mut keyboard = Keyboard::new();
        type_line(&mut keyboard, b"cat frame0");
        type_line(&mut keyboard, b"ls");
        let mut out = [0u8; 3];
        assert_eq!(keyboard.take_line(&mut out), Some(3));
        assert_eq!(&out, b"cat");
        let mut out = [0u8; 8];
        assert_eq!(keyboard.take_line(&mut out), Some(2));
        assert_eq!(&out[..2], b"ls");
    }
}
