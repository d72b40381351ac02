// 80x25 colour text mode

use crate::arch;
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use sync::UPSafeCell;

const DEFAULT_ATTRIBUTE: u8 = 0x07; // light grey on black
const TAB_WIDTH: usize = 4;
const CRTC_INDEX: u16 = 0x3D4;
const CRTC_DATA: u16 = 0x3D5;

lazy_static! {
    pub static ref SCREEN: UPSafeCell<Screen> =
        unsafe { UPSafeCell::new(Screen::new(arch::text_buffer())) };
}

pub struct Screen {
    buffer: *mut u16,
    x: usize,
    y: usize,
    attribute: u8,
}

// the text buffer is a fixed memory-mapped region, owned by whoever holds the screen
unsafe impl Send for Screen {}

static_assertions::assert_impl_all!(Screen: Send);

impl Screen {
    /// `buffer` must point at `SCREEN_WIDTH * SCREEN_HEIGHT` writable cells.
    pub unsafe fn new(buffer: *mut u16) -> Self {
        Screen { buffer, x: 0, y: 0, attribute: DEFAULT_ATTRIBUTE }
    }

    fn write_cell(&mut self, x: usize, y: usize, byte: u8) {
        let cell = ((self.attribute as u16) << 8) | byte as u16;
        unsafe { self.buffer.add(y * SCREEN_WIDTH + x).write_volatile(cell) };
    }

    fn read_cell(&self, x: usize, y: usize) -> u16 {
        unsafe { self.buffer.add(y * SCREEN_WIDTH + x).read_volatile() }
    }

    pub fn byte_at(&self, x: usize, y: usize) -> u8 {
        self.read_cell(x, y) as u8
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    fn scroll(&mut self) {
        for y in 1..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let cell = self.read_cell(x, y);
                unsafe { self.buffer.add((y - 1) * SCREEN_WIDTH + x).write_volatile(cell) };
            }
        }
        for x in 0..SCREEN_WIDTH {
            self.write_cell(x, SCREEN_HEIGHT - 1, b' ');
        }
    }

    fn newline(&mut self) {
        self.x = 0;
        if self.y + 1 == SCREEN_HEIGHT {
            self.scroll();
        } else {
            self.y += 1;
        }
    }

    fn put_visible(&mut self, byte: u8) {
        self.write_cell(self.x, self.y, byte);
        self.x += 1;
        if self.x == SCREEN_WIDTH {
            self.newline();
        }
    }

    pub fn put_byte(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' => self.newline(),
            b'\t' => (0..TAB_WIDTH).for_each(|_| self.put_visible(b' ')),
            0x08 => self.erase(1),
            0 => {}
            _ => self.put_visible(byte),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        bytes.iter().for_each(|&byte| self.put_byte(byte));
        self.update_cursor();
    }

    /// Blank the `count` cells before the cursor, wrapping to earlier lines.
    pub fn erase(&mut self, count: usize) {
        for _ in 0..count {
            if self.x == 0 {
                if self.y == 0 {
                    break;
                }
                self.y -= 1;
                self.x = SCREEN_WIDTH;
            }
            self.x -= 1;
            self.write_cell(self.x, self.y, b' ');
        }
        self.update_cursor();
    }

    pub fn clear(&mut self) {
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                self.write_cell(x, y, b' ');
            }
        }
        self.x = 0;
        self.y = 0;
        self.update_cursor();
    }

    fn update_cursor(&self) {
        let position = (self.y * SCREEN_WIDTH + self.x) as u16;
        unsafe {
            arch::outb(CRTC_INDEX, 0x0F);
            arch::outb(CRTC_DATA, position as u8);
            arch::outb(CRTC_INDEX, 0x0E);
            arch::outb(CRTC_DATA, (position >> 8) as u8);
        }
    }
}
