// kernel console on the serial line; user-visible output goes to the
// terminal driver instead

use crate::arch::serial_putchar;
use core::fmt::{self, Write};

struct Stdout;

#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?));
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));
    }
}

pub fn print(args: fmt::Arguments) {
    // Stdout never fails, a formatting error from a Display impl is dropped
    let _ = Stdout.write_fmt(args);
}

impl Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                serial_putchar(b'\r');
            }
            serial_putchar(byte);
        }
        Ok(())
    }
}
