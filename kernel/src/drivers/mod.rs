pub mod keyboard;
pub mod pic;
pub mod rtc;
pub mod terminal;
pub mod vga;
