#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{close, open, read, vidmap};

const SCREEN_WIDTH: usize = 80;
const FRAMES: [&[u8]; 2] = [b"frame0.txt", b"frame1.txt"];
const LOOPS: usize = 40;
const RATE_HZ: i32 = 8;

// draw one frame file into the top left corner of the screen
fn draw(screen: *mut u8, name: &[u8]) -> bool {
    let fd = open(name);
    if fd < 0 {
        return false;
    }
    let mut text = [0u8; 1024];
    let count = read(fd as i32, &mut text);
    close(fd as i32);
    if count < 0 {
        return false;
    }
    let (mut x, mut y) = (0, 0);
    for &byte in &text[..count as usize] {
        if byte == b'\n' {
            x = 0;
            y += 1;
            continue;
        }
        if x < SCREEN_WIDTH {
            // two bytes per cell: character, then attribute
            unsafe { screen.add((y * SCREEN_WIDTH + x) * 2).write_volatile(byte) };
        }
        x += 1;
    }
    true
}

#[no_mangle]
pub fn main() -> i32 {
    let Some(screen) = vidmap() else {
        println!("vidmap failed");
        return 2;
    };
    let rtc = open(b"rtc");
    if rtc < 0 {
        println!("cannot open the clock");
        return 2;
    }
    let rtc = rtc as i32;
    user_lib::write(rtc, &RATE_HZ.to_le_bytes());
    let mut tick = [0u8; 4];
    for round in 0..LOOPS {
        if !draw(screen, FRAMES[round % FRAMES.len()]) {
            println!("missing frame file");
            return 3;
        }
        read(rtc, &mut tick);
    }
    close(rtc);
    0
}
