#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{close, open, read, write, STDOUT};

const WIDTH: usize = 79;
const BOUNCES: usize = 6;
const RATE_HZ: i32 = 32;

#[no_mangle]
pub fn main() -> i32 {
    let rtc = open(b"rtc");
    if rtc < 0 {
        println!("cannot open the clock");
        return 2;
    }
    let rtc = rtc as i32;
    if write(rtc, &RATE_HZ.to_le_bytes()) < 0 {
        println!("clock refused {} Hz", RATE_HZ);
        return 3;
    }
    let mut row = [b' '; WIDTH + 1];
    row[WIDTH] = b'\n';
    let mut tick = [0u8; 4];
    for bounce in 0..BOUNCES {
        for step in 0..WIDTH {
            let column = if bounce % 2 == 0 { step } else { WIDTH - 1 - step };
            row[column] = b'*';
            write(STDOUT, &row);
            row[column] = b' ';
            // each read blocks until the next tick at RATE_HZ
            read(rtc, &mut tick);
        }
    }
    close(rtc);
    0
}
