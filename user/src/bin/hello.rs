#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{read, write, STDIN, STDOUT};

#[no_mangle]
pub fn main() -> i32 {
    print!("Hi, what's your name? ");
    let mut name = [0u8; 32];
    let count = read(STDIN, &mut name);
    if count < 0 {
        println!("could not read your name");
        return 3;
    }
    print!("Hello, ");
    write(STDOUT, &name[..count as usize]);
    println!("");
    0
}
