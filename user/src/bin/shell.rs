#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{execute, halt, read, STDIN};

const PROMPT: &str = "391OS> ";
const FAULTED: isize = 256;

#[no_mangle]
pub fn main() -> i32 {
    let mut line = [0u8; 128];
    loop {
        print!("{}", PROMPT);
        let count = read(STDIN, &mut line);
        if count <= 0 {
            continue;
        }
        let command = &line[..count as usize];
        if command == b"exit" {
            halt(0);
        }
        match execute(command) {
            status if status < 0 => println!("no such command"),
            FAULTED => println!("program terminated by exception"),
            0 => {}
            status => println!("program terminated abnormally ({})", status),
        }
    }
}
