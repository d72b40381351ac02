#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{close, open, read, write, STDOUT};

#[no_mangle]
pub fn main() -> i32 {
    let fd = open(b".");
    if fd < 0 {
        println!("directory open failed");
        return 2;
    }
    let fd = fd as i32;
    let mut name = [0u8; 33];
    loop {
        let count = read(fd, &mut name[..32]);
        if count < 0 {
            println!("directory entry read failed");
            return 3;
        }
        if count == 0 {
            break;
        }
        write(STDOUT, &name[..count as usize]);
        println!("");
    }
    close(fd);
    0
}
