#![no_std]
#![no_main]

#[macro_use]
extern crate user_lib;

use user_lib::{c_str_len, close, getargs, open, read, write, STDOUT};

#[no_mangle]
pub fn main() -> i32 {
    let mut args = [0u8; 128];
    if getargs(&mut args) < 0 {
        println!("usage: cat <file>");
        return 3;
    }
    let name = &args[..c_str_len(&args)];
    let fd = open(name);
    if fd < 0 {
        println!("file open failed");
        return 2;
    }
    let fd = fd as i32;
    let mut chunk = [0u8; 1024];
    loop {
        let count = read(fd, &mut chunk);
        if count < 0 {
            println!("file read failed");
            return 3;
        }
        if count == 0 {
            break;
        }
        write(STDOUT, &chunk[..count as usize]);
    }
    close(fd);
    0
}
