#![no_std]
#![no_main]

#[macro_use]
extern crate nestos;
#[macro_use]
extern crate log;

mod lang_items;

use nestos::arch::{self, gdt, idt, multiboot};
use nestos::config::{GREEN, KEYBOARD_IRQ, RESET};
use nestos::drivers::{pic::PIC, rtc, vga::SCREEN};
use nestos::mem::ADDRESS_SPACE;
use nestos::{fs, logging, process};

#[no_mangle]
extern "C" fn rust_main(magic: u32, info: usize) -> ! {
    arch::serial_init();
    logging::init();
    println!("{}[kernel] nestos booting{}", GREEN, RESET);

    gdt::init();
    idt::init();
    PIC.init();

    // the multiboot structures sit in low memory that paging leaves unmapped
    let image = unsafe { multiboot::first_module(magic, info) };
    match image.map(fs::mount) {
        Some(Ok(())) => {}
        Some(Err(err)) => error!("[kernel] boot module is not a file system: {}", err),
        None => error!("[kernel] no boot module, nothing to run"),
    }

    ADDRESS_SPACE.exclusive_access().activate();
    SCREEN.exclusive_access().clear();
    PIC.enable_irq(KEYBOARD_IRQ);
    rtc::init();
    info!("[kernel] devices ready, starting the shell");

    process::launch_shell()
}
