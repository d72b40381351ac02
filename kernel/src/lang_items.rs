use core::panic::PanicInfo;
use nestos::arch;
use nestos::config::{RED, RESET};

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(location) = info.location() {
        println!(
            "{}[kernel] panicked at {}:{} {}{}",
            RED,
            location.file(),
            location.line(),
            info.message(),
            RESET
        );
    } else {
        println!("{}[kernel] panicked: {}{}", RED, info.message(), RESET);
    }
    arch::halt_forever()
}
