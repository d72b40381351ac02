use crate::halt;

#[panic_handler]
fn panic_handler(info: &core::panic::PanicInfo) -> ! {
    match info.location() {
        Some(location) => println!(
            "panicked at {}:{} {}",
            location.file(),
            location.line(),
            info.message()
        ),
        None => println!("panicked: {}", info.message()),
    }
    halt(255)
}
