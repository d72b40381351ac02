use std::env;

fn main() {
    // the linker script only applies to the multiboot image
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        let dir = env::var("CARGO_MANIFEST_DIR").unwrap();
        println!("cargo:rustc-link-arg-bins=-T{}/src/linker.ld", dir);
    }
    println!("cargo:rerun-if-changed=src/linker.ld");
}
