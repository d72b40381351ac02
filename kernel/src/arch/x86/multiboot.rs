// just enough of the multiboot v1 information structure to find the
// file system image, which is loaded as the first boot module

pub const BOOTLOADER_MAGIC: u32 = 0x2BAD_B002;
const FLAG_MODULES: u32 = 1 << 3;

#[repr(C)]
struct ModuleEntry {
    start: u32,
    end: u32,
    string: u32,
    reserved: u32,
}

pub unsafe fn first_module(magic: u32, info: usize) -> Option<&'static [u8]> {
    if magic != BOOTLOADER_MAGIC {
        return None;
    }
    let words = info as *const u32;
    let flags = words.read();
    if flags & FLAG_MODULES == 0 {
        return None;
    }
    let count = words.add(5).read();
    let modules = words.add(6).read() as *const ModuleEntry;
    if count == 0 || modules.is_null() {
        return None;
    }
    let module = &*modules;
    if module.end <= module.start {
        return None;
    }
    Some(core::slice::from_raw_parts(
        module.start as *const u8,
        (module.end - module.start) as usize,
    ))
}
