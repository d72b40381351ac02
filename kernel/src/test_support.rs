//! Fixtures shared by the unit tests: a file-system image builder, a sample
//! boot image, and resets for the global kernel state.

use crate::drivers::keyboard::{Keyboard, KEYBOARD, NORMAL};
use crate::drivers::rtc::RTC;
use crate::drivers::vga::SCREEN;
use crate::fs::{self, BLOCK_SIZE, DENTRY_SIZE};
use crate::mem::{AddressSpace, ADDRESS_SPACE};
use crate::process::{Launch, ProcessTable, PROCESS_TABLE};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const ENTER: u8 = 0x1C;
// boot block header: three counts, then reserved space
const HEADER_SIZE: usize = 64;

pub const FRAME0: &[u8] = b"/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\\n\
o\n\
 o    o\n\
     o\n\
    o     ___________\n\
          /              \\\n\
         |   fish    o   |\n";

static GLOBAL_STATE: Mutex<()> = Mutex::new(());

/// Serialize tests that touch the kernel globals. A test that panics on
/// purpose poisons the mutex, which is harmless here.
pub fn lock() -> MutexGuard<'static, ()> {
    GLOBAL_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Entry {
    Device,
    File(Vec<u8>),
}

/// Builds boot-block images. The "." directory entry always comes first.
pub struct FsBuilder {
    entries: Vec<(String, Entry)>,
}

impl FsBuilder {
    pub fn new() -> Self {
        FsBuilder { entries: Vec::new() }
    }

    pub fn device(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), Entry::Device));
        self
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.push((name.to_string(), Entry::File(content.to_vec())));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let files: Vec<&Vec<u8>> = self
            .entries
            .iter()
            .filter_map(|(_, entry)| match entry {
                Entry::File(content) => Some(content),
                Entry::Device => None,
            })
            .collect();
        let data_blocks: usize = files.iter().map(|content| content.len().div_ceil(BLOCK_SIZE)).sum();
        let mut image = vec![0u8; (1 + files.len() + data_blocks) * BLOCK_SIZE];
        put_u32(&mut image, 0, self.entries.len() as u32 + 1);
        put_u32(&mut image, 4, files.len() as u32);
        put_u32(&mut image, 8, data_blocks as u32);
        put_dentry(&mut image, 0, ".", 1, 0);

        let data_start = (1 + files.len()) * BLOCK_SIZE;
        let mut inode = 0;
        let mut next_block = 0;
        for (index, (name, entry)) in self.entries.iter().enumerate() {
            let content = match entry {
                Entry::Device => {
                    put_dentry(&mut image, index + 1, name, 0, 0);
                    continue;
                }
                Entry::File(content) => content,
            };
            put_dentry(&mut image, index + 1, name, 2, inode);
            let inode_base = (1 + inode as usize) * BLOCK_SIZE;
            put_u32(&mut image, inode_base, content.len() as u32);
            for (slot, chunk) in content.chunks(BLOCK_SIZE).enumerate() {
                put_u32(&mut image, inode_base + 4 + slot * 4, next_block);
                let at = data_start + next_block as usize * BLOCK_SIZE;
                image[at..at + chunk.len()].copy_from_slice(chunk);
                next_block += 1;
            }
            inode += 1;
        }
        image
    }

    pub fn leak(&self) -> &'static [u8] {
        Box::leak(self.build().into_boxed_slice())
    }
}

fn put_u32(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_dentry(image: &mut [u8], index: usize, name: &str, file_type: u32, inode: u32) {
    let base = HEADER_SIZE + index * DENTRY_SIZE;
    image[base..base + name.len()].copy_from_slice(name.as_bytes());
    put_u32(image, base + 32, file_type);
    put_u32(image, base + 36, inode);
}

/// An ELF32 i386 executable header with the given entry, padded to `size`.
pub fn executable(entry: u32, size: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; size.max(52)];
    bytes[..8].copy_from_slice(b"\x7fELF\x01\x01\x01\0");
    bytes[16..18].copy_from_slice(&2u16.to_le_bytes());
    bytes[18..20].copy_from_slice(&3u16.to_le_bytes());
    bytes[20..24].copy_from_slice(&1u32.to_le_bytes());
    bytes[24..28].copy_from_slice(&entry.to_le_bytes());
    bytes[40..42].copy_from_slice(&52u16.to_le_bytes());
    bytes[42..44].copy_from_slice(&32u16.to_le_bytes());
    bytes[46..48].copy_from_slice(&40u16.to_le_bytes());
    for (i, byte) in bytes.iter_mut().enumerate().skip(52) {
        *byte = (i % 199) as u8;
    }
    bytes
}

/// "." plus a clock, four programs, one text file and a file that is
/// nothing but the magic.
pub fn sample_image() -> &'static [u8] {
    static IMAGE: OnceLock<&'static [u8]> = OnceLock::new();
    IMAGE.get_or_init(|| {
        FsBuilder::new()
            .device("rtc")
            .file("shell", &executable(0x0804_8120, 5000))
            .file("hello", &executable(0x0804_80d0, 3000))
            .file("cat", &executable(0x0804_8100, 4200))
            .file("pingpong", &executable(0x0804_8094, 2600))
            .file("frame0.txt", FRAME0)
            .file("tiny", b"\x7fELF")
            .leak()
    })
}

pub fn reset_devices() {
    *KEYBOARD.exclusive_access() = Keyboard::new();
    SCREEN.exclusive_access().clear();
    RTC.open();
}

/// Fresh process table and address space with the sample image mounted.
pub fn reset_kernel() {
    fs::mount(sample_image()).unwrap();
    *PROCESS_TABLE.exclusive_access() = ProcessTable::new();
    *ADDRESS_SPACE.exclusive_access() = AddressSpace::new_kernel();
    reset_devices();
}

/// Commit a process for `command` without transferring control to it.
pub fn start(command: &[u8]) -> Launch {
    let fs = fs::mounted().unwrap();
    let mut table = PROCESS_TABLE.exclusive_access();
    let mut space = ADDRESS_SPACE.exclusive_access();
    table.execute(command, &fs, &mut space).unwrap()
}

/// Feed key presses for `text` to the keyboard; '\n' is Enter.
pub fn type_keys(text: &[u8]) {
    let mut keyboard = KEYBOARD.exclusive_access();
    for &byte in text {
        let code = match byte {
            b'\n' => ENTER,
            _ => NORMAL.iter().position(|&b| b == byte).unwrap() as u8,
        };
        keyboard.handle_scancode(code);
    }
}
