// validates executables and copies them into the user image window

use crate::config::{ENTRY_POINT_OFFSET, EXECUTABLE_MAGIC};
use crate::error::{KernelError, SysResult};
use crate::fs::{BootFs, Dentry, FileType};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgramImage {
    inode: u32,
    entry: usize,
    length: u32,
}

impl ProgramImage {
    /// Check the magic and read the entry point. Any short read fails.
    pub fn inspect(fs: &BootFs, dentry: &Dentry) -> SysResult<Self> {
        if dentry.file_type != FileType::Regular {
            return Err(KernelError::NotExecutable);
        }
        let mut magic = [0u8; 4];
        if fs.read_data(dentry.inode, 0, &mut magic) != magic.len() || magic != EXECUTABLE_MAGIC {
            return Err(KernelError::NotExecutable);
        }
        let mut entry = [0u8; 4];
        if fs.read_data(dentry.inode, ENTRY_POINT_OFFSET as u32, &mut entry) != entry.len() {
            return Err(KernelError::NotExecutable);
        }
        let length = fs.inode_length(dentry.inode).ok_or(KernelError::NotExecutable)?;
        Ok(ProgramImage {
            inode: dentry.inode,
            entry: u32::from_le_bytes(entry) as usize,
            length,
        })
    }

    pub fn entry(&self) -> usize {
        self.entry
    }

    /// Flat copy of the whole file to the start of `window`.
    pub fn load_into(&self, fs: &BootFs, window: &mut [u8]) -> usize {
        let copied = fs.read_data(self.inode, 0, window);
        if copied < self.length as usize {
            warn!("[loader] image of {} bytes cut to {}", self.length, copied);
        }
        match xmas_elf::header::parse_header(&window[..copied]) {
            Ok(header) => {
                if header.pt2.entry_point() != self.entry as u64 {
                    warn!(
                        "[loader] header entry {:#x} differs from raw entry {:#x}",
                        header.pt2.entry_point(),
                        self.entry
                    );
                }
                debug!("[loader] {:?} image, {} bytes, entry {:#x}", header.pt1.class(), copied, self.entry);
            }
            Err(reason) => debug!("[loader] header not parsed ({}), loading raw", reason),
        }
        return copied;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{executable, FsBuilder};

    fn inspect(content: &[u8]) -> SysResult<ProgramImage> {
        let image = FsBuilder::new().file("prog", content).build();
        let fs = BootFs::new(&image).unwrap();
        let dentry = fs.dentry_by_name(b"prog").unwrap();
        ProgramImage::inspect(&fs, &dentry)
    }

    #[test]
    fn entry_point_is_little_endian_at_offset_24() {
        let program = inspect(&executable(0x0804_8094, 64)).unwrap();
        assert_eq!(program.entry(), 0x0804_8094);
    }

    #[test]
    fn bad_magic_is_not_executable() {
        assert_eq!(inspect(b"#!/bin/sh\necho hi\nand more text"), Err(KernelError::NotExecutable));
    }

    #[test]
    fn short_header_is_not_executable() {
        assert_eq!(inspect(b"\x7fELF"), Err(KernelError::NotExecutable));
        assert_eq!(inspect(b"\x7fELF\x01\x01\x01\0\0\0\0\0\0\0\0\0\x02\0\x03\0\x01\0\0\0\x94\x80"), Err(KernelError::NotExecutable));
        assert_eq!(inspect(b""), Err(KernelError::NotExecutable));
    }

    #[test]
    fn directories_and_devices_are_not_executable() {
        let image = FsBuilder::new().device("rtc").build();
        let fs = BootFs::new(&image).unwrap();
        for name in [&b"."[..], b"rtc"] {
            let dentry = fs.dentry_by_name(name).unwrap();
            assert_eq!(ProgramImage::inspect(&fs, &dentry), Err(KernelError::NotExecutable));
        }
    }

    #[test]
    fn load_copies_the_whole_file() {
        let content = executable(0x0804_8054, 6000);
        let image = FsBuilder::new().file("prog", &content).build();
        let fs = BootFs::new(&image).unwrap();
        let program = ProgramImage::inspect(&fs, &fs.dentry_by_name(b"prog").unwrap()).unwrap();
        let mut window = vec![0u8; 16 * 1024];
        assert_eq!(program.load_into(&fs, &mut window), content.len());
        assert_eq!(&window[..content.len()], &content[..]);
        assert!(window[content.len()..].iter().all(|&b| b == 0));
    }
}
