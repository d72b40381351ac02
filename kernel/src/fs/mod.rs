//! Read-only boot-block file system.
//!
//! The image is a sequence of 4 KiB blocks: one boot block (counts plus up
//! to 63 directory entries), then the inodes, then the data blocks.

use crate::config::{MAX_NAME_LENGTH, PAGE_SIZE};
use crate::error::{KernelError, SysResult};
use sync::UPSafeCell;

pub const BLOCK_SIZE: usize = PAGE_SIZE;
pub const DENTRY_SIZE: usize = 64;
pub const MAX_DENTRIES: usize = 63;
const BOOT_HEADER_SIZE: usize = 64;
const BLOCKS_PER_INODE: usize = BLOCK_SIZE / 4 - 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileType {
    Rtc,
    Directory,
    Regular,
}

impl FileType {
    fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(FileType::Rtc),
            1 => Some(FileType::Directory),
            2 => Some(FileType::Regular),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Dentry {
    name: [u8; MAX_NAME_LENGTH],
    pub file_type: FileType,
    pub inode: u32,
}

impl Dentry {
    /// The name without its NUL padding; may use all 32 bytes.
    pub fn name(&self) -> &[u8] {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LENGTH);
        &self.name[..len]
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[derive(Copy, Clone)]
pub struct BootFs<'a> {
    image: &'a [u8],
    dir_count: u32,
    inode_count: u32,
    data_count: u32,
}

impl<'a> BootFs<'a> {
    /// Check the counts against the image size; `None` for a malformed image.
    pub fn new(image: &'a [u8]) -> Option<Self> {
        if image.len() < BLOCK_SIZE {
            return None;
        }
        let dir_count = read_u32(image, 0);
        let inode_count = read_u32(image, 4);
        let data_count = read_u32(image, 8);
        let needed = (inode_count as usize)
            .checked_add(data_count as usize)?
            .checked_add(1)?
            .checked_mul(BLOCK_SIZE)?;
        if dir_count as usize > MAX_DENTRIES || image.len() < needed {
            return None;
        }
        Some(BootFs { image, dir_count, inode_count, data_count })
    }

    pub fn dir_count(&self) -> u32 {
        self.dir_count
    }

    pub fn dentry_by_index(&self, index: u32) -> Option<Dentry> {
        if index >= self.dir_count {
            return None;
        }
        let base = BOOT_HEADER_SIZE + index as usize * DENTRY_SIZE;
        let raw = &self.image[base..base + DENTRY_SIZE];
        let mut name = [0u8; MAX_NAME_LENGTH];
        name.copy_from_slice(&raw[..MAX_NAME_LENGTH]);
        Some(Dentry {
            name,
            file_type: FileType::from_raw(read_u32(raw, MAX_NAME_LENGTH))?,
            inode: read_u32(raw, MAX_NAME_LENGTH + 4),
        })
    }

    /// Exact match on the full name.
    pub fn dentry_by_name(&self, name: &[u8]) -> Option<Dentry> {
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return None;
        }
        (0..self.dir_count)
            .filter_map(|index| self.dentry_by_index(index))
            .find(|dentry| dentry.name() == name)
    }

    fn inode_block(&self, inode: u32) -> Option<&'a [u8]> {
        if inode >= self.inode_count {
            return None;
        }
        let start = (1 + inode as usize) * BLOCK_SIZE;
        Some(&self.image[start..start + BLOCK_SIZE])
    }

    pub fn inode_length(&self, inode: u32) -> Option<u32> {
        self.inode_block(inode).map(|block| read_u32(block, 0))
    }

    /// Copy file bytes starting at `offset`. Returns 0 at end of file and
    /// for an invalid inode; stops short at a corrupt data block number.
    pub fn read_data(&self, inode: u32, offset: u32, buf: &mut [u8]) -> usize {
        let Some(block) = self.inode_block(inode) else {
            return 0;
        };
        let length = read_u32(block, 0) as usize;
        let mut position = offset as usize;
        let mut copied = 0;
        let data_start = (1 + self.inode_count as usize) * BLOCK_SIZE;
        while copied < buf.len() && position < length {
            let slot = position / BLOCK_SIZE;
            if slot >= BLOCKS_PER_INODE {
                break;
            }
            let data_block = read_u32(block, 4 + slot * 4);
            if data_block >= self.data_count {
                warn!("[fs] inode {} names bad data block {}", inode, data_block);
                break;
            }
            let within = position % BLOCK_SIZE;
            let chunk = (BLOCK_SIZE - within).min(length - position).min(buf.len() - copied);
            let src = data_start + data_block as usize * BLOCK_SIZE + within;
            buf[copied..copied + chunk].copy_from_slice(&self.image[src..src + chunk]);
            copied += chunk;
            position += chunk;
        }
        return copied;
    }
}

lazy_static! {
    static ref FILE_SYSTEM: UPSafeCell<Option<BootFs<'static>>> = unsafe { UPSafeCell::new(None) };
}

/// Make `image` the file system seen by `open` and `execute`.
pub fn mount(image: &'static [u8]) -> SysResult<()> {
    let fs = BootFs::new(image).ok_or(KernelError::InvalidArgument)?;
    info!(
        "[fs] mounted {} entries, {} inodes, {} data blocks",
        fs.dir_count, fs.inode_count, fs.data_count
    );
    *FILE_SYSTEM.exclusive_access() = Some(fs);
    Ok(())
}

pub fn mounted() -> SysResult<BootFs<'static>> {
    FILE_SYSTEM.exclusive_access().ok_or(KernelError::NotFound)
}
