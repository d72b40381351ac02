//! The four file-operation bindings, chosen by file type at open time.

use super::FileDescriptor;
use crate::drivers::rtc::RTC;
use crate::drivers::terminal;
use crate::error::{KernelError, SysResult};
use crate::fs::{self, FileType};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileOps {
    RegularFile,
    Directory,
    Clock,
    Terminal,
}

impl FileOps {
    pub fn for_type(file_type: FileType) -> Self {
        match file_type {
            FileType::Regular => FileOps::RegularFile,
            FileType::Directory => FileOps::Directory,
            FileType::Rtc => FileOps::Clock,
        }
    }

    pub fn open(self) -> SysResult<()> {
        match self {
            FileOps::Clock => RTC.open(),
            FileOps::Terminal => terminal::open(),
            FileOps::RegularFile | FileOps::Directory => {}
        }
        Ok(())
    }

    /// Produce bytes for `desc`. Regular files read at `desc.position`;
    /// the caller advances it by the returned count.
    pub fn read(self, desc: &mut FileDescriptor, buf: &mut [u8]) -> SysResult<usize> {
        match self {
            FileOps::RegularFile => {
                let inode = u32::try_from(desc.inode).map_err(|_| KernelError::InvalidArgument)?;
                Ok(fs::mounted()?.read_data(inode, desc.position, buf))
            }
            FileOps::Directory => {
                // one file name per read, 0 once the listing is exhausted
                let Some(dentry) = fs::mounted()?.dentry_by_index(desc.entry_index) else {
                    return Ok(0);
                };
                let name = dentry.name();
                let count = name.len().min(buf.len());
                buf[..count].copy_from_slice(&name[..count]);
                desc.entry_index += 1;
                Ok(count)
            }
            FileOps::Clock => {
                RTC.wait();
                Ok(0)
            }
            FileOps::Terminal => Ok(terminal::read(buf)),
        }
    }

    pub fn write(self, buf: &[u8]) -> SysResult<usize> {
        match self {
            FileOps::RegularFile | FileOps::Directory => Err(KernelError::InvalidArgument),
            FileOps::Clock => RTC.write(buf),
            FileOps::Terminal => Ok(terminal::write(buf)),
        }
    }

    pub fn close(self) -> SysResult<()> {
        match self {
            FileOps::Clock => RTC.close(),
            FileOps::Terminal => terminal::close(),
            FileOps::RegularFile | FileOps::Directory => {}
        }
        Ok(())
    }
}
