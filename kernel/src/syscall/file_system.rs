// descriptor syscalls: read, write, open, close

use super::{user_slice, user_slice_mut, user_str};
use crate::config::{MAX_NAME_LENGTH, MAX_OPEN_FILES, STDIN_FD, STDOUT_FD};
use crate::error::{KernelError, SysResult};
use crate::fs;
use crate::process::{FileDescriptor, FileOps, PROCESS_TABLE};

fn descriptor_index(fd: i32) -> SysResult<usize> {
    match usize::try_from(fd) {
        Ok(index) if index < MAX_OPEN_FILES => Ok(index),
        _ => Err(KernelError::InvalidArgument),
    }
}

// copy of an in-use descriptor of the current process
fn current_descriptor(index: usize) -> SysResult<(FileDescriptor, FileOps)> {
    let table = PROCESS_TABLE.exclusive_access();
    let desc = table.current().ok_or(KernelError::InvalidArgument)?.fds[index];
    match desc.ops {
        Some(ops) if desc.in_use => Ok((desc, ops)),
        _ => Err(KernelError::InvalidArgument),
    }
}

pub fn sys_read(fd: i32, buf: *mut u8, nbytes: i32) -> SysResult<isize> {
    let index = descriptor_index(fd)?;
    if index == STDOUT_FD {
        return Err(KernelError::InvalidArgument);
    }
    let buf = unsafe { user_slice_mut(buf, nbytes)? };
    let (mut desc, ops) = current_descriptor(index)?;
    // no table borrow is held while a device read waits
    let count = ops.read(&mut desc, buf)?;
    desc.position += count as u32;
    let mut table = PROCESS_TABLE.exclusive_access();
    if let Some(pcb) = table.current_mut() {
        pcb.fds[index] = desc;
    }
    Ok(count as isize)
}

pub fn sys_write(fd: i32, buf: *const u8, nbytes: i32) -> SysResult<isize> {
    let index = descriptor_index(fd)?;
    if index == STDIN_FD {
        return Err(KernelError::InvalidArgument);
    }
    let buf = unsafe { user_slice(buf, nbytes)? };
    let (_, ops) = current_descriptor(index)?;
    Ok(ops.write(buf)? as isize)
}

pub fn sys_open(filename: *const u8) -> SysResult<isize> {
    // one byte past the longest name, so an over-long name fails the lookup
    let name = unsafe { user_str(filename, MAX_NAME_LENGTH + 1)? };
    let dentry = fs::mounted()?.dentry_by_name(name).ok_or(KernelError::NotFound)?;
    let ops = FileOps::for_type(dentry.file_type);
    let inode = match ops {
        FileOps::RegularFile => dentry.inode as i32,
        _ => -1,
    };
    let mut table = PROCESS_TABLE.exclusive_access();
    let pcb = table.current_mut().ok_or(KernelError::InvalidArgument)?;
    let index = pcb.alloc_fd()?;
    ops.open()?;
    pcb.fds[index] = FileDescriptor::opened(ops, inode);
    Ok(index as isize)
}

pub fn sys_close(fd: i32) -> SysResult<isize> {
    let index = descriptor_index(fd)?;
    if index == STDIN_FD || index == STDOUT_FD {
        return Err(KernelError::InvalidArgument);
    }
    let mut table = PROCESS_TABLE.exclusive_access();
    let pcb = table.current_mut().ok_or(KernelError::InvalidArgument)?;
    let desc = pcb.fds[index];
    let ops = match desc.ops {
        Some(ops) if desc.in_use => ops,
        _ => return Err(KernelError::InvalidArgument),
    };
    ops.close()?;
    pcb.fds[index] = FileDescriptor::UNUSED;
    Ok(0)
}
