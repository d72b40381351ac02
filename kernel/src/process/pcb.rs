use super::{FileOps, SavedContext};
use crate::config::*;
use crate::error::{KernelError, SysResult};
use crate::mem::PhyAddr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pid(pub usize);

impl Pid {
    /// The 4 MiB physical frame owned by this process id.
    pub fn frame(&self) -> PhyAddr {
        PhyAddr(USER_FRAME_BASE + self.0 * LARGE_PAGE_SIZE)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Free,    // slot unused
    Running, // innermost process of the execute chain
    Waiting, // blocked in execute until its child halts
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    pub ops: Option<FileOps>,
    pub inode: i32,
    pub position: u32,
    // next entry handed out by a directory read
    pub entry_index: u32,
    pub in_use: bool,
}

impl FileDescriptor {
    pub const UNUSED: FileDescriptor = FileDescriptor {
        ops: None,
        inode: -1,
        position: 0,
        entry_index: 0,
        in_use: false,
    };

    pub fn opened(ops: FileOps, inode: i32) -> Self {
        FileDescriptor { ops: Some(ops), inode, in_use: true, ..Self::UNUSED }
    }
}

pub struct ProcessControlBlock {
    pub pid: Pid,
    pub parent: Option<Pid>,
    pub fds: [FileDescriptor; MAX_OPEN_FILES],
    name: [u8; MAX_NAME_LENGTH],
    name_len: usize,
    args: [u8; ARGS_CAPACITY],
    args_len: usize,
    pub saved_context: SavedContext,
    pub state: ProcessState,
}

impl ProcessControlBlock {
    pub const fn empty(pid: Pid) -> Self {
        ProcessControlBlock {
            pid,
            parent: None,
            fds: [FileDescriptor::UNUSED; MAX_OPEN_FILES],
            name: [0; MAX_NAME_LENGTH],
            name_len: 0,
            args: [0; ARGS_CAPACITY],
            args_len: 0,
            saved_context: SavedContext::empty(),
            state: ProcessState::Free,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != ProcessState::Free
    }

    pub fn name(&self) -> &[u8] {
        &self.name[..self.name_len]
    }

    pub fn args(&self) -> &[u8] {
        &self.args[..self.args_len]
    }

    pub fn set_command(&mut self, name: &[u8], args: &[u8]) {
        self.name_len = name.len().min(MAX_NAME_LENGTH);
        self.name[..self.name_len].copy_from_slice(&name[..self.name_len]);
        self.args_len = args.len().min(ARGS_CAPACITY);
        self.args[..self.args_len].copy_from_slice(&args[..self.args_len]);
    }

    pub fn install_stdio(&mut self) {
        self.fds[STDIN_FD] = FileDescriptor::opened(FileOps::Terminal, -1);
        self.fds[STDOUT_FD] = FileDescriptor::opened(FileOps::Terminal, -1);
    }

    /// Lowest unused slot at or above 2.
    pub fn alloc_fd(&self) -> SysResult<usize> {
        (STDOUT_FD + 1..MAX_OPEN_FILES)
            .find(|&index| !self.fds[index].in_use)
            .ok_or(KernelError::TooManyOpenFiles)
    }

    /// Back to the state of a never-used slot, keeping only the pid.
    pub fn clear(&mut self) {
        *self = Self::empty(self.pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_follow_the_pid() {
        assert_eq!(Pid(0).frame(), PhyAddr(0x80_0000));
        assert_eq!(Pid(2).frame(), PhyAddr(0x100_0000));
    }

    #[test]
    fn descriptor_allocation_starts_after_stdio() {
        let mut pcb = ProcessControlBlock::empty(Pid(0));
        pcb.install_stdio();
        assert_eq!(pcb.alloc_fd(), Ok(2));
        for index in 2..MAX_OPEN_FILES {
            pcb.fds[index] = FileDescriptor::opened(FileOps::RegularFile, 3);
        }
        assert_eq!(pcb.alloc_fd(), Err(KernelError::TooManyOpenFiles));
        pcb.fds[5] = FileDescriptor::UNUSED;
        assert_eq!(pcb.alloc_fd(), Ok(5));
    }

    #[test]
    fn clear_zeroes_buffers_and_descriptors() {
        let mut pcb = ProcessControlBlock::empty(Pid(3));
        pcb.install_stdio();
        pcb.set_command(b"cat", b"frame0.txt");
        pcb.state = ProcessState::Running;
        pcb.clear();
        assert_eq!(pcb.pid, Pid(3));
        assert!(!pcb.is_active());
        assert!(pcb.name().is_empty() && pcb.args().is_empty());
        assert!(pcb.fds.iter().all(|fd| *fd == FileDescriptor::UNUSED));
    }
}
