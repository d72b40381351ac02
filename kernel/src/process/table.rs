//! Fixed arena of process control blocks and the bookkeeping half of the
//! execute/halt protocol. Control transfer itself lives in `process::execute`
//! and `process::halt_current`; everything here returns normally so it can
//! be exercised on the host.

use super::{FileDescriptor, Pid, ProcessControlBlock, ProcessState, ProgramImage, SavedContext};
use crate::config::*;
use crate::error::{KernelError, SysResult};
use crate::fs::BootFs;
use crate::mem::{AddressSpace, VirtAddr};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaltStatus {
    Exited(u8),
    // an exception ended the process
    Faulted,
}

impl HaltStatus {
    /// What the parent's execute call evaluates to.
    pub fn return_value(self) -> isize {
        match self {
            HaltStatus::Exited(status) => status as isize,
            HaltStatus::Faulted => HALT_FAULT_STATUS,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Launch {
    pub pid: Pid,
    pub program: ProgramImage,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HaltOutcome {
    /// Jump back into the parent's execute call.
    Resume { parent: Pid, context: SavedContext, value: isize },
    /// The root shell went away; start a fresh one.
    RestartShell,
}

/// Program name and argument string split out of a command line.
struct CommandLine {
    name: [u8; MAX_NAME_LENGTH],
    name_len: usize,
    args: [u8; ARGS_CAPACITY],
    args_len: usize,
}

impl CommandLine {
    fn parse(command: &[u8]) -> SysResult<Self> {
        let end = command.iter().position(|&b| b == 0 || b == b'\n').unwrap_or(command.len());
        let line = &command[..end];
        let start = line.iter().position(|&b| b != b' ').unwrap_or(line.len());
        let line = &line[start..];
        let name_end = line.iter().position(|&b| b == b' ').unwrap_or(line.len());
        if name_end == 0 {
            return Err(KernelError::EmptyCommand);
        }
        let rest = &line[name_end..];
        let args_start = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
        let args_end = rest.iter().rposition(|&b| b != b' ').map_or(args_start, |i| i + 1);
        let args = &rest[args_start..args_end];

        let mut parsed = CommandLine {
            name: [0; MAX_NAME_LENGTH],
            name_len: name_end.min(MAX_NAME_LENGTH),
            args: [0; ARGS_CAPACITY],
            args_len: args.len().min(ARGS_CAPACITY),
        };
        parsed.name[..parsed.name_len].copy_from_slice(&line[..parsed.name_len]);
        parsed.args[..parsed.args_len].copy_from_slice(&args[..parsed.args_len]);
        Ok(parsed)
    }

    fn name(&self) -> &[u8] {
        &self.name[..self.name_len]
    }

    fn args(&self) -> &[u8] {
        &self.args[..self.args_len]
    }
}

pub struct ProcessTable {
    pcbs: [ProcessControlBlock; MAX_PROCESSES],
    current: Option<Pid>,
    live: usize,
}

impl ProcessTable {
    pub fn new() -> Self {
        ProcessTable {
            pcbs: core::array::from_fn(|index| ProcessControlBlock::empty(Pid(index))),
            current: None,
            live: 0,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn current_pid(&self) -> Option<Pid> {
        self.current
    }

    pub fn current(&self) -> Option<&ProcessControlBlock> {
        self.current.map(|pid| &self.pcbs[pid.0])
    }

    pub fn current_mut(&mut self) -> Option<&mut ProcessControlBlock> {
        match self.current {
            Some(pid) => Some(&mut self.pcbs[pid.0]),
            None => None,
        }
    }

    pub fn get(&self, pid: Pid) -> Option<&ProcessControlBlock> {
        self.pcbs.get(pid.0)
    }

    /// Where `enter_user` records the parent's kernel stack for `pid`. The
    /// table lives in a static, so the pointer outlives the borrow.
    pub fn saved_context_ptr(&mut self, pid: Pid) -> *mut SavedContext {
        &mut self.pcbs[pid.0].saved_context
    }

    fn free_slot(&self) -> Option<Pid> {
        self.pcbs.iter().find(|pcb| !pcb.is_active()).map(|pcb| pcb.pid)
    }

    /// Validate `command` and commit a new process for it, making it
    /// current and binding its frame. Nothing is touched unless every
    /// check passes.
    pub fn execute(&mut self, command: &[u8], fs: &BootFs, space: &mut AddressSpace) -> SysResult<Launch> {
        if self.live >= MAX_PROCESSES {
            return Err(KernelError::TooManyProcesses);
        }
        let line = CommandLine::parse(command)?;
        let dentry = fs.dentry_by_name(line.name()).ok_or(KernelError::NotFound)?;
        let program = ProgramImage::inspect(fs, &dentry)?;
        let pid = self.free_slot().ok_or(KernelError::TooManyProcesses)?;

        let parent = self.current;
        if let Some(parent) = parent {
            self.pcbs[parent.0].state = ProcessState::Waiting;
        }
        let pcb = &mut self.pcbs[pid.0];
        pcb.clear();
        pcb.parent = parent;
        pcb.install_stdio();
        pcb.set_command(line.name(), line.args());
        pcb.state = ProcessState::Running;
        self.live += 1;
        self.current = Some(pid);

        space.bind(VirtAddr(USER_REGION_START), pid.frame());
        space.invalidate_all();
        info!("[kernel] execute pid {} (parent {:?})", pid.0, parent.map(|p| p.0));
        Ok(Launch { pid, program })
    }

    /// Tear down the current process and work out where control goes next.
    pub fn halt(&mut self, status: HaltStatus, space: &mut AddressSpace) -> HaltOutcome {
        let Some(pid) = self.current else {
            warn!("[kernel] halt with no running process");
            return HaltOutcome::RestartShell;
        };
        let pcb = &mut self.pcbs[pid.0];
        for desc in pcb.fds.iter_mut().skip(STDOUT_FD + 1) {
            if let (true, Some(ops)) = (desc.in_use, desc.ops) {
                if ops.close().is_err() {
                    warn!("[kernel] close failed while halting pid {}", pid.0);
                }
            }
            *desc = FileDescriptor::UNUSED;
        }
        let parent = pcb.parent;
        let context = pcb.saved_context;
        pcb.clear();
        self.live -= 1;
        info!("[kernel] halt pid {} with {:?}", pid.0, status);

        let Some(parent) = parent else {
            self.current = None;
            return HaltOutcome::RestartShell;
        };
        self.pcbs[parent.0].state = ProcessState::Running;
        self.current = Some(parent);
        space.bind(VirtAddr(USER_REGION_START), parent.frame());
        space.invalidate_all();
        HaltOutcome::Resume { parent, context, value: status.return_value() }
    }
}
