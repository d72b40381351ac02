//! Process records and the execute/halt control transfer.

mod context;
mod file_ops;
mod kernel_stack;
mod loader;
mod pcb;
mod table;

pub use context::SavedContext;
pub use file_ops::FileOps;
pub use kernel_stack::kernel_stack_position;
pub use loader::ProgramImage;
pub use pcb::{FileDescriptor, Pid, ProcessControlBlock, ProcessState};
pub use table::{HaltOutcome, HaltStatus, Launch, ProcessTable};

use crate::arch;
use crate::config::{DEFAULT_SHELL, USER_STACK_TOP};
use crate::error::SysResult;
use crate::fs;
use crate::mem::ADDRESS_SPACE;
use sync::UPSafeCell;

lazy_static! {
    /// The only way to reach "the current process" is through this table's
    /// `current()` accessors; it changes only in execute and halt.
    pub static ref PROCESS_TABLE: UPSafeCell<ProcessTable> =
        unsafe { UPSafeCell::new(ProcessTable::new()) };
}

/// Start `command` as a child of the current process and run it. Returns
/// early on a validation failure; otherwise returns only once the child
/// halts, with the child's status.
pub fn execute(command: &[u8]) -> SysResult<isize> {
    let fs = fs::mounted()?;
    // both borrows end before control leaves this function
    let (launch, context) = {
        let mut table = PROCESS_TABLE.exclusive_access();
        let mut space = ADDRESS_SPACE.exclusive_access();
        let launch = table.execute(command, &fs, &mut space)?;
        debug_assert!(!space.is_stale());
        let context = table.saved_context_ptr(launch.pid);
        (launch, context)
    };
    // the new frame is bound, so the parent's image is out of reach
    launch.program.load_into(&fs, unsafe { arch::user_image_window() });
    let (_, kernel_stack_top) = kernel_stack_position(launch.pid);
    arch::set_kernel_stack(kernel_stack_top);
    let status = unsafe { arch::enter_user(context, launch.program.entry(), USER_STACK_TOP) };
    Ok(status)
}

/// End the current process and continue in its parent, or restart the
/// shell when the root goes away.
pub fn halt_current(status: HaltStatus) -> ! {
    let outcome = {
        let mut table = PROCESS_TABLE.exclusive_access();
        let mut space = ADDRESS_SPACE.exclusive_access();
        table.halt(status, &mut space)
    };
    match outcome {
        HaltOutcome::Resume { parent, context, value } => {
            let (_, kernel_stack_top) = kernel_stack_position(parent);
            arch::set_kernel_stack(kernel_stack_top);
            unsafe { arch::resume(&context, value) }
        }
        HaltOutcome::RestartShell => {
            warn!("[kernel] root shell halted, starting a new one");
            launch_shell()
        }
    }
}

/// Run the default shell as the root process. Never comes back: the root
/// has no parent to resume.
pub fn launch_shell() -> ! {
    let result = execute(DEFAULT_SHELL);
    panic!("cannot run the root shell: {:?}", result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::test_support;

    #[test]
    fn failed_execute_returns_without_touching_state() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        assert_eq!(execute(b"nonexistent_program"), Err(KernelError::NotFound));
        assert_eq!(execute(b""), Err(KernelError::EmptyCommand));
        assert_eq!(PROCESS_TABLE.exclusive_access().live_count(), 0);
        assert!(ADDRESS_SPACE.exclusive_access().user_frame().is_none());
    }

    #[test]
    #[should_panic(expected = "no user region")]
    fn successful_execute_transfers_control() {
        let _guard = test_support::lock();
        test_support::reset_kernel();
        // the host back end has no user region, so loading stops the test
        let _ = execute(b"hello");
    }
}
