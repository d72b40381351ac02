use core::fmt;

/// Every way a system call can fail. The numeric code is the only thing
/// that crosses the user boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// null buffer, negative length, bad descriptor, wrong permission
    InvalidArgument,
    NotFound,
    NotExecutable,
    TooManyProcesses,
    TooManyOpenFiles,
    EmptyCommand,
    Unsupported,
}

pub type SysResult<T> = Result<T, KernelError>;

impl KernelError {
    pub fn code(self) -> isize {
        match self {
            KernelError::InvalidArgument => -1,
            KernelError::NotFound => -2,
            KernelError::NotExecutable => -3,
            KernelError::TooManyProcesses => -4,
            KernelError::TooManyOpenFiles => -5,
            KernelError::EmptyCommand => -6,
            KernelError::Unsupported => -7,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            KernelError::InvalidArgument => "invalid argument",
            KernelError::NotFound => "no such file",
            KernelError::NotExecutable => "not an executable",
            KernelError::TooManyProcesses => "process table full",
            KernelError::TooManyOpenFiles => "descriptor table full",
            KernelError::EmptyCommand => "empty command",
            KernelError::Unsupported => "not supported",
        };
        f.write_str(text)
    }
}

// collapse a syscall result into the single integer returned in eax
pub fn into_return_value(result: SysResult<isize>) -> isize {
    match result {
        Ok(value) => value,
        Err(err) => err.code(),
    }
}
