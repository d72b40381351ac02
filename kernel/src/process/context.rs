#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
// kernel stack state captured when execute hands the CPU to a new program;
// resuming it makes that execute call return
pub struct SavedContext {
    /// esp after the callee-saved registers were pushed
    pub esp: usize,
    /// ebp of the execute call
    pub ebp: usize,
}

static_assertions::assert_eq_size!(SavedContext, [usize; 2]);

impl SavedContext {
    pub const fn empty() -> Self {
        Self { esp: 0, ebp: 0 }
    }
}
