// requested privilege level bits of a selector
const RPL_MASK: u32 = 0x3;
const USER_RPL: u32 = 3;

/// Registers as laid out by `nestos_trap_common`: segment registers, then
/// `pushad`, then the vector stub's two words and the cpu's own frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct TrapFrame {
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub kernel_esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub vector: u32,
    pub error_code: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    // only pushed on a privilege change
    pub user_esp: u32,
    pub user_ss: u32,
}

impl TrapFrame {
    pub fn from_user(&self) -> bool {
        self.cs & RPL_MASK == USER_RPL
    }
}

static_assertions::const_assert_eq!(core::mem::size_of::<TrapFrame>(), 19 * 4);
