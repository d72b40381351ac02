//constants used in nestos

// ---- process table ----
pub const MAX_PROCESSES: usize = 6;
pub const MAX_OPEN_FILES: usize = 8;
pub const MAX_NAME_LENGTH: usize = 32;
pub const ARGS_CAPACITY: usize = 128;
pub const STDIN_FD: usize = 0;
pub const STDOUT_FD: usize = 1;

// ---- paging ----
pub const PAGE_SIZE_BITS: usize = 12;
pub const PAGE_SIZE: usize = 1 << PAGE_SIZE_BITS;
pub const LARGE_PAGE_SIZE_BITS: usize = 22;
pub const LARGE_PAGE_SIZE: usize = 1 << LARGE_PAGE_SIZE_BITS;
pub const ENTRIES_PER_TABLE: usize = 1024;

// ---- physical memory map ----
pub const KERNEL_START: usize = 0x40_0000;
pub const USER_FRAME_BASE: usize = 0x80_0000;
pub const VIDEO_MEMORY: usize = 0xB8000;
pub const VIDEO_BACKING_START: usize = 0xB9000;
pub const NUM_TERMINALS: usize = 3;
pub const KERNEL_STACK_SIZE: usize = 8 * 1024;

// ---- user virtual memory map ----
pub const USER_REGION_START: usize = 0x0800_0000;
pub const USER_REGION_END: usize = USER_REGION_START + LARGE_PAGE_SIZE;
pub const PROGRAM_IMAGE_START: usize = 0x0804_8000;
pub const USER_STACK_TOP: usize = USER_REGION_END - 4;
pub const VIDMAP_REGION_START: usize = USER_REGION_END;
pub const VIDMAP_ADDRESS: usize = VIDMAP_REGION_START + VIDEO_MEMORY;

// ---- executables ----
pub const EXECUTABLE_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
pub const ENTRY_POINT_OFFSET: usize = 24;
pub const DEFAULT_SHELL: &[u8] = b"shell";
// status seen by the parent when a child is halted by an exception
pub const HALT_FAULT_STATUS: isize = 256;

// ---- devices ----
pub const RTC_BASE_FREQUENCY: u32 = 1024;
pub const RTC_DEFAULT_FREQUENCY: u32 = 2;
pub const KEYBOARD_BUFFER_SIZE: usize = 128;
pub const SCREEN_WIDTH: usize = 80;
pub const SCREEN_HEIGHT: usize = 25;

// ---- interrupts ----
pub const PIC_MASTER_VECTOR: u8 = 0x20;
pub const PIC_SLAVE_VECTOR: u8 = 0x28;
pub const KEYBOARD_IRQ: u8 = 1;
pub const CASCADE_IRQ: u8 = 2;
pub const RTC_IRQ: u8 = 8;
pub const SYSCALL_VECTOR: u8 = 0x80;

// ---- console colours ----
pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[93m";
pub const BLUE: &str = "\x1b[34m";
pub const GRAY: &str = "\x1b[90m";
pub const RESET: &str = "\x1b[0m";
