use crate::config::*;
use bitflags::bitflags;
use core::mem::{align_of, size_of};

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct PhyAddr(pub usize);

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct VirtAddr(pub usize);

impl PhyAddr {
    pub fn is_page_aligned(&self) -> bool {
        return self.0 & (PAGE_SIZE - 1) == 0;
    }

    pub fn is_large_page_aligned(&self) -> bool {
        return self.0 & (LARGE_PAGE_SIZE - 1) == 0;
    }
}

impl VirtAddr {
    // index into the page directory (one entry per 4 MiB)
    pub fn dir_index(&self) -> usize {
        return self.0 >> LARGE_PAGE_SIZE_BITS;
    }

    // index into a 4 KiB page table
    pub fn table_index(&self) -> usize {
        return (self.0 >> PAGE_SIZE_BITS) & (ENTRIES_PER_TABLE - 1);
    }

    pub fn page_offset(&self) -> usize {
        return self.0 & (PAGE_SIZE - 1);
    }

    pub fn large_page_offset(&self) -> usize {
        return self.0 & (LARGE_PAGE_SIZE - 1);
    }

    pub fn is_large_page_aligned(&self) -> bool {
        return self.large_page_offset() == 0;
    }
}

bitflags! {
    pub struct PTEFlags: u32 {
        const P = 1 << 0;
        const W = 1 << 1;
        const U = 1 << 2;
        const PWT = 1 << 3;
        const PCD = 1 << 4;
        const A = 1 << 5;
        const D = 1 << 6;
        // directory entries only: maps a 4 MiB page instead of a table
        const PS = 1 << 7;
        const G = 1 << 8;
    }
}

const ADDR_MASK: u32 = 0xFFFF_F000;

#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct PageTableEntry {
    pub bits: u32,
}

impl PageTableEntry {
    pub const EMPTY: PageTableEntry = PageTableEntry { bits: 0 };

    pub fn new(addr: PhyAddr, flags: PTEFlags) -> Self {
        debug_assert!(addr.is_page_aligned(), "unaligned frame {:#x}", addr.0);
        PageTableEntry {
            bits: (addr.0 as u32 & ADDR_MASK) | flags.bits(),
        }
    }

    pub fn addr(&self) -> PhyAddr {
        PhyAddr((self.bits & ADDR_MASK) as usize)
    }

    pub fn flags(&self) -> PTEFlags {
        PTEFlags::from_bits_truncate(self.bits)
    }

    pub fn is_present(&self) -> bool {
        self.flags().contains(PTEFlags::P)
    }

    pub fn is_large(&self) -> bool {
        self.flags().contains(PTEFlags::PS)
    }
}

/// One 4 KiB-aligned table of 1024 entries, used both for the directory
/// and for small-page tables.
#[repr(C, align(4096))]
pub struct PageTable {
    pub entries: [PageTableEntry; ENTRIES_PER_TABLE],
}

static_assertions::assert_eq_size!(PageTableEntry, u32);
static_assertions::const_assert_eq!(size_of::<PageTable>(), PAGE_SIZE);
static_assertions::const_assert_eq!(align_of::<PageTable>(), PAGE_SIZE);

impl PageTable {
    pub const fn new() -> Self {
        PageTable {
            entries: [PageTableEntry::EMPTY; ENTRIES_PER_TABLE],
        }
    }

    // the kernel is identity mapped, so a table's address is its frame
    pub fn phys_addr(&self) -> PhyAddr {
        PhyAddr(self as *const PageTable as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_address_splits_into_directory_and_table_indices() {
        let va = VirtAddr(VIDMAP_ADDRESS + 0x123);
        assert_eq!(va.dir_index(), 33);
        assert_eq!(va.table_index(), 0xB8);
        assert_eq!(va.page_offset(), 0x123);
        assert_eq!(VirtAddr(PROGRAM_IMAGE_START).large_page_offset(), 0x48000);
    }

    #[test]
    fn entry_keeps_address_and_flags_apart() {
        let entry = PageTableEntry::new(PhyAddr(0x80_0000), PTEFlags::P | PTEFlags::W | PTEFlags::PS);
        assert_eq!(entry.addr(), PhyAddr(0x80_0000));
        assert!(entry.is_present());
        assert!(entry.is_large());
        assert!(!entry.flags().contains(PTEFlags::U));
        assert!(!PageTableEntry::EMPTY.is_present());
    }

    #[test]
    #[should_panic(expected = "unaligned frame")]
    fn entries_only_take_page_aligned_frames() {
        assert!(PhyAddr(VIDEO_BACKING_START).is_page_aligned());
        PageTableEntry::new(PhyAddr(VIDEO_MEMORY + 0x10), PTEFlags::P);
    }
}
