//! The single two-level translation structure shared by every process.
//!
//! Layout of the directory:
//!
//! - slot 0: small-page table for 0-4 MiB, holding only the video page and
//!   the per-terminal backing pages (supervisor only)
//! - slot 1: the 4 MiB kernel page (supervisor only)
//! - slot 32: the user region at 128 MiB, rebound to the running
//!   process's frame by `bind`
//! - slot 33: small-page table exposing the video page to user mode

use super::page_table::{PTEFlags, PageTable, PageTableEntry, PhyAddr, VirtAddr};
use crate::arch;
use crate::config::*;
use sync::UPSafeCell;

lazy_static! {
    pub static ref ADDRESS_SPACE: UPSafeCell<AddressSpace> =
        unsafe { UPSafeCell::new(AddressSpace::new_kernel()) };
}

const KERNEL_TABLE_SLOT: usize = 0;
const KERNEL_PAGE_SLOT: usize = KERNEL_START >> LARGE_PAGE_SIZE_BITS;
const VIDMAP_SLOT: usize = VIDMAP_REGION_START >> LARGE_PAGE_SIZE_BITS;

/// Backing frame that holds terminal `terminal`'s screen while it is not displayed.
pub fn video_backing(terminal: usize) -> PhyAddr {
    PhyAddr(VIDEO_BACKING_START + terminal * PAGE_SIZE)
}

pub struct AddressSpace {
    directory: PageTable,
    kernel_table: PageTable,
    video_table: PageTable,
    // frame currently behind the video page (kernel and user views)
    video_frame: PhyAddr,
    // a binding changed and the TLB has not been flushed yet
    stale: bool,
}

impl AddressSpace {
    /// The boot-time mappings: video page, terminal backing pages, kernel page.
    pub fn new_kernel() -> Self {
        let mut space = AddressSpace {
            directory: PageTable::new(),
            kernel_table: PageTable::new(),
            video_table: PageTable::new(),
            video_frame: PhyAddr(VIDEO_MEMORY),
            stale: true,
        };
        let supervisor = PTEFlags::P | PTEFlags::W;
        let video = VirtAddr(VIDEO_MEMORY);
        space.kernel_table.entries[video.table_index()] =
            PageTableEntry::new(PhyAddr(VIDEO_MEMORY), supervisor);
        for terminal in 0..NUM_TERMINALS {
            let backing = video_backing(terminal);
            space.kernel_table.entries[VirtAddr(backing.0).table_index()] =
                PageTableEntry::new(backing, supervisor);
        }
        // slot 0 gets its real table address in link_tables
        space.directory.entries[KERNEL_TABLE_SLOT] = PageTableEntry::new(PhyAddr(0), supervisor);
        space.directory.entries[KERNEL_PAGE_SLOT] =
            PageTableEntry::new(PhyAddr(KERNEL_START), supervisor | PTEFlags::PS | PTEFlags::G);
        return space;
    }

    /// Load this directory into the MMU. Only called on the static instance,
    /// whose address never changes afterwards.
    pub fn activate(&mut self) {
        self.link_tables();
        unsafe { arch::load_page_directory(self.directory.phys_addr().0) };
        self.stale = false;
        info!("[kernel] paging on, directory at {:#x}", self.directory.phys_addr().0);
    }

    fn link_tables(&mut self) {
        let flags = self.directory.entries[KERNEL_TABLE_SLOT].flags();
        self.directory.entries[KERNEL_TABLE_SLOT] =
            PageTableEntry::new(self.kernel_table.phys_addr(), flags);
        if self.directory.entries[VIDMAP_SLOT].is_present() {
            let flags = self.directory.entries[VIDMAP_SLOT].flags();
            self.directory.entries[VIDMAP_SLOT] =
                PageTableEntry::new(self.video_table.phys_addr(), flags);
        }
    }

    fn can_bind(region: VirtAddr, frame: PhyAddr) -> bool {
        let slot = region.dir_index();
        return region.is_large_page_aligned()
            && frame.is_large_page_aligned()
            && slot < ENTRIES_PER_TABLE
            && slot != KERNEL_TABLE_SLOT
            && slot != KERNEL_PAGE_SLOT
            && slot != VIDMAP_SLOT
            && frame.0 >= USER_FRAME_BASE
            && frame.0 <= u32::MAX as usize - (LARGE_PAGE_SIZE - 1);
    }

    /// Map the 4 MiB user region `region` onto `frame`, present, user and
    /// writable. Arguments outside the bindable range are ignored.
    pub fn bind(&mut self, region: VirtAddr, frame: PhyAddr) {
        if !Self::can_bind(region, frame) {
            warn!("[kernel] refusing to bind {:#x} -> {:#x}", region.0, frame.0);
            return;
        }
        self.directory.entries[region.dir_index()] =
            PageTableEntry::new(frame, PTEFlags::P | PTEFlags::W | PTEFlags::U | PTEFlags::PS);
        self.stale = true;
    }

    /// Expose the video page to user mode at `VIDMAP_ADDRESS`.
    pub fn map_user_video(&mut self) -> VirtAddr {
        let user = PTEFlags::P | PTEFlags::W | PTEFlags::U;
        let video = VirtAddr(VIDMAP_ADDRESS);
        self.video_table.entries[video.table_index()] = PageTableEntry::new(self.video_frame, user);
        self.directory.entries[VIDMAP_SLOT] = PageTableEntry::new(self.video_table.phys_addr(), user);
        self.stale = true;
        return video;
    }

    /// Point the video page, kernel and user views alike, at `backing`:
    /// either the real video memory or one of the terminal backing pages.
    pub fn redirect_video(&mut self, backing: PhyAddr) {
        let known = backing.0 == VIDEO_MEMORY
            || (0..NUM_TERMINALS).any(|terminal| video_backing(terminal) == backing);
        if !known {
            warn!("[kernel] refusing to redirect video to {:#x}", backing.0);
            return;
        }
        let index = VirtAddr(VIDEO_MEMORY).table_index();
        self.video_frame = backing;
        self.kernel_table.entries[index] = PageTableEntry::new(backing, PTEFlags::P | PTEFlags::W);
        if self.video_table.entries[index].is_present() {
            self.video_table.entries[index] =
                PageTableEntry::new(backing, PTEFlags::P | PTEFlags::W | PTEFlags::U);
        }
        self.stale = true;
    }

    pub fn invalidate_all(&mut self) {
        arch::flush_tlb();
        self.stale = false;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Walk the tables in software. The returned flags are the effective
    /// ones: user and writable only if both levels allow it.
    pub fn translate(&self, va: VirtAddr) -> Option<(PhyAddr, PTEFlags)> {
        let slot = va.dir_index();
        if slot >= ENTRIES_PER_TABLE {
            return None;
        }
        let pde = self.directory.entries[slot];
        if !pde.is_present() {
            return None;
        }
        if pde.is_large() {
            return Some((PhyAddr(pde.addr().0 + va.large_page_offset()), pde.flags()));
        }
        let table = match slot {
            KERNEL_TABLE_SLOT => &self.kernel_table,
            VIDMAP_SLOT => &self.video_table,
            _ => return None,
        };
        let pte = table.entries[va.table_index()];
        if !pte.is_present() {
            return None;
        }
        let access = PTEFlags::P | PTEFlags::W | PTEFlags::U;
        let flags = pte.flags() & (pde.flags() | !access);
        return Some((PhyAddr(pte.addr().0 + va.page_offset()), flags));
    }

    /// Frame currently behind the user region, if any.
    pub fn user_frame(&self) -> Option<PhyAddr> {
        self.translate(VirtAddr(USER_REGION_START)).map(|(frame, _)| frame)
    }
}
