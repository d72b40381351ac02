pub mod address_space;
pub mod page_table;

pub use address_space::{video_backing, AddressSpace, ADDRESS_SPACE};
pub use page_table::{PTEFlags, PhyAddr, VirtAddr};

use crate::config::{USER_REGION_END, USER_REGION_START};

/// Whether `[start, start + len)` lies inside the 4 MiB user region.
pub fn in_user_region(start: usize, len: usize) -> bool {
    start >= USER_REGION_START
        && start
            .checked_add(len)
            .map_or(false, |end| end <= USER_REGION_END)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_region_bounds() {
        assert!(in_user_region(USER_REGION_START, 0));
        assert!(in_user_region(USER_REGION_START, USER_REGION_END - USER_REGION_START));
        assert!(in_user_region(USER_REGION_END - 4, 4));
        assert!(!in_user_region(USER_REGION_END - 1, 4));
        assert!(!in_user_region(USER_REGION_START - 4, 8));
        assert!(!in_user_region(0x0040_0000, 16));
        assert!(!in_user_region(USER_REGION_START, usize::MAX));
    }
}
