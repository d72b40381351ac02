#![cfg_attr(not(test), no_std)]

mod up;

pub use up::UPSafeCell;
