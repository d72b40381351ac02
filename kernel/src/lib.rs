//! A single-CPU i686 kernel whose processes nest: `execute` runs a child to
//! completion and `halt` returns its status to the parent.
//!
//! On the host the `arch` module swaps in a fake back end, so everything
//! above it can be unit tested with `cargo test`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[macro_use]
pub mod console;

pub mod arch;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fs;
pub mod logging;
pub mod mem;
pub mod process;
pub mod syscall;
pub mod trap;

#[cfg(test)]
mod test_support;
