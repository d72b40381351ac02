//! Architecture-specific support.
//!
//! Each back end defines the same set of names and is `pub use`d here, so
//! the rest of the kernel only ever talks to `crate::arch`. On anything
//! other than bare-metal i686 the fake back end is selected; it lets the
//! process, memory and device logic run under `cargo test` on the host.

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86", target_os = "none"))] {
        pub mod x86;
        pub use x86::*;
    } else {
        mod fake;
        pub use fake::*;
    }
}
