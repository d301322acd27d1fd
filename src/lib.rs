//! Runtime register poking and suspend/resume register replay for SoC bring-up.
//!
//! This crate gives a trusted operator direct access to memory-mapped hardware
//! registers without rebuilding firmware, and lets them record register writes
//! that are replayed automatically at system suspend and resume.
//!
//! # Features
//!
//! - **One-shot access** - map, read or write, unmap; the mapping is always released
//! - **Replay lists** - two fixed-capacity lists replayed in recorded order
//! - **Best-effort power transitions** - a failed replay write never blocks suspend
//! - **Zero heap allocation** - all storage statically sized
//! - **Pluggable backends** - identity-mapped MMIO, `/dev/mem`, or your own
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐        ┌────────────────────────┐
//! │ Operator         │        │ Power framework        │
//! │                  │        │                        │
//! │ write_reg()      │──┐  ┌──│ suspend() / resume()   │
//! │ write_*_cfg()    │  │  │  │ (replay list in order) │
//! └──────────────────┘  │  │  └────────────────────────┘
//!            append     │  │  replay
//!                       ▼  ▼
//!             ┌──────────────────────┐
//!             │ InjectDriver         │
//!             │  suspend list [N]    │
//!             │  resume list  [N]    │
//!             └──────────┬───────────┘
//!                        │ map / access / unmap
//!                        ▼
//!             ┌──────────────────────┐
//!             │ PhysicalMemory       │
//!             └──────────────────────┘
//! ```
//!
//! - A full list restarts from index 0 on the next append; it does not evict
//!   the oldest entry
//! - Appends and replays of one driver are serialized through a critical section
//! - Only one driver can hold a [`DriverSlot`](inject::DriverSlot) at a time
//!
//! # Example
//!
//! ```rust,no_run
//! use reg_inject::prelude::*;
//!
//! static INJECT: DriverSlot = DriverSlot::new();
//!
//! let driver = InjectDriverBuilder::new()
//!     .default_capacity()
//!     .memory(unsafe { DirectMmio::new() })
//!     .best_effort()
//!     .no_autosuspend()
//!     .attach(&INJECT)
//!     .unwrap();
//!
//! // operator: poke one register and queue a write for suspend
//! driver.write_reg("w 0x3451008c 0x2").unwrap();
//! driver.write_suspend_cfg("0x3451008c 0x0").unwrap();
//!
//! // power framework: entering suspend replays the suspend list
//! let report = driver.suspend().unwrap();
//! assert_eq!(report.attempted(), 1);
//! ```
//!
//! # Crate features
//!
//! - **std** - links the standard library; only used by other features
//! - **devmem** - enables `DevMem`, a Linux backend mapping through `/dev/mem`

#![deny(unsafe_code)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod inject;

pub mod prelude {
    pub use crate::inject::prelude::*;
}
