//! [`PhysicalMemory`](crate::inject::PhysicalMemory) implementations for real targets.

mod direct;
#[cfg(feature = "devmem")]
mod devmem;

pub use direct::{DirectMmio, DirectRegion};
#[cfg(feature = "devmem")]
pub use devmem::{DevMem, DevMemRegion};
