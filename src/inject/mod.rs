pub mod access;
pub mod autosuspend;
pub mod backend;
pub mod builder;
pub mod command;
pub mod error;
pub mod helpers;
pub mod list;
pub mod pm;
pub mod policy;
pub mod storage;
pub mod surface;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;

pub use access::{RegisterAccessor, RegisterReads};
pub use autosuspend::{AutosuspendTrigger, NoAutosuspend};
pub use backend::DirectMmio;
#[cfg(feature = "devmem")]
pub use backend::DevMem;
pub use builder::InjectDriverBuilder;
pub use command::{MAX_COMMAND_LEN, RegCommand};
pub use error::InjectError;
pub use list::RegisterList;
pub use pm::{PowerOps, ReplayReport};
pub use policy::{BestEffortReplay, ReplayAction, ReplayPolicy};
pub use storage::{DriverSlot, InjectDriver};
pub use surface::USAGE;
pub use types::{
    DEFAULT_CAPACITY, ListSelector, MappedRegion, PhysicalMemory, REGISTER_WIDTH, RegisterEntry,
    RegisterRead, WRITE_WINDOW,
};
pub use view::ListView;

pub mod prelude {
    pub use super::{
        AutosuspendTrigger, BestEffortReplay, DirectMmio, DriverSlot, InjectDriver,
        InjectDriverBuilder, InjectError, ListSelector, ListView, MappedRegion, NoAutosuspend,
        PhysicalMemory, PowerOps, RegCommand, RegisterAccessor, RegisterEntry, RegisterRead,
        ReplayAction, ReplayPolicy, ReplayReport,
    };
    #[cfg(feature = "devmem")]
    pub use super::DevMem;
}
