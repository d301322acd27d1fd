use crate::inject::InjectError;

/// Number of entries each suspend/resume list holds unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 20;

/// Bytes mapped around a register for a single write.
pub const WRITE_WINDOW: u64 = 0x100;

/// Width of one register access in bytes.
pub const REGISTER_WIDTH: u64 = 4;

/// One register write recorded for replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Physical address of the register.
    pub register_address: u64,
    /// Value written; only the low 32 bits reach the register.
    pub value: u64,
}

impl RegisterEntry {
    #[inline]
    pub const fn new(register_address: u64, value: u64) -> Self {
        Self {
            register_address,
            value,
        }
    }
}

/// Selects one of the two replay lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSelector {
    /// Replayed when the system enters suspend.
    Suspend,
    /// Replayed when the system leaves suspend.
    Resume,
}

impl ListSelector {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ListSelector::Suspend => "suspend",
            ListSelector::Resume => "resume",
        }
    }
}

/// One value produced by [`RegisterAccessor::read`](crate::inject::RegisterAccessor::read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterRead {
    /// Physical address the value was read from.
    pub address: u64,
    pub value: u32,
}

/// Maps physical address ranges so they can be accessed as registers.
///
/// This is the only place raw physical addresses turn into accessible memory.
/// A mapping lives exactly as long as the returned region; dropping the region
/// releases it.
pub trait PhysicalMemory {
    /// Region handle; unmaps on drop.
    type Region<'a>: MappedRegion
    where
        Self: 'a;

    /// Maps `len` bytes starting at physical address `phys`.
    ///
    /// Returns [`InjectError::MapFailed`] if the range cannot be mapped.
    fn map(&self, phys: u64, len: u64) -> Result<Self::Region<'_>, InjectError>;
}

impl<M: PhysicalMemory + ?Sized> PhysicalMemory for &M {
    type Region<'a>
        = M::Region<'a>
    where
        Self: 'a;

    fn map(&self, phys: u64, len: u64) -> Result<Self::Region<'_>, InjectError> {
        (**self).map(phys, len)
    }
}

/// A live mapping of a physical range.
///
/// Offsets are byte offsets from the mapped base and are always 4-byte aligned
/// and within the mapped length when called by this crate.
pub trait MappedRegion {
    /// Volatile 32-bit read.
    fn read_u32(&self, offset: usize) -> u32;
    /// Volatile 32-bit write.
    fn write_u32(&mut self, offset: usize, value: u32);
}
