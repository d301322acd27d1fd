/// Errors that can occur while accessing registers or driving the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectError {
    /// The requested physical range could not be mapped.
    MapFailed,
    /// Malformed command line: wrong token count, bad literal or unknown command.
    InvalidInput,
    /// A driver instance is already attached to the slot.
    AlreadyInitialized,
}

impl InjectError {
    /// Negative status code reported to the host framework.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            InjectError::MapFailed => -1,
            InjectError::InvalidInput => -22,
            InjectError::AlreadyInitialized => -17,
        }
    }
}

impl core::fmt::Display for InjectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InjectError::MapFailed => write!(f, "physical range could not be mapped"),
            InjectError::InvalidInput => write!(f, "malformed command"),
            InjectError::AlreadyInitialized => write!(f, "driver instance already attached"),
        }
    }
}
