/// Asks the host power framework to autosuspend the device once it goes idle.
pub trait AutosuspendTrigger {
    /// Requests a deferred autosuspend.
    fn request_autosuspend(&mut self);
}

/// No-op trigger for hosts without runtime power management.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAutosuspend;

impl AutosuspendTrigger for NoAutosuspend {
    fn request_autosuspend(&mut self) {}
}
