use crate::inject::{
    InjectError,
    types::{ListSelector, RegisterEntry},
};

/// What a replay should do after one of its writes fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayAction {
    /// Log the failure and move on to the next entry.
    Continue,
    /// Stop the replay and report the error to the power framework.
    Abort,
}

/// Decides how replay reacts to a failed register write.
pub trait ReplayPolicy {
    /// Called once for every entry whose write failed during replay.
    fn on_write_failed(
        &self,
        list: ListSelector,
        index: usize,
        entry: &RegisterEntry,
        err: InjectError,
    ) -> ReplayAction;
}

/// Default policy: a failed write never fails the power transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestEffortReplay {}

impl ReplayPolicy for BestEffortReplay {
    fn on_write_failed(
        &self,
        _list: ListSelector,
        _index: usize,
        _entry: &RegisterEntry,
        _err: InjectError,
    ) -> ReplayAction {
        ReplayAction::Continue
    }
}
