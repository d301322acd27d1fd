#![allow(unsafe_code)]

use bitmaps::{Bitmap, Bits, BitsImpl};
use critical_section::CriticalSection;

use crate::inject::{
    InjectError,
    autosuspend::AutosuspendTrigger,
    policy::{ReplayAction, ReplayPolicy},
    storage::InjectDriver,
    types::{ListSelector, PhysicalMemory},
};

/// Outcome of replaying one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport<const N: usize>
where
    BitsImpl<N>: Bits,
{
    attempted: usize,
    failed: Bitmap<N>,
}

impl<const N: usize> ReplayReport<N>
where
    BitsImpl<N>: Bits,
{
    fn new() -> Self {
        Self {
            attempted: 0,
            failed: Bitmap::new(),
        }
    }

    /// Number of writes issued.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of writes that failed to map.
    pub fn failed(&self) -> usize {
        self.failed.len()
    }

    /// Returns true if the write at list index `index` failed.
    pub fn is_failed(&self, index: usize) -> bool {
        index < N && self.failed.get(index)
    }

    /// Indices of failed writes in ascending order.
    pub fn failed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.failed.first_index();
        core::iter::from_fn(move || {
            let index = next?;
            next = self.failed.next_index(index);
            Some(index)
        })
    }
}

/// Power-management callbacks a host framework dispatches to a device.
///
/// Every hook returns `Ok` on success; the error's
/// [`errno`](InjectError::errno) is the status code to hand back to the host.
pub trait PowerOps {
    /// Result of a system suspend or resume.
    type Report;

    /// System sleep: entering suspend.
    fn suspend(&self) -> Result<Self::Report, InjectError>;
    /// System sleep: leaving suspend.
    fn resume(&self) -> Result<Self::Report, InjectError>;
    /// Late suspend with device interrupts disabled.
    fn suspend_noirq(&self) -> Result<(), InjectError>;
    /// Early resume with device interrupts disabled.
    fn resume_noirq(&self) -> Result<(), InjectError>;
    fn runtime_suspend(&self) -> Result<(), InjectError>;
    fn runtime_resume(&self) -> Result<(), InjectError>;
    /// Device became idle; may request an autosuspend.
    fn runtime_idle(&self) -> Result<(), InjectError>;
}

/// Converts a hook result into the integer status the host framework expects.
pub fn status<T>(result: &Result<T, InjectError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.errno(),
    }
}

impl<'s, const N: usize, M, RP, AT> InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    BitsImpl<N>: Bits,
{
    /// Writes every visible entry of `list` through the accessor, in order.
    ///
    /// Holds the list critical section for the whole walk, so no append can
    /// interleave with a replay. Failed writes are recorded in the report and
    /// handed to the replay policy; the walk only stops early if the policy
    /// returns [`ReplayAction::Abort`].
    ///
    /// # Panics
    /// Panics if called from inside [`InjectDriver::with_lists`] on the same driver.
    pub fn replay(&self, list: ListSelector) -> Result<ReplayReport<N>, InjectError> {
        critical_section::with(|cs| self.replay_in(cs, list))
    }

    /// # Safety
    /// Same requirements as [`InjectDriver::with_lists_unchecked`].
    pub unsafe fn replay_unchecked(
        &self,
        list: ListSelector,
    ) -> Result<ReplayReport<N>, InjectError> {
        let cs = unsafe { CriticalSection::new() };
        self.replay_in(cs, list)
    }

    fn replay_in(
        &self,
        cs: CriticalSection<'_>,
        list: ListSelector,
    ) -> Result<ReplayReport<N>, InjectError> {
        let lists = self.lists.borrow_ref(cs);
        let mut report = ReplayReport::new();

        for (index, entry) in lists.get(list).iter().enumerate() {
            report.attempted += 1;
            let Err(err) = self.accessor.write(entry.register_address, entry.value) else {
                continue;
            };

            report.failed.set(index, true);
            log::warn!(
                "{} replay: write {index} to {:#x} failed: {err}",
                list.as_str(),
                entry.register_address
            );
            if self.replay_policy.on_write_failed(list, index, entry, err) == ReplayAction::Abort {
                return Err(err);
            }
        }

        if report.failed() > 0 {
            log::warn!(
                "{} replay: {} of {} writes failed",
                list.as_str(),
                report.failed(),
                report.attempted()
            );
        }
        Ok(report)
    }
}

impl<'s, const N: usize, M, RP, AT> PowerOps for InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    BitsImpl<N>: Bits,
{
    type Report = ReplayReport<N>;

    fn suspend(&self) -> Result<ReplayReport<N>, InjectError> {
        log::info!("pm suspend");
        self.replay(ListSelector::Suspend)
    }

    fn resume(&self) -> Result<ReplayReport<N>, InjectError> {
        log::info!("pm resume");
        self.replay(ListSelector::Resume)
    }

    fn suspend_noirq(&self) -> Result<(), InjectError> {
        log::info!("pm suspend_noirq");
        Ok(())
    }

    fn resume_noirq(&self) -> Result<(), InjectError> {
        log::info!("pm resume_noirq");
        Ok(())
    }

    fn runtime_suspend(&self) -> Result<(), InjectError> {
        log::info!("pm runtime_suspend");
        Ok(())
    }

    fn runtime_resume(&self) -> Result<(), InjectError> {
        log::info!("pm runtime_resume");
        Ok(())
    }

    fn runtime_idle(&self) -> Result<(), InjectError> {
        critical_section::with(|cs| {
            self.autosuspend.borrow_ref_mut(cs).request_autosuspend();
        });
        log::info!("pm runtime_idle");
        Ok(())
    }
}
