use core::marker::PhantomData;

use bitmaps::{Bits, BitsImpl};

use crate::inject::{
    InjectError,
    access::RegisterAccessor,
    autosuspend::{AutosuspendTrigger, NoAutosuspend},
    policy::{BestEffortReplay, ReplayPolicy},
    storage::{DriverSlot, InjectDriver},
    types::{DEFAULT_CAPACITY, PhysicalMemory, WRITE_WINDOW},
};

// Builder states
pub struct NeedCapacity;
pub struct NeedMemory;
pub struct NeedReplayPolicy;
pub struct NeedAutosuspend;
pub struct Ready;

/// Typestate builder for [`InjectDriver`].
///
/// ```rust,ignore
/// static INJECT: DriverSlot = DriverSlot::new();
///
/// let driver = InjectDriverBuilder::new()
///     .default_capacity()
///     .memory(unsafe { DirectMmio::new() })
///     .best_effort()
///     .no_autosuspend()
///     .attach(&INJECT)?;
/// ```
pub struct InjectDriverBuilder<const N: usize, M, RP, AT, State> {
    memory: M,
    replay_policy: RP,
    autosuspend: AT,
    write_window: u64,
    _phantom: PhantomData<State>,
}

impl InjectDriverBuilder<0, (), (), (), NeedCapacity> {
    pub fn new() -> Self {
        InjectDriverBuilder {
            memory: (),
            replay_policy: (),
            autosuspend: (),
            write_window: WRITE_WINDOW,
            _phantom: PhantomData,
        }
    }

    /// Set the capacity of each register list.
    ///
    /// A capacity of 0 is rejected at compile time when the driver is attached.
    pub fn capacity<const N: usize>(self) -> InjectDriverBuilder<N, (), (), (), NeedMemory> {
        InjectDriverBuilder {
            memory: (),
            replay_policy: (),
            autosuspend: (),
            write_window: self.write_window,
            _phantom: PhantomData,
        }
    }

    /// Use [`DEFAULT_CAPACITY`] entries per list.
    pub fn default_capacity(self) -> InjectDriverBuilder<DEFAULT_CAPACITY, (), (), (), NeedMemory> {
        self.capacity::<DEFAULT_CAPACITY>()
    }
}

impl Default for InjectDriverBuilder<0, (), (), (), NeedCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, M, RP, AT, State> InjectDriverBuilder<N, M, RP, AT, State> {
    /// Bytes mapped around a register for a single write. Defaults to [`WRITE_WINDOW`].
    pub fn write_window(mut self, bytes: u64) -> Self {
        self.write_window = bytes;
        self
    }
}

// Set memory backend
impl<const N: usize> InjectDriverBuilder<N, (), (), (), NeedMemory> {
    pub fn memory<M: PhysicalMemory>(
        self,
        memory: M,
    ) -> InjectDriverBuilder<N, M, (), (), NeedReplayPolicy> {
        InjectDriverBuilder {
            memory,
            replay_policy: (),
            autosuspend: (),
            write_window: self.write_window,
            _phantom: PhantomData,
        }
    }
}

// Set replay policy
impl<const N: usize, M: PhysicalMemory> InjectDriverBuilder<N, M, (), (), NeedReplayPolicy> {
    pub fn replay_policy<RP: ReplayPolicy>(
        self,
        policy: RP,
    ) -> InjectDriverBuilder<N, M, RP, (), NeedAutosuspend> {
        InjectDriverBuilder {
            memory: self.memory,
            replay_policy: policy,
            autosuspend: (),
            write_window: self.write_window,
            _phantom: PhantomData,
        }
    }

    /// Never fail a power transition because a replayed write failed.
    pub fn best_effort(self) -> InjectDriverBuilder<N, M, BestEffortReplay, (), NeedAutosuspend> {
        self.replay_policy(BestEffortReplay::default())
    }
}

// Set autosuspend trigger
impl<const N: usize, M: PhysicalMemory, RP: ReplayPolicy>
    InjectDriverBuilder<N, M, RP, (), NeedAutosuspend>
{
    pub fn autosuspend<AT: AutosuspendTrigger>(
        self,
        trigger: AT,
    ) -> InjectDriverBuilder<N, M, RP, AT, Ready> {
        InjectDriverBuilder {
            memory: self.memory,
            replay_policy: self.replay_policy,
            autosuspend: trigger,
            write_window: self.write_window,
            _phantom: PhantomData,
        }
    }

    pub fn no_autosuspend(self) -> InjectDriverBuilder<N, M, RP, NoAutosuspend, Ready> {
        self.autosuspend(NoAutosuspend)
    }
}

// Attach the final driver
impl<const N: usize, M, RP, AT> InjectDriverBuilder<N, M, RP, AT, Ready>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    BitsImpl<N>: Bits,
{
    /// Claim `slot` and create the driver.
    ///
    /// Fails with [`InjectError::AlreadyInitialized`] if another driver holds the slot.
    pub fn attach(self, slot: &DriverSlot) -> Result<InjectDriver<'_, N, M, RP, AT>, InjectError> {
        InjectDriver::attach(
            slot,
            RegisterAccessor::with_write_window(self.memory, self.write_window),
            self.replay_policy,
            self.autosuspend,
        )
    }
}
