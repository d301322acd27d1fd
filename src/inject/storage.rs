#![allow(unsafe_code)]

use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};

use crate::inject::{
    InjectError,
    access::RegisterAccessor,
    autosuspend::AutosuspendTrigger,
    list::RegisterLists,
    policy::ReplayPolicy,
    types::{ListSelector, PhysicalMemory, RegisterEntry},
    view::ListView,
};

/// Marks whether a driver instance is currently attached.
///
/// A slot admits one live [`InjectDriver`] at a time. It is usually a
/// `static` so every attach attempt in the system goes through the same slot:
///
/// ```rust,ignore
/// static INJECT: DriverSlot = DriverSlot::new();
/// ```
#[derive(Debug)]
pub struct DriverSlot {
    attached: Mutex<Cell<bool>>,
}

impl DriverSlot {
    pub const fn new() -> Self {
        Self {
            attached: Mutex::new(Cell::new(false)),
        }
    }

    /// Returns true while a driver holds this slot.
    pub fn is_attached(&self) -> bool {
        critical_section::with(|cs| self.attached.borrow(cs).get())
    }

    fn claim(&self) -> Result<(), InjectError> {
        critical_section::with(|cs| {
            let attached = self.attached.borrow(cs);
            if attached.get() {
                return Err(InjectError::AlreadyInitialized);
            }
            attached.set(true);
            Ok(())
        })
    }

    fn release(&self) {
        critical_section::with(|cs| self.attached.borrow(cs).set(false));
    }
}

impl Default for DriverSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The attached driver instance.
///
/// Owns the register accessor, the suspend and resume lists, the replay policy
/// and the runtime-idle trigger. Dropping it detaches the driver, discards both
/// lists and frees the slot.
///
/// # Const Generics
/// - `N`: Capacity of each register list
///
/// # Type Parameters
/// - `M`: Physical memory backend
/// - `RP`: Policy applied when a replayed write fails
/// - `AT`: Trigger used by the runtime-idle hook
pub struct InjectDriver<'s, const N: usize, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    slot: &'s DriverSlot,
    pub(crate) accessor: RegisterAccessor<M>,
    pub(crate) lists: Mutex<RefCell<RegisterLists<N>>>,
    pub(crate) replay_policy: RP,
    pub(crate) autosuspend: Mutex<RefCell<AT>>,
}

impl<'s, const N: usize, M, RP, AT> core::fmt::Debug for InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InjectDriver")
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}

impl<'s, const N: usize, M, RP, AT> InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    /// Claims `slot` and creates a driver with empty lists.
    ///
    /// Fails with [`InjectError::AlreadyInitialized`] if the slot is taken; the
    /// driver already holding it is not affected.
    pub fn attach(
        slot: &'s DriverSlot,
        accessor: RegisterAccessor<M>,
        replay_policy: RP,
        autosuspend: AT,
    ) -> Result<Self, InjectError> {
        slot.claim().inspect_err(|_| {
            log::error!("inject driver is already initialized");
        })?;

        log::info!("inject driver attached, list capacity {N}");
        Ok(Self {
            slot,
            accessor,
            lists: Mutex::new(RefCell::new(RegisterLists::new())),
            replay_policy,
            autosuspend: Mutex::new(RefCell::new(autosuspend)),
        })
    }

    /// The accessor used for one-shot reads and writes and for replay.
    pub fn accessor(&self) -> &RegisterAccessor<M> {
        &self.accessor
    }

    /// Runs `f` with exclusive access to both lists inside a critical section.
    ///
    /// # Panics
    /// Panics if `f` reaches the lists of the same driver again, through
    /// [`append`](Self::append), [`snapshot`](Self::snapshot), a replay or a
    /// nested `with_lists`.
    pub fn with_lists<R>(&self, f: impl FnOnce(&mut ListView<N>) -> R) -> R {
        critical_section::with(|cs| self.lists_in(cs, f))
    }

    /// # Safety
    /// Must only be called where no other core or interrupt handler can use
    /// the driver, such as inside an interrupt handler that cannot be
    /// preempted by another user of it. The lists are still borrow checked.
    pub unsafe fn with_lists_unchecked<R>(&self, f: impl FnOnce(&mut ListView<N>) -> R) -> R {
        let cs = unsafe { CriticalSection::new() };
        self.lists_in(cs, f)
    }

    fn lists_in<R>(&self, cs: CriticalSection<'_>, f: impl FnOnce(&mut ListView<N>) -> R) -> R {
        let mut lists = self.lists.borrow_ref_mut(cs);
        let mut view = ListView::new(&mut lists);
        f(&mut view)
    }

    /// Appends one entry to the selected list.
    pub fn append(&self, list: ListSelector, entry: RegisterEntry) {
        self.with_lists(|view| view.append(list, entry))
    }

    /// Copy of the visible entries of the selected list, in insertion order.
    pub fn snapshot(&self, list: ListSelector) -> heapless::Vec<RegisterEntry, N> {
        self.with_lists(|view| view.snapshot(list))
    }
}

impl<'s, const N: usize, M, RP, AT> Drop for InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    fn drop(&mut self) {
        log::info!("inject driver detached");
        self.slot.release();
    }
}

#[cfg(test)]
mod tests {
    use crate::inject::{
        InjectError, ListSelector, RegisterEntry,
        storage::DriverSlot,
        test_support::{SimulatedBus, test_driver},
    };

    #[test]
    fn attach_claims_slot_and_detach_releases_it() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();

        assert!(!slot.is_attached());
        {
            let _driver = test_driver(&slot, &bus).unwrap();
            assert!(slot.is_attached());
        }
        assert!(!slot.is_attached());
    }

    #[test]
    fn second_attach_fails_and_leaves_first_untouched() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();

        let driver = test_driver(&slot, &bus).unwrap();
        driver.append(ListSelector::Suspend, RegisterEntry::new(0x1000, 1));
        driver.append(ListSelector::Resume, RegisterEntry::new(0x2000, 2));

        assert_eq!(
            test_driver(&slot, &bus).err(),
            Some(InjectError::AlreadyInitialized)
        );

        assert!(slot.is_attached());
        assert_eq!(
            driver.snapshot(ListSelector::Suspend).as_slice(),
            &[RegisterEntry::new(0x1000, 1)]
        );
        assert_eq!(
            driver.snapshot(ListSelector::Resume).as_slice(),
            &[RegisterEntry::new(0x2000, 2)]
        );
    }

    #[test]
    fn reattach_after_detach_starts_with_empty_lists() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();

        let driver = test_driver(&slot, &bus).unwrap();
        driver.append(ListSelector::Suspend, RegisterEntry::new(0x1000, 1));
        drop(driver);

        let driver = test_driver(&slot, &bus).unwrap();
        assert!(driver.snapshot(ListSelector::Suspend).is_empty());
    }

    #[test]
    fn append_k_entries_lists_them_in_order() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();
        let driver = test_driver(&slot, &bus).unwrap();

        for i in 0..5u64 {
            driver.append(ListSelector::Resume, RegisterEntry::new(0x1000 + i, i));
        }

        driver.with_lists(|view| {
            assert_eq!(view.count(ListSelector::Resume), 5);
            for (i, e) in view.list(ListSelector::Resume).enumerate() {
                assert_eq!(*e, RegisterEntry::new(0x1000 + i as u64, i as u64));
            }
        });
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn append_inside_with_lists_is_rejected() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();
        let driver = test_driver(&slot, &bus).unwrap();
        driver.append(ListSelector::Suspend, RegisterEntry::new(0x1000, 1));

        driver.with_lists(|view| {
            let first = view.list(ListSelector::Suspend).next().copied();
            driver.append(ListSelector::Suspend, RegisterEntry::new(0x9000, 2));
            first
        });
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn snapshot_inside_with_lists_is_rejected() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();
        let driver = test_driver(&slot, &bus).unwrap();

        driver.with_lists(|view| {
            view.append(ListSelector::Resume, RegisterEntry::new(0x1000, 1));
            driver.snapshot(ListSelector::Resume)
        });
    }

    #[test]
    fn lists_are_usable_again_after_with_lists_returns() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();
        let driver = test_driver(&slot, &bus).unwrap();

        let count = driver.with_lists(|view| {
            view.append(ListSelector::Suspend, RegisterEntry::new(0x1000, 1));
            view.count(ListSelector::Suspend)
        });
        driver.append(ListSelector::Suspend, RegisterEntry::new(0x2000, 2));

        assert_eq!(count, 1);
        assert_eq!(driver.snapshot(ListSelector::Suspend).len(), 2);
    }

    #[test]
    fn twenty_one_appends_leave_one_visible_entry() {
        let slot = DriverSlot::new();
        let bus = SimulatedBus::new();
        let driver = test_driver(&slot, &bus).unwrap();

        for i in 0..21u64 {
            driver.append(ListSelector::Suspend, RegisterEntry::new(0x1000 + 4 * i, i));
        }

        assert_eq!(
            driver.snapshot(ListSelector::Suspend).as_slice(),
            &[RegisterEntry::new(0x1000 + 4 * 20, 20)]
        );
    }
}
