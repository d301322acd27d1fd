use heapless::Vec;

use crate::inject::{
    list::{RegisterList, RegisterLists},
    types::{ListSelector, RegisterEntry},
};

/// Exclusive view of a driver's suspend and resume lists.
///
/// Obtained through [`InjectDriver::with_lists`](crate::inject::InjectDriver::with_lists),
/// which holds a critical section for the lifetime of the view, so appends
/// through one view never interleave with appends or replays elsewhere.
pub struct ListView<'a, const N: usize> {
    lists: &'a mut RegisterLists<N>,
}

impl<'a, const N: usize> core::fmt::Debug for ListView<'a, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListView").finish_non_exhaustive()
    }
}

impl<'a, const N: usize> ListView<'a, N> {
    pub(crate) fn new(lists: &'a mut RegisterLists<N>) -> Self {
        Self { lists }
    }

    /// Appends an entry to the selected list.
    ///
    /// Never fails: a full list restarts from index 0.
    pub fn append(&mut self, list: ListSelector, entry: RegisterEntry) {
        log::info!(
            "{} cfg: reg={:#010x}, val={:#x}",
            list.as_str(),
            entry.register_address,
            entry.value
        );
        self.lists.get_mut(list).append(entry);
    }

    /// Visible entries of the selected list in insertion order.
    pub fn list(&self, list: ListSelector) -> core::slice::Iter<'_, RegisterEntry> {
        self.lists.get(list).iter()
    }

    /// Direct access to the selected list.
    pub fn get(&self, list: ListSelector) -> &RegisterList<N> {
        self.lists.get(list)
    }

    pub fn count(&self, list: ListSelector) -> usize {
        self.lists.get(list).count()
    }

    /// Copies the visible entries of the selected list out of the view.
    pub fn snapshot(&self, list: ListSelector) -> Vec<RegisterEntry, N> {
        // at most N visible entries, so this never truncates
        self.lists.get(list).iter().copied().collect()
    }

    /// Forgets all entries of the selected list.
    pub fn clear(&mut self, list: ListSelector) {
        self.lists.get_mut(list).clear();
    }
}
