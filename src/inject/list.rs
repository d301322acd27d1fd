use crate::inject::types::{ListSelector, RegisterEntry};

/// Fixed-capacity list of register writes with a hard reset when full.
///
/// Appending to a full list does not evict the oldest entry. The cursor jumps
/// back to index 0 and filling restarts from there, so after a wrap only the
/// entries written in the current lap are visible. Entries from the previous
/// lap that sit past the cursor stay in memory but are unreachable until they
/// are overwritten.
///
/// A list needs room for at least one entry:
///
/// ```compile_fail
/// use reg_inject::inject::RegisterList;
///
/// const EMPTY: RegisterList<0> = RegisterList::new();
/// ```
#[derive(Debug, Clone)]
pub struct RegisterList<const N: usize> {
    entries: [RegisterEntry; N],
    count: usize,
}

impl<const N: usize> RegisterList<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "register list capacity must be at least 1") };
        Self {
            entries: [RegisterEntry::new(0, 0); N],
            count: 0,
        }
    }

    /// Appends an entry, restarting from index 0 if the list is full.
    pub fn append(&mut self, entry: RegisterEntry) {
        if self.count >= N {
            self.count = 0;
        }
        self.entries[self.count] = entry;
        self.count += 1;
    }

    /// Number of visible entries, which is also the next insertion slot.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Visible entries in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[RegisterEntry] {
        &self.entries[..self.count]
    }

    /// Iterates over visible entries in insertion order.
    ///
    /// The iterator borrows the list and can be recreated any number of times.
    pub fn iter(&self) -> core::slice::Iter<'_, RegisterEntry> {
        self.as_slice().iter()
    }

    /// Forgets all entries.
    pub fn clear(&mut self) {
        self.count = 0;
    }
}

impl<const N: usize> Default for RegisterList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> IntoIterator for &'a RegisterList<N> {
    type Item = &'a RegisterEntry;
    type IntoIter = core::slice::Iter<'a, RegisterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The suspend and resume lists owned by one driver instance.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegisterLists<const N: usize> {
    suspend: RegisterList<N>,
    resume: RegisterList<N>,
}

impl<const N: usize> RegisterLists<N> {
    pub(crate) const fn new() -> Self {
        Self {
            suspend: RegisterList::new(),
            resume: RegisterList::new(),
        }
    }

    pub(crate) fn get(&self, list: ListSelector) -> &RegisterList<N> {
        match list {
            ListSelector::Suspend => &self.suspend,
            ListSelector::Resume => &self.resume,
        }
    }

    pub(crate) fn get_mut(&mut self, list: ListSelector) -> &mut RegisterList<N> {
        match list {
            ListSelector::Suspend => &mut self.suspend,
            ListSelector::Resume => &mut self.resume,
        }
    }
}
