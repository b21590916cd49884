use core::error::Error;
use core::fmt;

/// Error returned when a slot array cannot be allocated.
///
/// This is the crate's only error kind. The fallible constructors return it
/// when the initial allocation fails, and `try_insert` / `try_reserve`
/// return it when the rebuild they trigger cannot get memory. Whatever
/// operation produced the error left the set untouched: the previous slot
/// array, counts, and contents all remain valid, and the set stays fully
/// usable.
///
/// # Examples
///
/// ```rust
/// use probe_set::IntSet;
///
/// let set = IntSet::try_with_capacity(100);
/// assert!(set.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    slots: usize,
}

impl AllocError {
    pub(crate) fn new(slots: usize) -> Self {
        Self { slots }
    }

    /// Returns the slot count of the allocation that failed.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to allocate a slot array of {} slots", self.slots)
    }
}

impl Error for AllocError {}
