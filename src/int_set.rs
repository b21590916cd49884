use alloc::alloc::handle_alloc_error;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;

use crate::error::AllocError;
use crate::mix::mix;

/// Smallest slot array ever allocated. Capacity hints round up to a power of
/// two and never below this floor.
const MIN_CAPACITY: usize = 16;

/// Combined occupancy (live values plus tombstones) at which an insert
/// doubles the table: three quarters of capacity, exact for power-of-two
/// capacities.
#[inline(always)]
fn grow_watermark(capacity: usize) -> usize {
    capacity / 4 * 3
}

/// Tombstone count at which an insert rebuilds the table at its current
/// capacity: one quarter of capacity.
#[inline(always)]
fn compact_watermark(capacity: usize) -> usize {
    capacity / 4
}

/// Rounds a caller-supplied capacity hint up to a valid capacity. `None`
/// when the rounding overflows `usize`, which no allocator could satisfy
/// anyway.
#[inline(always)]
fn capacity_from_hint(hint: usize) -> Option<usize> {
    hint.max(MIN_CAPACITY).checked_next_power_of_two()
}

/// Smallest valid capacity whose growth watermark admits `len` values.
#[inline(always)]
fn capacity_for(len: usize) -> Option<usize> {
    let wanted = (len as u128 * 4).div_ceil(3);
    if wanted > usize::MAX as u128 {
        return None;
    }
    capacity_from_hint(wanted as usize)
}

fn try_allocate_slots(capacity: usize) -> Result<Vec<Slot>, AllocError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| AllocError::new(capacity))?;
    slots.resize(capacity, Slot::Empty);
    Ok(slots)
}

/// Funnels an allocation failure out of the infallible entry points:
/// capacity overflows panic like the std collections, anything else is a
/// real out-of-memory condition and aborts through the global handler.
#[cold]
#[inline(never)]
fn raise_alloc_failure(err: AllocError) -> ! {
    match Layout::array::<Slot>(err.slots()) {
        Ok(layout) => handle_alloc_error(layout),
        Err(_) => panic!("capacity overflow"),
    }
}

/// Claims the first free slot on `value`'s probe sequence in a freshly
/// allocated array. The walk is the same home-and-triangular-step sequence
/// the live probe uses, so every value placed here is found again by it. A
/// fresh array holds no tombstones, which reduces the scan to skipping
/// occupied slots.
fn place(slots: &mut [Slot], mask: usize, value: i32) {
    let mut index = mix(value) as usize & mask;
    let mut step = 0;
    while let Slot::Occupied(_) = slots[index] {
        step += 1;
        index = (index + step) & mask;
    }
    slots[index] = Slot::Occupied(value);
}

/// One slot of the table.
///
/// `Empty` terminates probe sequences; `Deleted` (a tombstone) keeps them
/// alive so values displaced past a since-removed entry stay reachable.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Empty,
    Deleted,
    Occupied(i32),
}

/// Debug statistics for table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live values in the set
    pub occupied: usize,
    /// Number of tombstoned slots awaiting compaction
    pub tombstones: usize,
    /// Total number of slots allocated
    pub capacity: usize,
    /// Load factor (occupied / capacity)
    pub load_factor: f64,
    /// Combined pressure the growth watermark tracks
    /// ((occupied + tombstones) / capacity)
    pub slot_pressure: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-prints the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== IntSet Debug Statistics ===");
        println!(
            "Live values: {}/{} ({:.2}% load factor)",
            self.occupied,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Tombstones: {} ({:.2}% combined slot pressure)",
            self.tombstones,
            self.slot_pressure * 100.0
        );
        println!("Memory: {} bytes for the slot array", self.total_bytes);
    }
}

#[cfg(all(any(test, feature = "stats"), feature = "std"))]
const PARTIAL_BLOCKS: [char; 7] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// A hash set for 32-bit integers built on open addressing.
///
/// Values live directly in one flat slot array. A fixed avalanche mix picks
/// the home slot, collisions walk a triangular probe sequence (step sizes
/// 1, 2, 3, …), and removals leave tombstones behind so later values on the
/// same sequence stay reachable. Inserting doubles the table when live
/// values and tombstones together reach three quarters of capacity, and
/// rebuilds it at the same capacity when tombstones alone reach one
/// quarter, so deletion-heavy workloads shed their tombstones instead of
/// growing without bound.
///
/// Capacities are powers of two, never below 16, so slot selection is a
/// mask of the mixed hash. The watermarks keep at least a quarter of the
/// slots empty at all times, which is what bounds every probe walk.
///
/// # Examples
///
/// ```rust
/// use probe_set::IntSet;
///
/// let mut set = IntSet::new();
/// assert!(set.insert(7));
/// assert!(set.contains(7));
/// assert!(set.remove(7));
/// assert!(!set.contains(7));
/// ```
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per slot, with at least a quarter of the slots
///   kept empty at all times.
/// - **Operations**: expected O(1) insert, lookup, and remove; worst-case
///   probe walks are bounded by capacity.
#[derive(Clone)]
pub struct IntSet {
    slots: Vec<Slot>,
    mask: usize,
    occupied: usize,
    tombstones: usize,
}

impl PartialEq for IntSet {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|value| other.contains(value))
    }
}

impl Eq for IntSet {}

impl Debug for IntSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl IntSet {
    /// Creates a new set with the minimum capacity of 16 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let set = IntSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates a new set with at least `capacity` slots.
    ///
    /// The hint is rounded up to the next power of two and never below 16,
    /// so the actual capacity may be larger than requested.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let set = IntSet::with_capacity(10);
    /// assert_eq!(set.capacity(), 16);
    ///
    /// let set = IntSet::with_capacity(100);
    /// assert_eq!(set.capacity(), 128);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity overflows `usize`; aborts if the
    /// allocator cannot supply the slot array. Use
    /// [`try_with_capacity`](Self::try_with_capacity) to handle either as
    /// an error instead.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(set) => set,
            Err(err) => raise_alloc_failure(err),
        }
    }

    /// Creates a new set with at least `capacity` slots, reporting
    /// allocation failure instead of aborting.
    ///
    /// The hint is rounded exactly as in
    /// [`with_capacity`](Self::with_capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let set = IntSet::try_with_capacity(10)?;
    /// assert_eq!(set.capacity(), 16);
    /// # Ok::<(), probe_set::AllocError>(())
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let slot_count = capacity_from_hint(capacity).ok_or(AllocError::new(capacity))?;
        let slots = try_allocate_slots(slot_count)?;
        Ok(Self {
            slots,
            mask: slot_count - 1,
            occupied: 0,
            tombstones: 0,
        })
    }

    /// Returns the number of values in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the set contains no values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// assert!(set.is_empty());
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the length of the slot array.
    ///
    /// This is the slot count, not an element budget: the set rebuilds
    /// when live values and tombstones together reach three quarters of
    /// it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let set = IntSet::with_capacity(1000);
    /// assert_eq!(set.capacity(), 1024);
    /// ```
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the set contains `value`.
    ///
    /// Lookup walks the probe sequence, passing over tombstones and
    /// non-matching slots, and stops at the first empty slot or at the
    /// value. It never mutates the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// set.insert(3);
    /// assert!(set.contains(3));
    /// assert!(!set.contains(4));
    /// ```
    pub fn contains(&self, value: i32) -> bool {
        if self.occupied == 0 {
            return false;
        }
        matches!(self.slots[self.probe(value)], Slot::Occupied(_))
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was inserted, `false` if it was already
    /// present. Before placing the value the set applies its two
    /// watermarks: combined occupancy at three quarters of capacity
    /// doubles the table, and failing that, tombstones at one quarter of
    /// capacity trigger a same-capacity rebuild that clears them. An
    /// insert that lands on a probe sequence with a tombstone reuses the
    /// tombstoned slot rather than consuming a fresh one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// assert!(set.insert(7));
    /// assert!(!set.insert(7));
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Panics
    ///
    /// Aborts if a triggered rebuild cannot allocate. Use
    /// [`try_insert`](Self::try_insert) to handle that as an error
    /// instead.
    pub fn insert(&mut self, value: i32) -> bool {
        match self.try_insert(value) {
            Ok(inserted) => inserted,
            Err(err) => raise_alloc_failure(err),
        }
    }

    /// Adds a value to the set, reporting allocation failure instead of
    /// aborting.
    ///
    /// Behaves exactly like [`insert`](Self::insert), except that an
    /// allocation failure in a triggered rebuild is returned as an error.
    /// On error the set is untouched: nothing was inserted, and the
    /// existing contents remain valid and usable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// assert_eq!(set.try_insert(1), Ok(true));
    /// assert_eq!(set.try_insert(1), Ok(false));
    /// ```
    pub fn try_insert(&mut self, value: i32) -> Result<bool, AllocError> {
        self.make_room()?;
        let index = self.probe(value);
        match self.slots[index] {
            Slot::Occupied(_) => Ok(false),
            Slot::Deleted => {
                self.slots[index] = Slot::Occupied(value);
                self.occupied += 1;
                self.tombstones -= 1;
                Ok(true)
            }
            Slot::Empty => {
                self.slots[index] = Slot::Occupied(value);
                self.occupied += 1;
                Ok(true)
            }
        }
    }

    /// Removes a value from the set.
    ///
    /// Returns `true` if the value was present. The slot becomes a
    /// tombstone rather than an empty slot, keeping probe sequences that
    /// pass through it intact. Removal never rebuilds the table; tombstone
    /// pressure is resolved by the next insert that crosses the compaction
    /// watermark.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// set.insert(5);
    /// assert!(set.remove(5));
    /// assert!(!set.remove(5));
    /// ```
    pub fn remove(&mut self, value: i32) -> bool {
        if self.occupied == 0 {
            return false;
        }
        let index = self.probe(value);
        match self.slots[index] {
            Slot::Occupied(_) => {
                self.slots[index] = Slot::Deleted;
                self.occupied -= 1;
                self.tombstones += 1;
                true
            }
            _ => false,
        }
    }

    /// Removes all values, keeping the allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::with_capacity(100);
    /// set.insert(1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 128);
    /// ```
    pub fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.occupied = 0;
        self.tombstones = 0;
    }

    /// Pre-sizes the set so that `additional` further inserts perform no
    /// rebuild at all.
    ///
    /// Rebuilds at most once, up front: to a larger power of two if the
    /// growth watermark would be crossed, or at the current capacity if
    /// tombstones alone could trigger compaction mid-insert. A set that
    /// already has room is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// set.reserve(1000);
    /// let capacity = set.capacity();
    /// for value in 0..1000 {
    ///     set.insert(value);
    /// }
    /// assert_eq!(set.capacity(), capacity);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics or aborts like [`with_capacity`](Self::with_capacity) when
    /// the target capacity cannot be allocated. Use
    /// [`try_reserve`](Self::try_reserve) to handle that as an error.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            raise_alloc_failure(err);
        }
    }

    /// Pre-sizes the set like [`reserve`](Self::reserve), reporting
    /// allocation failure instead of aborting. On error the set is
    /// untouched.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let capacity = self.slots.len();
        let outstanding = self
            .occupied
            .checked_add(self.tombstones)
            .and_then(|pressure| pressure.checked_add(additional));
        if let Some(outstanding) = outstanding {
            if grow_watermark(capacity) >= outstanding
                && self.tombstones < compact_watermark(capacity)
            {
                return Ok(());
            }
        }
        let target = self
            .occupied
            .checked_add(additional)
            .and_then(capacity_for)
            .ok_or(AllocError::new(usize::MAX))?
            .max(capacity);
        self.rebuild(target)
    }

    /// Returns an iterator over the values of the set in an unspecified
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_set::IntSet;
    ///
    /// let mut set = IntSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut values: Vec<i32> = set.iter().collect();
    /// values.sort_unstable();
    /// assert_eq!(values, [1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let capacity = self.slots.len();
        DebugStats {
            occupied: self.occupied,
            tombstones: self.tombstones,
            capacity,
            load_factor: self.occupied as f64 / capacity as f64,
            slot_pressure: (self.occupied + self.tombstones) as f64 / capacity as f64,
            total_bytes: capacity * size_of::<Slot>(),
        }
    }

    /// Computes a histogram of probe distances for the current table
    /// state.
    ///
    /// Index `d` counts the live values found `d` steps from their home
    /// slot, so index 0 is the collision-free case. Returns an empty
    /// vector for an empty set.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut histogram = Vec::new();
        for slot in &self.slots {
            let Slot::Occupied(value) = *slot else {
                continue;
            };
            let distance = self.probe_distance(value);
            if histogram.len() <= distance {
                histogram.resize(distance + 1, 0);
            }
            histogram[distance] += 1;
        }
        histogram
    }

    /// Pretty-prints the probe-distance histogram to stdout as a
    /// horizontal bar chart, one row per distance.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        const BAR_WIDTH: usize = 60;

        let histogram = self.probe_histogram();
        let Some(&peak) = histogram.iter().max() else {
            println!("probe histogram: empty");
            return;
        };

        println!("probe histogram ({} values):", self.occupied);
        for (distance, &count) in histogram.iter().enumerate() {
            let eighths =
                ((count as u128 * (BAR_WIDTH as u128 * 8)).div_ceil(peak as u128)) as usize;
            let mut bar = "█".repeat(eighths / 8);
            if eighths % 8 > 0 {
                bar.push(PARTIAL_BLOCKS[eighths % 8 - 1]);
            }
            println!("{:>3} | {} ({})", distance, bar, count);
        }
    }

    /// Applies the two add-path watermarks before a value is placed.
    fn make_room(&mut self) -> Result<(), AllocError> {
        let capacity = self.slots.len();
        if self.occupied + self.tombstones >= grow_watermark(capacity) {
            // The existing allocation already bounds `capacity`, so the
            // doubled value cannot overflow.
            self.rebuild(capacity * 2)
        } else if self.tombstones >= compact_watermark(capacity) {
            self.rebuild(capacity)
        } else {
            Ok(())
        }
    }

    /// Walks the probe sequence for `value`, returning the index of the
    /// slot that decides the operation.
    ///
    /// When the value is present this is its occupied slot. When it is
    /// absent, it is the slot an insert would claim: the first tombstone
    /// passed on the walk, or else the empty slot that terminated it. All
    /// operations share this walk, so they agree on where any value lives.
    ///
    /// Termination: the watermarks keep combined occupancy at or below
    /// three quarters of capacity, and the triangular sequence visits
    /// every slot of a power-of-two table before repeating, so an empty
    /// slot is always reached.
    #[inline(always)]
    fn probe(&self, value: i32) -> usize {
        debug_assert_eq!(self.mask, self.slots.len() - 1);
        let mut index = mix(value) as usize & self.mask;
        let mut step = 0;
        let mut reuse = None;
        loop {
            match self.slots[index] {
                Slot::Empty => return reuse.unwrap_or(index),
                Slot::Occupied(held) if held == value => return index,
                Slot::Occupied(_) => {}
                Slot::Deleted => {
                    if reuse.is_none() {
                        reuse = Some(index);
                    }
                }
            }
            step += 1;
            index = (index + step) & self.mask;
        }
    }

    /// Number of probe steps from `value`'s home slot to the slot holding
    /// it. The value must be present.
    #[cfg(any(test, feature = "stats"))]
    fn probe_distance(&self, value: i32) -> usize {
        let mut index = mix(value) as usize & self.mask;
        let mut step = 0;
        while !matches!(self.slots[index], Slot::Occupied(held) if held == value) {
            step += 1;
            index = (index + step) & self.mask;
        }
        step
    }

    /// Replaces the slot array with a fresh one of `new_capacity` slots
    /// and re-places every live value; tombstones are dropped. On
    /// allocation failure the set is untouched.
    fn rebuild(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let mut slots = try_allocate_slots(new_capacity)?;
        let mask = new_capacity - 1;
        for slot in &self.slots {
            if let Slot::Occupied(value) = *slot {
                place(&mut slots, mask, value);
            }
        }
        self.slots = slots;
        self.mask = mask;
        self.tombstones = 0;
        Ok(())
    }
}

impl Default for IntSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<i32> for IntSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<i32> for IntSet {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl IntoIterator for IntSet {
    type IntoIter = IntoIter;
    type Item = i32;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a IntSet {
    type IntoIter = Iter<'a>;
    type Item = i32;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of an `IntSet`.
///
/// Values are copied out in an unspecified order.
pub struct Iter<'a> {
    slots: core::slice::Iter<'a, Slot>,
}

impl Iterator for Iter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Slot::Occupied(value) = self.slots.next()? {
                return Some(*value);
            }
        }
    }
}

/// A consuming iterator over the values of an `IntSet`.
pub struct IntoIter {
    slots: alloc::vec::IntoIter<Slot>,
}

impl Iterator for IntoIter {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Slot::Occupied(value) = self.slots.next()? {
                return Some(value);
            }
        }
    }
}
