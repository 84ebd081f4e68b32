//! HashMap: open addressing with linear probing over allocator-provided buckets.

use crate::allocator::{AllocError, Allocator, Heap};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// Bucket count of the first allocation made by an empty map.
pub const INITIAL_CAPACITY: usize = 256;

/// One slot of the bucket array.
pub type Bucket<K, V> = Option<(K, V)>;

/// Raw table: bucket storage plus the probing and growth logic. Never calls
/// back into itself, so the outer map only needs a single guard per method.
struct Table<K, V, A, S>
where
    A: Allocator<Bucket<K, V>>,
{
    buckets: Option<A::Buffer>,
    capacity: usize,
    size: usize,
    alloc: A,
    hasher: S,
}

impl<K, V, A, S> Table<K, V, A, S>
where
    A: Allocator<Bucket<K, V>>,
{
    fn slots(&self) -> &[Bucket<K, V>] {
        match &self.buckets {
            Some(b) => self.alloc.slice(b),
            None => &[],
        }
    }

    fn slots_mut(&mut self) -> &mut [Bucket<K, V>] {
        match &mut self.buckets {
            Some(b) => self.alloc.slice_mut(b),
            None => &mut [],
        }
    }

    /// Drop every entry and hand the buckets back to the allocator.
    fn release(&mut self) {
        if let Some(mut buf) = self.buckets.take() {
            // Arena buffers keep their contents until reset; drop entries now.
            for slot in self.alloc.slice_mut(&mut buf) {
                *slot = None;
            }
            self.alloc.deallocate(buf, self.capacity);
        }
        self.capacity = 0;
        self.size = 0;
    }
}

impl<K, V, A, S> Table<K, V, A, S>
where
    K: Eq + Hash,
    A: Allocator<Bucket<K, V>>,
    S: BuildHasher,
{
    #[inline]
    fn ideal_index<Q>(&self, q: &Q, mask: usize) -> usize
    where
        Q: ?Sized + Hash,
    {
        (self.hasher.hash_one(q) as usize) & mask
    }

    /// First slot on `q`'s probe sequence that is empty or holds `q`.
    /// `None` only when no buckets exist or every bucket holds another key.
    fn find_slot<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slots = self.slots();
        if slots.is_empty() {
            return None;
        }
        let mask = self.capacity - 1;
        let mut index = self.ideal_index(q, mask);
        for _ in 0..self.capacity {
            match &slots[index] {
                None => return Some(index),
                Some((k, _)) if k.borrow() == q => return Some(index),
                Some(_) => index = (index + 1) & mask,
            }
        }
        None
    }

    fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_slot(q).filter(|&i| self.slots()[i].is_some())
    }

    fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(q)?;
        self.slots()[i].as_ref().map(|(_, v)| v)
    }

    fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(q)?;
        self.slots_mut()[i].as_mut().map(|(_, v)| v)
    }

    fn value_mut_at(&mut self, index: usize) -> Option<&mut V> {
        self.slots_mut()[index].as_mut().map(|(_, v)| v)
    }

    /// Store `value` under `key`. Returns the bucket index and the value
    /// previously stored under an equal key, if any.
    fn insert(&mut self, key: K, value: V) -> Result<(usize, Option<V>), AllocError> {
        if self.size >= self.capacity {
            self.grow()?;
        }
        let Some(index) = self.find_slot(&key) else {
            unreachable!("probe found no slot with {} of {} buckets used", self.size, self.capacity);
        };
        let slot = &mut self.slots_mut()[index];
        if let Some((_, v)) = slot.as_mut() {
            return Ok((index, Some(core::mem::replace(v, value))));
        }
        *slot = Some((key, value));
        self.size += 1;
        Ok((index, None))
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        let new_capacity = match self.capacity {
            0 => INITIAL_CAPACITY,
            n => n.checked_mul(2).ok_or(AllocError::CapacityOverflow)?,
        };
        self.resize(new_capacity)
    }

    /// Move every entry into a fresh bucket array of `new_capacity` slots.
    /// The new array is allocated before anything is touched, so a refused
    /// allocation leaves the table as it was.
    fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        debug_assert!(new_capacity.is_power_of_two());
        debug_assert!(new_capacity > self.size);
        let mut fresh = self.alloc.allocate_with(new_capacity, || None)?;
        let old_capacity = self.capacity;
        let expected = self.size;
        let mask = new_capacity - 1;

        // If a user `Hash` panics mid-way the table is left empty, not torn.
        self.capacity = 0;
        self.size = 0;
        let mut moved = 0;
        if let Some(mut old) = self.buckets.take() {
            for i in 0..old_capacity {
                let Some((key, value)) = self.alloc.slice_mut(&mut old)[i].take() else {
                    continue;
                };
                let mut index = self.ideal_index(&key, mask);
                let slots = self.alloc.slice_mut(&mut fresh);
                while slots[index].is_some() {
                    index = (index + 1) & mask;
                }
                slots[index] = Some((key, value));
                moved += 1;
            }
            self.alloc.deallocate(old, old_capacity);
        }
        debug_assert_eq!(moved, expected);

        log::debug!(
            "hash map resized from {} to {} buckets ({} entries)",
            old_capacity,
            new_capacity,
            moved
        );
        self.buckets = Some(fresh);
        self.capacity = new_capacity;
        self.size = moved;
        Ok(())
    }
}

impl<K, V, A, S> Drop for Table<K, V, A, S>
where
    A: Allocator<Bucket<K, V>>,
{
    fn drop(&mut self) {
        self.release();
    }
}

/// Open-addressing hash map whose buckets come from an [`Allocator`].
///
/// Keys need `Hash + Eq`, and the two must agree: `a == b` implies
/// `hash(a) == hash(b)`. Capacity is zero until the first insert, then
/// [`INITIAL_CAPACITY`], and doubles whenever an insert finds every bucket
/// taken. There is no removal of individual keys.
pub struct HashMap<K, V, A = Heap, S = DefaultHashBuilder>
where
    A: Allocator<Bucket<K, V>>,
{
    table: Table<K, V, A, S>,
    reentrancy: DebugReentrancy,
}

impl<K, V> HashMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty heap-backed map. Does not allocate.
    pub fn new() -> Self {
        Self::new_in(Heap)
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, A> HashMap<K, V, A>
where
    K: Eq + Hash,
    A: Allocator<Bucket<K, V>>,
{
    /// Empty map that will take its buckets from `alloc`. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self::with_hasher_in(DefaultHashBuilder::default(), alloc)
    }

    /// Map with room for at least `capacity` entries, allocated up front.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocError> {
        Self::with_capacity_and_hasher_in(capacity, DefaultHashBuilder::default(), alloc)
    }
}

impl<K, V, A, S> HashMap<K, V, A, S>
where
    A: Allocator<Bucket<K, V>>,
{
    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.table.size
    }

    pub fn is_empty(&self) -> bool {
        self.table.size == 0
    }

    /// Number of buckets; zero or a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity
    }

    pub fn allocator(&self) -> &A {
        &self.table.alloc
    }

    pub fn hasher(&self) -> &S {
        &self.table.hasher
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.slots().iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.slots_mut().iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Drop all entries and return the buckets to the allocator. The map is
    /// empty with zero capacity afterwards and can be reused.
    pub fn release(&mut self) {
        let _g = self.reentrancy.enter();
        self.table.release();
    }
}

impl<K, V, A, S> HashMap<K, V, A, S>
where
    K: Eq + Hash,
    A: Allocator<Bucket<K, V>>,
    S: BuildHasher,
{
    pub fn with_hasher_in(hasher: S, alloc: A) -> Self {
        Self {
            table: Table {
                buckets: None,
                capacity: 0,
                size: 0,
                alloc,
                hasher,
            },
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Rounds `capacity` up to a power of two and allocates that many buckets.
    pub fn with_capacity_and_hasher_in(
        capacity: usize,
        hasher: S,
        alloc: A,
    ) -> Result<Self, AllocError> {
        let mut map = Self::with_hasher_in(hasher, alloc);
        if capacity > 0 {
            let buckets = capacity
                .checked_next_power_of_two()
                .ok_or(AllocError::CapacityOverflow)?;
            map.table.resize(buckets)?;
        }
        Ok(map)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.table.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.table.get(q)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.table.get_mut(q)
    }

    /// Store `value` under `key`, returning the value it replaced.
    ///
    /// Growth happens before probing whenever every bucket is in use. On
    /// overwrite the stored key is kept and `len` does not change. If the
    /// allocator refuses the new bucket array the map is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, AllocError> {
        let _g = self.reentrancy.enter();
        self.table.insert(key, value).map(|(_, old)| old)
    }

    /// Mutable access to the value under `key`, inserting `default()` first
    /// if the key is missing.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> Result<&mut V, AllocError>
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let index = match self.table.find(&key) {
            Some(i) => i,
            None => self.table.insert(key, default())?.0,
        };
        Ok(self
            .table
            .value_mut_at(index)
            .expect("bucket occupied after lookup or insert"))
    }

    /// Mutable access to the value under `key`, inserting `V::default()`
    /// first if the key is missing. Repeated calls reuse the same entry.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, AllocError>
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }
}

impl<K, Q, V, A, S> Index<&Q> for HashMap<K, V, A, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    A: Allocator<Bucket<K, V>>,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    /// If `key` is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in HashMap")
    }
}

impl<K, V, A, S> fmt::Debug for HashMap<K, V, A, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: Allocator<Bucket<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over entries of a [`HashMap`], in bucket order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().find_map(|b| b.as_ref().map(|(k, v)| (k, v)))
    }
}

/// Iterator over entries of a [`HashMap`] with mutable values.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .by_ref()
            .find_map(|b| b.as_mut().map(|(k, v)| (&*k, v)))
    }
}

impl<'a, K, V, A, S> IntoIterator for &'a HashMap<K, V, A, S>
where
    A: Allocator<Bucket<K, V>>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
