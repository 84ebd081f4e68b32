//! Allocation strategies: where container storage comes from.
//!
//! A strategy hands out owned buffers of `count` initialized elements and
//! takes them back on `deallocate`. Buffers are opaque handles; element
//! access always goes through the strategy that produced the buffer.

use core::ops::Range;
use slotmap::{DefaultKey, SlotMap};
use thiserror::Error;

/// Reasons an allocation strategy refuses a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("heap allocation of {count} elements failed")]
    HeapExhausted { count: usize },
    #[error("arena exhausted: requested {requested} elements, {available} available")]
    ArenaExhausted { requested: usize, available: usize },
    #[error("capacity overflow")]
    CapacityOverflow,
}

/// A storage strategy for buffers of `T`.
///
/// Implementations must return buffers whose slices are exactly `count`
/// elements long and must keep a buffer's contents stable until it is
/// handed back through [`Allocator::deallocate`].
pub trait Allocator<T> {
    /// Owned handle to a buffer produced by this strategy.
    type Buffer;

    /// Allocate `count` elements, each produced by `fill`.
    fn allocate_with<F>(&mut self, count: usize, fill: F) -> Result<Self::Buffer, AllocError>
    where
        F: FnMut() -> T;

    /// Release a buffer previously returned by this strategy.
    fn deallocate(&mut self, buffer: Self::Buffer, count: usize);

    fn slice<'a>(&'a self, buffer: &'a Self::Buffer) -> &'a [T];

    fn slice_mut<'a>(&'a mut self, buffer: &'a mut Self::Buffer) -> &'a mut [T];

    /// Allocate `count` copies of `default`.
    fn allocate(&mut self, count: usize, default: T) -> Result<Self::Buffer, AllocError>
    where
        T: Clone,
    {
        self.allocate_with(count, || default.clone())
    }
}

impl<T, A> Allocator<T> for &mut A
where
    A: Allocator<T> + ?Sized,
{
    type Buffer = A::Buffer;

    #[inline]
    fn allocate_with<F>(&mut self, count: usize, fill: F) -> Result<Self::Buffer, AllocError>
    where
        F: FnMut() -> T,
    {
        (**self).allocate_with(count, fill)
    }

    #[inline]
    fn deallocate(&mut self, buffer: Self::Buffer, count: usize) {
        (**self).deallocate(buffer, count)
    }

    #[inline]
    fn slice<'a>(&'a self, buffer: &'a Self::Buffer) -> &'a [T] {
        (**self).slice(buffer)
    }

    #[inline]
    fn slice_mut<'a>(&'a mut self, buffer: &'a mut Self::Buffer) -> &'a mut [T] {
        (**self).slice_mut(buffer)
    }
}

/// Strategy backed by the global heap. Stateless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

impl<T> Allocator<T> for Heap {
    type Buffer = Box<[T]>;

    fn allocate_with<F>(&mut self, count: usize, fill: F) -> Result<Self::Buffer, AllocError>
    where
        F: FnMut() -> T,
    {
        let mut storage = Vec::new();
        if storage.try_reserve_exact(count).is_err() {
            log::warn!("heap refused allocation of {} elements", count);
            return Err(AllocError::HeapExhausted { count });
        }
        storage.extend(core::iter::repeat_with(fill).take(count));
        Ok(storage.into_boxed_slice())
    }

    fn deallocate(&mut self, buffer: Self::Buffer, count: usize) {
        debug_assert_eq!(buffer.len(), count);
        drop(buffer);
    }

    #[inline]
    fn slice<'a>(&'a self, buffer: &'a Self::Buffer) -> &'a [T] {
        buffer
    }

    #[inline]
    fn slice_mut<'a>(&'a mut self, buffer: &'a mut Self::Buffer) -> &'a mut [T] {
        buffer
    }
}

/// Buffer handle issued by an [`Arena`]. Becomes stale on [`Arena::reset`].
#[derive(Debug, PartialEq, Eq)]
pub struct ArenaBuffer(DefaultKey);

/// Fixed-capacity bump arena.
///
/// The region is reserved up front and allocations advance a single offset.
/// `deallocate` only retires the handle; the space is reclaimed for all
/// buffers at once by [`Arena::reset`].
pub struct Arena<T> {
    region: Vec<T>,
    capacity: usize,
    live: SlotMap<DefaultKey, Range<usize>>,
}

impl<T> Arena<T> {
    /// Reserve a region holding up to `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            region: Vec::with_capacity(capacity),
            capacity,
            live: SlotMap::with_key(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Elements consumed so far, including retired buffers.
    pub fn used(&self) -> usize {
        self.region.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.region.len()
    }

    /// Buffers handed out and not yet deallocated.
    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    /// Drop every element and rewind the offset. Outstanding handles go stale.
    pub fn reset(&mut self) {
        log::debug!(
            "arena reset: {} elements reclaimed, {} live buffers invalidated",
            self.region.len(),
            self.live.len()
        );
        self.region.clear();
        self.live.clear();
    }

    fn range(&self, buffer: &ArenaBuffer) -> Range<usize> {
        self.live
            .get(buffer.0)
            .cloned()
            .expect("arena buffer used after reset or deallocation")
    }
}

impl<T> core::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("used", &self.region.len())
            .field("live_buffers", &self.live.len())
            .finish()
    }
}

impl<T> Allocator<T> for Arena<T> {
    type Buffer = ArenaBuffer;

    fn allocate_with<F>(&mut self, count: usize, fill: F) -> Result<Self::Buffer, AllocError>
    where
        F: FnMut() -> T,
    {
        let available = self.remaining();
        if count > available {
            log::warn!(
                "arena refused allocation of {} elements ({} available)",
                count,
                available
            );
            return Err(AllocError::ArenaExhausted {
                requested: count,
                available,
            });
        }
        let start = self.region.len();
        self.region.extend(core::iter::repeat_with(fill).take(count));
        Ok(ArenaBuffer(self.live.insert(start..start + count)))
    }

    fn deallocate(&mut self, buffer: Self::Buffer, count: usize) {
        let retired = self.live.remove(buffer.0);
        debug_assert_eq!(retired.map(|r| r.len()), Some(count));
    }

    /// # Panics
    /// If `buffer` was issued before the last [`Arena::reset`].
    fn slice<'a>(&'a self, buffer: &'a Self::Buffer) -> &'a [T] {
        let range = self.range(buffer);
        &self.region[range]
    }

    /// # Panics
    /// If `buffer` was issued before the last [`Arena::reset`].
    fn slice_mut<'a>(&'a mut self, buffer: &'a mut Self::Buffer) -> &'a mut [T] {
        let range = self.range(buffer);
        &mut self.region[range]
    }
}
