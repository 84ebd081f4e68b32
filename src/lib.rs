//! aids: small allocator-aware building blocks for text processing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a handful of containers that take their storage from a
//!   caller-chosen strategy, plus the byte-level text tools they are
//!   usually combined with (word counting, code-point dumps).
//! - Layers:
//!   - `allocator`: the `Allocator<T>` strategy trait and two strategies,
//!     `Heap` (global heap, fallible reservation) and `Arena<T>`
//!     (fixed-capacity bump region with generational buffer handles).
//!   - `ByteView<'a>`: borrowed byte window with clamping chops, trimming,
//!     tokenizing and whole-view integer parsing.
//!   - `utf8`: structural UTF-8 decode/encode over byte views.
//!   - `HashMap<K, V, A, S>`: open addressing with linear probing over a
//!     bucket array obtained from `A`; includes a debug-only reentrancy
//!     guard around probing.
//!
//! Constraints
//! - Single-threaded: `HashMap` is `!Send`/`!Sync` (no atomics, no locks).
//! - Capacity is zero or a power of two; indices wrap with a mask.
//! - Growth allocates the new bucket array before touching the old one, so
//!   a refused allocation leaves the map unchanged.
//! - No per-entry heap allocation beyond the bucket array.
//!
//! Sizing policy
//! - `len()` counts distinct keys. Overwriting the value of an existing key
//!   does not change it.
//! - The map grows before probing whenever `len() == capacity()`, including
//!   for an insert that would only overwrite.
//!
//! Hashing
//! - Keys use `K: Hash + Eq` with a `BuildHasher` (hashbrown's default
//!   builder unless one is supplied). `a == b` must imply equal hashes;
//!   `ByteView` hashes its bytes, never its address.
//! - Keys are rehashed on growth; the hash is not cached in the bucket.
//!
//! Notes and non-goals
//! - No removal of individual keys: linear probing without tombstones
//!   cannot delete without breaking probe chains. `release()` drops
//!   everything at once.
//! - No global default allocator object: every map owns (or borrows) the
//!   strategy it was built with. `HashMap::new()` uses the stateless `Heap`.
//! - UTF-8 decoding does not reject overlong forms or surrogates.
//!
//! ```
//! use aids::{utf8, ByteView, HashMap};
//!
//! let mut freq: HashMap<ByteView<'_>, u32> = HashMap::new();
//! let mut text = ByteView::from("the cat and the hat");
//! while !text.is_empty() {
//!     let word = text.chop_word();
//!     if !word.is_empty() {
//!         *freq.get_or_insert_default(word).unwrap() += 1;
//!     }
//! }
//! assert_eq!(freq[&ByteView::from("the")], 2);
//!
//! let (code, len) = utf8::decode(ByteView::from("é")).unwrap();
//! assert_eq!((code, len), (0xE9, 2));
//! assert_eq!(utf8::encode(code).as_bytes(), "é".as_bytes());
//! ```

pub mod allocator;
mod byte_view;
pub mod hash_map;
mod hash_map_proptest;
mod reentrancy;
pub mod utf8;

// Public surface
pub use allocator::{AllocError, Allocator, Arena, ArenaBuffer, Heap};
pub use byte_view::{ByteView, Integer};
pub use hash_map::{Bucket, HashMap, INITIAL_CAPACITY};
pub use utf8::{DecodeError, EncodeError, Utf8Char};
