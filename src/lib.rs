//! This crate provides the [`DynVec`] data structure: a growable
//! contiguous-storage container ("dynamic array") with explicit checked and
//! unchecked element access.
//!
//! A `DynVec<T>` owns a single contiguous heap block, keeps a `len`/`capacity`
//! pair over it, and doubles the capacity whenever an append would overflow
//! it, so [`push`](DynVec::push) is amortized O(1). The two access paths are
//! separately named so the safety contract is visible at the call site:
//! [`at`](DynVec::at) validates the index and reports
//! [`DynVecError::IndexOutOfRange`], while the `unsafe`
//! [`get_unchecked`](DynVec::get_unchecked) mirrors raw-array semantics with
//! no validation at all.
//!
//! ## Basic usage
//!
//! ```rust
//! use dyn_vec::DynVec;
//!
//! let mut v = DynVec::new();
//! v.push(10);
//! v.push(20);
//! v.push(30);
//!
//! assert_eq!(v.len(), 3);
//! assert_eq!(v.capacity(), 4); // capacity doubles: 0 -> 1 -> 2 -> 4
//! assert_eq!(v.at(1), Ok(&20));
//! assert_eq!(v.pop(), Some(30));
//! ```
//!
//! Fallible variants (`try_push`, `try_reserve`, `try_with_capacity`) return
//! a [`DynVecError`] instead of panicking, and leave the vector untouched on
//! failure:
//!
//! ```rust
//! use dyn_vec::{DynVec, DynVecError};
//!
//! let result = DynVec::<u64>::try_with_capacity(usize::MAX / 2);
//! assert!(matches!(result, Err(DynVecError::CapacityExceeded { .. })));
//! ```
//!
//! ## Reference invalidation and threads
//!
//! Growing the vector moves its storage: every reference, slice or raw
//! pointer previously obtained from it is invalidated. For safe code the
//! borrow checker rules this out; callers holding raw pointers from
//! [`as_ptr`](DynVec::as_ptr) across a growing call are racing their own
//! allocator, with or without locks.
//!
//! The container performs no internal synchronization. It is `Send`/`Sync`
//! exactly when `T` is, and concurrent mutation of one instance requires
//! external serialization (or per-thread instances merged afterwards).

pub mod error;
pub mod raw;
pub mod vec;

pub use error::DynVecError;
pub use vec::{
	DynVec,
	IntoIter
};
