//! Error types for fallible container operations.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Errors that can occur during [`DynVec`](crate::DynVec) operations.
///
/// All growth-related failures leave the container exactly as it was before
/// the attempt (strong guarantee).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DynVecError {
	/// The underlying allocator could not satisfy a capacity request.
	///
	/// Not retryable without freeing memory elsewhere first.
	AllocFailed {
		/// The layout that was requested.
		layout: Layout,
	},
	/// A requested capacity cannot be represented: the element layout
	/// overflows `usize`, or the allocation would exceed `isize::MAX` bytes.
	CapacityExceeded {
		/// Number of element slots requested.
		requested: usize,
	},
	/// A checked accessor was given an index at or past the current length.
	IndexOutOfRange {
		/// The offending index.
		index: usize,
		/// The length of the container at the time of the call.
		len: usize,
	},
}

impl fmt::Display for DynVecError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AllocFailed { layout } => {
				write!(
					f,
					"allocation of {} bytes (align {}) failed",
					layout.size(),
					layout.align()
				)
			}
			Self::CapacityExceeded { requested } => {
				write!(f, "capacity exceeded: {requested} elements cannot be allocated")
			}
			Self::IndexOutOfRange { index, len } => {
				write!(f, "index out of range: index {index}, length {len}")
			}
		}
	}
}

impl Error for DynVecError {}
