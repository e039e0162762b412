use core::{
	alloc::Layout,
	cmp,
	mem,
	ptr::NonNull
};
use std::alloc::{
	alloc,
	dealloc,
	realloc
};

use crate::error::DynVecError;

/// A low-level utility for managing a single owned contiguous buffer.
///
/// `RawBuf` does not in any way inspect the memory that it manages. When
/// dropped it *will* free its memory, but it *won't* try to drop its
/// contents. It is up to the user of `RawBuf` to handle the actual things
/// *stored* inside of it, including dropping the initialized prefix before
/// the buffer goes away.
///
/// Invariants:
/// * `cap == 0` iff no allocation exists (`ptr` is dangling).
/// * Otherwise `ptr` addresses exactly `cap` slots of `T`, allocated with
///   `Layout::array::<T>(cap)` on the global allocator.
///
/// Zero-sized element types never allocate; their reported capacity is
/// `usize::MAX`.
pub struct RawBuf<T> {
	/// Pointer to the buffer, dangling while `cap == 0`.
	ptr: NonNull<T>,

	/// Number of allocated slots.
	cap: usize
}

impl<T> RawBuf<T> {
	/// Creates an empty buffer without allocating.
	#[inline]
	pub const fn new() -> Self {
		RawBuf {
			ptr: NonNull::dangling(),
			cap: 0
		}
	}

	/// Allocates a buffer of exactly `capacity` slots.
	///
	/// Fails with [`DynVecError::CapacityExceeded`] if the layout cannot be
	/// represented, or [`DynVecError::AllocFailed`] if the allocator refuses
	/// the request.
	pub fn try_with_capacity(capacity: usize) -> Result<Self, DynVecError> {
		if mem::size_of::<T>() == 0 || capacity == 0 {
			return Ok(Self::new());
		}

		let layout = array_layout::<T>(capacity)?;

		// SAFETY: the layout has a non-zero size since `capacity > 0` and
		// `T` is not zero-sized.
		let raw = unsafe { alloc(layout) };
		let ptr = match NonNull::new(raw as *mut T) {
			Some(ptr) => ptr,
			None => return Err(DynVecError::AllocFailed { layout })
		};

		Ok(RawBuf { ptr, cap: capacity })
	}

	/// Reassembles a buffer from its raw parts.
	///
	/// ## Safety
	///
	/// If `T` is not zero-sized and `cap > 0`, `ptr` must point to a block of
	/// exactly `cap` slots allocated with `Layout::array::<T>(cap)` on the
	/// global allocator, and ownership of that block transfers to the
	/// returned buffer.
	#[inline]
	pub unsafe fn from_raw_parts(ptr: NonNull<T>, cap: usize) -> Self {
		RawBuf { ptr, cap }
	}

	/// Disassembles the buffer into its raw parts without freeing it.
	///
	/// The caller becomes responsible for the allocation (if any).
	#[inline]
	pub fn into_raw_parts(self) -> (NonNull<T>, usize) {
		let ptr = self.ptr;
		let cap = self.cap;
		mem::forget(self);
		(ptr, cap)
	}

	/// Returns the number of slots the buffer holds.
	#[inline]
	pub fn capacity(&self) -> usize {
		if mem::size_of::<T>() == 0 {
			usize::MAX
		} else {
			self.cap
		}
	}

	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.ptr.as_ptr()
	}

	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Returns if the buffer needs to grow to fulfill the needed extra capacity.
	/// Mainly used to make inlining reserve-calls possible without inlining `grow`.
	#[inline]
	pub fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
		additional > self.capacity().wrapping_sub(len)
	}

	/// Grows the buffer so that at least `len + additional` slots exist,
	/// doubling the capacity each time.
	///
	/// The growth target is `max(len + additional, 2 * cap)`, with an empty
	/// buffer growing to one slot. Doubling keeps the total relocation cost
	/// across a sequence of appends linear in the final length; a fixed
	/// increment would make it quadratic. One-at-a-time appends therefore
	/// observe the capacity sequence `1, 2, 4, 8, …`.
	///
	/// The `len` live elements are relocated bitwise in index order. On
	/// failure the buffer is left untouched.
	pub fn try_grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), DynVecError> {
		// This is ensured by the calling contexts.
		debug_assert!(additional > 0);

		if mem::size_of::<T>() == 0 {
			// Since the capacity is reported as `usize::MAX` when the element
			// size is 0, getting here necessarily means the buffer is overfull.
			return Err(DynVecError::CapacityExceeded { requested: usize::MAX });
		}

		let required = match len.checked_add(additional) {
			Some(required) => required,
			None => return Err(DynVecError::CapacityExceeded { requested: usize::MAX })
		};

		// The doubling cannot overflow because `cap <= isize::MAX` and the
		// type of `cap` is `usize`.
		let doubled = if self.cap == 0 { 1 } else { self.cap * 2 };
		let new_cap = cmp::max(doubled, required);

		self.finish_grow(new_cap)
	}

	/// Grows the buffer to exactly `len + additional` slots.
	///
	/// The constraints on this method are much the same as those on
	/// `try_grow_amortized`, but this method is usually instantiated less
	/// often so it's less critical.
	pub fn try_grow_exact(&mut self, len: usize, additional: usize) -> Result<(), DynVecError> {
		if mem::size_of::<T>() == 0 {
			return Err(DynVecError::CapacityExceeded { requested: usize::MAX });
		}

		let new_cap = match len.checked_add(additional) {
			Some(new_cap) => new_cap,
			None => return Err(DynVecError::CapacityExceeded { requested: usize::MAX })
		};

		self.finish_grow(new_cap)
	}

	/// Obtains a block of `new_cap` slots, moving the existing contents into
	/// it and releasing the old block.
	///
	/// Does not update any length bookkeeping; the initialized prefix simply
	/// carries over. On failure the existing block and capacity are unchanged.
	fn finish_grow(&mut self, new_cap: usize) -> Result<(), DynVecError> {
		debug_assert!(new_cap >= self.cap);

		let new_layout = array_layout::<T>(new_cap)?;

		let raw = if self.cap == 0 {
			// SAFETY: `new_layout` has a non-zero size.
			unsafe { alloc(new_layout) }
		} else {
			// We have an allocated chunk of memory, so we can bypass runtime
			// checks to get our current layout.
			//
			// SAFETY: the block was allocated with this exact layout.
			// `realloc` relocates the initialized prefix bitwise, in index
			// order, and frees the old block only on success.
			unsafe {
				let old_layout = Layout::from_size_align_unchecked(
					mem::size_of::<T>() * self.cap,
					mem::align_of::<T>()
				);
				realloc(self.ptr.as_ptr() as *mut u8, old_layout, new_layout.size())
			}
		};

		match NonNull::new(raw as *mut T) {
			Some(ptr) => {
				self.ptr = ptr;
				self.cap = new_cap;
				Ok(())
			}
			None => Err(DynVecError::AllocFailed { layout: new_layout })
		}
	}
}

impl<T> Drop for RawBuf<T> {
	fn drop(&mut self) {
		if self.cap != 0 && mem::size_of::<T>() != 0 {
			// SAFETY: the block was allocated with this exact layout and is
			// owned exclusively by `self`. Contents are the caller's problem.
			unsafe {
				let layout = Layout::from_size_align_unchecked(
					mem::size_of::<T>() * self.cap,
					mem::align_of::<T>()
				);
				dealloc(self.ptr.as_ptr() as *mut u8, layout);
			}
		}
	}
}

/// Computes the array layout for `capacity` elements, rejecting requests the
/// allocator could never satisfy.
///
/// We need to guarantee the following:
/// * We don't ever allocate `> isize::MAX` byte-size objects.
/// * We don't overflow `usize::MAX` and actually allocate too little.
#[inline]
fn array_layout<T>(capacity: usize) -> Result<Layout, DynVecError> {
	let layout = match Layout::array::<T>(capacity) {
		Ok(layout) => layout,
		Err(_) => return Err(DynVecError::CapacityExceeded { requested: capacity })
	};

	if layout.size() > isize::MAX as usize {
		return Err(DynVecError::CapacityExceeded { requested: capacity });
	}

	Ok(layout)
}
