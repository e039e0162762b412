use core::{
	fmt,
	hash::{
		Hash,
		Hasher
	},
	mem::{
		self,
		ManuallyDrop
	},
	ops::{
		Deref,
		DerefMut
	},
	ptr::{
		self,
		NonNull
	}
};
use std::alloc::handle_alloc_error;

use crate::error::DynVecError;
use crate::raw::RawBuf;

/// Contiguous growable array type with explicit checked and unchecked access.
///
/// A `DynVec<T>` stores its elements in one contiguous heap block and grows
/// that block geometrically (doubling) as elements are pushed, which makes
/// [`push`](DynVec::push) amortized O(1). Indexed access comes in two
/// separately named forms: the checked [`at`](DynVec::at) which reports
/// [`DynVecError::IndexOutOfRange`], and the unchecked, `unsafe`
/// [`get_unchecked`](DynVec::get_unchecked) which performs no bounds
/// validation at all.
///
/// Any operation that grows the vector moves its storage and invalidates
/// every previously obtained reference or pointer into it. The borrow
/// checker enforces this for references; callers holding raw pointers from
/// [`as_ptr`](DynVec::as_ptr) are on their own.
///
/// # Examples
///
/// ```
/// use dyn_vec::DynVec;
///
/// let mut v = DynVec::new();
/// v.push(10);
/// v.push(20);
/// v.push(30);
///
/// assert_eq!(v.len(), 3);
/// assert_eq!(v.capacity(), 4); // doubling: 0 -> 1 -> 2 -> 4
/// assert_eq!(v, [10, 20, 30]);
/// assert_eq!(v.pop(), Some(30));
/// ```
pub struct DynVec<T> {
	/// Owned storage block; `buf.capacity()` slots, the first `len` of which
	/// are initialized.
	buf: RawBuf<T>,

	/// Number of live elements.
	len: usize
}

impl<T> DynVec<T> {
	/// Creates a new empty `DynVec`.
	///
	/// The vector will not allocate until elements are pushed onto it.
	#[inline]
	pub const fn new() -> Self {
		DynVec {
			buf: RawBuf::new(),
			len: 0
		}
	}

	/// Creates a new empty `DynVec` with at least the given capacity.
	///
	/// # Panics
	///
	/// Panics if the capacity cannot be represented or the allocation fails.
	/// Use [`try_with_capacity`](DynVec::try_with_capacity) to recover from
	/// these conditions instead.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		handle_reserve(Self::try_with_capacity(capacity))
	}

	/// The same as `with_capacity`, but returns on errors instead of panicking.
	pub fn try_with_capacity(capacity: usize) -> Result<Self, DynVecError> {
		Ok(DynVec {
			buf: RawBuf::try_with_capacity(capacity)?,
			len: 0
		})
	}

	/// Returns the number of live elements in the vector.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the vector holds no elements.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of elements the vector can hold without
	/// reallocating.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buf.capacity()
	}

	/// Appends an element to the back of the vector.
	///
	/// # Panics
	///
	/// Panics if the new capacity cannot be represented or the allocation
	/// fails. Use [`try_push`](DynVec::try_push) to recover instead.
	#[inline]
	pub fn push(&mut self, value: T) {
		handle_reserve(self.try_push(value))
	}

	/// The same as `push`, but returns on errors instead of panicking.
	///
	/// On error the vector is unchanged and `value` is dropped.
	pub fn try_push(&mut self, value: T) -> Result<(), DynVecError> {
		if self.len == self.buf.capacity() {
			self.buf.try_grow_amortized(self.len, 1)?;
		}

		// SAFETY: there is spare capacity for at least one element.
		unsafe {
			ptr::write(self.buf.as_mut_ptr().add(self.len), value);
			self.len += 1;
		}

		Ok(())
	}

	/// Removes the last element from the vector and returns it, or [`None`]
	/// if it is empty.
	///
	/// Returning `None` rather than signalling an error mirrors the
	/// permissive remove-from-end of raw array designs; callers that consider
	/// popping an empty vector a bug should check [`is_empty`](DynVec::is_empty)
	/// first. Capacity is never reduced by this operation.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.len == 0 {
			None
		} else {
			self.len -= 1;
			// SAFETY: the slot at the new length holds an initialized element
			// that the vector no longer tracks.
			unsafe { Some(ptr::read(self.buf.as_ptr().add(self.len))) }
		}
	}

	/// Returns a reference to the element at `index`, with bounds checking.
	///
	/// This is the recommended accessor for untrusted indices. The unchecked
	/// fast path is [`get_unchecked`](DynVec::get_unchecked).
	///
	/// # Examples
	///
	/// ```
	/// # use dyn_vec::{DynVec, DynVecError};
	/// let v: DynVec<i32> = [1, 2, 3].as_slice().into();
	/// assert_eq!(v.at(1), Ok(&2));
	/// assert_eq!(v.at(3), Err(DynVecError::IndexOutOfRange { index: 3, len: 3 }));
	/// ```
	#[inline]
	pub fn at(&self, index: usize) -> Result<&T, DynVecError> {
		if index < self.len {
			// SAFETY: just bounds-checked against the length.
			Ok(unsafe { &*self.buf.as_ptr().add(index) })
		} else {
			Err(DynVecError::IndexOutOfRange {
				index,
				len: self.len
			})
		}
	}

	/// Returns a mutable reference to the element at `index`, with bounds
	/// checking.
	#[inline]
	pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DynVecError> {
		if index < self.len {
			// SAFETY: just bounds-checked against the length.
			Ok(unsafe { &mut *self.buf.as_mut_ptr().add(index) })
		} else {
			Err(DynVecError::IndexOutOfRange {
				index,
				len: self.len
			})
		}
	}

	/// Returns a reference to the element at `index`, without any bounds
	/// validation.
	///
	/// This mirrors raw-array semantics: it is the fast path, and misusing it
	/// is not a recoverable error but undefined behaviour. Prefer
	/// [`at`](DynVec::at) wherever the index is not already known to be valid.
	///
	/// ## Safety
	///
	/// `index` must be strictly less than [`len`](DynVec::len).
	#[inline]
	pub unsafe fn get_unchecked(&self, index: usize) -> &T {
		debug_assert!(index < self.len);
		&*self.buf.as_ptr().add(index)
	}

	/// Returns a mutable reference to the element at `index`, without any
	/// bounds validation.
	///
	/// ## Safety
	///
	/// `index` must be strictly less than [`len`](DynVec::len).
	#[inline]
	pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
		debug_assert!(index < self.len);
		&mut *self.buf.as_mut_ptr().add(index)
	}

	/// Reserves capacity for at least `additional` more elements. The vector
	/// may reserve more space to avoid frequent reallocations. Does nothing
	/// if capacity is already sufficient.
	///
	/// # Panics
	///
	/// Panics if the new capacity cannot be represented or the allocation
	/// fails.
	pub fn reserve(&mut self, additional: usize) {
		handle_reserve(self.try_reserve(additional))
	}

	/// The same as `reserve`, but returns on errors instead of panicking.
	pub fn try_reserve(&mut self, additional: usize) -> Result<(), DynVecError> {
		if self.buf.needs_to_grow(self.len, additional) {
			self.buf.try_grow_amortized(self.len, additional)?;
		}
		Ok(())
	}

	/// Reserves the minimum capacity for exactly `additional` more elements.
	/// Prefer [`reserve`](DynVec::reserve) if future insertions are expected.
	///
	/// # Panics
	///
	/// Panics if the new capacity cannot be represented or the allocation
	/// fails.
	pub fn reserve_exact(&mut self, additional: usize) {
		handle_reserve(self.try_reserve_exact(additional))
	}

	/// The same as `reserve_exact`, but returns on errors instead of panicking.
	pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), DynVecError> {
		if self.buf.needs_to_grow(self.len, additional) {
			self.buf.try_grow_exact(self.len, additional)?;
		}
		Ok(())
	}

	/// Shortens the vector, keeping the first `len` elements and dropping
	/// the rest.
	///
	/// If `len` is greater than the vector's current length, this has no
	/// effect. Note that this method has no effect on the allocated capacity
	/// of the vector.
	pub fn truncate(&mut self, len: usize) {
		if len > self.len {
			return;
		}

		let remaining_len = self.len - len;
		// SAFETY: the slots `[len, self.len)` are initialized; shrink the
		// length first so a panicking destructor cannot expose them again.
		unsafe {
			let tail = ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr().add(len), remaining_len);
			self.len = len;
			ptr::drop_in_place(tail);
		}
	}

	/// Clears the vector, removing all values.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the vector.
	#[inline]
	pub fn clear(&mut self) {
		self.truncate(0)
	}

	/// Moves the contents out, leaving `self` empty.
	///
	/// The returned vector takes over the storage block, length and capacity
	/// in O(1). `self` is left with no storage (`len == 0`, `capacity == 0`)
	/// and remains fully usable: it can be dropped, inspected and appended to
	/// again.
	///
	/// # Examples
	///
	/// ```
	/// # use dyn_vec::DynVec;
	/// let mut a: DynVec<i32> = [1, 2, 3].as_slice().into();
	/// let b = a.take();
	/// assert_eq!(b, [1, 2, 3]);
	/// assert_eq!(a.len(), 0);
	/// a.push(4);
	/// assert_eq!(a, [4]);
	/// ```
	#[inline]
	pub fn take(&mut self) -> Self {
		mem::take(self)
	}

	/// Extracts a slice containing the entire vector.
	///
	/// Equivalent to `&s[..]`.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		// SAFETY: the first `len` slots are initialized; the pointer is
		// aligned and non-null even when no allocation exists.
		unsafe { std::slice::from_raw_parts(self.buf.as_ptr(), self.len) }
	}

	/// Extracts a mutable slice of the entire vector.
	///
	/// Equivalent to `&mut s[..]`.
	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		// SAFETY: as for `as_slice`, with exclusive access.
		unsafe { std::slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
	}

	/// Returns a raw pointer to the vector's buffer.
	///
	/// The caller must ensure that the vector outlives the pointer this
	/// function returns, or else it will end up pointing to garbage.
	/// Modifying the vector may cause its buffer to be reallocated,
	/// which would also make any pointers to it invalid.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buf.as_ptr()
	}

	/// Returns an unsafe mutable pointer to the vector's buffer.
	///
	/// The caller must ensure that the vector outlives the pointer this
	/// function returns, or else it will end up pointing to garbage.
	/// Modifying the vector may cause its buffer to be reallocated,
	/// which would also make any pointers to it invalid.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buf.as_mut_ptr()
	}

	/// Forces the length of the vector to `new_len`.
	///
	/// ## Safety
	///
	/// `new_len` must be less than or equal to [`capacity`](DynVec::capacity),
	/// and the slots `[0, new_len)` must be initialized.
	#[inline]
	pub unsafe fn set_len(&mut self, new_len: usize) {
		debug_assert!(new_len <= self.capacity());
		self.len = new_len;
	}

	/// Returns an iterator over the vector.
	#[inline]
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.as_slice().iter()
	}

	/// Returns an iterator that allows modifying each value.
	#[inline]
	pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
		self.as_mut_slice().iter_mut()
	}
}

impl<T: Clone> DynVec<T> {
	/// Clones and appends all elements in a slice to the vector.
	///
	/// Capacity is reserved up front, so a sequence of clones never
	/// interleaves with growth.
	pub fn extend_from_slice(&mut self, other: &[T]) {
		self.reserve(other.len());

		for item in other {
			// Cannot grow here: the capacity was reserved above. The length
			// is bumped per element so a panicking `clone` leaves the vector
			// in a consistent state.
			unsafe {
				ptr::write(self.buf.as_mut_ptr().add(self.len), item.clone());
				self.len += 1;
			}
		}
	}
}

// SAFETY: `DynVec<T>` exclusively owns its storage, so transferring or
// sharing it across threads is exactly as safe as doing so with `T` itself.
unsafe impl<T: Send> Send for DynVec<T> {}
unsafe impl<T: Sync> Sync for DynVec<T> {}

impl<T> Drop for DynVec<T> {
	fn drop(&mut self) {
		// SAFETY: the first `len` slots are initialized and dropped exactly
		// once here; `RawBuf` then frees the block (a no-op when empty, so
		// dropping a taken-from vector is fine).
		unsafe {
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), self.len));
		}
	}
}

impl<T> Default for DynVec<T> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Clone> Clone for DynVec<T> {
	/// Produces a deep, fully independent copy.
	///
	/// The clone allocates its own block of exactly `self.capacity()` slots
	/// and clones every live element in index order; mutating either vector
	/// afterwards never affects the other.
	fn clone(&self) -> Self {
		let mut vec = Self::with_capacity(self.capacity());
		vec.extend_from_slice(self);
		vec
	}
}

impl<T> Deref for DynVec<T> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T> DerefMut for DynVec<T> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T> AsRef<[T]> for DynVec<T> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self
	}
}

impl<T> AsMut<[T]> for DynVec<T> {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<T: fmt::Debug> fmt::Debug for DynVec<T> {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl<T: Hash> Hash for DynVec<T> {
	#[inline]
	fn hash<H: Hasher>(&self, state: &mut H) {
		Hash::hash(&**self, state)
	}
}

impl<T> Extend<T> for DynVec<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iterator: I) {
		let mut iterator = iterator.into_iter();
		while let Some(element) = iterator.next() {
			if self.len == self.capacity() {
				let (lower, _) = iterator.size_hint();
				self.reserve(lower.saturating_add(1));
			}
			// SAFETY: spare capacity for at least one element was just
			// ensured.
			unsafe {
				ptr::write(self.buf.as_mut_ptr().add(self.len), element);
				self.len += 1;
			}
		}
	}
}

impl<T> FromIterator<T> for DynVec<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iterator: I) -> Self {
		let mut vec = DynVec::new();
		vec.extend(iterator);
		vec
	}
}

impl<T: Clone> From<&[T]> for DynVec<T> {
	fn from(slice: &[T]) -> Self {
		let mut vec = DynVec::with_capacity(slice.len());
		vec.extend_from_slice(slice);
		vec
	}
}

impl<T> From<Vec<T>> for DynVec<T> {
	/// Takes over a `Vec`'s buffer without copying.
	fn from(vec: Vec<T>) -> Self {
		let mut vec = ManuallyDrop::new(vec);
		let len = vec.len();
		let cap = vec.capacity();
		let ptr = vec.as_mut_ptr();

		// SAFETY: `ManuallyDrop` releases the `Vec`'s ownership; pointer,
		// length and capacity describe its buffer exactly, and `Vec` uses the
		// same global-allocator array layout as `RawBuf`.
		unsafe {
			DynVec {
				buf: RawBuf::from_raw_parts(NonNull::new_unchecked(ptr), cap),
				len
			}
		}
	}
}

impl<T> From<DynVec<T>> for Vec<T> {
	/// Hands the buffer over to a `Vec` without copying.
	fn from(vec: DynVec<T>) -> Vec<T> {
		let vec = ManuallyDrop::new(vec);
		let len = vec.len;
		// SAFETY: `vec` is never used (or dropped) again.
		let buf = unsafe { ptr::read(&vec.buf) };
		let (ptr, cap) = buf.into_raw_parts();
		// Zero-sized types carry no allocation; any capacity >= len is valid.
		let cap = if mem::size_of::<T>() == 0 { len } else { cap };

		// SAFETY: pointer, length and capacity come straight from a live
		// `DynVec`, whose buffer uses the layout `Vec` expects.
		unsafe { Vec::from_raw_parts(ptr.as_ptr(), len, cap) }
	}
}

/// A by-value iterator over the contents of a `DynVec`.
///
/// Unconsumed elements are dropped with the iterator, and the storage block
/// is freed exactly once.
pub struct IntoIter<T> {
	buf: RawBuf<T>,
	start: usize,
	len: usize
}

impl<T> Iterator for IntoIter<T> {
	type Item = T;

	fn next(&mut self) -> Option<T> {
		if self.start == self.len {
			None
		} else {
			let index = self.start;
			self.start += 1;
			// SAFETY: `index < len`, and each slot is read at most once.
			unsafe { Some(ptr::read(self.buf.as_ptr().add(index))) }
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.len - self.start;
		(remaining, Some(remaining))
	}
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
	fn drop(&mut self) {
		// SAFETY: the slots `[start, len)` were never read; drop them here,
		// then `RawBuf` frees the block.
		unsafe {
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
				self.buf.as_mut_ptr().add(self.start),
				self.len - self.start
			));
		}
	}
}

// SAFETY: the iterator exclusively owns the remaining elements.
unsafe impl<T: Send> Send for IntoIter<T> {}
unsafe impl<T: Sync> Sync for IntoIter<T> {}

impl<T> IntoIterator for DynVec<T> {
	type Item = T;
	type IntoIter = IntoIter<T>;

	fn into_iter(self) -> IntoIter<T> {
		let vec = ManuallyDrop::new(self);
		let len = vec.len;
		// SAFETY: `vec` is never dropped; the iterator takes over both the
		// buffer and the initialized prefix.
		let buf = unsafe { ptr::read(&vec.buf) };

		IntoIter {
			buf,
			start: 0,
			len
		}
	}
}

impl<'v, T> IntoIterator for &'v DynVec<T> {
	type Item = &'v T;
	type IntoIter = std::slice::Iter<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<'v, T> IntoIterator for &'v mut DynVec<T> {
	type Item = &'v mut T;
	type IntoIter = std::slice::IterMut<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter_mut()
	}
}

macro_rules! impl_slice_eq1 {
	([$($vars:tt)*] $lhs:ty, $rhs:ty) => {
		impl<$($vars)*> PartialEq<$rhs> for $lhs where T: PartialEq<U> {
			#[inline]
			fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
		}
	}
}

impl_slice_eq1! { [T, U] DynVec<T>, DynVec<U> }
impl_slice_eq1! { [T, U] DynVec<T>, Vec<U> }
impl_slice_eq1! { [T, U] DynVec<T>, &[U] }
impl_slice_eq1! { [T, U] DynVec<T>, &mut [U] }
impl_slice_eq1! { [T, U] DynVec<T>, [U] }
impl_slice_eq1! { [T, U, const N: usize] DynVec<T>, [U; N] }
impl_slice_eq1! { [T, U, const N: usize] DynVec<T>, &[U; N] }

impl<T: Eq> Eq for DynVec<T> {}

// Central function for reserve error handling: growth-path callers that opt
// out of `Result` funnel through here.
#[inline]
fn handle_reserve<T>(result: Result<T, DynVecError>) -> T {
	match result {
		Err(DynVecError::CapacityExceeded { .. }) => capacity_overflow(),
		Err(DynVecError::AllocFailed { layout }) => handle_alloc_error(layout),
		Err(DynVecError::IndexOutOfRange { .. }) => {
			unreachable!("growth paths never report index errors")
		}
		Ok(t) => t
	}
}

// One central function responsible for reporting capacity overflows. This'll
// ensure that the code generation related to these panics is minimal as there's
// only one location which panics rather than a bunch throughout the module.
fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::rc::Rc;

	#[test]
	fn append_tracks_size_and_capacity() {
		let mut v = DynVec::new();
		for i in 0..100 {
			v.push(i);
		}
		assert_eq!(v.len(), 100);
		assert!(v.capacity() >= 100);
		assert!(!v.is_empty());
	}

	#[test]
	fn capacity_doubles_from_zero() {
		let mut v = DynVec::new();
		assert_eq!(v.capacity(), 0);

		let mut observed = Vec::new();
		for i in 0..64 {
			v.push(i);
			if observed.last() != Some(&v.capacity()) {
				observed.push(v.capacity());
			}
		}
		assert_eq!(observed, [1, 2, 4, 8, 16, 32, 64]);
	}

	#[test]
	fn relocation_cost_is_linear() {
		// Each growth relocates the elements present at that moment, which
		// equals the previous capacity. Under doubling those costs form a
		// geometric series bounded by twice the final length.
		let mut v = DynVec::new();
		let mut relocated = 0usize;
		for i in 0..1024 {
			if v.len() == v.capacity() {
				relocated += v.len();
			}
			v.push(i);
		}
		assert!(relocated < 2 * 1024, "relocated {relocated} elements");
	}

	#[test]
	fn growth_scenario_ten_twenty_thirty() {
		let mut v = DynVec::new();
		v.push(10);
		v.push(20);
		v.push(30);
		assert_eq!(v.len(), 3);
		assert_eq!(v.capacity(), 4);
		assert_eq!(v, [10, 20, 30]);
	}

	#[test]
	fn index_round_trip() {
		let mut v: DynVec<i32> = (0..10).collect();
		for i in 0..10 {
			*v.at_mut(i).unwrap() = (i as i32) * 7;
		}
		for i in 0..10 {
			assert_eq!(*v.at(i).unwrap(), (i as i32) * 7);
			// SAFETY: `i < v.len()`.
			assert_eq!(unsafe { *v.get_unchecked(i) }, (i as i32) * 7);
		}
	}

	#[test]
	fn checked_access_reports_out_of_range() {
		let mut v: DynVec<i32> = (0..3).collect();
		assert_eq!(
			v.at(3).unwrap_err(),
			DynVecError::IndexOutOfRange { index: 3, len: 3 }
		);
		assert!(matches!(v.at(usize::MAX), Err(DynVecError::IndexOutOfRange { .. })));
		assert!(matches!(v.at_mut(3), Err(DynVecError::IndexOutOfRange { .. })));

		let empty: DynVec<i32> = DynVec::new();
		assert_eq!(
			empty.at(0).unwrap_err(),
			DynVecError::IndexOutOfRange { index: 0, len: 0 }
		);
	}

	#[test]
	fn pop_on_empty_is_a_no_op() {
		let mut v: DynVec<i32> = DynVec::new();
		assert_eq!(v.pop(), None);
		assert_eq!(v.len(), 0);

		v.push(1);
		assert_eq!(v.pop(), Some(1));
		assert_eq!(v.pop(), None);
		// Popping never returns capacity.
		assert_eq!(v.capacity(), 1);
	}

	#[test]
	fn clone_is_independent() {
		let a: DynVec<i32> = [1, 2, 3].as_slice().into();
		let mut b = a.clone();
		b.push(4);
		assert_eq!(a.len(), 3);
		assert_eq!(a, [1, 2, 3]);
		assert_eq!(b, [1, 2, 3, 4]);
	}

	#[test]
	fn clone_duplicates_capacity() {
		let mut a: DynVec<i32> = DynVec::with_capacity(8);
		a.push(1);
		let b = a.clone();
		assert_eq!(b.capacity(), 8);
		assert_eq!(b.len(), 1);
	}

	#[test]
	fn take_leaves_source_empty_and_reusable() {
		let mut a: DynVec<i32> = [1, 2, 3].as_slice().into();
		let b = a.take();
		assert_eq!(b, [1, 2, 3]);
		assert_eq!(a.len(), 0);
		assert_eq!(a.capacity(), 0);

		a.push(9);
		assert_eq!(a, [9]);
	}

	#[test]
	fn reserve_is_amortized_and_exact_is_tight() {
		let mut v: DynVec<i32> = DynVec::new();
		v.reserve_exact(3);
		assert_eq!(v.capacity(), 3);

		v.push(1);
		v.push(2);
		v.push(3);
		v.reserve(1);
		// Doubled rather than grown by one.
		assert_eq!(v.capacity(), 6);
	}

	struct Counted(Rc<Cell<usize>>);

	impl Drop for Counted {
		fn drop(&mut self) {
			self.0.set(self.0.get() + 1);
		}
	}

	#[test]
	fn drops_every_live_element_once() {
		let drops = Rc::new(Cell::new(0));
		{
			let mut v = DynVec::new();
			for _ in 0..10 {
				v.push(Counted(drops.clone()));
			}
			v.pop();
			assert_eq!(drops.get(), 1);
		}
		assert_eq!(drops.get(), 10);
	}

	#[test]
	fn truncate_drops_the_tail_only() {
		let drops = Rc::new(Cell::new(0));
		let mut v = DynVec::new();
		for _ in 0..6 {
			v.push(Counted(drops.clone()));
		}
		let capacity = v.capacity();

		v.truncate(2);
		assert_eq!(drops.get(), 4);
		assert_eq!(v.len(), 2);
		assert_eq!(v.capacity(), capacity);

		v.truncate(5); // longer than the vector: no effect
		assert_eq!(v.len(), 2);

		v.clear();
		assert_eq!(drops.get(), 6);
		assert_eq!(v.capacity(), capacity);
	}

	#[test]
	fn into_iter_yields_in_order() {
		let v: DynVec<i32> = (0..5).collect();
		let collected: Vec<i32> = v.into_iter().collect();
		assert_eq!(collected, [0, 1, 2, 3, 4]);
	}

	#[test]
	fn into_iter_drops_unconsumed_elements() {
		let drops = Rc::new(Cell::new(0));
		let mut v = DynVec::new();
		for _ in 0..5 {
			v.push(Counted(drops.clone()));
		}

		let mut iter = v.into_iter();
		drop(iter.next());
		assert_eq!(drops.get(), 1);
		assert_eq!(iter.size_hint(), (4, Some(4)));

		drop(iter);
		assert_eq!(drops.get(), 5);
	}

	#[test]
	fn vec_conversions_preserve_contents() {
		let v: DynVec<i32> = Vec::from([1, 2, 3]).into();
		assert_eq!(v, [1, 2, 3]);

		let back: Vec<i32> = v.into();
		assert_eq!(back, [1, 2, 3]);
	}

	#[test]
	fn extend_and_collect() {
		let mut v: DynVec<i32> = (0..3).collect();
		v.extend(3..6);
		assert_eq!(v, [0, 1, 2, 3, 4, 5]);

		v.extend_from_slice(&[6, 7]);
		assert_eq!(v.len(), 8);
		assert_eq!(*v.at(7).unwrap(), 7);
	}

	#[test]
	fn zero_sized_elements() {
		let mut v = DynVec::new();
		for _ in 0..1000 {
			v.push(());
		}
		assert_eq!(v.len(), 1000);
		assert_eq!(v.capacity(), usize::MAX);
		assert_eq!(v.pop(), Some(()));
		assert_eq!(v.len(), 999);
	}

	#[test]
	fn try_with_capacity_rejects_absurd_requests() {
		let result = DynVec::<u64>::try_with_capacity(usize::MAX / 2);
		assert!(matches!(result, Err(DynVecError::CapacityExceeded { .. })));
	}

	#[test]
	fn slice_view_and_iteration() {
		let mut v: DynVec<i32> = [1, 2, 3].as_slice().into();
		assert_eq!(v.as_slice(), &[1, 2, 3]);
		assert_eq!(v.iter().sum::<i32>(), 6);

		for item in &mut v {
			*item *= 2;
		}
		assert_eq!(v, [2, 4, 6]);
		assert_eq!(v[1], 4);
	}

	#[cfg(not(miri))]
	mod proptests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn behaves_like_vec(
				ops in proptest::collection::vec(proptest::option::of(any::<i32>()), 0..256),
			) {
				let mut vec = DynVec::new();
				let mut model = Vec::new();
				for op in ops {
					match op {
						Some(value) => {
							vec.push(value);
							model.push(value);
						}
						None => prop_assert_eq!(vec.pop(), model.pop()),
					}
					prop_assert_eq!(vec.len(), model.len());
					prop_assert!(vec.capacity() >= vec.len());
				}
				prop_assert_eq!(vec.as_slice(), model.as_slice());
			}

			#[test]
			fn capacity_only_doubles(pushes in 1usize..512) {
				let mut vec = DynVec::new();
				let mut last = 0usize;
				for i in 0..pushes {
					vec.push(i);
					let cap = vec.capacity();
					let doubled = if last == 0 { 1 } else { last * 2 };
					prop_assert!(cap == last || cap == doubled);
					last = cap;
				}
				prop_assert!(last >= pushes);
			}

			#[test]
			fn checked_access_matches_slice(
				values in proptest::collection::vec(any::<i32>(), 0..64),
				index in 0usize..128,
			) {
				let vec: DynVec<i32> = values.as_slice().into();
				match vec.at(index) {
					Ok(v) => prop_assert_eq!(Some(v), values.get(index)),
					Err(DynVecError::IndexOutOfRange { index: i, len }) => {
						prop_assert_eq!(i, index);
						prop_assert_eq!(len, values.len());
						prop_assert!(index >= values.len());
					}
					Err(other) => prop_assert!(false, "unexpected error: {other}"),
				}
			}

			#[test]
			fn clone_and_mutate_never_aliases(
				values in proptest::collection::vec(any::<i32>(), 1..64),
			) {
				let a: DynVec<i32> = values.as_slice().into();
				let mut b = a.clone();
				b.push(0);
				for slot in b.iter_mut() {
					*slot = slot.wrapping_add(1);
				}
				prop_assert_eq!(a.as_slice(), values.as_slice());
			}
		}
	}
}
