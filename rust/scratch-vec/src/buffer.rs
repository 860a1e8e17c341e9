use std::ops::{Range, RangeBounds};

use bytemuck::Zeroable;

use crate::index_width::IndexWidth;

/// Active storage region of a [`ScratchVec`].
///
/// The vector starts on a borrowed region and switches to an owned block on
/// the first growth; the switch is one way.
enum Storage<'a, T> {
    /// Caller-provided region, written in place and never deallocated here.
    Borrowed(&'a mut [T]),
    /// Heap block owned by the vector, kept filled to the full capacity so
    /// that every slot of the window stays initialized.
    Owned(Vec<T>),
}

/// A growable vector that starts out on a caller-provided region and spills
/// to the heap only once it outgrows that region.
///
/// Construction binds a borrowed `&mut [T]` region: the capacity equals the
/// region length, the length starts at zero, and no allocation takes place
/// until an append does not fit. At that point the live prefix is copied
/// into an owned heap block and the vector never returns to the borrowed
/// region (the region itself is left as written and is never deallocated by
/// this type). The owned block is released exactly once, when the vector is
/// dropped.
///
/// Appends grow the capacity to `2 * capacity + 16` for a single push and to
/// `max(required, 2 * capacity)` for a bulk append, so growth is never less
/// than doubling and a zero-capacity start does not cause a cascade of tiny
/// allocations. Growth offers no error return; allocation failure aborts.
///
/// Element types must be plain old data (`bytemuck::Pod`): `Copy`, with no
/// drop glue and every bit pattern valid. The `I` parameter selects the
/// width of the internal length word and bounds the capacity; see
/// [`IndexWidth`] and [`ScratchVec32`].
///
/// # Capacity window
///
/// Every slot up to `capacity()` is initialized storage, not just the live
/// prefix: the borrowed region is caller-initialized, and owned blocks are
/// zero-filled past the copied prefix when they are created. Slots between
/// `len()` and `capacity()` hold unspecified stale contents (whatever
/// earlier writes left there). The ordinary accessors
/// ([`as_slice`](Self::as_slice), indexing, iteration) cover only the live
/// prefix; [`capacity_slice`](Self::capacity_slice),
/// [`capacity_slice_mut`](Self::capacity_slice_mut) and
/// [`value_at`](Self::value_at) deliberately reach the whole window, and
/// [`set_len`](Self::set_len) can re-expose stale slots as live data.
pub struct ScratchVec<'a, T: bytemuck::Pod, I: IndexWidth = usize> {
    storage: Storage<'a, T>,
    len: I,
}

/// A [`ScratchVec`] whose length and capacity word is 32 bits wide.
pub type ScratchVec32<'a, T> = ScratchVec<'a, T, u32>;

impl<'a, T: bytemuck::Pod, I: IndexWidth> ScratchVec<'a, T, I> {
    /// Binds a new, empty vector to a caller-provided region.
    ///
    /// The capacity equals the region length and no allocation is performed.
    /// Elements are written into the region itself until the first growth;
    /// the region is never deallocated by this type.
    ///
    /// # Panics
    ///
    /// Panics if the region length exceeds [`IndexWidth::MAX_CAPACITY`]
    /// for `I`.
    pub fn new(region: &'a mut [T]) -> ScratchVec<'a, T, I> {
        assert!(region.len() <= I::MAX_CAPACITY);
        ScratchVec {
            storage: Storage::Borrowed(region),
            len: I::from_usize(0),
        }
    }

    /// Returns the number of live elements in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.to_usize()
    }

    /// Returns `true` if the vector contains no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the active region can hold without
    /// growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots().len()
    }

    /// Returns `true` once the vector has moved off the borrowed region onto
    /// an owned heap block.
    #[inline]
    pub fn spilled(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Returns a slice of the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.slots()[..self.len()]
    }

    /// Returns a mutable slice of the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        &mut self.slots_mut()[..len]
    }

    /// Returns a reference to the element at the given index, or `None` if
    /// it is beyond the live prefix.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns a mutable reference to the element at the given index, or
    /// `None` if it is beyond the live prefix.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Appends an element to the back of the vector.
    ///
    /// Grows the capacity to `2 * capacity + 16` first when the vector is
    /// full.
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len();
        if len == self.capacity() {
            self.grow_for_push();
        }
        self.slots_mut()[len] = value;
        self.len = I::from_usize(len + 1);
    }

    /// Appends all elements from a slice, in order.
    ///
    /// When the required length exceeds the capacity, the vector grows to
    /// `max(required, 2 * capacity)` in a single step.
    #[inline]
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.reserve(values.len());
        let len = self.len();
        let new_len = len + values.len();
        self.slots_mut()[len..new_len].copy_from_slice(values);
        self.len = I::from_usize(new_len);
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// Uses the bulk growth policy: the new capacity is never less than
    /// double the current one.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        if self.capacity() - self.len() >= additional {
            return;
        }
        let required = self.len().checked_add(additional).expect("add");
        self.grow_amortized(required);
    }

    /// Resizes the vector to the specified length, filling any new space
    /// with the given value.
    ///
    /// If `new_len` is less than the current length, the vector is simply
    /// truncated.
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len();
        if new_len > len {
            self.reserve(new_len - len);
            self.slots_mut()[len..new_len].fill(value);
            self.len = I::from_usize(new_len);
        } else {
            self.truncate(new_len);
        }
    }

    /// Removes the last element and returns it, or `None` if the vector is
    /// empty.
    ///
    /// The slot keeps its contents; the capacity window still shows the
    /// popped value until something overwrites it.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            let new_len = self.len() - 1;
            let value = self.slots()[new_len];
            self.len = I::from_usize(new_len);
            Some(value)
        }
    }

    /// Shortens the vector, keeping the first `len` elements.
    ///
    /// If `len` is greater than the current length, this has no effect.
    /// Neither the capacity nor the slot contents are touched.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.len = I::from_usize(len);
        }
    }

    /// Clears the vector, removing all live elements.
    ///
    /// This has no effect on the capacity or the ownership state.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Sets the length directly, without touching element contents.
    ///
    /// Any `new_len` up to the capacity is accepted: shrinking is an O(1)
    /// truncation that releases nothing, and growing re-exposes slots that
    /// were live earlier. This method does not allocate and does not
    /// initialize anything; newly exposed slots hold unspecified stale
    /// contents. Callers use this to undo a truncation when they know what
    /// the slots hold (see [`capacity_slice`](Self::capacity_slice)).
    ///
    /// # Panics
    ///
    /// Panics if `new_len` exceeds the capacity.
    pub fn set_len(&mut self, new_len: usize) {
        assert!(new_len <= self.capacity());
        self.len = I::from_usize(new_len);
    }

    /// Consumes the vector and returns the live elements as a `Vec<T>`.
    ///
    /// A borrowed region is copied; an owned block is reused without a new
    /// allocation.
    pub fn into_vec(self) -> Vec<T> {
        let len = self.len();
        match self.storage {
            Storage::Borrowed(region) => region[..len].to_vec(),
            Storage::Owned(mut vec) => {
                vec.truncate(len);
                vec
            }
        }
    }

    #[inline]
    fn slots(&self) -> &[T] {
        match &self.storage {
            Storage::Borrowed(region) => region,
            Storage::Owned(vec) => vec.as_slice(),
        }
    }

    #[inline]
    fn slots_mut(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Borrowed(region) => region,
            Storage::Owned(vec) => vec.as_mut_slice(),
        }
    }

    /// Grows for a single-element append: twice the current capacity plus
    /// 16, which absorbs very small or empty initial regions without a
    /// cascade of tiny reallocations.
    #[cold]
    fn grow_for_push(&mut self) {
        let new_cap = self
            .capacity()
            .checked_mul(2)
            .and_then(|cap| cap.checked_add(16))
            .expect("add")
            .min(I::MAX_CAPACITY);
        assert!(new_cap > self.len(), "capacity overflow");
        self.grow_to(new_cap);
    }

    /// Grows to hold at least `required` elements in one step, never by
    /// less than doubling the current capacity.
    #[cold]
    fn grow_amortized(&mut self, required: usize) {
        assert!(required <= I::MAX_CAPACITY, "capacity overflow");
        let new_cap = std::cmp::max(
            self.capacity().saturating_mul(2).min(I::MAX_CAPACITY),
            required,
        );
        self.grow_to(new_cap);
    }

    /// Moves the active region to an owned heap block of `new_cap` slots.
    ///
    /// An owned block is resized in place when the allocator allows it. A
    /// borrowed region has its live prefix copied into a fresh allocation
    /// and is never deallocated; from that point on the vector owns its
    /// storage. Slots beyond the live prefix are zero-filled. The length is
    /// unchanged.
    fn grow_to(&mut self, new_cap: usize) {
        debug_assert!(new_cap >= self.capacity());
        let len = self.len();
        match &mut self.storage {
            Storage::Owned(vec) => vec.resize(new_cap, T::zeroed()),
            Storage::Borrowed(region) => {
                let mut vec = vec![T::zeroed(); new_cap];
                vec[..len].copy_from_slice(&region[..len]);
                self.storage = Storage::Owned(vec);
            }
        }
    }
}

impl<'a, T: bytemuck::Pod, I: IndexWidth> ScratchVec<'a, T, I> {
    /// Returns the element at `index` by value, addressing the full capacity
    /// window rather than just the live prefix.
    ///
    /// Slots at `len()..capacity()` are reachable here; their contents are
    /// unspecified stale data (see [`capacity_slice`](Self::capacity_slice)).
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the capacity.
    #[inline]
    pub fn value_at(&self, index: usize) -> T {
        assert!(index < self.capacity());
        self.slots()[index]
    }

    /// Returns a view of the given range of the capacity window.
    ///
    /// Unlike [`as_slice`](Self::as_slice), the bounds are checked against
    /// the capacity rather than the length, so the view may cover slots
    /// beyond the live prefix. Those slots hold unspecified stale contents:
    /// whatever earlier appends and truncations left behind, or zero fill
    /// from a fresh growth. This exists to support the truncate-then-extend
    /// reuse pattern around [`set_len`](Self::set_len); prefer
    /// [`as_slice`](Self::as_slice) unless inspecting slack space is the
    /// point.
    ///
    /// The view borrows the vector, so any mutation first requires dropping
    /// it; a growth in between may move the storage it pointed into.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds of the capacity, or if its
    /// start is greater than its end.
    pub fn capacity_slice(&self, range: impl RangeBounds<usize>) -> &[T] {
        let range = self.verify_capacity_range(range);
        &self.slots()[range]
    }

    /// Returns a mutable view of the given range of the capacity window.
    ///
    /// The same bounds rules and stale-contents caveats as
    /// [`capacity_slice`](Self::capacity_slice) apply. Writing slack slots
    /// here and then raising the length via [`set_len`](Self::set_len) is
    /// the supported way to fill a vector out of order.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds of the capacity, or if its
    /// start is greater than its end.
    pub fn capacity_slice_mut(&mut self, range: impl RangeBounds<usize>) -> &mut [T] {
        let range = self.verify_capacity_range(range);
        &mut self.slots_mut()[range]
    }

    fn verify_capacity_range(&self, range: impl RangeBounds<usize>) -> Range<usize> {
        use core::ops::Bound;

        let capacity = self.capacity();

        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_add(1).expect("out of range"),
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(&n) => n.checked_add(1).expect("out of range"),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => capacity,
        };

        assert!(
            start <= end,
            "range start must not be greater than end: {:?} <= {:?}",
            start,
            end,
        );
        assert!(
            end <= capacity,
            "range end out of bounds: {:?} <= {:?}",
            end,
            capacity,
        );

        start..end
    }
}

impl<'a, T: bytemuck::Pod, I: IndexWidth> From<&'a mut [T]> for ScratchVec<'a, T, I> {
    fn from(region: &'a mut [T]) -> Self {
        ScratchVec::new(region)
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> Default for ScratchVec<'_, T, I> {
    fn default() -> Self {
        ScratchVec::new(Default::default())
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> std::ops::Deref for ScratchVec<'_, T, I> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> std::ops::DerefMut for ScratchVec<'_, T, I> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> std::ops::Index<usize> for ScratchVec<'_, T, I> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> std::ops::IndexMut<usize> for ScratchVec<'_, T, I> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> AsRef<[T]> for ScratchVec<'_, T, I> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> AsMut<[T]> for ScratchVec<'_, T, I> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: bytemuck::Pod + std::fmt::Debug, I: IndexWidth> std::fmt::Debug for ScratchVec<'_, T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchVec")
            .field("values", &self.as_slice())
            .field("len", &self.len())
            .field("cap", &self.capacity())
            .field("spilled", &self.spilled())
            .finish()
    }
}

impl<T: bytemuck::Pod, I: IndexWidth> Extend<T> for ScratchVec<'_, T, I> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<I: IndexWidth> std::io::Write for ScratchVec<'_, u8, I> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
