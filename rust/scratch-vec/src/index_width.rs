//! Index width selection for the scratch vector's length and capacity word.

/// Unsigned integer type used by [`ScratchVec`](crate::ScratchVec) to store
/// its length and to bound its capacity.
///
/// Two widths are supported: `u32` keeps the vector struct compact and caps
/// the addressable capacity at `u32::MAX` elements, while `usize` (the
/// default) addresses the full pointer range. The trait is sealed and cannot
/// be implemented outside this crate.
pub trait IndexWidth: Copy + details::Sealed {
    /// Largest capacity representable by this index width.
    const MAX_CAPACITY: usize;

    /// Narrows a value known to be within `MAX_CAPACITY`.
    fn from_usize(value: usize) -> Self;

    /// Widens the stored word back to `usize`.
    fn to_usize(self) -> usize;
}

impl IndexWidth for u32 {
    const MAX_CAPACITY: usize = u32::MAX as usize;

    #[inline]
    fn from_usize(value: usize) -> u32 {
        debug_assert!(value <= Self::MAX_CAPACITY);
        value as u32
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl IndexWidth for usize {
    const MAX_CAPACITY: usize = usize::MAX;

    #[inline]
    fn from_usize(value: usize) -> usize {
        value
    }

    #[inline]
    fn to_usize(self) -> usize {
        self
    }
}

mod details {
    pub trait Sealed {}

    impl Sealed for u32 {}
    impl Sealed for usize {}
}
