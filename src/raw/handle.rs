use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Stable address of a node inside an [`Arena`](super::arena::Arena).
///
/// Handles are one-based so that `Option<Handle>` (a child, parent or root link) costs no more
/// than the handle itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` is non-zero and fits after the assertion above.
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((index + 1) as RawHandle) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // A link slot must stay as small as a bare handle.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, RawHandle);

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` > `Handle::MAX`!")]
    fn index_past_max_panics() {
        let _ = Handle::from_index(Handle::MAX + 1);
    }

    #[test]
    fn first_and_last_handles() {
        assert_eq!(Handle::from_index(0).to_index(), 0);
        assert_eq!(Handle::from_index(Handle::MAX).to_index(), Handle::MAX);
    }

    proptest! {
        #[test]
        fn index_survives_handle(index in 0..=Handle::MAX) {
            prop_assert_eq!(Handle::from_index(index).to_index(), index);
        }
    }
}
