use alloc::vec::Vec;

use super::handle::Handle;

/// A storage slot. Vacant slots form an intrusive free list.
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<Handle> },
}

/// Owns every node of a tree; nodes refer to each other by [`Handle`].
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        let handle = if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.to_index()];
            let Slot::Vacant { next_free } = *slot else {
                panic!("`Arena::alloc()` - free list points at an occupied slot!");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        };
        self.len += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    /// Returns a reference to an element by handle from a raw pointer.
    ///
    /// Only the slot at `handle` is borrowed, never the whole buffer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    /// - No mutable reference to the slot at `handle` may be live.
    #[inline]
    pub(crate) unsafe fn get_ptr<'a>(ptr: *const Self, handle: Handle) -> &'a T {
        let index = handle.to_index();
        // SAFETY: The caller guarantees `ptr` is valid. `Vec::as_ptr` does not materialize a
        // reference to the buffer, so other slots are left untouched.
        unsafe {
            let slots = &raw const (*ptr).slots;
            assert!(index < (*slots).len(), "`Arena::get_ptr()` - `handle` is out of bounds!");
            match &*(*slots).as_ptr().add(index) {
                Slot::Occupied(element) => element,
                Slot::Vacant { .. } => panic!("`Arena::get_ptr()` - `handle` is invalid!"),
            }
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    /// Returns a mutable reference to an element by handle from a raw pointer.
    ///
    /// Only the slot at `handle` is reborrowed, so references previously handed out for other
    /// slots stay valid.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    /// - The caller must have logical exclusive access to the slot at `handle` for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut T {
        let index = handle.to_index();
        // SAFETY: The caller guarantees `ptr` is valid and that nothing else refers to this slot.
        // `Vec::as_mut_ptr` does not materialize a reference to the buffer.
        unsafe {
            let slots = &raw mut (*ptr).slots;
            assert!(index < (*slots).len(), "`Arena::get_mut_ptr()` - `handle` is out of bounds!");
            match &mut *(*slots).as_mut_ptr().add(index) {
                Slot::Occupied(element) => element,
                Slot::Vacant { .. } => panic!("`Arena::get_mut_ptr()` - `handle` is invalid!"),
            }
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match core::mem::replace(&mut self.slots[handle.to_index()], vacant) {
            Slot::Occupied(element) => {
                self.free_head = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant { next_free } => {
                // Put the slot back untouched before reporting the misuse.
                self.slots[handle.to_index()] = Slot::Vacant { next_free };
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn freed_slots_are_reused_last_in_first_out() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        let _c = arena.alloc('c');

        assert_eq!(arena.take(a), 'a');
        assert_eq!(arena.take(b), 'b');
        assert_eq!(arena.alloc('d'), b);
        assert_eq!(arena.alloc('e'), a);
        assert_eq!(arena.len(), 3);
        assert_eq!(*arena.get(a), 'e');
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn capacity_panic_leaves_len_untouched() {
        let mut arena = Arena::new();
        for i in 0..=Handle::MAX {
            arena.alloc(i);
        }
        assert_eq!(arena.len(), Handle::MAX + 1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| arena.alloc(0)));
        assert!(result.is_err());
        assert_eq!(arena.len(), Handle::MAX + 1);
    }

    #[test]
    fn pointer_access_reaches_single_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        let ptr: *mut Arena<i32> = &raw mut arena;

        // SAFETY: `a` and `b` are distinct live slots and `arena` is not otherwise touched.
        unsafe {
            let first = Arena::get_mut_ptr(ptr, a);
            let second = Arena::get_mut_ptr(ptr, b);
            *first += 10;
            *second += 20;
            *first += 100;
            assert_eq!(*Arena::get_ptr(ptr, b), 22);
        }
        assert_eq!(*arena.get(a), 111);
    }

    #[test]
    #[should_panic(expected = "`Arena::get()` - `handle` is invalid!")]
    fn get_after_take_panics() {
        let mut arena = Arena::new();
        let handle = arena.alloc(1);
        arena.take(handle);
        let _ = arena.get(handle);
    }

    #[test]
    #[should_panic(expected = "`Arena::take()` - `handle` is invalid!")]
    fn double_take_panics() {
        let mut arena = Arena::new();
        let handle = arena.alloc(1);
        arena.take(handle);
        arena.take(handle);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let (handle, expected) = model.swap_remove(index);
                        prop_assert_eq!(arena.take(handle), expected);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            10 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
