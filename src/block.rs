use std::{ptr, slice};

use crate::buffer::Buffer;

/// Key of a block inside the deque's block arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct BlockId(pub(crate) usize);

/// A fixed-capacity run of contiguous elements, linked to its neighbours.
///
/// Slots `[0, len)` are initialized; the rest are unused.
#[derive(Debug)]
pub(crate) struct Block<T> {
    buf: Buffer<T>,
    len: usize,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
}

impl<T> Block<T> {
    /// The zero-capacity block anchoring the front of the chain.
    pub fn sentinel() -> Self {
        Block {
            buf: Buffer::empty(),
            len: 0,
            prev: None,
            next: None,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Block {
            buf: Buffer::with_capacity(cap),
            len: 0,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.cap()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.buf.cap()
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Writes `value` at `index`, shifting `[index, len)` one slot right.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len, "block index out of bounds");
        assert!(!self.is_full(), "block is full");

        unsafe {
            let slot = self.buf.ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            ptr::write(slot, value);
        }
        self.len += 1;
    }

    /// Takes the value at `index`, shifting `(index, len)` one slot left.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "block index out of bounds");

        unsafe {
            let slot = self.buf.ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    pub fn push_back(&mut self, value: T) {
        self.insert(self.len, value);
    }

    pub fn pop_back(&mut self) -> T {
        self.remove(self.len - 1)
    }

    /// Moves the live elements out, leaving the buffer to be freed.
    pub fn into_vec(mut self) -> Vec<T> {
        let mut vec = Vec::with_capacity(self.len);
        unsafe {
            ptr::copy_nonoverlapping(self.buf.ptr(), vec.as_mut_ptr(), self.len);
            vec.set_len(self.len);
        }
        self.len = 0;
        vec
    }
}

impl<T: Clone> Block<T> {
    /// Deep copy of the elements with the same capacity and no links.
    pub fn clone_detached(&self) -> Self {
        let mut block = Block::with_capacity(self.capacity());
        for value in self.as_slice() {
            block.push_back(value.clone());
        }
        block
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(self.as_mut_slice());
        }
    }
}
