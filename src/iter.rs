use std::iter::{Flatten, FusedIterator};
use std::{slice, vec};

use slab::Slab;

use crate::block::{Block, BlockId};
use crate::BlockDeque;

/// An iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`iter`] method on [`BlockDeque`]. See its
/// documentation for more.
///
/// [`iter`]: BlockDeque::iter
pub struct Iter<'a, T> {
    blocks: &'a Slab<Block<T>>,
    front: (BlockId, usize),
    back: (BlockId, usize),
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new<const CAP: usize>(deque: &'a BlockDeque<T, CAP>) -> Self {
        let begin = deque.begin();
        let end = deque.end();
        Iter {
            blocks: &deque.blocks,
            front: (begin.block, begin.offset),
            back: (end.block, end.offset),
            remaining: deque.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let blocks = self.blocks;
        loop {
            let (id, offset) = self.front;
            let block = &blocks[id.0];
            if let Some(value) = block.as_slice().get(offset) {
                self.front.1 += 1;
                self.remaining -= 1;
                return Some(value);
            }
            self.front = (block.next?, 0);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let blocks = self.blocks;
        loop {
            let (id, offset) = self.back;
            if offset > 0 {
                self.back.1 -= 1;
                self.remaining -= 1;
                return blocks[id.0].as_slice().get(offset - 1);
            }
            let prev = blocks[id.0].prev?;
            self.back = (prev, blocks[prev.0].len());
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// A mutable iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`iter_mut`] method on [`BlockDeque`].
///
/// [`iter_mut`]: BlockDeque::iter_mut
pub struct IterMut<'a, T> {
    inner: Flatten<vec::IntoIter<slice::IterMut<'a, T>>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new<const CAP: usize>(deque: &'a mut BlockDeque<T, CAP>) -> Self {
        let remaining = deque.len();
        let order: Vec<BlockId> = deque.block_ids().collect();

        // Slab hands out disjoint `&mut` blocks only through `iter_mut`, in key
        // order, so they are parked by key and then picked in chain order.
        let slots = order.iter().map(|id| id.0 + 1).max().unwrap_or(0);
        let mut by_key: Vec<Option<slice::IterMut<'a, T>>> = (0..slots).map(|_| None).collect();
        for (key, block) in deque.blocks.iter_mut() {
            if let Some(slot) = by_key.get_mut(key) {
                *slot = Some(block.as_mut_slice().iter_mut());
            }
        }

        let chain: Vec<_> = order
            .into_iter()
            .filter_map(|id| by_key[id.0].take())
            .collect();

        IterMut {
            inner: chain.into_iter().flatten(),
            remaining,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.inner.next_back()?;
        self.remaining -= 1;
        Some(value)
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

/// An owning iterator over the elements of a `BlockDeque`.
///
/// This `struct` is created by the [`into_iter`] method on [`BlockDeque`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: BlockDeque::into_iter
/// [`IntoIterator`]: core::iter::IntoIterator
pub struct IntoIter<T> {
    inner: Flatten<vec::IntoIter<Vec<T>>>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new<const CAP: usize>(deque: BlockDeque<T, CAP>) -> Self {
        let remaining = deque.len();
        let order: Vec<BlockId> = deque.block_ids().collect();

        let mut blocks = deque.blocks;
        let chunks: Vec<Vec<T>> = order
            .into_iter()
            .map(|id| blocks.remove(id.0).into_vec())
            .collect();

        IntoIter {
            inner: chunks.into_iter().flatten(),
            remaining,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.inner.next_back()?;
        self.remaining -= 1;
        Some(value)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
