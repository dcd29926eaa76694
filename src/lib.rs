#![warn(missing_docs)]
#![doc(test(attr(deny(warnings))))]

//! A double-ended queue stored as a chain of fixed-capacity blocks.
//!
//! # Layout
//!
//! A [`BlockDeque`] keeps its elements in blocks of `CAP` slots each
//! ([`DEFAULT_BLOCK_CAPACITY`] unless chosen otherwise). The blocks form a
//! doubly linked chain that starts at a permanent, element-less head block.
//! The last block of the chain is always a real block: an empty deque is
//! represented by a single empty block following the head.
//!
//! Pushing at either end only touches the edge block. Once an edge block
//! holds half its capacity, the next push at that end opens a new block, so
//! the cost of shifting elements inside a block stays bounded.
//!
//! # Positions
//!
//! Slots are addressed by [`Position`] values, which double as iterators:
//! they can be moved with [`BlockDeque::advance`] and friends, compared, and
//! subtracted with [`BlockDeque::distance`] even when they lie in different
//! blocks. [`Cursor`] and [`CursorMut`] bundle a position with a borrow of
//! the deque.
//!
//! ```
//! use block_deque::BlockDeque;
//!
//! let mut deque = BlockDeque::from([1, 2, 3]);
//!
//! let second = deque.advance(deque.begin(), 1).unwrap();
//! let inserted = deque.insert(second, 9).unwrap();
//! assert_eq!(deque, [1, 9, 2, 3]);
//!
//! let following = deque.erase(inserted).unwrap();
//! assert_eq!(deque.get_at(following), Ok(&2));
//! assert_eq!(deque, [1, 2, 3]);
//! ```
//!
//! # Errors
//!
//! Operations that can fail return [`Error`] instead of `Option`, telling
//! apart an empty deque, an out-of-bound index or move, and a position that
//! does not belong to the deque.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use log::trace;
use slab::Slab;

use block::{Block, BlockId};
pub use error::Error;
pub use iter::{IntoIter, Iter, IterMut};
use position::DequeId;
pub use position::{Cursor, CursorMut, Position};

mod block;
mod buffer;
mod error;
mod iter;
mod position;

#[cfg(test)]
mod drop_tracker;

/// Number of element slots per block used by [`BlockDeque<T>`].
pub const DEFAULT_BLOCK_CAPACITY: usize = 1000;

/// A double-ended queue implemented with a chain of fixed-capacity blocks.
///
/// `CAP` is the number of element slots in each block.
///
/// ```
/// use block_deque::BlockDeque;
///
/// let mut deque = BlockDeque::new();
/// deque.push_back(2);
/// deque.push_front(1);
/// assert_eq!(deque[0], 1);
/// assert_eq!(deque.back(), Ok(&2));
/// ```
///
/// A smaller block capacity can be picked through the type:
///
/// ```
/// use block_deque::BlockDeque;
///
/// let deque: BlockDeque<char, 16> = ('a'..='z').collect();
/// assert_eq!(deque.len(), 26);
/// ```
pub struct BlockDeque<T, const CAP: usize = DEFAULT_BLOCK_CAPACITY> {
    blocks: Slab<Block<T>>,
    head: BlockId,
    tail: BlockId,
    len: usize,
    id: DequeId,
}

impl<T> BlockDeque<T> {
    /// Creates an empty deque with the default block capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    /// # #[allow(unused)]
    /// let deque: BlockDeque<u32> = BlockDeque::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, const CAP: usize> BlockDeque<T, CAP> {
    /// A chain made of the head block only. Callers link the real blocks.
    fn with_sentinel() -> Self {
        assert!(CAP > 0, "block capacity must be non-zero");

        let mut blocks = Slab::new();
        let head = BlockId(blocks.insert(Block::sentinel()));
        BlockDeque {
            blocks,
            head,
            tail: head,
            len: 0,
            id: DequeId::fresh(),
        }
    }

    #[inline]
    fn block(&self, id: BlockId) -> &Block<T> {
        &self.blocks[id.0]
    }

    #[inline]
    fn block_mut(&mut self, id: BlockId) -> &mut Block<T> {
        &mut self.blocks[id.0]
    }

    fn first(&self) -> BlockId {
        self.block(self.head).next.unwrap_or(self.tail)
    }

    /// Real blocks in chain order.
    fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::successors(self.block(self.head).next, move |id| self.block(*id).next)
    }

    fn link_block_after(&mut self, at: BlockId, mut block: Block<T>) -> BlockId {
        let next = self.block(at).next;
        block.prev = Some(at);
        block.next = next;

        let id = BlockId(self.blocks.insert(block));
        self.block_mut(at).next = Some(id);
        match next {
            Some(next) => self.block_mut(next).prev = Some(id),
            None => self.tail = id,
        }

        trace!("linked block {} after block {}", id.0, at.0);
        id
    }

    fn link_after(&mut self, at: BlockId) -> BlockId {
        self.link_block_after(at, Block::with_capacity(CAP))
    }

    /// Takes a block out of the chain. Never called on the only real block.
    fn unlink(&mut self, id: BlockId) -> Block<T> {
        let block = self.blocks.remove(id.0);
        if let Some(prev) = block.prev {
            self.block_mut(prev).next = block.next;
            if self.tail == id {
                self.tail = prev;
            }
        }
        if let Some(next) = block.next {
            self.block_mut(next).prev = block.prev;
        }

        trace!("released block {}", id.0);
        block
    }

    /// Drops every real block, leaving the head block alone in the chain.
    fn release_chain(&mut self) {
        let head = self.head.0;
        self.blocks.retain(|key, _| key == head);
        self.block_mut(self.head).next = None;
        self.tail = self.head;
        self.len = 0;
    }

    /// Returns the number of elements in the deque.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the deque holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all elements, releasing every block but one empty block.
    ///
    /// Every position obtained before is invalidated.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut deque: BlockDeque<i32> = (0..3000).collect();
    /// deque.clear();
    /// assert!(deque.is_empty());
    /// assert_eq!(deque.begin(), deque.end());
    /// ```
    pub fn clear(&mut self) {
        self.release_chain();
        self.link_after(self.head);
        trace!("cleared deque");
    }

    /// Provides a reference to the front element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    pub fn front(&self) -> Result<&T, Error> {
        self.block(self.first())
            .as_slice()
            .first()
            .ok_or(Error::EmptyContainer)
    }

    /// Provides a mutable reference to the front element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    pub fn front_mut(&mut self) -> Result<&mut T, Error> {
        let first = self.first();
        self.block_mut(first)
            .as_mut_slice()
            .first_mut()
            .ok_or(Error::EmptyContainer)
    }

    /// Provides a reference to the back element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let mut d = BlockDeque::new();
    /// assert_eq!(d.back(), Err(Error::EmptyContainer));
    ///
    /// d.push_back(1);
    /// d.push_back(2);
    /// assert_eq!(d.back(), Ok(&2));
    /// ```
    pub fn back(&self) -> Result<&T, Error> {
        self.block(self.tail)
            .as_slice()
            .last()
            .ok_or(Error::EmptyContainer)
    }

    /// Provides a mutable reference to the back element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    pub fn back_mut(&mut self) -> Result<&mut T, Error> {
        let tail = self.tail;
        self.block_mut(tail)
            .as_mut_slice()
            .last_mut()
            .ok_or(Error::EmptyContainer)
    }

    /// Finds the block holding the element at `index` by walking the chain.
    fn locate(&self, index: usize) -> Result<(BlockId, usize), Error> {
        if index >= self.len {
            return Err(Error::OutOfBound);
        }

        let mut rest = index;
        for id in self.block_ids() {
            let len = self.block(id).len();
            if rest < len {
                return Ok((id, rest));
            }
            rest -= len;
        }
        Err(Error::OutOfBound)
    }

    /// Returns a reference to the element at `index`.
    ///
    /// Element at index 0 is the front of the queue.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBound`] if `index` is not less than the length.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let deque: BlockDeque<u32> = (1..=2500).collect();
    /// assert_eq!(deque.get(0), Ok(&1));
    /// assert_eq!(deque.get(2499), Ok(&2500));
    /// assert_eq!(deque.get(2500), Err(Error::OutOfBound));
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, Error> {
        let (id, offset) = self.locate(index)?;
        Ok(&self.block(id).as_slice()[offset])
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBound`] if `index` is not less than the length.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let (id, offset) = self.locate(index)?;
        Ok(&mut self.block_mut(id).as_mut_slice()[offset])
    }

    /// Position of the front element, or the end position if the deque is
    /// empty.
    pub fn begin(&self) -> Position {
        self.position(self.first(), 0)
    }

    /// Position one past the back element.
    ///
    /// For an empty deque this is equal to [`begin`](Self::begin).
    pub fn end(&self) -> Position {
        let tail = self.tail;
        self.position(tail, self.block(tail).len())
    }

    /// Returns a read-only cursor at `pos`.
    pub fn cursor(&self, pos: Position) -> Cursor<'_, T, CAP> {
        Cursor::new(self, pos)
    }

    /// Returns a cursor at `pos` that can modify the deque.
    pub fn cursor_mut(&mut self, pos: Position) -> CursorMut<'_, T, CAP> {
        CursorMut::new(self, pos)
    }

    /// Returns a front-to-back iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a front-to-back iterator that returns mutable references.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut deque = BlockDeque::from([5, 3, 4]);
    /// for num in deque.iter_mut() {
    ///     *num = *num - 2;
    /// }
    /// assert_eq!(deque, [3, 1, 2]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Appends an element to the back of the deque.
    ///
    /// A new block is opened when the last block already holds half its
    /// capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut buf = BlockDeque::new();
    /// buf.push_back(1);
    /// buf.push_back(3);
    /// assert_eq!(buf.back(), Ok(&3));
    /// ```
    pub fn push_back(&mut self, value: T) {
        let tail = self.tail;
        if self.len != 0 && self.block(tail).len() >= CAP / 2 {
            let id = self.link_after(tail);
            self.block_mut(id).push_back(value);
        } else {
            self.block_mut(tail).push_back(value);
        }
        self.len += 1;
    }

    /// Prepends an element to the deque.
    ///
    /// A new block is opened when the first block already holds half its
    /// capacity; otherwise the first block's elements are shifted.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut d = BlockDeque::new();
    /// d.push_front(1);
    /// d.push_front(2);
    /// assert_eq!(d.front(), Ok(&2));
    /// ```
    pub fn push_front(&mut self, value: T) {
        let first = self.first();
        if self.len != 0 && self.block(first).len() >= CAP / 2 {
            let id = self.link_after(self.head);
            self.block_mut(id).push_back(value);
        } else {
            self.block_mut(first).insert(0, value);
        }
        self.len += 1;
    }

    /// Removes the last element and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let mut buf = BlockDeque::new();
    /// assert_eq!(buf.pop_back(), Err(Error::EmptyContainer));
    /// buf.push_back(1);
    /// buf.push_back(3);
    /// assert_eq!(buf.pop_back(), Ok(3));
    /// ```
    pub fn pop_back(&mut self) -> Result<T, Error> {
        if self.len == 0 {
            return Err(Error::EmptyContainer);
        }

        let tail = self.tail;
        let value = if self.block(tail).len() == 1 && tail != self.first() {
            self.unlink(tail).pop_back()
        } else {
            self.block_mut(tail).pop_back()
        };
        self.len -= 1;
        Ok(value)
    }

    /// Removes the first element and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the deque is empty.
    pub fn pop_front(&mut self) -> Result<T, Error> {
        if self.len == 0 {
            return Err(Error::EmptyContainer);
        }

        let first = self.first();
        let value = if self.block(first).len() == 1 && first != self.tail {
            self.unlink(first).pop_back()
        } else {
            self.block_mut(first).remove(0)
        };
        self.len -= 1;
        Ok(value)
    }

    /// Inserts `value` before `pos` and returns the position of the
    /// inserted value.
    ///
    /// When the target block is full, its last element moves to the next
    /// block if that one has room, or to a new block linked in between.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    /// let pos = deque.advance(deque.begin(), 1).unwrap();
    /// let pos = deque.insert(pos, 9).unwrap();
    /// assert_eq!(deque.get_at(pos), Ok(&9));
    /// assert_eq!(deque, [1, 9, 2, 3]);
    /// ```
    pub fn insert(&mut self, pos: Position, value: T) -> Result<Position, Error> {
        let block = self.resolve(pos)?;

        let inserted = if block.is_full() {
            self.insert_spilling(pos.block, pos.offset, value)
        } else {
            self.block_mut(pos.block).insert(pos.offset, value);
            pos
        };
        self.len += 1;
        Ok(inserted)
    }

    /// Inserts into a full block by pushing one element out of it.
    fn insert_spilling(&mut self, at: BlockId, offset: usize, value: T) -> Position {
        let (spilled, inserted) = if offset == self.block(at).len() {
            (value, None)
        } else {
            let block = self.block_mut(at);
            let last = block.pop_back();
            block.insert(offset, value);
            (last, Some(self.position(at, offset)))
        };

        let next = self.block(at).next;
        let receiver = match next {
            Some(next) if !self.block(next).is_full() => {
                self.block_mut(next).insert(0, spilled);
                next
            }
            _ => {
                let id = self.link_after(at);
                self.block_mut(id).push_back(spilled);
                id
            }
        };

        inserted.unwrap_or_else(|| self.position(receiver, 0))
    }

    /// Removes the element at `pos` and returns the position of the element
    /// that followed it, or the end position.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque or
    /// does not address an element, and [`Error::EmptyContainer`] if the
    /// deque is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    /// let pos = deque.advance(deque.begin(), 1).unwrap();
    /// let pos = deque.erase(pos).unwrap();
    /// assert_eq!(deque.get_at(pos), Ok(&3));
    /// assert_eq!(deque, [1, 3]);
    /// ```
    pub fn erase(&mut self, pos: Position) -> Result<Position, Error> {
        self.take(pos).map(|(_, following)| following)
    }

    /// Like [`erase`](Self::erase), but also returns the removed element.
    pub fn take(&mut self, pos: Position) -> Result<(T, Position), Error> {
        if pos.owner != self.id {
            return Err(Error::InvalidPosition);
        }
        if self.len == 0 {
            return Err(Error::EmptyContainer);
        }
        let block = self.resolve(pos)?;
        if pos.offset >= block.len() {
            return Err(Error::InvalidPosition);
        }
        let single = block.len() == 1;
        let last_in_block = pos.offset + 1 == block.len();
        let next = block.next;

        if pos.block == self.first() && pos.offset == 0 {
            let value = self.pop_front()?;
            return Ok((value, self.begin()));
        }
        if pos.block == self.tail && last_in_block {
            let value = self.pop_back()?;
            return Ok((value, self.end()));
        }

        // neither the first nor the last element: a following block exists
        let value = if single {
            self.unlink(pos.block).pop_back()
        } else {
            self.block_mut(pos.block).remove(pos.offset)
        };
        self.len -= 1;

        let following = match next {
            Some(next) if last_in_block => self.position(next, 0),
            _ => pos,
        };
        Ok((value, following))
    }
}

impl<T: Clone, const CAP: usize> BlockDeque<T, CAP> {
    /// Appends deep copies of `source`'s blocks, in chain order.
    fn copy_chain_from(&mut self, source: &Self) {
        for id in source.block_ids() {
            let block = source.block(id).clone_detached();
            self.len += block.len();
            self.link_block_after(self.tail, block);
        }
        trace!("copied {} elements", self.len);
    }
}

impl<T, const CAP: usize> Default for BlockDeque<T, CAP> {
    fn default() -> Self {
        let mut deque = Self::with_sentinel();
        deque.link_after(deque.head);
        deque
    }
}

impl<T: Clone, const CAP: usize> Clone for BlockDeque<T, CAP> {
    fn clone(&self) -> Self {
        let mut deque = Self::with_sentinel();
        deque.copy_chain_from(self);
        deque
    }

    /// Copies `source` into a new chain, then replaces the current blocks
    /// with it. If cloning an element panics, the deque is left unchanged.
    ///
    /// The deque keeps its identity, but positions obtained before are
    /// invalidated.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = Self::with_sentinel();
        copy.copy_chain_from(source);

        let id = self.id;
        *self = copy;
        self.id = id;
    }
}

impl<T: fmt::Debug, const CAP: usize> fmt::Debug for BlockDeque<T, CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const CAP: usize> Index<usize> for BlockDeque<T, CAP> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}: the len is {} but the index is {index}", self.len),
        }
    }
}

impl<T, const CAP: usize> IndexMut<usize> for BlockDeque<T, CAP> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, const CAP: usize> IntoIterator for BlockDeque<T, CAP> {
    type Item = T;

    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, const CAP: usize> IntoIterator for &'a BlockDeque<T, CAP> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const CAP: usize> IntoIterator for &'a mut BlockDeque<T, CAP> {
    type Item = &'a mut T;

    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

macro_rules! impl_partial_eq {
    ([$($n:tt)*] $rhs:ty) => {
        impl<T, U, const CAP: usize, $($n)*> PartialEq<$rhs> for BlockDeque<T, CAP>
        where
            T: PartialEq<U>,
        {
            fn eq(&self, other: & $rhs) -> bool {
                self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
            }
        }
    };
}

impl_partial_eq!([const N: usize] [U; N]);
impl_partial_eq!([const N: usize] &[U; N]);
impl_partial_eq!([] &[U]);
impl_partial_eq!([] Vec<U>);
impl_partial_eq!([const M: usize] BlockDeque<U, M>);

impl<T: Eq, const CAP: usize> Eq for BlockDeque<T, CAP> {}

impl<T: PartialOrd, const CAP: usize> PartialOrd for BlockDeque<T, CAP> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const CAP: usize> Ord for BlockDeque<T, CAP> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, const CAP: usize> Hash for BlockDeque<T, CAP> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for BlockDeque<T> {
    /// Converts a `[T; N]` into a `BlockDeque<T>`.
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let deq = BlockDeque::from([1, 2, 3, 4]);
    /// assert_eq!(deq, [1, 2, 3, 4]);
    /// ```
    fn from(value: [T; N]) -> Self {
        Self::from_iter(value)
    }
}

impl<T> From<Vec<T>> for BlockDeque<T> {
    /// Turn a [`Vec<T>`] into a [`BlockDeque<T>`].
    fn from(value: Vec<T>) -> Self {
        Self::from_iter(value)
    }
}

impl<T, const CAP: usize> FromIterator<T> for BlockDeque<T, CAP> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::default();
        deque.extend(iter);
        deque
    }
}

impl<T, const CAP: usize> Extend<T> for BlockDeque<T, CAP> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, const CAP: usize> Extend<&'a T> for BlockDeque<T, CAP> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}
