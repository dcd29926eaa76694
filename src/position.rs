//! Positions into a [`BlockDeque`] and the arithmetic that moves them across
//! block boundaries.
//!
//! A [`Position`] is a plain `(block, offset)` address. It does not borrow
//! the deque, so it can be kept while the deque is mutated, but any
//! structural mutation may leave it pointing at a different slot, or at a
//! block that no longer exists. Stale positions never read freed memory:
//! they resolve to [`Error::InvalidPosition`] or to whatever slot now has
//! that address.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::block::{Block, BlockId};
use crate::{BlockDeque, Error, DEFAULT_BLOCK_CAPACITY};

/// Identity of one deque instance, compared by positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct DequeId(u64);

impl DequeId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        DequeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Address of a slot in a [`BlockDeque`].
///
/// Positions are obtained from [`BlockDeque::begin`], [`BlockDeque::end`],
/// [`BlockDeque::insert`], [`BlockDeque::erase`] and the position arithmetic
/// methods. Two positions are equal only if they address the same slot of
/// the same deque instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub(crate) block: BlockId,
    pub(crate) offset: usize,
    pub(crate) owner: DequeId,
}

impl<T, const CAP: usize> BlockDeque<T, CAP> {
    pub(crate) fn position(&self, block: BlockId, offset: usize) -> Position {
        Position {
            block,
            offset,
            owner: self.id,
        }
    }

    /// Looks up the block addressed by `pos`, accepting offsets up to and
    /// including the block length.
    pub(crate) fn resolve(&self, pos: Position) -> Result<&Block<T>, Error> {
        if pos.owner != self.id || pos.block == self.head {
            return Err(Error::InvalidPosition);
        }
        let block = self
            .blocks
            .get(pos.block.0)
            .ok_or(Error::InvalidPosition)?;
        if pos.offset > block.len() {
            return Err(Error::InvalidPosition);
        }
        Ok(block)
    }

    /// Returns the position `n` elements after `pos`. A negative `n` moves
    /// backwards.
    ///
    /// Landing exactly on [`end`](Self::end) is allowed.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBound`] if the move would leave the sequence, and
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::{BlockDeque, Error};
    ///
    /// let deque = BlockDeque::from([1, 2, 3]);
    /// let pos = deque.advance(deque.begin(), 2).unwrap();
    /// assert_eq!(deque.get_at(pos), Ok(&3));
    /// assert_eq!(deque.advance(pos, 1), Ok(deque.end()));
    /// assert_eq!(deque.advance(pos, 2), Err(Error::OutOfBound));
    /// ```
    pub fn advance(&self, pos: Position, n: isize) -> Result<Position, Error> {
        if n < 0 {
            self.walk_backward(pos, n.unsigned_abs())
        } else {
            self.walk_forward(pos, n as usize)
        }
    }

    /// Returns the position `n` elements before `pos`. A negative `n` moves
    /// forwards.
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance).
    pub fn retreat(&self, pos: Position, n: isize) -> Result<Position, Error> {
        if n < 0 {
            self.walk_forward(pos, n.unsigned_abs())
        } else {
            self.walk_backward(pos, n as usize)
        }
    }

    fn walk_forward(&self, pos: Position, n: usize) -> Result<Position, Error> {
        let mut block = self.resolve(pos)?;
        if n == 0 {
            return Ok(pos);
        }

        let mut at = pos.block;
        let mut offset = pos.offset;
        let mut rest = n;
        while let Some(next) = block.next {
            let room = block.len() - offset;
            if rest < room {
                break;
            }
            rest -= room;
            at = next;
            block = self.block(next);
            offset = 0;
        }

        if rest > block.len() - offset {
            return Err(Error::OutOfBound);
        }
        Ok(self.position(at, offset + rest))
    }

    fn walk_backward(&self, pos: Position, n: usize) -> Result<Position, Error> {
        let mut block = self.resolve(pos)?;
        if n == 0 {
            return Ok(pos);
        }

        let mut at = pos.block;
        let mut offset = pos.offset;
        let mut rest = n;
        while rest > offset {
            match block.prev {
                Some(prev) if prev != self.head => {
                    rest -= offset + 1;
                    at = prev;
                    block = self.block(prev);
                    offset = block.len() - 1;
                }
                _ => return Err(Error::OutOfBound),
            }
        }
        Ok(self.position(at, offset - rest))
    }

    /// Returns the position right after `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBound`] if `pos` is the end position, and
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque.
    pub fn step_forward(&self, pos: Position) -> Result<Position, Error> {
        let block = self.resolve(pos)?;
        if pos.offset >= block.len() {
            return Err(Error::OutOfBound);
        }

        let offset = pos.offset + 1;
        match block.next {
            Some(next) if offset == block.len() => Ok(self.position(next, 0)),
            _ => Ok(self.position(pos.block, offset)),
        }
    }

    /// Returns the position right before `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBound`] if `pos` is the begin position, and
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque.
    pub fn step_backward(&self, pos: Position) -> Result<Position, Error> {
        let block = self.resolve(pos)?;
        if pos.offset > 0 {
            return Ok(self.position(pos.block, pos.offset - 1));
        }

        match block.prev {
            Some(prev) if prev != self.head => {
                Ok(self.position(prev, self.block(prev).len() - 1))
            }
            _ => Err(Error::OutOfBound),
        }
    }

    /// Returns the signed number of elements from `from` to `to`, so that
    /// `advance(from, distance(from, to))` yields `to`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPosition`] if either position does not belong to this
    /// deque.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let deque: BlockDeque<u32> = (0..2500).collect();
    /// let (begin, end) = (deque.begin(), deque.end());
    /// assert_eq!(deque.distance(begin, end), Ok(2500));
    /// assert_eq!(deque.distance(end, begin), Ok(-2500));
    /// ```
    pub fn distance(&self, from: Position, to: Position) -> Result<isize, Error> {
        self.offset_between(to, from)
    }

    /// `x - y` in elements.
    pub(crate) fn offset_between(&self, x: Position, y: Position) -> Result<isize, Error> {
        if x.owner != y.owner {
            return Err(Error::InvalidPosition);
        }
        self.resolve(x)?;
        self.resolve(y)?;

        if x.block == y.block {
            return Ok(x.offset as isize - y.offset as isize);
        }
        if let Some(span) = self.span(x, y) {
            return Ok(-(span as isize));
        }
        if let Some(span) = self.span(y, x) {
            return Ok(span as isize);
        }
        panic!("block chain is corrupted: neither position reaches the other");
    }

    /// Elements from `from` to `to`, if `to` lies in a block after `from`'s.
    fn span(&self, from: Position, to: Position) -> Option<usize> {
        let block = self.block(from.block);
        let mut span = block.len() - from.offset;
        let mut next = block.next;
        while let Some(id) = next {
            if id == to.block {
                return Some(span + to.offset);
            }
            let block = self.block(id);
            span += block.len();
            next = block.next;
        }
        None
    }

    /// Returns a reference to the element at `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPosition`] if `pos` does not belong to this deque or
    /// does not address an element (such as the end position).
    pub fn get_at(&self, pos: Position) -> Result<&T, Error> {
        self.resolve(pos)?
            .as_slice()
            .get(pos.offset)
            .ok_or(Error::InvalidPosition)
    }

    /// Returns a mutable reference to the element at `pos`.
    ///
    /// # Errors
    ///
    /// Same as [`get_at`](Self::get_at).
    pub fn get_at_mut(&mut self, pos: Position) -> Result<&mut T, Error> {
        self.resolve(pos)?;
        self.block_mut(pos.block)
            .as_mut_slice()
            .get_mut(pos.offset)
            .ok_or(Error::InvalidPosition)
    }
}

/// A read-only cursor over a [`BlockDeque`].
///
/// This `struct` is created by [`BlockDeque::cursor`].
pub struct Cursor<'a, T, const CAP: usize = DEFAULT_BLOCK_CAPACITY> {
    deque: &'a BlockDeque<T, CAP>,
    pos: Position,
}

impl<'a, T, const CAP: usize> Cursor<'a, T, CAP> {
    pub(crate) fn new(deque: &'a BlockDeque<T, CAP>, pos: Position) -> Self {
        Cursor { deque, pos }
    }

    /// The position the cursor points at.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Returns the element under the cursor.
    pub fn get(&self) -> Result<&'a T, Error> {
        self.deque.get_at(self.pos)
    }

    /// Moves the cursor `n` elements forward (backwards if negative).
    ///
    /// The cursor is left untouched on error.
    pub fn advance(&mut self, n: isize) -> Result<(), Error> {
        self.pos = self.deque.advance(self.pos, n)?;
        Ok(())
    }

    /// Moves the cursor `n` elements backwards (forward if negative).
    pub fn retreat(&mut self, n: isize) -> Result<(), Error> {
        self.pos = self.deque.retreat(self.pos, n)?;
        Ok(())
    }

    /// Moves the cursor to the next element.
    pub fn move_next(&mut self) -> Result<(), Error> {
        self.pos = self.deque.step_forward(self.pos)?;
        Ok(())
    }

    /// Moves the cursor to the previous element.
    pub fn move_prev(&mut self) -> Result<(), Error> {
        self.pos = self.deque.step_backward(self.pos)?;
        Ok(())
    }

    /// Signed element count from `other` to this cursor.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let deque = BlockDeque::from([1, 2, 3, 4]);
    /// let begin = deque.cursor(deque.begin());
    /// let end = deque.cursor(deque.end());
    /// assert_eq!(end.offset_from(begin.position()), Ok(4));
    /// assert_eq!(begin.offset_from(end.position()), Ok(-4));
    /// ```
    pub fn offset_from(&self, other: Position) -> Result<isize, Error> {
        self.deque.offset_between(self.pos, other)
    }
}

impl<'a, T, const CAP: usize> Clone for Cursor<'a, T, CAP> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, const CAP: usize> Copy for Cursor<'a, T, CAP> {}

impl<'a, T, const CAP: usize> PartialEq for Cursor<'a, T, CAP> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<'a, T, const CAP: usize> Eq for Cursor<'a, T, CAP> {}

impl<'a, T, const CAP: usize> fmt::Debug for Cursor<'a, T, CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.pos).finish()
    }
}

/// A cursor over a [`BlockDeque`] that can modify elements and the sequence.
///
/// This `struct` is created by [`BlockDeque::cursor_mut`].
pub struct CursorMut<'a, T, const CAP: usize = DEFAULT_BLOCK_CAPACITY> {
    deque: &'a mut BlockDeque<T, CAP>,
    pos: Position,
}

impl<'a, T, const CAP: usize> CursorMut<'a, T, CAP> {
    pub(crate) fn new(deque: &'a mut BlockDeque<T, CAP>, pos: Position) -> Self {
        CursorMut { deque, pos }
    }

    /// The position the cursor points at.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Returns the element under the cursor.
    pub fn get(&self) -> Result<&T, Error> {
        self.deque.get_at(self.pos)
    }

    /// Returns the element under the cursor, mutably.
    pub fn get_mut(&mut self) -> Result<&mut T, Error> {
        self.deque.get_at_mut(self.pos)
    }

    /// Moves the cursor `n` elements forward (backwards if negative).
    pub fn advance(&mut self, n: isize) -> Result<(), Error> {
        self.pos = self.deque.advance(self.pos, n)?;
        Ok(())
    }

    /// Moves the cursor `n` elements backwards (forward if negative).
    pub fn retreat(&mut self, n: isize) -> Result<(), Error> {
        self.pos = self.deque.retreat(self.pos, n)?;
        Ok(())
    }

    /// Moves the cursor to the next element.
    pub fn move_next(&mut self) -> Result<(), Error> {
        self.pos = self.deque.step_forward(self.pos)?;
        Ok(())
    }

    /// Moves the cursor to the previous element.
    pub fn move_prev(&mut self) -> Result<(), Error> {
        self.pos = self.deque.step_backward(self.pos)?;
        Ok(())
    }

    /// Signed element count from `other` to this cursor.
    pub fn offset_from(&self, other: Position) -> Result<isize, Error> {
        self.deque.offset_between(self.pos, other)
    }

    /// Inserts `value` before the cursor and moves the cursor onto it.
    ///
    /// # Example
    ///
    /// ```
    /// use block_deque::BlockDeque;
    ///
    /// let mut deque = BlockDeque::from([1, 2, 3]);
    /// let end = deque.end();
    /// let mut cursor = deque.cursor_mut(end);
    /// cursor.insert(4).unwrap();
    /// assert_eq!(cursor.get(), Ok(&4));
    /// assert_eq!(deque, [1, 2, 3, 4]);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<(), Error> {
        self.pos = self.deque.insert(self.pos, value)?;
        Ok(())
    }

    /// Removes the element under the cursor and moves the cursor onto the
    /// element that followed it.
    pub fn remove_current(&mut self) -> Result<T, Error> {
        let (value, next) = self.deque.take(self.pos)?;
        self.pos = next;
        Ok(value)
    }

    /// A read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, CAP> {
        Cursor::new(&*self.deque, self.pos)
    }
}

impl<'a, T, const CAP: usize> fmt::Debug for CursorMut<'a, T, CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.pos).finish()
    }
}
