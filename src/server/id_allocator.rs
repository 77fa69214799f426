//! Hands out ranges of net-object IDs so boards never collide with each other.
use log::{debug, warn};

use super::board_world::BoardError;

/// Identifier the client uses to track and interpolate one net object.
pub type NetId = u32;

/// Default size of the ID space shared by all boards.
pub const DEFAULT_ID_LIMIT: NetId = 1 << 16;

/// A contiguous run of IDs owned by one board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdBlock {
    start: NetId,
    len: u32,
}

impl IdBlock {
    #[must_use]
    pub fn start(self) -> NetId {
        self.start
    }

    #[must_use]
    pub fn len(self) -> u32 {
        self.len
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn iter(self) -> impl Iterator<Item = NetId> {
        self.start..self.start + self.len
    }

    fn overlaps(self, other: IdBlock) -> bool {
        self.start < other.start + other.len && other.start < self.start + self.len
    }
}

/// First-fit allocator over `[0, limit)`. Released blocks are reused before fresh IDs.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: NetId,
    limit: NetId,
    free: Vec<IdBlock>,
}

impl IdAllocator {
    #[must_use]
    pub fn new(limit: NetId) -> Self {
        Self {
            next: 0,
            limit,
            free: Vec::new(),
        }
    }

    /// Reserves `len` consecutive IDs.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::IdsExhausted`] if no free run of `len` IDs is left.
    pub fn reserve(&mut self, len: u32) -> Result<IdBlock, BoardError> {
        if let Some(i) = self.free.iter().position(|b| b.len >= len) {
            let found = self.free.swap_remove(i);
            if found.len > len {
                self.free.push(IdBlock {
                    start: found.start + len,
                    len: found.len - len,
                });
            }
            let block = IdBlock {
                start: found.start,
                len,
            };
            debug!("Reusing ids {}..{}", block.start, block.start + len);
            return Ok(block);
        }
        match self.next.checked_add(len) {
            Some(end) if end <= self.limit => {
                let block = IdBlock {
                    start: self.next,
                    len,
                };
                self.next = end;
                Ok(block)
            }
            _ => {
                warn!(
                    "Out of net ids: {} requested, {} never used",
                    len,
                    self.limit - self.next
                );
                Err(BoardError::IdsExhausted)
            }
        }
    }

    /// Returns a block for reuse. Releasing a block twice is ignored.
    pub fn release(&mut self, block: IdBlock) {
        if block.is_empty()
            || block.start + block.len > self.next
            || self.free.iter().any(|b| b.overlaps(block))
        {
            warn!("Ignoring release of ids already free: {:?}", block);
            return;
        }
        if block.start + block.len == self.next {
            self.next = block.start;
        } else {
            self.free.push(block);
        }
    }

    /// Number of IDs that can still be reserved.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.limit - self.next + self.free.iter().map(|b| b.len).sum::<u32>()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_never_overlap() {
        let mut ids = IdAllocator::new(1000);
        let a = ids.reserve(100).unwrap();
        let b = ids.reserve(100).unwrap();
        let c = ids.reserve(50).unwrap();
        assert!(!a.overlaps(b));
        assert!(!b.overlaps(c));
        assert!(!a.overlaps(c));
        assert_eq!(ids.available(), 750);
    }

    #[test]
    fn released_blocks_are_reused() {
        let mut ids = IdAllocator::new(1000);
        let a = ids.reserve(100).unwrap();
        let _b = ids.reserve(100).unwrap();
        ids.release(a);
        let c = ids.reserve(60).unwrap();
        assert_eq!(c.start(), a.start());
        let d = ids.reserve(40).unwrap();
        assert_eq!(d.start(), 60);
        assert!(!c.overlaps(d));
    }

    #[test]
    fn releasing_the_newest_block_rewinds() {
        let mut ids = IdAllocator::new(1000);
        let _a = ids.reserve(10).unwrap();
        let b = ids.reserve(10).unwrap();
        ids.release(b);
        assert_eq!(ids.reserve(10).unwrap().start(), 10);
    }

    #[test]
    fn double_release_is_ignored() {
        let mut ids = IdAllocator::new(1000);
        let a = ids.reserve(10).unwrap();
        let _b = ids.reserve(10).unwrap();
        ids.release(a);
        ids.release(a);
        assert_eq!(ids.available(), 990);
    }

    #[test]
    fn double_release_of_the_newest_block_is_ignored() {
        let mut ids = IdAllocator::new(1000);
        let _a = ids.reserve(10).unwrap();
        let b = ids.reserve(10).unwrap();
        ids.release(b);
        ids.release(b);
        assert_eq!(ids.available(), 990);
        let c = ids.reserve(10).unwrap();
        let d = ids.reserve(10).unwrap();
        assert!(!c.overlaps(d));
        assert_eq!((c.start(), d.start()), (10, 20));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut ids = IdAllocator::new(250);
        let _a = ids.reserve(200).unwrap();
        assert!(matches!(ids.reserve(51), Err(BoardError::IdsExhausted)));
        assert!(ids.reserve(50).is_ok());
        assert!(matches!(ids.reserve(1), Err(BoardError::IdsExhausted)));
    }

    #[test]
    fn block_indexing() {
        let mut ids = IdAllocator::new(100);
        let _ = ids.reserve(5).unwrap();
        let block = ids.reserve(3).unwrap();
        assert_eq!(block.start(), 5);
        assert_eq!(block.len(), 3);
        assert_eq!(block.iter().collect::<Vec<_>>(), vec![5, 6, 7]);
    }
}
