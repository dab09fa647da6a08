//! Sprite id allocation.

use crate::config::DEFAULT_FIRST_SPRITE_ID;
use crate::{Error, Result};

/// Hands out consecutive database ids for one compile run.
///
/// Ids never repeat: once `u32::MAX` has been handed out every further
/// allocation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new(first: u32) -> Self {
        Self {
            next: u64::from(first),
        }
    }

    /// Take the next id.
    #[inline]
    pub fn allocate(&mut self) -> Result<u32> {
        let id = u32::try_from(self.next).map_err(|_| Error::IdsExhausted)?;
        self.next += 1;
        Ok(id)
    }

    /// The id the next call to [`allocate`](Self::allocate) returns, if any.
    #[inline]
    pub fn peek(&self) -> Option<u32> {
        u32::try_from(self.next).ok()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_SPRITE_ID)
    }
}
