//! Price ladder - circular, price-ordered rings of active levels.
//!
//! Level nodes live in a fixed pool and link to their neighbours by handle,
//! one ring per side. Traversing forward from the best level moves away from
//! the touch: descending prices for bids, ascending for asks. A level exists
//! exactly while at least one order rests at its price; lookup by exact
//! price goes through a hash map so distinct prices can never alias.

use rustc_hash::FxHashMap;

use crate::pool::{Pool, PoolError, PoolIndex, NIL_INDEX};
use crate::types::{Price, Side, NIL_PRICE};

/// One active price level: the aggregation point for every order resting at
/// `price` on `side`.
#[derive(Clone, Copy, Debug)]
pub struct PriceLevel {
    pub side: Side,
    pub price: Price,
    /// Oldest resting order at this price (head of the order FIFO ring).
    pub first_order: PoolIndex,
    pub prev: PoolIndex,
    pub next: PoolIndex,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self {
            side: Side::Invalid,
            price: NIL_PRICE,
            first_order: NIL_INDEX,
            prev: NIL_INDEX,
            next: NIL_INDEX,
        }
    }
}

/// Both sides' level rings plus the exact-price lookup map.
pub struct Ladder {
    levels: Pool<PriceLevel>,
    by_price: FxHashMap<Price, PoolIndex>,
    best_bid: PoolIndex,
    best_ask: PoolIndex,
}

impl Ladder {
    pub fn new(max_levels: u32) -> Self {
        Self {
            levels: Pool::new(max_levels),
            by_price: FxHashMap::with_capacity_and_hasher(max_levels as usize, Default::default()),
            best_bid: NIL_INDEX,
            best_ask: NIL_INDEX,
        }
    }

    /// Handle of the best (touch) level on a side, or `NIL_INDEX`.
    #[inline]
    pub fn best(&self, side: Side) -> PoolIndex {
        match side {
            Side::Buy => self.best_bid,
            Side::Sell => self.best_ask,
            Side::Invalid => NIL_INDEX,
        }
    }

    /// Touch price on a side, if any orders rest there.
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<Price> {
        let best = self.best(side);
        (best != NIL_INDEX).then(|| self.levels.get(best).price)
    }

    /// Handle of the level at an exact price, or `NIL_INDEX`.
    #[inline]
    pub fn lookup(&self, price: Price) -> PoolIndex {
        self.by_price.get(&price).copied().unwrap_or(NIL_INDEX)
    }

    #[inline]
    pub fn level(&self, index: PoolIndex) -> &PriceLevel {
        self.levels.get(index)
    }

    #[inline]
    pub fn level_mut(&mut self, index: PoolIndex) -> &mut PriceLevel {
        self.levels.get_mut(index)
    }

    /// Number of live levels across both sides.
    #[inline]
    pub fn level_count(&self) -> u32 {
        self.levels.in_use()
    }

    /// Allocate a level for a price with its first resting order and splice
    /// it into its side's ring at the position its price ranks.
    ///
    /// O(distinct levels on the side): walks outward from the best level to
    /// the first level the new price beats and splices in front of it,
    /// wrapping to the ring tail when every existing level ranks better.
    pub fn insert(
        &mut self,
        side: Side,
        price: Price,
        first_order: PoolIndex,
    ) -> Result<PoolIndex, PoolError> {
        debug_assert!(self.lookup(price) == NIL_INDEX, "level already exists");

        let new_level = self.levels.alloc(PriceLevel {
            side,
            price,
            first_order,
            prev: NIL_INDEX,
            next: NIL_INDEX,
        })?;
        self.by_price.insert(price, new_level);

        let best = self.best(side);
        if best == NIL_INDEX {
            // first level on this side: a ring of one
            self.levels.get_mut(new_level).prev = new_level;
            self.levels.get_mut(new_level).next = new_level;
            self.set_best(side, new_level);
        } else if Self::outranks(side, price, self.levels.get(best).price) {
            self.splice_before(best, new_level);
            self.set_best(side, new_level);
        } else {
            let mut current = self.levels.get(best).next;
            while current != best && !Self::outranks(side, price, self.levels.get(current).price) {
                current = self.levels.get(current).next;
            }
            self.splice_before(current, new_level);
        }

        Ok(new_level)
    }

    /// Unlink a level from its ring, clear its price entry, and free it.
    /// The caller guarantees its order list is already empty.
    pub fn remove(&mut self, index: PoolIndex) {
        let level = *self.levels.get(index);

        if level.next == index {
            // last level on this side
            self.set_best(level.side, NIL_INDEX);
        } else {
            self.levels.get_mut(level.prev).next = level.next;
            self.levels.get_mut(level.next).prev = level.prev;
            if self.best(level.side) == index {
                self.set_best(level.side, level.next);
            }
        }

        self.by_price.remove(&level.price);
        self.levels.free(index);
    }

    /// Free every level on both sides and reset the touch handles.
    pub fn clear(&mut self) {
        for side in [Side::Buy, Side::Sell] {
            let best = self.best(side);
            if best == NIL_INDEX {
                continue;
            }
            let mut current = best;
            loop {
                let next = self.levels.get(current).next;
                self.levels.free(current);
                if next == best {
                    break;
                }
                current = next;
            }
            self.set_best(side, NIL_INDEX);
        }
        self.by_price.clear();
    }

    #[inline]
    fn set_best(&mut self, side: Side, index: PoolIndex) {
        match side {
            Side::Buy => self.best_bid = index,
            Side::Sell => self.best_ask = index,
            Side::Invalid => debug_assert!(false, "level with invalid side"),
        }
    }

    /// Side-specific price comparator: does `a` rank closer to the touch
    /// than `b`?
    #[inline]
    fn outranks(side: Side, a: Price, b: Price) -> bool {
        match side {
            Side::Buy => a > b,
            Side::Sell => a < b,
            Side::Invalid => false,
        }
    }

    #[inline]
    fn splice_before(&mut self, at: PoolIndex, new_level: PoolIndex) {
        let prev = self.levels.get(at).prev;
        self.levels.get_mut(new_level).prev = prev;
        self.levels.get_mut(new_level).next = at;
        self.levels.get_mut(prev).next = new_level;
        self.levels.get_mut(at).prev = new_level;
    }
}

impl std::fmt::Debug for Ladder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ladder")
            .field("levels", &self.level_count())
            .field("best_bid", &self.best_price(Side::Buy))
            .field("best_ask", &self.best_price(Side::Sell))
            .finish()
    }
}
