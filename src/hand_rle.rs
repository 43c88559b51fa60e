//! A run-length encoded tile collection.

use std::fmt;

use anyhow::{Result, ensure};

use crate::{CountEntry, Counter, Hand, Tile};

/// A sorted run-length encoding of a hand: one [`CountEntry`] per distinct
/// tile. Like [`Counter`] it probes each distinct tile once, but the dense
/// sorted vector locates neighbouring chi tiles with a binary search instead
/// of map lookups and clones with a single allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandRLE {
    es: Vec<CountEntry>,
    n: usize,
}

impl HandRLE {
    /// Builds from a list of entries, which is sorted in place. Fails on an
    /// invalid tile, a zero count or a duplicated tile.
    pub fn new(mut es: Vec<CountEntry>) -> Result<HandRLE> {
        es.sort();
        let mut n = 0usize;
        for (i, e) in es.iter().enumerate() {
            ensure!(e.tile.valid(), "invalid tile: {:?}", e.tile);
            ensure!(e.count > 0, "zero count for tile {}", e.tile.code());
            if i > 0 {
                ensure!(es[i - 1].tile != e.tile, "duplicate entry for tile {}", e.tile.code());
            }
            n += e.count as usize;
        }
        Ok(HandRLE { es, n })
    }

    /// Builds from a counter. Cannot fail since counters only hold positive
    /// counts of distinct tiles.
    pub fn from_counter(cnt: &Counter) -> HandRLE {
        HandRLE { es: cnt.entries(), n: cnt.len() }
    }

    pub fn from_hand(hand: &Hand) -> HandRLE {
        HandRLE::from_counter(&hand.to_counter())
    }

    /// The number of tiles, with multiplicity.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The distinct entries, in tile order.
    pub fn entries(&self) -> &[CountEntry] {
        &self.es
    }

    /// The count for a tile, zero if absent.
    pub fn get(&self, tile: Tile) -> u16 {
        match self.es.binary_search_by_key(&tile, |e| e.tile) {
            Ok(i) => self.es[i].count,
            Err(_) => 0,
        }
    }

    /// Expands back into a sorted [`Hand`].
    pub fn to_hand(&self) -> Hand {
        let mut tiles = Vec::with_capacity(self.n);
        for e in &self.es {
            tiles.extend(std::iter::repeat_n(e.tile, e.count as usize));
        }
        Hand::from(tiles)
    }

    /// A space-efficient encoding, entry by entry: the tile byte followed by
    /// its count byte. Equal multisets encode identically.
    ///
    /// # Panics
    /// Panics if any count exceeds 0x7f.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * self.es.len());
        for e in &self.es {
            assert!(e.count <= 0x7f, "count too large to marshal: {}", e.count);
            out.push(e.tile.marshal());
            out.push(e.count as u8);
        }
        out
    }

    /// Attempts to remove a peng of the tile at entry index `i`. Returns
    /// `None` if the count is too low or the tile cannot meld.
    pub fn try_peng_at(&self, i: usize) -> Option<HandRLE> {
        self.try_meld_run_at(i, 3)
    }

    /// Attempts to remove a pair of the tile at entry index `i`. See
    /// [`HandRLE::try_peng_at`].
    pub fn try_pair_at(&self, i: usize) -> Option<HandRLE> {
        self.try_meld_run_at(i, 2)
    }

    fn try_meld_run_at(&self, i: usize, n: u16) -> Option<HandRLE> {
        let e = self.es.get(i)?;
        if !e.tile.can_meld() || e.count < n {
            return None;
        }
        let mut next = self.clone();
        next.decrement_at(i, n);
        Some(next)
    }

    /// Attempts to remove a chi starting at the tile at entry index `i`,
    /// taking one each of that tile and the next two values in the same suit.
    pub fn try_chi_at(&self, i: usize) -> Option<HandRLE> {
        let e1 = self.es.get(i)?;
        let t1 = e1.tile;
        if !t1.is_basic() || t1.value > 7 {
            return None;
        }

        let i2 = self
            .es
            .binary_search_by_key(&Tile::new(t1.suit, t1.value + 1), |e| e.tile)
            .ok()?;
        let i3 = self
            .es
            .binary_search_by_key(&Tile::new(t1.suit, t1.value + 2), |e| e.tile)
            .ok()?;

        let mut next = self.clone();
        // highest index first, so removals do not shift the others
        next.decrement_at(i3, 1);
        next.decrement_at(i2, 1);
        next.decrement_at(i, 1);
        Some(next)
    }

    fn decrement_at(&mut self, i: usize, by: u16) {
        assert!(self.es[i].count >= by, "decrement below zero");
        self.es[i].count -= by;
        if self.es[i].count == 0 {
            self.es.remove(i);
        }
        self.n -= by as usize;
    }
}

impl fmt::Display for HandRLE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hand())
    }
}
