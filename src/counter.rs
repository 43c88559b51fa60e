//! A tile multiset keyed by distinct tile.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, ensure};

use crate::{Hand, Tile};

/// A distinct tile and how many of it a collection holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountEntry {
    pub tile: Tile,
    pub count: u16,
}

/// A map of distinct tiles to their counts. Duplicate-heavy hands probe
/// faster here than in a [`Hand`] since each distinct tile is tried once.
///
/// Backed by an ordered map so that iteration, [`Counter::entries`] and
/// [`Counter::marshal`] are deterministic without an explicit sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    counts: BTreeMap<Tile, usize>,
    n: usize,
}

impl Counter {
    pub fn new() -> Self {
        Counter::default()
    }

    /// Builds a counter from (tile, count) pairs. Counts for repeated tiles
    /// accumulate; a zero count is dropped.
    pub fn from_entries<I: IntoIterator<Item = (Tile, i64)>>(entries: I) -> Result<Counter> {
        let mut counts: BTreeMap<Tile, usize> = BTreeMap::new();
        let mut n = 0usize;
        for (tile, count) in entries {
            ensure!(tile.valid(), "invalid tile: {:?}", tile);
            ensure!(count >= 0, "negative count for tile {}: {}", tile.code(), count);
            if count == 0 {
                continue;
            }
            *counts.entry(tile).or_insert(0) += count as usize;
            n += count as usize;
        }
        Ok(Counter { counts, n })
    }

    /// Builds a counter holding the same tiles as the hand. The result does
    /// not alias the hand.
    pub fn from_hand(hand: &Hand) -> Counter {
        let mut counts: BTreeMap<Tile, usize> = BTreeMap::new();
        for &t in hand {
            *counts.entry(t).or_insert(0) += 1;
        }
        Counter { counts, n: hand.len() }
    }

    /// The number of tiles counted, with multiplicity.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The count for a tile, zero if absent.
    pub fn get(&self, tile: Tile) -> usize {
        self.counts.get(&tile).copied().unwrap_or(0)
    }

    /// Returns true if all the counted tiles are valid.
    pub fn valid(&self) -> bool {
        self.counts.keys().all(Tile::valid)
    }

    /// The distinct tiles and their counts, in tile order.
    pub fn entries(&self) -> Vec<CountEntry> {
        self.counts
            .iter()
            .map(|(&tile, &count)| CountEntry { tile, count: count as u16 })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, usize)> + '_ {
        self.counts.iter().map(|(&t, &c)| (t, c))
    }

    /// Expands the counter back into a sorted [`Hand`].
    pub fn to_hand(&self) -> Hand {
        let mut tiles = Vec::with_capacity(self.n);
        for (&t, &c) in &self.counts {
            tiles.extend(std::iter::repeat_n(t, c));
        }
        Hand::from(tiles)
    }

    /// A space-efficient encoding: for each distinct tile in order, the tile
    /// byte followed by its count byte. Deterministic for equal multisets.
    ///
    /// # Panics
    /// Panics if any count exceeds 0x7f. Legal hands count at most 4 of a
    /// tile.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * self.counts.len());
        for (&t, &c) in &self.counts {
            assert!(c <= 0x7f, "count too large to marshal: {}", c);
            out.push(t.marshal());
            out.push(c as u8);
        }
        out
    }

    /// Attempts to remove a peng of the given tile, returning the reduced
    /// counter. Returns `None` if there are fewer than three or the tile
    /// cannot meld.
    pub fn try_peng(&self, t: Tile) -> Option<Counter> {
        self.try_meld_run(t, 3)
    }

    /// Attempts to remove a pair of the given tile. See [`Counter::try_peng`].
    pub fn try_pair(&self, t: Tile) -> Option<Counter> {
        self.try_meld_run(t, 2)
    }

    fn try_meld_run(&self, t: Tile, n: usize) -> Option<Counter> {
        if !t.can_meld() || self.get(t) < n {
            return None;
        }
        let mut next = self.clone();
        next.decrement(t, n);
        Some(next)
    }

    /// Attempts to remove a chi starting at the given tile, decrementing it
    /// and the next two values in the same suit.
    pub fn try_chi(&self, t1: Tile) -> Option<Counter> {
        if !t1.is_basic() || t1.value > 7 {
            return None;
        }
        let t2 = Tile::new(t1.suit, t1.value + 1);
        let t3 = Tile::new(t1.suit, t1.value + 2);
        if self.get(t1) < 1 || self.get(t2) < 1 || self.get(t3) < 1 {
            return None;
        }
        let mut next = self.clone();
        next.decrement(t1, 1);
        next.decrement(t2, 1);
        next.decrement(t3, 1);
        Some(next)
    }

    fn decrement(&mut self, t: Tile, by: usize) {
        let c = self.counts.get_mut(&t).expect("decrement of absent tile");
        assert!(*c >= by, "decrement below zero");
        *c -= by;
        if *c == 0 {
            self.counts.remove(&t);
        }
        self.n -= by;
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hand())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Hand {
        Hand::from_string(s).unwrap()
    }

    fn t(s: &str) -> Tile {
        Tile::from_string(s).unwrap()
    }

    fn c(s: &str) -> Counter {
        Counter::from_hand(&h(s))
    }

    #[test]
    fn test_from_hand() {
        let cnt = c("b1 b1 b2 he");
        assert_eq!(cnt.len(), 4);
        assert_eq!(cnt.get(t("b1")), 2);
        assert_eq!(cnt.get(t("b2")), 1);
        assert_eq!(cnt.get(t("b3")), 0);
    }

    #[test]
    fn test_from_entries() {
        let cnt = Counter::from_entries([(t("b1"), 2), (t("b2"), 0), (t("b1"), 1)]).unwrap();
        assert_eq!(cnt.get(t("b1")), 3);
        assert_eq!(cnt.get(t("b2")), 0);
        assert_eq!(cnt.len(), 3);

        assert!(Counter::from_entries([(t("b1"), -1)]).is_err());
        assert!(Counter::from_entries([(Tile::new(crate::Suit::Bamboo, 0), 1)]).is_err());
    }

    #[test]
    fn test_to_hand_sorted() {
        let cnt = c("c1 b2 b1 he b1");
        assert_eq!(cnt.to_hand(), h("b1 b1 b2 c1 he"));
    }

    #[test]
    fn test_marshal_deterministic() {
        assert_eq!(c("b1 c2 b1 he").marshal(), c("he b1 c2 b1").marshal());
        assert_ne!(c("b1 b1").marshal(), c("b1").marshal());
    }

    #[test]
    fn test_try_peng_pair() {
        let cnt = c("b1 b1 b1 b2");
        let next = cnt.try_peng(t("b1")).unwrap();
        assert_eq!(next.get(t("b1")), 0);
        assert_eq!(next.len(), 1);
        assert!(cnt.try_peng(t("b2")).is_none());
        // receiver untouched
        assert_eq!(cnt.get(t("b1")), 3);

        let next = cnt.try_pair(t("b1")).unwrap();
        assert_eq!(next.get(t("b1")), 1);

        assert!(c("f1 f1 f1").try_peng(t("f1")).is_none());
        assert!(c("f1 f1").try_pair(t("f1")).is_none());
    }

    #[test]
    fn test_try_chi() {
        // one of each is consumed, the spare b2 and b4 stay
        let cnt = c("b1 b2 b2 b3 b4");
        let next = cnt.try_chi(t("b1")).unwrap();
        assert_eq!(next.to_hand(), h("b2 b4"));

        assert!(cnt.try_chi(t("b3")).is_none());
        assert!(c("b8 b9 c1").try_chi(t("b8")).is_none());
        assert!(c("he hs hw").try_chi(t("he")).is_none());
    }

    #[test]
    fn test_entries_ordered() {
        let es = c("c1 b1 he b1").entries();
        assert_eq!(
            es,
            vec![
                CountEntry { tile: t("b1"), count: 2 },
                CountEntry { tile: t("c1"), count: 1 },
                CountEntry { tile: t("he"), count: 1 },
            ]
        );
    }
}
