//! Detectors for the special waiting hands that the meld checkers cannot
//! see: their winning shapes are not built from melds at all.

use crate::{BAN, EAST, FA, Hand, NORTH, SOUTH, Suit, Tile, WEST, ZHONG};

/// Determines whether a 13-tile hand is waiting for the Seven Pairs win
/// (six pairs plus a tile whose partner completes the seventh), returning
/// the waited tile. If `allow_repeat` is true a pair may appear twice, as
/// all four copies of a tile.
///
/// A hand with more than one unpaired tile is not waiting and returns
/// `None`.
pub fn seven_pairs(hand: &Hand, allow_repeat: bool) -> Option<Tile> {
    if hand.len() != 13 {
        return None;
    }

    let mut wait = None;
    for (t, n) in hand.to_counter().iter() {
        match n {
            2 => {}
            4 if allow_repeat => {}
            1 | 3 => {
                if wait.is_some() {
                    return None;
                }
                wait = Some(t);
            }
            _ => return None,
        }
    }

    // 13 is odd, so some tile always has an odd count
    Some(wait.expect("no odd count in a 13-tile hand"))
}

const ORPHANS: [Tile; 13] = [
    Tile::new(Suit::Bamboo, 1),
    Tile::new(Suit::Bamboo, 9),
    Tile::new(Suit::Coin, 1),
    Tile::new(Suit::Coin, 9),
    Tile::new(Suit::Wan, 1),
    Tile::new(Suit::Wan, 9),
    Tile::new(Suit::Honour, EAST),
    Tile::new(Suit::Honour, SOUTH),
    Tile::new(Suit::Honour, WEST),
    Tile::new(Suit::Honour, NORTH),
    Tile::new(Suit::Honour, ZHONG),
    Tile::new(Suit::Honour, FA),
    Tile::new(Suit::Honour, BAN),
];

/// The waiting state of a Thirteen Orphans hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThirteenWait {
    /// One of each orphan is held; any of the thirteen completes the pair.
    Pure,
    /// One orphan is doubled and this one is absent; only it wins.
    Missing(Tile),
}

/// Determines whether a 13-tile hand is waiting for the Thirteen Orphans
/// win (one of every terminal and honour, with one of them doubled to
/// become the pair). Returns `None` for any other shape.
pub fn thirteen_orphans(hand: &Hand) -> Option<ThirteenWait> {
    if hand.len() != ORPHANS.len() {
        return None;
    }
    if !hand.iter().all(|t| ORPHANS.contains(t)) {
        return None;
    }

    let cnt = hand.to_counter();
    let mut missing = None;
    let mut doubled = None;
    for &t in &ORPHANS {
        match cnt.get(t) {
            1 => {}
            0 if missing.is_none() => missing = Some(t),
            2 if doubled.is_none() => doubled = Some(t),
            _ => return None,
        }
    }

    // 13 orphan tiles over 13 kinds: a gap always pairs with a double
    match (doubled, missing) {
        (None, None) => Some(ThirteenWait::Pure),
        (Some(_), Some(t)) => Some(ThirteenWait::Missing(t)),
        _ => None,
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

    #[test]
    fn test_seven_pairs() {
        let waiting = h("b1 b1 b2 b2 c3 c3 c4 c4 w5 w5 he he hz");
        assert_eq!(seven_pairs(&waiting, false), Some(t("hz")));

        // triple counts as a pair plus the waited tile
        let triple = h("b1 b1 b2 b2 c3 c3 c4 c4 w5 w5 he he he");
        assert_eq!(seven_pairs(&triple, false), Some(t("he")));
    }

    #[test]
    fn test_seven_pairs_repeat() {
        let repeated = h("b1 b1 b1 b1 b2 b2 c3 c3 c4 c4 w5 w5 he");
        assert_eq!(seven_pairs(&repeated, true), Some(t("he")));
        assert_eq!(seven_pairs(&repeated, false), None);
    }

    #[test]
    fn test_seven_pairs_not_waiting() {
        // two singles
        let hand = h("b1 b1 b2 b2 c3 c3 c4 c4 w5 w5 he hz hf");
        assert_eq!(seven_pairs(&hand, true), None);

        // wrong size
        assert_eq!(seven_pairs(&h("b1 b1"), true), None);
    }

    #[test]
    fn test_thirteen_orphans_pure() {
        let pure = h("b1 b9 c1 c9 w1 w9 he hs hw hn hz hf hb");
        assert_eq!(thirteen_orphans(&pure), Some(ThirteenWait::Pure));
        // order does not matter
        let shuffled = h("hb hz b9 c1 w9 he hs b1 hw hn c9 w1 hf");
        assert_eq!(thirteen_orphans(&shuffled), Some(ThirteenWait::Pure));
    }

    #[test]
    fn test_thirteen_orphans_missing() {
        // doubled hb, missing b9; the doubled tile sorts after the gap
        let hand = h("b1 c1 c9 w1 w9 he hs hw hn hz hf hb hb");
        assert_eq!(thirteen_orphans(&hand), Some(ThirteenWait::Missing(t("b9"))));

        // doubled b1, missing hb; the doubled tile sorts before the gap
        let hand = h("b1 b1 b9 c1 c9 w1 w9 he hs hw hn hz hf");
        assert_eq!(thirteen_orphans(&hand), Some(ThirteenWait::Missing(t("hb"))));
    }

    #[test]
    fn test_thirteen_orphans_not_waiting() {
        // a non-orphan tile
        let hand = h("b1 b9 c1 c9 w1 w9 he hs hw hn hz hf b5");
        assert_eq!(thirteen_orphans(&hand), None);

        // two missing, one tripled
        let hand = h("b1 b1 b1 c1 c9 w1 w9 he hs hw hn hz hf");
        assert_eq!(thirteen_orphans(&hand), None);

        // two doubled, two missing
        let hand = h("b1 b1 c1 c1 w1 w9 he hs hw hn hz hf hb");
        assert_eq!(thirteen_orphans(&hand), None);

        // wrong size
        assert_eq!(thirteen_orphans(&h("b1")), None);
    }
}
