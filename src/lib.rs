//! Types and tools for working with hands of mahjong tiles.
//!
//! The crate contains data structures that represent tiles and collections of
//! tiles, hand checkers that find the optimal grouping of a hand into melds
//! and pairs, a wait deriver and detectors for the special waiting hands.
//!
//! With the exception of in-place sorting during construction, the collection
//! types are persistent: their methods never mutate the receiver, they return
//! new values instead. The checkers rely on this to explore many alternative
//! futures from the same point without corrupting sibling branches.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use anyhow::{Result, bail, ensure};

pub mod counter;
pub mod group;
pub mod hand_rle;
pub mod solver;
pub mod special;
pub mod wait;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use counter::{CountEntry, Counter};
pub use group::Group;
pub use hand_rle::HandRLE;

/// The suit of a [`Tile`]. There are three basic suits, Bamboo, Coin and Wan,
/// as well as the Honour and Flower suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Suit {
    Bamboo = 1,
    Coin = 2,
    Wan = 3,
    Honour = 4,
    Flower = 5,
}

impl Suit {
    fn from_bits(b: u8) -> Option<Suit> {
        match b {
            1 => Some(Suit::Bamboo),
            2 => Some(Suit::Coin),
            3 => Some(Suit::Wan),
            4 => Some(Suit::Honour),
            5 => Some(Suit::Flower),
            _ => None,
        }
    }
}

/// Honour values. Only valid for [`Suit::Honour`].
pub const EAST: u8 = 10;
pub const SOUTH: u8 = 11;
pub const WEST: u8 = 12;
pub const NORTH: u8 = 13;
pub const ZHONG: u8 = 14;
pub const FA: u8 = 15;
pub const BAN: u8 = 16;

/// Flower values are `FLOWER_BASE + 1 ..= FLOWER_BASE + 8`. Keeping the flag
/// bit outside the low five bits lets the one-byte encoding round-trip.
pub const FLOWER_BASE: u8 = 32;

const UNI_TILE_BACK: char = '\u{1F02B}';
const UNI_TILE_EAST: u32 = 0x1F000;
const UNI_TILE_WAN1: u32 = 0x1F007;
const UNI_TILE_BAMBOO1: u32 = 0x1F010;
const UNI_TILE_COIN1: u32 = 0x1F019;
const UNI_TILE_FLOWER1: u32 = 0x1F022;

/// A single mahjong tile, comprising a [`Suit`] and a face value.
///
/// The value range depends on the suit: 1-9 for the basic suits, [`EAST`]
/// through [`BAN`] for honours, and `FLOWER_BASE + 1 ..= FLOWER_BASE + 8` for
/// flowers. Constructing an out-of-range `Tile` is possible; the checkers
/// assume validity and callers must test [`Tile::valid`] first.
///
/// The derived ordering compares suit first, then value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    pub suit: Suit,
    pub value: u8,
}

impl Tile {
    pub const fn new(suit: Suit, value: u8) -> Self {
        Tile { suit, value }
    }

    /// Returns true if the tile data is valid and may be used in the
    /// algorithms.
    pub fn valid(&self) -> bool {
        match self.suit {
            Suit::Bamboo | Suit::Coin | Suit::Wan => (1..=9).contains(&self.value),
            Suit::Honour => (EAST..=BAN).contains(&self.value),
            Suit::Flower => (FLOWER_BASE + 1..=FLOWER_BASE + 8).contains(&self.value),
        }
    }

    /// Returns true if the tile may participate in melds or pairs.
    pub fn can_meld(&self) -> bool {
        self.valid() && self.suit != Suit::Flower
    }

    /// Returns true if the tile belongs to one of the numbered suits.
    pub fn is_basic(&self) -> bool {
        self.valid() && self.suit != Suit::Flower && self.suit != Suit::Honour
    }

    /// Returns true if the tile is a basic tile with value 1 or 9.
    pub fn is_terminal(&self) -> bool {
        self.is_basic() && (self.value == 1 || self.value == 9)
    }

    /// Packs the tile into a single byte: the suit in the high three bits,
    /// the low five bits of the value in the rest. The working representation
    /// stays two bytes so suit and value can be read without masking.
    pub fn marshal(&self) -> u8 {
        ((self.suit as u8) << 5) | (self.value & 31)
    }

    /// The inverse of [`Tile::marshal`]. Returns `None` if the suit bits do
    /// not name a suit; an in-range suit with an out-of-range value decodes to
    /// a `Tile` that fails [`Tile::valid`], as with construction.
    pub fn unmarshal(b: u8) -> Option<Tile> {
        let suit = Suit::from_bits(b >> 5)?;
        let mut value = b & 31;
        if suit == Suit::Flower {
            value |= FLOWER_BASE;
        }
        Some(Tile { suit, value })
    }

    /// Parse a 2-character tile representation.
    ///
    /// The first character is the suit, one of "bcwhf" (Bamboo, Coin, Wan,
    /// Honour, Flower). The second is the value: a digit 1-9 for the basic
    /// suits, one of "eswnzfb" (East, South, West, North, Zhong, Fa, Ban) for
    /// honours, a digit 1-8 for flowers. Case-insensitive.
    pub fn from_string(s: &str) -> Result<Self> {
        let b = s.as_bytes();
        ensure!(b.len() == 2, "tile representation must be 2 characters long: {:?}", s);

        let suit = match b[0].to_ascii_lowercase() {
            b'b' => Suit::Bamboo,
            b'c' => Suit::Coin,
            b'w' => Suit::Wan,
            b'h' => Suit::Honour,
            b'f' => Suit::Flower,
            other => bail!("unrecognised suit: {}", other as char),
        };

        let value = match suit {
            Suit::Bamboo | Suit::Coin | Suit::Wan => {
                let v = b[1].wrapping_sub(b'0');
                ensure!((1..=9).contains(&v), "invalid value for basic tile: {}", b[1] as char);
                v
            }
            Suit::Honour => match b[1].to_ascii_lowercase() {
                b'e' => EAST,
                b's' => SOUTH,
                b'w' => WEST,
                b'n' => NORTH,
                b'z' => ZHONG,
                b'f' => FA,
                b'b' => BAN,
                other => bail!("invalid value for honour suit: {}", other as char),
            },
            Suit::Flower => {
                let v = b[1].wrapping_sub(b'0');
                ensure!((1..=8).contains(&v), "invalid value for flower tile: {}", b[1] as char);
                v | FLOWER_BASE
            }
        };

        Ok(Tile { suit, value })
    }

    /// The 2-character ASCII representation, the inverse of
    /// [`Tile::from_string`]. Returns "??" for invalid tiles.
    pub fn code(&self) -> String {
        if !self.valid() {
            return "??".to_string();
        }
        let suit = match self.suit {
            Suit::Bamboo => 'b',
            Suit::Coin => 'c',
            Suit::Wan => 'w',
            Suit::Honour => 'h',
            Suit::Flower => 'f',
        };
        match self.suit {
            Suit::Honour => {
                let v = match self.value {
                    EAST => 'e',
                    SOUTH => 's',
                    WEST => 'w',
                    NORTH => 'n',
                    ZHONG => 'z',
                    FA => 'f',
                    _ => 'b',
                };
                format!("{}{}", suit, v)
            }
            Suit::Flower => format!("{}{}", suit, self.value - FLOWER_BASE),
            _ => format!("{}{}", suit, self.value),
        }
    }
}

impl fmt::Display for Tile {
    /// Renders the tile as a Unicode mahjong glyph, or the tile back for an
    /// invalid tile. One glyph requires 4 bytes in utf-8; use
    /// [`Tile::marshal`] for a space-efficient encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid() {
            return write!(f, "{}", UNI_TILE_BACK);
        }

        let (base, offset) = match self.suit {
            Suit::Bamboo => (UNI_TILE_BAMBOO1, self.value - 1),
            Suit::Coin => (UNI_TILE_COIN1, self.value - 1),
            Suit::Wan => (UNI_TILE_WAN1, self.value - 1),
            Suit::Honour => (UNI_TILE_EAST, self.value - EAST),
            Suit::Flower => (UNI_TILE_FLOWER1, self.value - (FLOWER_BASE + 1)),
        };

        let glyph = char::from_u32(base + offset as u32).unwrap_or(UNI_TILE_BACK);
        write!(f, "{}", glyph)
    }
}

/// An ordered sequence of tiles. This is the cheapest collection to build
/// from raw input; the meld probes depend on sorted order, so sort before
/// searching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand(Vec<Tile>);

impl Hand {
    pub fn new() -> Self {
        Hand(Vec::new())
    }

    /// Parse a space-separated string of 2-character tile representations, in
    /// order. Each token is passed to [`Tile::from_string`].
    pub fn from_string(s: &str) -> Result<Hand> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        ensure!(!tokens.is_empty(), "empty hand");
        tokens.iter().map(|t| Tile::from_string(t)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if all the tiles are valid.
    pub fn valid(&self) -> bool {
        self.0.iter().all(Tile::valid)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.0.iter()
    }

    /// Returns this hand in sorted order. The original is never mutated.
    pub fn sorted(&self) -> Hand {
        if self.0.is_sorted() {
            return self.clone();
        }
        let mut tiles = self.0.clone();
        tiles.sort();
        Hand(tiles)
    }

    /// A space-efficient encoding: one byte per tile, in storage order. Sort
    /// first for an encoding that is suitable for comparison and map keys.
    pub fn marshal(&self) -> Vec<u8> {
        self.0.iter().map(Tile::marshal).collect()
    }

    /// The inverse of [`Hand::marshal`].
    ///
    /// # Panics
    /// Panics on a byte that does not encode a tile. This is only ever
    /// applied to encodings the crate itself produced, so a bad byte is an
    /// internal defect, not an input error.
    pub fn unmarshal(bytes: &[u8]) -> Hand {
        bytes
            .iter()
            .map(|&b| Tile::unmarshal(b).expect("corrupt hand encoding"))
            .collect()
    }

    /// The 2-character ASCII representations of the tiles, in storage order.
    pub fn codes(&self) -> Vec<String> {
        self.0.iter().map(Tile::code).collect()
    }

    /// Returns a copy of this hand with the tile at index `i` removed.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    pub fn remove(&self, i: usize) -> Hand {
        assert!(i < self.0.len(), "remove out of bounds: {} len={}", i, self.0.len());
        let mut tiles = self.0.clone();
        tiles.remove(i);
        Hand(tiles)
    }

    /// Returns a copy of this hand with the tile appended to the end.
    pub fn append(&self, t: Tile) -> Hand {
        let mut tiles = Vec::with_capacity(self.0.len() + 1);
        tiles.extend_from_slice(&self.0);
        tiles.push(t);
        Hand(tiles)
    }

    /// Returns the concatenation of this hand and another.
    pub fn concat(&self, other: &Hand) -> Hand {
        let mut tiles = Vec::with_capacity(self.0.len() + other.0.len());
        tiles.extend_from_slice(&self.0);
        tiles.extend_from_slice(&other.0);
        Hand(tiles)
    }

    /// Converts this hand to a [`Counter`]. The result does not alias the
    /// hand.
    pub fn to_counter(&self) -> Counter {
        Counter::from_hand(self)
    }

    /// Splits the hand into sub-hands per suit. If `sorted` is true, the hand
    /// is sorted first, so each sub-hand is sorted too.
    pub fn split(&self, sorted: bool) -> BTreeMap<Suit, Hand> {
        let src = if sorted { self.sorted() } else { self.clone() };
        let mut out: BTreeMap<Suit, Hand> = BTreeMap::new();
        for &t in &src.0 {
            out.entry(t.suit).or_default().0.push(t);
        }
        out
    }

    /// Attempts to form a peng with the tile at index `i`, returning the hand
    /// with those three tiles removed. Returns `None` if no peng exists
    /// there. The hand should be sorted first.
    ///
    /// Removing the last tiles in the hand yields `Some` empty hand, which is
    /// distinct from failure.
    pub fn try_peng_at(&self, i: usize) -> Option<Hand> {
        self.try_meld_run_at(i, 3)
    }

    /// Attempts to form a pair with the tile at index `i`. See
    /// [`Hand::try_peng_at`].
    pub fn try_pair_at(&self, i: usize) -> Option<Hand> {
        self.try_meld_run_at(i, 2)
    }

    fn try_meld_run_at(&self, i: usize, n: usize) -> Option<Hand> {
        assert!(n >= 2, "try_meld_run_at: n < 2");

        let len = self.0.len();
        if len < n || i > len - n {
            return None;
        }

        let t = self.0[i];
        if !t.can_meld() {
            return None;
        }

        // relies on sorted hand
        if self.0[i + 1..i + n].iter().any(|&u| u != t) {
            return None;
        }

        if len == n {
            return Some(Hand::new());
        }
        let mut tiles = self.0.clone();
        tiles.drain(i..i + n);
        Some(Hand(tiles))
    }

    /// Attempts to form a chi starting with the tile at index `i`, removing
    /// one each of that tile, the next value and the one after in the same
    /// suit. The hand should be sorted first.
    ///
    /// The follow-up tiles need not be adjacent in storage: in the hand
    /// `b1 b2 b2 b3`, a chi at index 0 consumes b1, the first b2 and b3. A
    /// forward linear scan takes the first unconsumed match for each target
    /// value, which keeps the result deterministic when duplicates exist.
    pub fn try_chi_at(&self, i: usize) -> Option<Hand> {
        let len = self.0.len();
        if len < 3 || i + 3 > len {
            return None;
        }

        let t1 = self.0[i];
        if !t1.is_basic() || t1.value > 7 {
            return None;
        }

        let t2 = Tile::new(t1.suit, t1.value + 1);
        let t3 = Tile::new(t1.suit, t1.value + 2);

        let mut i2 = None;
        let mut i3 = None;
        for (j, &u) in self.0[i + 1..].iter().enumerate() {
            if u == t2 && i2.is_none() {
                i2 = Some(i + 1 + j);
            } else if u == t3 {
                i3 = Some(i + 1 + j);
                // relies on sorted hand: nothing past this can be t2
                break;
            }
        }
        let (i2, i3) = (i2?, i3?);

        let mut tiles = Vec::with_capacity(len - 3);
        for (j, &u) in self.0.iter().enumerate() {
            if j != i && j != i2 && j != i3 {
                tiles.push(u);
            }
        }
        Some(Hand(tiles))
    }

    /// Returns true if the hand is exactly one meldable pair.
    pub fn is_pair(&self) -> bool {
        self.0.len() == 2 && self.0[0].can_meld() && self.0[0] == self.0[1]
    }

    /// Returns true if the hand is exactly one peng.
    pub fn is_peng(&self) -> bool {
        self.0.len() == 3
            && self.0[0].can_meld()
            && self.0[0] == self.0[1]
            && self.0[1] == self.0[2]
    }

    /// Returns true if the hand is exactly one chi, in order.
    pub fn is_chi(&self) -> bool {
        if self.0.len() != 3 || !self.0[0].is_basic() {
            return false;
        }
        let repr = self.0[0].marshal();
        self.0[1].marshal() == repr + 1 && self.0[2].marshal() == repr + 2
    }
}

impl fmt::Display for Hand {
    /// Renders the hand as Unicode glyphs, always sorted and therefore
    /// suitable for comparison.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.sorted().iter() {
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

impl Index<usize> for Hand {
    type Output = Tile;

    fn index(&self, i: usize) -> &Tile {
        &self.0[i]
    }
}

impl From<Vec<Tile>> for Hand {
    fn from(tiles: Vec<Tile>) -> Hand {
        Hand(tiles)
    }
}

impl FromIterator<Tile> for Hand {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Hand {
        Hand(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Hand {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
