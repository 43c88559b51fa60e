//! The result of grouping a hand into melds and pairs.

use std::fmt;

use crate::{Hand, Tile};

/// A grouping of a hand. Pengs and chis are recorded by a single
/// representative tile each: the tile of a peng, the lowest tile of a chi.
/// Tiles that fit no meld stay in `free`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub pengs: Vec<Tile>,
    pub chis: Vec<Tile>,
    pub pairs: Vec<Tile>,
    pub free: Hand,
}

impl Group {
    pub fn new() -> Self {
        Group::default()
    }

    /// Expands the grouping back into the hand it was built from, sorted.
    pub fn to_hand(&self) -> Hand {
        let mut tiles = Vec::with_capacity(
            3 * self.pengs.len() + 3 * self.chis.len() + 2 * self.pairs.len() + self.free.len(),
        );
        for &t in &self.pengs {
            tiles.extend([t, t, t]);
        }
        for &t in &self.chis {
            tiles.push(t);
            tiles.push(Tile::new(t.suit, t.value + 1));
            tiles.push(Tile::new(t.suit, t.value + 2));
        }
        for &t in &self.pairs {
            tiles.extend([t, t]);
        }
        tiles.extend_from_slice(self.free.tiles());
        Hand::from(tiles).sorted()
    }

    /// Counts the tiles of the whole original hand, melds included.
    pub fn to_counter(&self) -> crate::Counter {
        self.to_hand().to_counter()
    }

    /// The value of this grouping: 4 points per peng or chi, 2 per pair,
    /// nothing for free tiles.
    pub fn score(&self) -> u32 {
        4 * self.pengs.len() as u32 + 4 * self.chis.len() as u32 + 2 * self.pairs.len() as u32
    }

    /// Returns a copy, sorted within each field if `sorted` is set. Sorted
    /// copies of equal groupings compare equal regardless of the order the
    /// melds were found in.
    pub fn copy(&self, sorted: bool) -> Group {
        let mut g = self.clone();
        if sorted {
            g.pengs.sort();
            g.chis.sort();
            g.pairs.sort();
            g.free = g.free.sorted();
        }
        g
    }

    /// A compact encoding for memo values: the representative tile bytes of
    /// each field in order, the fields separated by a comma byte. Sort first
    /// for an encoding that is comparable across groupings.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.pengs.len() + self.chis.len() + self.pairs.len() + self.free.len() + 3);
        out.extend(self.pengs.iter().map(Tile::marshal));
        out.push(b',');
        out.extend(self.chis.iter().map(Tile::marshal));
        out.push(b',');
        out.extend(self.pairs.iter().map(Tile::marshal));
        out.push(b',');
        out.extend(self.free.marshal());
        out
    }

    /// The inverse of [`Group::marshal`].
    ///
    /// # Panics
    /// Panics if the encoding does not have exactly four fields or contains a
    /// byte that is not a tile. Only ever applied to encodings the crate
    /// itself produced.
    pub fn unmarshal(bytes: &[u8]) -> Group {
        let fields: Vec<&[u8]> = bytes.split(|&b| b == b',').collect();
        assert_eq!(fields.len(), 4, "corrupt group encoding");

        let tiles = |field: &[u8]| -> Vec<Tile> {
            field
                .iter()
                .map(|&b| Tile::unmarshal(b).expect("corrupt group encoding"))
                .collect()
        };

        Group {
            pengs: tiles(fields[0]),
            chis: tiles(fields[1]),
            pairs: tiles(fields[2]),
            free: Hand::unmarshal(fields[3]),
        }
    }
}

impl fmt::Display for Group {
    /// Renders the melds fully expanded, bracketed per field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut field = |label: &str, hands: Vec<Hand>| -> fmt::Result {
            write!(f, "{}[", label)?;
            for (i, hand) in hands.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", hand)?;
            }
            write!(f, "] ")
        };

        field("peng", self.pengs.iter().map(|&t| Hand::from(vec![t, t, t])).collect())?;
        field(
            "chi",
            self.chis
                .iter()
                .map(|&t| {
                    Hand::from(vec![
                        t,
                        Tile::new(t.suit, t.value + 1),
                        Tile::new(t.suit, t.value + 2),
                    ])
                })
                .collect(),
        )?;
        field("pair", self.pairs.iter().map(|&t| Hand::from(vec![t, t])).collect())?;
        write!(f, "free[{}]", self.free)
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
    fn test_score() {
        let g = Group {
            pengs: vec![t("b1")],
            chis: vec![t("c1"), t("c4")],
            pairs: vec![t("he")],
            free: h("w9"),
        };
        assert_eq!(g.score(), 14);
        assert_eq!(Group::new().score(), 0);
    }

    #[test]
    fn test_to_hand() {
        let g = Group {
            pengs: vec![t("b1")],
            chis: vec![t("c1")],
            pairs: vec![t("he")],
            free: h("w9 w2"),
        };
        assert_eq!(g.to_hand(), h("b1 b1 b1 c1 c2 c3 w2 w9 he he"));
    }

    #[test]
    fn test_copy_sorted() {
        let g = Group {
            pengs: vec![t("c1"), t("b1")],
            chis: vec![t("w4"), t("w1")],
            pairs: vec![],
            free: h("c9 b9"),
        };
        let s = g.copy(true);
        assert_eq!(s.pengs, vec![t("b1"), t("c1")]);
        assert_eq!(s.chis, vec![t("w1"), t("w4")]);
        assert_eq!(s.free, h("b9 c9"));
        // original untouched
        assert_eq!(g.pengs[0], t("c1"));
    }

    #[test]
    fn test_marshal_roundtrip() {
        let g = Group {
            pengs: vec![t("b1")],
            chis: vec![t("c1"), t("c4")],
            pairs: vec![t("he")],
            free: h("w9"),
        };
        assert_eq!(Group::unmarshal(&g.marshal()), g);

        let empty = Group::new();
        assert_eq!(empty.marshal(), b",,,");
        assert_eq!(Group::unmarshal(b",,,"), empty);
    }

    #[test]
    #[should_panic(expected = "corrupt group encoding")]
    fn test_unmarshal_corrupt() {
        Group::unmarshal(b",,");
    }

    #[test]
    fn test_display() {
        let g = Group { pengs: vec![t("b1")], ..Group::new() };
        let s = g.to_string();
        assert!(s.starts_with("peng["));
        assert!(s.ends_with("free[]"));
    }
}
