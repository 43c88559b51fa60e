//! Derives the winning tiles a 13-tile hand is waiting for.

use crate::{Group, Tile};

/// Determines which tiles would complete the grouping of a 13-tile hand.
/// Tile counts within the hand are considered (a tile all four copies of
/// which are already held cannot be waited on), but discarded tiles are not.
///
/// Only groupings one tile short of four melds and a pair produce waits;
/// anything else returns an empty list. `allow_middle` controls whether a
/// two-apart free pair like b4 b6 is counted as waiting on the middle tile;
/// rule sets disagree on whether that shape is a valid wait.
///
/// The grouping should come from an optimal checker. A suboptimal grouping
/// of the same hand may hide its waits.
pub fn find(result: &Group, allow_middle: bool) -> Vec<Tile> {
    let meld_sets = result.chis.len() + result.pengs.len();
    let cnt = result.to_counter();
    let mut waits = Vec::new();

    if result.free.is_empty() && meld_sets == 3 && result.pairs.len() == 2 {
        // either pair could grow into the fourth peng
        for &t in &result.pairs {
            if cnt.get(t) < 4 && t.can_meld() {
                waits.push(t);
            }
        }
    } else if result.free.len() == 2 && meld_sets == 3 && result.pairs.len() == 1 {
        // two free tiles that are part of a chi
        let free = result.free.sorted();
        let (lo, hi) = (free[0], free[1]);
        if !lo.is_basic() || !hi.is_basic() || lo.suit != hi.suit {
            return waits;
        }

        if lo.value + 1 == hi.value {
            // open at both ends, minus the suit edges
            if lo.value > 1 {
                let t = Tile::new(lo.suit, lo.value - 1);
                if cnt.get(t) < 4 {
                    waits.push(t);
                }
            }
            if hi.value < 9 {
                let t = Tile::new(hi.suit, hi.value + 1);
                if cnt.get(t) < 4 {
                    waits.push(t);
                }
            }
        } else if allow_middle && lo.value + 2 == hi.value {
            let t = Tile::new(lo.suit, lo.value + 1);
            if cnt.get(t) < 4 {
                waits.push(t);
            }
        }
    } else if result.free.len() == 1 && meld_sets == 4 && result.pairs.is_empty() {
        // the lone free tile pairs up
        let t = result.free[0];
        if cnt.get(t) < 4 && t.can_meld() {
            waits.push(t);
        }
    }

    waits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hand;
    use crate::solver::OptRleChecker;

    fn h(s: &str) -> Hand {
        Hand::from_string(s).unwrap()
    }

    fn ts(s: &str) -> Vec<Tile> {
        s.split_whitespace()
            .map(|x| Tile::from_string(x).unwrap())
            .collect()
    }

    fn sorted(mut waits: Vec<Tile>) -> Vec<Tile> {
        waits.sort();
        waits
    }

    struct Case {
        name: &'static str,
        res: Group,
        allow_middle: bool,
        want: Vec<Tile>,
    }

    #[test]
    fn test_find() {
        let cases = vec![
            Case {
                name: "empty",
                res: Group::new(),
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "peng",
                res: Group { pengs: ts("b1 b2 b3"), pairs: ts("b4 b5"), ..Group::new() },
                allow_middle: true,
                want: ts("b4 b5"),
            },
            Case {
                // full hand b1 b2 b3 b3 b4 b5 b3 b4 b5 b4 b4 b5 b5: all four
                // b4 and b5 are already held, so neither pair can grow
                name: "peng impossible",
                res: Group { chis: ts("b1 b3 b3"), pairs: ts("b4 b5"), ..Group::new() },
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "chi",
                res: Group {
                    chis: ts("b1 b2 b3"),
                    pairs: ts("b5"),
                    free: h("b7 b8"),
                    ..Group::new()
                },
                allow_middle: true,
                want: ts("b6 b9"),
            },
            Case {
                name: "chi high",
                res: Group {
                    pengs: ts("b1 b2 b3"),
                    pairs: ts("b5"),
                    free: h("b8 b9"),
                    ..Group::new()
                },
                allow_middle: true,
                want: ts("b7"),
            },
            Case {
                name: "chi low",
                res: Group {
                    pengs: ts("b7 b8 b9"),
                    pairs: ts("b5"),
                    free: h("b1 b2"),
                    ..Group::new()
                },
                allow_middle: true,
                want: ts("b3"),
            },
            Case {
                // full hand holds all four b3, the only completion
                name: "chi impossible",
                res: Group {
                    chis: ts("b3 b3 b4"),
                    pairs: ts("b3"),
                    free: h("b1 b2"),
                    ..Group::new()
                },
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "chi middle",
                res: Group {
                    pengs: ts("b2 b3 b7"),
                    pairs: ts("b1"),
                    free: h("b4 b6"),
                    ..Group::new()
                },
                allow_middle: true,
                want: ts("b5"),
            },
            Case {
                name: "chi middle forbidden",
                res: Group {
                    pengs: ts("b2 b3 b7"),
                    pairs: ts("b1"),
                    free: h("b4 b6"),
                    ..Group::new()
                },
                allow_middle: false,
                want: vec![],
            },
            Case {
                name: "chi wrong suit",
                res: Group {
                    chis: ts("b1 b2 b3"),
                    pairs: ts("b5"),
                    free: h("b7 c8"),
                    ..Group::new()
                },
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "chi honours",
                res: Group {
                    chis: ts("b1 b2 b3"),
                    pairs: ts("b5"),
                    free: h("hz hf"),
                    ..Group::new()
                },
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "chi too far",
                res: Group {
                    chis: ts("b1 b2 b3"),
                    pairs: ts("b5"),
                    free: h("b6 b9"),
                    ..Group::new()
                },
                allow_middle: true,
                want: vec![],
            },
            Case {
                name: "pair",
                res: Group { pengs: ts("b2 b3 b4 b5"), free: h("b1"), ..Group::new() },
                allow_middle: true,
                want: ts("b1"),
            },
            Case {
                // all four b1 already held
                name: "pair impossible",
                res: Group { pengs: ts("b1 b2 b3 b4"), free: h("b1"), ..Group::new() },
                allow_middle: true,
                want: vec![],
            },
        ];

        for case in cases {
            let got = find(&case.res, case.allow_middle);
            assert_eq!(sorted(got), sorted(case.want), "{}", case.name);
        }
    }

    #[test]
    fn test_find_from_checked_hand() {
        let hand = h("b1 b2 b3 c4 c5 c6 w7 w8 w9 he he he b5");
        let checker = OptRleChecker { split: true, use_memo: true };
        let group = checker.check(&hand).unwrap();
        assert_eq!(find(&group, true), ts("b5"));
    }
}
