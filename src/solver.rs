//! Hand checkers.
//!
//! The optimal checkers search every way of peeling melds and pairs off the
//! free tiles and keep the grouping with the highest score. They differ only
//! in the collection the search runs over: [`OptChecker`] scans a sorted
//! [`Hand`], [`OptCountChecker`] probes each distinct tile of a [`Counter`]
//! once, and [`OptRleChecker`] does the same over a [`HandRLE`].
//! [`GreedyChecker`] trades optimality for speed by committing to the first
//! winning decomposition it finds.

use std::collections::HashMap;

use anyhow::{Result, ensure};

use crate::{Counter, Group, Hand, HandRLE, Tile};

/// A collection of tiles not yet committed to any meld, as seen by the
/// search. An anchor addresses one candidate starting tile; the probes return
/// a reduced copy or `None`, leaving the receiver intact so sibling branches
/// see the same state.
pub trait FreeTiles: Clone {
    type Anchor: Copy;

    fn from_hand(hand: &Hand) -> Self;

    /// The number of tiles left, with multiplicity.
    fn total(&self) -> usize;

    /// A canonical encoding of the remaining multiset, for memo keys. Equal
    /// multisets must encode identically.
    fn key(&self) -> Vec<u8>;

    fn to_hand(&self) -> Hand;

    /// The candidate starting points, each with its representative tile.
    fn anchors(&self) -> Vec<(Self::Anchor, Tile)>;

    fn try_peng(&self, a: Self::Anchor) -> Option<Self>;
    fn try_pair(&self, a: Self::Anchor) -> Option<Self>;
    fn try_chi(&self, a: Self::Anchor) -> Option<Self>;
}

impl FreeTiles for Hand {
    type Anchor = usize;

    fn from_hand(hand: &Hand) -> Hand {
        hand.sorted()
    }

    fn total(&self) -> usize {
        self.len()
    }

    fn key(&self) -> Vec<u8> {
        self.marshal()
    }

    fn to_hand(&self) -> Hand {
        self.clone()
    }

    fn anchors(&self) -> Vec<(usize, Tile)> {
        self.iter().copied().enumerate().collect()
    }

    fn try_peng(&self, i: usize) -> Option<Hand> {
        self.try_peng_at(i)
    }

    fn try_pair(&self, i: usize) -> Option<Hand> {
        self.try_pair_at(i)
    }

    fn try_chi(&self, i: usize) -> Option<Hand> {
        self.try_chi_at(i)
    }
}

impl FreeTiles for Counter {
    type Anchor = Tile;

    fn from_hand(hand: &Hand) -> Counter {
        hand.to_counter()
    }

    fn total(&self) -> usize {
        self.len()
    }

    fn key(&self) -> Vec<u8> {
        self.marshal()
    }

    fn to_hand(&self) -> Hand {
        Counter::to_hand(self)
    }

    fn anchors(&self) -> Vec<(Tile, Tile)> {
        self.iter().map(|(t, _)| (t, t)).collect()
    }

    fn try_peng(&self, t: Tile) -> Option<Counter> {
        Counter::try_peng(self, t)
    }

    fn try_pair(&self, t: Tile) -> Option<Counter> {
        Counter::try_pair(self, t)
    }

    fn try_chi(&self, t: Tile) -> Option<Counter> {
        Counter::try_chi(self, t)
    }
}

impl FreeTiles for HandRLE {
    type Anchor = usize;

    fn from_hand(hand: &Hand) -> HandRLE {
        HandRLE::from_hand(hand)
    }

    fn total(&self) -> usize {
        self.len()
    }

    fn key(&self) -> Vec<u8> {
        self.marshal()
    }

    fn to_hand(&self) -> Hand {
        HandRLE::to_hand(self)
    }

    fn anchors(&self) -> Vec<(usize, Tile)> {
        self.entries().iter().enumerate().map(|(i, e)| (i, e.tile)).collect()
    }

    fn try_peng(&self, i: usize) -> Option<HandRLE> {
        self.try_peng_at(i)
    }

    fn try_pair(&self, i: usize) -> Option<HandRLE> {
        self.try_pair_at(i)
    }

    fn try_chi(&self, i: usize) -> Option<HandRLE> {
        self.try_chi_at(i)
    }
}

/// Counters accumulated over a whole check.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct SearchStats {
    /// Recursion steps taken.
    pub steps: u64,
    /// Subproblems answered from the memo.
    pub memo_hits: u64,
    /// Distinct subproblems stored in the memo.
    pub memo_len: usize,
    /// Wall-clock time for the whole check.
    pub elapsed_ms: f64,
}

struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: js_sys::Date::now(),
        }
    }

    fn elapsed_ms(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_secs_f64() * 1000.0
        }
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Date::now() - self.start_ms
        }
    }
}

struct Shared {
    memo: Option<HashMap<Vec<u8>, Vec<u8>>>,
    steps: u64,
    memo_hits: u64,
}

/// Finds the best grouping of exactly the tiles in `free`.
///
/// The returned grouping covers the free tiles and nothing else, so a caller
/// that just committed a meld appends its representative tile to the result.
/// Keeping the result independent of the path that led here is what makes it
/// safe to memoise by free-tile encoding alone: any two searches that arrive
/// at the same multiset want the same answer.
fn step<F: FreeTiles>(free: &F, shared: &mut Shared) -> Group {
    shared.steps += 1;

    if free.total() == 0 {
        return Group::new();
    }

    let repr = free.key();
    if let Some(memo) = &shared.memo {
        if let Some(enc) = memo.get(&repr) {
            shared.memo_hits += 1;
            return Group::unmarshal(enc);
        }
    }

    // committing nothing is always an option
    let mut best = Group { free: free.to_hand(), ..Group::new() };

    for (a, t) in free.anchors() {
        if let Some(next) = free.try_peng(a) {
            let mut g = step(&next, shared);
            g.pengs.push(t);
            if g.score() > best.score() {
                best = g;
            }
        }
        if let Some(next) = free.try_pair(a) {
            let mut g = step(&next, shared);
            g.pairs.push(t);
            if g.score() > best.score() {
                best = g;
            }
        }
        if let Some(next) = free.try_chi(a) {
            let mut g = step(&next, shared);
            g.chis.push(t);
            if g.score() > best.score() {
                best = g;
            }
        }
    }

    if let Some(memo) = &mut shared.memo {
        // a subproblem is solved exactly once
        let old = memo.insert(repr, best.copy(true).marshal());
        assert!(old.is_none(), "updating memo");
    }

    best
}

fn start<F: FreeTiles>(hand: &Hand, use_memo: bool, stats: &mut SearchStats) -> Group {
    let mut shared = Shared {
        memo: use_memo.then(HashMap::new),
        steps: 0,
        memo_hits: 0,
    };
    let g = step(&F::from_hand(hand), &mut shared);
    stats.steps += shared.steps;
    stats.memo_hits += shared.memo_hits;
    stats.memo_len += shared.memo.map_or(0, |m| m.len());
    g
}

/// Runs the search over a sorted hand, optionally split by suit. Melds never
/// cross suits, so the sub-searches are independent and their groupings
/// merge field by field.
fn run<F: FreeTiles>(hand: &Hand, split: bool, use_memo: bool) -> (Group, SearchStats) {
    let sw = Stopwatch::start();
    let mut stats = SearchStats::default();
    let sorted = hand.sorted();

    let result = if split {
        let mut total = Group::new();
        // already sorted, so each sub-hand is too
        for sub in sorted.split(false).into_values() {
            let g = start::<F>(&sub, use_memo, &mut stats);
            total.pengs.extend(g.pengs);
            total.chis.extend(g.chis);
            total.pairs.extend(g.pairs);
            total.free = total.free.concat(&g.free);
        }
        total
    } else {
        start::<F>(&sorted, use_memo, &mut stats)
    };

    stats.elapsed_ms = sw.elapsed_ms();
    (result, stats)
}

/// An optimal checker over the sequence representation.
///
/// The optimal grouping maximises the score, which first minimises the tiles
/// left out of melds and then prefers 3-tile melds over pairs. A hand may
/// have several groupings with the optimal score; one is returned. Where the
/// score ties, a peng is preferred to a pair and a pair to a chi on the same
/// starting tile.
///
/// Results are cached across calls, so a reused checker answers a repeated
/// hand without searching.
#[derive(Debug, Default)]
pub struct OptChecker {
    /// Search each suit separately. Melds never cross suits, so this shrinks
    /// the search space at no cost to the result.
    pub split: bool,
    /// Memoise repeated subproblems. This should really always be on.
    pub use_memo: bool,

    // TODO: needs an eviction policy if a long-lived checker sees many hands
    cache: HashMap<Vec<u8>, Group>,
}

impl OptChecker {
    pub fn new(split: bool, use_memo: bool) -> Self {
        OptChecker { split, use_memo, cache: HashMap::new() }
    }

    /// Finds the optimal grouping for a hand.
    pub fn check(&mut self, hand: &Hand) -> Result<Group> {
        Ok(self.check_with_stats(hand)?.0)
    }

    pub fn check_with_stats(&mut self, hand: &Hand) -> Result<(Group, SearchStats)> {
        ensure!(hand.valid(), "invalid tile in hand");
        let sorted = hand.sorted();

        let key = sorted.marshal();
        if let Some(g) = self.cache.get(&key) {
            return Ok((g.clone(), SearchStats::default()));
        }

        let (g, stats) = run::<Hand>(&sorted, self.split, self.use_memo);
        self.cache.insert(key, g.clone());
        Ok((g, stats))
    }
}

/// An optimal checker over the [`Counter`] representation. Produces the same
/// score as [`OptChecker`]; duplicate-heavy hands search faster because each
/// distinct tile is probed once per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptCountChecker {
    pub split: bool,
    pub use_memo: bool,
}

impl OptCountChecker {
    pub fn check(&self, hand: &Hand) -> Result<Group> {
        Ok(self.check_with_stats(hand)?.0)
    }

    pub fn check_with_stats(&self, hand: &Hand) -> Result<(Group, SearchStats)> {
        ensure!(hand.valid(), "invalid tile in hand");
        Ok(run::<Counter>(hand, self.split, self.use_memo))
    }
}

/// An optimal checker over the [`HandRLE`] representation. Probes like
/// [`OptCountChecker`] but with denser state, which makes for cheaper clones
/// and smaller memo keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptRleChecker {
    pub split: bool,
    pub use_memo: bool,
}

impl OptRleChecker {
    pub fn check(&self, hand: &Hand) -> Result<Group> {
        Ok(self.check_with_stats(hand)?.0)
    }

    pub fn check_with_stats(&self, hand: &Hand) -> Result<(Group, SearchStats)> {
        ensure!(hand.valid(), "invalid tile in hand");
        Ok(run::<HandRLE>(hand, self.split, self.use_memo))
    }
}

/// A checker that commits to the first full decomposition it finds: melds
/// until two tiles remain, which must form the pair. Much faster than the
/// optimal checkers on some hands, but when no winning decomposition exists
/// it reports the whole hand free rather than a best partial grouping.
///
/// You probably don't want this checker for most cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyChecker {
    /// Searching each suit separately breaks the guarantee that an all-free
    /// result means no winning decomposition exists.
    pub split: bool,
}

impl GreedyChecker {
    pub fn check(&self, hand: &Hand) -> Result<Group> {
        ensure!(hand.valid(), "invalid tile in hand");
        let sorted = hand.sorted();

        if self.split {
            let mut total = Group::new();
            for sub in sorted.split(false).into_values() {
                let g = greedy_start(&sub);
                total.pengs.extend(g.pengs);
                total.chis.extend(g.chis);
                total.pairs.extend(g.pairs);
                total.free = total.free.concat(&g.free);
            }
            Ok(total)
        } else {
            Ok(greedy_start(&sorted))
        }
    }
}

fn greedy_start(h: &Hand) -> Group {
    match gstep(&Group::new(), h, &Hand::new()) {
        Some(g) => g,
        None => Group { free: h.clone(), ..Group::new() },
    }
}

/// One greedy step: `res` holds the melds committed so far, `build` the
/// partial meld under construction. Backtracks on a failed build, returns on
/// the first success.
fn gstep(res: &Group, h: &Hand, build: &Hand) -> Option<Group> {
    if h.len() < 2 {
        return None;
    }

    if h.len() == 2 {
        // a build in flight would orphan its tiles; only a clean pair wins
        if build.is_empty() && h.is_pair() {
            let mut g = res.clone();
            g.pairs.push(h[0]);
            return Some(g);
        }
        return None;
    }

    for (i, &t) in h.iter().enumerate() {
        let next_h = h.remove(i);
        let mut next_res = res.clone();
        let mut next_build = build.append(t);

        if next_build.len() == 3 {
            if next_build.is_peng() {
                next_res.pengs.push(next_build[0]);
                next_build = Hand::new();
            } else if next_build.is_chi() {
                next_res.chis.push(next_build[0]);
                next_build = Hand::new();
            } else {
                continue;
            }
        }

        if let Some(g) = gstep(&next_res, &next_h, &next_build) {
            return Some(g);
        }
    }
    None
}
