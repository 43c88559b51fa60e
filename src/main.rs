//! Command-line front end: reads hands from stdin, one per line, and prints
//! the optimal grouping, the waits and any special-hand waits.

use std::io::{self, BufRead};

use anyhow::{Result, bail};
use serde::Serialize;

use mj_handcheck::solver::{OptChecker, OptCountChecker, OptRleChecker, SearchStats};
use mj_handcheck::special::{self, ThirteenWait};
use mj_handcheck::{Group, Hand, Tile, wait};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CheckerKind {
    Seq,
    Count,
    Rle,
}

struct Options {
    split: bool,
    use_memo: bool,
    checker: CheckerKind,
    json: bool,
}

impl Options {
    fn parse<I: Iterator<Item = String>>(args: I) -> Result<Options> {
        let mut opts = Options {
            split: false,
            use_memo: true,
            checker: CheckerKind::Rle,
            json: false,
        };

        for arg in args {
            match arg.as_str() {
                "--split" => opts.split = true,
                "--no-memo" => opts.use_memo = false,
                "--json" => opts.json = true,
                "--checker=seq" => opts.checker = CheckerKind::Seq,
                "--checker=count" => opts.checker = CheckerKind::Count,
                "--checker=rle" => opts.checker = CheckerKind::Rle,
                other => bail!(
                    "unrecognised argument: {}\n\
                     usage: mj-handcheck [--split] [--no-memo] [--checker=seq|count|rle] [--json]",
                    other
                ),
            }
        }
        Ok(opts)
    }
}

#[derive(Serialize)]
struct Report {
    hand: Vec<String>,
    encoded: String,
    pengs: Vec<Vec<String>>,
    chis: Vec<Vec<String>>,
    pairs: Vec<Vec<String>>,
    free: Vec<String>,
    score: u32,
    waits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seven_pairs_wait: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thirteen_orphans_wait: Option<String>,
    stats: SearchStats,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn meld_codes(g: &Group) -> (Vec<Vec<String>>, Vec<Vec<String>>, Vec<Vec<String>>) {
    let expand = |reprs: &[Tile], len: u8, run: bool| -> Vec<Vec<String>> {
        reprs
            .iter()
            .map(|&t| {
                (0..len)
                    .map(|i| {
                        let u = if run { Tile::new(t.suit, t.value + i) } else { t };
                        u.code()
                    })
                    .collect()
            })
            .collect()
    };
    (
        expand(&g.pengs, 3, false),
        expand(&g.chis, 3, true),
        expand(&g.pairs, 2, false),
    )
}

fn report(hand: &Hand, group: &Group, waits: &[Tile], stats: SearchStats) -> Report {
    let sorted = hand.sorted();
    let group = group.copy(true);
    let (pengs, chis, pairs) = meld_codes(&group);

    Report {
        hand: sorted.codes(),
        encoded: hex(&sorted.marshal()),
        pengs,
        chis,
        pairs,
        free: group.free.codes(),
        score: group.score(),
        waits: waits.iter().map(|t| t.code()).collect(),
        seven_pairs_wait: special::seven_pairs(hand, true).map(|t| t.code()),
        thirteen_orphans_wait: special::thirteen_orphans(hand).map(|w| match w {
            ThirteenWait::Pure => "any".to_string(),
            ThirteenWait::Missing(t) => t.code(),
        }),
        stats,
    }
}

fn print_plain(r: &Report) {
    println!("hand: {}", r.hand.join(" "));
    println!("encoded: {}", r.encoded);

    let field = |melds: &[Vec<String>]| -> String {
        melds
            .iter()
            .map(|m| m.join(" "))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(
        "solution: pengs[{}] chis[{}] pairs[{}] free[{}]",
        field(&r.pengs),
        field(&r.chis),
        field(&r.pairs),
        r.free.join(" ")
    );
    println!("score: {}", r.score);

    if r.waits.is_empty() {
        println!("no waits");
    } else {
        println!("waits: {}", r.waits.join(" "));
    }
    if let Some(w) = &r.seven_pairs_wait {
        println!("seven pairs wait: {}", w);
    }
    if let Some(w) = &r.thirteen_orphans_wait {
        println!("thirteen orphans wait: {}", w);
    }
    println!(
        "stats: steps={} memo_hits={} memo_len={} elapsed_ms={:.3}",
        r.stats.steps, r.stats.memo_hits, r.stats.memo_len, r.stats.elapsed_ms
    );
}

fn main() -> Result<()> {
    let opts = Options::parse(std::env::args().skip(1))?;

    // the seq checker keeps a result cache worth reusing across lines
    let mut seq = OptChecker::new(opts.split, opts.use_memo);
    let count = OptCountChecker { split: opts.split, use_memo: opts.use_memo };
    let rle = OptRleChecker { split: opts.split, use_memo: opts.use_memo };

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let hand = match Hand::from_string(&line) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("cannot parse hand: {}", e);
                continue;
            }
        };

        let checked = match opts.checker {
            CheckerKind::Seq => seq.check_with_stats(&hand),
            CheckerKind::Count => count.check_with_stats(&hand),
            CheckerKind::Rle => rle.check_with_stats(&hand),
        };
        let (group, stats) = match checked {
            Ok(r) => r,
            Err(e) => {
                eprintln!("cannot check hand: {}", e);
                continue;
            }
        };

        let waits = wait::find(&group, true);
        let r = report(&hand, &group, &waits, stats);
        if opts.json {
            println!("{}", serde_json::to_string(&r)?);
        } else {
            print_plain(&r);
        }
    }

    Ok(())
}
