use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::solver::{OptRleChecker, SearchStats};
use crate::special::{self, ThirteenWait};
use crate::{Group, Hand, Tile, wait};

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// JSON-serializable grouping of a hand. Melds are fully expanded into their
/// 2-character tile codes.
#[derive(Serialize, Deserialize)]
pub struct GroupJson {
    pub pengs: Vec<Vec<String>>,
    pub chis: Vec<Vec<String>>,
    pub pairs: Vec<Vec<String>>,
    pub free: Vec<String>,
    pub score: u32,
}

/// Result of a hand check
#[derive(Serialize, Deserialize)]
pub struct CheckResultJson {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<GroupJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seven_pairs_wait: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thirteen_orphans_wait: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub steps: u64,
    pub memo_hits: u64,
    pub elapsed_ms: f64,
}

fn group_to_json(group: &Group) -> GroupJson {
    let expand = |reprs: &[Tile], len: u8, run: bool| -> Vec<Vec<String>> {
        reprs
            .iter()
            .map(|&t| {
                (0..len)
                    .map(|i| {
                        if run {
                            Tile::new(t.suit, t.value + i).code()
                        } else {
                            t.code()
                        }
                    })
                    .collect()
            })
            .collect()
    };

    GroupJson {
        pengs: expand(&group.pengs, 3, false),
        chis: expand(&group.chis, 3, true),
        pairs: expand(&group.pairs, 2, false),
        free: group.free.codes(),
        score: group.score(),
    }
}

/// Main WASM API: find the optimal grouping and waits for a hand
///
/// # Arguments
/// * `hand` - space-separated 2-character tile codes (e.g., "b1 b2 b3 he he")
/// * `split` - search each suit separately
/// * `use_memo` - memoise repeated subproblems; should normally be true
///
/// # Returns
/// JSON string with CheckResultJson containing the solution and waits, or an
/// error message
#[wasm_bindgen]
pub fn check_hand(hand: &str, split: bool, use_memo: bool) -> String {
    match check_internal(hand, split, use_memo) {
        Ok(result) => serde_json::to_string(&result)
            .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e)),
        Err(e) => serde_json::to_string(&CheckResultJson {
            success: false,
            solution: None,
            waits: None,
            seven_pairs_wait: None,
            thirteen_orphans_wait: None,
            error: Some(e),
            steps: 0,
            memo_hits: 0,
            elapsed_ms: 0.0,
        })
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e)),
    }
}

fn check_internal(hand: &str, split: bool, use_memo: bool) -> Result<CheckResultJson, String> {
    let hand = Hand::from_string(hand).map_err(|e| format!("Invalid hand: {:#}", e))?;

    let checker = OptRleChecker { split, use_memo };
    let (group, stats): (Group, SearchStats) = checker
        .check_with_stats(&hand)
        .map_err(|e| format!("Cannot check hand: {:#}", e))?;
    let group = group.copy(true);

    let waits: Vec<String> = wait::find(&group, true).iter().map(Tile::code).collect();

    Ok(CheckResultJson {
        success: true,
        solution: Some(group_to_json(&group)),
        waits: Some(waits),
        seven_pairs_wait: special::seven_pairs(&hand, true).map(|t| t.code()),
        thirteen_orphans_wait: special::thirteen_orphans(&hand).map(|w| match w {
            ThirteenWait::Pure => "any".to_string(),
            ThirteenWait::Missing(t) => t.code(),
        }),
        error: None,
        steps: stats.steps,
        memo_hits: stats.memo_hits,
        elapsed_ms: stats.elapsed_ms,
    })
}

/// Get the crate version this WASM module was built from
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
