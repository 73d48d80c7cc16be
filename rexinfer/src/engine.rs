//! The public entry point: the initial fast-path, then alternating bottom-up and top-down rounds
//! sharing what each has learned, per the bidirectional design this crate implements.

use std::time::{Duration, Instant};

use crate::bottom_up::{BottomUpSearch, Costs, EnumerationState as BuState};
use crate::error::{CapReached, Error};
use crate::guide::GuideTable;
use crate::ic::InfixClosure;
use crate::top_down::{EnumerationState as TdState, HeuristicConfig, Resolver, TopDownSearch};

/// Resource limits on a single [`run`] call.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    pub max_time: Option<Duration>,
    pub seed: Option<u64>,
    pub max_level: Option<usize>,
    pub cache_capacity: Option<usize>,
    pub rounds: Option<u16>,
}

impl Budget {
    pub fn new() -> Budget {
        Budget::default()
    }
}

/// The outcome of a successful [`run`] call.
#[derive(Clone, Debug)]
pub struct RunResult {
    pub re: String,
    pub ic_size: usize,
    pub re_cost: Option<u16>,
    pub all_res: u64,
    pub seed_used: u64,
}

const DEFAULT_MAX_LEVEL: usize = 500;
const DEFAULT_CACHE_CAPACITY: usize = 1 << 16;
const DEFAULT_ROUNDS: u16 = 13;

/// Infer a regular expression consistent with `pos` and inconsistent with every word of `neg`.
pub fn run(
    costs: Costs,
    max_cost: u16,
    pos: &[Vec<u8>],
    neg: &[Vec<u8>],
    budget: Budget,
) -> Result<RunResult, Error> {
    if pos.is_empty() {
        return Ok(RunResult {
            re: "Empty".to_string(),
            ic_size: 0,
            re_cost: None,
            all_res: 0,
            seed_used: budget.seed.unwrap_or(0),
        });
    }
    if pos.len() == 1 && pos[0].is_empty() {
        return Ok(RunResult {
            re: "eps".to_string(),
            ic_size: 1,
            re_cost: None,
            all_res: 0,
            seed_used: budget.seed.unwrap_or(0),
        });
    }
    if pos.len() == 1 && pos[0].len() == 1 {
        return Ok(RunResult {
            re: (pos[0][0] as char).to_string(),
            ic_size: 2,
            re_cost: None,
            all_res: 0,
            seed_used: budget.seed.unwrap_or(0),
        });
    }

    let ic = InfixClosure::build(pos, neg)?;
    let gt = GuideTable::build(&ic);

    let seed = budget.seed.unwrap_or_else(non_deterministic_seed);
    let max_level = budget.max_level.unwrap_or(DEFAULT_MAX_LEVEL);
    let cache_capacity = budget.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
    let rounds = budget.rounds.unwrap_or(DEFAULT_ROUNDS);
    let deadline = budget.max_time.map(|d| Instant::now() + d);

    let mut bu = BottomUpSearch::new(&gt, &ic, costs, max_cost, cache_capacity);
    let heuristics = HeuristicConfig::for_ic_size(ic.len());
    let mut td = TopDownSearch::new(&gt, &ic, max_level, heuristics, seed, cache_capacity);

    let mut bu_done = false;
    let mut td_done = false;

    for _ in 0..rounds {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(Error::NotFound {
                    cap_reached: CapReached::MaxTime,
                });
            }
        }

        if !bu_done {
            let prev_len = bu.cache_len();
            let (state, solution) = bu.enumerate_cost_level();
            match state {
                BuState::Found => {
                    let sol = solution.expect("Found always carries a solution");
                    return Ok(RunResult {
                        re: sol.re,
                        ic_size: ic.len(),
                        re_cost: Some(sol.cost),
                        all_res: sol.total_res,
                        seed_used: seed,
                    });
                }
                BuState::NotFound => {
                    for idx in prev_len..bu.cache_len() {
                        td.inject_solved(bu.cache_value(idx));
                    }
                }
                BuState::End => bu_done = true,
            }
        }

        if !td_done {
            match td.enumerate_level() {
                TdState::Found => {
                    let re = td.reconstruct(&Resolver::BottomUp(&bu));
                    return Ok(RunResult {
                        re,
                        ic_size: ic.len(),
                        re_cost: None,
                        all_res: bu.total_res(),
                        seed_used: seed,
                    });
                }
                TdState::NotFound => {}
                TdState::End => td_done = true,
            }
        }

        if bu_done && td_done {
            break;
        }
    }

    while !td_done {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(Error::NotFound {
                    cap_reached: CapReached::MaxTime,
                });
            }
        }
        match td.enumerate_level() {
            TdState::Found => {
                let re = td.reconstruct(&Resolver::BottomUp(&bu));
                return Ok(RunResult {
                    re,
                    ic_size: ic.len(),
                    re_cost: None,
                    all_res: bu.total_res(),
                    seed_used: seed,
                });
            }
            TdState::NotFound => {}
            TdState::End => td_done = true,
        }
    }

    // By this point `td_done` is always true (the loop above only exits once top-down reports
    // `End`); bottom-up may or may not have also capped out, but top-down's level cap is what
    // actually ended the search.
    let _ = bu_done;
    Err(Error::NotFound {
        cap_reached: CapReached::MaxLevel,
    })
}

fn non_deterministic_seed() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish()
}
