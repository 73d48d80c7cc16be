//! End-to-end coverage of `rexinfer::run`: soundness against the examples it was given,
//! determinism, and the concrete scenarios this crate is expected to solve.

mod support;

use rexinfer::{Budget, Costs, RunResult};
use support::matcher::matches;

fn words(strs: &[&str]) -> Vec<Vec<u8>> {
    strs.iter().map(|s| s.as_bytes().to_vec()).collect()
}

fn default_costs() -> Costs {
    Costs::new([1, 1, 1, 1, 1])
}

fn assert_sound(result: &RunResult, pos: &[&str], neg: &[&str]) {
    for p in pos {
        assert!(
            matches(&result.re, p.as_bytes()),
            "expected {:?} to match positive example {:?}",
            result.re,
            p
        );
    }
    for n in neg {
        assert!(
            !matches(&result.re, n.as_bytes()),
            "expected {:?} to reject negative example {:?}",
            result.re,
            n
        );
    }
}

#[test]
fn fast_path_empty_pos() {
    let result = rexinfer::run(default_costs(), 10, &[], &[], Budget::new()).unwrap();
    assert_eq!(result.re, "Empty");
    assert_eq!(result.re_cost, None);
}

#[test]
fn fast_path_single_empty_word() {
    let pos = words(&[""]);
    let result = rexinfer::run(default_costs(), 10, &pos, &[], Budget::new()).unwrap();
    assert_eq!(result.re, "eps");
}

#[test]
fn fast_path_single_char() {
    let pos = words(&["a"]);
    let result = rexinfer::run(default_costs(), 10, &pos, &[], Budget::new()).unwrap();
    assert_eq!(result.re, "a");
    assert_eq!(result.re_cost, None, "fast path must not invoke the engine");
}

#[test]
fn zero_or_one_extra_zero() {
    let pos = words(&["0", "00"]);
    let neg = words(&["", "1"]);
    let result = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 10, &pos, &neg, Budget::new()).unwrap();
    assert_sound(&result, &["0", "00"], &["", "1"]);
}

#[test]
fn equal_run_of_zeros_then_ones() {
    let pos = words(&["01", "0011", "000111"]);
    let neg = words(&["0", "1", "10", "100", "110", "0101"]);
    let result = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 20, &pos, &neg, Budget::new()).unwrap();
    assert_sound(
        &result,
        &["01", "0011", "000111"],
        &["0", "1", "10", "100", "110", "0101"],
    );
    if let Some(cost) = result.re_cost {
        assert!(cost <= 10, "expected a cost-<=10 witness such as (0)(0)*(1)(1)*, got cost {cost}");
    }
}

#[test]
fn repeated_ab_block() {
    let pos = words(&["ab", "abab", "ababab"]);
    let neg = words(&["", "a", "b", "aa", "bb", "aba"]);
    let result = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 20, &pos, &neg, Budget::new()).unwrap();
    assert_sound(
        &result,
        &["ab", "abab", "ababab"],
        &["", "a", "b", "aa", "bb", "aba"],
    );
}

#[test]
fn same_seed_is_deterministic() {
    let pos = words(&["ab", "abab", "ababab"]);
    let neg = words(&["", "a", "b", "aa", "bb", "aba"]);
    let mut budget_a = Budget::new();
    budget_a.seed = Some(42);
    let mut budget_b = Budget::new();
    budget_b.seed = Some(42);

    let a = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 20, &pos, &neg, budget_a).unwrap();
    let b = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 20, &pos, &neg, budget_b).unwrap();
    assert_eq!(a.re, b.re);
    assert_eq!(a.seed_used, b.seed_used);
}

#[test]
fn repeated_calls_without_sampling_agree() {
    let pos = words(&["0", "00"]);
    let neg = words(&["", "1"]);
    let a = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 10, &pos, &neg, Budget::new()).unwrap();
    let b = rexinfer::run(Costs::new([1, 1, 1, 1, 1]), 10, &pos, &neg, Budget::new()).unwrap();
    assert_eq!(a.re, b.re);
}
