//! Bottom-up search: cost-ordered forward enumeration over regex fragments, deduplicated by
//! their `Cs` semantics, with degraded "on-the-fly" matching once the cache fills.

use std::collections::HashMap;

use crate::cs::Cs;
use crate::guide::GuideTable;
use crate::ic::InfixClosure;
use crate::ops::forward;
use crate::ops::Operator;
use crate::partition::LevelPartitioner;

/// Per-operator costs, in the order the external interface documents them:
/// `[alpha, question, star, concat, alternation]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Costs {
    pub alpha: u16,
    pub question: u16,
    pub star: u16,
    pub concat: u16,
    pub alternation: u16,
}

impl Costs {
    pub fn new(costs: [u16; 5]) -> Costs {
        Costs {
            alpha: costs[0],
            question: costs[1],
            star: costs[2],
            concat: costs[3],
            alternation: costs[4],
        }
    }

    /// Whether the search should try `x?` before `ε|x` at the symmetric cost level. This trades
    /// one heuristic for the other; both reach the same semantics, just in a different order.
    pub fn prefer_question_over_or(&self) -> bool {
        self.alpha + self.alternation >= self.question
    }
}

/// An operand reference: either the leaf `eps`, or a previously cached fragment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    Eps,
    Cached(usize),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumerationState {
    Found,
    NotFound,
    End,
}

struct CostSlice {
    start: usize,
    end: usize,
}

/// Cost-ordered bottom-up enumerator. Call [`BottomUpSearch::enumerate_cost_level`] repeatedly
/// until it reports `Found` or `End`.
pub struct BottomUpSearch<'a> {
    guide: &'a GuideTable,
    ic: &'a InfixClosure,
    costs: Costs,
    max_cost: u16,

    cache: Vec<Cs>,
    left: Vec<Operand>,
    right: Vec<Option<Operand>>,
    visited: HashMap<Cs, usize>,
    cache_capacity: usize,
    on_the_fly: bool,
    total_res: u64,

    partitioner: LevelPartitioner,
    cost_level: u16,
    shortage_cost: Option<u16>,
    last_round: bool,
}

pub struct Solution {
    pub re: String,
    pub cost: u16,
    pub total_res: u64,
}

impl<'a> BottomUpSearch<'a> {
    pub fn new(
        guide: &'a GuideTable,
        ic: &'a InfixClosure,
        costs: Costs,
        max_cost: u16,
        cache_capacity: usize,
    ) -> BottomUpSearch<'a> {
        let mut search = BottomUpSearch {
            guide,
            ic,
            costs,
            max_cost,
            cache: Vec::with_capacity(cache_capacity),
            left: Vec::with_capacity(cache_capacity),
            right: Vec::with_capacity(cache_capacity),
            visited: HashMap::with_capacity(cache_capacity),
            cache_capacity,
            on_the_fly: false,
            total_res: 0,
            partitioner: LevelPartitioner::new(),
            cost_level: costs.alpha + 1,
            shortage_cost: None,
            last_round: false,
        };

        search.visited.insert(Cs::zero(), usize::MAX);
        search.visited.insert(Cs::one(), usize::MAX);
        for i in 0..guide.alphabet_size {
            let bit = Cs::bit(i + 1);
            search.visited.insert(bit, search.cache.len());
            search.cache.push(bit);
            search.left.push(Operand::Cached(i));
            search.right.push(None);
        }
        let n = search.cache.len();
        search
            .partitioner
            .set_end(costs.alpha as usize, Operator::Concat, n);
        search
            .partitioner
            .set_end(costs.alpha as usize, Operator::Or, n);

        search
    }

    pub fn total_res(&self) -> u64 {
        self.total_res
    }

    pub fn cache_value(&self, idx: usize) -> Cs {
        self.cache[idx]
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn index_of(&self, cs: &Cs) -> Option<usize> {
        self.visited.get(cs).copied().filter(|i| *i != usize::MAX)
    }

    /// Advance the search by one cost level. Returns the solution when found.
    pub fn enumerate_cost_level(&mut self) -> (EnumerationState, Option<Solution>) {
        if self.cost_level > self.max_cost {
            return (EnumerationState::End, None);
        }
        let (state, solved_idx) = self.enumerate_level();
        let solution = if state == EnumerationState::Found {
            solved_idx.map(|idx| Solution {
                re: self.construct_re_at(idx),
                cost: self.cost_level,
                total_res: self.total_res,
            })
        } else {
            None
        };
        self.cost_level += 1;
        (state, solution)
    }

    fn interval(&self, level: u16) -> CostSlice {
        CostSlice {
            start: self.partitioner.start(level as usize, Operator::Question),
            end: self.partitioner.end(level as usize, Operator::Or),
        }
    }

    fn interval_concat_or_only(&self, level: u16) -> CostSlice {
        CostSlice {
            start: self.partitioner.start(level as usize, Operator::Concat),
            end: self.partitioner.end(level as usize, Operator::Or),
        }
    }

    /// Insert `cs` (built from `left`/`right`) if novel, or report a solution if it satisfies the
    /// examples. Returns `Some(idx)` for the inserted/found index when this is a solution.
    fn insert_and_check(&mut self, cs: Cs, left: Operand, right: Option<Operand>) -> Option<usize> {
        self.total_res += 1;
        let satisfies = cs.satisfies(&self.ic.pos_bits, &self.ic.neg_bits);
        if self.on_the_fly {
            if satisfies {
                let idx = self.cache.len();
                self.left.push(left);
                self.right.push(right);
                self.cache.push(cs);
                return Some(idx);
            }
            return None;
        }
        if self.visited.contains_key(&cs) {
            return None;
        }
        let idx = self.cache.len();
        self.left.push(left);
        self.right.push(right);
        self.cache.push(cs);
        if satisfies {
            return Some(idx);
        }
        self.visited.insert(cs, idx);
        if self.cache.len() >= self.cache_capacity {
            self.on_the_fly = true;
        }
        None
    }

    fn enumerate_level(&mut self) -> (EnumerationState, Option<usize>) {
        let costs = self.costs;
        let level = self.cost_level;
        let prefer_question = costs.prefer_question_over_or();

        if self.on_the_fly {
            if let Some(shortage) = self.shortage_cost {
                let dif = level.saturating_sub(shortage);
                if dif == costs.question
                    || dif == costs.star
                    || dif == costs.alpha + costs.concat
                    || dif == costs.alpha + costs.alternation
                {
                    self.last_round = true;
                }
            }
        }

        // Each operator's start is the cache length where the previous operator at this level
        // left off; this keeps a level's four windows contiguous even when some are skipped.
        self.partitioner
            .set_start(level as usize, Operator::Question, self.cache.len());

        // Question
        if level >= costs.alpha + costs.question && prefer_question {
            let parent_level = level - costs.question;
            let slice = self.interval_concat_or_only(parent_level);
            for i in slice.start..slice.end {
                let cs = self.cache[i];
                if !cs.get(0) {
                    let result = forward::question(cs);
                    if let Some(idx) = self.insert_and_check(result, Operand::Cached(i), None) {
                        self.partitioner
                            .set_end(level as usize, Operator::Question, usize::MAX);
                        return (EnumerationState::Found, Some(idx));
                    }
                }
            }
        }
        self.partitioner
            .set_end(level as usize, Operator::Question, self.cache.len());
        self.partitioner
            .set_start(level as usize, Operator::Star, self.cache.len());

        // Star
        if level >= costs.alpha + costs.star {
            let parent_level = level - costs.star;
            let slice = self.interval_concat_or_only(parent_level);
            for i in slice.start..slice.end {
                let cs = self.cache[i];
                let result = forward::star(self.guide, cs);
                if let Some(idx) = self.insert_and_check(result, Operand::Cached(i), None) {
                    self.partitioner
                        .set_end(level as usize, Operator::Star, usize::MAX);
                    return (EnumerationState::Found, Some(idx));
                }
            }
        }
        self.partitioner
            .set_end(level as usize, Operator::Star, self.cache.len());
        self.partitioner
            .set_start(level as usize, Operator::Concat, self.cache.len());

        // Concat
        {
            let mut i = costs.alpha as i32;
            while 2 * i <= level as i32 - costs.concat as i32 {
                let lhs = self.interval(i as u16);
                let rhs = self.interval((level as i32 - i - costs.concat as i32) as u16);
                let l_range = lhs.start..lhs.end;
                let r_range = rhs.start..rhs.end;
                for l in l_range.clone() {
                    let left_cs = self.cache[l];
                    for r in r_range.clone() {
                        let right_cs = self.cache[r];
                        let lr = forward::concat(self.guide, left_cs, right_cs);
                        if let Some(idx) =
                            self.insert_and_check(lr, Operand::Cached(l), Some(Operand::Cached(r)))
                        {
                            self.partitioner
                                .set_end(level as usize, Operator::Concat, usize::MAX);
                            return (EnumerationState::Found, Some(idx));
                        }
                        let rl = forward::concat(self.guide, right_cs, left_cs);
                        if let Some(idx) =
                            self.insert_and_check(rl, Operand::Cached(r), Some(Operand::Cached(l)))
                        {
                            self.partitioner
                                .set_end(level as usize, Operator::Concat, usize::MAX);
                            return (EnumerationState::Found, Some(idx));
                        }
                    }
                }
                i += 1;
            }
        }
        self.partitioner
            .set_end(level as usize, Operator::Concat, self.cache.len());
        self.partitioner
            .set_start(level as usize, Operator::Or, self.cache.len());

        // Or
        if !prefer_question && level >= 2 * costs.alpha + costs.alternation {
            let parent_level = level - costs.alpha - costs.alternation;
            let slice = self.interval(parent_level);
            for r in slice.start..slice.end {
                let cs = forward::or(Cs::one(), self.cache[r]);
                if let Some(idx) = self.insert_and_check(cs, Operand::Eps, Some(Operand::Cached(r)))
                {
                    self.partitioner
                        .set_end(level as usize, Operator::Or, usize::MAX);
                    return (EnumerationState::Found, Some(idx));
                }
            }
        }
        {
            let mut i = costs.alpha as i32;
            while 2 * i <= level as i32 - costs.alternation as i32 {
                let lhs = self.interval(i as u16);
                let rhs = self.interval((level as i32 - i - costs.alternation as i32) as u16);
                let l_range = lhs.start..lhs.end;
                let r_range = rhs.start..rhs.end;
                for l in l_range.clone() {
                    let left_cs = self.cache[l];
                    for r in r_range.clone() {
                        let cs = forward::or(left_cs, self.cache[r]);
                        if let Some(idx) = self
                            .insert_and_check(cs, Operand::Cached(l), Some(Operand::Cached(r)))
                        {
                            self.partitioner
                                .set_end(level as usize, Operator::Or, usize::MAX);
                            return (EnumerationState::Found, Some(idx));
                        }
                    }
                }
                i += 1;
            }
        }
        self.partitioner
            .set_end(level as usize, Operator::Or, self.cache.len());

        if self.last_round {
            return (EnumerationState::End, None);
        }
        if self.on_the_fly && self.shortage_cost.is_none() {
            self.shortage_cost = Some(level);
        }
        (EnumerationState::NotFound, None)
    }

    pub fn construct_re(&self, cs: &Cs) -> String {
        match self.index_of(cs) {
            Some(idx) => self.construct_re_at(idx),
            None if *cs == Cs::one() => "eps".to_string(),
            None => self.construct_re_at(self.visited[cs]),
        }
    }

    fn construct_re_at(&self, index: usize) -> String {
        if index < self.guide.alphabet_size {
            return (self.ic.words[index + 1][0] as char).to_string();
        }
        let (level, op) = self
            .partitioner
            .index_to_level(index)
            .expect("every non-alphabet cache index belongs to some level/operator");
        let _ = level;
        match op {
            Operator::Question => {
                let inner = self.construct_operand(self.left[index]);
                if inner.chars().count() > 1 {
                    format!("({inner})?")
                } else {
                    format!("{inner}?")
                }
            }
            Operator::Star => {
                let inner = self.construct_operand(self.left[index]);
                if inner.chars().count() > 1 {
                    format!("({inner})*")
                } else {
                    format!("{inner}*")
                }
            }
            Operator::Concat => {
                let left = self.construct_operand(self.left[index]);
                let right = self
                    .construct_operand(self.right[index].expect("concat has a right operand"));
                format!("{}{}", bracket(&left), bracket(&right))
            }
            Operator::Or => {
                let left = self.construct_operand(self.left[index]);
                let right =
                    self.construct_operand(self.right[index].expect("or has a right operand"));
                format!("{left}|{right}")
            }
        }
    }

    fn construct_operand(&self, operand: Operand) -> String {
        match operand {
            Operand::Eps => "eps".to_string(),
            Operand::Cached(idx) => self.construct_re_at(idx),
        }
    }
}

/// Wrap `s` in parentheses iff it contains an unparenthesised `|` at top level.
fn bracket(s: &str) -> String {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '|' if depth <= 0 => return format!("({s})"),
            _ => {}
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn finds_optional_zero() {
        let pos = vec![w("0"), w("00")];
        let neg = vec![w(""), w("1")];
        let ic = InfixClosure::build(&pos, &neg).unwrap();
        let gt = GuideTable::build(&ic);
        let costs = Costs::new([1, 1, 1, 1, 1]);
        let mut search = BottomUpSearch::new(&gt, &ic, costs, 10, 4096);
        let mut found = None;
        loop {
            let (state, sol) = search.enumerate_cost_level();
            if state == EnumerationState::Found {
                found = sol;
                break;
            }
            if state == EnumerationState::End {
                break;
            }
        }
        let sol = found.expect("expected a solution for 0/00 vs empty/1");
        assert!(sol.re.contains('0'));
    }

    #[test]
    fn cost_level_order_yields_a_minimal_solution() {
        // Cost levels are enumerated in strictly increasing order, so the first `Found` is, by
        // construction, the cheapest regex this search can produce. For this pair of example
        // sets the cheapest shape (e.g. `00?` or `0*0`) costs 1 (alpha `0`) + 1 (concat) +
        // 1 (alpha `0`) + 1 (question or star) = 4 under unit costs, and nothing cheaper exists:
        // a bare `0` rejects "00", and a bare `0*` or `0?` accepts "".
        let pos = vec![w("0"), w("00")];
        let neg = vec![w(""), w("1")];
        let ic = InfixClosure::build(&pos, &neg).unwrap();
        let gt = GuideTable::build(&ic);
        let costs = Costs::new([1, 1, 1, 1, 1]);
        let mut search = BottomUpSearch::new(&gt, &ic, costs, 10, 4096);
        let mut found = None;
        loop {
            let (state, sol) = search.enumerate_cost_level();
            if state == EnumerationState::Found {
                found = sol;
                break;
            }
            if state == EnumerationState::End {
                break;
            }
        }
        let sol = found.expect("expected a solution for 0/00 vs empty/1");
        assert_eq!(sol.cost, 4);
    }

    #[test]
    fn bracket_wraps_top_level_or() {
        assert_eq!(bracket("a|b"), "(a|b)");
        assert_eq!(bracket("(a|b)"), "(a|b)");
        assert_eq!(bracket("ab"), "ab");
    }
}
