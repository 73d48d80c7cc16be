//! Top-down search: starting from the set of `Cs` values that satisfy the examples by bit
//! masking alone, invert each forward operator to expand a graph of sub-goals, and propagate
//! "solved" status upward whenever both operands of a decomposition become known.
//!
//! Rather than the flat sibling-pair array the original source uses, this implementation keeps
//! an explicit arena of nodes plus a list of candidate decompositions ("edges": a node, the
//! operator, and its one or two operand nodes). Solving propagates by walking the edges that
//! reference a newly-solved node, which plays the role of the original's `recursiveCheck`
//! without needing index-parity arithmetic to find a node's sibling.

use std::collections::{HashMap, HashSet};

use guacamole::combinators::range_to;
use guacamole::Guacamole;

use crate::cs::Cs;
use crate::guide::GuideTable;
use crate::ic::InfixClosure;
use crate::ops::reverse;
use crate::ops::Operator;

/// Above this many don't-care bits, the solution set's `2^d` togglings is too large to enumerate
/// inside a single search level; [`TopDownSearch::generate_solution_set`] switches to sampling
/// at [`DEFAULT_SAMPLE_CAP`] draws even when the caller's [`HeuristicConfig`] left it disabled.
const MAX_EXHAUSTIVE_DONT_CARE: usize = 24;

/// Default sample size used when a search is forced into sampling because the exhaustive form
/// would be too large, rather than because the caller asked for sampling explicitly.
const DEFAULT_SAMPLE_CAP: usize = 4096;

/// Controls whether each reverse operator samples randomly instead of enumerating exhaustively,
/// and the cap on how many candidates to draw when it does.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicConfig {
    pub sample_solution_set: Option<usize>,
    pub sample_revert_star: Option<usize>,
    pub sample_revert_or: Option<usize>,
}

impl HeuristicConfig {
    pub fn none() -> HeuristicConfig {
        HeuristicConfig::default()
    }

    pub fn sample_all(n: usize) -> HeuristicConfig {
        HeuristicConfig {
            sample_solution_set: Some(n),
            sample_revert_star: Some(n),
            sample_revert_or: Some(n),
        }
    }

    /// Pick a heuristic configuration for a search over an infix closure with `ic_size` rows.
    /// Past [`MAX_EXHAUSTIVE_DONT_CARE`] rows the don't-care solution set and per-node candidate
    /// spaces are already close to where individual nodes get forced into sampling regardless
    /// (see [`crate::cs::MAX_EXHAUSTIVE_OR_BITS`]), so sampling is turned on proactively here
    /// instead of leaving every search to discover the cap node-by-node.
    pub fn for_ic_size(ic_size: usize) -> HeuristicConfig {
        if ic_size > MAX_EXHAUSTIVE_DONT_CARE {
            HeuristicConfig::sample_all(DEFAULT_SAMPLE_CAP)
        } else {
            HeuristicConfig::none()
        }
    }
}

/// How a leaf operand resolves to a string fragment: either this top-down search's own alphabet,
/// or (in the bidirectional driver) a bottom-up search's cache of already-named fragments.
pub enum Resolver<'a> {
    Alphabet(&'a InfixClosure),
    BottomUp(&'a crate::bottom_up::BottomUpSearch<'a>),
}

impl<'a> Resolver<'a> {
    fn resolve(&self, cs: Cs) -> String {
        if cs == Cs::one() {
            return "eps".to_string();
        }
        match self {
            Resolver::Alphabet(ic) => {
                let bit = cs
                    .iter_bits()
                    .next()
                    .expect("a given leaf always has at least one bit set");
                (ic.words[bit][0] as char).to_string()
            }
            Resolver::BottomUp(bu) => bu.construct_re(&cs),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Operand {
    Given(Cs),
    Node(usize),
}

struct Edge {
    parent: Option<usize>,
    op: Operator,
    left: Operand,
    right: Option<Operand>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumerationState {
    Found,
    NotFound,
    End,
}


pub struct TopDownSearch<'a> {
    guide: &'a GuideTable,
    ic: &'a InfixClosure,
    pos_bits: Cs,
    neg_bits: Cs,
    max_level: usize,
    level: usize,
    heuristics: HeuristicConfig,
    guac: Guacamole,

    given_external: HashSet<Cs>,
    solution_markers: HashSet<Cs>,

    node_cs: Vec<Cs>,
    visited: HashMap<Cs, usize>,
    solved: HashSet<usize>,

    edges: Vec<Edge>,
    edges_by_child: HashMap<usize, Vec<usize>>,
    solved_via: HashMap<usize, usize>,

    frontier: Vec<usize>,
    winning_edge: Option<usize>,
    cache_capacity: usize,
}

impl<'a> TopDownSearch<'a> {
    pub fn new(
        guide: &'a GuideTable,
        ic: &'a InfixClosure,
        max_level: usize,
        heuristics: HeuristicConfig,
        seed: u64,
        cache_capacity: usize,
    ) -> TopDownSearch<'a> {
        let mut given_external = HashSet::new();
        given_external.insert(Cs::one());
        for i in 1..=guide.alphabet_size {
            given_external.insert(Cs::bit(i));
        }
        TopDownSearch {
            guide,
            ic,
            pos_bits: ic.pos_bits,
            neg_bits: ic.neg_bits,
            max_level,
            level: 0,
            heuristics,
            guac: Guacamole::new(seed),
            given_external,
            solution_markers: HashSet::new(),
            node_cs: Vec::new(),
            visited: HashMap::new(),
            solved: HashSet::new(),
            edges: Vec::new(),
            edges_by_child: HashMap::new(),
            solved_via: HashMap::new(),
            frontier: Vec::new(),
            winning_edge: None,
            cache_capacity,
        }
    }

    /// The infix closure this search was built over, for constructing `Resolver::Alphabet` in a
    /// top-down-only reconstruction (the bidirectional driver uses `Resolver::BottomUp` instead).
    pub fn alphabet(&self) -> &InfixClosure {
        self.ic
    }

    /// Mark `cs` as known-solved from outside the graph (the bidirectional driver feeds newly
    /// cached bottom-up fragments in through this). If a node for `cs` already exists in the
    /// graph, its solved status propagates immediately.
    pub fn inject_solved(&mut self, cs: Cs) {
        if self.given_external.contains(&cs) {
            return;
        }
        self.given_external.insert(cs);
        if let Some(&idx) = self.visited.get(&cs) {
            self.mark_node_solved_externally(idx);
        }
    }

    fn mark_node_solved_externally(&mut self, idx: usize) {
        if self.solved.contains(&idx) {
            return;
        }
        self.solved.insert(idx);
        self.propagate_from(idx);
    }

    fn generate_solution_set(&mut self) -> Vec<Cs> {
        let combined = self.pos_bits.union(&self.neg_bits);
        let dont_care: Vec<usize> = (0..self.guide.ic_size())
            .filter(|&i| !combined.get(i))
            .collect();

        // A caller can ask for sampling explicitly; independently of that, exhaustive
        // enumeration is forced into sampling once it would no longer fit inside a level.
        let sample_cap = self.heuristics.sample_solution_set.or({
            if dont_care.len() > MAX_EXHAUSTIVE_DONT_CARE {
                Some(DEFAULT_SAMPLE_CAP)
            } else {
                None
            }
        });

        if let Some(cap) = sample_cap {
            let mut coin = range_to(2u32);
            let mut out = Vec::with_capacity(cap);
            for _ in 0..cap {
                let mut cs = self.pos_bits;
                for &bit in &dont_care {
                    if coin(&mut self.guac) == 1 {
                        cs.set(bit);
                    }
                }
                out.push(cs);
            }
            return out;
        }

        // Not sampling implies `dont_care.len() <= MAX_EXHAUSTIVE_DONT_CARE`, so this shift and
        // the resulting `2^n` allocation are both bounded.
        let n = dont_care.len();
        let mut out = Vec::with_capacity(1usize << n);
        for subset in 0u32..(1u32 << n) {
            let mut cs = self.pos_bits;
            for (bit_idx, &bit) in dont_care.iter().enumerate() {
                if subset & (1 << bit_idx) != 0 {
                    cs.set(bit);
                }
            }
            out.push(cs);
        }
        out
    }

    fn get_or_create_node(&mut self, cs: Cs) -> usize {
        if let Some(&idx) = self.visited.get(&cs) {
            return idx;
        }
        let idx = self.node_cs.len();
        self.node_cs.push(cs);
        self.visited.insert(cs, idx);
        self.frontier.push(idx);
        idx
    }

    /// Resolve a candidate operand to an `Operand`, or `None` if it is cyclic (rediscovers an
    /// unproven solution-set target) and the decomposition must be rejected outright.
    fn resolve_operand(&mut self, cs: Cs) -> Option<Operand> {
        if self.given_external.contains(&cs) {
            return Some(Operand::Given(cs));
        }
        if self.solution_markers.contains(&cs) {
            return None;
        }
        Some(Operand::Node(self.get_or_create_node(cs)))
    }

    fn operand_solved(&self, op: Operand) -> bool {
        match op {
            Operand::Given(_) => true,
            Operand::Node(idx) => self.solved.contains(&idx),
        }
    }

    fn add_edge(&mut self, parent: Option<usize>, op: Operator, left: Operand, right: Option<Operand>) {
        let edge_idx = self.edges.len();
        self.edges.push(Edge {
            parent,
            op,
            left,
            right,
        });
        if let Operand::Node(idx) = left {
            self.edges_by_child.entry(idx).or_default().push(edge_idx);
        }
        if let Some(Operand::Node(idx)) = right {
            self.edges_by_child.entry(idx).or_default().push(edge_idx);
        }
        self.try_solve_edge(edge_idx);
    }

    fn try_solve_edge(&mut self, edge_idx: usize) -> bool {
        let edge_solved = {
            let edge = &self.edges[edge_idx];
            self.operand_solved(edge.left) && edge.right.map(|r| self.operand_solved(r)).unwrap_or(true)
        };
        if !edge_solved {
            return false;
        }
        self.solve_via_edge(edge_idx)
    }

    fn solve_via_edge(&mut self, edge_idx: usize) -> bool {
        let parent = self.edges[edge_idx].parent;
        match parent {
            None => {
                self.winning_edge = Some(edge_idx);
                true
            }
            Some(pidx) => {
                if self.solved.contains(&pidx) {
                    return false;
                }
                self.solved.insert(pidx);
                self.solved_via.insert(pidx, edge_idx);
                self.propagate_from(pidx)
            }
        }
    }

    fn propagate_from(&mut self, idx: usize) -> bool {
        let edges = self.edges_by_child.get(&idx).cloned().unwrap_or_default();
        for e in edges {
            if self.try_solve_edge(e) {
                return true;
            }
        }
        false
    }

    pub fn enumerate_level(&mut self) -> EnumerationState {
        if self.level >= self.max_level {
            return EnumerationState::End;
        }

        if self.level == 0 {
            let roots = self.generate_solution_set();
            self.solution_markers = roots.iter().copied().collect();
            for root in roots {
                if self.expand_parent(None, root) {
                    self.level += 1;
                    return EnumerationState::Found;
                }
            }
        } else {
            if self.frontier.is_empty() {
                self.level += 1;
                return EnumerationState::End;
            }
            let current: Vec<usize> = std::mem::take(&mut self.frontier);
            for idx in current {
                if self.solved.contains(&idx) {
                    continue;
                }
                if self.node_cs.len() > self.cache_capacity {
                    return EnumerationState::End;
                }
                let cs = self.node_cs[idx];
                if self.expand_parent(Some(idx), cs) {
                    self.level += 1;
                    return EnumerationState::Found;
                }
            }
        }

        self.level += 1;
        EnumerationState::NotFound
    }

    /// Apply all four reverse operators to `cs`, registering every candidate decomposition as an
    /// edge under `parent`. Returns true the instant any decomposition completes the graph.
    fn expand_parent(&mut self, parent: Option<usize>, cs: Cs) -> bool {
        if cs.get(0) {
            for child in reverse::revert_question(cs) {
                if let Some(left) = self.resolve_operand(child) {
                    self.add_edge(parent, Operator::Question, left, None);
                    if self.winning_edge.is_some() && parent.is_none() {
                        return true;
                    }
                    if parent.is_some() && self.solved.contains(&parent.unwrap()) {
                        return true;
                    }
                }
            }

            let star_children = match self.heuristics.sample_revert_star {
                Some(cap) => reverse::revert_star_random(cs, self.guide, cap, &mut self.guac),
                None => reverse::revert_star(cs, self.guide),
            };
            for child in star_children {
                if let Some(left) = self.resolve_operand(child) {
                    self.add_edge(parent, Operator::Star, left, None);
                    if self.winning_edge.is_some() && parent.is_none() {
                        return true;
                    }
                    if parent.is_some() && self.solved.contains(&parent.unwrap()) {
                        return true;
                    }
                }
            }
        }

        for (l, r) in reverse::revert_concat(cs, self.guide) {
            let left = self.resolve_operand(l);
            let right = self.resolve_operand(r);
            if let (Some(left), Some(right)) = (left, right) {
                self.add_edge(parent, Operator::Concat, left, Some(right));
                if self.winning_edge.is_some() && parent.is_none() {
                    return true;
                }
                if parent.is_some() && self.solved.contains(&parent.unwrap()) {
                    return true;
                }
            }
        }

        // Sampling is used if the caller asked for it, or forced regardless of `heuristics` when
        // `cs` has too many set bits for the exhaustive partition to enumerate at all — the
        // `OverflowInSampling` case, where dropping the decomposition entirely is not an option.
        let or_pairs = match self.heuristics.sample_revert_or {
            Some(cap) => reverse::revert_or_random(cs, cap, &mut self.guac),
            None => match reverse::revert_or(cs) {
                Some(pairs) => pairs,
                None => reverse::revert_or_random(cs, DEFAULT_SAMPLE_CAP, &mut self.guac),
            },
        };
        for (l, r) in or_pairs {
            let left = self.resolve_operand(l);
            let right = self.resolve_operand(r);
            if let (Some(left), Some(right)) = (left, right) {
                self.add_edge(parent, Operator::Or, left, Some(right));
                if self.winning_edge.is_some() && parent.is_none() {
                    return true;
                }
                if parent.is_some() && self.solved.contains(&parent.unwrap()) {
                    return true;
                }
            }
        }

        false
    }

    fn construct_re(&self, resolver: &Resolver, edge_idx: usize) -> String {
        let edge = &self.edges[edge_idx];
        let left = self.construct_operand(resolver, edge.left);
        match edge.op {
            Operator::Question => {
                if left.chars().count() > 1 {
                    format!("({left})?")
                } else {
                    format!("{left}?")
                }
            }
            Operator::Star => {
                if left.chars().count() > 1 {
                    format!("({left})*")
                } else {
                    format!("{left}*")
                }
            }
            Operator::Concat => {
                let right = self.construct_operand(resolver, edge.right.unwrap());
                format!("{}{}", bracket(&left), bracket(&right))
            }
            Operator::Or => {
                let right = self.construct_operand(resolver, edge.right.unwrap());
                format!("{left}|{right}")
            }
        }
    }

    fn construct_operand(&self, resolver: &Resolver, operand: Operand) -> String {
        match operand {
            Operand::Given(cs) => resolver.resolve(cs),
            Operand::Node(idx) => {
                let edge_idx = *self
                    .solved_via
                    .get(&idx)
                    .expect("a solved node always has a recorded solving edge");
                self.construct_re(resolver, edge_idx)
            }
        }
    }

    /// Public accessor used by the bidirectional driver to reconstruct the final RE once this
    /// search reports `Found`, with the real resolver (alphabet-only, or delegating to a
    /// bottom-up search for multi-character fragments).
    pub fn reconstruct(&self, resolver: &Resolver) -> String {
        let edge_idx = self.winning_edge.expect("reconstruct called without a solution");
        self.construct_re(resolver, edge_idx)
    }
}

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
