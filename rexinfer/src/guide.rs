//! Guide table: for every infix-closure entry, the `(left, right)` index pairs whose
//! concatenation reproduces it. This is the kernel consulted by every forward/reverse
//! concat and star operation.

use crate::cs::Cs;
use crate::ic::InfixClosure;

/// One `(leftIdx, rightIdx)` witness: `ic.words[left] ++ ic.words[right] == ic.words[of_row]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SplitPair {
    pub left: usize,
    pub right: usize,
}

pub struct GuideTable {
    /// `rows[i]` holds every split witness for `ic.words[i]`. Empty for length 0/1 entries.
    rows: Vec<Vec<SplitPair>>,
    /// `adjacency[left]` holds `(right, result)` for every witness pair whose left half is `left`.
    adjacency: Vec<Vec<(usize, usize)>>,
    pub alphabet_size: usize,
    /// `star_lookup[i] == forward::star(Cs::bit(i))`, precomputed once.
    pub star_lookup: Vec<Cs>,
}

impl GuideTable {
    pub fn build(ic: &InfixClosure) -> GuideTable {
        let n = ic.len();
        let mut rows: Vec<Vec<SplitPair>> = vec![Vec::new(); n];
        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];

        for (i, word) in ic.words.iter().enumerate() {
            if word.len() < 2 {
                continue;
            }
            for split in 1..word.len() {
                let (left_bytes, right_bytes) = word.split_at(split);
                let left = ic
                    .index_of(left_bytes)
                    .expect("infix closure is closed under substrings");
                let right = ic
                    .index_of(right_bytes)
                    .expect("infix closure is closed under substrings");
                rows[i].push(SplitPair { left, right });
                adjacency[left].push((right, i));
            }
        }

        let mut guide = GuideTable {
            rows,
            adjacency,
            alphabet_size: ic.alphabet_size,
            star_lookup: Vec::new(),
        };
        guide.star_lookup = (0..n)
            .map(|i| crate::ops::forward::star(&guide, Cs::bit(i)))
            .collect();
        guide
    }

    pub fn ic_size(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, i: usize) -> &[SplitPair] {
        &self.rows[i]
    }

    pub fn adjacency_for(&self, left: usize) -> &[(usize, usize)] {
        &self.adjacency[left]
    }
}
