//! Infix closure (IC): the shortlex-ordered vocabulary of every contiguous substring of the
//! example words, including the empty string. Every [`crate::cs::Cs`] is a bitmask over this
//! vocabulary's indices.

use std::collections::HashMap;

use crate::cs::{Cs, Width};
use crate::error::Error;

/// The infix closure of a set of example words, plus the bitmasks derived from it.
pub struct InfixClosure {
    /// Shortlex-ordered infixes; `words[i]` is the byte-string at bit index `i`.
    pub words: Vec<Vec<u8>>,
    index_of: HashMap<Vec<u8>, usize>,
    /// Number of distinct alphabet bytes, occupying indices `1..=alphabet_size`.
    pub alphabet_size: usize,
    pub width: Width,
    pub pos_bits: Cs,
    pub neg_bits: Cs,
}

impl InfixClosure {
    /// Index of the empty string; always 0 by construction.
    pub const EPS: usize = 0;

    pub fn index_of(&self, w: &[u8]) -> Option<usize> {
        self.index_of.get(w).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Build the infix closure of `pos` and `neg`, along with `pos_bits`/`neg_bits`.
    pub fn build(pos: &[Vec<u8>], neg: &[Vec<u8>]) -> Result<InfixClosure, Error> {
        let mut set: std::collections::BTreeSet<Vec<u8>> = std::collections::BTreeSet::new();
        set.insert(Vec::new());
        for word in pos.iter().chain(neg.iter()) {
            for start in 0..=word.len() {
                for end in start..=word.len() {
                    set.insert(word[start..end].to_vec());
                }
            }
        }
        let mut words: Vec<Vec<u8>> = set.into_iter().collect();
        words.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        let width = Width::select(words.len()).ok_or(Error::WidthExceeded {
            ic_size: words.len(),
            max_width: Width::W256.bits(),
        })?;

        let mut index_of = HashMap::with_capacity(words.len());
        for (i, w) in words.iter().enumerate() {
            index_of.insert(w.clone(), i);
        }

        let alphabet_size = words.iter().filter(|w| w.len() == 1).count();

        let mut pos_bits = Cs::zero();
        for word in pos {
            let idx = *index_of
                .get(word)
                .expect("every positive word is in its own infix closure");
            pos_bits.set(idx);
        }
        let mut neg_bits = Cs::zero();
        for word in neg {
            let idx = *index_of
                .get(word)
                .expect("every negative word is in its own infix closure");
            neg_bits.set(idx);
        }

        Ok(InfixClosure {
            words,
            index_of,
            alphabet_size,
            width,
            pos_bits,
            neg_bits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn includes_eps_and_all_substrings() {
        let ic = InfixClosure::build(&[w("ab")], &[]).unwrap();
        assert_eq!(ic.index_of(&w("")), Some(0));
        assert!(ic.index_of(&w("a")).is_some());
        assert!(ic.index_of(&w("b")).is_some());
        assert!(ic.index_of(&w("ab")).is_some());
        assert_eq!(ic.len(), 4);
    }

    #[test]
    fn shortlex_order() {
        let ic = InfixClosure::build(&[w("ba")], &[]).unwrap();
        // eps, then single letters in byte order, then the 2-letter word
        assert_eq!(ic.words[0], w(""));
        assert_eq!(ic.words[1], w("a"));
        assert_eq!(ic.words[2], w("b"));
        assert_eq!(ic.words[3], w("ba"));
    }

    #[test]
    fn pos_neg_bits() {
        let ic = InfixClosure::build(&[w("a")], &[w("b")]).unwrap();
        let a_idx = ic.index_of(&w("a")).unwrap();
        let b_idx = ic.index_of(&w("b")).unwrap();
        assert!(ic.pos_bits.get(a_idx));
        assert!(!ic.pos_bits.get(b_idx));
        assert!(ic.neg_bits.get(b_idx));
        assert!(!ic.neg_bits.get(a_idx));
    }

    #[test]
    fn width_exceeded() {
        let words: Vec<Vec<u8>> = (0..300u32).map(|i| i.to_le_bytes().to_vec()).collect();
        let err = InfixClosure::build(&words, &[]).unwrap_err();
        matches!(err, Error::WidthExceeded { .. });
    }
}
