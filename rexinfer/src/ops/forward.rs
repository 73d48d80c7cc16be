//! Forward operators: compute the `Cs` of `x?`, `x*`, `xy`, `x|y` from their operands' `Cs`es.

use crate::cs::Cs;
use crate::guide::GuideTable;

pub fn question(x: Cs) -> Cs {
    x.union(&Cs::one())
}

/// `star(x)`: `x | eps`, then grow by one pass over rows in increasing length order. Rows are
/// shortlex ordered, so a single ascending pass suffices — a row can only ever be completed by
/// witnesses at strictly shorter rows, which have already been settled.
pub fn star(gt: &GuideTable, x: Cs) -> Cs {
    let mut res = x.union(&Cs::one());
    for i in (gt.alphabet_size + 1)..gt.ic_size() {
        if res.get(i) {
            continue;
        }
        for pair in gt.row(i) {
            if res.get(pair.left) && res.get(pair.right) {
                res.set(i);
                break;
            }
        }
    }
    res
}

/// `concat(x, y)`.
pub fn concat(gt: &GuideTable, x: Cs, y: Cs) -> Cs {
    let mut res = Cs::zero();
    if x.get(0) {
        res = res.union(&y);
    }
    if y.get(0) {
        res = res.union(&x);
    }
    for i in (gt.alphabet_size + 1)..gt.ic_size() {
        if res.get(i) {
            continue;
        }
        for pair in gt.row(i) {
            if x.get(pair.left) && y.get(pair.right) {
                res.set(i);
                break;
            }
        }
    }
    res
}

pub fn or(x: Cs, y: Cs) -> Cs {
    x.union(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ic::InfixClosure;

    fn w(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn question_adds_eps() {
        let x = Cs::bit(3);
        assert!(question(x).get(0));
        assert!(question(x).get(3));
    }

    #[test]
    fn or_is_union() {
        let x = Cs::bit(1);
        let y = Cs::bit(2);
        assert_eq!(or(x, y), x.union(&y));
    }

    #[test]
    fn star_contains_operand_and_eps() {
        let ic = InfixClosure::build(&[w("aa")], &[]).unwrap();
        let gt = GuideTable::build(&ic);
        let a = ic.index_of(&w("a")).unwrap();
        let s = star(&gt, Cs::bit(a));
        assert!(s.get(0));
        assert!(s.get(a));
        let aa = ic.index_of(&w("aa")).unwrap();
        assert!(s.get(aa));
    }

    #[test]
    fn concat_of_letters_reaches_pair() {
        let ic = InfixClosure::build(&[w("ab")], &[]).unwrap();
        let gt = GuideTable::build(&ic);
        let a = ic.index_of(&w("a")).unwrap();
        let b = ic.index_of(&w("b")).unwrap();
        let ab = ic.index_of(&w("ab")).unwrap();
        let c = concat(&gt, Cs::bit(a), Cs::bit(b));
        assert!(c.get(ab));
    }

    #[test]
    fn concat_propagates_eps_on_either_side() {
        let ic = InfixClosure::build(&[w("ab")], &[]).unwrap();
        let gt = GuideTable::build(&ic);
        let a = ic.index_of(&w("a")).unwrap();
        let x = question(Cs::bit(a)); // a?
        let b = ic.index_of(&w("b")).unwrap();
        let y = Cs::bit(b);
        let c = concat(&gt, x, y);
        assert!(c.get(b)); // via eps branch of x
    }

    #[test]
    fn star_is_idempotent() {
        let ic = InfixClosure::build(&[w("aa")], &[]).unwrap();
        let gt = GuideTable::build(&ic);
        let a = ic.index_of(&w("a")).unwrap();
        let once = star(&gt, Cs::bit(a));
        let twice = star(&gt, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn or_is_idempotent() {
        let x = Cs::bit(1);
        assert_eq!(or(x, x), x);
    }

    #[test]
    fn question_is_idempotent() {
        let x = Cs::bit(3);
        assert_eq!(question(question(x)), question(x));
    }
}
