//! A small backtracking matcher over exactly the RE vocabulary `rexinfer` emits: alphabet bytes,
//! `?`, `*`, `|`, concatenation by juxtaposition, grouping with `(...)`, and the leaf tokens `eps`
//! and `Empty`. Used only by the integration tests to check that a returned regex actually
//! matches the positive examples and rejects the negative ones.
//!
//! Known limitation: the `eps` keyword is matched greedily, so this matcher cannot disambiguate
//! an alphabet containing the literal bytes `e`, `p`, `s` from the `eps` token. Tests in this
//! suite stick to alphabets that avoid that clash.

use std::collections::HashSet;

#[derive(Debug)]
enum Node {
    Lit(u8),
    Eps,
    Concat(Vec<Node>),
    Alt(Vec<Node>),
    Star(Box<Node>),
    Opt(Box<Node>),
}

pub fn matches(re: &str, input: &[u8]) -> bool {
    if re == "Empty" {
        return false;
    }
    let chars: Vec<char> = re.chars().collect();
    let mut pos = 0;
    let ast = parse_alt(&chars, &mut pos);
    assert_eq!(pos, chars.len(), "trailing input after parsing {re:?}");
    let start: HashSet<usize> = [0].into_iter().collect();
    accepts(&ast, input, &start).contains(&input.len())
}

fn parse_alt(chars: &[char], pos: &mut usize) -> Node {
    let mut branches = vec![parse_concat(chars, pos)];
    while *pos < chars.len() && chars[*pos] == '|' {
        *pos += 1;
        branches.push(parse_concat(chars, pos));
    }
    if branches.len() == 1 {
        branches.pop().unwrap()
    } else {
        Node::Alt(branches)
    }
}

fn parse_concat(chars: &[char], pos: &mut usize) -> Node {
    let mut factors = Vec::new();
    while *pos < chars.len() && chars[*pos] != '|' && chars[*pos] != ')' {
        factors.push(parse_factor(chars, pos));
    }
    if factors.len() == 1 {
        factors.pop().unwrap()
    } else {
        Node::Concat(factors)
    }
}

fn parse_factor(chars: &[char], pos: &mut usize) -> Node {
    let atom = parse_atom(chars, pos);
    if *pos < chars.len() && chars[*pos] == '?' {
        *pos += 1;
        Node::Opt(Box::new(atom))
    } else if *pos < chars.len() && chars[*pos] == '*' {
        *pos += 1;
        Node::Star(Box::new(atom))
    } else {
        atom
    }
}

fn parse_atom(chars: &[char], pos: &mut usize) -> Node {
    if chars[*pos] == '(' {
        *pos += 1;
        let inner = parse_alt(chars, pos);
        assert_eq!(chars[*pos], ')', "unbalanced group");
        *pos += 1;
        return inner;
    }
    if chars[*pos..].starts_with(&['e', 'p', 's']) {
        *pos += 3;
        return Node::Eps;
    }
    let c = chars[*pos];
    *pos += 1;
    Node::Lit(c as u8)
}

fn accepts(node: &Node, text: &[u8], positions: &HashSet<usize>) -> HashSet<usize> {
    match node {
        Node::Lit(b) => positions
            .iter()
            .filter_map(|&p| if p < text.len() && text[p] == *b { Some(p + 1) } else { None })
            .collect(),
        Node::Eps => positions.clone(),
        Node::Concat(parts) => {
            let mut cur = positions.clone();
            for part in parts {
                cur = accepts(part, text, &cur);
            }
            cur
        }
        Node::Alt(branches) => {
            let mut out = HashSet::new();
            for branch in branches {
                out.extend(accepts(branch, text, positions));
            }
            out
        }
        Node::Opt(inner) => {
            let mut out = positions.clone();
            out.extend(accepts(inner, text, positions));
            out
        }
        Node::Star(inner) => {
            let mut frontier = positions.clone();
            let mut all = positions.clone();
            loop {
                let next = accepts(inner, text, &frontier);
                let fresh: HashSet<usize> = next.difference(&all).copied().collect();
                if fresh.is_empty() {
                    break;
                }
                all.extend(fresh.iter().copied());
                frontier = fresh;
            }
            all
        }
    }
}
