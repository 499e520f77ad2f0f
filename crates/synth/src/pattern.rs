//! Strings matching a small regular-expression subset.
//!
//! Supported: literals, escapes (`\d`, `\w`, `\s`, escaped punctuation),
//! `.`, character classes with ranges, groups (`(...)`, `(?:...)`) without
//! alternation, quantifiers `? * + {n} {n,} {n,m}`, and `^`/`$` anchors.
//! Anything else makes [`generate`] return `None` so callers can fall back.

use rand::Rng;

use crate::rng::SeedRng;

/// Upper bound added to open-ended quantifiers (`*`, `+`, `{n,}`).
const OPEN_REPEAT: u32 = 3;

/// Largest repeat count one quantifier may ask for. Larger upper bounds
/// are clamped; a larger lower bound makes the pattern unsupported.
pub const MAX_REPEAT: u32 = 1_000;

/// Total repetitions one render may perform across all pieces and groups.
const RENDER_BUDGET: u32 = 10_000;

const DIGIT: &[(char, char)] = &[('0', '9')];
const WORD: &[(char, char)] = &[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')];
const ALNUM: &[(char, char)] = &[('a', 'z'), ('A', 'Z'), ('0', '9')];

#[derive(Debug, Clone, PartialEq)]
enum Atom {
    Literal(char),
    Class(Vec<(char, char)>),
    Group(Vec<Piece>),
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    atom: Atom,
    min: u32,
    max: u32,
}

/// Produce a string matching `pattern`, or `None` if the pattern uses
/// syntax outside the supported subset.
pub fn generate(pattern: &str, rng: &mut SeedRng) -> Option<String> {
    let pieces = Parser::new(pattern).parse()?;
    let mut out = String::new();
    let mut budget = RENDER_BUDGET;
    render(&pieces, rng, &mut out, &mut budget)?;
    Some(out)
}

/// Returns `None` once `budget` runs out.
fn render(pieces: &[Piece], rng: &mut SeedRng, out: &mut String, budget: &mut u32) -> Option<()> {
    for piece in pieces {
        let count = rng.gen_range(piece.min..=piece.max);
        for _ in 0..count {
            *budget = budget.checked_sub(1)?;
            match &piece.atom {
                Atom::Literal(c) => out.push(*c),
                Atom::Class(ranges) => out.push(pick(ranges, rng)),
                Atom::Group(inner) => render(inner, rng, out, budget)?,
            }
        }
    }
    Some(())
}

fn pick(ranges: &[(char, char)], rng: &mut SeedRng) -> char {
    let total: u32 = ranges
        .iter()
        .map(|(lo, hi)| *hi as u32 - *lo as u32 + 1)
        .sum();
    let mut idx = rng.gen_range(0..total);
    for (lo, hi) in ranges {
        let size = *hi as u32 - *lo as u32 + 1;
        if idx < size {
            return char::from_u32(*lo as u32 + idx).unwrap_or(*lo);
        }
        idx -= size;
    }
    ranges[0].0
}

// ── Parser ──────────────────────────────────────────────────────────

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(pattern: &str) -> Self {
        Parser {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<Vec<Piece>> {
        let pieces = self.sequence(false)?;
        (self.pos == self.chars.len()).then_some(pieces)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn sequence(&mut self, in_group: bool) -> Option<Vec<Piece>> {
        let mut pieces = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ')' if in_group => return Some(pieces),
                ')' | '|' => return None,
                '^' if self.pos == 0 => {
                    self.pos += 1;
                    continue;
                }
                '$' if self.pos + 1 == self.chars.len() => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            let atom = self.atom()?;
            let (min, max) = self.quantifier()?;
            pieces.push(Piece { atom, min, max });
        }
        // An unclosed group runs off the end.
        (!in_group).then_some(pieces)
    }

    fn atom(&mut self) -> Option<Atom> {
        match self.bump()? {
            '(' => {
                if self.peek() == Some('?') {
                    if self.chars.get(self.pos + 1) != Some(&':') {
                        return None;
                    }
                    self.pos += 2;
                }
                let inner = self.sequence(true)?;
                (self.bump()? == ')').then_some(Atom::Group(inner))
            }
            '[' => self.class(),
            '\\' => self.escape(),
            '.' => Some(Atom::Class(ALNUM.to_vec())),
            '*' | '+' | '?' | '{' | '$' | '^' => None,
            c => Some(Atom::Literal(c)),
        }
    }

    fn escape(&mut self) -> Option<Atom> {
        match self.bump()? {
            'd' => Some(Atom::Class(DIGIT.to_vec())),
            'w' => Some(Atom::Class(WORD.to_vec())),
            's' => Some(Atom::Literal(' ')),
            c if c.is_ascii_alphanumeric() => None,
            c => Some(Atom::Literal(c)),
        }
    }

    fn class(&mut self) -> Option<Atom> {
        if self.peek() == Some('^') {
            return None;
        }
        let mut ranges = Vec::new();
        loop {
            let c = self.bump()?;
            match c {
                ']' if !ranges.is_empty() => break,
                ']' => return None,
                '\\' => match self.bump()? {
                    'd' => ranges.extend_from_slice(DIGIT),
                    'w' => ranges.extend_from_slice(WORD),
                    's' => ranges.push((' ', ' ')),
                    e if e.is_ascii_alphanumeric() => return None,
                    e => ranges.push((e, e)),
                },
                lo => {
                    let is_range = self.peek() == Some('-')
                        && self.chars.get(self.pos + 1).is_some_and(|&n| n != ']');
                    if is_range {
                        self.pos += 1;
                        let hi = self.bump()?;
                        if hi < lo {
                            return None;
                        }
                        ranges.push((lo, hi));
                    } else {
                        ranges.push((lo, lo));
                    }
                }
            }
        }
        Some(Atom::Class(ranges))
    }

    fn quantifier(&mut self) -> Option<(u32, u32)> {
        let bounds = match self.peek() {
            Some('?') => (0, 1),
            Some('*') => (0, OPEN_REPEAT),
            Some('+') => (1, 1 + OPEN_REPEAT),
            Some('{') => {
                self.pos += 1;
                let min = self.number()?;
                if min > MAX_REPEAT {
                    return None;
                }
                let max = match self.bump()? {
                    '}' => min,
                    ',' if self.peek() == Some('}') => {
                        self.pos += 1;
                        min + OPEN_REPEAT
                    }
                    ',' => {
                        let max = self.number()?;
                        if self.bump()? != '}' || max < min {
                            return None;
                        }
                        max
                    }
                    _ => return None,
                };
                self.skip_lazy();
                return Some((min, max.min(MAX_REPEAT)));
            }
            _ => return Some((1, 1)),
        };
        self.pos += 1;
        self.skip_lazy();
        Some(bounds)
    }

    fn skip_lazy(&mut self) {
        if self.peek() == Some('?') {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn sample(pattern: &str, seed: u64) -> String {
        generate(pattern, &mut seeded(seed)).unwrap()
    }

    #[test]
    fn huge_repeat_counts_are_unsupported_or_clamped() {
        assert_eq!(generate(r"\d{4000000}", &mut seeded(1)), None);
        let s = sample(r"[a-z]{2,4000000}", 3);
        assert!(s.len() >= 2 && s.len() <= MAX_REPEAT as usize, "{}", s.len());
    }

    #[test]
    fn nested_repeats_stop_at_render_budget() {
        assert_eq!(generate(r"((\d{1000}){1000}){1000}", &mut seeded(1)), None);
    }

    #[test]
    fn sku_pattern_shape() {
        for seed in 0..50 {
            let s = sample(r"^SKU-[A-Z]{3}-\d{4}$", seed);
            assert_eq!(s.len(), 12, "{}", s);
            assert!(s.starts_with("SKU-"));
            assert!(s[4..7].chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(&s[7..8], "-");
            assert!(s[8..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn groups_and_open_quantifiers() {
        for seed in 0..50 {
            let s = sample(r"(ab)+c?", seed);
            let stripped = s.trim_end_matches('c');
            assert!(stripped.len() >= 2 && stripped.len() % 2 == 0, "{}", s);
            assert!(stripped.as_bytes().chunks(2).all(|c| c == b"ab"));
        }
    }

    #[test]
    fn class_with_literal_members() {
        for seed in 0..50 {
            let s = sample(r"[a-c_.]{5}", seed);
            assert_eq!(s.len(), 5);
            assert!(s.chars().all(|c| matches!(c, 'a'..='c' | '_' | '.')));
        }
    }

    #[test]
    fn unsupported_syntax_falls_back() {
        let mut rng = seeded(1);
        assert!(generate("a|b", &mut rng).is_none());
        assert!(generate("[^a]", &mut rng).is_none());
        assert!(generate(r"\bword", &mut rng).is_none());
        assert!(generate("(open", &mut rng).is_none());
        assert!(generate("x{3,1}", &mut rng).is_none());
    }
}
