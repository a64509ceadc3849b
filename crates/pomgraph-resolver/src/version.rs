//! Maven version ordering.
//!
//! Follows Maven's precedence rules: versions are split into numeric and
//! qualifier items on `.`, `-`, and digit/letter transitions; numbers compare
//! numerically, qualifiers by their well-known rank, and trailing "null"
//! items (`0`, `ga`, `final`, `release`, empty) are ignored.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Digits with leading zeros stripped.
    Number(String),
    Qualifier(String),
}

impl Item {
    fn is_null(&self) -> bool {
        match self {
            Self::Number(n) => n.is_empty(),
            Self::Qualifier(q) => qualifier_rank(q) == RELEASE_RANK,
        }
    }
}

const RELEASE_RANK: u8 = 5;

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" => 0,
        "beta" => 1,
        "milestone" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn canonical_qualifier(raw: &str, followed_by_digit: bool) -> String {
    let lower = raw.to_ascii_lowercase();
    if followed_by_digit {
        match lower.as_str() {
            "a" => return "alpha".into(),
            "b" => return "beta".into(),
            "m" => return "milestone".into(),
            _ => {}
        }
    }
    lower
}

fn number(digits: &str) -> Item {
    Item::Number(digits.trim_start_matches('0').to_string())
}

fn parse(version: &str) -> Vec<Item> {
    let chars: Vec<char> = version.trim().chars().collect();
    let mut items = Vec::new();
    let mut start = 0;

    let flush = |start: usize, end: usize, items: &mut Vec<Item>| {
        if start >= end {
            return;
        }
        let token: String = chars[start..end].iter().collect();
        if token.chars().all(|c| c.is_ascii_digit()) {
            items.push(number(&token));
        } else {
            let followed_by_digit = chars.get(end).is_some_and(char::is_ascii_digit);
            items.push(Item::Qualifier(canonical_qualifier(&token, followed_by_digit)));
        }
    };

    for i in 0..chars.len() {
        let c = chars[i];
        if c == '.' || c == '-' || c == '_' {
            flush(start, i, &mut items);
            start = i + 1;
        } else if i > start && chars[i - 1].is_ascii_digit() != c.is_ascii_digit() {
            flush(start, i, &mut items);
            start = i;
        }
    }
    flush(start, chars.len(), &mut items);

    while items.last().is_some_and(Item::is_null) {
        items.pop();
    }
    items
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    qualifier_rank(a)
        .cmp(&qualifier_rank(b))
        .then_with(|| a.cmp(b))
}

fn compare_items(a: Option<&Item>, b: Option<&Item>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(Item::Number(x)), Some(Item::Number(y))) => compare_numbers(x, y),
        (Some(Item::Qualifier(x)), Some(Item::Qualifier(y))) => compare_qualifiers(x, y),
        (Some(Item::Number(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Number(_))) => Ordering::Less,
        (Some(Item::Number(x)), None) => compare_numbers(x, ""),
        (None, Some(Item::Number(y))) => compare_numbers("", y),
        (Some(Item::Qualifier(x)), None) => compare_qualifiers(x, ""),
        (None, Some(Item::Qualifier(y))) => compare_qualifiers("", y),
    }
}

/// Compares two Maven version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_items = parse(a);
    let b_items = parse(b);
    let len = a_items.len().max(b_items.len());

    (0..len)
        .map(|i| compare_items(a_items.get(i), b_items.get(i)))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0", "2.0", Ordering::Less)]
    #[case("1.10", "1.9", Ordering::Greater)]
    #[case("1.0", "1.0.0", Ordering::Equal)]
    #[case("1.0.1", "1.0", Ordering::Greater)]
    #[case("1.0-SNAPSHOT", "1.0", Ordering::Less)]
    #[case("1.0-alpha-1", "1.0-beta-1", Ordering::Less)]
    #[case("1.0-beta", "1.0-rc1", Ordering::Less)]
    #[case("1.0-RC1", "1.0-SNAPSHOT", Ordering::Less)]
    #[case("1.0-M2", "1.0-RC1", Ordering::Less)]
    #[case("1.0.Final", "1.0", Ordering::Equal)]
    #[case("1.0-GA", "1.0", Ordering::Equal)]
    #[case("1.0-sp1", "1.0", Ordering::Greater)]
    #[case("1.0-1", "1.0", Ordering::Greater)]
    #[case("1.0a1", "1.0-alpha-1", Ordering::Equal)]
    #[case("2.0.0-jre", "2.0.0-android", Ordering::Greater)]
    #[case("1.0.0", "1.0.0.1", Ordering::Less)]
    #[case("007", "7", Ordering::Equal)]
    #[case("12345678901234567890", "12345678901234567891", Ordering::Less)]
    fn test_compare_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(a, b), expected, "{a} vs {b}");
        assert_eq!(compare_versions(b, a), expected.reverse(), "{b} vs {a}");
    }

    #[test]
    fn test_sorting_release_list() {
        let mut versions = vec!["2.0", "1.0-SNAPSHOT", "1.5", "1.0", "2.0-rc1", "1.10"];
        versions.sort_by(|a, b| compare_versions(a, b));
        assert_eq!(
            versions,
            vec!["1.0-SNAPSHOT", "1.0", "1.5", "1.10", "2.0-rc1", "2.0"]
        );
    }

    #[test]
    fn test_numbers_outrank_qualifiers() {
        assert_eq!(compare_versions("1.1", "1.x"), Ordering::Greater);
    }
}
