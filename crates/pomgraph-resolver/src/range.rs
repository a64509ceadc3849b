//! Version range expressions (`[1.0,2.0)`, `(,1.5]`, `[1.0]`, ...) solved
//! against a published release list.

use crate::version::compare_versions;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: String,
    pub inclusive: bool,
}

impl Bound {
    fn admits_above(&self, candidate: &str) -> bool {
        match compare_versions(&self.version, candidate) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }

    fn admits_below(&self, candidate: &str) -> bool {
        match compare_versions(candidate, &self.version) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }
}

/// One bracketed subrange; a missing bound is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subrange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Subrange {
    pub fn contains(&self, candidate: &str) -> bool {
        self.lower.as_ref().is_none_or(|b| b.admits_above(candidate))
            && self.upper.as_ref().is_none_or(|b| b.admits_below(candidate))
    }
}

/// Splits a range expression into its bracketed subranges.
///
/// Text between subranges (commas, whitespace) is dropped.
pub fn split_subranges(expression: &str) -> Vec<String> {
    let mut subranges = Vec::new();
    let mut current = String::new();
    let mut open = false;

    for c in expression.chars() {
        match c {
            '[' | '(' => {
                open = true;
                current.clear();
                current.push(c);
            }
            ']' | ')' => {
                current.push(c);
                open = false;
                subranges.push(std::mem::take(&mut current));
            }
            _ if open => current.push(c),
            _ => {}
        }
    }

    subranges
}

/// Parses one bracketed subrange. Returns `None` for malformed input.
pub fn parse_subrange(text: &str) -> Option<Subrange> {
    let text = text.trim();
    let lower_inclusive = match text.chars().next()? {
        '[' => true,
        '(' => false,
        _ => return None,
    };
    let upper_inclusive = match text.chars().last()? {
        ']' => true,
        ')' => false,
        _ => return None,
    };
    let inner = text.get(1..text.len() - 1)?;

    let bound = |version: &str, inclusive: bool| {
        let version = version.trim();
        (!version.is_empty()).then(|| Bound {
            version: version.to_string(),
            inclusive,
        })
    };

    match inner.split_once(',') {
        None => {
            // [1.0] pins an exact version.
            if !(lower_inclusive && upper_inclusive) {
                return None;
            }
            let exact = bound(inner, true)?;
            Some(Subrange {
                lower: Some(exact.clone()),
                upper: Some(exact),
            })
        }
        Some((_, upper)) if upper.contains(',') => None,
        Some((lower, upper)) => Some(Subrange {
            lower: bound(lower, lower_inclusive),
            upper: bound(upper, upper_inclusive),
        }),
    }
}

/// Picks a release for `expression` from `releases` (oldest first).
///
/// A subrange without an upper bound only considers the newest release and
/// ends solving immediately. A bounded subrange contributes the highest
/// release under its upper bound; its lower bound is not consulted. The last
/// subrange with a match wins. Returns `None` when nothing matches or the
/// expression is malformed.
pub fn solve_range(expression: &str, releases: &[String]) -> Option<String> {
    let subranges = split_subranges(expression)
        .iter()
        .map(|s| parse_subrange(s))
        .collect::<Option<Vec<_>>>()?;

    let mut selected = None;
    for subrange in &subranges {
        let Some(upper) = &subrange.upper else {
            if let Some(newest) = releases.last()
                && subrange.lower.as_ref().is_none_or(|b| b.admits_above(newest))
            {
                selected = Some(newest.clone());
            }
            return selected;
        };

        let best = releases
            .iter()
            .filter(|r| upper.admits_below(r))
            .max_by(|a, b| compare_versions(a, b));
        if let Some(best) = best {
            selected = Some(best.clone());
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn releases() -> Vec<String> {
        ["1.0", "1.5", "2.0", "2.1"].map(String::from).to_vec()
    }

    #[test]
    fn test_split_subranges() {
        assert_eq!(
            split_subranges("[1.0,2.0), [3.0,)"),
            vec!["[1.0,2.0)", "[3.0,)"]
        );
        assert_eq!(split_subranges("(,1.0],[1.2,)"), vec!["(,1.0]", "[1.2,)"]);
        assert!(split_subranges("1.0").is_empty());
    }

    #[test]
    fn test_parse_subrange() {
        let range = parse_subrange("[1.0,2.0)").unwrap();
        assert_eq!(
            range.lower,
            Some(Bound {
                version: "1.0".into(),
                inclusive: true
            })
        );
        assert_eq!(
            range.upper,
            Some(Bound {
                version: "2.0".into(),
                inclusive: false
            })
        );

        let range = parse_subrange("(,2.0]").unwrap();
        assert!(range.lower.is_none());
        assert!(range.upper.as_ref().unwrap().inclusive);

        let exact = parse_subrange("[1.5]").unwrap();
        assert!(exact.contains("1.5"));
        assert!(!exact.contains("1.6"));

        assert!(parse_subrange("(1.5)").is_none());
        assert!(parse_subrange("[1,2,3]").is_none());
        assert!(parse_subrange("1.0").is_none());
    }

    #[rstest]
    #[case("[1.0,2.0)", Some("1.5"))]
    #[case("[2.5,)", None)]
    #[case("(,2.0]", Some("2.0"))]
    #[case("(,2.0)", Some("1.5"))]
    #[case("[1.0,)", Some("2.1"))]
    #[case("(2.1,)", None)]
    #[case("[1.0]", Some("1.0"))]
    #[case("[1.0,1.2),[2.0,2.0]", Some("2.0"))]
    #[case("[3.0,4.0)", Some("2.1"))]
    #[case("[1.0,1.5],[5.0,6.0)", Some("2.1"))]
    #[case("[1.6,1.9]", Some("1.5"))]
    #[case("[0.1,0.5]", None)]
    #[case("[1.0,x", None)]
    fn test_solve_range(#[case] expression: &str, #[case] expected: Option<&str>) {
        assert_eq!(solve_range(expression, &releases()).as_deref(), expected);
    }

    #[test]
    fn test_unbounded_subrange_stops_solving() {
        // The open-ended subrange fails and later subranges are not consulted,
        // but the earlier match is kept.
        assert_eq!(
            solve_range("[1.0,1.5],[3.0,),[2.0,2.1]", &releases()).as_deref(),
            Some("1.5")
        );
    }

    #[test]
    fn test_empty_release_list() {
        assert_eq!(solve_range("[1.0,)", &[]), None);
        assert_eq!(solve_range("[1.0,2.0)", &[]), None);
    }

    #[test]
    fn test_bounded_subrange_ignores_lower_bound() {
        let releases = ["0.9", "1.2", "3.0"].map(String::from).to_vec();
        assert_eq!(solve_range("(1.0,2.0]", &releases).as_deref(), Some("1.2"));
        assert_eq!(solve_range("[1.3,2.0]", &releases).as_deref(), Some("1.2"));
        assert_eq!(
            solve_range("[1.0,1.1],[5.0,6.0)", &releases).as_deref(),
            Some("3.0")
        );
    }
}
