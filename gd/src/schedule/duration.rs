//! Duration annotations on task labels: `"Read (25 min)"`, `"Read (25)"`

use std::sync::LazyLock;

use regex::Regex;

static MIN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s*\(\s*(\d+)\s*min\s*\)\s*$").expect("min suffix pattern compiles"));

static BARE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\(\s*(\d+)\s*\)\s*$").expect("bare suffix pattern compiles"));

/// Split a label into `(clean_label, minutes)`
///
/// `minutes` is 0 when the label carries no usable annotation; callers treat
/// that as "let the allocator decide".
pub fn parse_duration(label: &str) -> (String, u32) {
    let label = label.trim();

    for pattern in [&*MIN_SUFFIX, &*BARE_SUFFIX] {
        if let Some(caps) = pattern.captures(label)
            && let Ok(minutes) = caps[2].parse::<u32>()
        {
            return (caps[1].trim().to_string(), minutes);
        }
    }

    (label.to_string(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_min_suffix() {
        assert_eq!(parse_duration("Read (25 min)"), ("Read".to_string(), 25));
        assert_eq!(parse_duration("  Read book (40 MIN) "), ("Read book".to_string(), 40));
        assert_eq!(parse_duration("Read(15min)"), ("Read".to_string(), 15));
    }

    #[test]
    fn test_parse_bare_suffix() {
        assert_eq!(parse_duration("Read (25)"), ("Read".to_string(), 25));
    }

    #[test]
    fn test_parse_absent() {
        assert_eq!(parse_duration("Read"), ("Read".to_string(), 0));
        assert_eq!(parse_duration("Read (later)"), ("Read (later)".to_string(), 0));
        assert_eq!(parse_duration("(25) Read"), ("(25) Read".to_string(), 0));
    }

    #[test]
    fn test_parse_overflow_is_unspecified() {
        let (label, minutes) = parse_duration("Read (99999999999 min)");
        assert_eq!(minutes, 0);
        assert_eq!(label, "Read (99999999999 min)");
    }
}
