//! Parsing helpers for user utterances

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::schedule::split_list;

static CLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("clock pattern compiles"));

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,3})\s*(min|mins|minute|minutes|minuto|minutos|m)?$").expect("minutes pattern compiles")
});

const YES_WORDS: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "okay", "sí", "si", "claro", "dale"];

const NO_WORDS: &[&str] = &[
    "no", "n", "nope", "done", "none", "nothing", "listo", "ninguno", "ninguna", "nada",
];

const CONFIRM_WORDS: &[&str] = &[
    "confirm", "confirmed", "accept", "accepted", "seal", "seal it", "confirmar", "confirmo", "aceptar", "acepto",
    "sellar",
];

const CORRECT_WORDS: &[&str] = &["correct", "fix", "edit", "change", "corregir", "corrige", "cambiar"];

const MODIFY_WORDS: &[&str] = &["modify", "rewrite", "redo", "modificar", "rehacer"];

/// Lowercase, trim, and drop trailing punctuation
pub fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_lowercase()
}

fn is_one_of(text: &str, words: &[&str]) -> bool {
    let text = normalize(text);
    words.contains(&text.as_str())
}

fn first_word_is_one_of(text: &str, words: &[&str]) -> bool {
    normalize(text)
        .split_whitespace()
        .next()
        .is_some_and(|first| words.contains(&first))
}

/// Comma-separated candidates, trimmed, empties and repeats dropped
pub fn candidates(text: &str) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut out = Vec::new();
    for item in split_list(text) {
        let key = item.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(item);
        }
    }
    out
}

/// `Some(true)` for an affirmative, `Some(false)` for a negative, `None` otherwise
pub fn yes_no(text: &str) -> Option<bool> {
    if is_one_of(text, YES_WORDS) {
        Some(true)
    } else if is_one_of(text, NO_WORDS) {
        Some(false)
    } else {
        None
    }
}

pub fn is_confirm(text: &str) -> bool {
    is_one_of(text, CONFIRM_WORDS) || is_one_of(text, YES_WORDS)
}

/// `correct`, optionally followed by the field name
pub fn is_correct(text: &str) -> bool {
    first_word_is_one_of(text, CORRECT_WORDS)
}

pub fn is_modify(text: &str) -> bool {
    first_word_is_one_of(text, MODIFY_WORDS)
}

/// Parse `H:MM` or `HH:MM`
pub fn clock_time(text: &str) -> Option<NaiveTime> {
    let caps = CLOCK.captures(text.trim())?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Clock time normalized to `HH:MM`
pub fn parse_clock(text: &str) -> Option<String> {
    clock_time(text).map(|t| t.format("%H:%M").to_string())
}

/// Minute count from `45`, `45 min`, `45 minutos`
pub fn minute_count(text: &str) -> Option<u32> {
    let caps = MINUTES.captures(text.trim())?;
    caps[1].parse().ok()
}

/// Positive minute count normalized to `"N min"`
pub fn parse_minutes(text: &str) -> Option<String> {
    minute_count(text).filter(|m| *m > 0).map(|m| format!("{} min", m))
}

/// Apply `parse` to every candidate; `None` if any fails
pub fn parse_all(items: &[String], parse: impl Fn(&str) -> Option<String>) -> Option<Vec<String>> {
    items.iter().map(|item| parse(item)).collect()
}

/// The offered option matching `text`, compared case-insensitively
pub fn pick<'a>(options: &'a [String], text: &str) -> Option<&'a String> {
    let wanted = normalize(text);
    options.iter().find(|o| normalize(o) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_dedupe_and_trim() {
        assert_eq!(candidates(" Study , Read,, study ,Gym"), vec!["Study", "Read", "Gym"]);
        assert!(candidates(" , ").is_empty());
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no("Yes!"), Some(true));
        assert_eq!(yes_no("sí"), Some(true));
        assert_eq!(yes_no("done"), Some(false));
        assert_eq!(yes_no("Listo."), Some(false));
        assert_eq!(yes_no("Chapter 3"), None);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("7:30"), Some("07:30".to_string()));
        assert_eq!(parse_clock(" 20:00 "), Some("20:00".to_string()));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("20:61"), None);
        assert_eq!(parse_clock("8pm"), None);
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("45"), Some("45 min".to_string()));
        assert_eq!(parse_minutes("45 MIN"), Some("45 min".to_string()));
        assert_eq!(parse_minutes("30 minutos"), Some("30 min".to_string()));
        assert_eq!(parse_minutes("0"), None);
        assert_eq!(parse_minutes("an hour"), None);
        assert_eq!(minute_count("240"), Some(240));
    }

    #[test]
    fn test_parse_all() {
        let good = vec!["20:00".to_string(), "7:15".to_string()];
        assert_eq!(parse_all(&good, parse_clock), Some(vec!["20:00".to_string(), "07:15".to_string()]));
        let bad = vec!["20:00".to_string(), "later".to_string()];
        assert_eq!(parse_all(&bad, parse_clock), None);
    }

    #[test]
    fn test_confirm_correct_modify() {
        assert!(is_confirm("Confirm"));
        assert!(is_confirm("accept"));
        assert!(!is_confirm("correct"));
        assert!(is_correct("correct mission"));
        assert!(is_correct("Corregir"));
        assert!(is_modify("modify"));
        assert!(!is_modify("model"));
    }

    #[test]
    fn test_pick() {
        let options = vec!["Study".to_string(), "Read".to_string()];
        assert_eq!(pick(&options, "read"), Some(&options[1]));
        assert_eq!(pick(&options, "Gym"), None);
    }
}
