//! Record ID generation and recognition
//!
//! All IDs use the format: `{PREFIX}-{4 uppercase alphanumerics}` where the
//! prefix is one of the record kinds (`CTR`, `BCH`, `TKT`).
//! Example: `CTR-4KQ2`

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

/// Characters drawn for the random suffix
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random suffix
pub const SUFFIX_LEN: usize = 4;

static ID_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(CTR|BCH|TKT)-[A-Z0-9]{4}$").expect("id pattern compiles"));

/// Generate a record ID under `prefix`
pub fn generate_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", prefix, suffix)
}

/// Check whether `token` has the shape of a record ID
pub fn is_record_id(token: &str) -> bool {
    ID_SHAPE.is_match(token)
}

/// Find the first record ID in free text
///
/// Matching is case-sensitive so hyphenated words ("one-time") stay words.
pub fn find_record_id(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-'))
        .find(|token| is_record_id(token))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = generate_id("CTR", &mut rng);
        assert!(id.starts_with("CTR-"));
        assert_eq!(id.len(), 8);
        assert!(is_record_id(&id));
    }

    #[test]
    fn test_ten_thousand_ids_do_not_collide() {
        let mut rng = StdRng::seed_from_u64(20_261_019);
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id("CTR", &mut rng)).collect();
        // 36^4 slots puts the birthday expectation near 30 repeats per 10k draws;
        // the store re-keys on a clash, so the suffix only has to stay spread out.
        assert!(ids.len() >= 9_900, "unique ids: {}", ids.len());
    }

    #[test]
    fn test_is_record_id() {
        assert!(is_record_id("BCH-0A9Z"));
        assert!(!is_record_id("BCH-0A9"));
        assert!(!is_record_id("bch-0a9z"));
        assert!(!is_record_id("BCHX-0A9Z"));
        assert!(!is_record_id("ONE-TIME"));
        assert!(!is_record_id("ABC-1234"));
    }

    #[test]
    fn test_find_record_id() {
        assert_eq!(find_record_id("show me CTR-AB12 please"), Some("CTR-AB12".to_string()));
        assert_eq!(find_record_id("show me ctr-ab12 please"), None);
        assert_eq!(find_record_id("contract (TKT-7777)."), Some("TKT-7777".to_string()));
        assert_eq!(find_record_id("forge a contract"), None);
        assert_eq!(find_record_id("well-done"), None);
    }

    #[test]
    fn test_hyphenated_words_are_not_ids() {
        assert_eq!(find_record_id("forge a one-time contract"), None);
        assert_eq!(find_record_id("a two-part plan for HALF-TIME"), None);
        assert_eq!(find_record_id("ONE-TIME then BCH-2X9Q"), Some("BCH-2X9Q".to_string()));
    }
}
