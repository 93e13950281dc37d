//! Table-driven intent classification

use serde::{Deserialize, Serialize};

use super::input::normalize;

/// Literal command the UI sends when a session opens
pub const GREETING_COMMAND: &str = "_SALUDO_INICIAL_";

/// Planning modes reachable from idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Combo,
    Contract,
    Transition,
    Ticket,
}

/// What a command asks for, before any mode gets to see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Cancel,
    Enter(ModeKind),
    Unstructured,
}

const CANCEL_WORDS: &[&str] = &["cancel", "cancelar", "/cancel", "abort", "abortar"];

/// Checked in order; the first table with a matching word wins
const MODE_KEYWORDS: &[(ModeKind, &[&str])] = &[
    (ModeKind::Combo, &["combo"]),
    (
        ModeKind::Contract,
        &[
            "design",
            "designing",
            "contract",
            "forge",
            "diseño",
            "diseñar",
            "diseno",
            "disenar",
            "contrato",
            "forjar",
        ],
    ),
    (
        ModeKind::Transition,
        &["transition", "gap", "plan", "bache", "transición", "transicion"],
    ),
    (ModeKind::Ticket, &["ticket", "pass", "pase"]),
];

/// Classify a raw command
pub fn classify(command: &str) -> Intent {
    if command.trim() == GREETING_COMMAND {
        return Intent::Greeting;
    }

    let text = normalize(command);
    if CANCEL_WORDS.contains(&text.as_str()) {
        return Intent::Cancel;
    }

    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    for (kind, keywords) in MODE_KEYWORDS {
        if words.iter().any(|w| keywords.contains(w)) {
            return Intent::Enter(*kind);
        }
    }

    Intent::Unstructured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_literal() {
        assert_eq!(classify("_SALUDO_INICIAL_"), Intent::Greeting);
        assert_ne!(classify("_saludo_inicial_"), Intent::Greeting);
    }

    #[test]
    fn test_cancel_forms() {
        assert_eq!(classify("cancel"), Intent::Cancel);
        assert_eq!(classify("Cancelar"), Intent::Cancel);
        assert_eq!(classify("/cancel"), Intent::Cancel);
        assert_ne!(classify("please cancel my plan"), Intent::Cancel);
    }

    #[test]
    fn test_mode_keywords() {
        assert_eq!(classify("forge a contract"), Intent::Enter(ModeKind::Contract));
        assert_eq!(classify("quiero diseñar algo"), Intent::Enter(ModeKind::Contract));
        assert_eq!(classify("activate transition"), Intent::Enter(ModeKind::Transition));
        assert_eq!(classify("I have a gap before dinner"), Intent::Enter(ModeKind::Transition));
        assert_eq!(classify("activar bache"), Intent::Enter(ModeKind::Transition));
        assert_eq!(classify("give me a pass"), Intent::Enter(ModeKind::Ticket));
        assert_eq!(classify("activate ticket"), Intent::Enter(ModeKind::Ticket));
    }

    #[test]
    fn test_combo_wins_over_contract() {
        assert_eq!(classify("combo contract"), Intent::Enter(ModeKind::Combo));
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(classify("what a planet"), Intent::Unstructured);
        assert_eq!(classify("passing by"), Intent::Unstructured);
        assert_eq!(classify("how are you?"), Intent::Unstructured);
    }
}
