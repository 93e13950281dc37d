//! Greeting and small-talk prompt

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use super::state::{ChatRole, ChatTurn};

/// Shown when the chat collaborator fails, times out, or says nothing
pub const APOLOGY: &str = "My cognitive core had an overload. Try again.";

/// `morning` 05-11, `afternoon` 12-19, `night` otherwise
pub fn part_of_day(now: NaiveDateTime) -> &'static str {
    match now.hour() {
        5..=11 => "morning",
        12..=19 => "afternoon",
        _ => "night",
    }
}

/// Opening line: a full welcome on the first visit of the day, shorter after
pub fn greeting(user_name: &str, now: NaiveDateTime, last_interaction: Option<NaiveDateTime>) -> String {
    let first_today = last_interaction.is_none_or(|last| last.date() != now.date());
    if first_today {
        let when = match part_of_day(now) {
            "night" => "tonight".to_string(),
            part => format!("this {}", part),
        };
        format!("Hello. Welcome, {}. How can I help you {}?", user_name, when)
    } else {
        format!(
            "Hi {}, welcome back. Shall we review contracts, forge a new one, or just talk?",
            user_name
        )
    }
}

/// Persona preamble, recent turns, then the new message
pub fn chat_prompt(user_name: &str, history: &[ChatTurn], message: &str) -> String {
    let mut prompt = format!(
        "You are the Guardian, an AI companion to {}. You are direct, wise and motivating. \
         Keep replies short.\n",
        user_name
    );
    if !history.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for turn in history {
            let speaker = match turn.role {
                ChatRole::User => user_name,
                ChatRole::Assistant => "Guardian",
            };
            let _ = writeln!(prompt, "{}: {}", speaker, turn.content);
        }
    }
    let _ = write!(prompt, "\n{} says: '{}'", user_name, message);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_part_of_day_buckets() {
        assert_eq!(part_of_day(at(4)), "night");
        assert_eq!(part_of_day(at(5)), "morning");
        assert_eq!(part_of_day(at(12)), "afternoon");
        assert_eq!(part_of_day(at(19)), "afternoon");
        assert_eq!(part_of_day(at(20)), "night");
    }

    #[test]
    fn test_first_visit_of_day() {
        assert_eq!(
            greeting("Juan", at(9), None),
            "Hello. Welcome, Juan. How can I help you this morning?"
        );
        let yesterday = at(22) - Duration::days(1);
        assert!(greeting("Juan", at(21), Some(yesterday)).ends_with("tonight?"));
    }

    #[test]
    fn test_welcome_back_same_day() {
        let text = greeting("Ana", at(15), Some(at(9)));
        assert!(text.starts_with("Hi Ana, welcome back."));
    }

    #[test]
    fn test_chat_prompt_includes_history() {
        let history = vec![ChatTurn::user("I'm tired"), ChatTurn::assistant("Rest a bit.")];
        let prompt = chat_prompt("Juan", &history, "ok, now what?");
        assert!(prompt.starts_with("You are the Guardian"));
        assert!(prompt.contains("Juan: I'm tired\nGuardian: Rest a bit."));
        assert!(prompt.ends_with("Juan says: 'ok, now what?'"));
    }
}
