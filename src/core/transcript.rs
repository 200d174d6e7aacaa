//! Transcript record format.
//!
//! Every persona's conversation is stored as Markdown: one bolded role marker
//! line per turn followed by an italic timestamp line. [`format_entry`] is the
//! only writer of that format and [`reconcile`] the only reader, so changing
//! the markup means changing this file alone.

use crate::core::message::{Turn, TurnRole};

pub const USER_MARKER: &str = "**😊 你:**";
pub const MODEL_MARKER: &str = "**🤖 AI:**";
pub const TIME_PREFIX: &str = "*time: ";

/// Timestamp layout used for the `*time: ...*` line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn marker_for(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => USER_MARKER,
        TurnRole::Model => MODEL_MARKER,
    }
}

/// Render one turn as a transcript record, leading blank line included.
pub fn format_entry(role: TurnRole, text: &str, timestamp: &str) -> String {
    format!(
        "\n{} {}\n{}{}*\n",
        marker_for(role),
        text,
        TIME_PREFIX,
        timestamp
    )
}

/// Rebuild the ordered turn list from raw transcript text.
///
/// Only lines that start with a role marker produce turns. Timestamps, blank
/// lines, continuation lines of multi-line messages and anything else are
/// skipped, and a marker with nothing after it yields no turn.
pub fn reconcile(raw: &str) -> Vec<Turn> {
    raw.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Turn> {
    let (role, rest) = if let Some(rest) = line.strip_prefix(USER_MARKER) {
        (TurnRole::User, rest)
    } else if let Some(rest) = line.strip_prefix(MODEL_MARKER) {
        (TurnRole::Model, rest)
    } else {
        return None;
    };

    let text = rest.trim();
    if text.is_empty() {
        None
    } else {
        Some(Turn::new(role, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciles_user_and_model_turns_in_order() {
        let raw = "**😊 你:** hello\n*time: 2024-01-01 00:00:00*\n**🤖 AI:** hi there\n*time: 2024-01-01 00:00:01*\n";
        assert_eq!(
            reconcile(raw),
            vec![Turn::user("hello"), Turn::model("hi there")]
        );
    }

    #[test]
    fn empty_input_yields_no_turns() {
        assert!(reconcile("").is_empty());
    }

    #[test]
    fn timestamps_and_blank_lines_are_ignored() {
        let raw = "\n*time: 2024-01-01 00:00:00*\n\n\n*time: 2024-01-02 00:00:00*\n";
        assert!(reconcile(raw).is_empty());
    }

    #[test]
    fn markers_without_text_are_dropped() {
        let raw = "**😊 你:**\n**🤖 AI:**    \n";
        assert!(reconcile(raw).is_empty());
    }

    #[test]
    fn marker_must_start_the_line() {
        let raw = "note: **😊 you said:** nothing\n  **🤖 AI:** indented\nquoted **😊 你:** hello\n";
        assert!(reconcile(raw).is_empty());
    }

    #[test]
    fn turns_need_not_alternate() {
        let raw = "**😊 你:** one\n**😊 你:** two\n**🤖 AI:** three\n";
        let turns = reconcile(raw);
        assert_eq!(turns.len(), 3);
        assert!(turns[0].is_user() && turns[1].is_user() && turns[2].is_model());
    }

    #[test]
    fn only_the_marker_line_of_a_multiline_message_survives() {
        let entry = format_entry(TurnRole::Model, "first line\nsecond line", "2024-01-01 00:00:00");
        assert_eq!(reconcile(&entry), vec![Turn::model("first line")]);
    }

    #[test]
    fn format_entry_matches_transcript_layout() {
        let entry = format_entry(TurnRole::User, "hello", "2024-01-01 00:00:00");
        assert_eq!(entry, "\n**😊 你:** hello\n*time: 2024-01-01 00:00:00*\n");
    }

    #[test]
    fn malformed_lines_between_records_are_skipped() {
        let raw = "# notes\n**😊 你:** question\ngarbage ** line\n*time: x*\n**🤖 AI:** answer\n";
        assert_eq!(
            reconcile(raw),
            vec![Turn::user("question"), Turn::model("answer")]
        );
    }
}
