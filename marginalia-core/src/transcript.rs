// Transcript parsing
// Splits a raw "A: ... / User: ..." transcript into role-tagged messages

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Message, Role};

// A marker only counts at the start of a line. It must not consume the
// newline that follows it, or a marker on the next line would be missed.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:Assistant:|AI:|A:|User:)").unwrap());

/// Parse a transcript into an ordered list of messages.
///
/// Never fails: text without any markers yields an empty list, preamble
/// before the first marker is dropped, and turns with no content are skipped.
pub fn parse_transcript(text: &str) -> Vec<Message> {
    let text = text.trim();

    let markers: Vec<(Role, usize, usize)> = MARKER
        .find_iter(text)
        .filter_map(|m| Role::from_marker(m.as_str()).map(|role| (role, m.start(), m.end())))
        .collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, &(role, _, content_start))| {
            let content_end = markers
                .get(i + 1)
                .map(|&(_, next_start, _)| next_start)
                .unwrap_or(text.len());

            let content = text[content_start..content_end].trim();
            if content.is_empty() {
                None
            } else {
                Some(Message::new(role, content))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles_and_content(messages: &[Message]) -> Vec<(Role, &str)> {
        messages.iter().map(|m| (m.role, m.content.as_str())).collect()
    }

    #[test]
    fn test_alternating_turns() {
        let messages = parse_transcript("A: x\nUser: y\nA: z");
        assert_eq!(
            roles_and_content(&messages),
            vec![(Role::Assistant, "x"), (Role::User, "y"), (Role::Assistant, "z")]
        );
    }

    #[test]
    fn test_no_markers_is_empty() {
        assert!(parse_transcript("").is_empty());
        assert!(parse_transcript("   \n\n ").is_empty());
        assert!(parse_transcript("Just some notes with no speaker labels").is_empty());
        assert!(parse_transcript("Interviewer: hello\nRespondent: hi").is_empty());
    }

    #[test]
    fn test_mid_line_marker_is_content() {
        let messages = parse_transcript("A: hello User: not a marker");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert!(messages[0].content.contains("User: not a marker"));
    }

    #[test]
    fn test_empty_span_is_dropped() {
        let messages = parse_transcript("A:\nUser: hi");
        assert_eq!(messages, vec![Message::new(Role::User, "hi")]);
    }

    #[test]
    fn test_consecutive_markers() {
        let messages = parse_transcript("User:\nAI:\nAssistant: finally\nUser:   ");
        assert_eq!(messages, vec![Message::new(Role::Assistant, "finally")]);
    }

    #[test]
    fn test_preamble_is_discarded() {
        let text = "Interview transcript #12\nRecorded 2025-03-01\n\nAI: Welcome!\nUser: Thanks.";
        let messages = parse_transcript(text);
        assert_eq!(
            roles_and_content(&messages),
            vec![(Role::Assistant, "Welcome!"), (Role::User, "Thanks.")]
        );
    }

    #[test]
    fn test_all_assistant_variants() {
        let messages = parse_transcript("A: one\nAI: two\nAssistant: three");
        assert!(messages.iter().all(|m| m.role == Role::Assistant));
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_whitespace_after_colon_optional() {
        let messages = parse_transcript("User:tight\nA:also tight");
        assert_eq!(
            roles_and_content(&messages),
            vec![(Role::User, "tight"), (Role::Assistant, "also tight")]
        );
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let messages = parse_transcript("A: question\nuser: lowercase is content\nUSER: so is this");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("user: lowercase is content"));
        assert!(messages[0].content.contains("USER: so is this"));
    }

    #[test]
    fn test_indented_marker_is_content() {
        let messages = parse_transcript("A: quote follows\n  User: indented");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.ends_with("User: indented"));
    }

    #[test]
    fn test_multiline_content_is_preserved() {
        let text = "A: First line\nsecond line\n\nthird paragraph\nUser: reply";
        let messages = parse_transcript(text);
        assert_eq!(messages[0].content, "First line\nsecond line\n\nthird paragraph");
        assert_eq!(messages[1].content, "reply");
    }

    #[test]
    fn test_crlf_line_endings() {
        let messages = parse_transcript("A: x\r\nUser: y\r\n");
        assert_eq!(
            roles_and_content(&messages),
            vec![(Role::Assistant, "x"), (Role::User, "y")]
        );
    }

    #[test]
    fn test_leading_whitespace_before_first_marker() {
        let messages = parse_transcript("\n\n   User: hi there");
        assert_eq!(messages, vec![Message::new(Role::User, "hi there")]);
    }
}
