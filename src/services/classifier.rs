//! Conversational guard in front of the recommendation pipeline.
//!
//! Greetings, farewells and thanks get a canned reply without spending an
//! embedding or generation call. Matching is exact (case-insensitive,
//! whitespace-trimmed) against small fixed phrase sets, never substring or
//! fuzzy: "hi there, I need shampoo" must still reach the pipeline.

const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good evening", "hola"];
const FAREWELLS: &[&str] = &["bye", "goodbye"];
const THANKS: &[&str] = &["thanks", "thank you"];

pub const GREETING_REPLY: &str =
    "Hello! 👋 I am your AI shopping assistant. How can I help you today? (e.g., 'I have dry hair')";
pub const FAREWELL_REPLY: &str =
    "Goodbye! 👋 If you have any questions later, feel free to ask.";
pub const THANKS_REPLY: &str = "You're welcome! Let me know if you need anything else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Greeting,
    Farewell,
    Thanks,
    Substantive,
}

pub fn classify(query: &str) -> QueryKind {
    let normalized = query.trim().to_lowercase();

    if GREETINGS.contains(&normalized.as_str()) {
        QueryKind::Greeting
    } else if FAREWELLS.contains(&normalized.as_str()) {
        QueryKind::Farewell
    } else if THANKS.contains(&normalized.as_str()) {
        QueryKind::Thanks
    } else {
        QueryKind::Substantive
    }
}

/// The canned reply for a conversational query, `None` for substantive ones.
pub fn canned_reply(kind: QueryKind) -> Option<&'static str> {
    match kind {
        QueryKind::Greeting => Some(GREETING_REPLY),
        QueryKind::Farewell => Some(FAREWELL_REPLY),
        QueryKind::Thanks => Some(THANKS_REPLY),
        QueryKind::Substantive => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_and_whitespace_variants() {
        assert_eq!(classify("hi"), QueryKind::Greeting);
        assert_eq!(classify("  HELLO  "), QueryKind::Greeting);
        assert_eq!(classify("Good Morning"), QueryKind::Greeting);
        assert_eq!(classify("\tbye\n"), QueryKind::Farewell);
        assert_eq!(classify("Thank You"), QueryKind::Thanks);
    }

    #[test]
    fn exact_match_only() {
        // Phrases that merely contain a greeting are substantive.
        assert_eq!(classify("hi there, I need shampoo"), QueryKind::Substantive);
        assert_eq!(classify("say hello to conditioner"), QueryKind::Substantive);
        assert_eq!(classify("thanks for nothing, find me soap"), QueryKind::Substantive);
    }

    #[test]
    fn product_queries_are_substantive() {
        assert_eq!(classify("I have dandruff"), QueryKind::Substantive);
        assert_eq!(classify("something for sleep"), QueryKind::Substantive);
        assert_eq!(classify(""), QueryKind::Substantive);
    }

    #[test]
    fn canned_replies_cover_all_conversational_kinds() {
        assert_eq!(canned_reply(QueryKind::Greeting), Some(GREETING_REPLY));
        assert_eq!(canned_reply(QueryKind::Farewell), Some(FAREWELL_REPLY));
        assert_eq!(canned_reply(QueryKind::Thanks), Some(THANKS_REPLY));
        assert_eq!(canned_reply(QueryKind::Substantive), None);
    }
}
