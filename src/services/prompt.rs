//! Prompt construction and reply parsing for the generation provider.
//!
//! The only structured contract with the model is the `[CLARIFY]` sentinel:
//! it is instructed to prefix clarifying questions with the tag, and we
//! detect it with a plain substring test. The provider is non-deterministic,
//! so both failure modes are tolerated: a never-emitted tag means we always
//! recommend, an unexpected tag means we recommend nothing this turn.

use crate::models::Product;

pub const CLARIFY_TAG: &str = "[CLARIFY]";

/// Character budget per product description in the prompt context.
const DESCRIPTION_BUDGET: usize = 300;

const SYSTEM_INSTRUCTION: &str = "\
You are a helpful shopping assistant for ShopScout.

INSTRUCTIONS:
1. Analyze the User Query and the Available Products.
2. If the user's query is specific (e.g., \"dandruff\", \"sleep\"), recommend the TOP 4 matching products from the list.
3. Briefly explain WHY each of the 4 products is a good fit.
4. CRITICAL: If the query is too vague (e.g., just \"hair\", \"best product\", \"help\"), DO NOT recommend random items. Instead, ask a polite CLARIFYING QUESTION.
5. SIGNAL: If you are asking a clarifying question, start your response with the tag \"[CLARIFY]\".
6. Keep your answer concise and friendly.";

/// Builds the instruction + query + numbered product context prompt.
pub fn build_prompt(query: &str, products: &[Product]) -> String {
    let mut context = String::new();
    for (idx, product) in products.iter().enumerate() {
        context.push_str(&format!(
            "{}. {} - {}\n   Description: {}...\n\n",
            idx + 1,
            product.title,
            product.price,
            truncate_chars(&product.description, DESCRIPTION_BUDGET),
        ));
    }

    format!(
        "{}\n\nUser Query: {}\n\nAvailable Products:\n{}",
        SYSTEM_INSTRUCTION, query, context
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// The model asked for clarification; the tag has been stripped and the
    /// remainder trimmed.
    Clarification(String),
    /// The model produced a recommendation explanation, returned verbatim.
    Recommendation(String),
}

/// Interprets a raw model reply. The sentinel is matched anywhere in the
/// text, not only as a prefix, to tolerate leading whitespace or formatting
/// the provider may prepend.
pub fn parse_reply(reply: &str) -> ParsedReply {
    if reply.contains(CLARIFY_TAG) {
        ParsedReply::Clarification(reply.replace(CLARIFY_TAG, "").trim().to_string())
    } else {
        ParsedReply::Recommendation(reply.to_string())
    }
}

/// Truncates on a character boundary so multi-byte text cannot split.
fn truncate_chars(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EMBEDDING_DIM;
    use pgvector::Vector;

    fn product(title: &str, price: &str, description: &str) -> Product {
        Product {
            id: 1,
            title: title.to_string(),
            price: price.to_string(),
            description: description.to_string(),
            features: "Hair Care".to_string(),
            image_url: String::new(),
            category: "Hair Care".to_string(),
            product_url: String::new(),
            embedding: Vector::from(vec![0.0; EMBEDDING_DIM]),
        }
    }

    #[test]
    fn prompt_lists_products_in_order() {
        let products = vec![
            product("Hair Oil", "₹ 450", "Nourishing oil."),
            product("Scalp Serum", "₹ 951", "A lightweight serum."),
        ];
        let prompt = build_prompt("I have dandruff", &products);

        assert!(prompt.contains("User Query: I have dandruff"));
        assert!(prompt.contains("1. Hair Oil - ₹ 450"));
        assert!(prompt.contains("2. Scalp Serum - ₹ 951"));
        assert!(prompt.find("Hair Oil").unwrap() < prompt.find("Scalp Serum").unwrap());
    }

    #[test]
    fn prompt_bounds_description_length() {
        let long = "x".repeat(2000);
        let prompt = build_prompt("q", &[product("P", "₹ 1", &long)]);
        // Budget plus the "..." suffix, never the full description.
        assert!(!prompt.contains(&"x".repeat(301)));
        assert!(prompt.contains(&format!("{}...", "x".repeat(300))));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "₹".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "₹₹₹₹");
    }

    #[test]
    fn clarify_tag_at_start_is_detected_and_stripped() {
        let parsed = parse_reply("[CLARIFY] What kind of hair concern do you have?");
        assert_eq!(
            parsed,
            ParsedReply::Clarification("What kind of hair concern do you have?".to_string())
        );
    }

    #[test]
    fn clarify_tag_after_whitespace_is_still_detected() {
        let parsed = parse_reply("\n  [CLARIFY] Could you tell me more?");
        assert_eq!(
            parsed,
            ParsedReply::Clarification("Could you tell me more?".to_string())
        );
    }

    #[test]
    fn replies_without_the_tag_pass_through_verbatim() {
        let text = "1. Hair Oil is a great fit because...";
        assert_eq!(
            parse_reply(text),
            ParsedReply::Recommendation(text.to_string())
        );
    }
}
