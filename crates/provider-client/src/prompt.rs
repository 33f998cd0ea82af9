//! Category detection and prompt construction for the AI-only provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shape the AI-only provider is asked to return.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DraftPayload {
    pub category: String,
    pub alternatives: Vec<AlternativeDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlternativeDraft {
    pub id: String,
    pub brand: String,
    pub model: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    /// Display price, e.g. "₹1,299".
    pub price_estimate: Option<String>,
    /// Price in whole rupees.
    pub price_raw: Option<f64>,
    pub rating_estimate: Option<f64>,
    pub rating_count: Option<u64>,
    pub specs: Vec<String>,
    pub why_pick: String,
    pub tradeoffs: String,
    /// Product page, or a marketplace search URL when no page is known.
    pub source_url: String,
    /// "amazon", "flipkart" or "other".
    pub source_site: String,
}

struct CategoryRule {
    label: &'static str,
    any: &'static [&'static str],
    with_any: &'static [&'static str],
    without: &'static [&'static str],
}

/// `word` occurs in `title` at the start of a word, so "phone" never
/// matches inside "headphones".
fn has_word(title: &str, word: &str) -> bool {
    title.match_indices(word).any(|(idx, _)| {
        title[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

impl CategoryRule {
    fn matches(&self, title: &str) -> bool {
        let hit = |words: &[&str]| words.iter().any(|w| has_word(title, w));
        hit(self.any)
            && (self.with_any.is_empty() || hit(self.with_any))
            && !hit(self.without)
    }
}

// Accessories and furniture come first so "laptop stand table" never lands
// in "laptop".
const RULES: &[CategoryRule] = &[
    CategoryRule {
        label: "laptop table/desk",
        any: &["table", "desk", "stand table", "workstation"],
        with_any: &["laptop", "adjustable", "height", "foldable", "portable"],
        without: &[],
    },
    CategoryRule {
        label: "laptop backpack",
        any: &["backpack", "bag pack", "rucksack"],
        with_any: &["laptop", "notebook", "macbook", "15", "16", "17"],
        without: &[],
    },
    CategoryRule {
        label: "laptop accessory",
        any: &["case", "cover", "sleeve", "bag", "pouch", "holder"],
        with_any: &["laptop", "notebook", "macbook"],
        without: &[],
    },
    CategoryRule {
        label: "phone accessory",
        any: &["case", "cover", "sleeve", "pouch", "holder", "protector"],
        with_any: &["phone", "mobile", "iphone", "smartphone"],
        without: &[],
    },
    CategoryRule {
        label: "charger/cable",
        any: &["charger", "adapter", "cable", "charging"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "stand/mount",
        any: &["stand", "mount", "holder"],
        with_any: &[],
        without: &["tv", "monitor"],
    },
    CategoryRule {
        label: "laptop",
        any: &["laptop", "notebook", "chromebook", "macbook"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "keyboard",
        any: &["keyboard"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "mouse",
        any: &["mouse"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "smartphone",
        any: &["phone", "smartphone", "mobile", "iphone"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "tablet",
        any: &["tablet", "ipad"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "speaker",
        any: &["speaker", "soundbar"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "earbuds",
        any: &["earbuds", "headphones", "earphones", "airpods", "buds"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "smartwatch",
        any: &["watch", "smartwatch"],
        with_any: &[],
        without: &[],
    },
    CategoryRule {
        label: "monitor",
        any: &["monitor", "display", "screen"],
        with_any: &[],
        without: &[],
    },
];

/// Guess a product category from a title. Falls back to `default_label`.
pub fn detect_category(title: &str, default_label: &str) -> String {
    let lowered = title.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| default_label.to_string())
}

/// Build the AI-only provider prompt for one reference.
pub fn build_prompt(
    title: &str,
    category: &str,
    reference_url: &str,
    min_items: usize,
    max_items: usize,
) -> String {
    let schema = schemars::schema_for!(DraftPayload);
    let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_default();
    let product: String = title.chars().take(120).collect();

    format!(
        r#"Product: {product}
Category: {category}
Reference: {reference_url}

Find {min_items} to {max_items} REAL EXISTING {category} products that are good alternatives to the product above.

RULES:
1. Every alternative MUST be a {category}, in the same category as the reference product.
2. Use real brand names and model numbers sold on Amazon.in or Flipkart.
3. Prices are estimates in Indian rupees.
4. source_url must be a product page you are confident exists, otherwise a marketplace search URL such as https://www.amazon.in/s?k=Brand+Model.
5. Use ids "1", "2", ... in order.

Output strictly valid JSON conforming to the schema below, with "category" set to "{category}".
Do NOT add commentary.

JSON Schema:
{schema_json}
"#
    )
}
