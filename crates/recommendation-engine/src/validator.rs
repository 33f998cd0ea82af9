//! Provider response validation.
//!
//! Every provider payload passes through here, whatever its source: JSON
//! is pulled out of the body by an ordered chain of strategies, incomplete
//! alternatives are dropped, and the survivors are bounded by policy.

use std::collections::BTreeSet;

use chrono::Utc;
use common::config::PolicyConfig;
use common::{
    Alternative, ProductReference, ProviderError, RecommendationResult, SourcePlatform,
    ValidationFlags,
};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("insufficient results: {found} < {required}")]
    InsufficientResults { found: usize, required: usize },
}

impl From<ValidationError> for ProviderError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MalformedPayload(msg) => ProviderError::MalformedPayload(msg),
            ValidationError::InsufficientResults { found, required } => {
                ProviderError::InsufficientResults { found, required }
            }
        }
    }
}

type ExtractStrategy = fn(&str) -> Option<Value>;

/// Tried in order; the first one that yields a JSON object wins.
const EXTRACTION_CHAIN: &[(&str, ExtractStrategy)] = &[
    ("raw", parse_raw),
    ("fenced", parse_fenced),
    ("braces", parse_braces),
];

fn as_object(value: Value) -> Option<Value> {
    value.is_object().then_some(value)
}

fn parse_raw(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok().and_then(as_object)
}

/// Body of the first ``` fence. A missing closing fence (truncated output)
/// takes everything to the end of the text.
fn parse_fenced(text: &str) -> Option<Value> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an optional language tag such as `json`.
    let body_start = after_fence
        .find('\n')
        .filter(|idx| {
            after_fence[..*idx]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        })
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let body = &after_fence[body_start..];
    let body = body.find("```").map(|end| &body[..end]).unwrap_or(body);
    serde_json::from_str(body.trim()).ok().and_then(as_object)
}

fn parse_braces(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok().and_then(as_object)
}

/// Run the extraction chain. Returns the winning strategy name with the
/// parsed object.
pub fn extract_json(text: &str) -> Result<(&'static str, Value), ValidationError> {
    EXTRACTION_CHAIN
        .iter()
        .find_map(|(name, strategy)| strategy(text).map(|value| (*name, value)))
        .ok_or_else(|| {
            let preview: String = text.chars().take(80).collect();
            ValidationError::MalformedPayload(format!("no JSON object found in: {preview:?}"))
        })
}

/// First numeric run in a value: `"₹1,299.00"` → 1299.0, `"4.3 out of 5"`
/// → 4.3. Anything else is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn parse_leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut digits = String::new();
    let mut seen_dot = false;
    for c in text[start..].chars() {
        match c {
            '0'..='9' => digits.push(c),
            ',' => {}
            '.' if !seen_dot => {
                seen_dot = true;
                digits.push(c);
            }
            _ => break,
        }
    }
    digits.trim_end_matches('.').parse().ok()
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| obj.get(*name).filter(|v| !v.is_null()))
}

fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    let value = field(obj, names)?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_list(obj: &Map<String, Value>, names: &[&str]) -> Vec<String> {
    field(obj, names)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Build an alternative from one payload entry, or `None` when any of the
/// required fields is missing.
fn parse_alternative(entry: &Value) -> Option<Alternative> {
    let obj = entry.as_object()?;

    let id = text_field(obj, &["id"])?;
    let brand = text_field(obj, &["brand"])?;
    let title = text_field(obj, &["title"])?;
    let source_url = text_field(obj, &["source_url", "sourceUrl"])?;

    let source_site = text_field(obj, &["source_site", "sourceSite"])
        .map(|tag| SourcePlatform::from_tag(&tag))
        .filter(|site| *site != SourcePlatform::Unknown)
        .unwrap_or_else(|| SourcePlatform::from_url(&source_url));

    // Zero is the upstream placeholder for "price unknown".
    let price_raw = field(obj, &["price_raw", "priceRaw"])
        .and_then(coerce_number)
        .filter(|p| *p > 0.0);
    let rating_estimate = field(obj, &["rating_estimate", "ratingEstimate", "rating"])
        .and_then(coerce_number)
        .filter(|r| *r >= 0.0);
    let rating_count = field(
        obj,
        &["rating_count", "rating_count_estimate", "ratingCount"],
    )
    .and_then(coerce_number)
    .filter(|c| *c >= 0.0)
    .map(|c| c as u64);

    Some(Alternative {
        id,
        brand,
        model: text_field(obj, &["model"]),
        title,
        image_url: text_field(obj, &["image_url", "imageUrl"]).unwrap_or_default(),
        price_estimate: text_field(obj, &["price_estimate", "priceEstimate"]).unwrap_or_default(),
        price_raw,
        rating_estimate,
        rating_count,
        specs: string_list(obj, &["specs"]),
        why_pick: text_field(obj, &["why_pick", "whyPick"]).unwrap_or_default(),
        tradeoffs: text_field(obj, &["tradeoffs"]).unwrap_or_default(),
        source_url,
        source_site,
    })
}

/// Enforces shape and count invariants on provider output.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    min_accepted: usize,
    max_accepted: usize,
    default_category: String,
}

impl ResponseValidator {
    pub fn new(policy: &PolicyConfig) -> Self {
        Self {
            min_accepted: policy.min_accepted,
            max_accepted: policy.max_accepted.max(policy.min_accepted),
            default_category: policy.default_category.clone(),
        }
    }

    pub fn min_accepted(&self) -> usize {
        self.min_accepted
    }

    pub fn max_accepted(&self) -> usize {
        self.max_accepted
    }

    pub fn validate(
        &self,
        raw: &str,
        reference: &ProductReference,
    ) -> Result<RecommendationResult, ValidationError> {
        let (extraction, document) = extract_json(raw)?;
        let obj = document
            .as_object()
            .ok_or_else(|| ValidationError::MalformedPayload("payload is not an object".into()))?;

        let mut flags = ValidationFlags {
            extraction: extraction.to_string(),
            ..ValidationFlags::default()
        };

        let category = match text_field(obj, &["category"]) {
            Some(category) => category,
            None => {
                flags.category_defaulted = true;
                self.default_category.clone()
            }
        };

        let entries = obj
            .get("alternatives")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ValidationError::MalformedPayload("missing alternatives array".into())
            })?;

        let mut alternatives: Vec<Alternative> =
            entries.iter().filter_map(parse_alternative).collect();
        flags.dropped_entries = entries.len() - alternatives.len();

        if alternatives.len() < self.min_accepted {
            return Err(ValidationError::InsufficientResults {
                found: alternatives.len(),
                required: self.min_accepted,
            });
        }

        if alternatives.len() > self.max_accepted {
            flags.truncated_entries = alternatives.len() - self.max_accepted;
            alternatives.truncate(self.max_accepted);
        }

        let mut warnings: BTreeSet<String> = obj
            .get("meta")
            .and_then(|m| m.get("warnings"))
            .and_then(|w| w.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|w| w.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default();
        if flags.dropped_entries > 0 {
            warnings.insert(format!(
                "dropped {} incomplete alternatives",
                flags.dropped_entries
            ));
        }

        debug!(
            "validated payload via {}: {} kept, {} dropped, {} truncated",
            flags.extraction,
            alternatives.len(),
            flags.dropped_entries,
            flags.truncated_entries
        );

        Ok(RecommendationResult {
            reference: reference.clone(),
            category,
            alternatives,
            warnings,
            validation: flags,
            query_time: Utc::now(),
        })
    }
}
