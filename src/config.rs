//! Configuration loader: .env file, config.toml, then environment overrides.

use std::path::Path;

use common::{AppConfig, Error};

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.primary.base_url.trim().is_empty() {
        issues.push("primary.base_url must not be empty".into());
    }
    if config.primary.timeout_secs == 0 {
        issues.push("primary.timeout_secs must be > 0".into());
    }

    if config.secondary.timeout_secs == 0 {
        issues.push("secondary.timeout_secs must be > 0".into());
    }
    if config.secondary.max_attempts == 0 {
        issues.push("secondary.max_attempts must be >= 1".into());
    }
    if config.secondary.requests_per_minute == 0 {
        issues.push("secondary.requests_per_minute must be > 0".into());
    }
    if config.secondary.model.trim().is_empty() {
        issues.push("secondary.model must not be empty".into());
    }

    if config.sellers.timeout_secs == 0 {
        issues.push("sellers.timeout_secs must be > 0".into());
    }
    if config.sellers.marketplaces.is_empty() {
        issues.push("sellers.marketplaces must contain at least one marketplace".into());
    }
    for market in &config.sellers.marketplaces {
        if !market.search_url.contains("{query}") {
            issues.push(format!(
                "sellers.marketplaces[{}].search_url must contain {{query}}",
                market.name
            ));
        }
    }

    if config.policy.min_accepted == 0 {
        issues.push("policy.min_accepted must be >= 1".into());
    }
    if config.policy.max_accepted < config.policy.min_accepted {
        issues.push("policy.max_accepted must be >= policy.min_accepted".into());
    }

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.cache.recent_capacity == 0 {
        issues.push("cache.recent_capacity must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides through `lookup` so tests need not touch
/// the process environment.
fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(url) = lookup("PRIMARY_BASE_URL").and_then(non_empty) {
        config.primary.base_url = url;
    }
    if let Some(url) = lookup("SELLER_SERVICE_URL").and_then(non_empty) {
        config.sellers.service_url = url;
    }
    if let Some(model) = lookup("GEMINI_MODEL").and_then(non_empty) {
        config.secondary.model = model;
    }
    if let Some(device) = lookup("USE_DEVICE").and_then(non_empty) {
        config.device = device.to_ascii_lowercase();
    }

    // Environment keys replace file keys entirely, primary first.
    let env_keys: Vec<String> = ["GEMINI_API_KEY", "GEMINI_API_KEY_BACKUP"]
        .into_iter()
        .filter_map(|name| lookup(name).and_then(non_empty))
        .collect();
    if !env_keys.is_empty() {
        config.secondary.api_keys = env_keys;
    }

    if let Some(raw) = lookup("RECOMMEND_MIN_ACCEPTED") {
        config.policy.min_accepted = parse_positive_u64(&raw, "RECOMMEND_MIN_ACCEPTED")? as usize;
    }
    if let Some(raw) = lookup("RECOMMEND_MAX_ACCEPTED") {
        config.policy.max_accepted = parse_positive_u64(&raw, "RECOMMEND_MAX_ACCEPTED")? as usize;
    }
    if let Some(raw) = lookup("CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "CACHE_TTL_SECS")?;
    }
    Ok(())
}

/// Load configuration from `.env`, an optional `config.toml`, and the
/// environment (highest priority).
pub fn load_config(config_path: &Path) -> Result<AppConfig, Error> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let mut config = AppConfig::default();

    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|source| Error::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    }

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("PRIMARY_BASE_URL", "https://backend.example.run.app"),
                ("GEMINI_API_KEY", "key-a"),
                ("GEMINI_API_KEY_BACKUP", "  key-b "),
                ("RECOMMEND_MAX_ACCEPTED", "8"),
                ("CACHE_TTL_SECS", "120"),
                ("USE_DEVICE", "IOS"),
            ]),
        )
        .expect("overrides apply");

        assert_eq!(config.primary.base_url, "https://backend.example.run.app");
        assert_eq!(config.secondary.api_keys, vec!["key-a", "key-b"]);
        assert_eq!(config.policy.max_accepted, 8);
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.device, "ios");
    }

    #[test]
    fn test_blank_backup_key_is_ignored() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("GEMINI_API_KEY", "key-a"), ("GEMINI_API_KEY_BACKUP", "")]),
        )
        .expect("overrides apply");
        assert_eq!(config.secondary.api_keys, vec!["key-a"]);
    }

    #[test]
    fn test_bad_numeric_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("CACHE_TTL_SECS", "ten")]))
            .expect_err("rejected");
        assert!(err.to_string().contains("CACHE_TTL_SECS"));

        let err = apply_env_overrides(&mut config, env(&[("RECOMMEND_MIN_ACCEPTED", "0")]))
            .expect_err("rejected");
        assert!(err.to_string().contains("RECOMMEND_MIN_ACCEPTED"));
    }

    #[test]
    fn test_validation_collects_every_issue() {
        let mut config = AppConfig::default();
        config.policy.min_accepted = 5;
        config.policy.max_accepted = 3;
        config.cache.ttl_secs = 0;
        config.sellers.marketplaces[0].search_url = "https://www.amazon.in/s".into();

        let msg = validate_config(&config).expect_err("invalid").to_string();
        assert!(msg.contains("policy.max_accepted"));
        assert!(msg.contains("cache.ttl_secs"));
        assert!(msg.contains("sellers.marketplaces[Amazon]"));
    }

    #[test]
    fn test_unreadable_config_is_io_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // A directory exists but cannot be read as a file.
        let err = load_config(tmp.path()).expect_err("unreadable");
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn test_toml_sections_merge_with_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            device = "ios"

            [primary]
            base_url = "https://backend.example.run.app"

            [policy]
            max_accepted = 4
            "#,
        )
        .expect("parses");
        assert_eq!(parsed.primary.timeout_secs, 150);
        assert_eq!(parsed.policy.min_accepted, 2);
        assert_eq!(parsed.policy.max_accepted, 4);
        assert!(validate_config(&parsed).is_ok());
    }
}
