use crate::config::RuleConfig;
use crate::domain_utils::HostRule;
use crate::url_extract::UrlExtractor;
use anyhow::Context;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

const FROM_LINE_PATTERN: &str = r#"(?im)^From:\s*(?P<disp>"?[^\n<"]+"?)\s*<(?P<addr>[^>]+)>"#;

/// Compiled, immutable rule set shared by every evaluation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub urgency_pattern: Regex,
    pub credential_pattern: Regex,
    pub risky_attachment_pattern: Regex,
    pub shortener_hosts: HashSet<String>,
    pub safe_domains: Vec<HostRule>,
    pub brand_keywords: Vec<String>,
    pub(crate) urls: UrlExtractor,
    pub(crate) from_line: Regex,
}

impl RuleSet {
    pub fn compile(config: &RuleConfig) -> anyhow::Result<Self> {
        let brand_keywords = config.brand_keywords.iter().fold(Vec::new(), |mut acc, b| {
            let b = b.trim().to_lowercase();
            if !b.is_empty() && !acc.contains(&b) {
                acc.push(b);
            }
            acc
        });

        let rules = RuleSet {
            urgency_pattern: compile_pattern("urgency_pattern", &config.urgency_pattern)?,
            credential_pattern: compile_pattern("credential_pattern", &config.credential_pattern)?,
            risky_attachment_pattern: compile_pattern(
                "risky_attachment_pattern",
                &config.risky_attachment_pattern,
            )?,
            shortener_hosts: config
                .shortener_hosts
                .iter()
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            safe_domains: config
                .safe_domains
                .iter()
                .filter_map(|d| HostRule::parse(d))
                .collect(),
            brand_keywords,
            urls: UrlExtractor::new().context("Failed to compile URL pattern")?,
            from_line: Regex::new(FROM_LINE_PATTERN).context("Failed to compile From pattern")?,
        };

        log::debug!(
            "Compiled rule set: {} shorteners, {} safe-domain rules, {} brand keywords",
            rules.shortener_hosts.len(),
            rules.safe_domains.len(),
            rules.brand_keywords.len()
        );

        Ok(rules)
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = RuleConfig::from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path))?;
        Self::compile(&config)
    }

    pub fn is_shortener(&self, host: &str) -> bool {
        self.shortener_hosts.contains(host)
    }

    pub fn is_safe_host(&self, host: &str) -> bool {
        self.safe_domains.iter().any(|rule| rule.matches(host))
    }

    pub fn url_extractor(&self) -> &UrlExtractor {
        &self.urls
    }
}

fn compile_pattern(name: &str, pattern: &str) -> anyhow::Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Invalid {}: {}", name, pattern))
}
