use super::{Cue, CueExtractor, MessageContext};
use crate::rules::RuleSet;

/// Host classification for every extracted URL.
///
/// Cues are emitted per occurrence, so a shortener linked twice is reported
/// twice.
pub struct LinkAnalyzer;

impl CueExtractor for LinkAnalyzer {
    fn extract(&self, context: &MessageContext<'_>, rules: &RuleSet) -> Vec<Cue> {
        let mut cues = Vec::new();

        for link in &context.urls {
            let host = link.host.as_str();

            if rules.is_shortener(host) {
                log::debug!("Detected shortened URL: {}", link.url);
                cues.push(Cue::UrlShortener(host.to_string()));
            }

            if rules.is_safe_host(host) {
                log::debug!("Recognized safe host {} in {}", host, link.url);
                cues.push(Cue::SafeDomain(host.to_string()));
            }
        }

        cues
    }

    fn name(&self) -> &str {
        "link_analyzer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn analyze_with(config: &RuleConfig, body: &str) -> Vec<Cue> {
        let rules = RuleSet::compile(config).unwrap();
        let context = MessageContext::new(body, "", &rules);
        LinkAnalyzer.extract(&context, &rules)
    }

    fn analyze(body: &str) -> Vec<Cue> {
        analyze_with(&RuleConfig::default(), body)
    }

    #[test]
    fn test_shortener_per_occurrence() {
        let cues = analyze("http://bit.ly/a and again http://BIT.LY/b");
        assert_eq!(
            cues,
            vec![
                Cue::UrlShortener("bit.ly".to_string()),
                Cue::UrlShortener("bit.ly".to_string())
            ]
        );
    }

    #[test]
    fn test_shortener_requires_exact_host() {
        assert!(analyze("http://www.bit.ly/a http://bit.ly.evil.com/b").is_empty());
    }

    #[test]
    fn test_safe_suffix_rule() {
        let cues = analyze("https://contoso.sharepoint.com/sites/x https://evilsharepoint.com/y");
        assert_eq!(
            cues,
            vec![Cue::SafeDomain("contoso.sharepoint.com".to_string())]
        );
    }

    #[test]
    fn test_degenerate_config_fires_both() {
        let mut config = RuleConfig::default();
        config.safe_domains.push("bit.ly".to_string());

        let cues = analyze_with(&config, "http://bit.ly/x");
        assert_eq!(
            cues,
            vec![
                Cue::UrlShortener("bit.ly".to_string()),
                Cue::SafeDomain("bit.ly".to_string())
            ]
        );
    }

    #[test]
    fn test_unknown_hosts_ignored() {
        assert!(analyze("https://example.org/path").is_empty());
    }
}
