use super::{Cue, CueExtractor, MessageContext};
use crate::domain_utils::DomainUtils;
use crate::rules::RuleSet;
use serde::Serialize;

/// Outcome of comparing the claimed sender with the actual sending and
/// linked domains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SenderAlignment {
    pub brand_mismatch: bool,
    pub link_mismatch: bool,
    /// Registrable domain of the From address, if a From line was found.
    pub sender_domain: Option<String>,
    /// Distinct registrable domains of every linked URL, first-seen order.
    pub link_domains: Vec<String>,
}

impl SenderAlignment {
    pub fn is_mismatch(&self) -> bool {
        self.brand_mismatch || self.link_mismatch
    }
}

/// Display name and address of the first `From:` line in a header block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromLine {
    pub display_name: String,
    pub address: String,
}

pub struct SenderAlignmentAnalyzer;

impl SenderAlignmentAnalyzer {
    pub fn parse_from_line(headers: &str, rules: &RuleSet) -> Option<FromLine> {
        let caps = rules.from_line.captures(headers)?;
        Some(FromLine {
            display_name: caps.name("disp").map_or("", |m| m.as_str()).to_string(),
            address: caps.name("addr").map_or("", |m| m.as_str()).to_string(),
        })
    }

    /// Any link off the sender's registrable domain counts as a mismatch,
    /// tracking and CDN hosts included.
    pub fn check(context: &MessageContext<'_>, rules: &RuleSet) -> SenderAlignment {
        let Some(from) = Self::parse_from_line(context.headers, rules) else {
            return SenderAlignment::default();
        };

        let sender_domain = DomainUtils::sender_host(&from.address)
            .and_then(|host| DomainUtils::registrable_domain(&host));

        let display = from.display_name.to_lowercase();
        let claimed_brands: Vec<&str> = rules
            .brand_keywords
            .iter()
            .map(String::as_str)
            .filter(|brand| display.contains(brand))
            .collect();

        let brand_mismatch = match &sender_domain {
            Some(sd) if !claimed_brands.is_empty() => {
                claimed_brands.iter().all(|brand| !sd.contains(brand))
            }
            _ => false,
        };

        let mut link_domains: Vec<String> = Vec::new();
        for link in &context.urls {
            if let Some(domain) = &link.registrable_domain {
                if !link_domains.contains(domain) {
                    link_domains.push(domain.clone());
                }
            }
        }

        let link_mismatch = match &sender_domain {
            Some(sd) => link_domains.iter().any(|d| d != sd),
            None => false,
        };

        if brand_mismatch {
            log::debug!(
                "Display name '{}' claims {:?} but sender domain is {:?}",
                from.display_name.trim(),
                claimed_brands,
                sender_domain
            );
        }
        if link_mismatch {
            log::debug!(
                "Link domains {:?} differ from sender domain {:?}",
                link_domains,
                sender_domain
            );
        }

        SenderAlignment {
            brand_mismatch,
            link_mismatch,
            sender_domain,
            link_domains,
        }
    }
}

impl CueExtractor for SenderAlignmentAnalyzer {
    fn extract(&self, context: &MessageContext<'_>, rules: &RuleSet) -> Vec<Cue> {
        if Self::check(context, rules).is_mismatch() {
            vec![Cue::SenderMismatch]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &str {
        "sender_alignment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn rules() -> RuleSet {
        RuleSet::compile(&RuleConfig::default()).unwrap()
    }

    fn check(headers: &str, body: &str) -> SenderAlignment {
        let rules = rules();
        let context = MessageContext::new(body, headers, &rules);
        SenderAlignmentAnalyzer::check(&context, &rules)
    }

    #[test]
    fn test_parse_from_line_variants() {
        let rules = rules();

        let quoted = SenderAlignmentAnalyzer::parse_from_line(
            "To: me@example.com\nFrom: \"Netflix Support\" <billing@secure-login.ru>\n",
            &rules,
        )
        .unwrap();
        assert_eq!(quoted.display_name, "\"Netflix Support\"");
        assert_eq!(quoted.address, "billing@secure-login.ru");

        let bare = SenderAlignmentAnalyzer::parse_from_line(
            "from: PayPal Service <service@paypal.com>",
            &rules,
        )
        .unwrap();
        assert_eq!(bare.address, "service@paypal.com");
        assert!(bare.display_name.contains("PayPal Service"));

        assert!(
            SenderAlignmentAnalyzer::parse_from_line("From: alice@example.com", &rules).is_none()
        );
        assert!(SenderAlignmentAnalyzer::parse_from_line("", &rules).is_none());
    }

    #[test]
    fn test_brand_spoof_without_links() {
        let result = check(
            "From: \"Netflix Support\" <billing@secure-login.ru>",
            "Your membership is on hold.",
        );
        assert!(result.brand_mismatch);
        assert!(!result.link_mismatch);
        assert_eq!(result.sender_domain, Some("secure-login.ru".to_string()));
        assert!(result.is_mismatch());
    }

    #[test]
    fn test_aligned_sender_and_link() {
        let result = check(
            "From: \"Netflix\" <support@netflix.com>",
            "Manage it at https://netflix.com/account",
        );
        assert!(!result.is_mismatch());
        assert_eq!(result.link_domains, vec!["netflix.com".to_string()]);
    }

    #[test]
    fn test_subdomains_share_registrable_domain() {
        let result = check(
            "From: Google <no-reply@accounts.google.com>",
            "https://mail.google.com/x https://www.google.com/y",
        );
        assert!(!result.is_mismatch());
    }

    #[test]
    fn test_third_party_link_trips_mismatch() {
        let result = check(
            "From: Team <news@example.com>",
            "https://example.com/a https://cdn.tracker.net/pixel.gif",
        );
        assert!(!result.brand_mismatch);
        assert!(result.link_mismatch);
        assert_eq!(
            result.link_domains,
            vec!["example.com".to_string(), "tracker.net".to_string()]
        );
    }

    #[test]
    fn test_idn_sender_and_link_align() {
        let result = check(
            "From: Shop <info@bücher.de>",
            "Bestellung: https://bücher.de/konto",
        );
        assert_eq!(result.sender_domain, Some("xn--bcher-kva.de".to_string()));
        assert_eq!(result.link_domains, vec!["xn--bcher-kva.de".to_string()]);
        assert!(!result.is_mismatch());
    }

    #[test]
    fn test_brand_on_private_hosting_suffix_is_spoof() {
        let result = check(
            "From: \"Netflix Support\" <billing@netflix.github.io>",
            "",
        );
        assert_eq!(result.sender_domain, Some("github.io".to_string()));
        assert!(result.brand_mismatch);
    }

    #[test]
    fn test_any_claimed_brand_in_domain_clears_brand_check() {
        let result = check(
            "From: \"Amazon Bank Alerts\" <alerts@amazon.co.uk>",
            "",
        );
        assert!(!result.brand_mismatch);
    }

    #[test]
    fn test_no_from_line_skips_detector() {
        let result = check("Subject: hello", "https://elsewhere.org");
        assert_eq!(result, SenderAlignment::default());
        assert!(!result.is_mismatch());
    }

    #[test]
    fn test_extract_emits_single_cue() {
        let rules = rules();
        let context = MessageContext::new(
            "https://a.io https://b.io",
            "From: \"Apple\" <id@apple-verify.top>",
            &rules,
        );
        assert_eq!(
            SenderAlignmentAnalyzer.extract(&context, &rules),
            vec![Cue::SenderMismatch]
        );
    }
}
