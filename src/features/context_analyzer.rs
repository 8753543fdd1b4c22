use super::{Cue, CueExtractor, MessageContext};
use crate::rules::RuleSet;

/// Linguistic cues in the message body: urgency, credential requests and
/// risky attachment names. Each check fires at most once.
pub struct ContextAnalyzer;

impl CueExtractor for ContextAnalyzer {
    fn extract(&self, context: &MessageContext<'_>, rules: &RuleSet) -> Vec<Cue> {
        let checks = [
            (&rules.urgency_pattern, Cue::UrgencyLanguage),
            (&rules.credential_pattern, Cue::CredentialsRequested),
            (&rules.risky_attachment_pattern, Cue::RiskyAttachment),
        ];

        checks
            .into_iter()
            .filter(|(pattern, _)| pattern.is_match(context.body))
            .map(|(_, cue)| cue)
            .collect()
    }

    fn name(&self) -> &str {
        "context_analyzer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    fn analyze(body: &str, headers: &str) -> Vec<Cue> {
        let rules = RuleSet::compile(&RuleConfig::default()).unwrap();
        let context = MessageContext::new(body, headers, &rules);
        ContextAnalyzer.extract(&context, &rules)
    }

    #[test]
    fn test_all_three_in_fixed_order() {
        let cues = analyze(
            "Open statement.docm, confirm identity, respond within 24 hours",
            "",
        );
        assert_eq!(
            cues,
            vec![
                Cue::UrgencyLanguage,
                Cue::CredentialsRequested,
                Cue::RiskyAttachment
            ]
        );
    }

    #[test]
    fn test_repeated_matches_fire_once() {
        let cues = analyze("URGENT urgent Urgent, reset your password or login", "");
        assert_eq!(cues, vec![Cue::UrgencyLanguage, Cue::CredentialsRequested]);
    }

    #[test]
    fn test_headers_are_not_scanned() {
        let cues = analyze("Lunch on Friday?", "Subject: URGENT password reset");
        assert!(cues.is_empty());
    }

    #[test]
    fn test_plain_message_has_no_cues() {
        assert!(analyze("See you at the meeting tomorrow.", "").is_empty());
    }
}
