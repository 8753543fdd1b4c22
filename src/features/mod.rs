pub mod context_analyzer;
pub mod link_analyzer;
pub mod sender_alignment;

use crate::rules::RuleSet;
use crate::url_extract::ExtractedUrl;
use serde::{Serialize, Serializer};
use std::fmt;

/// One message under evaluation, with its URLs extracted up front
#[derive(Debug, Clone)]
pub struct MessageContext<'a> {
    pub body: &'a str,
    pub headers: &'a str,
    /// URLs from the header block followed by the body.
    pub urls: Vec<ExtractedUrl>,
}

impl<'a> MessageContext<'a> {
    pub fn new(body: &'a str, headers: &'a str, rules: &RuleSet) -> Self {
        let combined = format!("{}\n{}", headers, body);
        Self {
            body,
            headers,
            urls: rules.url_extractor().extract_with_hosts(&combined),
        }
    }
}

/// A detected signal, rendered as a human-readable cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    UrgencyLanguage,
    CredentialsRequested,
    RiskyAttachment,
    UrlShortener(String),
    SenderMismatch,
    SafeDomain(String),
}

impl Cue {
    /// Safe notes sort after every phishing cue.
    pub fn is_safe(&self) -> bool {
        matches!(self, Cue::SafeDomain(_))
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::UrgencyLanguage => write!(f, "Urgency language"),
            Cue::CredentialsRequested => write!(f, "Credentials requested"),
            Cue::RiskyAttachment => write!(f, "Risky attachment type mentioned"),
            Cue::UrlShortener(host) => write!(f, "URL shortener detected ({})", host),
            Cue::SenderMismatch => write!(f, "Sender/display vs link domain mismatch"),
            Cue::SafeDomain(host) => write!(f, "Safe domain recognized: {}", host),
        }
    }
}

impl Serialize for Cue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub trait CueExtractor: Send + Sync {
    fn extract(&self, context: &MessageContext<'_>, rules: &RuleSet) -> Vec<Cue>;
    fn name(&self) -> &str;
}

/// Runs the extractors in a fixed order and merges their cues
pub struct CueEngine {
    extractors: Vec<Box<dyn CueExtractor>>,
}

impl Default for CueEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CueEngine {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(context_analyzer::ContextAnalyzer),
                Box::new(link_analyzer::LinkAnalyzer),
                Box::new(sender_alignment::SenderAlignmentAnalyzer),
            ],
        }
    }

    pub fn analyze(&self, context: &MessageContext<'_>, rules: &RuleSet) -> Vec<Cue> {
        let mut phishing = Vec::new();
        let mut safe = Vec::new();

        for extractor in &self.extractors {
            let cues = extractor.extract(context, rules);
            log::debug!("{} produced {} cue(s)", extractor.name(), cues.len());
            for cue in cues {
                if cue.is_safe() {
                    safe.push(cue);
                } else {
                    phishing.push(cue);
                }
            }
        }

        phishing.extend(safe);
        phishing
    }
}
