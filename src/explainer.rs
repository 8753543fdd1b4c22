//! Rule evaluator that explains why a message looks like phishing.
//!
//! Evaluation is a pure function of the message text and the compiled
//! [`RuleSet`]: nothing is cached between calls, so one `Explainer` can be
//! shared across threads and called concurrently.

use crate::config::RuleConfig;
use crate::features::{Cue, CueEngine, MessageContext};
use crate::rules::RuleSet;
use serde::Serialize;

/// Cues and URLs found in one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Phishing cues first, then safe-domain notes.
    pub cues: Vec<Cue>,
    /// Raw URLs in extraction order, duplicates kept.
    pub urls: Vec<String>,
}

impl AnalysisResult {
    pub fn cue_strings(&self) -> Vec<String> {
        self.cues.iter().map(|c| c.to_string()).collect()
    }

    /// The first cue, shown as the headline reason in reports.
    pub fn top_cue(&self) -> Option<&Cue> {
        self.cues.first()
    }

    pub fn phishing_cues(&self) -> &[Cue] {
        &self.cues[..self.safe_boundary()]
    }

    pub fn safe_notes(&self) -> &[Cue] {
        &self.cues[self.safe_boundary()..]
    }

    fn safe_boundary(&self) -> usize {
        self.cues
            .iter()
            .position(Cue::is_safe)
            .unwrap_or(self.cues.len())
    }
}

pub struct Explainer {
    rules: RuleSet,
    engine: CueEngine,
}

impl Explainer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            engine: CueEngine::new(),
        }
    }

    /// Explainer over the built-in rules.
    pub fn with_default_rules() -> anyhow::Result<Self> {
        Ok(Self::new(RuleSet::compile(&RuleConfig::default())?))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate a message body and its (possibly empty) raw header block.
    pub fn explain(&self, body: &str, headers: &str) -> AnalysisResult {
        let context = MessageContext::new(body, headers, &self.rules);
        let cues = self.engine.analyze(&context, &self.rules);
        let urls = context.urls.into_iter().map(|u| u.url).collect();

        AnalysisResult { cues, urls }
    }
}
