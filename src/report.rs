use crate::explainer::AnalysisResult;
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;

const BAR_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Phish,
    Safe,
}

impl Label {
    pub fn from_probability(prob: f64, threshold: f64) -> Self {
        if prob >= threshold {
            Label::Phish
        } else {
            Label::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phish => "Phish",
            Label::Safe => "Safe",
        }
    }
}

pub fn validate_threshold(threshold: f64) -> anyhow::Result<f64> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("Threshold must be between 0 and 1, got {}", threshold);
    }
    Ok(threshold)
}

/// Classifier verdict combined with the rule-based explanation
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub label: Label,
    pub prob: f64,
    pub explain: AnalysisResult,
}

impl Verdict {
    pub fn new(file: Option<String>, prob: f64, threshold: f64, explain: AnalysisResult) -> Self {
        Self {
            file,
            label: Label::from_probability(prob, threshold),
            prob,
            explain,
        }
    }
}

pub fn confidence_bar(prob: f64) -> String {
    let filled = ((prob.clamp(0.0, 1.0) * BAR_LEN as f64) as usize).min(BAR_LEN);
    format!("{}{}", "█".repeat(filled), "-".repeat(BAR_LEN - filled))
}

/// Human-readable rendering of a single verdict.
pub fn render(verdict: &Verdict) -> String {
    let mut out = String::from("== RESULT ==\n");
    out.push_str(&format!("Label: {}\n", verdict.label.as_str()));
    out.push_str(&format!(
        "Confidence: [{}] {:.1}%\n",
        confidence_bar(verdict.prob),
        verdict.prob * 100.0
    ));

    if let Some(top) = verdict.explain.top_cue() {
        out.push_str("Why:\n");
        for cue in &verdict.explain.cues {
            out.push_str(&format!("  - {}\n", cue));
        }
        out.push_str(&format!("Top suspicious cue: {}\n", top));
    }

    if !verdict.explain.urls.is_empty() {
        out.push_str("URLs:\n");
        for url in &verdict.explain.urls {
            out.push_str(&format!("  - {}\n", url));
        }
    }
    out
}

/// `file,label,prob` table for batch runs.
pub fn batch_csv(verdicts: &[Verdict], precision: usize) -> String {
    let mut out = String::from("file,label,prob\n");
    for verdict in verdicts {
        out.push_str(&format!(
            "{},{},{:.*}\n",
            verdict.file.as_deref().unwrap_or(""),
            verdict.label.as_str(),
            precision,
            verdict.prob
        ));
    }
    out
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    log::info!("Wrote JSON results to {}", path.display());
    Ok(())
}

pub fn write_csv(path: &Path, verdicts: &[Verdict]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, batch_csv(verdicts, 6))
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    log::info!("Wrote {} predictions to {}", verdicts.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explainer::Explainer;

    fn verdict(prob: f64, body: &str) -> Verdict {
        let explain = Explainer::with_default_rules().unwrap().explain(body, "");
        Verdict::new(Some("mail.eml".to_string()), prob, 0.5, explain)
    }

    #[test]
    fn test_label_threshold() {
        assert_eq!(Label::from_probability(0.5, 0.5), Label::Phish);
        assert_eq!(Label::from_probability(0.49, 0.5), Label::Safe);
        assert_eq!(Label::from_probability(0.0, 0.0), Label::Phish);
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(0.7).is_ok());
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.0), "--------------------");
        assert_eq!(confidence_bar(1.0), "████████████████████");
        assert_eq!(confidence_bar(0.57), format!("{}{}", "█".repeat(11), "-".repeat(9)));
    }

    #[test]
    fn test_render() {
        let text = render(&verdict(0.873, "Act now: http://bit.ly/x"));
        let expected = format!(
            "== RESULT ==\n\
             Label: Phish\n\
             Confidence: [{}{}] 87.3%\n\
             Why:\n  - Urgency language\n  - URL shortener detected (bit.ly)\n\
             Top suspicious cue: Urgency language\n\
             URLs:\n  - http://bit.ly/x\n",
            "█".repeat(17),
            "-".repeat(3)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_without_cues() {
        let text = render(&verdict(0.1, "see you soon"));
        assert!(text.contains("Label: Safe"));
        assert!(!text.contains("Why:"));
        assert!(!text.contains("URLs:"));
    }

    #[test]
    fn test_batch_csv() {
        let csv = batch_csv(&[verdict(0.25, "hi")], 4);
        assert_eq!(csv, "file,label,prob\nmail.eml,Safe,0.2500\n");
    }

    #[test]
    fn test_verdict_json() {
        let value = serde_json::to_value(verdict(0.9, "urgent")).unwrap();
        assert_eq!(value["label"], "Phish");
        assert_eq!(value["file"], "mail.eml");
        assert_eq!(value["explain"]["cues"][0], "Urgency language");

        let anonymous = Verdict::new(None, 0.9, 0.5, verdict(0.9, "").explain);
        let value = serde_json::to_value(anonymous).unwrap();
        assert!(value.get("file").is_none());
    }
}
