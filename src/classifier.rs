//! Phishing probability scorers.
//!
//! The explainer never depends on how a probability is produced; anything that
//! implements [`Classifier`] can be paired with it in a report.

use anyhow::{bail, Context};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub trait Classifier: Send + Sync {
    /// Probability in [0, 1] that `text` is phishing.
    fn predict_probability(&self, text: &str) -> f64;
}

/// Always returns the same probability
#[derive(Debug, Clone, Copy)]
pub struct FixedProbability(pub f64);

impl Classifier for FixedProbability {
    fn predict_probability(&self, _text: &str) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Serialized TF-IDF vectorizer plus logistic regression weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearTextModel {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_lowercase() -> bool {
    true
}

impl LinearTextModel {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.idf.len() != self.coef.len() {
            bail!(
                "Model has {} idf weights but {} coefficients",
                self.idf.len(),
                self.coef.len()
            );
        }

        if let Some((term, index)) = self
            .vocabulary
            .iter()
            .find(|(_, &index)| index >= self.idf.len())
        {
            bail!(
                "Vocabulary term '{}' points at feature {} of {}",
                term,
                index,
                self.idf.len()
            );
        }

        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            bail!("Invalid ngram range ({}, {})", min_n, max_n);
        }

        Ok(())
    }
}

/// TF-IDF features scored with a logistic regression
pub struct TfidfLogisticClassifier {
    model: LinearTextModel,
    token_pattern: Regex,
}

impl TfidfLogisticClassifier {
    pub fn new(model: LinearTextModel) -> anyhow::Result<Self> {
        model.validate()?;
        Ok(Self {
            model,
            token_pattern: Regex::new(r"\b\w\w+\b")?,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Classifier model not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model {}", path.display()))?;
        let model: LinearTextModel = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model {}", path.display()))?;

        log::info!(
            "Loaded classifier model {} ({} features)",
            path.display(),
            model.idf.len()
        );
        Self::new(model)
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let text = if self.model.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.model.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Sparse L2-normalized TF-IDF vector for `text`.
    fn features(&self, text: &str) -> HashMap<usize, f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&index) = self.model.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, value) in counts.iter_mut() {
            *value *= self.model.idf[*index];
        }

        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }
}

impl Classifier for TfidfLogisticClassifier {
    fn predict_probability(&self, text: &str) -> f64 {
        let score: f64 = self
            .features(text)
            .iter()
            .map(|(index, value)| self.model.coef[*index] * value)
            .sum::<f64>()
            + self.model.intercept;

        1.0 / (1.0 + (-score).exp())
    }
}
