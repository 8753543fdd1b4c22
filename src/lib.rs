pub mod classifier;
pub mod config;
pub mod domain_utils;
pub mod explainer;
pub mod features;
pub mod message;
pub mod report;
pub mod rules;
pub mod url_extract;

pub use classifier::{Classifier, FixedProbability, TfidfLogisticClassifier};
pub use config::RuleConfig;
pub use explainer::{AnalysisResult, Explainer};
pub use features::Cue;
pub use message::LoadedMessage;
pub use report::{Label, Verdict};
pub use rules::RuleSet;
