use serde::{Deserialize, Serialize};

/// Raw rule configuration as written in YAML.
///
/// Every field is optional in the file; anything left out falls back to the
/// built-in rules below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub urgency_pattern: String,
    pub credential_pattern: String,
    pub risky_attachment_pattern: String,
    /// Exact hostnames of URL shortening services.
    pub shortener_hosts: Vec<String>,
    /// Allow-listed hosts. A leading dot (".sharepoint.com") makes the entry a
    /// suffix rule that matches any subdomain.
    pub safe_domains: Vec<String>,
    /// Brand tokens looked for in the From display name.
    pub brand_keywords: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            urgency_pattern: r"\b(urgent|immediately|verify now|reset|overdue|suspend|last chance|act now|24 hours)\b"
                .to_string(),
            credential_pattern: r"\b(password|passcode|2fa|login|ssn|bank|account verify|credentials|confirm identity)\b"
                .to_string(),
            risky_attachment_pattern: r"\.(zip|exe|scr|js|html|htm|xlsm|docm)\b".to_string(),
            shortener_hosts: to_strings(&[
                "bit.ly",
                "t.co",
                "goo.gl",
                "tinyurl.com",
                "ow.ly",
                "is.gd",
                "buff.ly",
            ]),
            safe_domains: to_strings(&[
                "drive.google.com",
                "docs.google.com",
                "calendar.google.com",
                "photos.google.com",
                ".sharepoint.com",
                "outlook.office.com",
                "teams.microsoft.com",
                "docusign.net",
                "amazon.com",
                "paypal.com",
                "stripe.com",
                "starbucks.com",
                "dropbox.com",
                "slack.com",
                "zoom.us",
                "fedex.com",
                "ups.com",
                "usps.com",
            ]),
            brand_keywords: to_strings(&[
                "netflix",
                "microsoft",
                "paypal",
                "apple",
                "bank",
                "amazon",
                "google",
                "intuit",
                "dhl",
                "ups",
                "usps",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl RuleConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RuleConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
