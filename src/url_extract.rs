use crate::domain_utils::DomainUtils;
use regex::Regex;
use url::{Host, Url};

const URL_PATTERN: &str = r#"(?i)https?://[^\s<>\]')"]+"#;

/// A URL found in message text together with its derived host information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUrl {
    pub url: String,
    /// Lowercased host, empty when none could be derived.
    pub host: String,
    pub registrable_domain: Option<String>,
}

impl ExtractedUrl {
    pub fn new(url: &str) -> Self {
        let host = host_of(url).unwrap_or_default();
        let registrable_domain = DomainUtils::registrable_domain(&host);
        Self {
            url: url.to_string(),
            host,
            registrable_domain,
        }
    }
}

/// Finds http(s) URLs in free text
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    pattern: Regex,
}

impl UrlExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(URL_PATTERN)?,
        })
    }

    /// Every URL in `text`, in order of appearance, duplicates kept.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn extract_with_hosts(&self, text: &str) -> Vec<ExtractedUrl> {
        self.pattern
            .find_iter(text)
            .map(|m| ExtractedUrl::new(m.as_str()))
            .collect()
    }
}

/// Lowercased host of a URL.
///
/// Falls back to splitting the authority by hand when the URL parser rejects
/// the input (bad port, stray characters) so that a host is still reported.
pub fn host_of(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        return match parsed.host() {
            Some(Host::Domain(domain)) => Some(domain.to_lowercase()),
            Some(Host::Ipv4(addr)) => Some(addr.to_string()),
            Some(Host::Ipv6(addr)) => Some(addr.to_string()),
            None => None,
        };
    }

    log::debug!("Falling back to lenient host parsing for {}", url);
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or("")
    } else {
        host_port.split(':').next().unwrap_or("")
    };

    let host = host.to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
