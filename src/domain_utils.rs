use std::net::IpAddr;
use url::Host;

/// Host and domain helpers shared by the analyzers
pub struct DomainUtils;

impl DomainUtils {
    /// Host part of an email address: the text after the last '@', or the
    /// whole address when it has none.
    ///
    /// Normalized like URL hosts (lowercase, IDN labels in punycode) so the
    /// two compare equal.
    pub fn sender_host(address: &str) -> Option<String> {
        let host = address.rsplit('@').next().unwrap_or("").trim();
        if host.is_empty() {
            return None;
        }

        match Host::parse(host) {
            Ok(Host::Domain(domain)) => Some(domain),
            Ok(Host::Ipv4(addr)) => Some(addr.to_string()),
            Ok(Host::Ipv6(addr)) => Some(addr.to_string()),
            Err(_) => Some(host.to_lowercase()),
        }
    }

    /// Registrable domain of a host: its ICANN public suffix plus one label.
    ///
    /// Private-section suffixes (github.io, blogspot.com) are not treated as
    /// suffixes, so `netflix.github.io` resolves to `github.io`. Hosts without
    /// a registrable part (IP literals, bare labels, a bare public suffix)
    /// resolve to themselves.
    pub fn registrable_domain(host: &str) -> Option<String> {
        let host = host.trim().trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return None;
        }

        if host.parse::<IpAddr>().is_ok() {
            return Some(host);
        }

        let suffix_len = match icann_suffix_len(&host) {
            Some(len) if len < host.len() => len,
            _ => return Some(host),
        };

        let rest = &host[..host.len() - suffix_len];
        let Some(rest) = rest.strip_suffix('.') else {
            return Some(host);
        };
        let label = rest.rsplit('.').next().unwrap_or("");
        if label.is_empty() {
            return Some(host);
        }

        Some(format!("{}.{}", label, &host[host.len() - suffix_len..]))
    }
}

/// Length of the ICANN public suffix at the end of `host`, skipping any
/// private-section match.
fn icann_suffix_len(host: &str) -> Option<usize> {
    let mut name = host;
    loop {
        let suffix = psl::suffix(name.as_bytes())?;
        let len = suffix.as_bytes().len();
        if suffix.typ() != Some(psl::Type::Private) {
            return Some(len);
        }

        // retry on the private suffix minus its leftmost label
        let private = name.get(name.len() - len..)?;
        name = private.split_once('.')?.1;
    }
}

/// One entry of the safe-domain allow list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRule {
    Exact(String),
    /// Stored with its leading dot, so it only matches proper subdomains.
    Suffix(String),
}

impl HostRule {
    /// Parse a config entry; a leading '.' marks a suffix rule.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim().to_lowercase();
        if entry.trim_start_matches('.').is_empty() {
            return None;
        }

        if entry.starts_with('.') {
            Some(HostRule::Suffix(entry))
        } else {
            Some(HostRule::Exact(entry))
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostRule::Exact(name) => host == name,
            HostRule::Suffix(suffix) => host.ends_with(suffix.as_str()),
        }
    }
}
