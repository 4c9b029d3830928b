//! Canonical Search Console property identities.
//!
//! The API accepts exactly two shapes: a domain property
//! (`sc-domain:example.com`) covering every scheme and subdomain, and a
//! URL-prefix property (`https://www.example.com/blog/`) that always ends with
//! a slash. Callers hand us free-form strings, so [`normalize`] turns them
//! into a best guess and the resolver corrects the guess when the API says 403.

use std::fmt;
use url::Url;

pub const DOMAIN_PROPERTY_PREFIX: &str = "sc-domain:";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SiteIdentity {
    /// `sc-domain:<apex>`
    Domain(String),
    /// Scheme, host and optional path, always ending with `/`.
    UrlPrefix(String),
    /// Empty caller input, passed through as-is.
    Blank,
}

impl SiteIdentity {
    /// Reads an identity in wire form, e.g. an entry from the site listing.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return SiteIdentity::Blank;
        }
        match raw.strip_prefix(DOMAIN_PROPERTY_PREFIX) {
            Some(apex) => SiteIdentity::Domain(apex.to_string()),
            None => SiteIdentity::UrlPrefix(raw.to_string()),
        }
    }
}

impl fmt::Display for SiteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteIdentity::Domain(apex) => write!(f, "{}{}", DOMAIN_PROPERTY_PREFIX, apex),
            SiteIdentity::UrlPrefix(url) => f.write_str(url),
            SiteIdentity::Blank => Ok(()),
        }
    }
}

/// Maps caller input to the identity it most likely means.
///
/// Rules, first match wins:
/// - already `sc-domain:` -> unchanged;
/// - URL with a non-root path or a trailing slash -> URL-prefix property,
///   slash appended when missing, nothing else altered;
/// - root URL without trailing slash -> `sc-domain:<apex of host>`;
/// - anything else is a bare domain -> `sc-domain:<input>`.
pub fn normalize(input: &str) -> SiteIdentity {
    let input = input.trim();
    if input.is_empty() {
        return SiteIdentity::Blank;
    }
    if let Some(apex) = input.strip_prefix(DOMAIN_PROPERTY_PREFIX) {
        return SiteIdentity::Domain(apex.to_string());
    }
    if input.contains("://") {
        if let Ok(parsed) = Url::parse(input) {
            let path = parsed.path();
            let has_non_root_path = !path.is_empty() && path != "/";
            let has_trailing_slash = input.ends_with('/');
            if has_non_root_path || has_trailing_slash {
                let mut prefix = input.to_string();
                if !has_trailing_slash {
                    prefix.push('/');
                }
                return SiteIdentity::UrlPrefix(prefix);
            }
            if let Some(host) = parsed.host_str() {
                return SiteIdentity::Domain(apex_domain(host));
            }
        }
    }
    SiteIdentity::Domain(input.to_string())
}

/// Strips a trailing `:<port>` and then a leading `www.` label.
pub fn apex_domain(host: &str) -> String {
    let host = match host.rsplit_once(':') {
        Some((name, port))
            if !name.is_empty()
                && !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    };
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Apex domain of any supported input form. Works on the raw caller input,
/// not the normalized identity, so URL-prefix inputs still yield their apex.
pub fn apex_from_input(input: &str) -> String {
    let input = input.trim();
    if let Some(apex) = input.strip_prefix(DOMAIN_PROPERTY_PREFIX) {
        return apex.to_string();
    }
    if input.contains("://") {
        if let Ok(parsed) = Url::parse(input) {
            if let Some(host) = parsed.host_str() {
                return apex_domain(host);
            }
        }
    }
    match input.split_once('/') {
        Some((domain, _)) => domain.to_string(),
        None => input.to_string(),
    }
}

/// Apex domain of a URL-prefix identity, `None` for anything that is not an
/// http(s) URL.
pub fn apex_of_url_prefix(identity: &str) -> Option<String> {
    if !identity.starts_with("http") {
        return None;
    }
    let parsed = Url::parse(identity).ok()?;
    parsed.host_str().map(apex_domain)
}
