use crate::{UrlError, UrlResult};
use std::net::IpAddr;
use url::{Host, Url};

/// Extracts the registrable domain (eTLD+1) from a URL
///
/// The host is lowercased and reduced to its public-suffix-aware registrable
/// part, so `www.example.co.uk` and `cdn.example.co.uk` both map to
/// `example.co.uk`. Hosts with no public suffix (IP literals, `localhost`) are
/// returned whole, with the explicit port appended when there is one, so two
/// local services on different ports land in different buckets.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Ok(String)` - The registrable domain used as the dispatch key
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use chapter_scout::url::registrable_domain;
///
/// assert_eq!(
///     registrable_domain("https://www.mangakatana.com/manga/x/c12").unwrap(),
///     "mangakatana.com"
/// );
/// assert_eq!(
///     registrable_domain("https://read.example.co.uk/c3").unwrap(),
///     "example.co.uk"
/// );
/// ```
pub fn registrable_domain(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    let host = match parsed.host() {
        Some(host) => host,
        None => return Err(UrlError::MissingDomain(url.to_string())),
    };

    match host {
        Host::Domain(name) => {
            let name = name.to_lowercase();
            if name == "localhost" {
                return Ok(with_port(name, parsed.port()));
            }
            match psl::domain_str(&name) {
                Some(domain) => Ok(domain.to_string()),
                None => Ok(name),
            }
        }
        Host::Ipv4(addr) => Ok(with_port(addr.to_string(), parsed.port())),
        Host::Ipv6(addr) => Ok(with_port(format!("[{}]", addr), parsed.port())),
    }
}

/// Normalises a hand-written domain key to the form [`registrable_domain`]
/// produces
///
/// `www.Example.com` becomes `example.com`. IP literals and `localhost` keep
/// their `:port`; a port on any other host is dropped, as it is for URLs.
pub fn domain_key(key: &str) -> String {
    let key = key.trim().to_lowercase();
    let host = match key.rsplit_once(':') {
        Some((host, port)) if port.parse::<u16>().is_ok() => host,
        _ => key.as_str(),
    };

    if host == "localhost" || host.starts_with('[') || host.parse::<IpAddr>().is_ok() {
        return key;
    }
    match psl::domain_str(host) {
        Some(domain) => domain.to_string(),
        None => host.to_string(),
    }
}

fn with_port(host: String, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    }
}
