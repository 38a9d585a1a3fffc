use thiserror::Error;
use url::Url;

/// Errors raised when checking the configured API base URL.
#[derive(Error, Debug)]
pub enum BaseUrlError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL cannot carry a path (e.g. `mailto:`)
    #[error("Base URL cannot be used as an HTTP endpoint: {0}")]
    NotABase(String),
    /// Plain HTTP to a remote host would leak the API key
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    Insecure,
}

/// Validates the base URL the API key will be sent to.
///
/// HTTPS is required. Plain HTTP is accepted only for loopback hosts, which
/// is what local mock servers bind to.
///
/// ```
/// use headlines::util::validate_base_url;
///
/// assert!(validate_base_url("https://newsapi.org").is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
/// assert!(validate_base_url("http://newsapi.org").is_err());
/// ```
pub fn validate_base_url(base: &str) -> Result<Url, BaseUrlError> {
    let url = Url::parse(base)?;
    if url.cannot_be_a_base() {
        return Err(BaseUrlError::NotABase(base.to_owned()));
    }

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS API base URL (localhost only)");
            Ok(url)
        }
        scheme => {
            tracing::error!(scheme = %scheme, "Rejecting non-HTTPS API base URL");
            Err(BaseUrlError::Insecure)
        }
    }
}

fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
