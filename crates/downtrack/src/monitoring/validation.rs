//! Target validation performed before any network traffic.

use url::Url;

use crate::error::TargetError;

/// Accept only absolute `https://` URLs with a host
pub fn validate_target(target: &str) -> Result<Url, TargetError> {
    let url = Url::parse(target.trim()).map_err(|e| TargetError::Malformed {
        url: target.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(TargetError::UnsupportedScheme {
            url: target.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(TargetError::MissingHost(target.to_string())),
    }
}
