use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

/// Derive the streaming endpoint from a page-style origin.
///
/// `http` maps to `ws` and `https` to `wss`; `ws`/`wss` origins are used as
/// given. Any path, query or fragment on the origin is replaced by `path`.
///
/// # Errors
///
/// Returns [`ConfigError::EndpointError`] if the origin does not parse, has no
/// host, or uses another scheme.
pub fn gateway_endpoint(origin: &str, path: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(origin).map_err(|e| ConfigError::EndpointError {
        location: ErrorLocation::from(Location::caller()),
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().is_none() {
        return Err(ConfigError::EndpointError {
            location: ErrorLocation::from(Location::caller()),
            origin: origin.to_string(),
            reason: String::from("origin has no host"),
        });
    }

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ConfigError::EndpointError {
                location: ErrorLocation::from(Location::caller()),
                origin: origin.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            });
        }
    };

    url.set_scheme(scheme)
        .map_err(|()| ConfigError::EndpointError {
            location: ErrorLocation::from(Location::caller()),
            origin: origin.to_string(),
            reason: format!("cannot switch scheme to '{scheme}'"),
        })?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
