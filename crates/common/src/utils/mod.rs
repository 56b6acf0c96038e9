pub mod delay;
pub mod logging;
pub mod time;

use uuid::Uuid;

/// Fallback resource name when a URL has no resource segment.
pub const DEFAULT_RESOURCE: &str = "resource";

/// Resource name used in request error messages: the 5th `/`-separated
/// segment of the URL, e.g. `user` in `https://host/v1/user/42`.
pub fn url_to_resource(url: &str) -> &str {
    url.split('/')
        .nth(4)
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_RESOURCE)
}

/// Storage key suffix for a trading pair, e.g. `btc_usd`.
pub fn coin_pair(base: &str, quote: &str) -> String {
    format!("{base}_{quote}")
}

// TODO: derive the secret with a KDF instead of joining the raw password.
pub fn to_secret(user: &str, password: &str) -> String {
    format!("{user}:{password}")
}

/// Random v4 UUID as a hyphenated string.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_from_api_url() {
        assert_eq!(url_to_resource("https://api.blockkeeper.io/v1/user/42"), "user");
        assert_eq!(url_to_resource("https://api.blockkeeper.io/v1/"), "resource");
        assert_eq!(url_to_resource("https://api.blockkeeper.io/v1"), "resource");
        assert_eq!(url_to_resource(""), "resource");
    }

    #[test]
    fn pair_and_secret() {
        assert_eq!(coin_pair("btc", "usd"), "btc_usd");
        assert_eq!(to_secret("alice", "pw"), "alice:pw");
    }

    #[test]
    fn ids_are_unique_uuids() {
        let a = new_id();
        assert_eq!(a.len(), 36);
        assert_ne!(a, new_id());
    }
}
