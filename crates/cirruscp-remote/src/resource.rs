//! Resource addressing for remote objects

use cirruscp_types::{Error, Locator, Result};

/// Parsed form of a locator: scheme-qualified endpoint, object path, and
/// whether an access token rode along as the query component.
///
/// The canonical form is token-free, so it is safe to log and stable as a
/// lookup key regardless of credential rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    scheme: String,
    endpoint: String,
    path: String,
    has_access_token: bool,
}

impl ResourceAddress {
    /// Parse a locator into a resource address
    pub fn parse(locator: &Locator) -> Result<Self> {
        let base = locator.redacted();
        let has_access_token = locator.has_access_token();

        let (scheme, rest) = base.split_once("://").ok_or_else(|| {
            Error::invalid_locator(base, "missing scheme separator")
        })?;

        if scheme.is_empty() {
            return Err(Error::invalid_locator(base, "empty scheme"));
        }

        let (endpoint, path) = rest.split_once('/').ok_or_else(|| {
            Error::invalid_locator(base, "missing object path")
        })?;

        if endpoint.is_empty() {
            return Err(Error::invalid_locator(base, "empty endpoint"));
        }
        if path.is_empty() {
            return Err(Error::invalid_locator(base, "empty object path"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            endpoint: endpoint.to_string(),
            path: path.to_string(),
            has_access_token,
        })
    }

    /// Get the locator scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the endpoint (host) component
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the object path component
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check whether the original locator carried an access token
    pub fn has_access_token(&self) -> bool {
        self.has_access_token
    }

    /// Get the canonical token-free form of the address
    pub fn canonical(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.endpoint, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_locator() {
        let locator = Locator::new("https://acct.store.example.net/container/dir/file.bin?tok=abc");
        let address = ResourceAddress::parse(&locator).unwrap();

        assert_eq!(address.scheme(), "https");
        assert_eq!(address.endpoint(), "acct.store.example.net");
        assert_eq!(address.path(), "container/dir/file.bin");
        assert!(address.has_access_token());
        assert_eq!(
            address.canonical(),
            "https://acct.store.example.net/container/dir/file.bin"
        );
    }

    #[test]
    fn test_canonical_strips_token() {
        let with_token = Locator::new("https://host/share/file?sig=secret");
        let without_token = Locator::new("https://host/share/file");

        let a = ResourceAddress::parse(&with_token).unwrap();
        let b = ResourceAddress::parse(&without_token).unwrap();
        assert_eq!(a.canonical(), b.canonical());
        assert!(!a.canonical().contains("secret"));
    }

    #[test]
    fn test_parse_rejects_malformed_locators() {
        for bad in ["no-scheme/path", "https://", "https://host", "https://host/"] {
            let result = ResourceAddress::parse(&Locator::new(bad));
            assert!(result.is_err(), "expected '{bad}' to be rejected");
        }
    }
}
