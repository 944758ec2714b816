//! OKX request signing.
//!
//! The signature is `base64(HMAC-SHA256(secret, timestamp + method + path + body))`
//! where `path` includes the query string. The exchange rejects timestamps
//! outside a short validity window, so a [`SignedRequest`] captures its
//! timestamp at construction and sends that same value in the header.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// API credentials for signed OKX endpoints.
#[derive(Clone)]
pub struct OkxCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub passphrase: String,
}

impl OkxCredentials {
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl std::fmt::Debug for OkxCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkxCredentials")
            .field("api_key", &mask(&self.api_key))
            .field("secret_key", &"***")
            .field("passphrase", &"***")
            .finish()
    }
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}***", visible)
}

/// Sign `timestamp + method + path + body` with the account secret.
pub fn sign(secret_key: &str, timestamp: &str, method: &str, path: &str, body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Current UTC time in the ISO-8601 form OKX expects: `2020-12-08T09:08:57.715Z`.
pub fn okx_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// A request prepared for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    /// Request path including query string
    pub path: String,
    pub timestamp: String,
    pub body: String,
}

impl SignedRequest {
    /// Bodiless GET stamped with the current time.
    pub fn get(path: impl Into<String>) -> Self {
        Self::with_timestamp("GET", path, okx_timestamp(), "")
    }

    pub fn with_timestamp(
        method: impl Into<String>,
        path: impl Into<String>,
        timestamp: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            timestamp: timestamp.into(),
            body: body.into(),
        }
    }

    pub fn signature(&self, secret_key: &str) -> String {
        sign(secret_key, &self.timestamp, &self.method, &self.path, &self.body)
    }

    /// Authentication headers for this request.
    pub fn auth_headers(&self, credentials: &OkxCredentials) -> [(&'static str, String); 5] {
        [
            ("OK-ACCESS-KEY", credentials.api_key.clone()),
            ("OK-ACCESS-SIGN", self.signature(&credentials.secret_key)),
            ("OK-ACCESS-TIMESTAMP", self.timestamp.clone()),
            ("OK-ACCESS-PASSPHRASE", credentials.passphrase.clone()),
            ("Content-Type", "application/json".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "22582BD0CFF14C41EDBF1AB98506286D";

    #[test]
    fn test_sign_known_vector() {
        let signature = sign(
            SECRET,
            "2020-12-08T09:08:57.715Z",
            "GET",
            "/api/v5/account/balance",
            "",
        );
        assert_eq!(signature, "AkD5YszBhggtIyjDlmTy/9PpNVntel+1Lff8wh0qpQw=");
    }

    #[test]
    fn test_sign_includes_body() {
        let signature = sign(
            SECRET,
            "2020-12-08T09:08:57.715Z",
            "POST",
            "/api/v5/trade/order",
            r#"{"instId":"BTC-USDT"}"#,
        );
        assert_eq!(signature, "YQ/tkEzvXm0I2aOIDXzW4cvOJ+Hn6Vy0Xqh6kJ1Nu7g=");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = okx_timestamp();
        // 2020-12-08T09:08:57.715Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn test_headers_carry_signed_timestamp() {
        let creds = OkxCredentials::new("key", SECRET, "pass");
        let request = SignedRequest::get("/api/v5/account/balance");
        let headers = request.auth_headers(&creds);

        let header = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(header("OK-ACCESS-TIMESTAMP"), request.timestamp);
        assert_eq!(
            header("OK-ACCESS-SIGN"),
            sign(SECRET, &request.timestamp, "GET", "/api/v5/account/balance", "")
        );
        assert_eq!(header("OK-ACCESS-KEY"), "key");
        assert_eq!(header("OK-ACCESS-PASSPHRASE"), "pass");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = OkxCredentials::new("abcdef123", SECRET, "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("abcd***"));
        assert!(!debug.contains(SECRET));
        assert!(!debug.contains("hunter2"));
    }
}
