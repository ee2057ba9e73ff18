use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::Utc;
use rand::Rng;
use ring::hmac;
use sha2::{Digest, Sha256};

pub const TWITTER_AUTHORIZE_URL: &str = "https://twitter.com/i/oauth2/authorize";
pub const LOGIN_SCOPES: &str = "tweet.read users.read offline.access";
pub const CONNECT_SCOPES: &str = "tweet.read tweet.write users.read offline.access";

const OAUTH_STATE_TTL_SECS: u64 = 15 * 60;

fn random_urlsafe(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// PKCE `(verifier, S256 challenge)`.
pub fn generate_pkce_pair() -> (String, String) {
    let verifier = random_urlsafe(64);
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
    (verifier, challenge)
}

pub fn generate_nonce() -> String {
    random_urlsafe(32)
}

pub fn build_auth_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
    code_challenge: &str,
) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&code_challenge={}&code_challenge_method=S256",
        TWITTER_AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(scopes),
        urlencoding::encode(state),
        urlencoding::encode(code_challenge)
    )
}

pub fn current_timestamp() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

pub fn is_state_expired(created_at: u64, now: u64) -> bool {
    now.saturating_sub(created_at) > OAUTH_STATE_TTL_SECS
}

/// Inputs for an OAuth 1.0a HMAC-SHA1 signed request.
pub struct OAuth1Request<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub params: &'a [(&'a str, &'a str)],
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: &'a str,
    pub token_secret: &'a str,
    pub nonce: &'a str,
    pub timestamp: u64,
}

impl OAuth1Request<'_> {
    fn oauth_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("oauth_consumer_key", self.consumer_key.to_string()),
            ("oauth_nonce", self.nonce.to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", self.timestamp.to_string()),
            ("oauth_token", self.token.to_string()),
            ("oauth_version", "1.0".to_string()),
        ]
    }

    pub fn signature(&self) -> String {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (urlencoding::encode(k).into_owned(), urlencoding::encode(v).into_owned()))
            .chain(
                self.oauth_params()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), urlencoding::encode(&v).into_owned())),
            )
            .collect();
        pairs.sort();

        let param_string = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            self.method.to_ascii_uppercase(),
            urlencoding::encode(self.url),
            urlencoding::encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            urlencoding::encode(self.consumer_secret),
            urlencoding::encode(self.token_secret)
        );

        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
        STANDARD.encode(hmac::sign(&key, base.as_bytes()).as_ref())
    }

    pub fn authorization_header(&self) -> String {
        let mut fields = self.oauth_params();
        fields.push(("oauth_signature", self.signature()));
        fields.sort();

        let joined = fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_generation() {
        let (verifier, challenge) = generate_pkce_pair();
        assert!(verifier.len() >= 43);
        assert_eq!(
            challenge,
            URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
        );
    }

    #[test]
    fn test_auth_url_building() {
        let url = build_auth_url(
            "test_client_id",
            "https://example.com/callback",
            LOGIN_SCOPES,
            "test_state",
            "test_challenge",
        );

        assert!(url.starts_with(TWITTER_AUTHORIZE_URL));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(url.contains("scope=tweet.read%20users.read%20offline.access"));
        assert!(url.contains("state=test_state"));
        assert!(url.contains("code_challenge_method=S256"));
    }

    #[test]
    fn test_state_expiry() {
        assert!(!is_state_expired(1_000, 1_000 + OAUTH_STATE_TTL_SECS));
        assert!(is_state_expired(1_000, 1_001 + OAUTH_STATE_TTL_SECS));
        assert!(!is_state_expired(2_000, 1_000));
    }

    // Reference request from the X developer documentation on signing requests.
    #[test]
    fn test_oauth1_signature_matches_reference() {
        let request = OAuth1Request {
            method: "post",
            url: "https://api.twitter.com/1.1/statuses/update.json",
            params: &[
                ("include_entities", "true"),
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ],
            consumer_key: "xvz1evFS4wEEPTGEFPHBog",
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            timestamp: 1318622958,
        };

        assert_eq!(request.signature(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");

        let header = request.authorization_header();
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }
}
