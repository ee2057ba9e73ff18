use std::path::PathBuf;

use anyhow::Result;
use postdeck_core::{
    helpers::env,
    twitter::client::{DEFAULT_API_BASE, TwitterAppKeys},
};

#[derive(Clone, Debug)]
pub struct TwitterOAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_domain: String,
    pub sled_url: String,
    pub secret: String,
    pub credentials_key: String,
    /// Dashboard origin the OAuth callbacks redirect back to.
    pub frontend_url: String,
    /// Public origin of this API, used to build OAuth redirect URIs.
    pub public_url: String,
    pub twitter_oauth: Option<TwitterOAuthApp>,
    pub twitter_app_keys: Option<TwitterAppKeys>,
    pub twitter_api_base: String,
    pub teloxide_token: Option<String>,
    pub upload_dir: PathBuf,
    pub max_video_mb: u64,
    pub max_image_mb: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let server_domain = env::or_default("SERVER_DOMAIN", "0.0.0.0:3200");
        let public_url = env::optional("PUBLIC_URL").unwrap_or_else(|| format!("http://{}", server_domain));

        let twitter_oauth = match (
            env::optional("TWITTER_CLIENT_ID"),
            env::optional("TWITTER_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(TwitterOAuthApp {
                client_id,
                client_secret,
            }),
            _ => {
                log::warn!("TWITTER_CLIENT_ID/TWITTER_CLIENT_SECRET not set, X login is disabled");
                None
            }
        };

        Ok(Self {
            sled_url: env::required("SLED_URL")?,
            secret: env::required("SECRET")?,
            credentials_key: env::required("CREDENTIALS_KEY")?,
            frontend_url: env::or_default("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            twitter_oauth,
            twitter_app_keys: TwitterAppKeys::from_env().ok(),
            twitter_api_base: env::or_default("TWITTER_API_BASE", DEFAULT_API_BASE),
            teloxide_token: env::optional("TELOXIDE_TOKEN"),
            upload_dir: PathBuf::from(env::or_default("UPLOAD_DIR", "uploads")),
            max_video_mb: env::parse_or("MAX_VIDEO_MB", 100),
            max_image_mb: env::parse_or("MAX_IMAGE_MB", 20),
            server_domain,
        })
    }

    pub fn login_redirect_uri(&self) -> String {
        format!("{}/auth/x/callback", self.public_url)
    }

    pub fn connect_redirect_uri(&self) -> String {
        format!("{}/oauth/twitter/callback", self.public_url)
    }
}
