mod cache;
mod error;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chirp_core::feed::*;
use chirp_core::FeedSource;
use chirp_util::parse_cookie_str;

pub use crate::cache::*;
pub use crate::error::Error;
use crate::error::Result;

pub const SESSION_COOKIE: &str = "session_token";
const USER_AGENT: &str = concat!("chirp_client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", SESSION_COOKIE, self.0)
    }
}

impl FromStr for SessionToken {
    type Err = Error;

    /// Accepts either a bare token or a cookie string containing `session_token`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !s.contains('=') {
            if s.is_empty() {
                return Err(Error::InvalidToken(s.to_string()));
            }
            return Ok(SessionToken(s.to_string()));
        }
        let mut cookie_map = parse_cookie_str(s).map_err(|_| Error::InvalidToken(s.to_string()))?;
        let token = cookie_map
            .remove(SESSION_COOKIE)
            .filter(|t| !t.is_empty())
            .ok_or(Error::InvalidToken(s.to_string()))?;
        Ok(SessionToken(token))
    }
}

/// Client of a Chirp server. Without a session token it browses anonymously.
#[derive(Debug, Clone)]
pub struct ChirpClient {
    pub session_token: Option<SessionToken>,
    base_url: Url,
    client: reqwest::Client,
}

impl ChirpClient {
    pub fn new(base_url: &str, session_token: Option<SessionToken>) -> Result<ChirpClient> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = &session_token {
            let value =
                header::HeaderValue::from_str(&token.to_string()).map_err(|_| Error::InvalidToken(token.0.clone()))?;
            headers.insert(header::COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(ChirpClient {
            session_token,
            base_url: Url::parse(base_url)?,
            client,
        })
    }

    pub async fn feed(&self, request: &FeedRequest) -> Result<FeedPage> {
        self.send("tweet_feed", self.client.post(self.url("/tweet/feed")?).json(request))
            .await
    }

    pub async fn profile_feed(&self, user_id: &str, limit: Option<i64>, cursor: Option<&Cursor>) -> Result<FeedPage> {
        let body = json!({ "limit": limit, "cursor": cursor });
        let url = self.url(&format!("/profile/{}/feed", user_id))?;
        self.send("profile_feed", self.client.post(url).json(&body)).await
    }

    pub async fn create_tweet(&self, content: &str) -> Result<TweetView> {
        let body = json!({ "content": content });
        self.send("tweet_create", self.client.post(self.url("/tweet")?).json(&body))
            .await
    }

    pub async fn toggle_like(&self, tweet_id: &str) -> Result<ToggleLikeResponse> {
        let url = self.url(&format!("/tweet/{}/like", tweet_id))?;
        self.send("tweet_like", self.client.post(url)).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<ProfileView> {
        let url = self.url(&format!("/profile/{}", user_id))?;
        self.send("profile", self.client.get(url)).await
    }

    pub async fn toggle_follow(&self, user_id: &str) -> Result<ToggleFollowResponse> {
        let url = self.url(&format!("/profile/{}/follow", user_id))?;
        self.send("profile_follow", self.client.post(url)).await
    }
}

impl ChirpClient {
    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<R>(&self, name: &str, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let content = response.text().await?;
        log(name, &content).await?;
        if !status.is_success() {
            tracing::error!("Request {} failed with {}: {}", name, status, content);
            return Err(Error::StatusError {
                status: status.as_u16(),
                message: content,
            });
        }
        serde_json::from_str(&content).map_err(|e| e.into())
    }
}

#[async_trait]
impl FeedSource for ChirpClient {
    async fn fetch_page(&self, request: &FeedRequest) -> chirp_core::Result<FeedPage> {
        let page = self.feed(request).await.map_err(anyhow::Error::from)?;
        Ok(page)
    }

    async fn toggle_like(&self, tweet_id: &str) -> chirp_core::Result<ToggleLikeResponse> {
        let response = ChirpClient::toggle_like(self, tweet_id)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(response)
    }
}

async fn log(name: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("chirp_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
