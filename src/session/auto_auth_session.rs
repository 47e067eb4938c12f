use super::dto::{LoginRequest, TokenResponse};
use super::error::ApiError;
use base64::Engine;
use chrono::Utc;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

/// Seconds before `exp` at which a token is already treated as stale.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// HTTP session that keeps a bearer token alive.
///
/// Logs in lazily on the first request, logs in again when the stored JWT has
/// expired or a request comes back 401, and retries unexpected responses a
/// fixed number of times with a fixed delay.
pub struct AutoAuthSession {
    client: Client,
    auth_url: String,
    email: String,
    password: String,
    token: RwLock<Option<String>>,
    expected: Box<dyn Fn(&Response) -> bool + Send + Sync>,
    max_tries: usize,
    delay_unexpected: Duration,
}

impl AutoAuthSession {
    /// # Arguments
    ///
    /// * `auth_url` - login endpoint taking `{email, password}`
    /// * `max_tries` - attempts per request, including the first
    /// * `delay_unexpected` - seconds to wait before retrying an unexpected response
    pub fn new(
        auth_url: String,
        email: String,
        password: String,
        max_tries: usize,
        delay_unexpected: f64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("peer-pilot/0.1")
            .build()?;
        let expected = Box::new(|resp: &Response| {
            let status = resp.status();
            status != StatusCode::UNAUTHORIZED && status != StatusCode::TOO_MANY_REQUESTS
        });
        Ok(Self {
            client,
            auth_url,
            email,
            password,
            token: RwLock::new(None),
            expected,
            max_tries: max_tries.max(1),
            delay_unexpected: Duration::from_secs_f64(delay_unexpected.max(0.0)),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Logs in and stores the returned token.
    pub async fn auth_request(&self) -> Result<String, ApiError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ApiError::MissingCredentials);
        }

        let mut try_num = 0;
        loop {
            try_num += 1;
            let resp = self
                .client
                .post(&self.auth_url)
                .json(&LoginRequest {
                    email: &self.email,
                    password: &self.password,
                })
                .send()
                .await?;
            let status = resp.status();

            if status.is_success() {
                let body = resp.bytes().await?;
                let token: TokenResponse = serde_json::from_slice(&body)?;
                *self.token.write().await = Some(token.access_token.clone());
                info!("{} auth_request(...) [{} tries]", self, try_num);
                return Ok(token.access_token);
            }

            let body = resp.text().await.unwrap_or_default();
            let err = ApiError::from_body(status.as_u16(), &body);
            // wrong credentials will not get better by retrying
            if status == StatusCode::UNAUTHORIZED || try_num >= self.max_tries {
                warn!("{} auth_request(...) failed after {} tries: {}", self, try_num, err);
                return Err(err);
            }
            tokio::time::sleep(self.delay_unexpected).await;
        }
    }

    async fn valid_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if !token_expired(token, Utc::now().timestamp()) {
                return Ok(token.clone());
            }
        }
        self.auth_request().await
    }

    /// Sends a request with the bearer token, re-authenticating and retrying
    /// while the response is unexpected.
    ///
    /// The last response is returned even when the tries ran out; callers map
    /// its status to an error.
    pub async fn request<F>(&self, builder: F) -> Result<Response, ApiError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut try_num = 0;
        loop {
            try_num += 1;
            let token = self.valid_token().await?;
            let resp = builder(&self.client).bearer_auth(&token).send().await?;

            if (self.expected)(&resp) {
                info!("{} request({}) [{} tries]", self, resp.url().path(), try_num);
                return Ok(resp);
            }
            if try_num >= self.max_tries {
                warn!(
                    "{} request({}) [max {} tries ran out, {}]",
                    self,
                    resp.url().path(),
                    try_num,
                    resp.status()
                );
                return Ok(resp);
            }
            if resp.status() == StatusCode::UNAUTHORIZED {
                self.token.write().await.take();
            }
            tokio::time::sleep(self.delay_unexpected).await;
        }
    }
}

/// True when the JWT's `exp` claim is within the leeway of `now`.
/// Tokens without a readable `exp` are treated as valid until a 401 says
/// otherwise.
pub fn token_expired(token: &str, now: i64) -> bool {
    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(bytes) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))
    else {
        return false;
    };
    serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|claims| claims.get("exp").and_then(Value::as_i64))
        .map(|exp| exp - EXPIRY_LEEWAY_SECS <= now)
        .unwrap_or(false)
}

impl std::fmt::Display for AutoAuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<AutoAuthSession [{}]>", self.email)
    }
}

impl std::fmt::Debug for AutoAuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<AutoAuthSession [{}]>", self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(claims: &str) -> String {
        let enc = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            enc.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            enc.encode(claims)
        )
    }

    #[test]
    fn reads_exp_claim() {
        let token = jwt(r#"{"sub":"ann@uni.edu","exp":1000}"#);
        assert!(token_expired(&token, 1000));
        assert!(token_expired(&token, 980));
        assert!(!token_expired(&token, 900));
    }

    #[test]
    fn opaque_tokens_never_expire_locally() {
        assert!(!token_expired("opaque-token", i64::MAX));
        assert!(!token_expired(&jwt(r#"{"sub":"x"}"#), i64::MAX));
        assert!(!token_expired("a.!!!.c", i64::MAX));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let session =
            AutoAuthSession::new("http://127.0.0.1:9/auth/login".into(), String::new(), String::new(), 1, 0.0)
                .unwrap();
        assert!(matches!(
            session.auth_request().await,
            Err(ApiError::MissingCredentials)
        ));
    }
}
