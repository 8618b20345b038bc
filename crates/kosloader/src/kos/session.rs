//! Authenticated HTTP session against KOS.
//!
//! Login is a fixed handshake:
//! 1. GET `{api}/info` sets the `XSRF-TOKEN` cookie, which is echoed as the `X-XSRF-TOKEN` header
//! 2. POST the credentials as a form to `{rest}/login`
//! 3. The login response rotates `XSRF-TOKEN` but marks it as expired in 1970, so it is re-added
//!    to the jar as a session cookie
//! 4. The rotated token replaces the header value

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, error, info, warn};
use url::Url;

use super::error::{AuthError, ConfigError, KosError};
use crate::config::{ApiConfig, Credentials};

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// HTTP client shared by every request of a run, with its cookie jar and XSRF token.
#[derive(Debug)]
pub struct KosSession {
    client: Client,
    jar: Arc<Jar>,
    xsrf: Option<HeaderValue>,
    api_root: String,
    rest_root: String,
    /// URL used to read cookies back from the jar
    cookie_url: Url,
}

impl KosSession {
    /// Creates a session that has not logged in yet.
    pub fn new(config: &ApiConfig) -> Result<Self, KosError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| KosError::transport("client setup", e))?;

        let api_root = config.api_root();
        let cookie_url = Url::parse(&format!("{api_root}/")).map_err(ConfigError::from)?;

        Ok(Self {
            client,
            jar,
            xsrf: None,
            api_root,
            rest_root: config.rest_root(),
            cookie_url,
        })
    }

    /// Creates a session and logs `credentials` in.
    pub async fn login(config: &ApiConfig, credentials: &Credentials) -> Result<Self, KosError> {
        let mut session = Self::new(config)?;
        session.authenticate(credentials).await?;
        Ok(session)
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), KosError> {
        info!(username = %credentials.username, "Logging in");

        let info_url = format!("{}/info", self.api_root);
        let response = self
            .client
            .get(&info_url)
            .send()
            .await
            .map_err(|e| http_error(&info_url, e))?;

        if !response.status().is_success() {
            error!(endpoint = %info_url, status = %response.status(), "Login failed - could not load the info endpoint");
            return Err(AuthError::Http {
                endpoint: info_url,
                message: format!("status {}", response.status()),
            }
            .into());
        }

        let token = self.token_from_jar().ok_or_else(|| {
            error!(endpoint = %info_url, "Login failed - missing cookie {XSRF_COOKIE}");
            AuthError::MissingCsrfCookie {
                endpoint: info_url.clone(),
            }
        })?;
        self.xsrf = Some(token);

        let login_url = format!("{}/login", self.rest_root);
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let response = self
            .with_xsrf(self.client.post(&login_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| http_error(&login_url, e))?;

        let status = response.status();
        if !status.is_success() {
            error!(endpoint = %login_url, status = %status, "Login failed - credentials rejected");
            return Err(AuthError::LoginRejected { status }.into());
        }

        let rotated: Vec<(String, String)> = response
            .cookies()
            .filter(|c| c.name() == XSRF_COOKIE)
            .map(|c| (c.value().to_string(), c.path().unwrap_or("/").to_string()))
            .collect();

        for (value, path) in rotated {
            debug!("Re-adding rotated {XSRF_COOKIE} cookie without expiry");
            self.jar
                .add_cookie_str(&format!("{XSRF_COOKIE}={value}; Path={path}"), &self.cookie_url);
        }

        match self.token_from_jar() {
            Some(token) => self.xsrf = Some(token),
            None => warn!("Login did not rotate {XSRF_COOKIE}, keeping the previous token"),
        }

        info!("Logged in");
        Ok(())
    }

    /// Reads the current XSRF token out of the cookie jar.
    fn token_from_jar(&self) -> Option<HeaderValue> {
        let cookies = self.jar.cookies(&self.cookie_url)?;
        let cookies = cookies.to_str().ok()?;

        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == XSRF_COOKIE)
            .and_then(|(_, value)| HeaderValue::from_str(value).ok())
    }

    fn with_xsrf(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.xsrf {
            Some(token) => builder.header(XSRF_HEADER, token.clone()),
            None => builder,
        }
    }

    /// GET request to `path` under the API root, carrying the XSRF header.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_xsrf(self.client.get(format!("{}{}", self.api_root, path)))
    }

    /// Returns true once the handshake has produced a token.
    pub fn is_authenticated(&self) -> bool {
        self.xsrf.is_some()
    }
}

fn http_error(endpoint: &str, err: reqwest::Error) -> KosError {
    error!(endpoint = %endpoint, error = %err, "Login request failed");
    AuthError::Http {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
    .into()
}
