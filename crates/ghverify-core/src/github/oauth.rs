//! GitHub OAuth web flow: authorize URL, PKCE, code-for-token exchange.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::client::GitHubApi;
use super::error::{GitHubError, Result};

pub const PKCE_METHOD: &str = "S256";

/// Credentials of the registered OAuth app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Option<String>,
}

/// PKCE code verifier and challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    /// Generates a verifier from 32 random bytes and its S256 challenge.
    pub fn generate() -> Self {
        Self::from_verifier(URL_SAFE_NO_PAD.encode(random_bytes()))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }

    pub fn method(&self) -> &'static str {
        PKCE_METHOD
    }
}

/// 32 bytes from the OS RNG, taken from two v4 UUIDs.
pub(crate) fn random_bytes() -> [u8; 32] {
    let uuid1 = uuid::Uuid::new_v4();
    let uuid2 = uuid::Uuid::new_v4();
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(uuid1.as_bytes());
    bytes[16..].copy_from_slice(uuid2.as_bytes());
    bytes
}

/// Parameters of the authorize redirect. Empty/`None` fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeRequest<'a> {
    /// Suggested account to sign in with.
    pub login: Option<&'a str>,
    pub state: &'a str,
    pub scopes: &'a [String],
    pub allow_signup: bool,
    pub pkce: Option<&'a Pkce>,
}

/// Token granted by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Splits GitHub's comma-separated `scope` field.
fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

impl GitHubApi {
    /// Builds the URL the user opens to authorize the app.
    ///
    /// # Errors
    /// Returns an error if the OAuth base URL cannot be extended.
    pub fn authorize_url(&self, request: &AuthorizeRequest<'_>) -> Result<String> {
        let oauth = self.oauth_app();
        let mut url = self.oauth_url(&["login", "oauth", "authorize"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &oauth.client_id);
            if let Some(redirect_uri) = oauth.redirect_uri.as_deref().filter(|uri| !uri.is_empty()) {
                query.append_pair("redirect_uri", redirect_uri);
            }
            if !request.state.is_empty() {
                query.append_pair("state", request.state);
            }
            if !request.scopes.is_empty() {
                query.append_pair("scope", &request.scopes.join(" "));
            }
            if let Some(login) = request.login.filter(|login| !login.is_empty()) {
                query.append_pair("login", login);
            }
            if !request.allow_signup {
                query.append_pair("allow_signup", "false");
            }
            if let Some(pkce) = request.pkce {
                query.append_pair("code_challenge", &pkce.challenge);
                query.append_pair("code_challenge_method", pkce.method());
            }
        }
        Ok(url.into())
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    /// Returns `OAuth` when the token endpoint reports an error (GitHub does
    /// so with a 200 status), `Http` for non-2xx responses and `Decode` for
    /// malformed bodies.
    pub async fn exchange_code(&self, code: &str, pkce_verifier: Option<&str>) -> Result<AccessToken> {
        let code = code.trim();
        if code.is_empty() {
            return Err(GitHubError::InvalidInput("authorization code is empty".to_string()));
        }

        let oauth = self.oauth_app();
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            form.append_pair("client_id", &oauth.client_id)
                .append_pair("client_secret", &oauth.client_secret)
                .append_pair("code", code);
            if let Some(redirect_uri) = oauth.redirect_uri.as_deref().filter(|uri| !uri.is_empty()) {
                form.append_pair("redirect_uri", redirect_uri);
            }
            if let Some(verifier) = pkce_verifier {
                form.append_pair("code_verifier", verifier);
            }
            form.finish()
        };

        let request = self
            .request(Method::POST, self.oauth_url(&["login", "oauth", "access_token"])?)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        let body = self.send_checked(request).await?;
        let token: TokenResponse = serde_json::from_slice(&body)?;

        if let Some(code) = token.error.filter(|code| !code.is_empty()) {
            return Err(GitHubError::OAuth {
                code,
                description: token.error_description,
            });
        }
        let access_token = token
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GitHubError::OAuth {
                code: "missing_access_token".to_string(),
                description: None,
            })?;

        Ok(AccessToken {
            access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            scopes: token.scope.as_deref().map(split_scopes).unwrap_or_default(),
        })
    }
}
