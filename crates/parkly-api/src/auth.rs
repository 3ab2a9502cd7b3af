// Login against `POST auth/login`.
//
// The call is unauthenticated. Rejections come back as
// `Error::Authentication` rather than `AuthExpired`, so a wrong password
// never looks like an expired session.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::envelope;
use crate::error::Error;
use crate::gateway::{ApiRequest, Gateway, decode};
use crate::session::{Identity, Role, Tokens};

const LOGIN_PATH: &str = "auth/login";

/// Username/password pair submitted by the login flow.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

// Backends differ on token field naming and on whether the operator's name
// is split into first/last.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, alias = "access_token")]
    access_token: Option<String>,
    #[serde(default, alias = "refresh_token")]
    refresh_token: Option<String>,
    #[serde(default, alias = "first_name")]
    first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    last_name: Option<String>,
    #[serde(default, alias = "full_name", alias = "fullName")]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl LoginResponse {
    /// First non-empty of `token` and `accessToken`.
    fn access_token(&self) -> Option<String> {
        [&self.token, &self.access_token]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .cloned()
    }

    fn display_name(&self, fallback: &str) -> String {
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !joined.is_empty() {
            return joined;
        }
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}

impl Gateway {
    /// Exchange credentials for tokens and record the session.
    ///
    /// On success the session store holds the new identity and tokens;
    /// on failure it is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, Error> {
        let result = self.login_inner(credentials).await;
        self.finish(result)
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<Identity, Error> {
        debug!(username = %credentials.username, "logging in");

        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });
        let req = ApiRequest::post(LOGIN_PATH, &body)?;

        let value = self.execute(req, false).await.map_err(|e| match e {
            Error::AuthExpired => Error::Authentication {
                message: "invalid username or password".into(),
            },
            Error::Http {
                status: 400 | 403 | 404,
                message,
                ..
            } => Error::Authentication { message },
            other => other,
        })?;

        let resp: LoginResponse = decode(envelope::normalize_record(value))?;

        let Some(access) = resp.access_token() else {
            return Err(Error::Authentication {
                message: "login response did not include an access token".into(),
            });
        };

        let identity = Identity {
            name: resp.display_name(&credentials.username),
            email: resp.email.clone().unwrap_or_default(),
            role: resp
                .role
                .as_deref()
                .and_then(|r| r.parse::<Role>().ok())
                .unwrap_or_default(),
        };
        let tokens = Tokens {
            access: SecretString::from(access),
            refresh: resp.refresh_token.map(SecretString::from),
        };

        self.session().login(identity.clone(), tokens)?;
        info!(name = %identity.name, "login succeeded");
        Ok(identity)
    }

    /// Forget the session locally. The backend keeps no server-side session.
    pub fn logout(&self) -> Result<(), Error> {
        self.session().logout()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn display_name_joins_first_and_last() {
        let resp: LoginResponse =
            serde_json::from_value(json!({"firstName": "Ada", "lastName": "Lovelace"})).unwrap();
        assert_eq!(resp.display_name("ada"), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let resp: LoginResponse = serde_json::from_value(json!({"token": "t"})).unwrap();
        assert_eq!(resp.display_name("ada"), "ada");
    }

    #[test]
    fn access_token_alias_is_accepted() {
        let resp: LoginResponse =
            serde_json::from_value(json!({"accessToken": "a", "refreshToken": "r"})).unwrap();
        assert_eq!(resp.access_token().as_deref(), Some("a"));
        assert_eq!(resp.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn token_and_access_token_together_decode() {
        let resp: LoginResponse =
            serde_json::from_value(json!({"token": "t", "accessToken": "a"})).unwrap();
        assert_eq!(resp.access_token().as_deref(), Some("t"));

        let resp: LoginResponse =
            serde_json::from_value(json!({"token": "", "access_token": "a"})).unwrap();
        assert_eq!(resp.access_token().as_deref(), Some("a"));
    }
}
