//! Request and credential types for the catalog's auth endpoints.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use vitrine_core::Email;

/// Avatar service used for new accounts.
const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Bearer token issued by the catalog at login.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header and local storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Account to create with [`super::CatalogClient::register`].
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub avatar: String,
}

impl NewUser {
    /// New account with the generated initials avatar for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, email: Email, password: SecretString) -> Self {
        let name = name.into();
        let avatar = avatar_url(&name);
        Self {
            name,
            email,
            password,
            avatar,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("avatar", &self.avatar)
            .finish()
    }
}

/// Initials avatar URL for `name`, e.g.
/// `https://ui-avatars.com/api/?name=Jane+Doe&background=random`.
#[must_use]
pub fn avatar_url(name: &str) -> String {
    Url::parse_with_params(AVATAR_BASE_URL, &[("name", name), ("background", "random")])
        .map_or_else(|_| AVATAR_BASE_URL.to_string(), String::from)
}

#[derive(Serialize)]
pub(super) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(super) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub avatar: &'a str,
}

impl<'a> From<&'a NewUser> for RegisterBody<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            name: &user.name,
            email: user.email.as_str(),
            password: user.password.expose_secret(),
            avatar: &user.avatar,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_url_encodes_name() {
        assert_eq!(
            avatar_url("Jane Doe"),
            "https://ui-avatars.com/api/?name=Jane+Doe&background=random"
        );
        assert_eq!(
            avatar_url("Zoë & co"),
            "https://ui-avatars.com/api/?name=Zo%C3%AB+%26+co&background=random"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = AccessToken::new("eyJhbGciOi.secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.expose(), "eyJhbGciOi.secret");

        let user = NewUser::new(
            "Jane",
            "jane@example.com".parse().unwrap(),
            SecretString::from("hunter22"),
        );
        let debug = format!("{user:?}");
        assert!(debug.contains("Jane"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_register_body_wire_format() {
        let user = NewUser::new(
            "Jane",
            "jane@example.com".parse().unwrap(),
            SecretString::from("hunter22"),
        );
        let body = serde_json::to_value(RegisterBody::from(&user)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "hunter22",
                "avatar": "https://ui-avatars.com/api/?name=Jane&background=random",
            })
        );
    }
}
