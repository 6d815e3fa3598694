//! Authentication session.
//!
//! The catalog service issues a bearer token at login. The token is the only
//! auth state persisted (under [`keys::TOKEN`]); the profile is fetched again
//! on every start by [`AuthSession::restore`].

mod error;

pub use error::{AuthError, MIN_PASSWORD_LENGTH};

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use vitrine_core::{Email, User};

use crate::catalog::{AccessToken, CatalogClient, CatalogError, NewUser};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::notify::{Notice, SharedNotifier};
use crate::storage::{LocalStorage, keys};

/// Current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Profile of the signed-in user.
    pub user: Option<User>,
    /// User-facing message of the last failure.
    pub error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            user: None,
            error: Some(message.into()),
        }
    }
}

/// Login state backed by a stored token.
pub struct AuthSession<S> {
    state: AuthState,
    storage: S,
    notifier: SharedNotifier,
}

impl<S: LocalStorage> AuthSession<S> {
    /// A signed-out session. Call [`AuthSession::restore`] to resume a stored
    /// login.
    #[must_use]
    pub fn new(storage: S, notifier: SharedNotifier) -> Self {
        Self {
            state: AuthState::default(),
            storage,
            notifier,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Resume the session of a stored token.
    ///
    /// Returns whether a user is now signed in. A token the catalog no longer
    /// accepts is removed and leaves the session signed out with
    /// "Authentication failed".
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails.
    pub async fn restore(&mut self, client: &CatalogClient) -> Result<bool, AuthError> {
        let Some(raw) = self.storage.get_item(keys::TOKEN)? else {
            self.state = AuthState::default();
            return Ok(false);
        };

        match client.profile(&AccessToken::new(raw)).await {
            Ok(user) => {
                set_sentry_user(&user.id, Some(&user.email));
                info!(user_id = %user.id, "Session restored");
                self.state = AuthState::signed_in(user);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected, signing out");
                self.storage.remove_item(keys::TOKEN)?;
                self.state = AuthState::failed(AuthError::SessionExpired.user_message());
                Ok(false)
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the catalog rejects the
    /// credentials, [`AuthError::InvalidEmail`] for a malformed email, or the
    /// underlying catalog or storage error. The session is signed out and
    /// carries "Invalid email or password" in every case.
    pub async fn login(
        &mut self,
        client: &CatalogClient,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        match self.try_login(client, email, password).await {
            Ok(user) => {
                set_sentry_user(&user.id, Some(&user.email));
                info!(user_id = %user.id, "Logged in");
                self.state = AuthState::signed_in(user.clone());
                self.notifier.notify(Notice::success("Logged in successfully"));
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                let message = AuthError::InvalidCredentials.user_message();
                self.notifier.notify(Notice::error(message.clone()));
                self.state = AuthState::failed(message);
                Err(e)
            }
        }
    }

    async fn try_login(
        &self,
        client: &CatalogClient,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let token = client
            .login(email.as_str(), password.expose_secret())
            .await
            .map_err(|e| match e {
                CatalogError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Catalog(other),
            })?;

        self.storage.set_item(keys::TOKEN, token.expose())?;

        match client.profile(&token).await {
            Ok(user) => Ok(user),
            Err(e) => {
                self.storage.remove_item(keys::TOKEN)?;
                Err(e.into())
            }
        }
    }

    /// Create an account, then sign in with it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingField`], [`AuthError::InvalidEmail`] or
    /// [`AuthError::WeakPassword`] for input rejected locally,
    /// [`AuthError::Registration`] when the catalog refuses the account, or
    /// any error of the follow-up [`AuthSession::login`].
    pub async fn register(
        &mut self,
        client: &CatalogClient,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let new_user = match validate_registration(name, email, password) {
            Ok(new_user) => new_user,
            Err(e) => return Err(self.reject(e)),
        };

        if let Err(e) = client.register(&new_user).await {
            warn!(error = %e, "Registration failed");
            return Err(self.reject(AuthError::Registration(e)));
        }

        let user = self
            .login(client, new_user.email.as_str(), &new_user.password)
            .await?;
        self.notifier.notify(Notice::success("Registration successful"));
        Ok(user)
    }

    /// Sign out and forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed from storage.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.storage.remove_item(keys::TOKEN)?;
        self.state = AuthState::default();
        clear_sentry_user();
        info!("Logged out");
        self.notifier.notify(Notice::success("Logged out successfully"));
        Ok(())
    }

    /// Record `err` as the session's failure and announce it.
    fn reject(&mut self, err: AuthError) -> AuthError {
        let message = err.user_message();
        self.notifier.notify(Notice::error(message.clone()));
        self.state = AuthState::failed(message);
        err
    }
}

/// Check the registration form the way the sign-up page does.
fn validate_registration(
    name: &str,
    email: &str,
    password: &SecretString,
) -> Result<NewUser, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingField("name"));
    }
    if email.trim().is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    if password.expose_secret().is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    let email = Email::parse(email)?;
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(NewUser::new(name, email, password.clone()))
}
