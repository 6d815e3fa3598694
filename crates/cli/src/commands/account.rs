//! Account commands.

use secrecy::SecretString;

use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

use crate::output;

pub async fn login(state: &mut AppState, email: &str, password: String) -> Result<(), AppError> {
    let password = SecretString::from(password);
    let user = state.login(email, &password).await?;
    output::info(&format!("Welcome back, {}!", user.name));
    Ok(())
}

pub async fn register(
    state: &mut AppState,
    name: &str,
    email: &str,
    password: String,
) -> Result<(), AppError> {
    let password = SecretString::from(password);
    let user = state.register(name, email, &password).await?;
    output::info(&format!("Welcome, {}!", user.name));
    Ok(())
}

pub fn logout(state: &mut AppState) -> Result<(), AppError> {
    state.logout()?;
    Ok(())
}

/// Resume the stored session and show the dashboard.
pub async fn dashboard(state: &mut AppState) -> Result<(), AppError> {
    state.restore_session().await?;

    let Some(user) = state.auth().user() else {
        let message = state
            .auth()
            .state()
            .error
            .clone()
            .unwrap_or_else(|| "Sign in to see your account".to_string());
        return Err(AppError::Unauthorized(message));
    };

    output::account(state, user);
    Ok(())
}
