//! Session-based admin authentication.
//!
//! A successful login stores the user id and an admin flag in the session.
//! Admin handlers take an [`AdminSession`]; requests without one are
//! redirected to the login page.

use axum::{
  Form,
  extract::{FromRequestParts, State},
  http::request::Parts,
  response::{IntoResponse, Redirect, Response},
};
use folio_core::{
  password::{hash_password, verify_password},
  store::SiteStore,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
  AppState,
  error::{Error, Result},
  views::{LoginPage, PasswordPage, render},
};

pub const USER_ID_KEY: &str = "user_id";
pub const IS_ADMIN_KEY: &str = "is_admin";

pub const LOGIN_PATH: &str = "/auth/login";

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const PASSWORD_MISMATCH: &str = "New passwords do not match.";
pub const PASSWORD_INCORRECT: &str = "Current password is incorrect.";
pub const PASSWORD_UPDATED: &str = "Password updated successfully.";
pub const PASSWORD_SERVER_ERROR: &str = "Server error.";

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Proof that the request belongs to a logged-in administrator.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub user_id: i64,
  pub session: Session,
}

impl<S> FromRequestParts<S> for AdminSession
where
  S: Send + Sync,
{
  type Rejection = Response;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let session = Session::from_request_parts(parts, state)
      .await
      .map_err(IntoResponse::into_response)?;

    let user_id: Option<i64> = session
      .get(USER_ID_KEY)
      .await
      .map_err(|e| Error::from(e).into_response())?;
    let is_admin: bool = session
      .get(IS_ADMIN_KEY)
      .await
      .map_err(|e| Error::from(e).into_response())?
      .unwrap_or(false);

    match user_id {
      Some(user_id) if is_admin => Ok(AdminSession { user_id, session }),
      _ => Err(Redirect::to(LOGIN_PATH).into_response()),
    }
  }
}

// ─── Login / logout ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

pub async fn login_form() -> Result<Response> { render(&LoginPage { error: None }) }

pub async fn login<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Form(form): Form<LoginForm>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let user = state
    .store
    .find_user(&form.username)
    .await
    .map_err(Error::store)?;

  let Some(user) = user.filter(|u| verify_password(&form.password, &u.password_hash)) else {
    tracing::info!(username = %form.username, "failed login attempt");
    return render(&LoginPage {
      error: Some(INVALID_CREDENTIALS),
    });
  };

  session.cycle_id().await?;
  session.insert(USER_ID_KEY, user.id).await?;
  session.insert(IS_ADMIN_KEY, true).await?;
  session.save().await?;

  tracing::info!(user_id = user.id, "admin logged in");
  Ok(Redirect::to("/admin").into_response())
}

pub async fn logout(session: Session) -> Redirect {
  if let Err(e) = session.flush().await {
    tracing::warn!(error = %e, "failed to destroy session");
  }
  Redirect::to("/")
}

// ─── Password change ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
  pub current_password: String,
  pub new_password:     String,
  pub confirm_password: String,
}

fn password_page(error: Option<&'static str>, success: Option<&'static str>) -> Result<Response> {
  render(&PasswordPage {
    title: "Change Password".to_string(),
    error,
    success,
  })
}

pub async fn password_form(_admin: AdminSession) -> Result<Response> { password_page(None, None) }

pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  admin: AdminSession,
  Form(form): Form<PasswordForm>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  if form.new_password != form.confirm_password {
    return password_page(Some(PASSWORD_MISMATCH), None);
  }

  match update_password(&state, admin.user_id, &form).await {
    Ok(true) => password_page(None, Some(PASSWORD_UPDATED)),
    Ok(false) => password_page(Some(PASSWORD_INCORRECT), None),
    Err(e) => {
      tracing::error!(error = %e, user_id = admin.user_id, "password change failed");
      password_page(Some(PASSWORD_SERVER_ERROR), None)
    }
  }
}

/// Returns `false` when the current password does not verify.
async fn update_password<S>(state: &AppState<S>, user_id: i64, form: &PasswordForm) -> Result<bool>
where
  S: SiteStore + Clone + 'static,
{
  let user = state.store.get_user(user_id).await.map_err(Error::store)?;
  let Some(user) = user.filter(|u| verify_password(&form.current_password, &u.password_hash)) else {
    return Ok(false);
  };

  let hash = hash_password(&form.new_password)?;
  state
    .store
    .set_password_hash(user.id, hash)
    .await
    .map_err(Error::store)?;
  tracing::info!(user_id, "password changed");
  Ok(true)
}
