//! Admin account management.

use axum::{
  Form,
  extract::State,
  response::{IntoResponse, Redirect, Response},
};
use folio_core::{
  password::hash_password,
  store::{SiteStore, StoreError},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AdminSession,
  error::{Error, Result},
  views::{UserCreatePage, UserRow, UsersListPage, format_date, render},
};

pub const CREATE_FAILED: &str = "Error creating user. Username might exist.";
pub const FIELDS_REQUIRED: &str = "Username and password are required.";

pub async fn list<S>(State(state): State<AppState<S>>, _admin: AdminSession) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let users = state.store.list_users().await.map_err(Error::store)?;
  render(&UsersListPage {
    title: "Manage Users".to_string(),
    users: users
      .into_iter()
      .map(|u| UserRow {
        id:       u.id,
        username: u.username,
        created:  format_date(&u.created_at),
      })
      .collect(),
  })
}

fn create_page(error: Option<&'static str>) -> Result<Response> {
  render(&UserCreatePage {
    title: "Add New User".to_string(),
    error,
  })
}

pub async fn create_form(_admin: AdminSession) -> Result<Response> { create_page(None) }

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
  pub username: String,
  pub password: String,
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Form(form): Form<NewUserForm>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let username = form.username.trim();
  if username.is_empty() || form.password.is_empty() {
    return create_page(Some(FIELDS_REQUIRED));
  }

  let hash = hash_password(&form.password)?;
  match state.store.create_user(username.to_owned(), hash).await {
    Ok(user) => {
      tracing::info!(user_id = user.id, username = %user.username, "user created");
      Ok(Redirect::to("/admin/users").into_response())
    }
    Err(e) => {
      if e.is_conflict() {
        tracing::info!(%username, "username already taken");
      } else {
        tracing::error!(error = %e, "failed to create user");
      }
      create_page(Some(CREATE_FAILED))
    }
  }
}
