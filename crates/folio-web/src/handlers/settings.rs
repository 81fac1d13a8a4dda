//! Site settings form.

use std::collections::BTreeMap;

use axum::{
  Extension, Form,
  extract::{Query, State},
  response::{IntoResponse, Redirect, Response},
};
use folio_core::store::SiteStore;
use serde::Deserialize;

use crate::{
  AppState,
  analytics::PageContext,
  auth::AdminSession,
  error::{Error, Result},
  views::{SettingField, SettingsPage, render},
};

/// Fields offered by the form: key, label, multiline.
const FIELDS: &[(&str, &str, bool)] = &[
  ("site_title", "Site title", false),
  ("site_author", "Author name", false),
  ("site_description", "Site description", true),
  ("footer_text", "Footer text", true),
];

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
  pub success: Option<String>,
}

pub async fn show(
  _admin: AdminSession,
  Extension(page): Extension<PageContext>,
  Query(query): Query<SettingsQuery>,
) -> Result<Response> {
  let fields = FIELDS
    .iter()
    .map(|&(key, label, multiline)| SettingField {
      key,
      label,
      value: page.settings.value(key).to_owned(),
      multiline,
    })
    .collect();

  render(&SettingsPage {
    title: "Settings".to_string(),
    success: query.success.as_deref() == Some("1"),
    fields,
  })
}

/// Upsert every submitted key, last write wins.
pub async fn save<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Form(values): Form<BTreeMap<String, String>>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  for (key, value) in values {
    state
      .store
      .put_setting(key, value)
      .await
      .map_err(Error::store)?;
  }
  tracing::info!("site settings updated");
  Ok(Redirect::to("/admin/settings?success=1").into_response())
}
