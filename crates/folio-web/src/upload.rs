//! Multipart form parsing and image storage for the publishing forms.
//!
//! Files are written to the upload directory under a random name before
//! any row referencing them is written. Nothing removes a file once
//! stored.

use std::{collections::HashMap, path::Path};

use axum::extract::Multipart;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Name of the file input on every publishing form.
pub const IMAGE_FIELD: &str = "image";

/// File types accepted as uploaded images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub const UNSUPPORTED_IMAGE: &str = "Only jpg, jpeg, png, gif and webp images can be uploaded.";

/// URL prefix under which the upload directory is served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// A submitted publishing form: its text fields and the stored image, if
/// one was attached.
#[derive(Debug, Default)]
pub struct SubmittedForm {
  fields:    HashMap<String, String>,
  pub image: Option<String>,
}

impl SubmittedForm {
  /// A text field, or an empty string when absent.
  pub fn field(&self, name: &str) -> String { self.fields.get(name).cloned().unwrap_or_default() }
}

/// Drain `multipart`, storing an attached image under `upload_dir`.
pub async fn read_form(mut multipart: Multipart, upload_dir: &Path) -> Result<SubmittedForm> {
  let mut form = SubmittedForm::default();

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.body_text()))?
  {
    let Some(name) = field.name().map(str::to_owned) else {
      continue;
    };

    if name == IMAGE_FIELD {
      let file_name = field.file_name().map(str::to_owned);
      let data = field
        .bytes()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?;
      if let Some(file_name) = file_name.filter(|f| !f.is_empty()) {
        form.image = store_image(upload_dir, &file_name, data).await?;
      }
    } else {
      let text = field
        .text()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?;
      form.fields.insert(name, text);
    }
  }

  Ok(form)
}

/// Write `data` to a fresh file and return its public URL. Empty uploads
/// (a file input left blank) store nothing; anything but an image is
/// refused.
async fn store_image(upload_dir: &Path, original_name: &str, data: Bytes) -> Result<Option<String>> {
  if data.is_empty() {
    return Ok(None);
  }

  let Some(ext) = extension(original_name) else {
    return Err(Error::BadRequest(UNSUPPORTED_IMAGE.to_string()));
  };
  let name = format!("{}.{ext}", Uuid::new_v4().simple());

  tokio::fs::create_dir_all(upload_dir).await?;
  tokio::fs::write(upload_dir.join(&name), &data).await?;
  tracing::info!(file = %name, bytes = data.len(), "stored upload");

  Ok(Some(format!("{UPLOAD_URL_PREFIX}/{name}")))
}

/// The lowercase extension of a client-supplied file name, if it is one of
/// [`IMAGE_EXTENSIONS`].
fn extension(file_name: &str) -> Option<String> {
  let (_, ext) = file_name.rsplit_once('.')?;
  let ext = ext.to_ascii_lowercase();
  IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
