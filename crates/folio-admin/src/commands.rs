//! Administration tasks, each one a short sequence of store calls.

use anyhow::{Context as _, Result, bail};
use folio_core::{
  content::ContentDraft,
  password::hash_password,
  store::{SiteStore, StoreError as _},
  user::User,
};

pub const DEFAULT_BIOGRAPHY_TITLE: &str = "Tentang Hudan Hidayat";
pub const DEFAULT_BIOGRAPHY_IMAGE: &str = "/images/tentang.jpeg";
pub const DEFAULT_BIOGRAPHY_CONTENT: &str = "<p>Hudan Hidayat, seorang cerpenis, penyair, sekaligus \
  eseis sastra kelahiran Yogyakarta yang kini tinggal di Jakarta.</p>\
  <p>Hudan Hidayat menulis pertama kali di majalah Zaman pada 1984. Lulusan Fisipol jurusan \
  Hubungan Internasional di Universitas Jayabaya ini pada April 1999 menghadiri Pertemuan \
  Sastra Nusantara di Malaysia bersama beberapa sastrawan Indonesia lainnya.</p>";

#[derive(Debug)]
pub enum CreateAdmin {
  Created(User),
  UsernameTaken,
}

/// Hash `password` and insert a new account.
pub async fn create_admin<S: SiteStore>(
  store: &S,
  username: &str,
  password: &str,
) -> Result<CreateAdmin> {
  if username.is_empty() || password.is_empty() {
    bail!("username and password are required");
  }
  let hash = hash_password(password)?;
  match store.create_user(username.to_owned(), hash).await {
    Ok(user) => Ok(CreateAdmin::Created(user)),
    Err(e) if e.is_conflict() => Ok(CreateAdmin::UsernameTaken),
    Err(e) => Err(e).context("failed to insert user"),
  }
}

/// Replace the password of an existing account.
pub async fn reset_password<S: SiteStore>(store: &S, username: &str, password: &str) -> Result<()> {
  if password.is_empty() {
    bail!("password must not be empty");
  }
  let user = store
    .find_user(username)
    .await?
    .with_context(|| format!("no user named {username:?}"))?;
  let hash = hash_password(password)?;
  store.set_password_hash(user.id, hash).await?;
  Ok(())
}

/// Insert the default biography. Returns `false` when one already exists.
pub async fn seed_biography<S: SiteStore>(store: &S) -> Result<bool> {
  let inserted = store
    .create_biography_if_absent(ContentDraft {
      title:     DEFAULT_BIOGRAPHY_TITLE.to_owned(),
      content:   DEFAULT_BIOGRAPHY_CONTENT.to_owned(),
      image_url: Some(DEFAULT_BIOGRAPHY_IMAGE.to_owned()),
    })
    .await?;
  Ok(inserted)
}

/// Append hero-slider entries in the order given.
pub async fn seed_slider<S: SiteStore>(store: &S, image_urls: Vec<String>) -> Result<usize> {
  let mut added = 0;
  for url in image_urls {
    let url = url.trim().to_owned();
    if url.is_empty() {
      continue;
    }
    store.add_slide(url).await?;
    added += 1;
  }
  Ok(added)
}
