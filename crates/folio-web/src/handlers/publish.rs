//! Admin CRUD over every section, plus the biography singleton.
//!
//! One handler set serves all sections: the route segment is parsed into a
//! [`Section`] and the section's descriptor decides which table and which
//! form fields apply.

use axum::{
  extract::{Multipart, Path, State},
  response::{IntoResponse, Redirect, Response},
};
use folio_core::{
  category::{Category, Section},
  content::{ContentDraft, GalleryDraft, resolve_image},
  store::SiteStore,
};

use crate::{
  AppState,
  auth::AdminSession,
  error::{Error, Result},
  upload::{SubmittedForm, read_form},
  views::{EditPage, FormValues, ListPage, ListRow, format_date, render},
};

pub const IMAGE_REQUIRED: &str = "Please choose an image to upload.";

const BIOGRAPHY_PATH: &str = "/admin/biography";
const BIOGRAPHY_PLACEHOLDER_TITLE: &str = "Tentang";
const NO_CAPTION: &str = "No Caption";

fn parse_section(segment: &str) -> Result<Section> {
  Section::parse_admin(segment).map_err(|_| Error::NotFound)
}

fn list_path(section: Section) -> String { format!("/admin/{}", section.slug()) }

fn to_list(section: Section) -> Response { Redirect::to(&list_path(section)).into_response() }

/// Title of the create form, e.g. "Add New Esai" or "Add New Photo".
fn noun(section: Section) -> &'static str {
  match section {
    Section::Gallery => "Photo",
    Section::Content(c) => c.title(),
  }
}

fn edit_page(
  section: Section,
  title: String,
  action: String,
  values: FormValues,
  error: Option<&'static str>,
) -> Result<Response> {
  render(&EditPage {
    title,
    action,
    back_link: list_path(section),
    rich_content: section.descriptor().rich_content,
    values,
    error,
  })
}

fn form_values(section: Section, form: &SubmittedForm) -> FormValues {
  FormValues {
    title:     form.field("title"),
    content:   if section.descriptor().rich_content { form.field("content") } else { String::new() },
    image_url: form.image.clone(),
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Path(segment): Path<String>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = parse_section(&segment)?;

  let rows = match section {
    Section::Gallery => state
      .store
      .list_gallery()
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|e| ListRow {
        id:    e.id,
        title: if e.caption.is_empty() { NO_CAPTION.to_string() } else { e.caption },
        date:  format_date(&e.created_at),
      })
      .collect(),
    Section::Content(category) => state
      .store
      .list_content(category)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|i| ListRow {
        id:    i.id,
        title: i.title,
        date:  format_date(&i.created_at),
      })
      .collect(),
  };

  let base_path = list_path(section);
  render(&ListPage {
    title: format!("Manage {}", section.title()),
    create_link: format!("{base_path}/create"),
    base_path,
    rows,
  })
}

// ─── Create ──────────────────────────────────────────────────────────────────

pub async fn create_form(_admin: AdminSession, Path(segment): Path<String>) -> Result<Response> {
  let section = parse_section(&segment)?;
  edit_page(
    section,
    format!("Add New {}", noun(section)),
    format!("{}/create", list_path(section)),
    FormValues::default(),
    None,
  )
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Path(segment): Path<String>,
  multipart: Multipart,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = parse_section(&segment)?;
  let form = read_form(multipart, &state.config.upload_dir).await?;

  match section {
    Section::Gallery => {
      let Some(image_url) = form.image.clone() else {
        return edit_page(
          section,
          format!("Add New {}", noun(section)),
          format!("{}/create", list_path(section)),
          form_values(section, &form),
          Some(IMAGE_REQUIRED),
        );
      };
      let entry = state
        .store
        .create_gallery(GalleryDraft {
          caption: form.field("title"),
          image_url,
        })
        .await
        .map_err(Error::store)?;
      tracing::info!(id = entry.id, "gallery entry created");
    }
    Section::Content(category) => {
      let item = state
        .store
        .create_content(category, ContentDraft {
          title:     form.field("title"),
          content:   form.field("content"),
          image_url: resolve_image(form.image, None),
        })
        .await
        .map_err(Error::store)?;
      tracing::info!(id = item.id, %category, "content item created");
    }
  }

  Ok(to_list(section))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

pub async fn edit_form<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Path((segment, id)): Path<(String, String)>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = parse_section(&segment)?;
  let Ok(id) = id.parse::<i64>() else {
    return Ok(to_list(section));
  };

  let values = match section {
    Section::Gallery => state
      .store
      .get_gallery(id)
      .await
      .map_err(Error::store)?
      .map(|e| FormValues {
        title:     e.caption,
        content:   String::new(),
        image_url: Some(e.image_url),
      }),
    Section::Content(category) => state
      .store
      .get_content(category, id)
      .await
      .map_err(Error::store)?
      .map(|i| FormValues {
        title:     i.title,
        content:   i.content,
        image_url: i.image_url,
      }),
  };

  let Some(values) = values else {
    return Ok(to_list(section));
  };

  edit_page(
    section,
    format!("Edit {}", noun(section)),
    format!("{}/edit/{id}", list_path(section)),
    values,
    None,
  )
}

pub async fn edit<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Path((segment, id)): Path<(String, String)>,
  multipart: Multipart,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = parse_section(&segment)?;
  let Ok(id) = id.parse::<i64>() else {
    return Ok(to_list(section));
  };
  let form = read_form(multipart, &state.config.upload_dir).await?;

  match section {
    Section::Gallery => {
      let Some(current) = state.store.get_gallery(id).await.map_err(Error::store)? else {
        return Ok(to_list(section));
      };
      let image_url = resolve_image(form.image.clone(), Some(current.image_url)).unwrap_or_default();
      state
        .store
        .update_gallery(id, GalleryDraft {
          caption: form.field("title"),
          image_url,
        })
        .await
        .map_err(Error::store)?;
    }
    Section::Content(category) => {
      let Some(current) = state
        .store
        .get_content(category, id)
        .await
        .map_err(Error::store)?
      else {
        return Ok(to_list(section));
      };
      state
        .store
        .update_content(category, id, ContentDraft {
          title:     form.field("title"),
          content:   form.field("content"),
          image_url: resolve_image(form.image, current.image_url),
        })
        .await
        .map_err(Error::store)?;
    }
  }

  tracing::info!(id, %section, "item updated");
  Ok(to_list(section))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// Deleting an id that does not exist is a no-op with the same redirect.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Path((segment, id)): Path<(String, String)>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = parse_section(&segment)?;
  let Ok(id) = id.parse::<i64>() else {
    return Ok(to_list(section));
  };

  let removed = match section {
    Section::Gallery => state.store.delete_gallery(id).await,
    Section::Content(category) => state.store.delete_content(category, id).await,
  }
  .map_err(Error::store)?;

  if removed {
    tracing::info!(id, %section, "item deleted");
  }
  Ok(to_list(section))
}

// ─── Biography ───────────────────────────────────────────────────────────────

fn biography_page(values: FormValues) -> Result<Response> {
  edit_page(
    Section::Content(Category::Biography),
    "Edit Biography".to_string(),
    BIOGRAPHY_PATH.to_string(),
    values,
    None,
  )
}

pub async fn biography_form<S>(State(state): State<AppState<S>>, _admin: AdminSession) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let current = state
    .store
    .latest_content(Category::Biography, 1)
    .await
    .map_err(Error::store)?
    .into_iter()
    .next();

  let values = match current {
    Some(item) => FormValues {
      title:     item.title,
      content:   item.content,
      image_url: item.image_url,
    },
    None => FormValues {
      title: BIOGRAPHY_PLACEHOLDER_TITLE.to_string(),
      ..FormValues::default()
    },
  };
  biography_page(values)
}

/// Update the biography if one exists, otherwise create it. Concurrent
/// submits never leave two rows.
pub async fn save_biography<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  multipart: Multipart,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let form = read_form(multipart, &state.config.upload_dir).await?;
  let inserted = state
    .store
    .save_biography(ContentDraft {
      title:     form.field("title"),
      content:   form.field("content"),
      image_url: form.image,
    })
    .await
    .map_err(Error::store)?;

  if inserted {
    tracing::info!("biography created");
  } else {
    tracing::info!("biography updated");
  }
  Ok(Redirect::to(BIOGRAPHY_PATH).into_response())
}
