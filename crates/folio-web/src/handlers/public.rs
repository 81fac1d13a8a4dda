//! Public pages: home, category listings and single items.

use axum::{
  Extension,
  extract::{Path, State},
  response::Response,
};
use folio_core::{
  category::{Category, Section},
  store::SiteStore,
};

use crate::{
  AppState,
  analytics::PageContext,
  error::{Error, Result},
  seo::{Seo, item_description},
  views::{Card, CategoryPage, HomePage, Shelf, SinglePage, format_date, render},
};

const SHELF_SIZE: usize = 3;
const HOME_BOOKS: usize = 10;
const HOME_PHOTOS: usize = 5;

/// Categories shown as shelves on the home page, in order.
const SHELVES: [Category; 5] = [
  Category::Esai,
  Category::Novel,
  Category::Cerpen,
  Category::Puisi,
  Category::Dokumentasi,
];

pub async fn home<S>(
  State(state): State<AppState<S>>,
  Extension(page): Extension<PageContext>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let store = &state.store;

  let biography = store
    .latest_content(Category::Biography, 1)
    .await
    .map_err(Error::store)?
    .first()
    .map(Card::from_item);

  let mut shelves = Vec::with_capacity(SHELVES.len());
  for category in SHELVES {
    let items = store
      .latest_content(category, SHELF_SIZE)
      .await
      .map_err(Error::store)?;
    shelves.push(Shelf {
      slug:  category.as_str(),
      title: category.title(),
      cards: items.iter().map(Card::from_item).collect(),
    });
  }

  let books = store
    .latest_content(Category::Book, HOME_BOOKS)
    .await
    .map_err(Error::store)?;
  let gallery = store.latest_gallery(HOME_PHOTOS).await.map_err(Error::store)?;
  let slides = store.list_slides().await.map_err(Error::store)?;

  let seo = Seo {
    title:       String::new(),
    description: page.settings.value("site_description").to_owned(),
    url:         state.config.site_url.clone(),
    image:       None,
  };

  render(&HomePage {
    page,
    seo,
    biography,
    slides,
    shelves,
    books: books.iter().map(Card::from_item).collect(),
    gallery: gallery.iter().map(Card::from_photo).collect(),
  })
}

pub async fn category<S>(
  State(state): State<AppState<S>>,
  Extension(page): Extension<PageContext>,
  Path(segment): Path<String>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = Section::parse_public(&segment).map_err(|_| Error::NotFound)?;

  let cards = match section {
    Section::Gallery => state
      .store
      .list_gallery()
      .await
      .map_err(Error::store)?
      .iter()
      .map(Card::from_photo)
      .collect(),
    Section::Content(category) => state
      .store
      .list_content(category)
      .await
      .map_err(Error::store)?
      .iter()
      .map(Card::from_item)
      .collect(),
  };

  let seo = Seo::listing(&state.config.site_url, section, page.settings.author());
  render(&CategoryPage {
    page,
    seo,
    slug: section.slug(),
    title: section.title(),
    cards,
  })
}

pub async fn single<S>(
  State(state): State<AppState<S>>,
  Extension(page): Extension<PageContext>,
  Path((segment, id)): Path<(String, String)>,
) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let section = Section::parse_public(&segment).map_err(|_| Error::NotFound)?;
  let id: i64 = id.parse().map_err(|_| Error::NotFound)?;
  let site_url = &state.config.site_url;
  let author = page.settings.author();

  let view = match section {
    Section::Gallery => {
      let entry = state
        .store
        .get_gallery(id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::NotFound)?;
      let description = item_description("", Some(&entry.caption), author);
      SinglePage {
        seo: Seo::item(site_url, section, id, &entry.caption, description, Some(&entry.image_url)),
        slug: section.slug(),
        category_title: section.title(),
        title: entry.caption,
        body: String::new(),
        image_url: Some(entry.image_url),
        date: format_date(&entry.created_at),
        page,
      }
    }
    Section::Content(category) => {
      let item = state
        .store
        .get_content(category, id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::NotFound)?;
      let description = item_description(&item.content, None, author);
      SinglePage {
        seo: Seo::item(site_url, section, id, &item.title, description, item.image_url.as_deref()),
        slug: section.slug(),
        category_title: section.title(),
        title: item.title,
        body: item.content,
        image_url: item.image_url,
        date: format_date(&item.created_at),
        page,
      }
    }
  };

  render(&view)
}
