//! Categories and sections, the closed set of things the site publishes.
//!
//! A [`Category`] names a row kind in the `content_items` table. A
//! [`Section`] is what a URL segment resolves to: either a content category
//! or the gallery, which lives in its own table. Every route parses its
//! segment into a `Section` before any query is issued, so unknown values
//! never reach the store.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

// ─── Category ────────────────────────────────────────────────────────────────

/// The `category` column of a content item.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  Esai,
  Novel,
  Cerpen,
  Puisi,
  Dokumentasi,
  Book,
  /// Soft singleton: at most one row, enforced by the publishing workflow.
  Biography,
}

impl Category {
  /// The lowercase slug stored in the database and used in URLs.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Display title, the slug with its first letter capitalised.
  pub fn title(self) -> &'static str {
    match self {
      Category::Esai => "Esai",
      Category::Novel => "Novel",
      Category::Cerpen => "Cerpen",
      Category::Puisi => "Puisi",
      Category::Dokumentasi => "Dokumentasi",
      Category::Book => "Book",
      Category::Biography => "Biography",
    }
  }

  /// Categories that hold many items (everything except the biography).
  pub fn listable() -> impl Iterator<Item = Category> {
    Category::iter().filter(|c| *c != Category::Biography)
  }
}

// ─── Section ─────────────────────────────────────────────────────────────────

/// A routable part of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  Content(Category),
  Gallery,
}

/// How a section is stored and where it is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDescriptor {
  pub table:        &'static str,
  /// Whether the section carries a rich-text body (the gallery does not).
  pub rich_content: bool,
  pub singleton:    bool,
  /// Whether the section has public `/{slug}` pages.
  pub public:       bool,
}

impl Section {
  pub fn descriptor(self) -> SectionDescriptor {
    match self {
      Section::Gallery => SectionDescriptor {
        table:        "gallery",
        rich_content: false,
        singleton:    false,
        public:       true,
      },
      Section::Content(Category::Biography) => SectionDescriptor {
        table:        "content_items",
        rich_content: true,
        singleton:    true,
        public:       false,
      },
      Section::Content(_) => SectionDescriptor {
        table:        "content_items",
        rich_content: true,
        singleton:    false,
        public:       true,
      },
    }
  }

  pub fn slug(self) -> &'static str {
    match self {
      Section::Content(c) => c.as_str(),
      Section::Gallery => "gallery",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Section::Content(c) => c.title(),
      Section::Gallery => "Gallery",
    }
  }

  /// All sections, content categories first.
  pub fn all() -> impl Iterator<Item = Section> {
    Category::iter()
      .map(Section::Content)
      .chain(std::iter::once(Section::Gallery))
  }

  /// Parse a public URL segment. Sections without public pages are rejected
  /// as unknown so the caller falls through to its not-found handling.
  pub fn parse_public(segment: &str) -> Result<Section> {
    let section: Section = segment.parse()?;
    if section.descriptor().public {
      Ok(section)
    } else {
      Err(Error::UnknownSection(segment.to_owned()))
    }
  }

  /// Parse a segment of the generic admin CRUD routes.
  ///
  /// Accepts `books` as an alias for `book`. Singletons have their own
  /// routes and are refused here.
  pub fn parse_admin(segment: &str) -> Result<Section> {
    let section: Section = if segment.eq_ignore_ascii_case("books") {
      Section::Content(Category::Book)
    } else {
      segment.parse()?
    };
    if section.descriptor().singleton {
      return Err(Error::SectionUnavailable(section.slug()));
    }
    Ok(section)
  }
}

impl FromStr for Section {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s.eq_ignore_ascii_case("gallery") {
      return Ok(Section::Gallery);
    }
    Category::from_str(s)
      .map(Section::Content)
      .map_err(|_| Error::UnknownSection(s.to_owned()))
  }
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.slug())
  }
}
