//! Page metadata for search engines and link previews.

use folio_core::category::Section;

/// Longest meta description emitted, in characters.
pub const DESCRIPTION_LIMIT: usize = 160;

/// Shown in link previews when an item has no image of its own.
pub const DEFAULT_IMAGE_PATH: &str = "/images/tentang.jpeg";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seo {
  pub title:       String,
  pub description: String,
  pub url:         String,
  pub image:       Option<String>,
}

impl Seo {
  /// Metadata of a category listing page.
  pub fn listing(site_url: &str, section: Section, author: &str) -> Self {
    Seo {
      title:       section.title().to_owned(),
      description: format!("Arsip dan kumpulan {} karya {author}.", section.title()),
      url:         format!("{}/{}", base(site_url), section.slug()),
      image:       None,
    }
  }

  /// Metadata of a single item page.
  pub fn item(
    site_url: &str,
    section: Section,
    id: i64,
    title: &str,
    description: String,
    image: Option<&str>,
  ) -> Self {
    let image = match image.filter(|i| !i.is_empty()) {
      Some(i) => absolute(site_url, i),
      None => format!("{}{DEFAULT_IMAGE_PATH}", base(site_url)),
    };
    Seo {
      title: title.to_owned(),
      description,
      url: format!("{}/{}/{id}", base(site_url), section.slug()),
      image: Some(image),
    }
  }
}

fn base(site_url: &str) -> &str { site_url.trim_end_matches('/') }

/// Site-relative paths are prefixed with the site URL.
fn absolute(site_url: &str, path: &str) -> String {
  if path.starts_with('/') {
    format!("{}{path}", base(site_url))
  } else {
    path.to_owned()
  }
}

/// Remove everything between `<` and the next `>`. A `<` without a closing
/// `>` is kept as text.
pub fn strip_tags(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut rest = html;
  while let Some(open) = rest.find('<') {
    out.push_str(&rest[..open]);
    match rest[open..].find('>') {
      Some(close) => rest = &rest[open + close + 1..],
      None => {
        rest = &rest[open..];
        break;
      }
    }
  }
  out.push_str(rest);
  out
}

/// The first `limit` characters of `s`.
pub fn truncate_chars(s: &str, limit: usize) -> &str {
  match s.char_indices().nth(limit) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Description of a single item: its text without markup, else its
/// caption, else a generic credit to the author.
pub fn item_description(content: &str, caption: Option<&str>, author: &str) -> String {
  if !content.is_empty() {
    return truncate_chars(&strip_tags(content), DESCRIPTION_LIMIT).to_owned();
  }
  match caption.filter(|c| !c.is_empty()) {
    Some(caption) => caption.to_owned(),
    None => format!("Karya {author}"),
  }
}
