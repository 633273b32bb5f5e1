//! Media query lists (`MediaList`).

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::rule::WeakRule;
use super::{CssStyleSheet, StyleSheetInner};
use crate::mutation::{self, Mutation};
use crate::{parser, serialize, Error, Result};

#[derive(Clone)]
pub(crate) enum MediaOwner {
    None,
    StyleSheet(Weak<StyleSheetInner>),
    Rule(WeakRule),
}

struct MediaListInner {
    owner: MediaOwner,
    media: RwLock<Vec<String>>,
}

/// An ordered list of media query strings.
///
/// Entries are opaque: each is the whitespace-normalized text of one query.
/// The list never holds duplicates added through [`append_medium`].
///
/// [`append_medium`]: MediaList::append_medium
#[derive(Clone)]
pub struct MediaList {
    inner: Arc<MediaListInner>,
}

impl MediaList {
    /// Parse a standalone media list, e.g. `"screen, print"`.
    pub fn parse(text: &str) -> Self {
        Self::with_media(MediaOwner::None, parser::parse_media_list(text))
    }

    pub(crate) fn with_media(owner: MediaOwner, media: Vec<String>) -> Self {
        Self {
            inner: Arc::new(MediaListInner {
                owner,
                media: RwLock::new(media),
            }),
        }
    }

    /// The serialized list: entries joined with `", "`.
    pub fn media_text(&self) -> String {
        serialize::serialize_media_list(&self.inner.media.read())
    }

    /// Replace the whole list by parsing `text`.
    pub fn set_media_text(&self, text: &str) {
        let media = parser::parse_media_list(text);
        *self.inner.media.write() = media;
        self.notify();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.media.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.media.read().is_empty()
    }

    /// Entry at `index`.
    pub fn item(&self, index: usize) -> Option<String> {
        self.inner.media.read().get(index).cloned()
    }

    /// Snapshot of the entries.
    pub fn to_vec(&self) -> Vec<String> {
        self.inner.media.read().clone()
    }

    /// Add a medium unless an equal entry is already present.
    ///
    /// `medium` must be a single, non-empty query.
    pub fn append_medium(&self, medium: &str) -> Result<()> {
        let medium = single_medium(medium)?;
        {
            let mut media = self.inner.media.write();
            if media.contains(&medium) {
                return Ok(());
            }
            media.push(medium);
        }
        self.notify();
        Ok(())
    }

    /// Remove a medium, failing with [`Error::NotFound`] if it is absent.
    pub fn delete_medium(&self, medium: &str) -> Result<()> {
        let medium = single_medium(medium)?;
        {
            let mut media = self.inner.media.write();
            let Some(index) = media.iter().position(|m| *m == medium) else {
                return Err(Error::not_found(format!("medium '{}'", medium)));
            };
            media.remove(index);
        }
        self.notify();
        Ok(())
    }

    /// Replace the entries without notifying.
    pub(crate) fn replace(&self, media: Vec<String>) {
        *self.inner.media.write() = media;
    }

    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, Vec<String>> {
        self.inner.media.read()
    }

    fn owner_style_sheet(&self) -> Option<CssStyleSheet> {
        match &self.inner.owner {
            MediaOwner::None => None,
            MediaOwner::StyleSheet(sheet) => sheet.upgrade().map(CssStyleSheet::from_inner),
            MediaOwner::Rule(rule) => rule.upgrade()?.links().parent_style_sheet(),
        }
    }

    fn notify(&self) {
        mutation::notify(self.owner_style_sheet().as_ref(), Mutation::MediaChanged);
    }
}

fn single_medium(text: &str) -> Result<String> {
    let mut media = parser::parse_media_list(text);
    match media.len() {
        1 => Ok(media.remove(0)),
        0 => Err(Error::syntax("empty medium")),
        _ => Err(Error::syntax(format!("expected a single medium, got '{}'", text))),
    }
}

impl fmt::Debug for MediaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}

impl fmt::Display for MediaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize() {
        let media = MediaList::parse("screen ,print,  (min-width:  100px)");
        assert_eq!(media.len(), 3);
        assert_eq!(media.item(1).as_deref(), Some("print"));
        assert_eq!(media.media_text(), "screen, print, (min-width: 100px)");
    }

    #[test]
    fn append_is_idempotent() {
        let media = MediaList::parse("");
        media.append_medium("print").unwrap();
        media.append_medium("print").unwrap();
        media.append_medium("  print ").unwrap();

        assert_eq!(media.len(), 1);
        assert_eq!(media.media_text(), "print");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let media = MediaList::parse("screen");
        assert!(media.delete_medium("print").unwrap_err().is_not_found());
        media.delete_medium("screen").unwrap();
        assert!(media.is_empty());
        assert_eq!(media.media_text(), "");
    }

    #[test]
    fn append_rejects_lists() {
        let media = MediaList::parse("screen");
        assert!(media.append_medium("a, b").unwrap_err().is_syntax());
        assert!(media.append_medium("").unwrap_err().is_syntax());
        assert_eq!(media.len(), 1);
    }

    #[test]
    fn set_media_text_drops_empty_entries() {
        let media = MediaList::parse("screen");
        media.set_media_text("print, , tv");
        assert_eq!(media.to_vec(), vec!["print".to_owned(), "tv".to_owned()]);
    }
}
