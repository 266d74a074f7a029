//! Note list projection and filters.
//!
//! # Responsibility
//! - Filter the note collection by encryption state and tags.
//! - Project notes into display rows without ever exposing ciphertext.
//!
//! # Invariants
//! - Projection is stateless; input order is preserved.
//! - Locked notes render only the localized encrypted placeholder.

use crate::i18n::{I18n, Locale};
use crate::model::note::{Note, NoteBody, NoteId};
use crate::view::preview::preview_text;
use chrono::{DateTime, Local, TimeZone};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionFilter {
    #[default]
    All,
    Encrypted,
    Unencrypted,
}

impl EncryptionFilter {
    fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Encrypted => note.is_encrypted(),
            Self::Unencrypted => !note.is_encrypted(),
        }
    }
}

/// Filter state for the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub encryption: EncryptionFilter,
    selected_tags: BTreeSet<String>,
    tag_search: String,
}

impl NoteFilter {
    pub fn selected_tags(&self) -> impl Iterator<Item = &str> {
        self.selected_tags.iter().map(String::as_str)
    }

    /// Adds or removes `tag` from the selection.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.selected_tags.remove(tag) {
            self.selected_tags.insert(tag.to_string());
        }
    }

    pub fn set_tag_search(&mut self, query: &str) {
        self.tag_search = query.to_string();
    }

    pub fn tag_search(&self) -> &str {
        &self.tag_search
    }

    /// Whether any filter narrows the list.
    pub fn is_active(&self) -> bool {
        self.encryption != EncryptionFilter::All || !self.selected_tags.is_empty()
    }

    /// Resets encryption and tag filters. The tag search text is kept.
    pub fn clear(&mut self) {
        self.encryption = EncryptionFilter::All;
        self.selected_tags.clear();
    }

    /// A note passes when it matches the encryption filter and carries any
    /// selected tag.
    pub fn matches(&self, note: &Note) -> bool {
        self.encryption.matches(note)
            && (self.selected_tags.is_empty()
                || note.tags.iter().any(|tag| self.selected_tags.contains(tag)))
    }

    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|note| self.matches(note)).collect()
    }

    /// Tags from `available` whose name contains the search text,
    /// case-insensitively.
    pub fn searchable_tags<'a>(&self, available: &'a [String]) -> Vec<&'a str> {
        let needle = self.tag_search.trim().to_lowercase();
        available
            .iter()
            .map(String::as_str)
            .filter(|tag| needle.is_empty() || tag.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Sorted union of tags over `notes`.
pub fn available_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: NoteId,
    pub encrypted: bool,
    pub title: String,
    pub preview: String,
    pub tags: Vec<String>,
    pub updated_at: i64,
    pub updated_label: String,
}

pub fn list_item(note: &Note, i18n: &I18n) -> NoteListItem {
    list_item_in(note, i18n, &Local)
}

/// Projects `note` with dates rendered in `tz`.
pub fn list_item_in<Tz: TimeZone>(note: &Note, i18n: &I18n, tz: &Tz) -> NoteListItem
where
    Tz::Offset: std::fmt::Display,
{
    let (title, preview) = match &note.body {
        NoteBody::Locked(_) => {
            let placeholder = i18n.t("editor.encrypted").to_string();
            (placeholder.clone(), placeholder)
        }
        NoteBody::Plain(text) => {
            let title = if text.title.trim().is_empty() {
                i18n.t("notes.noTitle").to_string()
            } else {
                text.title.clone()
            };
            let preview = preview_text(&text.content)
                .unwrap_or_else(|| i18n.t("notes.emptyNote").to_string());
            (title, preview)
        }
    };

    NoteListItem {
        id: note.id,
        encrypted: note.is_encrypted(),
        title,
        preview,
        tags: note.tags.clone(),
        updated_at: note.updated_at,
        updated_label: format_timestamp(note.updated_at, i18n.locale(), tz),
    }
}

/// Renders epoch milliseconds as a day-and-minute label for `locale`.
///
/// Out-of-range timestamps render as an empty string.
pub fn format_timestamp<Tz: TimeZone>(epoch_ms: i64, locale: Locale, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(utc) = DateTime::from_timestamp_millis(epoch_ms) else {
        return String::new();
    };
    let local = utc.with_timezone(tz);
    let pattern = match locale {
        Locale::Ru => "%d.%m.%Y, %H:%M",
        Locale::En => "%m/%d/%Y, %I:%M %p",
    };
    local.format(pattern).to_string()
}
