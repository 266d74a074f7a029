//! Localization.
//!
//! # Responsibility
//! - Resolve dotted message keys for the active locale.
//! - Keep the active locale in one persisted settings slot.
//!
//! # Invariants
//! - Unknown keys resolve to the key itself.
//! - A missing, unreadable or unknown stored locale falls back to `Locale::Ru`.

mod catalog;

use crate::settings::{SettingsResult, SettingsStore};
use log::warn;
use std::fmt::{Display, Formatter};

/// Settings slot holding the active locale code.
pub const LOCALE_SETTING_KEY: &str = "locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Ru, Locale::En];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ru" => Some(Self::Ru),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up `key` in the table for `locale`.
pub fn translate(locale: Locale, key: &str) -> &str {
    let table = match locale {
        Locale::Ru => &*catalog::RU,
        Locale::En => &*catalog::EN,
    };
    table.get(key).copied().unwrap_or(key)
}

/// Active locale plus the store it is persisted in.
pub struct I18n {
    locale: Locale,
    store: Box<dyn SettingsStore + Send>,
}

impl I18n {
    /// Loads the persisted locale, or the default when none is usable.
    pub fn load(store: Box<dyn SettingsStore + Send>) -> Self {
        let locale = match store.get(LOCALE_SETTING_KEY) {
            Ok(Some(raw)) => Locale::parse(&raw).unwrap_or_else(|| {
                warn!("event=locale_load module=i18n status=error reason=unknown_locale");
                Locale::default()
            }),
            Ok(None) => Locale::default(),
            Err(err) => {
                warn!("event=locale_load module=i18n status=error error={err}");
                Locale::default()
            }
        };
        Self { locale, store }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switches locale and persists it.
    ///
    /// The in-memory locale changes even when persisting fails.
    pub fn set_locale(&mut self, locale: Locale) -> SettingsResult<()> {
        self.locale = locale;
        self.store.set(LOCALE_SETTING_KEY, locale.as_str())
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(self.locale, key)
    }
}

#[cfg(test)]
mod tests {
    use super::{catalog, translate, I18n, Locale};
    use crate::settings::{MemorySettingsStore, SettingsStore};

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(translate(Locale::En, "no.such.key"), "no.such.key");
        assert_eq!(translate(Locale::En, "password.error"), "Incorrect password");
    }

    #[test]
    fn both_tables_cover_the_same_keys() {
        let mut ru: Vec<_> = catalog::RU.keys().copied().collect();
        let mut en: Vec<_> = catalog::EN.keys().copied().collect();
        ru.sort_unstable();
        en.sort_unstable();
        assert_eq!(ru, en);
    }

    #[test]
    fn invalid_stored_locale_uses_default() {
        let mut store = MemorySettingsStore::default();
        store.set("locale", "de").unwrap();
        let i18n = I18n::load(Box::new(store));
        assert_eq!(i18n.locale(), Locale::Ru);
    }
}
