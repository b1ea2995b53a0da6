//! Locale configuration for bucket labels and category names.
//!
//! Month buckets are labelled with a short month name, so putting them back
//! in calendar order needs the same name table that produced them. The table
//! lives here rather than in the bucketing code so that a deployment can swap
//! the Indonesian names for another language.

use time::Month;

use crate::Error;

/// The identifier of the built-in Indonesian locale.
pub const INDONESIAN: &str = "id-ID";
/// The identifier of the built-in English locale.
pub const ENGLISH: &str = "en-US";

const INDONESIAN_SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

const ENGLISH_SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Names used when formatting bucket labels and categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    identifier: String,
    short_months: [String; 12],
    other_label: String,
    empty_placeholder: String,
}

impl Locale {
    /// Create a locale from a custom month-name table.
    ///
    /// `short_months` must be in calendar order, January first.
    /// `other_label` names sales whose application is unknown and
    /// `empty_placeholder` is shown when there is nothing to rank.
    pub fn new(
        identifier: &str,
        short_months: [&str; 12],
        other_label: &str,
        empty_placeholder: &str,
    ) -> Self {
        Self {
            identifier: identifier.to_owned(),
            short_months: short_months.map(str::to_owned),
            other_label: other_label.to_owned(),
            empty_placeholder: empty_placeholder.to_owned(),
        }
    }

    /// Indonesian month abbreviations, e.g. "Mei", "Agu", "Des".
    pub fn indonesian() -> Self {
        Self::new(INDONESIAN, INDONESIAN_SHORT_MONTHS, "Lainnya", "-")
    }

    /// English month abbreviations.
    pub fn english() -> Self {
        Self::new(ENGLISH, ENGLISH_SHORT_MONTHS, "Other", "-")
    }

    /// Look up a built-in locale by its identifier.
    ///
    /// Matching ignores case and accepts the bare language code, so "id",
    /// "id-ID" and "id_id" all select the Indonesian table.
    ///
    /// # Errors
    /// Returns [Error::UnknownLocale] if no built-in locale matches.
    pub fn from_identifier(identifier: &str) -> Result<Self, Error> {
        let normalized = identifier.trim().to_lowercase().replace('_', "-");
        let language = normalized.split('-').next().unwrap_or_default();

        match language {
            "id" => Ok(Self::indonesian()),
            "en" => Ok(Self::english()),
            _ => Err(Error::UnknownLocale(identifier.to_owned())),
        }
    }

    /// The locale identifier, e.g. "id-ID".
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The abbreviated name of `month`.
    pub fn short_month(&self, month: Month) -> &str {
        &self.short_months[month as usize - 1]
    }

    /// The zero-based ordinal (January is 0) of an abbreviated month name.
    pub fn month_ordinal(&self, name: &str) -> Option<u8> {
        self.short_months
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(|index| index as u8)
    }

    /// The category name for sales without a known application.
    pub fn other_label(&self) -> &str {
        &self.other_label
    }

    /// The text shown in place of a missing value.
    pub fn empty_placeholder(&self) -> &str {
        &self.empty_placeholder
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::indonesian()
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::Locale;
    use crate::Error;

    #[test]
    fn indonesian_names_round_trip_through_ordinals() {
        let locale = Locale::indonesian();

        assert_eq!(locale.short_month(Month::May), "Mei");
        assert_eq!(locale.short_month(Month::December), "Des");
        assert_eq!(locale.month_ordinal("Mei"), Some(4));
        assert_eq!(locale.month_ordinal("agu"), Some(7));
        assert_eq!(locale.month_ordinal("May"), None);
    }

    #[test]
    fn from_identifier_accepts_language_variants() {
        assert_eq!(Locale::from_identifier("id").unwrap(), Locale::indonesian());
        assert_eq!(Locale::from_identifier("ID_id").unwrap(), Locale::indonesian());
        assert_eq!(Locale::from_identifier("en-GB").unwrap(), Locale::english());
    }

    #[test]
    fn from_identifier_rejects_unknown_language() {
        let result = Locale::from_identifier("fr-FR");

        assert!(matches!(result, Err(Error::UnknownLocale(id)) if id == "fr-FR"));
    }

    #[test]
    fn custom_table_is_used_for_lookups() {
        let locale = Locale::new(
            "nl-NL",
            [
                "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
            ],
            "Overig",
            "-",
        );

        assert_eq!(locale.short_month(Month::March), "mrt");
        assert_eq!(locale.month_ordinal("mrt"), Some(2));
        assert_eq!(locale.other_label(), "Overig");
    }
}
