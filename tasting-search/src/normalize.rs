//! Field Normalizer
//!
//! Some list-valued columns hold either a plain scalar ("Merlot") or a
//! bracket-encoded JSON array (`["Merlot","Cabernet"]`), depending on how
//! old the row is. The adapter reads them as [`RawListField`] and
//! normalizes immediately, so the rest of the crate only ever sees
//! `Option<Vec<String>>`.

use tracing::debug;

/// A list-valued column as read from the store, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawListField {
    /// NULL or empty column
    Absent,
    /// Scalar text or bracket-encoded list text
    Text(String),
}

impl From<Option<String>> for RawListField {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => RawListField::Text(text),
            _ => RawListField::Absent,
        }
    }
}

impl RawListField {
    pub fn is_absent(&self) -> bool {
        matches!(self, RawListField::Absent)
    }

    /// Prefer `self`, fall back to `legacy` when `self` is absent
    pub fn or_legacy(self, legacy: RawListField) -> RawListField {
        if self.is_absent() {
            legacy
        } else {
            self
        }
    }

    /// Normalize into a list, or `None` when absent
    pub fn normalize(&self) -> Option<Vec<String>> {
        match self {
            RawListField::Absent => None,
            RawListField::Text(text) => normalize_list_field(Some(text)),
        }
    }
}

/// Case folding used for both search matching and dedup identity
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Parse a scalar-or-encoded-list text field into a list.
///
/// - `None`, empty or whitespace-only input gives `None`.
/// - Text wrapped in `[` ... `]` is decoded as a JSON array of strings. If
///   decoding fails the whole original text becomes a single-element list.
///   A decoded empty array gives `None`.
/// - Any other text becomes a single-element list.
///
/// Never fails.
pub fn normalize_list_field(raw: Option<&str>) -> Option<Vec<String>> {
    let text = raw?;
    if text.trim().is_empty() {
        return None;
    }

    if text.starts_with('[') && text.ends_with(']') {
        return match serde_json::from_str::<Vec<String>>(text) {
            Ok(items) if items.is_empty() => None,
            Ok(items) => Some(items),
            Err(e) => {
                debug!(error = %e, "Malformed encoded list field, keeping raw text");
                Some(vec![text.to_string()])
            }
        };
    }

    Some(vec![text.to_string()])
}

/// Resolve the wine style list.
///
/// The native `wine_style` column wins. When it is absent, a non-empty
/// legacy "body style" scalar becomes a single-element list.
pub fn normalize_wine_style(native: RawListField, legacy_body: Option<&str>) -> Option<Vec<String>> {
    if let Some(styles) = native.normalize() {
        return Some(styles);
    }

    legacy_body
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .map(|body| vec![body.to_string()])
}
