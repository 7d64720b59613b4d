//! Canonical base-URI form.

use url::Url;

use crate::error::CleanError;

/// Maps IRIs that spell the canonical base differently onto the base itself.
///
/// Recognized variants: `http`/`https` swapped, different letter case in the
/// base part, and the base without its trailing `/` or `#`. Whatever follows
/// the base is kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriCanonicalizer {
    base: String,
    /// Base without its scheme, e.g. `w3id.org/vocab/`
    rest: String,
}

impl UriCanonicalizer {
    pub fn new(base: &str) -> Result<Self, CleanError> {
        let invalid = || CleanError::InvalidBase(base.to_string());
        let url = Url::parse(base).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        let (_, rest) = base.split_once("://").ok_or_else(invalid)?;
        Ok(Self {
            base: base.to_string(),
            rest: rest.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Canonical form of `iri`, or `None` when it is already canonical or
    /// not under the base at all.
    pub fn canonicalize(&self, iri: &str) -> Option<String> {
        let (scheme, rest) = iri.split_once("://")?;
        if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) {
            return None;
        }

        let canonical = match rest.get(..self.rest.len()) {
            Some(head) if head.eq_ignore_ascii_case(&self.rest) => {
                format!("{}{}", self.base, &rest[self.rest.len()..])
            }
            _ if self.rest.ends_with(['/', '#'])
                && rest.eq_ignore_ascii_case(&self.rest[..self.rest.len() - 1]) =>
            {
                self.base.clone()
            }
            _ => return None,
        };
        (canonical != iri).then_some(canonical)
    }

    /// Canonical form of `iri`, or `iri` unchanged.
    pub fn apply(&self, iri: &str) -> String {
        self.canonicalize(iri).unwrap_or_else(|| iri.to_string())
    }
}
