//! Immutable IRI values.
//!
//! A [`Locator`] carries two forms of the same IRI:
//!
//! - the **reference**: percent-decoded, Unicode NFC normalized, meant for display
//! - the **external form**: the absolute, percent-encoded IRI used for comparison
//!
//! Equality, ordering and hashing only look at the external form, so
//! `http://example.org/test me/` and `http://example.org/test%20me/` are the
//! same locator.
//!
//! ## Resolution
//!
//! Relative references are resolved against a locator following RFC 3986
//! section 5.2. A reference without a scheme (or an empty string) can never
//! form a locator on its own.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Error raised for strings that are not absolute IRIs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// The IRI has no scheme or is otherwise not conformant.
    #[error("Malformed IRI '{reference}': {reason}")]
    Malformed {
        /// The offending input.
        reference: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// An immutable, normalized IRI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    reference: String,
    external: String,
}

impl Locator {
    /// Parse an absolute IRI.
    ///
    /// Fails with [`LocatorError::Malformed`] for empty strings, fragment-only
    /// references and anything else lacking a scheme.
    pub fn parse(reference: &str) -> Result<Self, LocatorError> {
        let composed: String = reference.nfc().collect();
        let url = Url::parse(&composed).map_err(|e| LocatorError::Malformed {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_url(&url))
    }

    /// Build a locator from an already serialized absolute URL.
    fn from_url(url: &Url) -> Self {
        let external = url.as_str().to_string();
        let reference = percent_decode_str(&external)
            .decode_utf8_lossy()
            .nfc()
            .collect();
        Self { reference, external }
    }

    /// Resolve `reference` against this locator (RFC 3986, 5.2).
    pub fn resolve(&self, reference: &str) -> Result<Self, LocatorError> {
        let malformed = |reason: String| LocatorError::Malformed {
            reference: reference.to_string(),
            reason,
        };
        let base = Url::parse(&self.external).map_err(|e| malformed(e.to_string()))?;
        let composed: String = reference.nfc().collect();
        let joined = base.join(&composed).map_err(|e| malformed(e.to_string()))?;
        Ok(Self::from_url(&joined))
    }

    /// Lexical, unescaped form of the IRI.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Percent-encoded absolute form of the IRI.
    pub fn to_external_form(&self) -> &str {
        &self.external
    }

    /// Locator for a well-known vocabulary IRI that is already in external form.
    pub(crate) fn from_normalized(iri: &'static str) -> Self {
        Self {
            reference: iri.to_string(),
            external: iri.to_string(),
        }
    }
}

impl PartialEq for Locator {
    fn eq(&self, other: &Self) -> bool {
        self.external == other.external
    }
}

impl Eq for Locator {}

impl Hash for Locator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.external.hash(state);
    }
}

impl PartialOrd for Locator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Locator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.external.cmp(&other.external)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

impl std::str::FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locator {
    type Error = LocatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.external
    }
}
