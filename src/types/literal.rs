//! Literal values of occurrences and variants.
//!
//! A [`Literal`] is a lexical value paired with a datatype IRI. Native Rust
//! values convert into literals with an inferred XML Schema datatype:
//!
//! | Rust value | Datatype |
//! |---|---|
//! | `&str`, `String` | `xsd:string` |
//! | [`Locator`] | `xsd:anyURI` |
//! | `f32` | `xsd:float` |
//! | `i32` | `xsd:int` |
//! | `i64` | `xsd:long` |

use serde::{Deserialize, Serialize};

use super::locator::{Locator, LocatorError};

/// XML Schema datatype IRIs.
pub mod xsd {
    use super::Locator;

    /// XML Schema namespace.
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    /// `xsd:anyURI`.
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
    /// `xsd:float`.
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    /// `xsd:int`.
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    /// `xsd:long`.
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    /// `xsd:string`.
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// Locator of `xsd:string`.
    pub fn string() -> Locator {
        Locator::from_normalized(STRING)
    }

    /// Locator of `xsd:anyURI`.
    pub fn any_uri() -> Locator {
        Locator::from_normalized(ANY_URI)
    }

    /// Locator of `xsd:float`.
    pub fn float() -> Locator {
        Locator::from_normalized(FLOAT)
    }

    /// Locator of `xsd:int`.
    pub fn int() -> Locator {
        Locator::from_normalized(INT)
    }

    /// Locator of `xsd:long`.
    pub fn long() -> Locator {
        Locator::from_normalized(LONG)
    }
}

/// Error converting a literal to a native value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LiteralError {
    /// The literal has a different datatype.
    #[error("Literal has datatype {actual}, expected {expected}")]
    DatatypeMismatch {
        /// Datatype the caller asked for.
        expected: &'static str,
        /// Datatype the literal carries.
        actual: String,
    },
    /// The lexical value does not parse as the datatype.
    #[error("Invalid lexical value '{value}' for {datatype}")]
    InvalidLexical {
        /// The lexical value.
        value: String,
        /// Its datatype.
        datatype: &'static str,
    },
    /// An `xsd:anyURI` value is not an absolute IRI.
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

/// A (value, datatype) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    datatype: Locator,
}

impl Literal {
    /// Create a literal with an explicit datatype.
    pub fn new(value: impl Into<String>, datatype: Locator) -> Self {
        Self {
            value: value.into(),
            datatype,
        }
    }

    /// Create an `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(value, xsd::string())
    }

    /// Lexical value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Datatype IRI.
    pub fn datatype(&self) -> &Locator {
        &self.datatype
    }

    /// Interpret an `xsd:anyURI` value as a locator.
    pub fn locator_value(&self) -> Result<Locator, LiteralError> {
        self.expect_datatype(xsd::ANY_URI)?;
        Ok(Locator::parse(&self.value)?)
    }

    /// Interpret an `xsd:int` value.
    pub fn int_value(&self) -> Result<i32, LiteralError> {
        self.parse_as(xsd::INT)
    }

    /// Interpret an `xsd:long` (or `xsd:int`) value.
    pub fn long_value(&self) -> Result<i64, LiteralError> {
        if self.datatype.to_external_form() == xsd::INT {
            return self.parse_as(xsd::INT);
        }
        self.parse_as(xsd::LONG)
    }

    /// Interpret an `xsd:float` value.
    pub fn float_value(&self) -> Result<f32, LiteralError> {
        self.parse_as(xsd::FLOAT)
    }

    fn expect_datatype(&self, expected: &'static str) -> Result<(), LiteralError> {
        if self.datatype.to_external_form() == expected {
            Ok(())
        } else {
            Err(LiteralError::DatatypeMismatch {
                expected,
                actual: self.datatype.to_external_form().to_string(),
            })
        }
    }

    fn parse_as<T: std::str::FromStr>(&self, datatype: &'static str) -> Result<T, LiteralError> {
        self.expect_datatype(datatype)?;
        self.value.trim().parse().map_err(|_| LiteralError::InvalidLexical {
            value: self.value.clone(),
            datatype,
        })
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::string(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::string(value)
    }
}

impl From<&Locator> for Literal {
    fn from(value: &Locator) -> Self {
        Literal::new(value.to_external_form(), xsd::any_uri())
    }
}

impl From<Locator> for Literal {
    fn from(value: Locator) -> Self {
        Literal::from(&value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::new(value.to_string(), xsd::int())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::new(value.to_string(), xsd::long())
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Literal::new(value.to_string(), xsd::float())
    }
}
