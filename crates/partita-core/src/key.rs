#![forbid(unsafe_code)]

//! Grouping keys produced by level accessors.
//!
//! A [`Key`] is the primitive value a key accessor extracts from a fact:
//! a string, a number, or [`Key::Null`]. `Null` is reserved for the
//! synthetic root level that [`build_hierarchy`](crate::build_hierarchy)
//! prepends to every hierarchy.
//!
//! Equality and hashing follow SameValueZero: `NaN` equals `NaN`, and
//! `0.0` equals `-0.0`. Two facts whose accessors yield equal keys land in
//! the same node.
//!
//! With the `serde` feature, keys serialize as plain JSON primitives.
//! Non-finite numbers have no JSON number form and are written as
//! `{"num": "NaN"}`, `{"num": "Infinity"}` or `{"num": "-Infinity"}` so
//! they never read back as [`Key::Null`].

use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A grouping key.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "KeyRepr", into = "KeyRepr"))]
pub enum Key {
    /// Sentinel key of the synthetic root level.
    #[default]
    Null,
    /// Numeric key.
    Num(f64),
    /// String key.
    Str(String),
}

impl Key {
    /// Whether this is the root sentinel.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }
}

/// Canonical bit pattern for SameValueZero comparison.
#[inline]
fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Num(a), Self::Num(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Num(n) => canonical_bits(*n).hash(state),
            Self::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Num(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // -0 prints as 0
            Self::Num(n) if *n == 0.0 => f.write_str("0"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Wire form of [`Key`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KeyRepr {
    Null,
    Num(f64),
    Str(String),
    NonFinite { num: NonFinite },
}

#[cfg(feature = "serde")]
#[derive(Clone, Copy, Serialize, Deserialize)]
enum NonFinite {
    #[serde(rename = "NaN")]
    Nan,
    Infinity,
    #[serde(rename = "-Infinity")]
    NegInfinity,
}

#[cfg(feature = "serde")]
impl From<Key> for KeyRepr {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => Self::Null,
            Key::Num(n) if n.is_nan() => Self::NonFinite { num: NonFinite::Nan },
            Key::Num(n) if n == f64::INFINITY => Self::NonFinite { num: NonFinite::Infinity },
            Key::Num(n) if n == f64::NEG_INFINITY => Self::NonFinite {
                num: NonFinite::NegInfinity,
            },
            Key::Num(n) => Self::Num(n),
            Key::Str(s) => Self::Str(s),
        }
    }
}

#[cfg(feature = "serde")]
impl From<KeyRepr> for Key {
    fn from(repr: KeyRepr) -> Self {
        match repr {
            KeyRepr::Null => Self::Null,
            KeyRepr::Num(n) => Self::Num(n),
            KeyRepr::Str(s) => Self::Str(s),
            KeyRepr::NonFinite { num } => Self::Num(match num {
                NonFinite::Nan => f64::NAN,
                NonFinite::Infinity => f64::INFINITY,
                NonFinite::NegInfinity => f64::NEG_INFINITY,
            }),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Num(value as f64)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Num(f64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Num(f64::from(value))
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
