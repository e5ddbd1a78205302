//! SourceTag - Cheap-to-clone instrument label
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::SignalSource;

/// Label naming the instrument a signal was recorded with.
///
/// The label is kept verbatim as it arrives from ingestion so that an
/// unrecognised instrument can still be carried around and reported. Use
/// [`SourceTag::role`] to resolve it into the closed [`SignalSource`] set.
///
/// # Examples
/// ```
/// use contracts::{SignalSource, SourceTag};
///
/// let tag: SourceTag = "NI".into();
/// assert_eq!(tag.role(), Some(SignalSource::Reference));
/// assert_eq!(SourceTag::from("GPS").role(), None);
/// ```
#[derive(Clone, Default)]
pub struct SourceTag(Arc<str>);

impl SourceTag {
    /// Tag for the general-purpose data-acquisition unit (stream A)
    pub const NI: &'static str = "NI";
    /// Tag for the inertial navigation unit (stream B)
    pub const VN: &'static str = "VN";

    /// Create a new SourceTag from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the tag into a recognised role (case-insensitive).
    pub fn role(&self) -> Option<SignalSource> {
        if self.0.eq_ignore_ascii_case(Self::NI) {
            Some(SignalSource::Reference)
        } else if self.0.eq_ignore_ascii_case(Self::VN) {
            Some(SignalSource::Aligned)
        } else {
            None
        }
    }
}

impl Deref for SourceTag {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SourceTag {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceTag {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SourceTag {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<SignalSource> for SourceTag {
    fn from(source: SignalSource) -> Self {
        match source {
            SignalSource::Reference => Self::new(Self::NI),
            SignalSource::Aligned => Self::new(Self::VN),
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceTag({:?})", self.0)
    }
}

impl PartialEq for SourceTag {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SourceTag {}

impl PartialEq<str> for SourceTag {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SourceTag {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for SourceTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SourceTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
