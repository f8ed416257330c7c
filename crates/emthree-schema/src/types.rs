//! Identifier newtypes for registry projects and versions.

use serde::{Deserialize, Serialize};

/// An opaque, stable registry project identifier (e.g. `P7dR8mSH`).
///
/// Project ids are the identity key of the dependency closure: two packages are
/// the same package iff their ids are equal, whatever slug was used to find them.
///
/// # Example
///
/// ```
/// use emthree_schema::ProjectId;
///
/// let id = ProjectId::new("P7dR8mSH");
/// assert_eq!(id.as_str(), "P7dR8mSH");
/// assert_eq!(id, "P7dR8mSH");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProjectId(String);

/// An opaque registry version identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct VersionId(String);

macro_rules! impl_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $ty {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

impl_id!(ProjectId);
impl_id!(VersionId);
