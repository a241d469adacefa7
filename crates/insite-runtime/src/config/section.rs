//! Three-way optional configuration sections.

use serde::{Deserialize, Deserializer};

/// A nested option that distinguishes "not mentioned" from "explicitly off".
///
/// | JSON | Value |
/// |------|-------|
/// | key absent | `Absent` |
/// | `null` | `Disabled` |
/// | any value | `Enabled(value)` |
///
/// Fields of this type must carry `#[serde(default)]` so that a missing key
/// becomes `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Section<T> {
    #[default]
    Absent,
    Disabled,
    Enabled(T),
}

impl<T> Section<T> {
    /// Explicit `null`: a strong negative override.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The supplied value, if any.
    #[must_use]
    pub fn enabled(&self) -> Option<&T> {
        match self {
            Self::Enabled(value) => Some(value),
            Self::Absent | Self::Disabled => None,
        }
    }
}

impl<T: Default + Clone> Section<T> {
    /// The supplied value, or the default when the key was absent.
    ///
    /// `None` only for `Disabled`.
    #[must_use]
    pub fn or_default_unless_disabled(&self) -> Option<T> {
        match self {
            Self::Enabled(value) => Some(value.clone()),
            Self::Absent => Some(T::default()),
            Self::Disabled => None,
        }
    }
}

impl<T> From<Option<T>> for Section<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Disabled, Self::Enabled)
    }
}

impl<'de, T> Deserialize<'de> for Section<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; absence is `#[serde(default)]`
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
