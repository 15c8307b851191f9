//! Order metadata keys.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata key holding the pickup location chosen at checkout.
///
/// Also used as the checkout form field name.
pub const BILLING_PICKUP_LOCATION: MetaKey = MetaKey::from_static("billing_pickup_location");

/// Key of an order metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaKey(Cow<'static, str>);

impl MetaKey {
    /// Create a key from a static string.
    #[must_use]
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MetaKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MetaKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
