//! Service lifetime definitions.

use std::fmt;
use std::str::FromStr;

/// Service lifetimes controlling instance caching behavior
///
/// - **Static**: built once during [`Container::build`](crate::Container::build)
///   in dependency order, then shared for the lifetime of the container.
/// - **Transient**: rebuilt on every resolution. Within a single resolution a
///   transient shared by several consumers is built once.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::Lifetime;
///
/// assert_eq!("Static".parse::<Lifetime>().unwrap(), Lifetime::Static);
/// assert_eq!("transient".parse::<Lifetime>().unwrap(), Lifetime::Transient);
/// assert!("Scoped".parse::<Lifetime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "graph-export", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifetime {
    /// Single instance per container, created during build
    Static,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    /// Canonical tag for this lifetime.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Static => "Static",
            Lifetime::Transient => "Transient",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a lifetime tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized lifetime tag '{0}'")]
pub struct ParseLifetimeError(pub String);

impl FromStr for Lifetime {
    type Err = ParseLifetimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("static") => Ok(Lifetime::Static),
            t if t.eq_ignore_ascii_case("transient") => Ok(Lifetime::Transient),
            other => Err(ParseLifetimeError(other.to_string())),
        }
    }
}
