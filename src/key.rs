//! Specification keys and the vertex ids derived from them.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a specification.
///
/// A specification is the type a service is resolved by: usually a trait
/// object such as `dyn Logger`, but any `'static` type works. Equality and
/// hashing only look at the `TypeId`; the name is kept for diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::Key;
///
/// trait Logger: Send + Sync {}
///
/// let a = Key::of::<dyn Logger>();
/// let b = Key::of::<dyn Logger>();
/// assert_eq!(a, b);
/// assert!(a.display_name().contains("Logger"));
/// assert_ne!(a, Key::of::<String>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the specification `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Key {
        Key {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the specification.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Human readable type name, the `std::any::type_name` result.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Vertex id of this specification in the service graph.
    pub fn service_id(&self) -> ServiceId {
        ServiceId::of(self)
    }
}

// TypeId-only comparison, the name is diagnostic
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Graph vertex id of a specification.
///
/// Derived deterministically from the key with a fixed-key hasher, so the
/// registry can jump straight to a vertex without walking the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(u64);

impl ServiceId {
    /// Derives the id for `key`.
    pub fn of(key: &Key) -> ServiceId {
        // DefaultHasher::new() is unkeyed, unlike RandomState
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.id.hash(&mut hasher);
        ServiceId(hasher.finish())
    }

    /// Raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Spec {}

    #[test]
    fn service_id_is_stable_per_key() {
        let first = ServiceId::of(&Key::of::<dyn Spec>());
        let second = Key::of::<dyn Spec>().service_id();
        assert_eq!(first, second);
        assert_ne!(first, Key::of::<u32>().service_id());
    }

    #[test]
    fn service_id_displays_as_fixed_width_hex() {
        let id = Key::of::<u8>().service_id();
        let shown = id.to_string();
        assert_eq!(shown.len(), 16);
        assert_eq!(u64::from_str_radix(&shown, 16).unwrap(), id.as_u64());
    }
}
