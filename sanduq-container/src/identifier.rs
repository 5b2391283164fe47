//! Service identifiers.
//!
//! An [`Identifier`] is the string key the container resolves. It
//! either names a concrete Rust type (derived from
//! [`std::any::type_name`]) or an abstract service name chosen by the
//! application, such as `"mailer"`.

use std::any::type_name;
use std::borrow::{Borrow, Cow};
use std::fmt;

use sanduq_support::rendering::shorten_type_name;

/// Uniquely identifies a service in the container.
///
/// # Examples
/// ```
/// use sanduq_container::identifier::Identifier;
///
/// // Derived from a type
/// let id = Identifier::of::<String>();
/// assert_eq!(id.as_str(), "alloc::string::String");
/// assert_eq!(id.short_name(), "String");
///
/// // Abstract service name
/// let id = Identifier::new("mailer");
/// assert_eq!(id.as_str(), "mailer");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    /// Creates an identifier naming type `T`.
    ///
    /// The name comes from [`std::any::type_name`], which is a best-effort
    /// description: it is not guaranteed to be unique and may change
    /// between compiler versions. Two distinct types can therefore end up
    /// under the same registry key, which surfaces later as a
    /// [`TypeMismatch`](crate::SanduqError::TypeMismatch) or argument
    /// mismatch. Use [`Identifier::new`] with an explicit name where that
    /// matters, and never persist these identifiers.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    /// Creates an identifier from an arbitrary service name.
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the raw identifier string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier, which never resolves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the identifier with module paths stripped.
    ///
    /// Used in log lines and error messages.
    pub fn short_name(&self) -> String {
        shorten_type_name(&self.0)
    }
}

impl From<&'static str> for Identifier {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
