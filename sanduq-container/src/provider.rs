//! Provider trait: a module of related registrations.
//!
//! # Examples
//! ```rust,ignore
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) -> Result<()> {
//!         registry.register_class(Transport::describe())?;
//!         registry.register_class(Mailer::describe())?;
//!         registry.register_alias("mailer".into(), Identifier::of::<Mailer>())
//!     }
//! }
//!
//! let container = Container::builder().add_provider(&MailProvider).build()?;
//! ```

use crate::callable::Callable;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::injectable::ClassDescriptor;

/// A module that registers related classes and bindings.
///
/// Providers can be added to a [`ContainerBuilder`](crate::container::ContainerBuilder)
/// or to a live [`Container`](crate::container::Container).
pub trait Provider: Send + Sync {
    /// Register into `registry`.
    ///
    /// # Errors
    /// Whatever the registry rejects, typically
    /// [`SanduqError::AlreadyRegistered`](crate::error::SanduqError::AlreadyRegistered).
    fn register(&self, registry: &mut dyn ProviderRegistry) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The registration surface providers see.
///
/// Kept separate from the builder so providers can be tested against a
/// mock.
pub trait ProviderRegistry {
    /// Register a class descriptor.
    fn register_class(&mut self, class: ClassDescriptor) -> Result<()>;

    /// Bind an identifier to a factory callable.
    fn register_factory(&mut self, identifier: Identifier, factory: Callable) -> Result<()>;

    /// Bind an identifier to another identifier.
    fn register_alias(&mut self, from: Identifier, to: Identifier) -> Result<()>;
}
