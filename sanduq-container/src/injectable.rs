//! Constructible types.
//!
//! A type the container can build on its own implements [`Injectable`]:
//! it declares its constructor parameters and knows how to assemble
//! itself from the bound values. Usually the impl is generated with
//! `#[derive(Injectable)]` from the `sanduq` crate.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use sanduq_container::prelude::*;
//!
//! struct Database;
//!
//! impl Injectable for Database {
//!     fn construct(_: BoundArgs) -> Result<Self> {
//!         Ok(Database)
//!     }
//! }
//!
//! struct Repository {
//!     db: Arc<Database>,
//!     table: String,
//! }
//!
//! impl Injectable for Repository {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![
//!             Parameter::service::<Database>("db"),
//!             Parameter::value("table").with_default(String::from("users")),
//!         ]
//!     }
//!
//!     fn construct(mut args: BoundArgs) -> Result<Self> {
//!         Ok(Repository { db: args.service()?, table: args.value()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.register::<Database>().unwrap();
//! container.register::<Repository>().unwrap();
//!
//! let repo: Arc<Repository> = container.make().unwrap();
//! assert_eq!(repo.table, "users");
//! ```

use std::any::type_name;

use crate::callable::{BoundArgs, Callable, Parameter};
use crate::error::Result;
use crate::identifier::Identifier;

/// A type the container can construct.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Declared constructor parameters, in order.
    ///
    /// Types without dependencies keep the default empty list and are
    /// constructed with no arguments.
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    /// Builds the value from the bound arguments, one per parameter.
    fn construct(args: BoundArgs) -> Result<Self>;

    /// A static factory method that replaces the constructor.
    ///
    /// When present the container binds and invokes it instead of
    /// [`construct`](Injectable::construct); its own parameter list
    /// applies.
    fn factory_method() -> Option<Callable> {
        None
    }

    /// Describes this type for registration.
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<Self>()
    }
}

/// How the container builds one class.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    identifier: Identifier,
    constructor: Callable,
    factory_method: Option<Callable>,
}

impl ClassDescriptor {
    /// Describes `T` through its [`Injectable`] impl.
    pub fn of<T: Injectable>() -> Self {
        Self {
            identifier: Identifier::of::<T>(),
            constructor: Callable::new(type_name::<T>(), T::parameters(), T::construct),
            factory_method: T::factory_method(),
        }
    }

    /// Describes a class by hand.
    pub fn new(identifier: impl Into<Identifier>, constructor: Callable) -> Self {
        Self {
            identifier: identifier.into(),
            constructor,
            factory_method: None,
        }
    }

    /// Sets a static factory method taking precedence over the constructor.
    pub fn with_factory_method(mut self, method: Callable) -> Self {
        self.factory_method = Some(method);
        self
    }

    /// Registers the same construction under another identifier.
    pub fn with_identifier(mut self, identifier: impl Into<Identifier>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn constructor(&self) -> &Callable {
        &self.constructor
    }

    pub fn factory_method(&self) -> Option<&Callable> {
        self.factory_method.as_ref()
    }

    /// The callable the container will actually invoke.
    pub fn entry_point(&self) -> &Callable {
        self.factory_method.as_ref().unwrap_or(&self.constructor)
    }
}

/// A class submitted for automatic discovery.
///
/// `#[derive(Injectable)]` submits one of these per type; the global
/// container and [`ContainerBuilder::discover`](crate::container::ContainerBuilder::discover)
/// register every submitted class.
pub struct ClassRegistration {
    describe: fn() -> ClassDescriptor,
}

impl ClassRegistration {
    pub const fn new(describe: fn() -> ClassDescriptor) -> Self {
        Self { describe }
    }

    pub fn descriptor(&self) -> ClassDescriptor {
        (self.describe)()
    }
}

inventory::collect!(ClassRegistration);

/// Every class submitted through [`ClassRegistration`].
pub fn discovered_classes() -> impl Iterator<Item = ClassDescriptor> {
    inventory::iter::<ClassRegistration>
        .into_iter()
        .map(ClassRegistration::descriptor)
}
