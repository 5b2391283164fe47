//! # Container
//!
//! Resolves identifiers into objects, caches them as singletons and
//! auto-wires constructor parameters.
//!
//! # Architecture
//! ```text
//! resolve(id, args, force_new)
//!    │ alias table hit? ── substitute target
//!    │ cached (and not forced)? ── return it
//!    ├─ factory binding ──> bind_params ──> call
//!    ├─ alias binding ──> record alias, resolve target
//!    └─ class ──> static factory method or constructor
//!                   └─ bind_params ──> resolve(dependency) ...
//! ```
//!
//! # Examples
//! ```rust
//! use sanduq_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Transport;
//!
//! impl Injectable for Transport {
//!     fn construct(_: BoundArgs) -> Result<Self> {
//!         Ok(Transport)
//!     }
//! }
//!
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     sender: String,
//! }
//!
//! impl Injectable for Mailer {
//!     fn parameters() -> Vec<Parameter> {
//!         vec![Parameter::service::<Transport>("transport"), Parameter::value("sender")]
//!     }
//!
//!     fn construct(mut args: BoundArgs) -> Result<Self> {
//!         Ok(Mailer { transport: args.service()?, sender: args.value()? })
//!     }
//! }
//!
//! let container = Container::builder()
//!     .register::<Transport>()
//!     .register::<Mailer>()
//!     .alias("mailer", Identifier::of::<Mailer>())
//!     .build()
//!     .expect("Failed to build container");
//!
//! let mailer = container
//!     .resolve("mailer", args!["noreply@example.org".to_string()], false)
//!     .expect("Failed to resolve");
//! let mailer = mailer.downcast::<Mailer>().unwrap();
//! assert_eq!(mailer.sender, "noreply@example.org");
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use sanduq_support::rendering::suggest_similar;
use tracing::{debug, info, instrument, trace, warn};

use crate::args::{Args, Value};
use crate::binder::{DependencySource, bind_params};
use crate::callable::Callable;
use crate::error::{
    BoxError, CircularDependencyError, ClassNotExistsError, Result, SanduqError,
};
use crate::graph::{DependencyInfo, GraphValidator};
use crate::identifier::Identifier;
use crate::injectable::{ClassDescriptor, Injectable, discovered_classes};
use crate::provider::{Provider, ProviderRegistry};
use crate::registry::{Binding, Registry};
use crate::settings::Settings;

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with registered classes and bindings.
///
/// Registration errors are kept and reported by
/// [`build()`](ContainerBuilder::build), which also validates the
/// declared dependency graph.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .register::<Database>()
///     .factory("clock", Callable::from_fn("clock", || Ok(SystemClock)))
///     .alias("db", Identifier::of::<Database>())
///     .build()?;
/// ```
pub struct ContainerBuilder {
    registry: Registry,
    settings: Settings,
    discover: bool,
    error: Option<SanduqError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            settings: Settings::default(),
            discover: false,
            error: None,
        }
    }

    /// Replaces the settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Allow overriding previously registered identifiers.
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.settings.allow_override = allow;
        self
    }

    // ── Classes ──

    /// Register `T` under `Identifier::of::<T>()`.
    pub fn register<T: Injectable>(self) -> Self {
        self.register_class(T::describe())
    }

    /// Register a hand-written class descriptor.
    pub fn register_class(mut self, class: ClassDescriptor) -> Self {
        let result = self.registry.register_class(class, self.settings.allow_override);
        self.keep_error(result);
        self
    }

    /// Also register every class submitted by `#[derive(Injectable)]`.
    pub fn discover(mut self) -> Self {
        self.discover = true;
        self
    }

    // ── Bindings ──

    /// Bind an identifier to a factory callable.
    pub fn factory(mut self, identifier: impl Into<Identifier>, factory: Callable) -> Self {
        let result = self.registry.bind(
            identifier.into(),
            Binding::Factory(factory),
            self.settings.allow_override,
        );
        self.keep_error(result);
        self
    }

    /// Bind an identifier to another identifier.
    pub fn alias(mut self, identifier: impl Into<Identifier>, target: impl Into<Identifier>) -> Self {
        let result = self.registry.bind(
            identifier.into(),
            Binding::Alias(target.into()),
            self.settings.allow_override,
        );
        self.keep_error(result);
        self
    }

    // ── Provider modules ──

    /// Add a [`Provider`] module.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        let result = provider.register(&mut self);
        self.keep_error(result);
        self
    }

    // ── Build ──

    /// Build the container, validating the dependency graph.
    ///
    /// # Errors
    /// The first registration error, or whatever graph validation finds.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let container = Container {
            registry: self.registry,
            settings: RwLock::new(self.settings),
        };

        if self.discover {
            container.discover();
        }

        info!(registered = container.registry.len(), "Building container");
        container.validate()?;

        info!("Container built successfully");
        Ok(container)
    }

    // ── Internal ──

    fn keep_error(&mut self, result: Result<()>) {
        if let Err(error) = result {
            warn!(error = %error, "Registration failed");
            if self.error.is_none() {
                self.error = Some(error);
            }
        }
    }
}

// ProviderRegistry impl so providers can register into the builder
impl ProviderRegistry for ContainerBuilder {
    fn register_class(&mut self, class: ClassDescriptor) -> Result<()> {
        self.registry.register_class(class, self.settings.allow_override)
    }

    fn register_factory(&mut self, identifier: Identifier, factory: Callable) -> Result<()> {
        self.registry
            .bind(identifier, Binding::Factory(factory), self.settings.allow_override)
    }

    fn register_alias(&mut self, from: Identifier, to: Identifier) -> Result<()> {
        self.registry
            .bind(from, Binding::Alias(to), self.settings.allow_override)
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

static GLOBAL: Lazy<Container> = Lazy::new(|| {
    let container = Container::new();
    let discovered = container.discover();
    info!(discovered, "Global container created");
    container
});

/// Thread-safe dependency injection container.
///
/// Cached instances live as long as the container. Registrations may be
/// added at any time through `&self`.
pub struct Container {
    registry: Registry,
    settings: RwLock<Settings>,
}

impl Container {
    /// Create an empty container with default settings.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            settings: RwLock::new(Settings::default()),
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// The process-wide container.
    ///
    /// Created on first access; every class submitted by
    /// `#[derive(Injectable)]` is registered at that point.
    pub fn global() -> &'static Container {
        &GLOBAL
    }

    /// Current settings.
    pub fn settings(&self) -> Settings {
        *self.settings.read()
    }

    /// Replace the settings of a live container.
    pub fn configure(&self, settings: Settings) {
        debug!(?settings, "Reconfigured container");
        *self.settings.write() = settings;
    }

    // ── Registration ──

    /// Register `T` under `Identifier::of::<T>()`.
    pub fn register<T: Injectable>(&self) -> Result<()> {
        self.register_class(T::describe())
    }

    /// Register a hand-written class descriptor.
    pub fn register_class(&self, class: ClassDescriptor) -> Result<()> {
        self.registry.register_class(class, self.settings().allow_override)
    }

    /// Bind an identifier to a factory callable.
    pub fn bind_factory(&self, identifier: impl Into<Identifier>, factory: Callable) -> Result<()> {
        self.registry.bind(
            identifier.into(),
            Binding::Factory(factory),
            self.settings().allow_override,
        )
    }

    /// Bind an identifier to another identifier.
    pub fn bind_alias(
        &self,
        identifier: impl Into<Identifier>,
        target: impl Into<Identifier>,
    ) -> Result<()> {
        self.registry.bind(
            identifier.into(),
            Binding::Alias(target.into()),
            self.settings().allow_override,
        )
    }

    /// Add a [`Provider`] module.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        let mut registry = self;
        provider.register(&mut registry)
    }

    /// Register every class submitted by `#[derive(Injectable)]` that is
    /// not registered yet. Returns how many were added.
    pub fn discover(&self) -> usize {
        let mut added = 0;
        for class in discovered_classes() {
            if self.registry.has_class(class.identifier()) {
                trace!(identifier = %class.identifier(), "Already registered, skipping");
                continue;
            }
            match self.registry.register_class(class, false) {
                Ok(()) => added += 1,
                Err(error) => warn!(error = %error, "Discovered class rejected"),
            }
        }
        added
    }

    /// Check the declared dependency graph.
    ///
    /// # Errors
    /// [`SanduqError::CircularDependency`] for any cycle;
    /// [`SanduqError::NotRegistered`] for unprovided dependencies when
    /// `strict_validation` is on.
    pub fn validate(&self) -> Result<()> {
        let mut infos: HashMap<Identifier, DependencyInfo> = self
            .registry
            .classes()
            .into_iter()
            .map(|class| {
                let info = DependencyInfo {
                    identifier: class.identifier().clone(),
                    dependencies: class.entry_point().dependencies().cloned().collect(),
                };
                (info.identifier.clone(), info)
            })
            .collect();

        // bindings shadow classes, as they do in resolve
        for (identifier, binding) in self.registry.bindings() {
            let dependencies = match binding {
                Binding::Factory(factory) => factory.dependencies().cloned().collect(),
                Binding::Alias(target) => vec![target],
            };
            infos.insert(identifier.clone(), DependencyInfo { identifier, dependencies });
        }

        GraphValidator::new(infos, self.settings().strict_validation).validate()
    }

    // ── Queries ──

    /// Returns `true` if the identifier has a factory or alias binding.
    pub fn is_bound(&self, identifier: impl Into<Identifier>) -> bool {
        self.registry.has_binding(&identifier.into())
    }

    /// Returns `true` if the identifier has a class descriptor.
    pub fn has_class(&self, identifier: impl Into<Identifier>) -> bool {
        self.registry.has_class(&identifier.into())
    }

    /// Returns `true` if an object is cached under the identifier.
    pub fn has_instance(&self, identifier: impl Into<Identifier>) -> bool {
        self.registry.has_instance(&identifier.into())
    }

    /// The alias recorded for the identifier, if it was resolved through
    /// an alias binding before.
    pub fn alias_of(&self, identifier: impl Into<Identifier>) -> Option<Identifier> {
        self.registry.alias(&identifier.into())
    }

    // ── Resolution ──

    /// Resolve an identifier into an object.
    ///
    /// With `force_new` the object is always built fresh and the cache
    /// is neither read nor written for `identifier`; dependencies are
    /// still resolved through the cache.
    ///
    /// # Errors
    /// - [`SanduqError::ClassNotExists`] for unknown identifiers
    /// - [`SanduqError::ParamMissing`] when a required parameter has no value
    /// - [`SanduqError::CircularDependency`] when resolution loops
    /// - [`SanduqError::InvocationFailed`] / [`SanduqError::ConstructionFailed`]
    ///   when a bound value has the wrong type
    pub fn resolve(
        &self,
        identifier: impl Into<Identifier>,
        args: Args,
        force_new: bool,
    ) -> Result<Value> {
        let identifier = identifier.into();
        trace!(identifier = %identifier, ?args, force_new, "Resolving");

        let mut stack = ResolutionStack::default();
        self.resolve_in(&identifier, &args, force_new, &mut stack)
    }

    /// Resolve `T` with no arguments.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.make()?;
    /// ```
    pub fn make<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.make_with(Args::default())
    }

    /// Resolve `T` with arguments, through the cache.
    pub fn make_with<T: Any + Send + Sync>(&self, args: Args) -> Result<Arc<T>> {
        let identifier = Identifier::of::<T>();
        let object = self.resolve(identifier.clone(), args, false)?;
        downcast(identifier, object)
    }

    /// Build a fresh `T`, bypassing the cache.
    pub fn make_new<T: Any + Send + Sync>(&self, args: Args) -> Result<Arc<T>> {
        let identifier = Identifier::of::<T>();
        let object = self.resolve(identifier.clone(), args, true)?;
        downcast(identifier, object)
    }

    fn resolve_in(
        &self,
        identifier: &Identifier,
        args: &Args,
        force_new: bool,
        stack: &mut ResolutionStack,
    ) -> Result<Value> {
        if identifier.is_empty() {
            return Err(SanduqError::EmptyIdentifier);
        }

        let identifier = match self.registry.alias(identifier) {
            Some(target) => {
                trace!(from = %identifier, to = %target, "Alias hit");
                target
            }
            None => identifier.clone(),
        };

        if !force_new {
            if let Some(object) = self.registry.instance(&identifier) {
                trace!(identifier = %identifier, "Cache hit");
                return Ok(object);
            }
        }

        stack.enter(&identifier)?;
        let outcome = self.dispatch(&identifier, args, force_new, stack);
        stack.leave();

        match outcome? {
            Dispatched::Delegated(object) => Ok(object),
            Dispatched::Built(object) if force_new => Ok(object),
            Dispatched::Built(object) => {
                debug!(identifier = %identifier, "Caching instance");
                Ok(self.registry.store_instance(identifier, object))
            }
        }
    }

    fn dispatch(
        &self,
        identifier: &Identifier,
        args: &Args,
        force_new: bool,
        stack: &mut ResolutionStack,
    ) -> Result<Dispatched> {
        match self.registry.binding(identifier) {
            Some(Binding::Factory(factory)) => self
                .invoke_function(&factory, args, stack)
                .map(Dispatched::Built),
            Some(Binding::Alias(_)) => {
                let target = self.registry.canonical(identifier)?;
                self.registry.record_alias(identifier.clone(), target.clone());
                self.resolve_in(&target, args, force_new, stack)
                    .map(Dispatched::Delegated)
            }
            None => self
                .invoke_class(identifier, args, stack)
                .map(Dispatched::Built),
        }
    }

    /// Build a class from its descriptor.
    fn invoke_class(
        &self,
        identifier: &Identifier,
        args: &Args,
        stack: &mut ResolutionStack,
    ) -> Result<Value> {
        let class = self
            .registry
            .class(identifier)
            .ok_or_else(|| self.class_not_exists(identifier))?;

        if let Some(method) = class.factory_method() {
            trace!(identifier = %identifier, method = method.name(), "Using static factory method");
        }
        let entry = class.entry_point();

        let bound = bind_params(entry, args, &mut Wiring { container: self, stack })?;
        entry.call(bound).map_err(|error| {
            if error.is_argument_mismatch() {
                SanduqError::ConstructionFailed {
                    identifier: identifier.clone(),
                    source: Box::new(error) as BoxError,
                }
            } else {
                error
            }
        })
    }

    /// Invoke a factory callable.
    fn invoke_function(
        &self,
        factory: &Callable,
        args: &Args,
        stack: &mut ResolutionStack,
    ) -> Result<Value> {
        trace!(callable = factory.name(), "Invoking factory");

        let bound = bind_params(factory, args, &mut Wiring { container: self, stack })?;
        factory.call(bound).map_err(|error| {
            if error.is_argument_mismatch() {
                SanduqError::InvocationFailed {
                    callable: factory.name().to_string(),
                    source: Box::new(error),
                }
            } else {
                error
            }
        })
    }

    fn class_not_exists(&self, identifier: &Identifier) -> SanduqError {
        let known = self.registry.known_identifiers();
        let available: Vec<&str> = known.iter().map(Identifier::as_str).collect();

        SanduqError::ClassNotExists(ClassNotExistsError {
            identifier: identifier.clone(),
            suggestions: suggest_similar(identifier.as_str(), &available, MAX_SUGGESTIONS),
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .field("cached", &self.registry.cached_len())
            .finish()
    }
}

// live containers accept providers too
impl ProviderRegistry for &Container {
    fn register_class(&mut self, class: ClassDescriptor) -> Result<()> {
        Container::register_class(self, class)
    }

    fn register_factory(&mut self, identifier: Identifier, factory: Callable) -> Result<()> {
        self.bind_factory(identifier, factory)
    }

    fn register_alias(&mut self, from: Identifier, to: Identifier) -> Result<()> {
        self.bind_alias(from, to)
    }
}

fn downcast<T: Any + Send + Sync>(identifier: Identifier, object: Value) -> Result<Arc<T>> {
    object.downcast::<T>().map_err(|_| SanduqError::TypeMismatch {
        identifier,
        expected: type_name::<T>(),
    })
}

// ═══════════════════════════════════════════
// Resolution internals
// ═══════════════════════════════════════════

enum Dispatched {
    /// Built at this level; cacheable.
    Built(Value),
    /// Returned by the resolution of an alias target.
    Delegated(Value),
}

/// Identifiers currently being resolved by one top-level call.
#[derive(Default)]
struct ResolutionStack {
    path: Vec<Identifier>,
}

impl ResolutionStack {
    fn enter(&mut self, identifier: &Identifier) -> Result<()> {
        if let Some(start) = self.path.iter().position(|id| id == identifier) {
            let mut chain = self.path[start..].to_vec();
            chain.push(identifier.clone());

            warn!(cycle = ?chain, "Circular dependency detected");
            return Err(SanduqError::CircularDependency(CircularDependencyError { chain }));
        }

        self.path.push(identifier.clone());
        Ok(())
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

/// Feeds the binder with dependencies resolved through the default,
/// cached path of the same top-level call.
struct Wiring<'c, 's> {
    container: &'c Container,
    stack: &'s mut ResolutionStack,
}

impl DependencySource for Wiring<'_, '_> {
    fn resolve_dependency(&mut self, identifier: &Identifier) -> Result<Value> {
        trace!(dependency = %identifier, "Auto-wiring");
        self.container
            .resolve_in(identifier, &Args::default(), false, self.stack)
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::args;
    pub use crate::args::{ArgKey, Args, Value};
    pub use crate::callable::{BoundArgs, Callable, Parameter};
    pub use crate::error::{Result, SanduqError};
    pub use crate::identifier::Identifier;
    pub use crate::injectable::{ClassDescriptor, Injectable};
    pub use crate::provider::{Provider, ProviderRegistry};
    pub use crate::settings::Settings;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
