//! Storage behind a container.
//!
//! The registry maps [`Identifier`]s to bindings, class descriptors,
//! recorded aliases and cached instances. Every map is a [`DashMap`],
//! so the container can be shared across threads. Lookups clone the
//! entry out; no guard outlives a single call.

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::args::Value;
use crate::callable::Callable;
use crate::error::{AlreadyRegisteredError, CircularDependencyError, Result, SanduqError};
use crate::identifier::Identifier;
use crate::injectable::ClassDescriptor;

/// What an identifier is bound to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A callable producing the object.
    Factory(Callable),
    /// Another identifier to resolve instead.
    Alias(Identifier),
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: DashMap<Identifier, Binding>,
    classes: DashMap<Identifier, ClassDescriptor>,
    aliases: DashMap<Identifier, Identifier>,
    instances: DashMap<Identifier, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `identifier` to a factory or another identifier.
    ///
    /// Any instance cached under `identifier` is evicted and recorded
    /// aliases are dropped, so a rebind takes effect on the next resolve.
    ///
    /// # Errors
    /// Returns [`SanduqError::AlreadyRegistered`] if the identifier is
    /// already bound and `allow_override` is false.
    pub fn bind(&self, identifier: Identifier, binding: Binding, allow_override: bool) -> Result<()> {
        if !allow_override && self.bindings.contains_key(&identifier) {
            return Err(SanduqError::AlreadyRegistered(AlreadyRegisteredError { identifier }));
        }

        match &binding {
            Binding::Factory(callable) => {
                debug!(identifier = %identifier, callable = callable.name(), "Bound factory")
            }
            Binding::Alias(target) => debug!(identifier = %identifier, target = %target, "Bound alias"),
        }

        self.invalidate(&identifier);
        self.bindings.insert(identifier, binding);
        Ok(())
    }

    /// Registers how to construct a class.
    ///
    /// Like [`Registry::bind`], this drops the instance cached under the
    /// identifier and every recorded alias.
    pub fn register_class(&self, class: ClassDescriptor, allow_override: bool) -> Result<()> {
        let identifier = class.identifier().clone();

        if !allow_override && self.classes.contains_key(&identifier) {
            return Err(SanduqError::AlreadyRegistered(AlreadyRegisteredError { identifier }));
        }

        debug!(
            identifier = %identifier,
            params = class.entry_point().params().len(),
            "Registered class"
        );
        self.invalidate(&identifier);
        self.classes.insert(identifier, class);
        Ok(())
    }

    /// Forgets what was built or recorded under the previous meaning of
    /// `identifier`. Recorded aliases are flattened chains that may pass
    /// through it, so all of them go.
    fn invalidate(&self, identifier: &Identifier) {
        if self.instances.remove(identifier).is_some() {
            debug!(identifier = %identifier, "Evicted cached instance");
        }
        if !self.aliases.is_empty() {
            trace!(count = self.aliases.len(), "Cleared recorded aliases");
            self.aliases.clear();
        }
    }

    pub fn binding(&self, identifier: &Identifier) -> Option<Binding> {
        self.bindings.get(identifier).map(|entry| entry.value().clone())
    }

    pub fn class(&self, identifier: &Identifier) -> Option<ClassDescriptor> {
        self.classes.get(identifier).map(|entry| entry.value().clone())
    }

    pub fn alias(&self, identifier: &Identifier) -> Option<Identifier> {
        self.aliases.get(identifier).map(|entry| entry.value().clone())
    }

    pub fn record_alias(&self, identifier: Identifier, target: Identifier) {
        debug!(from = %identifier, to = %target, "Recorded alias");
        self.aliases.insert(identifier, target);
    }

    pub fn instance(&self, identifier: &Identifier) -> Option<Value> {
        self.instances.get(identifier).map(|entry| entry.value().clone())
    }

    /// Caches `object` unless another caller got there first; returns
    /// whichever object ends up cached.
    pub fn store_instance(&self, identifier: Identifier, object: Value) -> Value {
        self.instances
            .entry(identifier)
            .or_insert_with(|| object)
            .value()
            .clone()
    }

    pub fn has_binding(&self, identifier: &Identifier) -> bool {
        self.bindings.contains_key(identifier)
    }

    pub fn has_class(&self, identifier: &Identifier) -> bool {
        self.classes.contains_key(identifier)
    }

    pub fn has_instance(&self, identifier: &Identifier) -> bool {
        self.instances.contains_key(identifier)
    }

    /// Follows alias bindings from `identifier` to the first identifier
    /// that is not an alias.
    ///
    /// # Errors
    /// Returns [`SanduqError::CircularDependency`] if the chain loops.
    pub fn canonical(&self, identifier: &Identifier) -> Result<Identifier> {
        let mut chain = vec![identifier.clone()];
        let mut current = identifier.clone();

        while let Some(Binding::Alias(target)) = self.binding(&current) {
            trace!(from = %current, to = %target, "Following alias");
            if chain.contains(&target) {
                chain.push(target);
                return Err(SanduqError::CircularDependency(CircularDependencyError { chain }));
            }
            chain.push(target.clone());
            current = target;
        }

        Ok(current)
    }

    /// Every identifier with a binding or a class, for suggestions and
    /// validation.
    pub fn known_identifiers(&self) -> Vec<Identifier> {
        let mut identifiers: Vec<Identifier> = self
            .bindings
            .iter()
            .map(|entry| entry.key().clone())
            .chain(self.classes.iter().map(|entry| entry.key().clone()))
            .collect();
        identifiers.sort();
        identifiers.dedup();
        identifiers
    }

    /// Snapshot of all bindings.
    pub fn bindings(&self) -> Vec<(Identifier, Binding)> {
        self.bindings
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Snapshot of all class descriptors.
    pub fn classes(&self) -> Vec<ClassDescriptor> {
        self.classes.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns the number of bindings and classes.
    pub fn len(&self) -> usize {
        self.bindings.len() + self.classes.len()
    }

    pub fn cached_len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn factory() -> Binding {
        Binding::Factory(Callable::from_fn("answer", || Ok(42i32)))
    }

    fn alias(target: &'static str) -> Binding {
        Binding::Alias(Identifier::new(target))
    }

    #[test]
    fn bind_and_get() {
        let reg = Registry::new();
        reg.bind("answer".into(), factory(), false).unwrap();
        assert!(matches!(reg.binding(&"answer".into()), Some(Binding::Factory(_))));
        assert!(reg.binding(&"question".into()).is_none());
    }

    #[test]
    fn duplicate_fails() {
        let reg = Registry::new();
        reg.bind("answer".into(), factory(), false).unwrap();
        assert!(matches!(
            reg.bind("answer".into(), factory(), false),
            Err(SanduqError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn duplicate_with_override_ok() {
        let reg = Registry::new();
        reg.bind("answer".into(), factory(), false).unwrap();
        assert!(reg.bind("answer".into(), alias("other"), true).is_ok());
        assert!(matches!(reg.binding(&"answer".into()), Some(Binding::Alias(_))));
    }

    #[test]
    fn rebinding_drops_recorded_alias() {
        let reg = Registry::new();
        reg.record_alias("a".into(), "b".into());
        reg.bind("a".into(), factory(), true).unwrap();
        assert!(reg.alias(&"a".into()).is_none());
    }

    #[test]
    fn rebinding_drops_aliases_recorded_through_it() {
        let reg = Registry::new();
        reg.bind("outer".into(), alias("inner"), false).unwrap();
        reg.bind("inner".into(), alias("first"), false).unwrap();
        reg.record_alias("outer".into(), "first".into());

        reg.bind("inner".into(), alias("second"), true).unwrap();

        assert!(reg.alias(&"outer".into()).is_none());
        assert_eq!(reg.canonical(&"outer".into()).unwrap(), Identifier::new("second"));
    }

    #[test]
    fn rebinding_evicts_cached_instance() {
        let reg = Registry::new();
        reg.bind("answer".into(), factory(), false).unwrap();
        reg.store_instance("answer".into(), Arc::new(42i32));
        reg.store_instance("other".into(), Arc::new(7i32));

        reg.bind("answer".into(), factory(), true).unwrap();

        assert!(!reg.has_instance(&"answer".into()));
        assert!(reg.has_instance(&"other".into()));
    }

    #[test]
    fn reregistering_class_evicts_cached_instance() {
        let reg = Registry::new();
        let class = || ClassDescriptor::new("a", Callable::from_fn("a", || Ok(())));
        reg.register_class(class(), false).unwrap();
        reg.store_instance("a".into(), Arc::new(()));
        reg.record_alias("b".into(), "a".into());

        reg.register_class(class(), true).unwrap();

        assert!(!reg.has_instance(&"a".into()));
        assert!(reg.alias(&"b".into()).is_none());
    }

    #[test]
    fn canonical_follows_chain() {
        let reg = Registry::new();
        reg.bind("a".into(), alias("b"), false).unwrap();
        reg.bind("b".into(), alias("c"), false).unwrap();
        reg.bind("c".into(), factory(), false).unwrap();

        assert_eq!(reg.canonical(&"a".into()).unwrap(), Identifier::new("c"));
        assert_eq!(reg.canonical(&"c".into()).unwrap(), Identifier::new("c"));
        assert_eq!(reg.canonical(&"unbound".into()).unwrap(), Identifier::new("unbound"));
    }

    #[test]
    fn canonical_detects_loop() {
        let reg = Registry::new();
        reg.bind("a".into(), alias("b"), false).unwrap();
        reg.bind("b".into(), alias("a"), false).unwrap();

        match reg.canonical(&"a".into()) {
            Err(SanduqError::CircularDependency(err)) => {
                let names: Vec<_> = err.chain.iter().map(Identifier::as_str).collect();
                assert_eq!(names, vec!["a", "b", "a"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn store_instance_keeps_first() {
        let reg = Registry::new();
        let first: Value = Arc::new(1i32);
        let second: Value = Arc::new(2i32);

        let kept = reg.store_instance("n".into(), first.clone());
        assert!(Arc::ptr_eq(&kept, &first));

        let kept = reg.store_instance("n".into(), second);
        assert!(Arc::ptr_eq(&kept, &first));
        assert_eq!(reg.cached_len(), 1);
    }

    #[test]
    fn known_identifiers_merges_bindings_and_classes() {
        let reg = Registry::new();
        reg.bind("b".into(), factory(), false).unwrap();
        reg.register_class(
            ClassDescriptor::new("a", Callable::from_fn("a", || Ok(()))),
            false,
        )
        .unwrap();

        let names: Vec<String> = reg
            .known_identifiers()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reg.len(), 2);
    }
}
