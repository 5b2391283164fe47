//! Callables and their declared parameters.
//!
//! Rust has no runtime reflection, so every constructor and factory the
//! container can invoke is described up front: a [`Callable`] pairs the
//! ordered list of [`Parameter`]s with the closure that consumes the
//! bound values.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::args::Value;
use crate::error::{Result, SanduqError};
use crate::identifier::Identifier;

/// What kind of value a parameter accepts.
#[derive(Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// A nominal dependency, auto-wired through the container.
    Service {
        identifier: Identifier,
        type_id: TypeId,
    },
    /// A plain value supplied by the caller or a default.
    Value,
}

/// A declared parameter of a constructor or factory.
///
/// # Examples
/// ```
/// use sanduq_container::callable::Parameter;
///
/// struct Database;
///
/// let db = Parameter::service::<Database>("db");
/// assert!(db.is_service());
///
/// let port = Parameter::value("port").with_default(8080u16);
/// assert!(port.default_value().is_some());
/// ```
#[derive(Clone)]
pub struct Parameter {
    name: &'static str,
    kind: ParamKind,
    default: Option<Value>,
}

impl Parameter {
    /// A parameter auto-wired with service `T`.
    pub fn service<T: Any + Send + Sync>(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Service {
                identifier: Identifier::of::<T>(),
                type_id: TypeId::of::<T>(),
            },
            default: None,
        }
    }

    /// A plain value parameter.
    pub fn value(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Value,
            default: None,
        }
    }

    /// Sets the value used when the caller supplies none.
    pub fn with_default<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.default = Some(Arc::new(value));
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    #[inline]
    pub fn is_service(&self) -> bool {
        matches!(self.kind, ParamKind::Service { .. })
    }

    #[inline]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The identifier this parameter depends on, if it is a service.
    pub fn dependency(&self) -> Option<&Identifier> {
        match &self.kind {
            ParamKind::Service { identifier, .. } => Some(identifier),
            ParamKind::Value => None,
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Parameter");
        s.field("name", &self.name);
        match &self.kind {
            ParamKind::Service { identifier, .. } => s.field("service", identifier),
            ParamKind::Value => s.field("service", &None::<Identifier>),
        };
        s.field("has_default", &self.default.is_some()).finish()
    }
}

/// Function invoked with the bound arguments.
pub type InvokeFn = Arc<dyn Fn(BoundArgs) -> Result<Value> + Send + Sync>;

/// Something the container can call: a constructor, a static factory
/// method or a factory closure.
#[derive(Clone)]
pub struct Callable {
    name: String,
    params: Arc<[Parameter]>,
    invoke: InvokeFn,
}

impl Callable {
    /// Creates a callable from its parameters and body.
    ///
    /// # Examples
    /// ```
    /// use sanduq_container::callable::{Callable, Parameter};
    ///
    /// let greeter = Callable::new("greeter", vec![Parameter::value("name")], |mut args| {
    ///     let name: String = args.value()?;
    ///     Ok(format!("hello {name}"))
    /// });
    /// assert_eq!(greeter.params().len(), 1);
    /// ```
    pub fn new<T, F>(name: impl Into<String>, params: Vec<Parameter>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(BoundArgs) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: params.into(),
            invoke: Arc::new(move |args| Ok(Arc::new(body(args)?) as Value)),
        }
    }

    /// Creates a callable whose body returns an already shared object.
    pub fn shared<T, F>(name: impl Into<String>, params: Vec<Parameter>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(BoundArgs) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: params.into(),
            invoke: Arc::new(move |args| Ok(body(args)? as Value)),
        }
    }

    /// Creates a callable without parameters.
    pub fn from_fn<T, F>(name: impl Into<String>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self::new(name, Vec::new(), move |_| body())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Services this callable declares, in order.
    pub fn dependencies(&self) -> impl Iterator<Item = &Identifier> {
        self.params.iter().filter_map(Parameter::dependency)
    }

    /// Invokes the body with already bound arguments.
    pub(crate) fn call(&self, args: BoundArgs) -> Result<Value> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// The ordered argument list produced by the binder.
///
/// Values are taken front to back, one per declared parameter.
pub struct BoundArgs {
    values: std::vec::IntoIter<(&'static str, Value)>,
}

impl BoundArgs {
    pub(crate) fn new(values: Vec<(&'static str, Value)>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Takes the next value as a shared service.
    pub fn service<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>> {
        let (parameter, value) = self.next_entry::<T>()?;
        value
            .downcast::<T>()
            .map_err(|_| mismatch::<T>(parameter))
    }

    /// Takes the next value and clones it out.
    pub fn value<T: Any + Clone>(&mut self) -> Result<T> {
        let (parameter, value) = self.next_entry::<T>()?;
        (*value)
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| mismatch::<T>(parameter))
    }

    /// Takes the next value untouched.
    pub fn raw(&mut self) -> Option<Value> {
        self.values.next().map(|(_, value)| value)
    }

    /// Values not taken yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn next_entry<T: ?Sized>(&mut self) -> Result<(&'static str, Value)> {
        self.values.next().ok_or(SanduqError::ArgumentMismatch {
            parameter: "<none>",
            expected: type_name::<T>(),
        })
    }
}

fn mismatch<T: ?Sized>(parameter: &'static str) -> SanduqError {
    SanduqError::ArgumentMismatch {
        parameter,
        expected: type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;

    fn bound(values: Vec<(&'static str, Value)>) -> BoundArgs {
        BoundArgs::new(values)
    }

    #[test]
    fn service_parameter_carries_identifier() {
        let param = Parameter::service::<Database>("db");
        assert_eq!(param.dependency(), Some(&Identifier::of::<Database>()));
        assert!(Parameter::value("port").dependency().is_none());
    }

    #[test]
    fn takes_values_in_order() {
        let mut args = bound(vec![
            ("host", Arc::new(String::from("localhost")) as Value),
            ("port", Arc::new(8080u16) as Value),
        ]);

        assert_eq!(args.value::<String>().unwrap(), "localhost");
        assert_eq!(args.value::<u16>().unwrap(), 8080);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn service_keeps_identity() {
        let db = Arc::new(Database);
        let mut args = bound(vec![("db", db.clone() as Value)]);
        let back = args.service::<Database>().unwrap();
        assert!(Arc::ptr_eq(&back, &db));
    }

    #[test]
    fn wrong_type_is_mismatch() {
        let mut args = bound(vec![("port", Arc::new("eighty") as Value)]);
        match args.value::<u16>() {
            Err(SanduqError::ArgumentMismatch { parameter, expected }) => {
                assert_eq!(parameter, "port");
                assert_eq!(expected, "u16");
            }
            other => panic!("Expected ArgumentMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn exhausted_is_mismatch() {
        let mut args = bound(vec![]);
        assert!(matches!(
            args.value::<u16>(),
            Err(SanduqError::ArgumentMismatch { .. })
        ));
    }

    #[test]
    fn callable_wraps_result() {
        let callable = Callable::new("answer", vec![], |_| Ok(42i32));
        let value = callable.call(bound(vec![])).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn shared_callable_does_not_rewrap() {
        let db = Arc::new(Database);
        let callable = Callable::shared("db", vec![], {
            let db = db.clone();
            move |_| Ok(db.clone())
        });
        let value = callable.call(bound(vec![])).unwrap();
        assert!(Arc::ptr_eq(&value.downcast::<Database>().unwrap(), &db));
    }

    #[test]
    fn dependencies_lists_services_only() {
        let callable = Callable::new(
            "service",
            vec![Parameter::service::<Database>("db"), Parameter::value("port")],
            |_| Ok(()),
        );
        let deps: Vec<_> = callable.dependencies().collect();
        assert_eq!(deps, vec![&Identifier::of::<Database>()]);
    }
}
