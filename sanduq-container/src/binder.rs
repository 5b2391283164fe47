//! Parameter binding.
//!
//! Turns a callable's declared parameters plus the caller's [`Args`]
//! into the ordered list the callable is invoked with. Typed service
//! parameters are served from the front of the caller's values when the
//! front value already has the declared type, and auto-wired through
//! the container otherwise.

use std::any::TypeId;

use tracing::trace;

use crate::args::{Args, Value};
use crate::callable::{BoundArgs, Callable, ParamKind};
use crate::error::{Result, SanduqError};
use crate::identifier::Identifier;

/// Resolves a service parameter that the caller did not supply.
///
/// The container implements this with its default, cached resolution
/// path; tests plug in fakes.
pub(crate) trait DependencySource {
    fn resolve_dependency(&mut self, identifier: &Identifier) -> Result<Value>;
}

/// Read cursor over the caller's arguments.
///
/// Consumption only advances `front`; the caller's [`Args`] are never
/// modified.
struct ArgCursor<'a> {
    args: &'a Args,
    front: usize,
}

impl<'a> ArgCursor<'a> {
    fn new(args: &'a Args) -> Self {
        Self { args, front: 0 }
    }

    fn peek_front(&self) -> Option<&'a Value> {
        match self.args {
            Args::Positional(values) => values.get(self.front),
            Args::Named(values) => values.get_index(self.front).map(|(_, value)| value),
        }
    }

    /// Takes the front value if its concrete type is `type_id`.
    fn take_front_if(&mut self, type_id: TypeId) -> Option<Value> {
        let value = self.peek_front()?;
        if (**value).type_id() != type_id {
            return None;
        }
        self.front += 1;
        Some(value.clone())
    }

    /// Takes the value for a plain parameter: the next element in
    /// positional mode, the unconsumed entry of the same name in named
    /// mode.
    fn take_for(&mut self, name: &str) -> Option<Value> {
        match self.args {
            Args::Positional(values) => {
                let value = values.get(self.front)?;
                self.front += 1;
                Some(value.clone())
            }
            Args::Named(values) => {
                let (index, _, value) = values.get_full(name)?;
                (index >= self.front).then(|| value.clone())
            }
        }
    }
}

/// Binds `callable`'s parameters against `args`.
///
/// # Errors
/// - [`SanduqError::ParamMissing`] when a plain parameter has no value
///   and no default; nothing bound so far is kept.
/// - Anything raised while auto-wiring a service parameter, unchanged.
pub(crate) fn bind_params(
    callable: &Callable,
    args: &Args,
    source: &mut dyn DependencySource,
) -> Result<BoundArgs> {
    let params = callable.params();
    if params.is_empty() {
        return Ok(BoundArgs::new(Vec::new()));
    }

    let mut cursor = ArgCursor::new(args);
    let mut bound = Vec::with_capacity(params.len());

    for param in params {
        let value = match param.kind() {
            ParamKind::Service {
                identifier,
                type_id,
            } => match cursor.take_front_if(*type_id) {
                Some(value) => {
                    trace!(callable = callable.name(), param = param.name(), "Using supplied dependency");
                    value
                }
                None => source.resolve_dependency(identifier)?,
            },
            ParamKind::Value => match cursor.take_for(param.name()) {
                Some(value) => value,
                None => param
                    .default_value()
                    .cloned()
                    .ok_or_else(|| SanduqError::ParamMissing {
                        parameter: param.name(),
                        callable: callable.name().to_string(),
                    })?,
            },
        };

        bound.push((param.name(), value));
    }

    Ok(BoundArgs::new(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgKey;
    use crate::callable::Parameter;
    use std::sync::Arc;

    struct Database {
        name: &'static str,
    }

    /// Hands out a fresh database per request and records the requests.
    #[derive(Default)]
    struct FakeSource {
        resolved: Vec<Identifier>,
    }

    impl DependencySource for FakeSource {
        fn resolve_dependency(&mut self, identifier: &Identifier) -> Result<Value> {
            self.resolved.push(identifier.clone());
            Ok(Arc::new(Database { name: "wired" }))
        }
    }

    fn service(params: Vec<Parameter>) -> Callable {
        Callable::new("Service", params, |_| Ok(()))
    }

    #[test]
    fn no_parameters_ignores_args() {
        let callable = service(vec![]);
        let args = Args::positional().push(1i32).push(2i32);
        let bound = bind_params(&callable, &args, &mut FakeSource::default()).unwrap();
        assert_eq!(bound.remaining(), 0);
    }

    #[test]
    fn positional_short_circuit_uses_prebuilt_dependency() {
        let callable = service(vec![
            Parameter::service::<Database>("db"),
            Parameter::value("port"),
        ]);
        let db = Arc::new(Database { name: "prebuilt" });
        let args = Args::positional().push_arc(db.clone()).push(5432u16);
        let mut source = FakeSource::default();

        let mut bound = bind_params(&callable, &args, &mut source).unwrap();

        let got = bound.service::<Database>().unwrap();
        assert!(Arc::ptr_eq(&got, &db));
        assert_eq!(bound.value::<u16>().unwrap(), 5432);
        assert!(source.resolved.is_empty());
    }

    #[test]
    fn service_without_matching_front_is_autowired() {
        let callable = service(vec![
            Parameter::service::<Database>("db"),
            Parameter::value("port"),
        ]);
        let args = Args::positional().push(5432u16);
        let mut source = FakeSource::default();

        let mut bound = bind_params(&callable, &args, &mut source).unwrap();

        assert_eq!(bound.service::<Database>().unwrap().name, "wired");
        assert_eq!(bound.value::<u16>().unwrap(), 5432);
        assert_eq!(source.resolved, vec![Identifier::of::<Database>()]);
    }

    #[test]
    fn named_mode_matches_by_name() {
        let callable = service(vec![Parameter::value("host"), Parameter::value("port")]);
        let args = Args::named().with("port", 80u16).with("host", "example.org");

        let mut bound = bind_params(&callable, &args, &mut FakeSource::default()).unwrap();

        assert_eq!(bound.value::<&str>().unwrap(), "example.org");
        assert_eq!(bound.value::<u16>().unwrap(), 80);
    }

    #[test]
    fn named_mode_typed_rule_reads_first_entry() {
        let callable = service(vec![Parameter::service::<Database>("db")]);
        let db = Arc::new(Database { name: "named" });
        let args = Args::named().with_arc("anything", db.clone());
        let mut source = FakeSource::default();

        let mut bound = bind_params(&callable, &args, &mut source).unwrap();

        assert!(Arc::ptr_eq(&bound.service::<Database>().unwrap(), &db));
        assert!(source.resolved.is_empty());
    }

    #[test]
    fn named_entry_consumed_by_typed_rule_is_not_reused() {
        let callable = service(vec![
            Parameter::service::<Database>("db"),
            Parameter::value("db").with_default(0u8),
        ]);
        let args = Args::named().with_arc("db", Arc::new(Database { name: "x" }));

        let mut bound = bind_params(&callable, &args, &mut FakeSource::default()).unwrap();

        bound.service::<Database>().unwrap();
        assert_eq!(bound.value::<u8>().unwrap(), 0);
    }

    #[test]
    fn default_used_when_no_value() {
        let callable = service(vec![Parameter::value("retries").with_default(3u32)]);
        let mut bound = bind_params(&callable, &Args::default(), &mut FakeSource::default()).unwrap();
        assert_eq!(bound.value::<u32>().unwrap(), 3);
    }

    #[test]
    fn missing_parameter_fails() {
        let callable = service(vec![
            Parameter::value("host").with_default("localhost"),
            Parameter::value("port"),
        ]);

        match bind_params(&callable, &Args::default(), &mut FakeSource::default()) {
            Err(SanduqError::ParamMissing { parameter, callable }) => {
                assert_eq!(parameter, "port");
                assert_eq!(callable, "Service");
            }
            Err(other) => panic!("Expected ParamMissing, got: {other:?}"),
            Ok(_) => panic!("Expected ParamMissing, got a bound list"),
        }
    }

    #[test]
    fn positional_mode_ignores_names() {
        // Positional values are taken in order even when a later key
        // happens to be a parameter name.
        let callable = service(vec![Parameter::value("a"), Parameter::value("b")]);
        let args = Args::from_keyed(vec![
            (ArgKey::Index(0), Arc::new("first") as Value),
            (ArgKey::Name("a".into()), Arc::new("second") as Value),
        ]);

        let mut bound = bind_params(&callable, &args, &mut FakeSource::default()).unwrap();

        assert_eq!(bound.value::<&str>().unwrap(), "first");
        assert_eq!(bound.value::<&str>().unwrap(), "second");
    }

    #[test]
    fn named_mode_ignores_order() {
        let callable = service(vec![Parameter::value("a").with_default("unset")]);
        let args = Args::from_keyed(vec![
            (ArgKey::Name("x".into()), Arc::new(1i32) as Value),
            (ArgKey::Index(0), Arc::new("y") as Value),
        ]);

        let mut bound = bind_params(&callable, &args, &mut FakeSource::default()).unwrap();

        assert_eq!(bound.value::<&str>().unwrap(), "unset");
    }

    #[test]
    fn caller_args_are_not_mutated() {
        let callable = service(vec![
            Parameter::service::<Database>("db"),
            Parameter::value("port"),
        ]);
        let args = Args::positional()
            .push_arc(Arc::new(Database { name: "kept" }))
            .push(1u16);

        bind_params(&callable, &args, &mut FakeSource::default()).unwrap();
        bind_params(&callable, &args, &mut FakeSource::default()).unwrap();

        assert_eq!(args.len(), 2);
    }
}
