//! Caller-supplied arguments.
//!
//! A resolution call may hand values to the constructor it ends up
//! invoking. [`Args`] is decided once at the call site: either an
//! ordered list consumed front to back, or a mapping matched by
//! parameter name. The two conventions are never mixed within one call.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// A type-erased shared value: caller arguments, defaults and resolved
/// objects all travel in this form.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Arguments for a single resolution.
///
/// # Examples
/// ```
/// use sanduq_container::args::Args;
///
/// let positional = Args::positional().push(8080u16).push("localhost");
/// assert_eq!(positional.len(), 2);
///
/// let named = Args::named().with("port", 8080u16);
/// assert!(named.is_named());
/// ```
#[derive(Clone)]
pub enum Args {
    /// Values matched to parameters in order.
    Positional(Vec<Value>),
    /// Values matched to parameters by name; insertion order is kept.
    Named(IndexMap<String, Value>),
}

/// Key of an entry in a keyed argument bag, see [`Args::from_keyed`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

impl Args {
    /// Empty positional arguments.
    pub fn positional() -> Self {
        Args::Positional(Vec::new())
    }

    /// Empty named arguments.
    pub fn named() -> Self {
        Args::Named(IndexMap::new())
    }

    /// Builds arguments from a keyed bag, deciding the mode from the
    /// first key alone.
    ///
    /// A first key of `Index(0)` selects positional mode and keeps every
    /// value in bag order. Anything else selects named mode; index keys
    /// then become their decimal string and can never match a parameter
    /// name, although their values can still satisfy a typed parameter
    /// from the front of the bag.
    pub fn from_keyed(entries: impl IntoIterator<Item = (ArgKey, Value)>) -> Self {
        let mut entries = entries.into_iter().peekable();

        match entries.peek() {
            Some((ArgKey::Index(0), _)) => {
                Args::Positional(entries.map(|(_, value)| value).collect())
            }
            _ => Args::Named(
                entries
                    .map(|(key, value)| match key {
                        ArgKey::Index(index) => (index.to_string(), value),
                        ArgKey::Name(name) => (name, value),
                    })
                    .collect(),
            ),
        }
    }

    /// Appends an owned value.
    ///
    /// On named arguments the value is keyed by its position.
    pub fn push<V: Any + Send + Sync>(self, value: V) -> Self {
        self.push_value(Arc::new(value))
    }

    /// Appends an already shared object without wrapping it again.
    ///
    /// This is how a pre-built dependency is handed to a constructor:
    /// the `Arc<T>` keeps its identity and matches a parameter declared
    /// as service `T`.
    pub fn push_arc<T: Any + Send + Sync>(self, value: Arc<T>) -> Self {
        self.push_value(value)
    }

    /// Appends a type-erased value.
    pub fn push_value(mut self, value: Value) -> Self {
        match &mut self {
            Args::Positional(values) => values.push(value),
            Args::Named(values) => {
                let key = values.len().to_string();
                values.insert(key, value);
            }
        }
        self
    }

    /// Adds a named value.
    ///
    /// Positional arguments switch to named mode; existing values keep
    /// their position as key.
    pub fn with<V: Any + Send + Sync>(self, name: impl Into<String>, value: V) -> Self {
        self.with_value(name, Arc::new(value))
    }

    /// Adds a named, already shared object.
    pub fn with_arc<T: Any + Send + Sync>(self, name: impl Into<String>, value: Arc<T>) -> Self {
        self.with_value(name, value)
    }

    /// Adds a named type-erased value.
    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        let mut values = match self {
            Args::Named(values) => values,
            Args::Positional(values) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect(),
        };
        values.insert(name.into(), value);
        Args::Named(values)
    }

    /// Returns `true` in named mode.
    pub fn is_named(&self) -> bool {
        matches!(self, Args::Named(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Args::Positional(values) => values.len(),
            Args::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Args {
    fn default() -> Self {
        Args::positional()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Args::Positional(values) => f
                .debug_struct("Positional")
                .field("len", &values.len())
                .finish(),
            Args::Named(values) => f
                .debug_struct("Named")
                .field("keys", &values.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Builds [`Args`].
///
/// ```
/// use sanduq_container::args;
///
/// let positional = args![8080u16, "localhost"];
/// assert!(!positional.is_named());
///
/// let named = args! { "port" => 8080u16, "host" => "localhost" };
/// assert!(named.is_named());
/// assert_eq!(named.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::args::Args::default()
    };
    ($($name:literal => $value:expr),+ $(,)?) => {
        $crate::args::Args::named()$(.with($name, $value))+
    };
    ($($value:expr),+ $(,)?) => {
        $crate::args::Args::positional()$(.push($value))+
    };
}
