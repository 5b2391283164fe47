//! Core container implementation for Sanduq DI.

pub mod args;
mod binder;
pub mod callable;
pub mod container;
pub mod error;
mod graph;
pub mod identifier;
pub mod injectable;
pub mod provider;
mod registry;
pub mod settings;

pub use args::{ArgKey, Args, Value};
pub use callable::{BoundArgs, Callable, ParamKind, Parameter};
pub use container::{Container, ContainerBuilder, prelude};
pub use error::{Result, SanduqError};
pub use identifier::Identifier;
pub use injectable::{ClassDescriptor, ClassRegistration, Injectable, discovered_classes};
pub use provider::{Provider, ProviderRegistry};
pub use registry::Binding;
pub use settings::Settings;
