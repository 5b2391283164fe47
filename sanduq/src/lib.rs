//! # Sanduq: auto-wiring dependency injection for Rust
//!
//! Classes declare their constructor parameters; the container resolves
//! dependencies recursively, caches what it builds and lets callers
//! hand in arguments by position or by name.
//!
//! ```rust
//! use sanduq::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct Transport;
//!
//! #[derive(Injectable)]
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     #[inject(default = String::from("noreply@example.org"))]
//!     sender: String,
//! }
//!
//! let container = Container::builder()
//!     .register::<Transport>()
//!     .register::<Mailer>()
//!     .build()
//!     .expect("Failed to build container");
//!
//! let mailer: Arc<Mailer> = container.make().unwrap();
//! assert_eq!(mailer.sender, "noreply@example.org");
//!
//! // cached: the same object comes back
//! assert!(Arc::ptr_eq(&mailer, &container.make().unwrap()));
//! assert!(Arc::ptr_eq(&mailer.transport, &container.make().unwrap()));
//! ```

pub use sanduq_container::*;
pub use sanduq_derive::*;
pub use sanduq_support::*;

pub mod prelude {
    pub use sanduq_container::prelude::*;
    pub use sanduq_derive::Injectable;
}

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

/// Resolve through the process-wide container.
///
/// Every `#[derive(Injectable)]` type is registered there on first use.
///
/// ```rust
/// use sanduq::prelude::*;
///
/// #[derive(Injectable)]
/// struct Clock;
///
/// let clock = sanduq::get(Identifier::of::<Clock>(), args![], false).unwrap();
/// assert!(clock.downcast::<Clock>().is_ok());
/// ```
pub fn get(identifier: impl Into<Identifier>, args: Args, force_new: bool) -> Result<Value> {
    Container::global().resolve(identifier, args, force_new)
}
