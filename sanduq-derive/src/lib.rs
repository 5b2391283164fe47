//! Derive macros for Sanduq.
//!
//! ```ignore
//! use sanduq::Injectable;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     #[inject(default)]
//!     retries: u8,
//! }
//! ```

pub use sanduq_macros::Injectable;
