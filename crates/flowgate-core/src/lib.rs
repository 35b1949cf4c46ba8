//! # Flowgate Core
//!
//! Shared building blocks for the flowgate crates:
//!
//! - [`KeyPath`] - parsed dotted/bracketed paths into nested JSON values
//! - [`Args`] and [`ArgumentContext`] - the argument tuple predicates and
//!   handlers are evaluated against
//! - [`value`] - host-style coercion and equality between JSON values
//! - [`DispatchError`] - errors raised while evaluating predicates
//!
//! ## Example
//!
//! ```
//! use flowgate_core::{Args, ArgumentContext, KeyPath};
//! use serde_json::json;
//!
//! let args = Args::from(vec![json!({ "user": { "active": true } })]);
//! let path = KeyPath::parse("user.active");
//!
//! // Not found against the tuple itself, found against argument 0.
//! assert_eq!(args.lookup(&path), Some(&json!(true)));
//! ```

#![doc(html_root_url = "https://docs.rs/flowgate-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod args;
pub mod error;
pub mod keypath;
pub mod value;

pub use args::{ArgumentContext, Args};
pub use error::{DispatchError, DispatchResult};
pub use keypath::{KeyPath, Segment};
pub use value::{Coerced, CoercionTarget};
