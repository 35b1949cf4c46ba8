//! # Flowgate Dispatch
//!
//! Predicate-based handler selection.
//!
//! A [`Dispatcher`] holds an ordered list of [`DispatchOption`]s, each a
//! [`When`] condition paired with a handler. Calling the dispatcher evaluates
//! the conditions in order against the call's arguments and invokes the first
//! matching handler with the same arguments.
//!
//! ## Conditions
//!
//! ```text
//! None                      always matches
//! When::Path("a.b")         value present and not `false`
//! When::AllPaths([..])      every path passes the Path rule
//! When::Matches({path: v})  every value equals v (strict or coerced)
//! When::Predicate(fn)       fn(args) == true
//! ```
//!
//! ## Example
//!
//! ```
//! use flowgate_core::Args;
//! use flowgate_dispatch::{DispatchOption, Dispatcher, When};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::builder(
//!     DispatchOption::when(When::matches([("body.type", json!("refund"))]), |_: &Args| "refunds"),
//! )
//! .option(DispatchOption::when(When::all_paths(["body.amount", "body.currency"]), |_: &Args| "payments"))
//! .build();
//!
//! let args = Args::from(vec![json!({ "body": { "amount": 0, "currency": "EUR" } })]);
//! assert_eq!(dispatcher.dispatch(&args).unwrap(), Some("payments"));
//!
//! let args = Args::from(vec![json!({ "body": {} })]);
//! assert_eq!(dispatcher.dispatch(&args).unwrap(), None);
//! ```

#![doc(html_root_url = "https://docs.rs/flowgate-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod option;
pub mod predicate;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use option::{DispatchOption, HandlerFn};
pub use predicate::{PredicateFn, When};
