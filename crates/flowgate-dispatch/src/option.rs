//! Dispatch options: a predicate paired with a handler.

use crate::predicate::When;
use flowgate_core::{ArgumentContext, DispatchResult};
use std::fmt;
use std::sync::Arc;

/// A handler invoked with the dispatcher's arguments.
pub type HandlerFn<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

/// One entry of a [`Dispatcher`](crate::Dispatcher).
///
/// An option without a condition always matches. Options are immutable once
/// handed to a dispatcher.
///
/// # Example
///
/// ```
/// use flowgate_core::Args;
/// use flowgate_dispatch::{DispatchOption, When};
/// use serde_json::json;
///
/// let option = DispatchOption::when(When::matches([("kind", json!("order"))]), |_: &Args| "orders")
///     .strict(true)
///     .named("orders");
///
/// let args = Args::from(vec![json!({ "kind": "order" })]);
/// assert!(option.matches(&args).unwrap());
/// assert_eq!(option.invoke(&args), "orders");
/// ```
pub struct DispatchOption<A, R> {
    condition: Option<When<A>>,
    strict: bool,
    handler: HandlerFn<A, R>,
    name: Option<String>,
}

impl<A, R> DispatchOption<A, R> {
    /// Creates an option that always matches.
    pub fn always<F>(handler: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            condition: None,
            strict: false,
            handler: Arc::new(handler),
            name: None,
        }
    }

    /// Creates an option guarded by `condition`.
    pub fn when<F>(condition: When<A>, handler: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            condition: Some(condition),
            ..Self::always(handler)
        }
    }

    /// Creates an option whose handler returns a clone of `value`.
    pub fn constant(condition: Option<When<A>>, value: R) -> Self
    where
        R: Clone + Send + Sync + 'static,
    {
        Self {
            condition,
            ..Self::always(move |_| value.clone())
        }
    }

    /// Sets strict comparison for mapping predicates.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Names the option for logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the condition, if any.
    pub fn condition(&self) -> Option<&When<A>> {
        self.condition.as_ref()
    }

    /// Returns whether mapping predicates compare strictly.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the option's name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invokes the handler.
    pub fn invoke(&self, args: &A) -> R {
        (self.handler)(args)
    }
}

impl<A: ArgumentContext, R> DispatchOption<A, R> {
    /// Evaluates the condition; an absent condition always matches.
    pub fn matches(&self, args: &A) -> DispatchResult<bool> {
        match &self.condition {
            None => Ok(true),
            Some(condition) => condition.evaluate(args, self.strict),
        }
    }
}

impl<A, R> Clone for DispatchOption<A, R> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            strict: self.strict,
            handler: Arc::clone(&self.handler),
            name: self.name.clone(),
        }
    }
}

impl<A, R> fmt::Debug for DispatchOption<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOption")
            .field("name", &self.name)
            .field("condition", &self.condition)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_core::Args;
    use serde_json::json;

    #[test]
    fn test_always_matches() {
        let option = DispatchOption::always(|_: &Args| 1);
        assert!(option.condition().is_none());
        assert!(option.matches(&Args::new()).unwrap());
        assert!(option.matches(&Args::from(vec![json!(false)])).unwrap());
    }

    #[test]
    fn test_constant_returns_clone() {
        let option = DispatchOption::<Args, String>::constant(None, "fallback".to_string());
        assert_eq!(option.invoke(&Args::new()), "fallback");
        assert_eq!(option.invoke(&Args::new()), "fallback");
    }

    #[test]
    fn test_builder_methods() {
        let option = DispatchOption::when(When::path("a"), |_: &Args| ())
            .strict(true)
            .named("a-present");
        assert!(option.is_strict());
        assert_eq!(option.name(), Some("a-present"));
        assert_eq!(option.condition().map(When::kind), Some("path"));
    }

    #[test]
    fn test_strict_flows_into_evaluation() {
        let args = Args::from(vec![json!({ "n": "1" })]);
        let loose = DispatchOption::when(When::matches([("n", json!(1))]), |_: &Args| ());
        let strict = loose.clone().strict(true);
        assert!(loose.matches(&args).unwrap());
        assert!(!strict.matches(&args).unwrap());
    }
}
