//! The predicate dispatcher.

use crate::option::DispatchOption;
use flowgate_core::{ArgumentContext, DispatchResult};
use flowgate_telemetry::metrics::{record_dispatch, DispatchOutcome};
use std::fmt;

/// Selects and invokes the first matching option.
///
/// Options are evaluated in declaration order. The first option whose
/// condition matches has its handler invoked and evaluation stops, so at
/// most one handler runs per call. When nothing matches the dispatcher
/// returns `Ok(None)`.
///
/// # Example
///
/// ```
/// use flowgate_core::Args;
/// use flowgate_dispatch::{DispatchOption, Dispatcher, When};
/// use serde_json::json;
///
/// let dispatcher = Dispatcher::builder(DispatchOption::when(When::path("user.active"), |_: &Args| "active"))
///     .option(DispatchOption::always(|_: &Args| "inactive"))
///     .build();
///
/// let active = Args::from(vec![json!({ "user": { "active": true } })]);
/// let inactive = Args::from(vec![json!({ "user": { "active": false } })]);
///
/// assert_eq!(dispatcher.dispatch(&active).unwrap(), Some("active"));
/// assert_eq!(dispatcher.dispatch(&inactive).unwrap(), Some("inactive"));
/// ```
pub struct Dispatcher<A, R> {
    options: Vec<DispatchOption<A, R>>,
}

impl<A, R> Dispatcher<A, R> {
    /// Creates a dispatcher from a mandatory first option and any others.
    pub fn new<I>(first: DispatchOption<A, R>, rest: I) -> Self
    where
        I: IntoIterator<Item = DispatchOption<A, R>>,
    {
        let mut options = vec![first];
        options.extend(rest);
        Self { options }
    }

    /// Starts a builder with the mandatory first option.
    pub fn builder(first: DispatchOption<A, R>) -> DispatcherBuilder<A, R> {
        DispatcherBuilder {
            options: vec![first],
        }
    }

    /// Returns the options in evaluation order.
    pub fn options(&self) -> &[DispatchOption<A, R>] {
        &self.options
    }

    /// Returns the number of options; never zero.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always `false`; a dispatcher has at least one option.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<A: ArgumentContext, R> Dispatcher<A, R> {
    /// Returns the index of the first matching option without invoking it.
    pub fn select(&self, args: &A) -> DispatchResult<Option<usize>> {
        for (index, option) in self.options.iter().enumerate() {
            if option.matches(args)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Invokes the first matching option's handler with `args`.
    ///
    /// Returns `Ok(None)` when no option matched. Errors come only from
    /// mapping predicates that cannot coerce a value.
    pub fn dispatch(&self, args: &A) -> DispatchResult<Option<R>> {
        let selected = match self.select(args) {
            Ok(selected) => selected,
            Err(e) => {
                record_dispatch(DispatchOutcome::Error);
                tracing::debug!(error = %e, "dispatch predicate failed");
                return Err(e);
            }
        };

        match selected {
            Some(index) => {
                let option = &self.options[index];
                record_dispatch(DispatchOutcome::Matched);
                tracing::debug!(
                    option = index,
                    name = option.name().unwrap_or("<unnamed>"),
                    "dispatch matched"
                );
                Ok(Some(option.invoke(args)))
            }
            None => {
                record_dispatch(DispatchOutcome::Unmatched);
                tracing::trace!(options = self.options.len(), "no dispatch option matched");
                Ok(None)
            }
        }
    }
}

impl<A, R> Clone for Dispatcher<A, R> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Dispatcher<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .finish()
    }
}

/// Builder for a [`Dispatcher`].
pub struct DispatcherBuilder<A, R> {
    options: Vec<DispatchOption<A, R>>,
}

impl<A, R> DispatcherBuilder<A, R> {
    /// Appends an option.
    pub fn option(mut self, option: DispatchOption<A, R>) -> Self {
        self.options.push(option);
        self
    }

    /// Appends several options.
    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = DispatchOption<A, R>>,
    {
        self.options.extend(options);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Dispatcher<A, R> {
        Dispatcher {
            options: self.options,
        }
    }
}

impl<A, R> fmt::Debug for DispatcherBuilder<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("options", &self.options.len())
            .finish()
    }
}
