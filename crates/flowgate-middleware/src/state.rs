//! Shared state for one flow invocation.
//!
//! [`FlowState`] is handed to every handler of a flow by mutable reference.
//! It holds JSON data that later handlers and predicates can read, plus
//! typed extensions for values that are not JSON.

use flowgate_core::KeyPath;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Mutable state shared by the handlers of one flow invocation.
///
/// # Example
///
/// ```
/// use flowgate_middleware::FlowState;
/// use serde_json::json;
///
/// let mut state = FlowState::new();
/// state.set("user", json!({ "id": 7, "roles": ["admin"] }));
///
/// assert_eq!(state.get("user").unwrap()["id"], json!(7));
/// assert_eq!(state.lookup("user.roles[0]"), Some(&json!("admin")));
/// ```
pub struct FlowState {
    /// Identifier for log correlation.
    invocation_id: Uuid,

    /// When the invocation started.
    started_at: Instant,

    /// JSON data visible to predicates.
    data: Map<String, Value>,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl FlowState {
    /// Creates empty state with a fresh invocation ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(Map::new())
    }

    /// Creates state seeded with `data`.
    #[must_use]
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            invocation_id: Uuid::now_v7(),
            started_at: Instant::now(),
            data,
            extensions: HashMap::new(),
        }
    }

    /// Returns the invocation ID.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Returns the elapsed time since the state was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Resolves a key path inside the data.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let path = KeyPath::parse(path);
        let (head, rest) = path.segments().split_first()?;
        let root = self.data.get(&head.to_string())?;
        rest.iter().try_fold(root, |current, segment| segment.get(current))
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Removes the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Merges `data` in, overwriting existing keys.
    pub fn merge(&mut self, data: Map<String, Value>) {
        self.data.extend(data);
    }

    /// Replaces all data, returning the old data.
    pub fn replace(&mut self, data: Map<String, Value>) -> Map<String, Value> {
        std::mem::replace(&mut self.data, data)
    }

    /// Returns all data.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns all data mutably.
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    /// Snapshots the data as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowState")
            .field("invocation_id", &self.invocation_id)
            .field("data", &self.data)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

impl From<Map<String, Value>> for FlowState {
    fn from(data: Map<String, Value>) -> Self {
        Self::with_data(data)
    }
}
