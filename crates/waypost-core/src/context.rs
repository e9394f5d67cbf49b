//! Navigation context.
//!
//! A [`Context`] is one decoded navigation request. It is created fresh for
//! every navigation intent, threaded through the middleware chain by value,
//! and discarded once the result has been rendered or the navigation failed.

use crate::error::StateError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One decoded navigation request.
///
/// Equality only considers the path and the query pairs. Parameters, state
/// and the result never take part in it, so a navigation to the page that is
/// already displayed compares equal regardless of what the previous dispatch
/// stored.
pub struct Context<E> {
	path: String,
	query: HashMap<String, String>,
	params: HashMap<String, String>,
	state: HashMap<String, Value>,
	result: Option<E>,
}

impl<E> Context<E> {
	/// Parses `path` (optionally carrying a query string) into a context.
	///
	/// Any `#fragment` is dropped. The path is percent-decoded, leading
	/// slashes are collapsed to one and trailing slashes are removed, except
	/// for the root `/`.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_core::Context;
	///
	/// let ctx: Context<()> = Context::new("//users/42/?tab=posts");
	/// assert_eq!(ctx.path(), "/users/42");
	/// assert_eq!(ctx.query_param("tab"), Some("posts"));
	/// ```
	pub fn new(path: &str) -> Self {
		let (path, query) = parse_request(path);
		Self {
			path,
			query,
			params: HashMap::new(),
			state: HashMap::new(),
			result: None,
		}
	}

	/// Returns a new context for the same path and query, with empty
	/// params, state and result.
	pub fn fresh(&self) -> Self {
		Self {
			path: self.path.clone(),
			query: self.query.clone(),
			params: HashMap::new(),
			state: HashMap::new(),
			result: None,
		}
	}

	/// Returns the normalized path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the decoded query pairs.
	pub fn query(&self) -> &HashMap<String, String> {
		&self.query
	}

	/// Returns a single query value.
	pub fn query_param(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	/// Returns the parameters extracted by the matching route.
	pub fn params(&self) -> &HashMap<String, String> {
		&self.params
	}

	/// Returns a single route parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	pub(crate) fn set_param(&mut self, name: String, value: String) {
		self.params.insert(name, value);
	}

	/// Returns `true` if both contexts point at the same path with the same
	/// query pairs, in any order.
	pub fn equals<F>(&self, other: &Context<F>) -> bool {
		self.path == other.path && self.query == other.query
	}

	/// Reads a state entry.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.state.get(key)
	}

	/// Reads a state entry and deserializes it into `T`.
	///
	/// Returns `None` if the entry is missing or has a different shape.
	pub fn get_as<T>(&self, key: &str) -> Option<T>
	where
		T: DeserializeOwned,
	{
		self.state
			.get(key)
			.and_then(|value| serde_json::from_value(value.clone()).ok())
	}

	/// Writes a state entry.
	///
	/// # Errors
	///
	/// Returns [`StateError::Empty`] if `value` is `null`. Use
	/// [`Context::remove`] to clear an entry.
	pub fn set<V>(&mut self, key: impl Into<String>, value: V) -> Result<(), StateError>
	where
		V: Into<Value>,
	{
		let key = key.into();
		let value = value.into();
		if value.is_null() {
			return Err(StateError::Empty(key));
		}
		self.state.insert(key, value);
		Ok(())
	}

	/// Removes a state entry, returning the previous value if any.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.state.remove(key)
	}

	/// Returns the whole state bag.
	pub fn state(&self) -> &HashMap<String, Value> {
		&self.state
	}

	/// Returns the rendered result, if a route produced one.
	pub fn result(&self) -> Option<&E> {
		self.result.as_ref()
	}

	/// Returns a mutable reference to the result.
	pub fn result_mut(&mut self) -> Option<&mut E> {
		self.result.as_mut()
	}

	/// Replaces the result.
	pub fn set_result(&mut self, result: E) {
		self.result = Some(result);
	}

	/// Takes the result out of the context.
	pub fn take_result(&mut self) -> Option<E> {
		self.result.take()
	}

	pub(crate) fn replace_result(&mut self, result: Option<E>) {
		self.result = result;
	}

	/// Returns `true` if a result has been stored.
	pub fn has_result(&self) -> bool {
		self.result.is_some()
	}

	/// Rebuilds a URL from the path and the query, with query keys sorted.
	pub fn to_url(&self) -> String {
		if self.query.is_empty() {
			return self.path.clone();
		}
		let sorted: BTreeMap<_, _> = self.query.iter().collect();
		let mut serializer = url::form_urlencoded::Serializer::new(String::new());
		for (key, value) in sorted {
			serializer.append_pair(key, value);
		}
		format!("{}?{}", self.path, serializer.finish())
	}
}

impl<E, F> PartialEq<Context<F>> for Context<E> {
	fn eq(&self, other: &Context<F>) -> bool {
		self.equals(other)
	}
}

impl<E> std::fmt::Debug for Context<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Context")
			.field("path", &self.path)
			.field("query", &self.query)
			.field("params", &self.params)
			.field("state", &self.state)
			.field("has_result", &self.result.is_some())
			.finish()
	}
}

fn parse_request(raw: &str) -> (String, HashMap<String, String>) {
	let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
	let (path, query) = without_fragment
		.split_once('?')
		.unwrap_or((without_fragment, ""));

	let decoded = urlencoding::decode_binary(path.as_bytes());
	let path = normalize_path(&String::from_utf8_lossy(&decoded));
	let query = url::form_urlencoded::parse(query.as_bytes())
		.into_owned()
		.collect();

	(path, query)
}

/// Collapses leading slashes to one and strips trailing slashes.
pub(crate) fn normalize_path(path: &str) -> String {
	let trimmed = path.trim_matches('/');
	if trimmed.is_empty() {
		"/".to_string()
	} else {
		format!("/{}", trimmed)
	}
}
