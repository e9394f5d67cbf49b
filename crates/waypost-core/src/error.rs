//! Error types for route compilation and navigation.

/// Error raised while compiling a route template.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
	/// More than one optional group, or an optional group that is not a suffix.
	#[error("invalid use of optional params: {0}")]
	OptionalParams(String),
	/// Unclosed `{` or empty parameter name.
	#[error("invalid route parameter in '{template}': {reason}")]
	InvalidParam {
		/// The offending template.
		template: String,
		/// What was wrong with the parameter.
		reason: &'static str,
	},
	/// Template exceeds the maximum accepted length.
	#[error("pattern length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Length of the rejected template in bytes.
		length: usize,
		/// Maximum accepted length in bytes.
		max: usize,
	},
	/// The generated regular expression failed to compile.
	#[error("failed to compile pattern regex: {0}")]
	Regex(#[from] regex::Error),
}

/// Error raised by the per-navigation state bag.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
	/// A state entry was set to `null`.
	#[error("cannot set state to empty: {0}")]
	Empty(String),
}

/// Error type for router and navigator operations.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
	/// Route template could not be compiled.
	#[error(transparent)]
	Pattern(#[from] PatternError),
	/// Invalid write to the context state.
	#[error(transparent)]
	State(#[from] StateError),
	/// The location could not be decoded against the configured base path.
	#[error("invalid location: {0}")]
	InvalidLocation(String),
	/// No registered route matches the path.
	#[error("route not found: {0}")]
	NotFound(String),
	/// Dispatch completed without producing a renderable result.
	#[error("no result route: {0}")]
	NoResult(String),
	/// A navigator is already bound to this runtime.
	#[error("navigator already run")]
	AlreadyRunning,
	/// The navigator was never started or has been reset.
	#[error("navigator is not running")]
	NotRunning,
	/// A browser API call failed.
	#[error("navigation failed: {0}")]
	NavigationFailed(String),
	/// A template route has no element to render.
	#[error("invalid template to render")]
	InvalidTemplate,
	/// Navigator configuration could not be loaded.
	#[error("invalid configuration: {0}")]
	Config(String),
	/// Error raised by user middleware or a route handler.
	#[error(transparent)]
	Handler(#[from] anyhow::Error),
}

impl RouterError {
	/// Wraps an arbitrary error raised by user code.
	pub fn handler<E>(err: E) -> Self
	where
		E: Into<anyhow::Error>,
	{
		Self::Handler(err.into())
	}

	/// Creates a [`RouterError::NavigationFailed`] from any displayable value.
	pub fn navigation(msg: impl std::fmt::Display) -> Self {
		Self::NavigationFailed(msg.to_string())
	}
}

/// Result alias used throughout waypost.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;
