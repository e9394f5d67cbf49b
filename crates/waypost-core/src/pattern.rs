//! Route template compilation.
//!
//! Templates look like `/users/{id}/posts[/{post_id:\d+}]`:
//! - `*` matches every path.
//! - A template without `{` or `[` is compared to the path verbatim.
//! - `{name}` captures one path segment (anything but `/`).
//! - `{name:regex}` captures whatever `regex` matches.
//! - One trailing `[...]` group is optional.

use crate::error::PatternError;
use std::collections::HashMap;

/// Maximum allowed length for a route template in bytes.
const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Maximum allowed size for the compiled regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Regex used for `{name}` parameters without an explicit expression.
const DEFAULT_PARAM_REGEX: &str = "[^/]+";

/// How a compiled template tests a path.
#[derive(Debug, Clone)]
pub enum Matcher {
	/// `*`: matches every path.
	Wildcard,
	/// Template without parameters, compared by string equality.
	Literal(String),
	/// Anchored regular expression with one named group per parameter.
	Regex {
		/// The compiled expression.
		regex: regex::Regex,
		/// `(internal group name, parameter name)` pairs in template order.
		groups: Vec<(String, String)>,
	},
}

/// A compiled route template.
///
/// # Examples
///
/// ```
/// use waypost_core::RoutePattern;
///
/// let pattern = RoutePattern::new("/foo/{id}/bar[/{sub}]").unwrap();
/// let params = pattern.captures("/foo/1/bar").unwrap();
/// assert_eq!(params.get("id").map(String::as_str), Some("1"));
/// assert!(!params.contains_key("sub"));
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
	template: String,
	matcher: Matcher,
	param_names: Vec<String>,
}

impl RoutePattern {
	/// Compiles a route template.
	///
	/// # Errors
	///
	/// - [`PatternError::TooLong`] if the template exceeds 1024 bytes
	/// - [`PatternError::OptionalParams`] if optional groups are nested,
	///   repeated, unbalanced or not at the end of the template
	/// - [`PatternError::InvalidParam`] for an unclosed `{` or an empty name
	/// - [`PatternError::Regex`] if a custom expression does not compile
	pub fn new(template: &str) -> Result<Self, PatternError> {
		if template.len() > MAX_TEMPLATE_LENGTH {
			return Err(PatternError::TooLong {
				length: template.len(),
				max: MAX_TEMPLATE_LENGTH,
			});
		}

		if template == "*" {
			return Ok(Self {
				template: template.to_string(),
				matcher: Matcher::Wildcard,
				param_names: Vec::new(),
			});
		}

		if !template.contains('{') && !template.contains('[') {
			return Ok(Self {
				template: template.to_string(),
				matcher: Matcher::Literal(template.to_string()),
				param_names: Vec::new(),
			});
		}

		let (required, optional) = split_optional(template)?;

		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		compile_part(template, required, &mut regex_str, &mut param_names)?;
		if let Some(optional) = optional {
			regex_str.push_str("(?:");
			compile_part(template, optional, &mut regex_str, &mut param_names)?;
			regex_str.push_str(")?");
		}
		regex_str.push('$');

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()?;

		let groups = param_names
			.iter()
			.enumerate()
			.map(|(index, name)| (group_name(index), name.clone()))
			.collect();

		Ok(Self {
			template: template.to_string(),
			matcher: Matcher::Regex { regex, groups },
			param_names,
		})
	}

	/// Returns the template this pattern was compiled from.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the compiled matcher.
	pub fn matcher(&self) -> &Matcher {
		&self.matcher
	}

	/// Returns the parameter names in template order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether this is the `*` pattern.
	pub fn is_wildcard(&self) -> bool {
		matches!(self.matcher, Matcher::Wildcard)
	}

	/// Returns whether this pattern is compared verbatim (no parameters).
	pub fn is_exact(&self) -> bool {
		matches!(self.matcher, Matcher::Literal(_))
	}

	/// Checks if this pattern matches the given path.
	pub fn is_match(&self, path: &str) -> bool {
		match &self.matcher {
			Matcher::Wildcard => true,
			Matcher::Literal(literal) => literal == path,
			Matcher::Regex { regex, .. } => regex.is_match(path),
		}
	}

	/// Matches `path` and returns the captured parameters.
	///
	/// Parameters inside an optional group that did not participate in the
	/// match are absent from the map.
	pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
		match &self.matcher {
			Matcher::Wildcard => Some(HashMap::new()),
			Matcher::Literal(literal) => (literal == path).then(HashMap::new),
			Matcher::Regex { regex, groups } => regex.captures(path).map(|caps| {
				groups
					.iter()
					.filter_map(|(group, name)| {
						caps.name(group)
							.map(|m| (name.clone(), m.as_str().to_string()))
					})
					.collect()
			}),
		}
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template)
	}
}

fn group_name(index: usize) -> String {
	format!("__p{}", index)
}

/// Splits a template into its required prefix and optional suffix.
fn split_optional(template: &str) -> Result<(&str, Option<&str>), PatternError> {
	let invalid = || PatternError::OptionalParams(template.to_string());

	let mut chunks = template.split('[');
	let required = chunks.next().unwrap_or_default();
	let optional = chunks.next();
	if chunks.next().is_some() || required.contains(']') {
		return Err(invalid());
	}

	match optional {
		None => Ok((required, None)),
		Some(rest) => {
			let inner = rest.strip_suffix(']').ok_or_else(invalid)?;
			if inner.contains(']') {
				return Err(invalid());
			}
			Ok((required, Some(inner)))
		}
	}
}

/// Appends the regex for one part of a template.
fn compile_part(
	template: &str,
	part: &str,
	regex_str: &mut String,
	param_names: &mut Vec<String>,
) -> Result<(), PatternError> {
	let mut literal = String::new();
	let mut chars = part.chars();

	while let Some(c) = chars.next() {
		if c != '{' {
			literal.push(c);
			continue;
		}

		regex_str.push_str(&regex::escape(&literal));
		literal.clear();

		// Braces inside a custom expression (`\d{2}`) are balanced.
		let mut body = String::new();
		let mut depth = 1usize;
		for next in chars.by_ref() {
			match next {
				'{' => depth += 1,
				'}' => {
					depth -= 1;
					if depth == 0 {
						break;
					}
				}
				_ => {}
			}
			body.push(next);
		}
		if depth != 0 {
			return Err(PatternError::InvalidParam {
				template: template.to_string(),
				reason: "unclosed parameter",
			});
		}

		let (name, expr) = match body.split_once(':') {
			Some((name, expr)) => (name.trim(), expr),
			None => (body.trim(), DEFAULT_PARAM_REGEX),
		};
		if name.is_empty() {
			return Err(PatternError::InvalidParam {
				template: template.to_string(),
				reason: "empty parameter name",
			});
		}
		if expr.is_empty() {
			return Err(PatternError::InvalidParam {
				template: template.to_string(),
				reason: "empty parameter expression",
			});
		}

		regex_str.push_str(&format!("(?P<{}>{})", group_name(param_names.len()), expr));
		param_names.push(name.to_string());
	}

	regex_str.push_str(&regex::escape(&literal));
	Ok(())
}
