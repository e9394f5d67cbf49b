//! Translation between browser locations and context paths.
//!
//! A [`Mode`] decides where the application path lives in the URL:
//! - [`HistoryMode`]: in the pathname, below an optional base path
//!   (`/app/users/7?tab=posts`)
//! - [`HashMode`]: in the fragment, after a `#!` marker
//!   (`/index.html#!/users/7?tab=posts`)

use waypost_core::{Result, RouterError};

/// Base used to resolve relative URLs in [`Location::parse`].
const PARSE_BASE: &str = "http://localhost";

/// Marker preceding the application path in [`HashMode`] URLs.
const HASH_MARKER: &str = "#!";

/// Location-like value mirroring the browser's `Location` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
	/// Percent-encoded path, always starting with `/`.
	pub pathname: String,
	/// Query string including the leading `?`, or empty.
	pub search: String,
	/// Fragment including the leading `#`, or empty.
	pub hash: String,
}

impl Location {
	/// Creates a location from its parts.
	pub fn new(
		pathname: impl Into<String>,
		search: impl Into<String>,
		hash: impl Into<String>,
	) -> Self {
		Self {
			pathname: pathname.into(),
			search: search.into(),
			hash: hash.into(),
		}
	}

	/// Parses an absolute or relative URL. Relative URLs resolve against
	/// `http://localhost/`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if `url` cannot be parsed.
	pub fn parse(url: &str) -> Result<Self> {
		let base = url::Url::parse(PARSE_BASE)
			.map_err(|e| RouterError::InvalidLocation(e.to_string()))?;
		let parsed = base
			.join(url)
			.map_err(|e| RouterError::InvalidLocation(format!("{}: {}", url, e)))?;

		Ok(Self {
			pathname: parsed.path().to_string(),
			search: parsed.query().map(|q| format!("?{}", q)).unwrap_or_default(),
			hash: parsed
				.fragment()
				.map(|f| format!("#{}", f))
				.unwrap_or_default(),
		})
	}
}

/// Anchor-like value: a location plus the URL the anchor points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
	/// The parsed target.
	pub location: Location,
	/// The anchor's `href`, pushed to history verbatim.
	pub href: String,
	/// The `target` attribute, empty when absent.
	pub target: String,
	/// Whether the anchor carries a `download` attribute.
	pub download: bool,
	/// Whether the anchor points at the document's origin.
	pub same_origin: bool,
}

impl Anchor {
	/// Creates a same-origin anchor without `target` or `download` from an
	/// already parsed location.
	pub fn new(location: Location, href: impl Into<String>) -> Self {
		Self {
			location,
			href: href.into(),
			target: String::new(),
			download: false,
			same_origin: true,
		}
	}

	/// Creates an anchor by parsing `href`. Absolute URLs are same-origin
	/// only when they point at `http://localhost`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if `href` cannot be parsed.
	pub fn parse(href: &str) -> Result<Self> {
		let base = url::Url::parse(PARSE_BASE)
			.map_err(|e| RouterError::InvalidLocation(e.to_string()))?;
		let same_origin = base
			.join(href)
			.map(|url| url.origin() == base.origin())
			.unwrap_or(false);

		Ok(Self {
			same_origin,
			..Self::new(Location::parse(href)?, href)
		})
	}

	/// Sets the `target` attribute.
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = target.into();
		self
	}

	/// Sets whether the anchor carries a `download` attribute.
	pub fn with_download(mut self, download: bool) -> Self {
		self.download = download;
		self
	}

	/// Sets whether the anchor points at the document's origin.
	pub fn with_same_origin(mut self, same_origin: bool) -> Self {
		self.same_origin = same_origin;
		self
	}

	/// Returns whether following the anchor stays in this document: same
	/// origin, no `download`, and a `target` of `_self` or none.
	pub fn is_in_document(&self) -> bool {
		self.same_origin
			&& !self.download
			&& (self.target.is_empty() || self.target.eq_ignore_ascii_case("_self"))
	}
}

/// Characters whose escapes survive [`decode_uri`], plus `%` itself.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#%";

/// Decodes percent escapes except those of reserved characters.
///
/// `/search?q=a%26b` keeps its `%26`, so parsing the result as a
/// [`Context`](waypost_core::Context) sees the same query as parsing the
/// raw URL. Escapes of `%` are kept too, otherwise they would be decoded a
/// second time.
fn decode_uri(raw: &str) -> String {
	let bytes = raw.as_bytes();
	let mut decoded = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' && i + 2 < bytes.len() {
			let hex = |b: u8| char::from(b).to_digit(16);
			if let (Some(high), Some(low)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
				let byte = (high * 16 + low) as u8;
				if URI_RESERVED.contains(&byte) {
					decoded.extend_from_slice(&bytes[i..i + 3]);
				} else {
					decoded.push(byte);
				}
				i += 3;
				continue;
			}
		}
		decoded.push(bytes[i]);
		i += 1;
	}
	String::from_utf8_lossy(&decoded).into_owned()
}

/// Strategy for encoding application paths into browser URLs.
pub trait Mode: 'static {
	/// Derives the context path (path plus query) from a location.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if the location is outside
	/// the part of the URL space this mode owns.
	fn context_path(&self, location: &Location) -> Result<String>;

	/// Builds the URL written to history for a context path.
	fn history_url(&self, path: &str) -> String;
}

/// Application path stored in the URL pathname below `base_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMode {
	base_path: String,
}

impl Default for HistoryMode {
	fn default() -> Self {
		Self {
			base_path: "/".to_string(),
		}
	}
}

impl HistoryMode {
	/// Creates a history mode mounted at `base_path`.
	///
	/// The base is normalized to one leading slash and no trailing slash, so
	/// `"app/"` and `"/app"` are equivalent.
	pub fn new(base_path: &str) -> Self {
		let trimmed = base_path.trim_matches('/');
		let base_path = if trimmed.is_empty() {
			"/".to_string()
		} else {
			format!("/{}", trimmed)
		};
		Self { base_path }
	}

	/// Returns the normalized base path.
	pub fn base_path(&self) -> &str {
		&self.base_path
	}

	fn is_root(&self) -> bool {
		self.base_path == "/"
	}
}

impl Mode for HistoryMode {
	fn context_path(&self, location: &Location) -> Result<String> {
		let raw = format!("{}{}", location.pathname, location.search);
		let decoded = decode_uri(&raw);

		let Some(rest) = decoded.strip_prefix(self.base_path.as_str()) else {
			return Err(RouterError::InvalidLocation(decoded.clone()));
		};
		// `/app` owns `/app/x` and `/app?x`, not `/apple`.
		if !self.is_root() && !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
			return Err(RouterError::InvalidLocation(decoded.clone()));
		}

		Ok(format!("/{}", rest.trim_matches('/')))
	}

	fn history_url(&self, path: &str) -> String {
		let trimmed = path.trim_matches('/');
		if self.is_root() {
			format!("/{}", trimmed)
		} else {
			format!("{}/{}", self.base_path, trimmed)
		}
	}
}

/// Application path stored in the fragment after `#!`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashMode;

impl HashMode {
	/// Creates a hash mode.
	pub fn new() -> Self {
		Self
	}
}

impl Mode for HashMode {
	fn context_path(&self, location: &Location) -> Result<String> {
		Ok(match location.hash.split_once(HASH_MARKER) {
			Some((_, path)) => format!("/{}", path.trim_matches('/')),
			None => "/".to_string(),
		})
	}

	fn history_url(&self, path: &str) -> String {
		format!("{}{}", HASH_MARKER, path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use waypost_core::Context;

	#[rstest]
	fn test_history_mode_round_trip() {
		let mode = HistoryMode::new("/app");
		let location = Location::new("/app/foo", "?x=1", "");

		assert_eq!(mode.context_path(&location).unwrap(), "/foo?x=1");
		assert_eq!(mode.history_url("/foo?x=1"), "/app/foo?x=1");
	}

	#[rstest]
	#[case("/", "/", "/")]
	#[case("/", "/foo/bar/", "/foo/bar")]
	#[case("/app", "/app", "/")]
	#[case("/app/", "/app/", "/")]
	#[case("app", "/app//nested//", "/nested")]
	#[case("/app", "/app/caf%C3%A9", "/café")]
	fn test_history_context_path(#[case] base: &str, #[case] pathname: &str, #[case] expected: &str) {
		let mode = HistoryMode::new(base);
		let location = Location::new(pathname, "", "");
		assert_eq!(mode.context_path(&location).unwrap(), expected);
	}

	#[rstest]
	#[case("/caf%C3%A9%20bar", "/café bar")]
	#[case("/search?q=a%26b%3Dc", "/search?q=a%26b%3Dc")]
	#[case("/a%2Fb%3Fc%23d", "/a%2Fb%3Fc%23d")]
	#[case("/p/100%2525", "/p/100%2525")]
	#[case("/q?x=1%2B1", "/q?x=1%2B1")]
	#[case("/bad%zz%4", "/bad%zz%4")]
	fn test_decode_uri_keeps_reserved_escapes(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(decode_uri(raw), expected);
	}

	#[rstest]
	#[case("/search", "?q=a%26b%3Dc")]
	#[case("/p/100%2525", "")]
	#[case("/caf%C3%A9/a%2Fb", "?tag=%E2%9C%93&sum=1%2B1")]
	#[case("/files/%2520", "?name=x%25y")]
	fn test_history_context_matches_direct_context(#[case] pathname: &str, #[case] search: &str) {
		let mode = HistoryMode::default();
		let path = mode
			.context_path(&Location::new(pathname, search, ""))
			.unwrap();

		let via_mode = Context::<()>::new(&path);
		let direct = Context::<()>::new(&format!("{}{}", pathname, search));

		assert!(via_mode.equals(&direct), "{:?} != {:?}", via_mode, direct);
	}

	#[rstest]
	fn test_history_context_keeps_encoded_query_value() {
		let location = Location::new("/search", "?q=a%26b%3Dc", "");
		let path = HistoryMode::default().context_path(&location).unwrap();
		let ctx = Context::<()>::new(&path);

		assert_eq!(ctx.path(), "/search");
		assert_eq!(ctx.query_param("q"), Some("a&b=c"));
		assert_eq!(ctx.query().len(), 1);
	}

	#[rstest]
	#[case("/app", "/other")]
	#[case("/app", "/apple")]
	#[case("/app", "/")]
	fn test_history_context_path_outside_base(#[case] base: &str, #[case] pathname: &str) {
		let mode = HistoryMode::new(base);
		let err = mode
			.context_path(&Location::new(pathname, "", ""))
			.unwrap_err();
		assert!(matches!(err, RouterError::InvalidLocation(_)));
		assert!(err.to_string().starts_with("invalid location"));
	}

	#[rstest]
	#[case("/", "foo", "/foo")]
	#[case("/", "/foo/", "/foo")]
	#[case("/app", "/", "/app/")]
	#[case("/app/", "//foo//", "/app/foo")]
	fn test_history_url(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
		assert_eq!(HistoryMode::new(base).history_url(path), expected);
	}

	#[rstest]
	#[case("", "/")]
	#[case("#section", "/")]
	#[case("#!", "/")]
	#[case("#!/foo/", "/foo")]
	#[case("#!//foo/bar?x=1", "/foo/bar?x=1")]
	fn test_hash_context_path(#[case] hash: &str, #[case] expected: &str) {
		let location = Location::new("/index.html", "", hash);
		assert_eq!(HashMode.context_path(&location).unwrap(), expected);
	}

	#[rstest]
	fn test_hash_history_url() {
		assert_eq!(HashMode.history_url("/foo?x=1"), "#!/foo?x=1");
	}

	#[rstest]
	fn test_location_parse() {
		let location = Location::parse("/app/foo?x=1#!/bar").unwrap();
		assert_eq!(location, Location::new("/app/foo", "?x=1", "#!/bar"));

		let absolute = Location::parse("https://example.com/docs").unwrap();
		assert_eq!(absolute.pathname, "/docs");
		assert!(absolute.search.is_empty());
	}

	#[rstest]
	#[case(Anchor::parse("/users/7").unwrap(), true)]
	#[case(Anchor::parse("http://localhost/users/7").unwrap(), true)]
	#[case(Anchor::parse("https://example.com/users/7").unwrap(), false)]
	#[case(Anchor::parse("/users/7").unwrap().with_target("_self"), true)]
	#[case(Anchor::parse("/users/7").unwrap().with_target("_blank"), false)]
	#[case(Anchor::parse("/report.csv").unwrap().with_download(true), false)]
	#[case(Anchor::parse("/users/7").unwrap().with_same_origin(false), false)]
	fn test_anchor_is_in_document(#[case] anchor: Anchor, #[case] expected: bool) {
		assert_eq!(anchor.is_in_document(), expected);
	}

	#[rstest]
	fn test_anchor_keeps_raw_href() {
		let anchor = Anchor::parse("/app/users/7?tab=posts").unwrap();
		assert_eq!(anchor.href, "/app/users/7?tab=posts");
		assert_eq!(
			HistoryMode::new("/app").context_path(&anchor.location).unwrap(),
			"/users/7?tab=posts"
		);
	}
}
