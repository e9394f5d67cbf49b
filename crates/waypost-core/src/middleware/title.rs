use crate::context::Context;
use crate::error::Result;
use crate::router::{Middleware, Next};
use async_trait::async_trait;
use tracing::trace;

/// Receives the document title computed by [`Title`].
pub trait TitleSink: 'static {
	/// Replaces the document title.
	fn set_title(&self, title: &str);
}

impl<F> TitleSink for F
where
	F: Fn(&str) + 'static,
{
	fn set_title(&self, title: &str) {
		self(title)
	}
}

/// Sets the document title after each navigation.
///
/// The title is `"{page} - {app}"` when the extractor finds a non-empty page
/// title on the result, and the bare application name otherwise.
pub struct Title<E: 'static> {
	app_name: String,
	sink: Box<dyn TitleSink>,
	extract: Box<dyn Fn(&E) -> Option<String>>,
}

impl<E: 'static> Title<E> {
	/// Creates the middleware.
	///
	/// `extract` reads the page title from a rendered result.
	pub fn new<S, X>(app_name: impl Into<String>, sink: S, extract: X) -> Self
	where
		S: TitleSink,
		X: Fn(&E) -> Option<String> + 'static,
	{
		Self {
			app_name: app_name.into(),
			sink: Box::new(sink),
			extract: Box::new(extract),
		}
	}

	fn title_for(&self, result: Option<&E>) -> String {
		match result.and_then(|element| (self.extract)(element)) {
			Some(title) if !title.trim().is_empty() => format!("{} - {}", title.trim(), self.app_name),
			_ => self.app_name.clone(),
		}
	}
}

impl<E: 'static> std::fmt::Debug for Title<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Title")
			.field("app_name", &self.app_name)
			.finish_non_exhaustive()
	}
}

#[async_trait(?Send)]
impl<E: 'static> Middleware<E> for Title<E> {
	async fn process(&self, ctx: Context<E>, next: Next<E>) -> Result<Context<E>> {
		let ctx = next.run(ctx).await?;
		let title = self.title_for(ctx.result());
		trace!(path = ctx.path(), %title, "setting document title");
		self.sink.set_title(&title);
		Ok(ctx)
	}
}
