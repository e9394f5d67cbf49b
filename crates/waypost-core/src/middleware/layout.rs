use crate::context::Context;
use crate::error::Result;
use crate::router::{Middleware, Next};
use async_trait::async_trait;

/// Target of the `layout` attribute managed by [`Layout`].
pub trait LayoutSink: 'static {
	/// Sets the `layout` attribute to `name`.
	fn set_layout(&self, name: &str);

	/// Removes the `layout` attribute.
	fn remove_layout(&self);
}

/// Reflects the layout requested by the rendered result onto a root element.
pub struct Layout<E: 'static> {
	sink: Box<dyn LayoutSink>,
	extract: Box<dyn Fn(&E) -> Option<String>>,
}

impl<E: 'static> Layout<E> {
	/// Creates the middleware. `extract` reads the layout name from a result.
	pub fn new<S, X>(sink: S, extract: X) -> Self
	where
		S: LayoutSink,
		X: Fn(&E) -> Option<String> + 'static,
	{
		Self {
			sink: Box::new(sink),
			extract: Box::new(extract),
		}
	}
}

impl<E: 'static> std::fmt::Debug for Layout<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Layout").finish_non_exhaustive()
	}
}

#[async_trait(?Send)]
impl<E: 'static> Middleware<E> for Layout<E> {
	async fn process(&self, ctx: Context<E>, next: Next<E>) -> Result<Context<E>> {
		let ctx = next.run(ctx).await?;
		match ctx.result().and_then(|element| (self.extract)(element)) {
			Some(name) if !name.is_empty() => self.sink.set_layout(&name),
			_ => self.sink.remove_layout(),
		}
		Ok(ctx)
	}
}
