//! Routes: a compiled template bound to a handler.

use crate::context::Context;
use crate::error::{PatternError, Result};
use crate::pattern::RoutePattern;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::rc::Rc;

/// Produces the element for a matched route.
///
/// Returning `Ok(None)` leaves the context without a result, which the
/// navigator reports as a failed navigation unless a later middleware fills
/// it in.
#[async_trait(?Send)]
pub trait RouteHandler<E: 'static>: 'static {
	/// Handles a matched navigation.
	///
	/// # Errors
	///
	/// Any error is propagated unchanged to the caller of the dispatch.
	async fn handle(&self, ctx: &mut Context<E>) -> Result<Option<E>>;
}

#[async_trait(?Send)]
impl<E, F> RouteHandler<E> for F
where
	E: 'static,
	F: Fn(&mut Context<E>) -> Result<Option<E>> + 'static,
{
	async fn handle(&self, ctx: &mut Context<E>) -> Result<Option<E>> {
		self(ctx)
	}
}

/// Future returned by handlers wrapped with [`async_handler`].
pub type HandlerFuture<'a, E> = LocalBoxFuture<'a, Result<Option<E>>>;

/// Route handler backed by an async closure. Built by [`async_handler`].
pub struct AsyncHandler<F> {
	f: F,
}

/// Wraps an async closure as a [`RouteHandler`].
///
/// The closure borrows the context for as long as its future runs, so it
/// returns a boxed future:
///
/// ```
/// use waypost_core::{Context, Router, RouterError, async_handler};
///
/// let router = Router::<String>::new()
/// 	.route(
/// 		"/users/{id}",
/// 		async_handler(|ctx: &mut Context<String>| {
/// 			Box::pin(async move {
/// 				let id = ctx.param("id").unwrap_or_default().to_string();
/// 				Ok::<_, RouterError>(Some(format!("user {}", id)))
/// 			})
/// 		}),
/// 	)
/// 	.unwrap();
///
/// let ctx = futures::executor::block_on(router.dispatch(Context::new("/users/3"))).unwrap();
/// assert_eq!(ctx.result().map(String::as_str), Some("user 3"));
/// ```
pub fn async_handler<E, F>(f: F) -> AsyncHandler<F>
where
	E: 'static,
	F: for<'a> Fn(&'a mut Context<E>) -> HandlerFuture<'a, E> + 'static,
{
	AsyncHandler { f }
}

#[async_trait(?Send)]
impl<E, F> RouteHandler<E> for AsyncHandler<F>
where
	E: 'static,
	F: for<'a> Fn(&'a mut Context<E>) -> HandlerFuture<'a, E> + 'static,
{
	async fn handle(&self, ctx: &mut Context<E>) -> Result<Option<E>> {
		(self.f)(ctx).await
	}
}

/// A single route definition.
pub struct Route<E: 'static> {
	pattern: RoutePattern,
	handler: Rc<dyn RouteHandler<E>>,
}

impl<E: 'static> Clone for Route<E> {
	fn clone(&self) -> Self {
		Self {
			pattern: self.pattern.clone(),
			handler: Rc::clone(&self.handler),
		}
	}
}

impl<E: 'static> std::fmt::Debug for Route<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern.template())
			.field("param_names", &self.pattern.param_names())
			.finish()
	}
}

impl<E: 'static> Route<E> {
	/// Compiles `template` and binds it to `handler`.
	///
	/// # Errors
	///
	/// Returns the [`PatternError`] raised by [`RoutePattern::new`].
	pub fn new<H>(template: &str, handler: H) -> Result<Self, PatternError>
	where
		H: RouteHandler<E>,
	{
		Ok(Self {
			pattern: RoutePattern::new(template)?,
			handler: Rc::new(handler),
		})
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns whether this route matches the context's path.
	pub fn test(&self, ctx: &Context<E>) -> bool {
		self.pattern.is_match(ctx.path())
	}

	/// Writes the captured parameters into `ctx` and runs the handler.
	///
	/// # Errors
	///
	/// Propagates the handler's error.
	pub async fn invoke(&self, ctx: &mut Context<E>) -> Result<Option<E>> {
		if let Some(params) = self.pattern.captures(ctx.path()) {
			for (name, value) in params {
				ctx.set_param(name, value);
			}
		}
		self.handler.handle(ctx).await
	}
}
