//! Router with an onion-model middleware chain.
//!
//! Dispatching a [`Context`] runs every middleware's pre-phase in
//! registration order, then the route resolution step, then the post-phases
//! in reverse order:
//!
//! ```text
//! A-pre -> B-pre -> resolve -> B-post -> A-post
//! ```
//!
//! A middleware that returns without running [`Next`] short-circuits the
//! chain: nothing inside it runs.

use crate::context::Context;
use crate::error::{PatternError, Result, RouterError};
use crate::route::{Route, RouteHandler};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::future::Future;
use std::rc::Rc;
use tracing::{debug, trace};

/// Middleware trait for navigation processing.
///
/// Implementations receive the context by value and hand it to `next` to
/// continue the chain. Whatever they return is what outer middleware (and
/// eventually the dispatcher's caller) sees.
///
/// ```
/// use async_trait::async_trait;
/// use waypost_core::{Context, Middleware, Next, Result};
///
/// struct Stamp;
///
/// #[async_trait(?Send)]
/// impl Middleware<String> for Stamp {
/// 	async fn process(&self, mut ctx: Context<String>, next: Next<String>) -> Result<Context<String>> {
/// 		ctx.set("stamped", true)?;
/// 		next.run(ctx).await
/// 	}
/// }
/// ```
#[async_trait(?Send)]
pub trait Middleware<E: 'static>: 'static {
	/// Processes a navigation through this middleware.
	///
	/// # Errors
	///
	/// Returns an error if this middleware or anything inside it fails.
	async fn process(&self, ctx: Context<E>, next: Next<E>) -> Result<Context<E>>;
}

#[async_trait(?Send)]
impl<E, F, Fut> Middleware<E> for F
where
	E: 'static,
	F: Fn(Context<E>, Next<E>) -> Fut + 'static,
	Fut: Future<Output = Result<Context<E>>> + 'static,
{
	async fn process(&self, ctx: Context<E>, next: Next<E>) -> Result<Context<E>> {
		self(ctx, next).await
	}
}

/// Object dispatching a context and returning it with its result filled in.
///
/// The navigator only depends on this trait, so anything that can turn a
/// context into a rendered result can drive it.
#[async_trait(?Send)]
pub trait Dispatcher<E: 'static> {
	/// Runs `ctx` through the routing pipeline.
	///
	/// # Errors
	///
	/// Returns any error raised while dispatching.
	async fn dispatch(&self, ctx: Context<E>) -> Result<Context<E>>;
}

struct Chain<E: 'static> {
	middlewares: Vec<Rc<dyn Middleware<E>>>,
	routes: Vec<Rc<Route<E>>>,
}

/// The remainder of the middleware chain.
///
/// Consumed by [`Next::run`], so each middleware can continue the chain at
/// most once.
pub struct Next<E: 'static> {
	chain: Rc<Chain<E>>,
	index: usize,
}

impl<E: 'static> Next<E> {
	/// Runs the rest of the chain with `ctx`.
	///
	/// # Errors
	///
	/// Propagates errors from inner middleware and the matched route.
	pub async fn run(self, ctx: Context<E>) -> Result<Context<E>> {
		step(self.chain, self.index, ctx).await
	}

	/// Returns the number of middleware left before route resolution.
	pub fn remaining(&self) -> usize {
		self.chain.middlewares.len().saturating_sub(self.index)
	}
}

impl<E: 'static> std::fmt::Debug for Next<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Next")
			.field("index", &self.index)
			.field("remaining", &self.remaining())
			.finish()
	}
}

fn step<E: 'static>(
	chain: Rc<Chain<E>>,
	index: usize,
	ctx: Context<E>,
) -> LocalBoxFuture<'static, Result<Context<E>>> {
	Box::pin(async move {
		match chain.middlewares.get(index).cloned() {
			Some(middleware) => {
				trace!(index, path = ctx.path(), "entering middleware");
				let next = Next {
					chain: Rc::clone(&chain),
					index: index + 1,
				};
				let ctx = middleware.process(ctx, next).await?;
				trace!(index, path = ctx.path(), "leaving middleware");
				Ok(ctx)
			}
			None => resolve(&chain.routes, ctx).await,
		}
	})
}

async fn resolve<E: 'static>(routes: &[Rc<Route<E>>], mut ctx: Context<E>) -> Result<Context<E>> {
	let Some(route) = routes.iter().find(|route| route.test(&ctx)) else {
		debug!(path = ctx.path(), "no route matched");
		return Ok(ctx);
	};

	debug!(path = ctx.path(), route = %route.pattern(), "route matched");
	let result = route.invoke(&mut ctx).await?;
	ctx.replace_result(result);
	Ok(ctx)
}

/// Ordered route table plus middleware stack.
///
/// # Examples
///
/// ```
/// use waypost_core::{Context, Result, Router};
///
/// let router: Router<String> = Router::new()
/// 	.route("/users/{id}", |ctx: &mut Context<String>| -> Result<Option<String>> {
/// 		Ok(ctx.param("id").map(|id| format!("user {}", id)))
/// 	})
/// 	.unwrap();
///
/// assert!(router.resolve("/users/7").is_ok());
/// assert!(router.resolve("/posts").is_err());
/// ```
pub struct Router<E: 'static> {
	middlewares: Vec<Rc<dyn Middleware<E>>>,
	routes: Vec<Rc<Route<E>>>,
}

impl<E: 'static> std::fmt::Debug for Router<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("middleware_count", &self.middlewares.len())
			.field(
				"routes",
				&self
					.routes
					.iter()
					.map(|route| route.pattern().template())
					.collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl<E: 'static> Default for Router<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: 'static> Router<E> {
	/// Creates an empty router.
	pub fn new() -> Self {
		Self {
			middlewares: Vec::new(),
			routes: Vec::new(),
		}
	}

	/// Appends a middleware. Middleware run in the order they are added.
	pub fn with_middleware<M>(mut self, middleware: M) -> Self
	where
		M: Middleware<E>,
	{
		self.middlewares.push(Rc::new(middleware));
		self
	}

	/// Compiles `template` and appends a route.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Pattern`] if the template is invalid.
	pub fn route<H>(self, template: &str, handler: H) -> Result<Self>
	where
		H: RouteHandler<E>,
	{
		let route = Route::new(template, handler).map_err(|e: PatternError| {
			debug!(template, error = %e, "rejected route template");
			RouterError::from(e)
		})?;
		Ok(self.with_route(route))
	}

	/// Appends an already compiled route.
	pub fn with_route(mut self, route: Route<E>) -> Self {
		self.routes.push(Rc::new(route));
		self
	}

	/// Returns the number of registered routes.
	pub fn route_count(&self) -> usize {
		self.routes.len()
	}

	/// Returns the number of registered middleware.
	pub fn middleware_count(&self) -> usize {
		self.middlewares.len()
	}

	/// Returns the first route, in registration order, matching `ctx`.
	pub fn find(&self, ctx: &Context<E>) -> Option<&Route<E>> {
		self.routes
			.iter()
			.find(|route| route.test(ctx))
			.map(|route| route.as_ref())
	}

	/// Returns the first route matching `path`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotFound`] if no route matches.
	pub fn resolve(&self, path: &str) -> Result<&Route<E>> {
		let ctx = Context::<E>::new(path);
		self.find(&ctx)
			.ok_or_else(|| RouterError::NotFound(ctx.path().to_string()))
	}

	/// Runs `ctx` through the middleware chain and the route table.
	///
	/// # Errors
	///
	/// Propagates errors raised by middleware or by the matched route.
	pub async fn dispatch(&self, ctx: Context<E>) -> Result<Context<E>> {
		debug!(
			path = ctx.path(),
			middleware = self.middlewares.len(),
			"dispatching"
		);
		let chain = Rc::new(Chain {
			middlewares: self.middlewares.clone(),
			routes: self.routes.clone(),
		});
		step(chain, 0, ctx).await
	}
}

#[async_trait(?Send)]
impl<E: 'static> Dispatcher<E> for Router<E> {
	async fn dispatch(&self, ctx: Context<E>) -> Result<Context<E>> {
		Router::dispatch(self, ctx).await
	}
}

#[async_trait(?Send)]
impl<E: 'static, D> Dispatcher<E> for Rc<D>
where
	D: Dispatcher<E> + ?Sized,
{
	async fn dispatch(&self, ctx: Context<E>) -> Result<Context<E>> {
		(**self).dispatch(ctx).await
	}
}
