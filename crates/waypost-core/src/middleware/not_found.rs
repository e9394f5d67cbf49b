use crate::context::Context;
use crate::error::Result;
use crate::route::RouteHandler;
use crate::router::{Middleware, Next};
use async_trait::async_trait;
use tracing::warn;

/// Falls back to a handler when no route produced a result.
///
/// Register it first so its post-phase runs last.
pub struct NotFound<E: 'static> {
	handler: Box<dyn RouteHandler<E>>,
}

impl<E: 'static> NotFound<E> {
	/// Creates the middleware with the fallback `handler`.
	pub fn new<H>(handler: H) -> Self
	where
		H: RouteHandler<E>,
	{
		Self {
			handler: Box::new(handler),
		}
	}
}

impl<E: 'static> std::fmt::Debug for NotFound<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NotFound").finish_non_exhaustive()
	}
}

#[async_trait(?Send)]
impl<E: 'static> Middleware<E> for NotFound<E> {
	async fn process(&self, ctx: Context<E>, next: Next<E>) -> Result<Context<E>> {
		let mut ctx = next.run(ctx).await?;
		if !ctx.has_result() {
			warn!(path = ctx.path(), "path not found");
			let result = self.handler.handle(&mut ctx).await?;
			ctx.replace_result(result);
		}
		Ok(ctx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::router::Router;
	use rstest::rstest;

	fn not_found_page(ctx: &mut Context<String>) -> Result<Option<String>> {
		Ok(Some(format!("404 {}", ctx.path())))
	}

	fn home(_: &mut Context<String>) -> Result<Option<String>> {
		Ok(Some("home".to_string()))
	}

	#[rstest]
	#[tokio::test]
	async fn test_fallback_when_no_route_matches() {
		let router = Router::new()
			.with_middleware(NotFound::new(not_found_page))
			.route("/", home)
			.unwrap();

		let ctx = router.dispatch(Context::new("/missing")).await.unwrap();

		assert_eq!(ctx.result().map(String::as_str), Some("404 /missing"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_matched_result_is_kept() {
		let router = Router::new()
			.with_middleware(NotFound::new(not_found_page))
			.route("/", home)
			.unwrap();

		let ctx = router.dispatch(Context::new("/")).await.unwrap();

		assert_eq!(ctx.result().map(String::as_str), Some("home"));
	}
}
