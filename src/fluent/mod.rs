//! RouteBuilder and the request pipeline it produces.
//!
//! The functionality is split across submodules:
//!
//! - [`builder`] - Copy-on-write `RouteBuilder` and its state transitions
//! - [`options`] - Construction-time `RouteOptions`
//! - [`route`] - `ExecutableRoute`: the per-request execution protocol
//! - [`extract`] - Params, query and body extraction
//! - [`middleware`] - Boxing and sequential folding of context middleware
//! - [`reply`] - Normalization of handler results into responses

mod builder;
mod extract;
mod middleware;
mod options;
mod reply;
mod route;

pub use builder::RouteBuilder;
pub use options::{DEFAULT_MAX_PAYLOAD_SIZE_BYTES, RouteOptions};
pub use reply::IntoReply;
pub use route::ExecutableRoute;

#[cfg(test)]
mod tests;
