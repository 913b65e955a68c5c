pub mod errors;
mod renderer;
mod response;
#[cfg(feature = "askama")]
mod template;

pub type Result<T, E = errors::WithBacktrace> = core::result::Result<T, E>;

pub use renderer::{into_context, Context, Environment, Globals, Renderer};
pub use response::DeferredResponse;
#[cfg(feature = "askama")]
pub use template::AskamaRenderer;
