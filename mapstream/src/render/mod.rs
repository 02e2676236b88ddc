//! Rendering pipeline: style compilation, query planning, coordinate transforms, decimation and
//! feature processing, driven by [`StreamingRenderer`].

mod cancel;
mod decimator;
mod paint;
mod processor;
mod query_planner;
mod renderer;
mod session;
mod style_compiler;
mod transform_cache;

pub use cancel::{CancelToken, StopHandle};
pub use decimator::Decimator;
pub use paint::{DeviceStroke, DeviceStyle, PaintResolver};
pub use query_planner::{plan_query, QueryPlan};
pub use renderer::StreamingRenderer;
pub use style_compiler::{compile_styles, CompiledStyle, StyleTarget};
pub use transform_cache::{SymbolizerAssociation, TransformCache};

/// Result of a [`StreamingRenderer::paint`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// All visible layers were rendered. Some features may have failed, see
    /// [`RenderListener::error_occurred`](crate::RenderListener::error_occurred).
    Completed,
    /// The render was stopped before all layers were processed.
    Cancelled,
    /// A fatal error stopped the render.
    Aborted,
    /// Nothing was drawn because the arguments are not valid.
    Skipped,
    /// Nothing was drawn because the renderer is already rendering.
    Busy,
}
