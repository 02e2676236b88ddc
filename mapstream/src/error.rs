//! Error types used by the crate.

use mapstream_types::TypesError;
use thiserror::Error;

/// Mapstream error type.
///
/// Data-driven failures never escape [`StreamingRenderer::paint`](crate::StreamingRenderer::paint);
/// they are reported to [`RenderListener`](crate::RenderListener)s instead. Only errors for
/// which [`RenderError::is_fatal`] returns true stop a render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Arguments of a call are not valid (e.g. zero-sized screen).
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Failure while rendering a layer.
    #[error("failed to render layer '{layer}': {source}")]
    Layer {
        /// Name of the layer.
        layer: String,
        /// Original error.
        #[source]
        source: Box<RenderError>,
    },
    /// A feature source failed to execute a query or to read a feature.
    #[error("feature source error: {0}")]
    Source(String),
    /// Error converting coordinates.
    #[error(transparent)]
    Transform(#[from] TypesError),
    /// Device transform cannot be inverted.
    #[error("world to device transform is not invertible")]
    NonInvertibleTransform,
    /// Geometry cannot be rendered.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// Memory for a surface or other buffer cannot be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    /// Style cannot be applied.
    #[error("style error: {0}")]
    Style(String),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raster coverage cannot be rendered.
    #[error("coverage error: {0}")]
    Coverage(String),
}

impl RenderError {
    /// Wraps the error with the name of the layer it happened in.
    pub fn in_layer(self, layer: &str) -> Self {
        match self {
            err @ RenderError::Layer { .. } => err,
            err => RenderError::Layer {
                layer: layer.to_string(),
                source: Box::new(err),
            },
        }
    }

    /// Returns true if the error must abort the whole render.
    pub fn is_fatal(&self) -> bool {
        match self {
            RenderError::OutOfMemory(_) => true,
            RenderError::Layer { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn layer_context_is_not_nested() {
        let err = RenderError::Source("broken".into())
            .in_layer("roads")
            .in_layer("other");
        assert_matches!(&err, RenderError::Layer { layer, source } if layer == "roads" && matches!(**source, RenderError::Source(_)));
        assert_eq!(
            err.to_string(),
            "failed to render layer 'roads': feature source error: broken"
        );
    }

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert!(RenderError::OutOfMemory("surface".into())
            .in_layer("a")
            .is_fatal());
        assert!(!RenderError::NonInvertibleTransform.is_fatal());
        assert!(!RenderError::DegenerateGeometry("empty".into()).is_fatal());
    }
}
