//! Configuration of the [`StreamingRenderer`](crate::StreamingRenderer).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Name of the option enabling attribute projection, spatial filters and rule pushdown.
pub const OPTIMIZED_DATA_LOADING: &str = "optimizedDataLoading";
/// Name of the option enabling in-memory feature preloading.
pub const MEMORY_PRELOADING: &str = "memoryPreloading";
/// Name of the option limiting the number of rule predicates pushed to the feature source.
pub const MAX_FILTERS_TO_DATASTORE: &str = "maxFiltersToDatastore";

/// Rendering quality hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RenderingHints {
    /// Antialias painted shapes.
    pub antialias: bool,
    /// Interpolate coverage pixels instead of taking the nearest one.
    pub coverage_interpolation: bool,
}

impl Default for RenderingHints {
    fn default() -> Self {
        Self {
            antialias: true,
            coverage_interpolation: false,
        }
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RendererConfig {
    optimized_data_loading: bool,
    memory_preloading: bool,
    max_filters_to_datastore: usize,
    generalization_distance: f64,
    dpi: f64,
    hints: RenderingHints,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            optimized_data_loading: true,
            memory_preloading: false,
            max_filters_to_datastore: 5,
            generalization_distance: 1.0,
            dpi: mapstream_types::geo::OGC_DPI,
            hints: RenderingHints::default(),
        }
    }
}

impl RendererConfig {
    /// Builds the configuration from named options. Options not in the map keep their default
    /// values.
    pub fn from_options<'a>(
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RenderError> {
        let mut config = Self::default();
        for (name, value) in options {
            config.set_option(name, value)?;
        }

        Ok(config)
    }

    /// Sets one named option from its string representation.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        let invalid = || RenderError::Config(format!("invalid value '{value}' of option {name}"));
        match name {
            OPTIMIZED_DATA_LOADING => {
                self.optimized_data_loading = value.trim().parse().map_err(|_| invalid())?
            }
            MEMORY_PRELOADING => {
                self.memory_preloading = value.trim().parse().map_err(|_| invalid())?
            }
            MAX_FILTERS_TO_DATASTORE => {
                self.max_filters_to_datastore = value.trim().parse().map_err(|_| invalid())?
            }
            _ => return Err(RenderError::Config(format!("unknown option {name}"))),
        }

        Ok(())
    }

    /// Whether attribute projection, spatial filtering and rule pushdown are applied to queries.
    pub fn optimized_data_loading(&self) -> bool {
        self.optimized_data_loading
    }

    /// Whether features of layers are loaded into memory once and reused by later renders.
    pub fn memory_preloading(&self) -> bool {
        self.memory_preloading
    }

    /// Maximum number of distinct rule predicates pushed to the feature source.
    pub fn max_filters_to_datastore(&self) -> usize {
        self.max_filters_to_datastore
    }

    /// Distance in pixels below which consecutive vertices are merged. `0` disables decimation.
    pub fn generalization_distance(&self) -> f64 {
        self.generalization_distance
    }

    /// Resolution used to compute the scale denominator.
    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Rendering hints.
    pub fn hints(&self) -> RenderingHints {
        self.hints
    }

    /// Sets [`RendererConfig::optimized_data_loading`].
    pub fn with_optimized_data_loading(mut self, value: bool) -> Self {
        self.optimized_data_loading = value;
        self
    }

    /// Sets [`RendererConfig::memory_preloading`].
    pub fn with_memory_preloading(mut self, value: bool) -> Self {
        self.memory_preloading = value;
        self
    }

    /// Sets [`RendererConfig::max_filters_to_datastore`].
    pub fn with_max_filters_to_datastore(mut self, value: usize) -> Self {
        self.max_filters_to_datastore = value;
        self
    }

    /// Sets [`RendererConfig::generalization_distance`]. Negative values are treated as `0`.
    pub fn with_generalization_distance(mut self, pixels: f64) -> Self {
        self.set_generalization_distance(pixels);
        self
    }

    /// Sets [`RendererConfig::dpi`].
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets [`RendererConfig::hints`].
    pub fn with_hints(mut self, hints: RenderingHints) -> Self {
        self.hints = hints;
        self
    }

    /// Sets [`RendererConfig::generalization_distance`]. Negative values are treated as `0`.
    pub fn set_generalization_distance(&mut self, pixels: f64) {
        self.generalization_distance = pixels.max(0.0);
    }

    /// Sets [`RendererConfig::hints`].
    pub fn set_hints(&mut self, hints: RenderingHints) {
        self.hints = hints;
    }
}
