/// Range of scale denominators a style is resolved for.
///
/// A render resolves styles for the single scale it is drawn at, so both bounds are usually equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    min: f64,
    max: f64,
}

impl ScaleRange {
    /// Range `[min, max]`.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Degenerate range containing only the given scale.
    pub fn at(scale: f64) -> Self {
        Self {
            min: scale,
            max: scale,
        }
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns true if the range consists of one scale.
    pub fn is_instant(&self) -> bool {
        self.min == self.max
    }
}
