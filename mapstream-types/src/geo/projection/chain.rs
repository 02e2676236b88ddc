use crate::cartesian::Point2d;
use crate::geo::projection::Projection;

/// Applies two projections one after another.
pub struct ChainProjection {
    first: Box<dyn Projection>,
    second: Box<dyn Projection>,
}

impl ChainProjection {
    /// Creates a new chain, `first` is applied first when projecting.
    pub fn new(first: Box<dyn Projection>, second: Box<dyn Projection>) -> Self {
        Self { first, second }
    }
}

impl Projection for ChainProjection {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        self.second.project(&self.first.project(input)?)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        self.first.unproject(&self.second.unproject(input)?)
    }
}

/// Swaps `project` and `unproject` of the inner projection.
pub struct InvertedProjection {
    inner: Box<dyn Projection>,
}

impl InvertedProjection {
    /// Creates a new instance.
    pub fn new(inner: Box<dyn Projection>) -> Self {
        Self { inner }
    }
}

impl Projection for InvertedProjection {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        self.inner.unproject(input)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        self.inner.project(input)
    }
}
