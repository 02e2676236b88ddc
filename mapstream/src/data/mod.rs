//! Features, their schemas and the contract of the sources that provide them.

mod feature;
mod filter;
mod memory;
mod preload;
mod query;
mod source;

pub use feature::{AttributeDescriptor, AttributeKind, Feature, FeatureId, FeatureType, Value};
pub use filter::{CompareOp, Expression, Filter};
pub(crate) use filter::push_unique;
pub use memory::MemoryFeatureSource;
pub use preload::{PreloadKey, PreloadedIndex};
pub use query::Query;
pub use source::{CursorGuard, FeatureCursor, FeatureSource};
