//! Features Module - Raw input to model feature mapping
//!
//! `layout` is the versioned contract, `raw` the loosely typed input,
//! `mapper` the pure translation between them.

pub mod layout;
pub mod mapper;
pub mod raw;
pub mod vector;


// Re-export common types
pub use layout::{
    feature_index, feature_name, layout_hash, recognized_fields, FeatureKind, LayoutInfo,
    FEATURE_COUNT, FEATURE_DEFS, FEATURE_VERSION,
};
pub use mapper::map_features;
pub use raw::{RawInput, RawValue};
pub use vector::FeatureVector;
