//! Schema description model

use serde::Serialize;
use septoctor_core::logic::features::recognized_fields;
use septoctor_core::{LayoutInfo, ModelContext};

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub feature_version: u8,
    /// CRC32 of the layout, lowercase hex
    pub layout_hash: String,
    pub feature_names: Vec<String>,
    pub input_fields: Vec<&'static str>,
    pub trained_feature_order: Vec<String>,
    pub model_version: String,
    pub layout_compatible: bool,
    pub unmapped_features: Vec<String>,
    pub unused_features: Vec<String>,
}

impl SchemaResponse {
    pub fn describe(model: &ModelContext) -> Self {
        let layout = LayoutInfo::current();
        let metadata = model.metadata();

        Self {
            feature_version: layout.version,
            layout_hash: format!("{:08x}", layout.hash),
            feature_names: layout.feature_names,
            input_fields: recognized_fields(),
            trained_feature_order: model.feature_order().to_vec(),
            model_version: metadata.model_version.clone(),
            layout_compatible: metadata.layout_compatible(),
            unmapped_features: metadata.unmapped_features.clone(),
            unused_features: metadata.unused_features.clone(),
        }
    }
}
