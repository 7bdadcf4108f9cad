//! Central Configuration Constants
//!
//! Single source of truth for artifact file names and response defaults.

/// Default model bundle file name
pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// Default trained feature order file name
pub const DEFAULT_FEATURE_ORDER_FILE: &str = "feature_order.json";

/// Default attribution baseline file name
pub const DEFAULT_BACKGROUND_FILE: &str = "shap_background.json";

/// Default checksum manifest file name
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

/// Default number of top contributing features returned
pub const DEFAULT_TOP_N: usize = 5;

/// Decimal places used for probability and confidence in responses
pub const DISPLAY_DECIMALS: i32 = 4;

/// Crate version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Septoctor";
