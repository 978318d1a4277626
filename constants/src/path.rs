/// Folder under the asset root holding uploaded meshes.
pub const MODEL_DIRECTORY: &str = "models";

/// Folder under the asset root holding persisted file records.
pub const RECORD_DIRECTORY: &str = "records";

/// Extension registered with the JSON asset loader for file records.
pub const RECORD_EXTENSION: &str = "record.json";

/// Extension of the uploaded meshes.
pub const MODEL_EXTENSION: &str = "glb";

/// File loaded when neither the command line nor the page URL names one.
pub const DEFAULT_FILE_NAME: &str = "sample";

/// Asset root on native builds, used by the file-backed persistence gateway.
pub const NATIVE_ASSET_ROOT: &str = "assets";
