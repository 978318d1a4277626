use std::path::PathBuf;

use bevy::prelude::*;
use constants::path::{
    DEFAULT_FILE_NAME, MODEL_DIRECTORY, MODEL_EXTENSION, NATIVE_ASSET_ROOT, RECORD_DIRECTORY,
    RECORD_EXTENSION,
};
use constants::zone::{DEFAULT_ZONE_HEIGHT, DEFAULT_ZONE_RADIUS};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("unknown option {0}")]
    UnknownOption(String),

    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
}

/// Which file is being annotated and where its mesh and record live.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Backend identity of the file; keys both the mesh and the record.
    pub file_name: String,
    /// Asset path of the mesh scene.
    pub model_path: String,
    /// Asset path of the persisted file record.
    pub record_path: String,
    /// Directory the native gateway writes records into.
    pub records_dir: PathBuf,
    pub default_radius: f32,
    pub default_height: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::for_file(DEFAULT_FILE_NAME)
    }
}

impl ViewerConfig {
    pub fn for_file(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            model_path: format!("{MODEL_DIRECTORY}/{file_name}.{MODEL_EXTENSION}"),
            record_path: format!("{RECORD_DIRECTORY}/{file_name}.{RECORD_EXTENSION}"),
            records_dir: default_records_dir(),
            default_radius: DEFAULT_ZONE_RADIUS,
            default_height: DEFAULT_ZONE_HEIGHT,
        }
    }

    /// Display name: uploads are stored as `<name>-<uuid>`.
    pub fn clean_name(&self) -> &str {
        self.file_name.split('-').next().unwrap_or(&self.file_name)
    }

    /// Parse `[file-name] [--model <asset path>] [--records <dir>]`, skipping the program name.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut file_name: Option<String> = None;
        let mut model_path: Option<String> = None;
        let mut records_dir: Option<PathBuf> = None;

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--model" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    model_path = Some(value.clone());
                }
                "--records" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    records_dir = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownOption(flag.to_string()));
                }
                name => file_name = Some(validate_file_name(name)?),
            }
        }

        let mut config = Self::for_file(file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME));
        if let Some(model_path) = model_path {
            config.model_path = model_path;
        }
        if let Some(records_dir) = records_dir {
            config.records_dir = records_dir;
        }
        Ok(config)
    }

    /// Read `?file=<name>` from a page query string.
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let file_name = query
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("file="))
            .filter(|name| !name.is_empty());

        match file_name {
            Some(name) => Ok(Self::for_file(&validate_file_name(name)?)),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the configuration for the current platform.
    pub fn from_environment() -> Result<Self, ConfigError> {
        #[cfg(target_arch = "wasm32")]
        {
            let query = web_sys::window()
                .and_then(|window| window.location().search().ok())
                .unwrap_or_default();
            Self::from_query(&query)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let args: Vec<String> = std::env::args().collect();
            Self::from_args(&args)
        }
    }
}

// Same base the asset server reads from, so saved records land where they are loaded
#[cfg(not(target_arch = "wasm32"))]
fn default_records_dir() -> PathBuf {
    use bevy::asset::io::file::FileAssetReader;

    FileAssetReader::get_base_path().join(NATIVE_ASSET_ROOT).join(RECORD_DIRECTORY)
}

#[cfg(target_arch = "wasm32")]
fn default_records_dir() -> PathBuf {
    PathBuf::from(NATIVE_ASSET_ROOT).join(RECORD_DIRECTORY)
}

fn validate_file_name(name: &str) -> Result<String, ConfigError> {
    let forbidden = name.contains('/') || name.contains('\\') || name.contains("..");
    if name.is_empty() || forbidden {
        return Err(ConfigError::InvalidFileName(name.to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("drill-zone-viewer")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn file_name_keys_mesh_and_record_paths() {
        let config = ViewerConfig::from_args(&args(&["pump-3f2a"])).unwrap();
        assert_eq!(config.file_name, "pump-3f2a");
        assert_eq!(config.model_path, "models/pump-3f2a.glb");
        assert_eq!(config.record_path, "records/pump-3f2a.record.json");
        assert_eq!(config.clean_name(), "pump");
    }

    #[test]
    fn options_override_defaults() {
        let config =
            ViewerConfig::from_args(&args(&["--model", "meshes/a.gltf", "--records", "/tmp/r"]))
                .unwrap();
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.model_path, "meshes/a.gltf");
        assert_eq!(config.records_dir, PathBuf::from("/tmp/r"));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(
            ViewerConfig::from_args(&args(&["--records"])),
            Err(ConfigError::MissingValue("--records".into()))
        );
        assert_eq!(
            ViewerConfig::from_args(&args(&["--verbose"])),
            Err(ConfigError::UnknownOption("--verbose".into()))
        );
        assert_eq!(
            ViewerConfig::from_args(&args(&["../etc/passwd"])),
            Err(ConfigError::InvalidFileName("../etc/passwd".into()))
        );
    }

    #[test]
    fn query_string_selects_file() {
        let config = ViewerConfig::from_query("?mode=view&file=bracket").unwrap();
        assert_eq!(config.file_name, "bracket");
        assert_eq!(ViewerConfig::from_query("").unwrap(), ViewerConfig::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn records_dir_does_not_depend_on_working_directory() {
        use bevy::asset::io::file::FileAssetReader;
        use crate::tools::drill_zones::persistence::JsonFileGateway;

        let config = ViewerConfig::default();
        assert_eq!(
            config.records_dir,
            FileAssetReader::get_base_path().join("assets").join("records")
        );
        assert!(config.records_dir.is_absolute());

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(std::env::temp_dir()).unwrap();
        let record = JsonFileGateway::new(ViewerConfig::default().records_dir).read(DEFAULT_FILE_NAME);
        std::env::set_current_dir(original).unwrap();

        assert!(record.is_ok(), "sample record not found: {:?}", record.err());
    }
}
