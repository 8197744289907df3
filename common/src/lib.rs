use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod file_format;
pub mod log_setup;
pub mod test_utils;

pub use file_format::{get_file_extension, FileExtensionError, FileFormat, FileFormatResult};

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    FileExtension(#[from] FileExtensionError),
    #[error("Failed to read config file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

pub fn serialize<T: Serialize>(value: &T, format: FileFormat) -> SerdeFormatResult<String> {
    match format {
        FileFormat::Yaml => Ok(serde_yml::to_string(value)?),
        FileFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

pub fn deserialize<T: DeserializeOwned>(
    serialized: &str,
    format: FileFormat,
) -> SerdeFormatResult<T> {
    match format {
        FileFormat::Yaml => Ok(serde_yml::from_str(serialized)?),
        FileFormat::Json => Ok(serde_json::from_str(serialized)?),
    }
}

/// Reads a YAML or JSON file, picking the format from the file extension.
pub fn load_file<T: DeserializeOwned>(file_name: &str) -> SerdeFormatResult<T> {
    let format = FileFormat::from_file_name(file_name)?;
    let serialized = std::fs::read_to_string(file_name).map_err(|source| SerdeFormatError::Io {
        path: file_name.to_string(),
        source,
    })?;

    deserialize(&serialized, format)
}
