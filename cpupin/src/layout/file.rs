//! JSON layout descriptions.

use super::params::LayoutParams;
use super::types::CoreList;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// System cores as written in a layout file: `"0,1,8-9"` or `[0, 1, 8, 9]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemCoresSpec {
    List(Vec<u32>),
    Text(String),
}

impl SystemCoresSpec {
    fn to_core_list(&self) -> Result<CoreList> {
        match self {
            SystemCoresSpec::List(cores) => Ok(CoreList::from(cores.clone())),
            SystemCoresSpec::Text(text) => text.parse(),
        }
    }
}

fn default_threads_per_core() -> u32 {
    1
}

/// On-disk layout description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutFile {
    pub total_cores: u32,
    #[serde(default = "default_threads_per_core")]
    pub threads_per_core: u32,
    #[serde(default)]
    pub io_threads: u32,
    pub system_cores: SystemCoresSpec,
    pub virtual_cores: u32,
}

impl LayoutFile {
    /// Parse a layout description from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate and convert into layout parameters.
    pub fn to_params(&self) -> Result<LayoutParams> {
        LayoutParams::builder()
            .total_cores(self.total_cores)
            .threads_per_core(self.threads_per_core)
            .io_threads(self.io_threads)
            .system_cores(self.system_cores.to_core_list()?)
            .virtual_cores(self.virtual_cores)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PinError;

    #[test]
    fn test_parse_string_system_cores() {
        let layout = LayoutFile::from_json(
            r#"{"total_cores": 16, "threads_per_core": 2, "io_threads": 1,
                "system_cores": "0,1,8-9", "virtual_cores": 12}"#,
        )
        .unwrap();
        let params = layout.to_params().unwrap();
        assert_eq!(params.system_cores().as_slice(), &[0, 1, 8, 9]);
        assert_eq!(params.virtual_cores(), 12);
    }

    #[test]
    fn test_parse_list_system_cores() {
        let layout = LayoutFile::from_json(
            r#"{"total_cores": 8, "system_cores": [1, 0], "virtual_cores": 6}"#,
        )
        .unwrap();
        assert_eq!(layout.threads_per_core, 1);
        assert_eq!(layout.io_threads, 0);
        let params = layout.to_params().unwrap();
        assert_eq!(params.system_cores().to_cpuset(), "1,0");
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        let result = LayoutFile::from_json(
            r#"{"total_cores": 8, "system_cores": [0], "virtual_cores": 2, "memory": 4}"#,
        );
        assert!(matches!(result, Err(PinError::MalformedInput { .. })));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let result = LayoutFile::from_json(r#"{"total_cores": 8}"#);
        assert!(matches!(result, Err(PinError::MalformedInput { .. })));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let layout = LayoutFile::from_json(
            r#"{"total_cores": 4, "system_cores": "0,4", "virtual_cores": 2}"#,
        )
        .unwrap();
        assert!(matches!(
            layout.to_params(),
            Err(PinError::InvalidParameter { .. })
        ));
    }
}
