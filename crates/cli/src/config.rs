use crate::error::CliError;
use connectors::rest::WarehouseProfile;
use serde::Deserialize;
use std::path::PathBuf;

/// CLI configuration, read from `~/.tideway/config.toml` unless a path is
/// given on the command line.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub warehouse: WarehouseProfile,
    pub metadata: MetadataSettings,
}

#[derive(Debug, Deserialize)]
pub struct MetadataSettings {
    /// Schema holding the PROCESS and PROCESS_CMD tables.
    pub schema: String,
}

impl Settings {
    pub fn load(path: Option<&str>) -> Result<Self, CliError> {
        let path = match path {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or(CliError::HomeDirectory)?
                .join(".tideway/config.toml"),
        };
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn settings_parse_from_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
            [warehouse]
            base_url = "https://acme.example.com"
            token = "secret"
            database = "ANALYTICS"
            schema = "PUBLIC"
            warehouse = "LOAD_WH"
            role = "ETL"

            [metadata]
            schema = "TW_MD_SCHEMA"
            "#
        )
        .expect("write config");

        let settings = Settings::load(file.path().to_str()).expect("load settings");
        assert_eq!(settings.warehouse.database, "ANALYTICS");
        assert_eq!(settings.metadata.schema, "TW_MD_SCHEMA");
    }
}
