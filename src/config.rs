//! Configuration document

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ledger::NamePolicy;
use crate::reconciliation::{NewRowPolicy, TOTALS_LABEL};
use crate::types::*;
use crate::utils::currency::CurrencyFormat;

/// Default location of the configuration document
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "POKERTAB_CONFIG";

fn default_workbook_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_totals_label() -> String {
    TOTALS_LABEL.to_string()
}

/// Settings for one installation of the tab updater
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Identifier of the balance sheet
    pub sheet_key: String,
    /// Directory holding the local workbook `<sheetKey>.csv`
    #[serde(default = "default_workbook_dir")]
    pub workbook_dir: PathBuf,
    /// How amounts are written to the sheet
    #[serde(default)]
    pub currency: CurrencyFormat,
    /// Which part of a ledger name line is the player name
    #[serde(default)]
    pub name_policy: NamePolicy,
    /// Initial owed/owing values for new players
    #[serde(default)]
    pub new_row_policy: NewRowPolicy,
    /// Label sitting directly above the totals row
    #[serde(default = "default_totals_label")]
    pub totals_label: String,
}

impl Config {
    /// Create a configuration with defaults for everything but the sheet key
    pub fn new(sheet_key: impl Into<String>) -> Self {
        Self {
            sheet_key: sheet_key.into(),
            workbook_dir: default_workbook_dir(),
            currency: CurrencyFormat::default(),
            name_policy: NamePolicy::default(),
            new_row_policy: NewRowPolicy::default(),
            totals_label: default_totals_label(),
        }
    }

    /// Parse a configuration document
    pub fn from_json(json: &str) -> TabResult<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| TabError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> TabResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TabError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Check the settings make sense together
    pub fn validate(&self) -> TabResult<()> {
        if self.sheet_key.trim().is_empty() {
            return Err(TabError::Config("sheetKey cannot be empty".to_string()));
        }

        if self.totals_label.trim().is_empty() {
            return Err(TabError::Config("totalsLabel cannot be empty".to_string()));
        }

        if Some(self.currency.decimal_separator) == self.currency.grouping_separator {
            return Err(TabError::Config(
                "currency decimal and grouping separators must differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the local workbook backing the sheet
    pub fn workbook_path(&self) -> PathBuf {
        self.workbook_dir.join(format!("{}.csv", self.sheet_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_json(r#"{ "sheetKey": "abc123" }"#).unwrap();

        assert_eq!(config, Config::new("abc123"));
        assert_eq!(config.totals_label, "SUM OF OWED/OWING:");
        assert_eq!(config.workbook_path(), PathBuf::from("./abc123.csv"));
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{
                "sheetKey": "tab",
                "workbookDir": "/srv/poker",
                "currency": { "symbol": "€", "decimalSeparator": ",", "groupingSeparator": "." },
                "namePolicy": "firstToken",
                "newRowPolicy": "delta",
                "totalsLabel": "TOTALS"
            }"#,
        )
        .unwrap();

        assert_eq!(config.name_policy, NamePolicy::FirstToken);
        assert_eq!(config.new_row_policy, NewRowPolicy::Delta);
        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.workbook_path(), PathBuf::from("/srv/poker/tab.csv"));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(Config::from_json("{}"), Err(TabError::Config(_))));
        assert!(matches!(
            Config::from_json(r#"{ "sheetKey": "  " }"#),
            Err(TabError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "sheetKey": "x", "currency": { "groupingSeparator": "." } }"#),
            Err(TabError::Config(_))
        ));
        assert!(matches!(
            Config::load("/definitely/not/here.json"),
            Err(TabError::Config(_))
        ));
    }
}
