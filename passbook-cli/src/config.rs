use anyhow::{bail, Context, Result};
use passbook_core::FALLBACK_CATEGORY;
use passbook_finance::{CategoryRule, CategoryRules, ExportOptions, OutputFormat};
use passbook_ingest::{AcquireOptions, Strategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_passbook_home;

/// `~/.passbook/config.toml`. Every key is optional; CLI flags override per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialect: String,
    pub strategy: Strategy,
    pub format: OutputFormat,
    pub include_transaction_id: bool,
    pub categorize: bool,
    pub excel_safe_ids: bool,
    pub fallback_category: String,

    /// Where decrypted copies are staged (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// Replaces the built-in rules; order is priority
    pub categories: Option<Vec<CategoryRule>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: "phonepe".to_string(),
            strategy: Strategy::Auto,
            format: OutputFormat::Csv,
            include_transaction_id: true,
            categorize: true,
            excel_safe_ids: true,
            fallback_category: FALLBACK_CATEGORY.to_string(),
            temp_dir: None,
            categories: None,
        }
    }
}

impl Config {
    pub fn category_rules(&self) -> CategoryRules {
        let rules = match &self.categories {
            Some(rules) => rules.clone(),
            None => CategoryRules::builtin().rules().to_vec(),
        };
        CategoryRules::new(rules, self.fallback_category.as_str())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            include_transaction_id: self.include_transaction_id,
            include_category: self.categorize,
            excel_safe_ids: self.excel_safe_ids,
        }
    }

    pub fn acquire_options(&self, password: Option<String>) -> AcquireOptions {
        AcquireOptions {
            password,
            temp_dir: self.temp_dir.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_passbook_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

/// Load `explicit` (must exist) or the default path (missing → defaults)
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("in {}", p.display()))
}

pub fn save_config(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write defaults, spelling out the built-in category rules so they can be edited
pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config {
        categories: Some(CategoryRules::builtin().rules().to_vec()),
        ..Config::default()
    };
    save_config(&cfg, &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let cfg = parse_config(
            r#"
dialect = "upi-generic"
strategy = "blob"
format = "xlsx"
excel_safe_ids = false

[[categories]]
label = "Pets"
keywords = ["PetShop", "vet"]

[[categories]]
label = "Groceries"
keywords = ["kirana"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.dialect, "upi-generic");
        assert_eq!(cfg.strategy, Strategy::Blob);
        assert_eq!(cfg.format, OutputFormat::Xlsx);
        assert!(!cfg.export_options().excel_safe_ids);
        assert!(cfg.include_transaction_id);

        let rules = cfg.category_rules();
        assert_eq!(rules.labels(), vec!["Pets", "Groceries", FALLBACK_CATEGORY]);
        assert_eq!(rules.categorize("City Vet Clinic"), "Pets");
    }

    #[test]
    fn test_fallback_category_applies_to_builtin_rules() {
        let cfg = parse_config(r#"fallback_category = "Other""#).unwrap();
        let rules = cfg.category_rules();
        assert_eq!(rules.categorize("Kirana Store"), "Groceries");
        assert_eq!(rules.categorize("Asha Sharma"), "Other");
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse_config(r#"strategy = "grid""#).is_err());
        assert!(parse_config(r#"format = "pdf""#).is_err());
    }

    #[test]
    fn test_init_config_writes_editable_rules() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        init_config(Some(p.as_path())).unwrap();

        let cfg = load_config(Some(p.as_path())).unwrap();
        assert_eq!(cfg.category_rules(), CategoryRules::builtin());

        // second run leaves the file alone
        fs::write(&p, "dialect = \"upi\"").unwrap();
        init_config(Some(p.as_path())).unwrap();
        assert_eq!(load_config(Some(p.as_path())).unwrap().dialect, "upi");
    }

    #[test]
    fn test_explicit_missing_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn test_acquire_options_carry_temp_dir() {
        let cfg = parse_config(r#"temp_dir = "/var/tmp/passbook""#).unwrap();
        let opts = cfg.acquire_options(Some("pw".to_string()));
        assert_eq!(opts.temp_dir, Some(PathBuf::from("/var/tmp/passbook")));
        assert_eq!(opts.password.as_deref(), Some("pw"));
    }
}
