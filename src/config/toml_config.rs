use crate::core::rates::PricingPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{CargoError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub supabase: SupabaseConfig,
    pub catalog: CatalogConfig,
    pub pricing: PricingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// 容量服務不與資料庫同址部署時的位置
    pub functions_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            functions_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 目的地 CSV 檔；設定後不再向資料庫查詢目的地
    pub path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CargoError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CargoError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 只從標準環境變數建立配置
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.supabase.url = std::env::var("SUPABASE_URL").ok();
        config.supabase.anon_key = std::env::var("SUPABASE_ANON_KEY").ok();
        config.catalog.path = std::env::var("CATALOG_PATH").ok();
        config
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CargoError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn uses_local_catalog(&self) -> bool {
        self.catalog.path.is_some()
    }
}

fn unresolved(value: &str) -> bool {
    value.contains("${")
}

impl ConfigProvider for TomlConfig {
    fn supabase_url(&self) -> &str {
        self.supabase.url.as_deref().unwrap_or_default()
    }

    fn supabase_key(&self) -> &str {
        self.supabase.anon_key.as_deref().unwrap_or_default()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.supabase.timeout_seconds
    }

    fn catalog_path(&self) -> Option<&str> {
        self.catalog.path.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        validate_range("supabase.timeout_seconds", self.supabase.timeout_seconds, 1, 300)?;

        if let Some(path) = &self.catalog.path {
            validate_path("catalog.path", path)?;
            // 本地目錄模式下不需要資料庫設定
            if self.supabase.url.is_none() {
                return Ok(());
            }
        }

        let url = validate_required_field("supabase.url", &self.supabase.url)?;
        let key = validate_required_field("supabase.anon_key", &self.supabase.anon_key)?;
        for (field, value) in [("supabase.url", url), ("supabase.anon_key", key)] {
            if unresolved(value) {
                return Err(CargoError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.clone(),
                    reason: "Environment variable was not set".to_string(),
                });
            }
        }
        validate_url("supabase.url", url)?;
        validate_non_empty_string("supabase.anon_key", key)?;
        if let Some(functions_url) = &self.supabase.functions_url {
            validate_url("supabase.functions_url", functions_url)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
