use crate::core::rates::PricingPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{CargoError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub functions_url: Option<String>,
    pub catalog_path: Option<String>,
    pub timeout_seconds: u64,
    pub pricing: PricingPolicy,
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| CargoError::InvalidConfigValueError {
            field: key.to_string(),
            value: raw.clone(),
            reason: "Could not parse value".to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let catalog_path = env::var("CATALOG_PATH").ok();
        // 有本地目錄時資料庫設定可省略
        let required = |key: &str| -> Result<String> {
            match env::var(key) {
                Ok(value) => Ok(value),
                Err(_) if catalog_path.is_some() => Ok(String::new()),
                Err(_) => Err(CargoError::ConfigError {
                    message: format!("{} environment variable is required", key),
                }),
            }
        };

        let defaults = PricingPolicy::default();
        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_key: required("SUPABASE_ANON_KEY")?,
            functions_url: env::var("CAPACITY_FUNCTIONS_URL").ok(),
            timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS", 10)?,
            pricing: PricingPolicy {
                dimensional_divisor: parse_var("DIMENSIONAL_DIVISOR", defaults.dimensional_divisor)?,
                insurance_free_coverage: parse_var(
                    "INSURANCE_FREE_COVERAGE",
                    defaults.insurance_free_coverage,
                )?,
                insurance_rate: parse_var("INSURANCE_RATE", defaults.insurance_rate)?,
                insurance_minimum: parse_var("INSURANCE_MINIMUM", defaults.insurance_minimum)?,
                handling_fee: parse_var("HANDLING_FEE", defaults.handling_fee)?,
            },
            catalog_path,
        })
    }
}

impl LambdaConfig {
    /// 檢查資料庫連線設定，不論是否使用本地目錄
    pub fn validate_datastore(&self) -> Result<()> {
        validate_url("SUPABASE_URL", &self.supabase_url)?;
        validate_non_empty_string("SUPABASE_ANON_KEY", &self.supabase_key)
    }
}

impl ConfigProvider for LambdaConfig {
    fn supabase_url(&self) -> &str {
        &self.supabase_url
    }

    fn supabase_key(&self) -> &str {
        &self.supabase_key
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn catalog_path(&self) -> Option<&str> {
        self.catalog_path.as_deref()
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        validate_range("REQUEST_TIMEOUT_SECONDS", self.timeout_seconds, 1, 60)?;

        match &self.catalog_path {
            Some(path) => validate_path("CATALOG_PATH", path)?,
            None => self.validate_datastore()?,
        }

        if let Some(url) = &self.functions_url {
            validate_url("CAPACITY_FUNCTIONS_URL", url)?;
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LambdaConfig {
        LambdaConfig {
            supabase_url: "https://abc.supabase.co".to_string(),
            supabase_key: "anon".to_string(),
            functions_url: None,
            catalog_path: None,
            timeout_seconds: 10,
            pricing: PricingPolicy::default(),
        }
    }

    #[test]
    fn test_lambda_config_validation() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.timeout_seconds = 0;
        assert!(bad.validate().is_err());

        let mut no_key = config();
        no_key.supabase_key = "  ".to_string();
        assert!(no_key.validate().is_err());

        let mut local = no_key.clone();
        local.supabase_url = String::new();
        local.catalog_path = Some("/var/task/destinations.csv".to_string());
        assert!(local.validate().is_ok());
    }

    #[test]
    fn test_datastore_required_even_with_catalog() {
        let mut local = config();
        local.supabase_url = String::new();
        local.supabase_key = String::new();
        local.catalog_path = Some("/var/task/destinations.csv".to_string());
        assert!(local.validate().is_ok());

        let err = local.validate_datastore().unwrap_err();
        assert!(matches!(err, CargoError::InvalidConfigValueError { ref field, .. } if field == "SUPABASE_URL"));

        local.supabase_url = "https://abc.supabase.co".to_string();
        assert!(local.validate_datastore().is_err());

        local.supabase_key = "anon".to_string();
        assert!(local.validate_datastore().is_ok());
    }
}
