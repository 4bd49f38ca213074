use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod nginx_parser;
pub use nginx_parser::*;

/// Каталог sites-enabled по умолчанию
pub const DEFAULT_SITES_DIR: &str = "/etc/adq-pingora/sites-enabled";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub version: u32,
    pub sites: SitesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SitesConfig {
    /// Каталог, куда пишутся файлы конфигурации (по одному на id)
    pub config_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub format: String, // json или text
    pub level: String,  // error, warn, info, debug, trace
    pub audit_log: LogConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Файл для textfile коллектора node_exporter
    pub textfile: String,
}

impl Config {
    /// Загружает конфигурацию из YAML файла
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Сохраняет конфигурацию в YAML файл
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Загружает nginx конфигурацию из каталога с сайтами
    pub fn load_sites(&self) -> Result<NginxConfig, Box<dyn std::error::Error>> {
        NginxConfig::load_from_sites_enabled(&self.sites.config_dir)
    }
}

impl Default for Config {
    /// Конфигурация по умолчанию
    fn default() -> Self {
        Self {
            version: 1,
            sites: SitesConfig {
                config_dir: DEFAULT_SITES_DIR.to_string(),
            },
            logging: LoggingConfig {
                format: "text".to_string(),
                level: "info".to_string(),
                audit_log: LogConfig {
                    enabled: false,
                    path: "/var/log/adq-sitegen/audit.log".to_string(),
                    format: "json".to_string(),
                },
                metrics: MetricsConfig {
                    enabled: false,
                    textfile: "/var/lib/adq-sitegen/metrics.prom".to_string(),
                },
            },
        }
    }
}
