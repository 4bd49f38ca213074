use tracing::{info, error};
use tracing_subscriber::EnvFilter;
use serde_json::json;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use crate::config::{LoggingConfig, LogConfig};

/// Инициализирует систему логирования
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG имеет приоритет над уровнем из конфига
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let result = if config.format == "json" {
        // JSON формат для production
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(false)
            .with_target(true)
            .try_init()
    } else {
        // Обычный текстовый формат для разработки
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!("Logging initialized with level: {}, format: {}", config.level, config.format);
        }
        Err(_) => {
            // Логгер уже установлен, используем существующий
            eprintln!("Global logger already set, using existing configuration");
        }
    }

    Ok(())
}

/// Действие над файлом сайта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Write,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Write => "write",
            AuditAction::Delete => "delete",
        }
    }
}

/// Событие жизненного цикла сайта для журнала аудита
#[derive(Debug, Clone)]
pub struct AuditEvent<'a> {
    pub action: AuditAction,
    pub definition_id: u64,
    pub path: &'a Path,
    /// "written", "removed", "absent" или текст ошибки
    pub outcome: &'a str,
}

/// Журнал аудита: одна строка на каждую запись или удаление файла
#[derive(Debug, Clone)]
pub struct AuditLogger {
    config: LogConfig,
}

impl AuditLogger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// Записывает событие в журнал
    pub async fn log_event(&self, event: &AuditEvent<'_>) {
        if !self.config.enabled {
            return;
        }

        let line = self.format_event(event);
        if let Err(e) = self.write_to_file(&line).await {
            error!("Failed to write audit log: {}", e);
        }
    }

    fn format_event(&self, event: &AuditEvent<'_>) -> String {
        let timestamp = chrono::Utc::now().to_rfc3339();

        if self.config.format == "json" {
            json!({
                "timestamp": timestamp,
                "action": event.action.as_str(),
                "definition_id": event.definition_id,
                "path": event.path.display().to_string(),
                "outcome": event.outcome,
            }).to_string()
        } else {
            format!(
                "[{}] {} id={} path={} outcome={}",
                timestamp,
                event.action.as_str(),
                event.definition_id,
                event.path.display(),
                event.outcome
            )
        }
    }

    /// Дописывает строку в файл журнала
    async fn write_to_file(&self, line: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = Path::new(&self.config.path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)
            .await?;

        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
