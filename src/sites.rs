//! Жизненный цикл файлов сайтов: компиляция, запись и удаление.
//!
//! Вызывается после того, как хранилище уже сохранило описание прокси.
//! Ошибка записи или удаления файла не откатывает изменение в хранилище,
//! поэтому вызывающий код должен сообщать об этих результатах раздельно.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::compiler::compile;
use crate::logging::{AuditAction, AuditEvent, AuditLogger};
use crate::metrics::{ARTIFACT_DELETES, ARTIFACT_WRITES, COMPILES_TOTAL, RENDER_DURATION};
use crate::render::ConfigRenderer;
use crate::types::ProxyDefinition;

/// Ошибки ввода-вывода при работе с файлами сайтов
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to create config directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write site config {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to delete site config {}: {source}", .path.display())]
    Delete { path: PathBuf, source: io::Error },
}

impl SiteError {
    pub fn path(&self) -> &Path {
        match self {
            SiteError::CreateDir { path, .. }
            | SiteError::Write { path, .. }
            | SiteError::Delete { path, .. } => path.as_path(),
        }
    }
}

/// Управляет файлами `{config_dir}/{id}` для описаний прокси
pub struct SiteManager {
    config_dir: PathBuf,
    renderer: Box<dyn ConfigRenderer>,
    audit: Option<AuditLogger>,
    /// Блокировки по id: операции над одним файлом идут по очереди
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl SiteManager {
    pub fn new<P: Into<PathBuf>>(config_dir: P, renderer: Box<dyn ConfigRenderer>) -> Self {
        Self {
            config_dir: config_dir.into(),
            renderer,
            audit: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_audit_log(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Путь к файлу сайта: id без расширения
    pub fn artifact_path(&self, definition_id: u64) -> PathBuf {
        self.config_dir.join(definition_id.to_string())
    }

    /// Компилирует описание и перезаписывает файл сайта
    pub async fn on_create_or_update(&self, definition: &ProxyDefinition) -> Result<PathBuf, SiteError> {
        let lock = self.lock_for(definition.id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(definition).await
        };
        self.release_lock(definition.id, lock).await;
        result
    }

    /// Удаляет файл сайта. `Ok(false)` - файла не было
    pub async fn on_delete(&self, definition_id: u64) -> Result<bool, SiteError> {
        let lock = self.lock_for(definition_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.delete_locked(definition_id).await
        };
        self.release_lock(definition_id, lock).await;
        result
    }

    async fn apply_locked(&self, definition: &ProxyDefinition) -> Result<PathBuf, SiteError> {
        let tree = compile(definition);
        COMPILES_TOTAL.inc();

        let started = Instant::now();
        let text = self.renderer.render(&tree);
        RENDER_DURATION.observe(started.elapsed().as_secs_f64());

        let path = self.artifact_path(definition.id);
        let result = self.write_artifact(&path, &text).await;

        match &result {
            Ok(()) => {
                ARTIFACT_WRITES.with_label_values(&["ok"]).inc();
                info!("Wrote site config for definition {} to {}", definition.id, path.display());
                self.audit(AuditAction::Write, definition.id, &path, "written").await;
            }
            Err(e) => {
                ARTIFACT_WRITES.with_label_values(&["error"]).inc();
                warn!("Site config for definition {} not applied: {}", definition.id, e);
                self.audit(AuditAction::Write, definition.id, &path, &e.to_string()).await;
            }
        }

        result.map(|_| path)
    }

    async fn delete_locked(&self, definition_id: u64) -> Result<bool, SiteError> {
        let path = self.artifact_path(definition_id);
        let result = self.delete_artifact(&path).await;

        let outcome = match &result {
            Ok(true) => "removed".to_string(),
            Ok(false) => "absent".to_string(),
            Err(e) => e.to_string(),
        };
        let label = match &result {
            Ok(true) => "removed",
            Ok(false) => "absent",
            Err(_) => "error",
        };
        ARTIFACT_DELETES.with_label_values(&[label]).inc();

        match &result {
            Ok(true) => info!("Removed site config for definition {} at {}", definition_id, path.display()),
            Ok(false) => debug!("No site config for definition {} at {}", definition_id, path.display()),
            Err(e) => warn!("Site config for definition {} not removed: {}", definition_id, e),
        }
        self.audit(AuditAction::Delete, definition_id, &path, &outcome).await;

        result
    }

    async fn write_artifact(&self, path: &Path, text: &str) -> Result<(), SiteError> {
        tokio::fs::create_dir_all(&self.config_dir)
            .await
            .map_err(|source| SiteError::CreateDir { path: self.config_dir.clone(), source })?;

        tokio::fs::write(path, text)
            .await
            .map_err(|source| SiteError::Write { path: path.to_path_buf(), source })
    }

    async fn delete_artifact(&self, path: &Path) -> Result<bool, SiteError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| SiteError::Delete { path: path.to_path_buf(), source })?;
        if !exists {
            return Ok(false);
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            // файл удалили между проверкой и удалением
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SiteError::Delete { path: path.to_path_buf(), source }),
        }
    }

    async fn lock_for(&self, definition_id: u64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(definition_id).or_default().clone()
    }

    /// Убирает блокировку из карты, если ее больше никто не держит и не ждет
    async fn release_lock(&self, definition_id: u64, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().await;
        if locks.get(&definition_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&definition_id);
        }
    }

    async fn audit(&self, action: AuditAction, definition_id: u64, path: &Path, outcome: &str) {
        if let Some(audit) = &self.audit {
            audit.log_event(&AuditEvent { action, definition_id, path, outcome }).await;
        }
    }
}
