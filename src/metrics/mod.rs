use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec,
    Encoder, Histogram, IntCounter, IntCounterVec, TextEncoder,
};
use log::info;
use std::path::Path;

/// Количество компиляций описаний прокси
pub static COMPILES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sitegen_compiles_total",
        "Total proxy definition compiles"
    )
    .expect("Failed to register sitegen_compiles_total metric")
});

/// Записи файлов сайтов по результату
pub static ARTIFACT_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sitegen_artifact_writes_total",
        "Total site artifact writes",
        &["result"]
    )
    .expect("Failed to register sitegen_artifact_writes_total metric")
});

/// Удаления файлов сайтов: removed, absent, error
pub static ARTIFACT_DELETES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sitegen_artifact_deletes_total",
        "Total site artifact deletes",
        &["result"]
    )
    .expect("Failed to register sitegen_artifact_deletes_total metric")
});

/// Длительность рендеринга конфигурации
pub static RENDER_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "sitegen_render_duration_seconds",
        "Config tree render duration in seconds"
    )
    .expect("Failed to register sitegen_render_duration_seconds metric")
});

/// Инициализация метрик
pub fn init_metrics() {
    Lazy::force(&COMPILES_TOTAL);
    Lazy::force(&ARTIFACT_WRITES);
    Lazy::force(&ARTIFACT_DELETES);
    Lazy::force(&RENDER_DURATION);

    info!("Prometheus metrics initialized");
    info!("Available metrics:");
    info!("  - sitegen_compiles_total");
    info!("  - sitegen_artifact_writes_total");
    info!("  - sitegen_artifact_deletes_total");
    info!("  - sitegen_render_duration_seconds");
}

/// Текстовое представление всех метрик реестра по умолчанию
pub fn gather_text() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Пишет метрики в файл для textfile коллектора
pub fn write_textfile<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, gather_text()?)?;
    Ok(())
}
