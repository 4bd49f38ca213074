use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Описание прокси для одного приложения за балансировщиком
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProxyDefinition {
    pub id: u64,
    /// Домены виртуального хоста; пустой список - ничего не генерируем
    #[serde(default, deserialize_with = "deserialize_domains")]
    pub domains: Vec<String>,
    #[serde(default, alias = "enableHttp")]
    pub enable_http: bool,
    #[serde(default, alias = "enableHttps")]
    pub enable_https: bool,
    #[serde(default, alias = "redirectHttps")]
    pub redirect_https: bool,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub certificate: Option<Certificate>,
    #[serde(default)]
    pub tls: TlsPolicy,
}

/// Приложение и его вычислительные узлы (порядок важен)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Application {
    pub key: String,
    #[serde(default)]
    pub targets: Vec<ComputeTarget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComputeTarget {
    pub host: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Сертификат: значения передаются в конфиг как есть
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Certificate {
    pub crt: String,
    #[serde(alias = "crtKey")]
    pub crt_key: String,
}

/// TLS политика. Компилятор не проверяет значения.
/// Поля принимаются и в snake_case, и в camelCase
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TlsPolicy {
    pub ciphers: Option<String>,
    pub protocols: Option<String>,
    #[serde(alias = "sessionCache")]
    pub session_cache: Option<String>,
    #[serde(alias = "sessionTimeout")]
    pub session_timeout: Option<String>,
    #[serde(default, alias = "preferServerCiphers")]
    pub prefer_server_ciphers: bool,
    #[serde(default)]
    pub stapling: bool,
}

impl ProxyDefinition {
    /// Загружает описание прокси из YAML файла
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let definition: ProxyDefinition = serde_yaml::from_str(&content)?;
        Ok(definition)
    }

    /// Есть ли хотя бы один домен
    pub fn has_domains(&self) -> bool {
        !self.domains.is_empty()
    }
}

/// Домены можно задать строкой "a.com www.a.com" или списком
fn deserialize_domains<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Domains {
        Single(String),
        List(Vec<String>),
    }

    let domains = match Option::<Domains>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Domains::Single(s)) => s.split_whitespace().map(|d| d.to_string()).collect(),
        Some(Domains::List(list)) => list
            .iter()
            .flat_map(|d| d.split_whitespace())
            .map(|d| d.to_string())
            .collect(),
    };

    Ok(domains)
}
