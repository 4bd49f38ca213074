use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use log::{info, warn, error};

use crate::compiler::ListenDirective;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*$").expect("valid comment regex"));
static SERVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"server\s*\{([^{}]*(?:\{[^{}]*\}[^{}]*)*)\}").expect("valid server regex")
});
static UPSTREAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"upstream\s+([\w.-]+)\s*\{([^{}]*)\}").expect("valid upstream regex")
});
static LISTEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"listen\s+([^;]+);").expect("valid listen regex"));
static SERVER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"server_name\s+([^;]+);").expect("valid server_name regex"));
static SSL_CERT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ssl_certificate\s+([^;]+);").expect("valid ssl_certificate regex"));
static SSL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ssl_certificate_key\s+([^;]+);").expect("valid ssl_certificate_key regex"));
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"location\s+([^\s{]+)\s*\{([^{}]*)\}").expect("valid location regex")
});
static PROXY_PASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"proxy_pass\s+([^;]+);").expect("valid proxy_pass regex"));
static REWRITE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"rewrite\s+([^;]+);").expect("valid rewrite regex"));
static UPSTREAM_SERVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"server\s+([^;]+);").expect("valid upstream server regex"));

/// Содержимое одного или нескольких файлов сайтов
#[derive(Debug, Clone, Default)]
pub struct NginxConfig {
    pub servers: Vec<ParsedServer>,
    pub upstreams: HashMap<String, ParsedUpstream>,
}

#[derive(Debug, Clone)]
pub struct ParsedServer {
    pub listen_ports: Vec<ListenDirective>,
    pub server_names: Vec<String>,
    pub ssl_certificate: Option<String>,
    pub ssl_certificate_key: Option<String>,
    pub locations: Vec<ParsedLocation>,
}

#[derive(Debug, Clone)]
pub struct ParsedLocation {
    pub path: String,
    pub proxy_pass: Option<String>,
    pub rewrite: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedUpstream {
    pub name: String,
    pub servers: Vec<String>,
}

/// Серьезность найденной проблемы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIssue {
    pub severity: Severity,
    pub message: String,
}

impl NginxConfig {
    /// Загружает все конфиги из директории sites-enabled в одну конфигурацию
    pub fn load_from_sites_enabled<P: AsRef<Path>>(sites_enabled_dir: P) -> Result<Self, Box<dyn std::error::Error>> {
        let mut merged = NginxConfig::default();

        for (path, config) in Self::load_files(sites_enabled_dir)? {
            info!("Loaded config from: {}", path.display());
            merged.servers.extend(config.servers);
            merged.upstreams.extend(config.upstreams);
        }

        Ok(merged)
    }

    /// Загружает конфиги по одному на файл, в порядке имен файлов
    pub fn load_files<P: AsRef<Path>>(sites_enabled_dir: P) -> Result<Vec<(PathBuf, Self)>, Box<dyn std::error::Error>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(sites_enabled_dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut configs = Vec::new();
        for path in paths {
            match Self::parse_config_file(&path) {
                Ok(config) => configs.push((path, config)),
                Err(e) => error!("Failed to parse config {}: {}", path.display(), e),
            }
        }

        Ok(configs)
    }

    /// Парсит один конфигурационный файл
    pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::parse_config_content(&content)
    }

    /// Парсит содержимое конфига
    pub fn parse_config_content(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut servers = Vec::new();
        let mut upstreams = HashMap::new();

        let content = Self::remove_comments(content);

        for cap in SERVER_RE.captures_iter(&content) {
            if let Some(server_content) = cap.get(1) {
                match Self::parse_server_block(server_content.as_str()) {
                    Ok(server) => servers.push(server),
                    Err(e) => warn!("Failed to parse server block: {}", e),
                }
            }
        }

        for cap in UPSTREAM_RE.captures_iter(&content) {
            if let (Some(name), Some(upstream_content)) = (cap.get(1), cap.get(2)) {
                let upstream = Self::parse_upstream_block(name.as_str(), upstream_content.as_str());
                upstreams.insert(upstream.name.clone(), upstream);
            }
        }

        Ok(NginxConfig { servers, upstreams })
    }

    /// Удаляет комментарии из конфига
    fn remove_comments(content: &str) -> String {
        content.lines()
            .map(|line| COMMENT_RE.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Парсит server блок
    fn parse_server_block(content: &str) -> Result<ParsedServer, Box<dyn std::error::Error>> {
        let mut listen_ports = Vec::new();
        let mut server_names = Vec::new();
        let mut locations = Vec::new();

        for cap in LISTEN_RE.captures_iter(content) {
            if let Some(listen_str) = cap.get(1) {
                listen_ports.push(Self::parse_listen_directive(listen_str.as_str())?);
            }
        }

        if let Some(names) = SERVER_NAME_RE.captures(content).and_then(|cap| cap.get(1)) {
            server_names = names.as_str()
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
        }

        let ssl_certificate = Self::capture_value(&SSL_CERT_RE, content);
        let ssl_certificate_key = Self::capture_value(&SSL_KEY_RE, content);

        for cap in LOCATION_RE.captures_iter(content) {
            if let (Some(path), Some(location_content)) = (cap.get(1), cap.get(2)) {
                locations.push(ParsedLocation {
                    path: path.as_str().to_string(),
                    proxy_pass: Self::capture_value(&PROXY_PASS_RE, location_content.as_str()),
                    rewrite: Self::capture_value(&REWRITE_RE, location_content.as_str()),
                });
            }
        }

        Ok(ParsedServer {
            listen_ports,
            server_names,
            ssl_certificate,
            ssl_certificate_key,
            locations,
        })
    }

    fn capture_value(re: &Regex, content: &str) -> Option<String> {
        re.captures(content)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Парсит listen директиву
    fn parse_listen_directive(listen_str: &str) -> Result<ListenDirective, Box<dyn std::error::Error>> {
        let parts: Vec<&str> = listen_str.split_whitespace().collect();
        let port_str = parts.first().ok_or("empty listen directive")?;

        let port = port_str.parse::<u16>()?;
        let ssl = parts.contains(&"ssl");
        let http2 = parts.contains(&"http2");

        Ok(ListenDirective { port, ssl, http2 })
    }

    /// Парсит upstream блок
    fn parse_upstream_block(name: &str, content: &str) -> ParsedUpstream {
        let servers = UPSTREAM_SERVER_RE.captures_iter(content)
            .filter_map(|cap| cap.get(1))
            .filter_map(|m| m.as_str().split_whitespace().next().map(|s| s.to_string()))
            .collect();

        ParsedUpstream {
            name: name.to_string(),
            servers,
        }
    }

    /// Находит server блок по host
    pub fn find_server(&self, host: &str) -> Option<&ParsedServer> {
        let host_without_port = host.split(':').next().unwrap_or(host);

        self.servers.iter().find(|server| {
            server.server_names.iter().any(|name| name == host_without_port)
        })
    }

    /// Получает upstream по имени
    pub fn get_upstream(&self, name: &str) -> Option<&ParsedUpstream> {
        self.upstreams.get(name)
    }

    /// Проверяет ссылки и SSL настройки (как nginx -t для одного файла)
    pub fn check(&self) -> Vec<SiteIssue> {
        let mut issues = Vec::new();

        for server in &self.servers {
            let names = server.server_names.join(", ");

            if server.server_names.is_empty() {
                issues.push(SiteIssue::warning("server block without server_name".to_string()));
            }

            if server.listen_ports.iter().any(|l| l.ssl) && server.ssl_certificate.is_none() {
                issues.push(SiteIssue::error(format!(
                    "ssl listener without ssl_certificate in server '{}'",
                    names
                )));
            }

            for location in &server.locations {
                if let Some(target) = &location.proxy_pass {
                    let upstream = target.strip_prefix("http://").unwrap_or(target);
                    if !self.upstreams.contains_key(upstream) {
                        issues.push(SiteIssue::error(format!(
                            "upstream '{}' not found for location '{}' in server '{}'",
                            upstream, location.path, names
                        )));
                    }
                }
            }
        }

        let mut upstream_names: Vec<&String> = self.upstreams.keys().collect();
        upstream_names.sort();
        for name in upstream_names {
            if self.upstreams[name].servers.is_empty() {
                issues.push(SiteIssue::warning(format!("upstream '{}' has no servers", name)));
            }
        }

        issues
    }
}

impl SiteIssue {
    pub fn error(message: String) -> Self {
        Self { severity: Severity::Error, message }
    }

    pub fn warning(message: String) -> Self {
        Self { severity: Severity::Warning, message }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
