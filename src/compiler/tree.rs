/// Порт HTTP сервера
pub const HTTP_PORT: u16 = 80;
/// Порт HTTPS сервера
pub const HTTPS_PORT: u16 = 443;

/// Результат компиляции одного описания прокси
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    pub upstream: Option<UpstreamBlock>,
    pub http: Option<ServerBlock>,
    pub https: Option<ServerBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamBlock {
    pub name: String,
    pub servers: Vec<UpstreamServer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamServer {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerBlock {
    pub listen: ListenDirective,
    pub server_names: Vec<String>,
    pub ssl: Option<SslBlock>,
    pub locations: Vec<LocationBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListenDirective {
    pub port: u16,
    pub ssl: bool,
    pub http2: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationBlock {
    pub path: String,
    pub action: LocationAction,
}

/// Что делает location: проксирует или перенаправляет
#[derive(Debug, Clone, PartialEq)]
pub enum LocationAction {
    Proxy {
        headers: Vec<ProxyHeader>,
        proxy_pass: String,
    },
    Redirect(RewriteRule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProxyHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SslBlock {
    pub certificate: String,
    pub certificate_key: String,
    pub session_timeout: Option<String>,
    pub protocols: Option<String>,
    pub ciphers: Option<String>,
    pub session_cache: Option<String>,
    pub prefer_server_ciphers: bool,
    pub stapling: bool,
}

impl ConfigTree {
    /// Дерево без блоков
    pub fn is_empty(&self) -> bool {
        self.upstream.is_none() && self.http.is_none() && self.https.is_none()
    }
}

impl ServerBlock {
    pub fn new(listen: ListenDirective, server_names: Vec<String>) -> Self {
        Self {
            listen,
            server_names,
            ssl: None,
            locations: Vec::new(),
        }
    }
}

impl ListenDirective {
    pub fn http() -> Self {
        Self {
            port: HTTP_PORT,
            ssl: false,
            http2: false,
        }
    }

    pub fn https() -> Self {
        Self {
            port: HTTPS_PORT,
            ssl: true,
            http2: false,
        }
    }
}

impl LocationBlock {
    pub fn is_proxy(&self) -> bool {
        matches!(self.action, LocationAction::Proxy { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.action, LocationAction::Redirect(_))
    }

    /// Адрес proxy_pass, если это proxy location
    pub fn proxy_pass(&self) -> Option<&str> {
        match &self.action {
            LocationAction::Proxy { proxy_pass, .. } => Some(proxy_pass),
            LocationAction::Redirect(_) => None,
        }
    }
}

impl UpstreamBlock {
    pub fn addresses(&self) -> Vec<&str> {
        self.servers.iter().map(|s| s.address.as_str()).collect()
    }
}
