use crate::compiler::{ConfigTree, LocationAction, LocationBlock, ServerBlock, SslBlock, UpstreamBlock};
use std::fmt::Write;

/// Первая строка каждого сгенерированного файла
pub const MANAGED_HEADER: &str = "# managed by adq-sitegen";

const INDENT: &str = "    ";

/// Превращает дерево конфигурации в текст для прокси сервера
pub trait ConfigRenderer: Send + Sync {
    fn render(&self, tree: &ConfigTree) -> String;
}

/// Рендерер в синтаксис nginx
#[derive(Debug, Clone, Default)]
pub struct NginxRenderer;

impl NginxRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigRenderer for NginxRenderer {
    fn render(&self, tree: &ConfigTree) -> String {
        let mut blocks = Vec::new();

        if let Some(upstream) = &tree.upstream {
            blocks.push(render_upstream(upstream));
        }
        if let Some(http) = &tree.http {
            blocks.push(render_server(http));
        }
        if let Some(https) = &tree.https {
            blocks.push(render_server(https));
        }

        let mut out = String::from(MANAGED_HEADER);
        out.push('\n');
        for block in blocks {
            out.push('\n');
            out.push_str(&block);
        }
        out
    }
}

fn render_upstream(upstream: &UpstreamBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "upstream {} {{", upstream.name);
    for server in &upstream.servers {
        let _ = writeln!(out, "{}server {};", INDENT, server.address);
    }
    out.push_str("}\n");
    out
}

fn render_server(server: &ServerBlock) -> String {
    let mut out = String::new();
    out.push_str("server {\n");

    let mut listen = server.listen.port.to_string();
    if server.listen.ssl {
        listen.push_str(" ssl");
    }
    if server.listen.http2 {
        listen.push_str(" http2");
    }
    let _ = writeln!(out, "{}listen {};", INDENT, listen);
    let _ = writeln!(out, "{}server_name {};", INDENT, server.server_names.join(" "));

    if let Some(ssl) = &server.ssl {
        out.push('\n');
        render_ssl(&mut out, ssl);
    }

    for location in &server.locations {
        out.push('\n');
        render_location(&mut out, location);
    }

    out.push_str("}\n");
    out
}

fn render_ssl(out: &mut String, ssl: &SslBlock) {
    let _ = writeln!(out, "{}ssl_certificate {};", INDENT, ssl.certificate);
    let _ = writeln!(out, "{}ssl_certificate_key {};", INDENT, ssl.certificate_key);

    let optional = [
        ("ssl_session_timeout", &ssl.session_timeout),
        ("ssl_protocols", &ssl.protocols),
        ("ssl_ciphers", &ssl.ciphers),
        ("ssl_session_cache", &ssl.session_cache),
    ];
    for (directive, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(out, "{}{} {};", INDENT, directive, value);
        }
    }

    let _ = writeln!(out, "{}ssl_prefer_server_ciphers {};", INDENT, on_off(ssl.prefer_server_ciphers));
    let _ = writeln!(out, "{}ssl_stapling {};", INDENT, on_off(ssl.stapling));
}

fn render_location(out: &mut String, location: &LocationBlock) {
    let _ = writeln!(out, "{}location {} {{", INDENT, location.path);
    match &location.action {
        LocationAction::Proxy { headers, proxy_pass } => {
            for header in headers {
                let _ = writeln!(out, "{0}{0}proxy_set_header {1} {2};", INDENT, header.name, header.value);
            }
            let _ = writeln!(out, "{0}{0}proxy_pass {1};", INDENT, proxy_pass);
        }
        LocationAction::Redirect(rule) => {
            let flag = if rule.permanent { " permanent" } else { "" };
            let _ = writeln!(out, "{0}{0}rewrite {1} {2}{3};", INDENT, rule.pattern, rule.replacement, flag);
        }
    }
    let _ = writeln!(out, "{}}}", INDENT);
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{build_proxy_location, build_redirect_location, ListenDirective, UpstreamServer};

    #[test]
    fn test_empty_tree_renders_header_only() {
        let text = NginxRenderer::new().render(&ConfigTree::default());
        assert_eq!(text, "# managed by adq-sitegen\n");
    }

    #[test]
    fn test_render_proxy_site() {
        let mut http = ServerBlock::new(ListenDirective::http(), vec!["a.com".to_string(), "www.a.com".to_string()]);
        http.locations.push(build_proxy_location("api_7"));

        let tree = ConfigTree {
            upstream: Some(UpstreamBlock {
                name: "api_7".to_string(),
                servers: vec![UpstreamServer {
                    address: "10.0.0.1".to_string(),
                }],
            }),
            http: Some(http),
            https: None,
        };

        let expected = "\
# managed by adq-sitegen

upstream api_7 {
    server 10.0.0.1;
}

server {
    listen 80;
    server_name a.com www.a.com;

    location / {
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header Host $host;
        proxy_pass http://api_7;
    }
}
";
        assert_eq!(NginxRenderer::new().render(&tree), expected);
    }

    #[test]
    fn test_render_https_with_redirect() {
        let mut http = ServerBlock::new(ListenDirective::http(), vec!["a.com".to_string()]);
        http.locations.push(build_redirect_location());

        let mut https = ServerBlock::new(ListenDirective::https(), vec!["a.com".to_string()]);
        https.ssl = Some(SslBlock {
            certificate: "/etc/ssl/a.crt".to_string(),
            certificate_key: "/etc/ssl/a.key".to_string(),
            session_timeout: Some("10m".to_string()),
            protocols: None,
            ciphers: Some("HIGH:!aNULL".to_string()),
            session_cache: None,
            prefer_server_ciphers: true,
            stapling: false,
        });

        let tree = ConfigTree {
            upstream: None,
            http: Some(http),
            https: Some(https),
        };

        let expected = "\
# managed by adq-sitegen

server {
    listen 80;
    server_name a.com;

    location / {
        rewrite ^/(.*) https://$server_name/$1 permanent;
    }
}

server {
    listen 443 ssl;
    server_name a.com;

    ssl_certificate /etc/ssl/a.crt;
    ssl_certificate_key /etc/ssl/a.key;
    ssl_session_timeout 10m;
    ssl_ciphers HIGH:!aNULL;
    ssl_prefer_server_ciphers on;
    ssl_stapling off;
}
";
        assert_eq!(NginxRenderer::new().render(&tree), expected);
    }
}
