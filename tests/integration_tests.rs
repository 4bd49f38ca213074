use std::fs;

use adq_sitegen::config::NginxConfig;
use adq_sitegen::{compile, Application, Certificate, ComputeTarget, NginxRenderer, ProxyDefinition, SiteManager, TlsPolicy};
use tempfile::tempdir;

// Интеграционные тесты: описание прокси -> файл сайта -> разбор файла

fn base_definition(id: u64) -> ProxyDefinition {
    ProxyDefinition {
        id,
        domains: vec!["a.com".to_string()],
        enable_http: false,
        enable_https: false,
        redirect_https: false,
        application: None,
        certificate: None,
        tls: TlsPolicy::default(),
    }
}

fn application(key: &str, targets: &[(&str, bool)]) -> Application {
    Application {
        key: key.to_string(),
        targets: targets
            .iter()
            .map(|(host, disabled)| ComputeTarget {
                host: host.to_string(),
                disabled: *disabled,
            })
            .collect(),
    }
}

#[test]
fn test_http_without_application() {
    let mut definition = base_definition(1);
    definition.enable_http = true;

    let tree = compile(&definition);

    assert!(tree.upstream.is_none());
    assert!(tree.https.is_none());
    assert!(tree.http.unwrap().locations.is_empty());
}

#[test]
fn test_redirect_with_unused_pool() {
    let mut definition = base_definition(2);
    definition.enable_http = true;
    definition.redirect_https = true;
    definition.application = Some(application("api", &[("10.0.0.1", false), ("10.0.0.2", false)]));

    let tree = compile(&definition);

    assert_eq!(tree.upstream.unwrap().addresses(), vec!["10.0.0.1", "10.0.0.2"]);
    let http = tree.http.unwrap();
    assert_eq!(http.locations.len(), 1);
    assert!(http.locations[0].is_redirect());
}

#[test]
fn test_https_with_partially_disabled_application() {
    let mut definition = base_definition(7);
    definition.enable_https = true;
    definition.certificate = Some(Certificate {
        crt: "/etc/ssl/a.com.crt".to_string(),
        crt_key: "/etc/ssl/a.com.key".to_string(),
    });
    definition.application = Some(application("api", &[("10.0.0.1", false), ("10.0.0.2", true)]));

    let tree = compile(&definition);

    let upstream = tree.upstream.unwrap();
    assert_eq!(upstream.name, "api_7");
    assert_eq!(upstream.addresses(), vec!["10.0.0.1"]);

    let https = tree.https.unwrap();
    assert_eq!(https.locations.len(), 1);
    assert_eq!(https.locations[0].proxy_pass(), Some("http://api_7"));
}

#[tokio::test]
async fn test_apply_and_check_site_configs() {
    let temp_dir = tempdir().unwrap();
    let sites_dir = temp_dir.path().join("sites-enabled");
    let manager = SiteManager::new(&sites_dir, Box::new(NginxRenderer::new()));

    let yaml = r#"
id: 7
domains: a.com www.a.com
enable_http: true
enable_https: true
redirect_https: true
application:
  key: api
  targets:
    - host: 10.0.0.1:8080
    - host: 10.0.0.2:8080
      disabled: true
certificate:
  crt: /etc/ssl/a.com.crt
  crtKey: /etc/ssl/a.com.key
tls:
  protocols: TLSv1.2 TLSv1.3
  session_timeout: 10m
  prefer_server_ciphers: true
"#;
    let definition_path = temp_dir.path().join("definition.yaml");
    fs::write(&definition_path, yaml).unwrap();
    let definition = ProxyDefinition::load_from_file(&definition_path).unwrap();

    let artifact = manager.on_create_or_update(&definition).await.unwrap();
    assert_eq!(artifact, sites_dir.join("7"));

    let site = NginxConfig::parse_config_file(&artifact).unwrap();
    assert!(site.check().is_empty());

    let upstream = site.get_upstream("api_7").unwrap();
    assert_eq!(upstream.servers, vec!["10.0.0.1:8080"]);

    assert_eq!(site.servers.len(), 2);
    let http = &site.servers[0];
    assert_eq!(http.server_names, vec!["a.com", "www.a.com"]);
    assert!(http.locations[0].rewrite.is_some());
    assert!(http.locations[0].proxy_pass.is_none());

    let https = &site.servers[1];
    assert!(https.listen_ports[0].ssl);
    assert_eq!(https.listen_ports[0].port, 443);
    assert_eq!(https.ssl_certificate.as_deref(), Some("/etc/ssl/a.com.crt"));
    assert_eq!(https.locations[0].proxy_pass.as_deref(), Some("http://api_7"));

    let content = fs::read_to_string(&artifact).unwrap();
    assert!(content.contains("ssl_protocols TLSv1.2 TLSv1.3;"));
    assert!(content.contains("ssl_session_timeout 10m;"));
    assert!(content.contains("ssl_prefer_server_ciphers on;"));
    assert!(content.contains("ssl_stapling off;"));
}

#[tokio::test]
async fn test_definitions_are_independent_files() {
    let temp_dir = tempdir().unwrap();
    let manager = SiteManager::new(temp_dir.path(), Box::new(NginxRenderer::new()));

    let mut first = base_definition(1);
    first.enable_http = true;
    first.application = Some(application("web", &[("10.0.0.1", false)]));

    let mut second = base_definition(2);
    second.domains = vec!["b.com".to_string()];
    second.enable_http = true;

    manager.on_create_or_update(&first).await.unwrap();
    manager.on_create_or_update(&second).await.unwrap();

    let merged = NginxConfig::load_from_sites_enabled(temp_dir.path()).unwrap();
    assert_eq!(merged.servers.len(), 2);
    assert!(merged.find_server("a.com").is_some());
    assert!(merged.find_server("b.com").is_some());

    assert!(manager.on_delete(1).await.unwrap());

    let remaining = NginxConfig::load_files(temp_dir.path()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].0.ends_with("2"));
}

#[tokio::test]
async fn test_definition_without_domains_writes_empty_site() {
    let temp_dir = tempdir().unwrap();
    let manager = SiteManager::new(temp_dir.path(), Box::new(NginxRenderer::new()));

    let mut definition = base_definition(9);
    definition.domains.clear();
    definition.enable_http = true;
    definition.application = Some(application("api", &[("10.0.0.1", false)]));

    let artifact = manager.on_create_or_update(&definition).await.unwrap();

    let site = NginxConfig::parse_config_file(&artifact).unwrap();
    assert!(site.servers.is_empty());
    assert!(site.upstreams.is_empty());
}
