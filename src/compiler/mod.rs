//! Компиляция описания прокси в дерево nginx конфигурации.
//!
//! Компилятор - чистая функция: не делает I/O, не хранит состояние
//! и не возвращает ошибок. Пустой результат тоже результат.

pub mod location;
pub mod ssl;
pub mod tree;
pub mod upstream;

pub use location::{build_proxy_location, build_redirect_location};
pub use ssl::build_ssl_block;
pub use tree::*;
pub use upstream::{build_upstream, pool_name};

use crate::types::ProxyDefinition;

/// Строит дерево конфигурации для описания прокси
pub fn compile(definition: &ProxyDefinition) -> ConfigTree {
    if !definition.has_domains() {
        return ConfigTree::default();
    }

    let upstream = build_upstream(definition.application.as_ref(), definition.id);
    let pool = upstream.as_ref().map(|u| u.name.as_str());

    let http = definition
        .enable_http
        .then(|| compile_http(definition, pool));

    let https = match (&definition.certificate, definition.enable_https) {
        (Some(certificate), true) => {
            let mut server = ServerBlock::new(ListenDirective::https(), definition.domains.clone());
            server.ssl = Some(build_ssl_block(certificate, &definition.tls));
            server.locations = pool.map(build_proxy_location).into_iter().collect();
            Some(server)
        }
        // без сертификата HTTPS блок молча пропускается
        _ => None,
    };

    ConfigTree {
        upstream,
        http,
        https,
    }
}

fn compile_http(definition: &ProxyDefinition, pool: Option<&str>) -> ServerBlock {
    let location = if definition.redirect_https {
        Some(build_redirect_location())
    } else {
        pool.map(build_proxy_location)
    };

    let mut server = ServerBlock::new(ListenDirective::http(), definition.domains.clone());
    server.locations = location.into_iter().collect();
    server
}
