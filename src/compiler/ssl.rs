use super::tree::SslBlock;
use crate::types::{Certificate, TlsPolicy};

/// Переносит сертификат и TLS политику в SSL блок один к одному
pub fn build_ssl_block(certificate: &Certificate, tls: &TlsPolicy) -> SslBlock {
    SslBlock {
        certificate: certificate.crt.clone(),
        certificate_key: certificate.crt_key.clone(),
        session_timeout: tls.session_timeout.clone(),
        protocols: tls.protocols.clone(),
        ciphers: tls.ciphers.clone(),
        session_cache: tls.session_cache.clone(),
        prefer_server_ciphers: tls.prefer_server_ciphers,
        stapling: tls.stapling,
    }
}
