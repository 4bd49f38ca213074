use super::tree::{LocationAction, LocationBlock, ProxyHeader, RewriteRule};

/// Корневой путь, единственный который генерируется
pub const ROOT_PATH: &str = "/";

/// Location, проксирующий запросы в upstream пул
pub fn build_proxy_location(pool_name: &str) -> LocationBlock {
    LocationBlock {
        path: ROOT_PATH.to_string(),
        action: LocationAction::Proxy {
            headers: vec![
                ProxyHeader {
                    name: "X-Real-IP".to_string(),
                    value: "$remote_addr".to_string(),
                },
                ProxyHeader {
                    name: "Host".to_string(),
                    value: "$host".to_string(),
                },
            ],
            proxy_pass: format!("http://{}", pool_name),
        },
    }
}

/// Location с постоянным редиректом на тот же путь по HTTPS
pub fn build_redirect_location() -> LocationBlock {
    LocationBlock {
        path: ROOT_PATH.to_string(),
        action: LocationAction::Redirect(RewriteRule {
            pattern: "^/(.*)".to_string(),
            replacement: "https://$server_name/$1".to_string(),
            permanent: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_location() {
        let location = build_proxy_location("api_7");

        assert_eq!(location.path, "/");
        assert!(location.is_proxy());
        assert_eq!(location.proxy_pass(), Some("http://api_7"));

        match &location.action {
            LocationAction::Proxy { headers, .. } => {
                let pairs: Vec<(&str, &str)> = headers
                    .iter()
                    .map(|h| (h.name.as_str(), h.value.as_str()))
                    .collect();
                assert_eq!(pairs, vec![("X-Real-IP", "$remote_addr"), ("Host", "$host")]);
            }
            other => panic!("expected proxy location, got {:?}", other),
        }
    }

    #[test]
    fn test_redirect_location() {
        let location = build_redirect_location();

        assert_eq!(location.path, "/");
        assert!(location.is_redirect());
        assert_eq!(location.proxy_pass(), None);

        match &location.action {
            LocationAction::Redirect(rule) => {
                assert_eq!(rule.pattern, "^/(.*)");
                assert_eq!(rule.replacement, "https://$server_name/$1");
                assert!(rule.permanent);
            }
            other => panic!("expected redirect location, got {:?}", other),
        }
    }
}
