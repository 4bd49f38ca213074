use super::tree::{UpstreamBlock, UpstreamServer};
use crate::types::Application;

/// Имя upstream пула: `{application.key}_{id}`
pub fn pool_name(application: &Application, definition_id: u64) -> String {
    format!("{}_{}", application.key, definition_id)
}

/// Собирает upstream пул из включенных узлов приложения.
///
/// Пул не строится без приложения или когда у приложения нет узлов вообще.
/// Если узлы есть, но все отключены, пул строится пустым: пустой пул
/// отличается от отсутствующего.
pub fn build_upstream(application: Option<&Application>, definition_id: u64) -> Option<UpstreamBlock> {
    let application = application.filter(|app| !app.targets.is_empty())?;

    let servers = application
        .targets
        .iter()
        .filter(|target| !target.disabled)
        .map(|target| UpstreamServer {
            address: target.host.clone(),
        })
        .collect();

    Some(UpstreamBlock {
        name: pool_name(application, definition_id),
        servers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComputeTarget;

    fn target(host: &str, disabled: bool) -> ComputeTarget {
        ComputeTarget {
            host: host.to_string(),
            disabled,
        }
    }

    #[test]
    fn test_no_application_no_pool() {
        assert!(build_upstream(None, 1).is_none());
    }

    #[test]
    fn test_application_without_targets_no_pool() {
        let app = Application {
            key: "api".to_string(),
            targets: Vec::new(),
        };
        assert!(build_upstream(Some(&app), 1).is_none());
    }

    #[test]
    fn test_disabled_targets_are_skipped_in_order() {
        let app = Application {
            key: "api".to_string(),
            targets: vec![
                target("10.0.0.3", false),
                target("10.0.0.1", true),
                target("10.0.0.2", false),
            ],
        };

        let pool = build_upstream(Some(&app), 12).unwrap();
        assert_eq!(pool.name, "api_12");
        assert_eq!(pool.addresses(), vec!["10.0.0.3", "10.0.0.2"]);
    }

    #[test]
    fn test_all_disabled_gives_empty_pool() {
        let app = Application {
            key: "web".to_string(),
            targets: vec![target("10.0.0.1", true), target("10.0.0.2", true)],
        };

        let pool = build_upstream(Some(&app), 3).unwrap();
        assert_eq!(pool.name, "web_3");
        assert!(pool.servers.is_empty());
    }
}
