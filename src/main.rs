use log::{error, info, warn};
use clap::{Arg, Command};

use adq_sitegen::config::{Config, NginxConfig};
use adq_sitegen::logging::{init_logging, AuditLogger};
use adq_sitegen::metrics::{init_metrics, write_textfile};
use adq_sitegen::render::{ConfigRenderer, NginxRenderer};
use adq_sitegen::{compile, ProxyDefinition, SiteManager};

fn main() {
    // Парсим аргументы командной строки
    let matches = Command::new("adq-sitegen")
        .version("0.1.0")
        .about("ADQ sitegen - compiles proxy definitions into nginx-style site configs")
        .arg(Arg::new("test")
            .short('t')
            .long("test")
            .help("Test site configs in the config directory and exit")
            .action(clap::ArgAction::SetTrue))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Configuration file path")
            .default_value("/etc/adq-pingora/sitegen.yaml"))
        .arg(Arg::new("sites-dir")
            .long("sites-dir")
            .value_name("DIR")
            .help("Override the directory site configs are written to"))
        .arg(Arg::new("print")
            .long("print")
            .value_name("FILE")
            .help("Compile a proxy definition and print the rendered config"))
        .arg(Arg::new("apply")
            .long("apply")
            .value_name("FILE")
            .help("Compile a proxy definition and write its site config"))
        .arg(Arg::new("delete")
            .long("delete")
            .value_name("ID")
            .value_parser(clap::value_parser!(u64))
            .help("Remove the site config of a proxy definition"))
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .cloned()
        .unwrap_or_default();
    let mut config = Config::load_from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load config from {}: {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    if let Some(dir) = matches.get_one::<String>("sites-dir") {
        config.sites.config_dir = dir.clone();
    }

    // Инициализируем структурированное логирование
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}, falling back to env_logger", e);
        env_logger::init();
    }

    if matches.get_flag("test") {
        test_configuration(&config);
        return;
    }

    if let Some(path) = matches.get_one::<String>("print") {
        match ProxyDefinition::load_from_file(path) {
            Ok(definition) => print!("{}", NginxRenderer::new().render(&compile(&definition))),
            Err(e) => {
                error!("Failed to load proxy definition {}: {}", path, e);
                std::process::exit(1);
            }
        }
        return;
    }

    let apply = matches.get_one::<String>("apply");
    let delete = matches.get_one::<u64>("delete");
    if apply.is_none() && delete.is_none() {
        warn!("Nothing to do: pass --apply, --delete, --print or --test");
        return;
    }

    init_metrics();

    let mut manager = SiteManager::new(&config.sites.config_dir, Box::new(NginxRenderer::new()));
    if config.logging.audit_log.enabled {
        manager = manager.with_audit_log(AuditLogger::new(config.logging.audit_log.clone()));
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut failed = false;
    rt.block_on(async {
        if let Some(path) = apply {
            let definition = match ProxyDefinition::load_from_file(path) {
                Ok(definition) => definition,
                Err(e) => {
                    error!("Failed to load proxy definition {}: {}", path, e);
                    failed = true;
                    return;
                }
            };

            // Файл сайта применяется отдельно от сохранения в хранилище
            match manager.on_create_or_update(&definition).await {
                Ok(artifact) => info!("Definition {} applied: {}", definition.id, artifact.display()),
                Err(e) => {
                    error!("Definition {} saved but not applied: {}", definition.id, e);
                    failed = true;
                }
            }
        }

        if let Some(id) = delete {
            match manager.on_delete(*id).await {
                Ok(true) => info!("Definition {} site config removed", id),
                Ok(false) => info!("Definition {} had no site config", id),
                Err(e) => {
                    error!("Definition {} deleted but site config not removed: {}", id, e);
                    failed = true;
                }
            }
        }
    });

    if config.logging.metrics.enabled {
        if let Err(e) = write_textfile(&config.logging.metrics.textfile) {
            warn!("Failed to write metrics to {}: {}", config.logging.metrics.textfile, e);
        }
    }

    if failed {
        std::process::exit(1);
    }
}

/// Функция проверки конфигурации (как nginx -t)
fn test_configuration(config: &Config) {
    let sites_dir = &config.sites.config_dir;
    println!("adq-sitegen: testing site configs in {}...", sites_dir);

    let mut errors = 0;
    let mut warnings = 0;

    match NginxConfig::load_files(sites_dir) {
        Ok(files) => {
            println!("adq-sitegen: found {} site config(s)", files.len());

            for (path, site) in &files {
                println!("adq-sitegen: testing {} ({} server(s), {} upstream(s))",
                         path.display(),
                         site.servers.len(),
                         site.upstreams.len());

                for issue in site.check() {
                    if issue.is_error() {
                        println!("adq-sitegen: [error] {}: {}", path.display(), issue.message);
                        errors += 1;
                    } else {
                        println!("adq-sitegen: [warn] {}: {}", path.display(), issue.message);
                        warnings += 1;
                    }
                }
            }
        }
        Err(e) => {
            println!("adq-sitegen: [error] cannot read {}: {}", sites_dir, e);
            errors += 1;
        }
    }

    // Выводим результат
    if errors > 0 {
        println!("adq-sitegen: site config test failed");
        std::process::exit(1);
    } else if warnings > 0 {
        println!("adq-sitegen: site config test is successful (with {} warning(s))", warnings);
    } else {
        println!("adq-sitegen: site config test is successful");
    }
}
