pub mod compiler;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod sites;
pub mod types;

pub use compiler::{compile, ConfigTree};
pub use render::{ConfigRenderer, NginxRenderer};
pub use sites::{SiteError, SiteManager};
pub use types::{Application, Certificate, ComputeTarget, ProxyDefinition, TlsPolicy};
