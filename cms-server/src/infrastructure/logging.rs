use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// `RUST_LOG` имеет приоритет над `LOG_LEVEL` из настроек.
pub fn init_logging(default_level: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(default_level))
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
}

#[cfg(test)]
mod tests {
    use super::build_filter;

    #[test]
    fn directive_strings_are_accepted() {
        let filter = build_filter("cms_server=debug,tower_http=info");
        assert!(!filter.to_string().is_empty());
    }
}
