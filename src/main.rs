use anyhow::Result;
use tenant_scope::{RewriteConfig, infra::logging};

fn main() -> Result<()> {
    logging::init();

    // Paths and literals are fixed; the tool takes no arguments
    let config = RewriteConfig::default();
    tenant_scope::run(&config)?;

    Ok(())
}
