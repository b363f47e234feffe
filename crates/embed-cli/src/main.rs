//! embed CLI entry point

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    embed_cli::run().await
}
