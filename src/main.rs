use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    perceive::cli::run().await
}
