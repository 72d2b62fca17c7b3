// Bhavstore API server

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = bhavstore::run().await {
        tracing::error!("bhavstore failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
