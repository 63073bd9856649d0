use dotenvy::dotenv;
use imagine_gateway::config::GatewayConfig;
use imagine_gateway::startup::Application;
use service_core::observability::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = GatewayConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "imagine-gateway",
        "info",
        configuration.otlp_endpoint.as_deref(),
    );

    let app = Application::build(configuration).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    tracing::info!("Server running on http://localhost:{}", app.port());
    app.run_until_stopped().await?;

    Ok(())
}
