mod config;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env();
    let port = config.port;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        lids = config.lid_map.len(),
        "scene store configured"
    );

    let state = state::AppState::new(config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "tabletop listening");
    axum::serve(listener, app).await
}
