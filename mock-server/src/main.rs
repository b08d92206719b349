use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "18083".to_string());
    let app_id = std::env::var("EMQX_APP_ID").unwrap_or_else(|_| "admin".to_string());
    let app_secret = std::env::var("EMQX_APP_SECRET").unwrap_or_else(|_| "public".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, app_id = %app_id, "mock EMQX admin API listening");

    let router = mock_server::app_with(&app_id, &app_secret, mock_server::demo_clients());
    mock_server::run(listener, router).await
}
