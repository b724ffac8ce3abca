use bench_runner::target;
use tracing::info;

const ADDR: &str = "0.0.0.0:8081";
const ENGINE: &str = "docker-native";

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    bench_runner::init_tracing();

    let listener = tokio::net::TcpListener::bind(ADDR).await?;
    info!(addr = ADDR, engine = ENGINE, "tax server running");
    axum::serve(listener, target::http_router(ENGINE)).await
}
