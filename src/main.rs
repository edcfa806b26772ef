#[tokio::main]
async fn main() {
    if let Err(err) = radreport::run().await {
        tracing::error!("analysis failed: {err}");
        std::process::exit(1);
    }
}
