#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bookden_app::run(false).await
}
