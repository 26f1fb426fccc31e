// Keeps the binary a one-liner; everything lives in the library so it
// can be tested.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crm_cli::run().await
}
