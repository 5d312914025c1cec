#[tokio::main]
async fn main() {
    meson_lsp::run().await;
}
