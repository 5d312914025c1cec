use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::state::MesonLanguageServer;

pub async fn run() {
    let filter = EnvFilter::try_from_env("MESONLSP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MesonLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
