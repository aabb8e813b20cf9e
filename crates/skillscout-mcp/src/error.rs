#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    #[error("MCP initialization failed: {0}")]
    Initialize(String),

    #[error("MCP service task failed: {0}")]
    Service(#[from] tokio::task::JoinError),
}
