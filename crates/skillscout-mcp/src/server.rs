use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use serde::Deserialize;
use skillscout_core::SkillEngine;
use skillscout_core::config::ServerConfig;
use skillscout_llm::any::AnyProvider;
use skillscout_skills::IndexError;

use crate::error::McpServerError;
use crate::format::{format_search_results, format_skill_list};

const INSTRUCTIONS: &str = "Semantic search over Agent Skills (SKILL.md documents). \
Call search_skills with a description of the task to get the most relevant skills \
with their full instructions. Call list_skills to see everything that is indexed.";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Description of the task you want to accomplish.
    pub task_description: String,
    /// Number of skills to return, from 1 to 20 with the default server
    /// settings. Defaults to 3 when omitted.
    #[serde(default)]
    #[schemars(range(min = 1, max = 20), extend("default" = 3))]
    pub top_k: Option<usize>,
}

/// Response shaping options taken from configuration.
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub max_content_chars: Option<usize>,
}

impl ResponseOptions {
    #[must_use]
    pub fn new(server: &ServerConfig, max_content_chars: Option<usize>) -> Self {
        Self {
            default_top_k: server.default_top_k,
            max_top_k: server.max_top_k,
            max_content_chars,
        }
    }

    fn resolve_top_k(&self, requested: Option<usize>) -> Result<usize, ErrorData> {
        let top_k = requested.unwrap_or(self.default_top_k);
        if (1..=self.max_top_k).contains(&top_k) {
            Ok(top_k)
        } else {
            Err(ErrorData::invalid_params(
                format!("top_k must be between 1 and {}, got {top_k}", self.max_top_k),
                None,
            ))
        }
    }
}

#[derive(Clone)]
pub struct SkillServer {
    engine: Arc<SkillEngine<AnyProvider>>,
    options: Arc<ResponseOptions>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SkillServer {
    #[must_use]
    pub fn new(engine: Arc<SkillEngine<AnyProvider>>, options: ResponseOptions) -> Self {
        Self {
            engine,
            options: Arc::new(options),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search for relevant Agent Skills based on a task description. Returns the \
most relevant skills with their full content, descriptions, and relevance scores. Use this \
when you need to find skills that can help accomplish a specific task."
    )]
    async fn search_skills(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self.search_text(&request).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List every indexed skill with its description and source.")]
    async fn list_skills(&self) -> Result<CallToolResult, ErrorData> {
        let text = format_skill_list(&self.engine.snapshot());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Validate `request`, run the search, and render the text response.
    ///
    /// # Errors
    ///
    /// `invalid_params` for a blank task or out-of-range `top_k`,
    /// `internal_error` if the search itself fails.
    pub async fn search_text(&self, request: &SearchRequest) -> Result<String, ErrorData> {
        let task = request.task_description.trim();
        if task.is_empty() {
            return Err(ErrorData::invalid_params(
                "task_description is required",
                None,
            ));
        }
        let top_k = self.options.resolve_top_k(request.top_k)?;

        tracing::debug!(top_k, "search_skills: {task}");
        let results = self
            .engine
            .search(task, top_k)
            .await
            .map_err(index_error_to_mcp)?;

        Ok(format_search_results(
            task,
            &results,
            self.options.max_content_chars,
        ))
    }
}

#[tool_handler]
impl ServerHandler for SkillServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn index_error_to_mcp(err: IndexError) -> ErrorData {
    tracing::error!("skill search failed: {err}");
    match err {
        IndexError::InvalidTopK => ErrorData::invalid_params(err.to_string(), None),
        _ => ErrorData::internal_error(err.to_string(), None),
    }
}

/// Serve `server` over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns an error if the MCP handshake fails or the service task panics.
pub async fn serve_stdio(server: SkillServer) -> Result<(), McpServerError> {
    tracing::info!("serving MCP on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| McpServerError::Initialize(e.to_string()))?;
    let reason = service.waiting().await?;
    tracing::info!("MCP session ended: {reason:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rmcp::model::ErrorCode;
    use skillscout_core::bootstrap::create_ingestor;
    use skillscout_core::config::Config;
    use skillscout_llm::mock::MockProvider;
    use skillscout_skills::source::resolve_sources;
    use skillscout_skills::{EmbeddingBasis, SourceConfig};

    use super::*;

    fn write_skill(dir: &Path, name: &str, description: &str, body: &str) {
        let skill_dir = dir.join(name);
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(
            skill_dir.join("SKILL.md"),
            format!("---\nname: {name}\ndescription: {description}\n---\n{body}"),
        )
        .unwrap();
    }

    async fn server(dir: &Path, max_content_chars: Option<usize>) -> SkillServer {
        let provider = AnyProvider::Mock(MockProvider::with_vocabulary([
            "protein", "plot", "sequence",
        ]));
        let engine = SkillEngine::new(
            provider,
            create_ingestor(&Config::default()),
            resolve_sources(&[SourceConfig::local(dir.display().to_string())]),
            EmbeddingBasis::Description,
        );
        engine.reload().await.unwrap();
        SkillServer::new(
            Arc::new(engine),
            ResponseOptions::new(&ServerConfig::default(), max_content_chars),
        )
    }

    fn request(task: &str, top_k: Option<usize>) -> SearchRequest {
        SearchRequest {
            task_description: task.into(),
            top_k,
        }
    }

    #[test]
    fn top_k_schema_advertises_bounds_and_default() {
        let schema = serde_json::to_value(schemars::schema_for!(SearchRequest)).unwrap();
        let top_k = &schema["properties"]["top_k"];
        let text = top_k.to_string();
        assert!(text.contains("\"minimum\":1"), "{text}");
        assert!(text.contains("\"maximum\":20"), "{text}");
        assert_eq!(top_k["default"], 3);

        let defaults = ServerConfig::default();
        assert_eq!(defaults.default_top_k, 3);
        assert_eq!(defaults.max_top_k, 20);
    }

    #[tokio::test]
    async fn search_renders_ranked_results() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "folding", "protein structure", "fold body");
        write_skill(dir.path(), "charts", "plot figures", "chart body");

        let server = server(dir.path(), None).await;
        let text = server
            .search_text(&request("plot a protein plot", Some(2)))
            .await
            .unwrap();

        assert!(text.starts_with("Found 2 relevant skill(s) for: 'plot a protein plot'"));
        assert!(text.find("Skill 1: charts").unwrap() < text.find("Skill 2: folding").unwrap());
    }

    #[tokio::test]
    async fn default_top_k_applies() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c", "d"] {
            write_skill(dir.path(), name, "protein", "");
        }
        let server = server(dir.path(), None).await;
        let text = server.search_text(&request("protein", None)).await.unwrap();
        assert!(text.starts_with("Found 3 relevant skill(s)"));
    }

    #[tokio::test]
    async fn content_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "long", "sequence tools", &"y".repeat(200));
        let server = server(dir.path(), Some(20)).await;
        let text = server.search_text(&request("sequence", Some(1))).await.unwrap();
        assert!(text.contains("[... content truncated, see full skill at "));
        assert!(!text.contains(&"y".repeat(21)));
    }

    #[tokio::test]
    async fn empty_index_reports_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), None).await;
        let text = server.search_text(&request("anything", None)).await.unwrap();
        assert_eq!(text, crate::format::NO_RESULTS);
    }

    #[tokio::test]
    async fn blank_task_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), None).await;
        let err = server.search_text(&request("   ", None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn out_of_range_top_k_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path(), None).await;
        for top_k in [0, 21] {
            let err = server
                .search_text(&request("protein", Some(top_k)))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        }
    }

    #[test]
    fn index_errors_map_to_internal_error() {
        let err = index_error_to_mcp(IndexError::DimensionMismatch {
            expected: 3,
            actual: 2,
        });
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn search_request_deserializes_without_top_k() {
        let req: SearchRequest =
            serde_json::from_str(r#"{"task_description": "analyze data"}"#).unwrap();
        assert_eq!(req.task_description, "analyze data");
        assert!(req.top_k.is_none());
    }

    #[tokio::test]
    async fn server_info_enables_tools() {
        let dir = tempfile::tempdir().unwrap();
        let info = server(dir.path(), None).await.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("search_skills"));
    }
}
