//! MCP server handler
//!
//! [`RestaurantServer`] adapts the tools, resources and prompts of this crate
//! to `rmcp`. It holds nothing but the shared
//! [`RestaurantFinder`], so every request runs independently.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
    Implementation, ListPromptsResult, ListResourcesResult, PaginatedRequestParam,
    PromptMessage, PromptMessageRole, RawResource, ReadResourceRequestParam,
    ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router,
    ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Serialize;
use tracing::{info, warn};

use maat_lib::{FinderConfig, RestaurantFinder};

use crate::prompts;
use crate::resources::{
    resource_descriptors, KeywordsResource, NearbyResource, KEYWORDS_URI, NEARBY_URI,
};
use crate::tools::{FindRandomRestaurantTool, FindRestaurantsTool};
use crate::types::{FindRandomRestaurantInput, FindRestaurantsInput, RecommendationPromptArgs};
use crate::Error;

const INSTRUCTIONS: &str = "Finds restaurants near a place or near the user. \
Use 'find_restaurants' with the user's request (Korean or English), \
'find_random_restaurant' for a single pick, and the 'restaurants://keywords' \
resource to see which places and foods are understood.";

#[derive(Clone)]
pub struct RestaurantServer {
    finder: RestaurantFinder,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl RestaurantServer {
    pub fn new(finder: RestaurantFinder) -> Self {
        Self {
            finder,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    /// Build the server with the production provider clients.
    pub fn from_config(config: &FinderConfig) -> crate::Result<Self> {
        if !config.has_places_key() {
            warn!("KAKAO_API_KEY is not set; searches will fail until it is configured");
        }
        let finder = RestaurantFinder::from_config(config)?;
        info!(radius_m = config.search_radius_m, "MCP server state ready");
        Ok(Self::new(finder))
    }

    pub fn finder(&self) -> &RestaurantFinder {
        &self.finder
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[tool_router]
impl RestaurantServer {
    #[tool(
        description = "Find restaurants for a free-text request such as '강남역 초밥' or 'pizza near me'. Proximity phrases like '근처' or 'near me' search around the user and override any place name. Returns the search position and restaurants nearest first."
    )]
    pub async fn find_restaurants(
        &self,
        Parameters(input): Parameters<FindRestaurantsInput>,
    ) -> Result<CallToolResult, McpError> {
        match FindRestaurantsTool::execute(&self.finder, input).await {
            Ok(result) => json_result(&result),
            Err(e) => Ok(e.to_tool_result()),
        }
    }

    #[tool(
        description = "Recommend one random well-rated restaurant near the user, optionally limited to a category such as '일식' or 'cafe'."
    )]
    pub async fn find_random_restaurant(
        &self,
        Parameters(input): Parameters<FindRandomRestaurantInput>,
    ) -> Result<CallToolResult, McpError> {
        let mut rng = StdRng::from_entropy();
        match FindRandomRestaurantTool::execute(&self.finder, input, &mut rng).await {
            Ok(restaurant) => json_result(&restaurant),
            Err(e) => Ok(e.to_tool_result()),
        }
    }
}

#[prompt_router]
impl RestaurantServer {
    #[prompt(
        name = "restaurant_recommendation",
        description = "Guide the assistant through recommending restaurants for a request"
    )]
    async fn restaurant_recommendation(
        &self,
        Parameters(args): Parameters<RecommendationPromptArgs>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let text = prompts::restaurant_recommendation(&args)?;
        Ok(GetPromptResult {
            description: Some(format!("Restaurant recommendation for '{}'", args.query)),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for RestaurantServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = resource_descriptors()
            .into_iter()
            .map(|descriptor| {
                let mut raw = RawResource::new(descriptor.uri, descriptor.title);
                raw.description = Some(descriptor.description.to_string());
                raw.mime_type = Some("application/json".to_string());
                raw.no_annotation()
            })
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        let body = match uri.as_str() {
            NEARBY_URI => NearbyResource::read(&self.finder).await?,
            KEYWORDS_URI => KeywordsResource::read(self.finder.interpreter().policy()).await?,
            _ => return Err(Error::unknown_resource(uri).into()),
        };
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(body, uri)],
        })
    }
}
