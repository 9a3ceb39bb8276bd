use lark_core::{ApiRequest, EmptyData, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{required, PageQuery};
use crate::client::Scope;

/// A knowledge space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub space_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `team` or `person`.
    pub space_type: Option<String>,
    /// `public` or `private`.
    pub visibility: Option<String>,
    pub open_sharing: Option<String>,
}

/// A node in a space's tree. Each node wraps one cloud document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub space_id: Option<String>,
    pub node_token: Option<String>,
    pub obj_token: Option<String>,
    /// `doc`, `docx`, `sheet`, `mindnote`, `bitable`, `file`, `slides`.
    pub obj_type: Option<String>,
    pub parent_node_token: Option<String>,
    /// `origin` or `shortcut`.
    pub node_type: Option<String>,
    pub origin_node_token: Option<String>,
    pub origin_space_id: Option<String>,
    pub has_child: Option<bool>,
    pub title: Option<String>,
    pub obj_create_time: Option<String>,
    pub obj_edit_time: Option<String>,
    pub node_create_time: Option<String>,
    pub creator: Option<String>,
    pub owner: Option<String>,
    pub node_creator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    /// `openchat`, `userid`, `email`, `opendepartmentid`, `openid`, `unionid`.
    pub member_type: String,
    pub member_id: String,
    /// `admin` or `member`.
    pub member_role: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_setting: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSpaceBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_sharing: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNodeBody {
    pub obj_type: String,
    /// `origin` or `shortcut`.
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_node_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveNodeBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_parent_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_space_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyNodeBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_parent_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_space_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveDocsToWikiBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_wiki_token: Option<String>,
    pub obj_type: String,
    pub obj_token: String,
    /// Submit a move request to the document owner when the app lacks permission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MoveDocsToWikiResult {
    /// Set when the move completed synchronously.
    pub wiki_token: Option<String>,
    /// Set when the move runs as an async task; poll with [`Wiki::get_task`].
    pub task_id: Option<String>,
    pub applied: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MoveResult {
    pub node: Option<Node>,
    pub status: Option<i32>,
    pub status_msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WikiTask {
    pub task_id: Option<String>,
    #[serde(default)]
    pub move_result: Vec<MoveResult>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchNodesBody {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchedNode {
    pub node_id: Option<String>,
    pub space_id: Option<String>,
    pub parent_id: Option<String>,
    pub obj_type: Option<i32>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub obj_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListNodesQuery {
    pub page: PageQuery,
    /// List children of this node; the space root when unset.
    pub parent_node_token: Option<String>,
}

#[derive(Deserialize)]
struct SpaceData {
    space: Option<Space>,
}

#[derive(Deserialize)]
struct NodeData {
    node: Option<Node>,
}

#[derive(Deserialize)]
struct MemberData {
    member: Option<Member>,
}

#[derive(Deserialize)]
struct SettingData {
    setting: Option<SpaceSetting>,
}

#[derive(Deserialize)]
struct TaskData {
    task: Option<WikiTask>,
}

/// Wiki v2: knowledge spaces, their members and node trees.
pub struct Wiki<'a> {
    scope: Scope<'a>,
}

impl<'a> Wiki<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    /// Apply `options` to every call made through this namespace.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    // ── Spaces ───────────────────────────────────────────────────────────────

    fn list_spaces_request(query: &PageQuery, lang: Option<&str>) -> ApiRequest {
        query.apply(ApiRequest::get("/open-apis/wiki/v2/spaces").query_opt("lang", lang))
    }

    /// List spaces visible to the caller (one page).
    pub async fn list_spaces(
        &self,
        query: &PageQuery,
        lang: Option<&str>,
    ) -> Result<PageData<Space>, LarkError> {
        self.scope
            .call(Self::list_spaces_request(query, lang))
            .await
    }

    pub fn list_spaces_iter(
        &self,
        query: &PageQuery,
        lang: Option<&str>,
    ) -> PageStream<'static, PageData<Space>> {
        self.scope.pages(Self::list_spaces_request(query, lang))
    }

    pub async fn get_space(&self, space_id: &str, lang: Option<&str>) -> Result<Space, LarkError> {
        let req = ApiRequest::get("/open-apis/wiki/v2/spaces/:space_id")
            .path_param("space_id", space_id)
            .query_opt("lang", lang);
        let data: SpaceData = self.scope.call(req).await?;
        required(data.space, "space")
    }

    /// Create a space. Requires a user access token.
    pub async fn create_space(&self, body: &CreateSpaceBody) -> Result<Space, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces").json(body)?;
        let data: SpaceData = self.scope.call(req).await?;
        required(data.space, "space")
    }

    pub async fn update_space_setting(
        &self,
        space_id: &str,
        setting: &SpaceSetting,
    ) -> Result<SpaceSetting, LarkError> {
        let req = ApiRequest::put("/open-apis/wiki/v2/spaces/:space_id/setting")
            .path_param("space_id", space_id)
            .json(setting)?;
        let data: SettingData = self.scope.call(req).await?;
        required(data.setting, "setting")
    }

    // ── Members ──────────────────────────────────────────────────────────────

    fn list_members_request(space_id: &str, query: &PageQuery) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/wiki/v2/spaces/:space_id/members")
                .path_param("space_id", space_id),
        )
    }

    pub async fn list_space_members(
        &self,
        space_id: &str,
        query: &PageQuery,
    ) -> Result<PageData<Member>, LarkError> {
        self.scope
            .call(Self::list_members_request(space_id, query))
            .await
    }

    pub fn list_space_members_iter(
        &self,
        space_id: &str,
        query: &PageQuery,
    ) -> PageStream<'static, PageData<Member>> {
        self.scope.pages(Self::list_members_request(space_id, query))
    }

    pub async fn create_space_member(
        &self,
        space_id: &str,
        member: &Member,
        need_notification: Option<bool>,
    ) -> Result<Member, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces/:space_id/members")
            .path_param("space_id", space_id)
            .query_opt("need_notification", need_notification)
            .json(member)?;
        let data: MemberData = self.scope.call(req).await?;
        required(data.member, "member")
    }

    pub async fn delete_space_member(
        &self,
        space_id: &str,
        member: &Member,
    ) -> Result<Member, LarkError> {
        let req = ApiRequest::delete("/open-apis/wiki/v2/spaces/:space_id/members/:member_id")
            .path_param("space_id", space_id)
            .path_param("member_id", member.member_id.as_str())
            .body(json!({
                "member_type": member.member_type,
                "member_role": member.member_role,
            }));
        let data: MemberData = self.scope.call(req).await?;
        required(data.member, "member")
    }

    // ── Nodes ────────────────────────────────────────────────────────────────

    pub async fn create_node(
        &self,
        space_id: &str,
        body: &CreateNodeBody,
    ) -> Result<Node, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces/:space_id/nodes")
            .path_param("space_id", space_id)
            .json(body)?;
        let data: NodeData = self.scope.call(req).await?;
        required(data.node, "node")
    }

    fn list_nodes_request(space_id: &str, query: &ListNodesQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/wiki/v2/spaces/:space_id/nodes")
                .path_param("space_id", space_id)
                .query_opt("parent_node_token", query.parent_node_token.as_deref()),
        )
    }

    /// List the direct children of a node (one page).
    pub async fn list_nodes(
        &self,
        space_id: &str,
        query: &ListNodesQuery,
    ) -> Result<PageData<Node>, LarkError> {
        self.scope
            .call(Self::list_nodes_request(space_id, query))
            .await
    }

    pub fn list_nodes_iter(
        &self,
        space_id: &str,
        query: &ListNodesQuery,
    ) -> PageStream<'static, PageData<Node>> {
        self.scope.pages(Self::list_nodes_request(space_id, query))
    }

    /// Look up a node by its node token, or by a document token plus `obj_type`.
    pub async fn get_node(&self, token: &str, obj_type: Option<&str>) -> Result<Node, LarkError> {
        let req = ApiRequest::get("/open-apis/wiki/v2/spaces/get_node")
            .query("token", token)
            .query_opt("obj_type", obj_type);
        let data: NodeData = self.scope.call(req).await?;
        required(data.node, "node")
    }

    pub async fn move_node(
        &self,
        space_id: &str,
        node_token: &str,
        body: &MoveNodeBody,
    ) -> Result<Node, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces/:space_id/nodes/:node_token/move")
            .path_param("space_id", space_id)
            .path_param("node_token", node_token)
            .json(body)?;
        let data: NodeData = self.scope.call(req).await?;
        required(data.node, "node")
    }

    pub async fn update_node_title(
        &self,
        space_id: &str,
        node_token: &str,
        title: &str,
    ) -> Result<(), LarkError> {
        let req = ApiRequest::post(
            "/open-apis/wiki/v2/spaces/:space_id/nodes/:node_token/update_title",
        )
        .path_param("space_id", space_id)
        .path_param("node_token", node_token)
        .body(json!({ "title": title }));
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    pub async fn copy_node(
        &self,
        space_id: &str,
        node_token: &str,
        body: &CopyNodeBody,
    ) -> Result<Node, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces/:space_id/nodes/:node_token/copy")
            .path_param("space_id", space_id)
            .path_param("node_token", node_token)
            .json(body)?;
        let data: NodeData = self.scope.call(req).await?;
        required(data.node, "node")
    }

    /// Move an existing cloud document into the space.
    pub async fn move_docs_to_wiki(
        &self,
        space_id: &str,
        body: &MoveDocsToWikiBody,
    ) -> Result<MoveDocsToWikiResult, LarkError> {
        let req = ApiRequest::post("/open-apis/wiki/v2/spaces/:space_id/nodes/move_docs_to_wiki")
            .path_param("space_id", space_id)
            .json(body)?;
        self.scope.call(req).await
    }

    /// Poll an async task, e.g. from [`move_docs_to_wiki`](Self::move_docs_to_wiki).
    pub async fn get_task(&self, task_id: &str, task_type: &str) -> Result<WikiTask, LarkError> {
        let req = ApiRequest::get("/open-apis/wiki/v2/tasks/:task_id")
            .path_param("task_id", task_id)
            .query("task_type", task_type);
        let data: TaskData = self.scope.call(req).await?;
        required(data.task, "task")
    }

    // ── Search (v1) ──────────────────────────────────────────────────────────

    fn search_nodes_request(
        body: &SearchNodesBody,
        query: &PageQuery,
    ) -> Result<ApiRequest, LarkError> {
        Ok(query.apply(ApiRequest::post("/open-apis/wiki/v1/nodes/search").json(body)?))
    }

    /// Full-text search over wiki nodes the caller can read. Requires a user token.
    pub async fn search_nodes(
        &self,
        body: &SearchNodesBody,
        query: &PageQuery,
    ) -> Result<PageData<SearchedNode>, LarkError> {
        self.scope
            .call(Self::search_nodes_request(body, query)?)
            .await
    }

    pub fn search_nodes_iter(
        &self,
        body: &SearchNodesBody,
        query: &PageQuery,
    ) -> Result<PageStream<'static, PageData<SearchedNode>>, LarkError> {
        Ok(self.scope.pages(Self::search_nodes_request(body, query)?))
    }
}
