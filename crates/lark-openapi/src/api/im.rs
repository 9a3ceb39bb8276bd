use lark_core::{ApiRequest, EmptyData, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::PageQuery;
use crate::client::Scope;

/// A group chat as returned by list and get.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: Option<String>,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub owner_id_type: Option<String>,
    pub external: Option<bool>,
    pub tenant_key: Option<String>,
    pub chat_status: Option<String>,
    pub chat_mode: Option<String>,
    pub chat_type: Option<String>,
    pub user_count: Option<String>,
    pub bot_count: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Only honored on create.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_id_list: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bot_id_list: Vec<String>,
    /// `private` or `public`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub member_id_type: Option<String>,
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub tenant_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddMembersResult {
    #[serde(default)]
    pub invalid_id_list: Vec<String>,
    #[serde(default)]
    pub not_existed_id_list: Vec<String>,
    #[serde(default)]
    pub pending_approval_id_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoveMembersResult {
    #[serde(default)]
    pub invalid_id_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Option<String>,
    pub root_id: Option<String>,
    pub parent_id: Option<String>,
    pub thread_id: Option<String>,
    pub msg_type: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub deleted: Option<bool>,
    pub updated: Option<bool>,
    pub chat_id: Option<String>,
    pub sender: Option<Value>,
    pub body: Option<MessageBody>,
    #[serde(default)]
    pub mentions: Vec<Value>,
}

/// Content to send. `content` is the JSON-encoded payload for `msg_type`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessage {
    pub msg_type: String,
    pub content: String,
    /// Deduplicates sends for one hour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl SendMessage {
    pub fn text(text: &str) -> Self {
        Self {
            msg_type: "text".to_string(),
            content: json!({ "text": text }).to_string(),
            uuid: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListMessagesQuery {
    /// `chat` or `thread`.
    pub container_id_type: String,
    pub container_id: String,
    /// Seconds since epoch.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// `ByCreateTimeAsc` or `ByCreateTimeDesc`.
    pub sort_type: Option<String>,
    pub page: PageQuery,
}

#[derive(Deserialize)]
struct ChatIdData {
    chat_id: Option<String>,
}

/// IM v1: chats, chat members and messages.
pub struct Im<'a> {
    scope: Scope<'a>,
}

impl<'a> Im<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    // ── Chats ────────────────────────────────────────────────────────────────

    fn list_chats_request(query: &PageQuery, user_id_type: Option<&str>) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/im/v1/chats").query_opt("user_id_type", user_id_type),
        )
    }

    /// Chats the caller belongs to.
    pub async fn list_chats(
        &self,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> Result<PageData<Chat>, LarkError> {
        self.scope
            .call(Self::list_chats_request(query, user_id_type))
            .await
    }

    pub fn list_chats_iter(
        &self,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> PageStream<'static, PageData<Chat>> {
        self.scope.pages(Self::list_chats_request(query, user_id_type))
    }

    pub async fn get_chat(
        &self,
        chat_id: &str,
        user_id_type: Option<&str>,
    ) -> Result<Chat, LarkError> {
        let req = ApiRequest::get("/open-apis/im/v1/chats/:chat_id")
            .path_param("chat_id", chat_id)
            .query_opt("user_id_type", user_id_type);
        let mut chat: Chat = self.scope.call(req).await?;
        chat.chat_id.get_or_insert_with(|| chat_id.to_string());
        Ok(chat)
    }

    /// Create a group chat and return its `chat_id`.
    pub async fn create_chat(
        &self,
        body: &ChatBody,
        user_id_type: Option<&str>,
    ) -> Result<String, LarkError> {
        let req = ApiRequest::post("/open-apis/im/v1/chats")
            .query_opt("user_id_type", user_id_type)
            .json(body)?;
        let data: ChatIdData = self.scope.call(req).await?;
        super::required(data.chat_id, "chat_id")
    }

    pub async fn update_chat(
        &self,
        chat_id: &str,
        body: &ChatBody,
        user_id_type: Option<&str>,
    ) -> Result<(), LarkError> {
        let req = ApiRequest::put("/open-apis/im/v1/chats/:chat_id")
            .path_param("chat_id", chat_id)
            .query_opt("user_id_type", user_id_type)
            .json(body)?;
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    /// Disband a chat.
    pub async fn delete_chat(&self, chat_id: &str) -> Result<(), LarkError> {
        let req =
            ApiRequest::delete("/open-apis/im/v1/chats/:chat_id").path_param("chat_id", chat_id);
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    // ── Members ──────────────────────────────────────────────────────────────

    fn list_members_request(
        chat_id: &str,
        query: &PageQuery,
        member_id_type: Option<&str>,
    ) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/im/v1/chats/:chat_id/members")
                .path_param("chat_id", chat_id)
                .query_opt("member_id_type", member_id_type),
        )
    }

    pub async fn list_members(
        &self,
        chat_id: &str,
        query: &PageQuery,
        member_id_type: Option<&str>,
    ) -> Result<PageData<ChatMember>, LarkError> {
        self.scope
            .call(Self::list_members_request(chat_id, query, member_id_type))
            .await
    }

    pub fn list_members_iter(
        &self,
        chat_id: &str,
        query: &PageQuery,
        member_id_type: Option<&str>,
    ) -> PageStream<'static, PageData<ChatMember>> {
        self.scope
            .pages(Self::list_members_request(chat_id, query, member_id_type))
    }

    pub async fn add_members(
        &self,
        chat_id: &str,
        member_id_type: &str,
        id_list: &[String],
    ) -> Result<AddMembersResult, LarkError> {
        let req = ApiRequest::post("/open-apis/im/v1/chats/:chat_id/members")
            .path_param("chat_id", chat_id)
            .query("member_id_type", member_id_type)
            .body(json!({ "id_list": id_list }));
        self.scope.call(req).await
    }

    pub async fn remove_members(
        &self,
        chat_id: &str,
        member_id_type: &str,
        id_list: &[String],
    ) -> Result<RemoveMembersResult, LarkError> {
        let req = ApiRequest::delete("/open-apis/im/v1/chats/:chat_id/members")
            .path_param("chat_id", chat_id)
            .query("member_id_type", member_id_type)
            .body(json!({ "id_list": id_list }));
        self.scope.call(req).await
    }

    // ── Messages ─────────────────────────────────────────────────────────────

    /// Send a message to a user or chat identified by `receive_id_type`
    /// (`open_id`, `user_id`, `union_id`, `email` or `chat_id`).
    pub async fn create_message(
        &self,
        receive_id_type: &str,
        receive_id: &str,
        message: &SendMessage,
    ) -> Result<Message, LarkError> {
        let mut body = serde_json::to_value(message)?;
        body["receive_id"] = json!(receive_id);
        let req = ApiRequest::post("/open-apis/im/v1/messages")
            .query("receive_id_type", receive_id_type)
            .body(body);
        self.scope.call(req).await
    }

    pub async fn reply_message(
        &self,
        message_id: &str,
        message: &SendMessage,
        reply_in_thread: bool,
    ) -> Result<Message, LarkError> {
        let mut body = serde_json::to_value(message)?;
        if reply_in_thread {
            body["reply_in_thread"] = json!(true);
        }
        let req = ApiRequest::post("/open-apis/im/v1/messages/:message_id/reply")
            .path_param("message_id", message_id)
            .body(body);
        self.scope.call(req).await
    }

    fn list_messages_request(query: &ListMessagesQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/im/v1/messages")
                .query("container_id_type", &query.container_id_type)
                .query("container_id", &query.container_id)
                .query_opt("start_time", query.start_time.as_deref())
                .query_opt("end_time", query.end_time.as_deref())
                .query_opt("sort_type", query.sort_type.as_deref()),
        )
    }

    /// Chat history.
    pub async fn list_messages(
        &self,
        query: &ListMessagesQuery,
    ) -> Result<PageData<Message>, LarkError> {
        self.scope.call(Self::list_messages_request(query)).await
    }

    pub fn list_messages_iter(
        &self,
        query: &ListMessagesQuery,
    ) -> PageStream<'static, PageData<Message>> {
        self.scope.pages(Self::list_messages_request(query))
    }
}
