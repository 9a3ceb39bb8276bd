use lark_core::{ApiRequest, EmptyData, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required, PageQuery};
use crate::client::Scope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    /// Milliseconds since epoch, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMember {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `assignee` or `follower`.
    pub role: Option<String>,
}

/// A task. Doubles as the create/patch body; unset fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Due>,
    /// `"0"` while open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<TaskMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListTasksQuery {
    pub page: PageQuery,
    pub completed: Option<bool>,
    /// Only `my_tasks` is supported by the platform today.
    pub list_type: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Deserialize)]
struct TaskData {
    task: Option<TaskInfo>,
}

/// Task v2.
pub struct Task<'a> {
    scope: Scope<'a>,
}

impl<'a> Task<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    fn list_tasks_request(query: &ListTasksQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/task/v2/tasks")
                .query_opt("completed", query.completed)
                .query_opt("type", query.list_type.as_deref())
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    /// The caller's tasks. Requires a user access token.
    pub async fn list_tasks(
        &self,
        query: &ListTasksQuery,
    ) -> Result<PageData<TaskInfo>, LarkError> {
        self.scope.call(Self::list_tasks_request(query)).await
    }

    pub fn list_tasks_iter(
        &self,
        query: &ListTasksQuery,
    ) -> PageStream<'static, PageData<TaskInfo>> {
        self.scope.pages(Self::list_tasks_request(query))
    }

    pub async fn get_task(
        &self,
        task_guid: &str,
        user_id_type: Option<&str>,
    ) -> Result<TaskInfo, LarkError> {
        let req = ApiRequest::get("/open-apis/task/v2/tasks/:task_guid")
            .path_param("task_guid", task_guid)
            .query_opt("user_id_type", user_id_type);
        let data: TaskData = self.scope.call(req).await?;
        required(data.task, "task")
    }

    pub async fn create_task(
        &self,
        task: &TaskInfo,
        user_id_type: Option<&str>,
    ) -> Result<TaskInfo, LarkError> {
        let req = ApiRequest::post("/open-apis/task/v2/tasks")
            .query_opt("user_id_type", user_id_type)
            .json(task)?;
        let data: TaskData = self.scope.call(req).await?;
        required(data.task, "task")
    }

    /// Update the listed `update_fields` from `task`.
    pub async fn patch_task(
        &self,
        task_guid: &str,
        task: &TaskInfo,
        update_fields: &[&str],
    ) -> Result<TaskInfo, LarkError> {
        let req = ApiRequest::patch("/open-apis/task/v2/tasks/:task_guid")
            .path_param("task_guid", task_guid)
            .body(json!({ "task": task, "update_fields": update_fields }));
        let data: TaskData = self.scope.call(req).await?;
        required(data.task, "task")
    }

    pub async fn delete_task(&self, task_guid: &str) -> Result<(), LarkError> {
        let req = ApiRequest::delete("/open-apis/task/v2/tasks/:task_guid")
            .path_param("task_guid", task_guid);
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }
}
