use lark_core::{ApiRequest, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{required, PageQuery};
use crate::client::Scope;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub union_id: Option<String>,
    pub user_id: Option<String>,
    pub open_id: Option<String>,
    pub name: Option<String>,
    pub en_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<i32>,
    pub avatar: Option<Value>,
    pub status: Option<Value>,
    #[serde(default)]
    pub department_ids: Vec<String>,
    pub leader_user_id: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub work_station: Option<String>,
    pub join_time: Option<i64>,
    pub is_tenant_manager: Option<bool>,
    pub employee_no: Option<String>,
    pub employee_type: Option<i32>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub name: Option<String>,
    pub i18n_name: Option<super::I18nText>,
    pub parent_department_id: Option<String>,
    pub department_id: Option<String>,
    pub open_department_id: Option<String>,
    pub leader_user_id: Option<String>,
    pub chat_id: Option<String>,
    pub order: Option<String>,
    pub member_count: Option<i64>,
    pub status: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchGetIdBody {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mobiles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_resigned: Option<bool>,
}

/// One resolved email or mobile. `user_id` is unset when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContactInfo {
    pub user_id: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub status: Option<Value>,
}

/// ID flavours accepted by most contact endpoints.
#[derive(Debug, Clone, Default)]
pub struct IdTypes {
    /// `open_id`, `union_id` or `user_id`.
    pub user_id_type: Option<String>,
    /// `department_id` or `open_department_id`.
    pub department_id_type: Option<String>,
}

impl IdTypes {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("user_id_type", self.user_id_type.as_deref())
            .query_opt("department_id_type", self.department_id_type.as_deref())
    }
}

#[derive(Deserialize)]
struct UserData {
    user: Option<User>,
}

#[derive(Deserialize)]
struct UserListData {
    #[serde(default)]
    user_list: Vec<UserContactInfo>,
}

#[derive(Deserialize)]
struct DepartmentData {
    department: Option<Department>,
}

/// Contact v3: users and departments.
pub struct Contact<'a> {
    scope: Scope<'a>,
}

impl<'a> Contact<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    pub async fn get_user(&self, user_id: &str, ids: &IdTypes) -> Result<User, LarkError> {
        let req = ids.apply(
            ApiRequest::get("/open-apis/contact/v3/users/:user_id").path_param("user_id", user_id),
        );
        let data: UserData = self.scope.call(req).await?;
        required(data.user, "user")
    }

    /// Resolve emails and mobile numbers to user IDs.
    pub async fn batch_get_id(
        &self,
        body: &BatchGetIdBody,
        user_id_type: Option<&str>,
    ) -> Result<Vec<UserContactInfo>, LarkError> {
        let req = ApiRequest::post("/open-apis/contact/v3/users/batch_get_id")
            .query_opt("user_id_type", user_id_type)
            .json(body)?;
        let data: UserListData = self.scope.call(req).await?;
        Ok(data.user_list)
    }

    fn find_by_department_request(
        department_id: &str,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> ApiRequest {
        query.apply(ids.apply(
            ApiRequest::get("/open-apis/contact/v3/users/find_by_department")
                .query("department_id", department_id),
        ))
    }

    /// Direct members of a department.
    pub async fn find_users_by_department(
        &self,
        department_id: &str,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> Result<PageData<User>, LarkError> {
        self.scope
            .call(Self::find_by_department_request(department_id, ids, query))
            .await
    }

    pub fn find_users_by_department_iter(
        &self,
        department_id: &str,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> PageStream<'static, PageData<User>> {
        self.scope
            .pages(Self::find_by_department_request(department_id, ids, query))
    }

    // ── Departments ──────────────────────────────────────────────────────────

    /// Department `"0"` is the tenant root.
    pub async fn get_department(
        &self,
        department_id: &str,
        ids: &IdTypes,
    ) -> Result<Department, LarkError> {
        let req = ids.apply(
            ApiRequest::get("/open-apis/contact/v3/departments/:department_id")
                .path_param("department_id", department_id),
        );
        let data: DepartmentData = self.scope.call(req).await?;
        required(data.department, "department")
    }

    fn children_request(
        department_id: &str,
        fetch_child: bool,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> ApiRequest {
        query.apply(
            ids.apply(
                ApiRequest::get("/open-apis/contact/v3/departments/:department_id/children")
                    .path_param("department_id", department_id),
            )
            .query("fetch_child", fetch_child),
        )
    }

    /// Sub-departments; recursive when `fetch_child` is set.
    pub async fn list_child_departments(
        &self,
        department_id: &str,
        fetch_child: bool,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> Result<PageData<Department>, LarkError> {
        self.scope
            .call(Self::children_request(department_id, fetch_child, ids, query))
            .await
    }

    pub fn list_child_departments_iter(
        &self,
        department_id: &str,
        fetch_child: bool,
        ids: &IdTypes,
        query: &PageQuery,
    ) -> PageStream<'static, PageData<Department>> {
        self.scope
            .pages(Self::children_request(department_id, fetch_child, ids, query))
    }
}
