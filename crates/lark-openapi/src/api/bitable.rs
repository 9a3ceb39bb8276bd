use std::collections::BTreeMap;

use lark_core::{ApiRequest, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required, PageQuery};
use crate::client::Scope;

/// A row. Field values are keyed by field name; their shape depends on the
/// field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<i64>,
}

impl Record {
    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub table_id: Option<String>,
    pub revision: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListRecordsQuery {
    pub page: PageQuery,
    pub view_id: Option<String>,
    /// Formula filter, e.g. `CurrentValue.[Status]="Done"`.
    pub filter: Option<String>,
    /// JSON array of sort specs, e.g. `["Priority DESC"]`.
    pub sort: Option<String>,
    /// JSON array of field names to return.
    pub field_names: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterCondition {
    pub field_name: String,
    /// `is`, `isNot`, `contains`, `isEmpty`, `isGreater`, ...
    pub operator: String,
    pub value: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Filter {
    /// `and` or `or`.
    pub conjunction: String,
    pub conditions: Vec<FilterCondition>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SortSpec {
    pub field_name: String,
    pub desc: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRecordsBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_fields: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeletedRecord {
    #[serde(default)]
    pub deleted: bool,
    pub record_id: Option<String>,
}

#[derive(Deserialize)]
struct RecordData {
    record: Option<Record>,
}

/// Bitable v1: tables and records of a base, addressed by `app_token`.
pub struct Bitable<'a> {
    scope: Scope<'a>,
}

impl<'a> Bitable<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    fn list_tables_request(app_token: &str, query: &PageQuery) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/bitable/v1/apps/:app_token/tables")
                .path_param("app_token", app_token),
        )
    }

    pub async fn list_tables(
        &self,
        app_token: &str,
        query: &PageQuery,
    ) -> Result<PageData<Table>, LarkError> {
        self.scope
            .call(Self::list_tables_request(app_token, query))
            .await
    }

    pub fn list_tables_iter(
        &self,
        app_token: &str,
        query: &PageQuery,
    ) -> PageStream<'static, PageData<Table>> {
        self.scope.pages(Self::list_tables_request(app_token, query))
    }

    // ── Records ──────────────────────────────────────────────────────────────

    fn list_records_request(
        app_token: &str,
        table_id: &str,
        query: &ListRecordsQuery,
    ) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/bitable/v1/apps/:app_token/tables/:table_id/records")
                .path_param("app_token", app_token)
                .path_param("table_id", table_id)
                .query_opt("view_id", query.view_id.as_deref())
                .query_opt("filter", query.filter.as_deref())
                .query_opt("sort", query.sort.as_deref())
                .query_opt("field_names", query.field_names.as_deref())
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    pub async fn list_records(
        &self,
        app_token: &str,
        table_id: &str,
        query: &ListRecordsQuery,
    ) -> Result<PageData<Record>, LarkError> {
        self.scope
            .call(Self::list_records_request(app_token, table_id, query))
            .await
    }

    pub fn list_records_iter(
        &self,
        app_token: &str,
        table_id: &str,
        query: &ListRecordsQuery,
    ) -> PageStream<'static, PageData<Record>> {
        self.scope
            .pages(Self::list_records_request(app_token, table_id, query))
    }

    fn search_records_request(
        app_token: &str,
        table_id: &str,
        body: &SearchRecordsBody,
        query: &PageQuery,
    ) -> Result<ApiRequest, LarkError> {
        let req = ApiRequest::post(
            "/open-apis/bitable/v1/apps/:app_token/tables/:table_id/records/search",
        )
        .path_param("app_token", app_token)
        .path_param("table_id", table_id)
        .json(body)?;
        Ok(query.apply(req))
    }

    /// Structured search; the cursor travels in the query string.
    pub async fn search_records(
        &self,
        app_token: &str,
        table_id: &str,
        body: &SearchRecordsBody,
        query: &PageQuery,
    ) -> Result<PageData<Record>, LarkError> {
        let req = Self::search_records_request(app_token, table_id, body, query)?;
        self.scope.call(req).await
    }

    pub fn search_records_iter(
        &self,
        app_token: &str,
        table_id: &str,
        body: &SearchRecordsBody,
        query: &PageQuery,
    ) -> Result<PageStream<'static, PageData<Record>>, LarkError> {
        let req = Self::search_records_request(app_token, table_id, body, query)?;
        Ok(self.scope.pages(req))
    }

    pub async fn create_record(
        &self,
        app_token: &str,
        table_id: &str,
        fields: &BTreeMap<String, Value>,
    ) -> Result<Record, LarkError> {
        let req = ApiRequest::post("/open-apis/bitable/v1/apps/:app_token/tables/:table_id/records")
            .path_param("app_token", app_token)
            .path_param("table_id", table_id)
            .body(json!({ "fields": fields }));
        let data: RecordData = self.scope.call(req).await?;
        required(data.record, "record")
    }

    /// Overwrite the given fields; fields not listed keep their values.
    pub async fn update_record(
        &self,
        app_token: &str,
        table_id: &str,
        record_id: &str,
        fields: &BTreeMap<String, Value>,
    ) -> Result<Record, LarkError> {
        let req = ApiRequest::put(
            "/open-apis/bitable/v1/apps/:app_token/tables/:table_id/records/:record_id",
        )
        .path_param("app_token", app_token)
        .path_param("table_id", table_id)
        .path_param("record_id", record_id)
        .body(json!({ "fields": fields }));
        let data: RecordData = self.scope.call(req).await?;
        required(data.record, "record")
    }

    pub async fn delete_record(
        &self,
        app_token: &str,
        table_id: &str,
        record_id: &str,
    ) -> Result<DeletedRecord, LarkError> {
        let req = ApiRequest::delete(
            "/open-apis/bitable/v1/apps/:app_token/tables/:table_id/records/:record_id",
        )
        .path_param("app_token", app_token)
        .path_param("table_id", table_id)
        .path_param("record_id", record_id);
        self.scope.call(req).await
    }
}
