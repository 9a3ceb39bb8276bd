use lark_core::{ApiRequest, LarkError, Page, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::PageQuery;
use crate::client::Scope;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub token: Option<String>,
    pub name: Option<String>,
    /// `doc`, `docx`, `sheet`, `bitable`, `mindnote`, `file`, `folder`, `shortcut`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub parent_token: Option<String>,
    pub url: Option<String>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    pub owner_id: Option<String>,
    pub shortcut_info: Option<serde_json::Value>,
}

/// A page of `list_files`. This endpoint reports its cursor as
/// `next_page_token`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilePage {
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Page for FilePage {
    type Item = File;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn cursor(&self) -> (Option<&str>, Option<&str>) {
        (None, self.next_page_token.as_deref())
    }

    fn into_items(self) -> Vec<File> {
        self.files
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilesQuery {
    pub page: PageQuery,
    /// The caller's root folder when unset.
    pub folder_token: Option<String>,
    /// `EditedTime` or `CreatedTime`.
    pub order_by: Option<String>,
    /// `ASC` or `DESC`.
    pub direction: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedFolder {
    pub token: Option<String>,
    pub url: Option<String>,
}

/// Drive v1: folder listing and creation.
pub struct Drive<'a> {
    scope: Scope<'a>,
}

impl<'a> Drive<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    fn list_files_request(query: &ListFilesQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/drive/v1/files")
                .query_opt("folder_token", query.folder_token.as_deref())
                .query_opt("order_by", query.order_by.as_deref())
                .query_opt("direction", query.direction.as_deref())
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    pub async fn list_files(&self, query: &ListFilesQuery) -> Result<FilePage, LarkError> {
        self.scope.call(Self::list_files_request(query)).await
    }

    pub fn list_files_iter(&self, query: &ListFilesQuery) -> PageStream<'static, FilePage> {
        self.scope.pages(Self::list_files_request(query))
    }

    pub async fn create_folder(
        &self,
        name: &str,
        parent_folder_token: &str,
    ) -> Result<CreatedFolder, LarkError> {
        let req = ApiRequest::post("/open-apis/drive/v1/files/create_folder")
            .body(json!({ "name": name, "folder_token": parent_folder_token }));
        self.scope.call(req).await
    }
}
