use lark_core::{ApiRequest, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};

use super::PageQuery;
use crate::client::Scope;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessData {
    pub pv: Option<i64>,
    pub uv: Option<i64>,
}

/// Daily visits across the tenant's workplaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkplaceAccessData {
    pub date: Option<String>,
    pub all_workplace: Option<AccessData>,
    pub default_workplace: Option<AccessData>,
    #[serde(default)]
    pub custom_workplace: Vec<CustomWorkplaceAccessData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomWorkplaceName {
    pub language: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomWorkplaceAccessData {
    pub custom_workplace_id: Option<String>,
    pub access_data: Option<AccessData>,
    pub date: Option<String>,
    #[serde(default)]
    pub custom_workplace_name: Vec<CustomWorkplaceName>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockAccessData {
    pub block_id: Option<String>,
    pub access_data: Option<AccessData>,
    pub date: Option<String>,
}

/// Date range (`YYYY-MM-DD`, inclusive) and cursor for access-data searches.
#[derive(Debug, Clone, Default)]
pub struct AccessDataQuery {
    pub from_date: String,
    pub to_date: String,
    pub page: PageQuery,
}

impl AccessDataQuery {
    pub fn new(from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        Self {
            from_date: from_date.into(),
            to_date: to_date.into(),
            page: PageQuery::default(),
        }
    }

    pub fn with_page(mut self, page: PageQuery) -> Self {
        self.page = page;
        self
    }

    fn request(&self, path: &str) -> ApiRequest {
        self.page.apply(
            ApiRequest::post(path)
                .query("from_date", &self.from_date)
                .query("to_date", &self.to_date),
        )
    }
}

const WORKPLACE_PATH: &str = "/open-apis/workplace/v1/workplace_access_data/search";
const CUSTOM_WORKPLACE_PATH: &str = "/open-apis/workplace/v1/custom_workplace_access_data/search";
const BLOCK_PATH: &str = "/open-apis/workplace/v1/workplace_block_access_data/search";

/// Workplace v1: access statistics.
pub struct Workplace<'a> {
    scope: Scope<'a>,
}

impl<'a> Workplace<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    pub async fn search_workplace_access_data(
        &self,
        query: &AccessDataQuery,
    ) -> Result<PageData<WorkplaceAccessData>, LarkError> {
        self.scope.call(query.request(WORKPLACE_PATH)).await
    }

    pub fn search_workplace_access_data_iter(
        &self,
        query: &AccessDataQuery,
    ) -> PageStream<'static, PageData<WorkplaceAccessData>> {
        self.scope.pages(query.request(WORKPLACE_PATH))
    }

    fn custom_request(query: &AccessDataQuery, custom_workplace_id: Option<&str>) -> ApiRequest {
        query
            .request(CUSTOM_WORKPLACE_PATH)
            .query_opt("custom_workplace_id", custom_workplace_id)
    }

    /// Access data for custom workplaces; all of them when `custom_workplace_id` is unset.
    pub async fn search_custom_workplace_access_data(
        &self,
        query: &AccessDataQuery,
        custom_workplace_id: Option<&str>,
    ) -> Result<PageData<CustomWorkplaceAccessData>, LarkError> {
        self.scope
            .call(Self::custom_request(query, custom_workplace_id))
            .await
    }

    pub fn search_custom_workplace_access_data_iter(
        &self,
        query: &AccessDataQuery,
        custom_workplace_id: Option<&str>,
    ) -> PageStream<'static, PageData<CustomWorkplaceAccessData>> {
        self.scope
            .pages(Self::custom_request(query, custom_workplace_id))
    }

    fn block_request(query: &AccessDataQuery, block_id: Option<&str>) -> ApiRequest {
        query.request(BLOCK_PATH).query_opt("block_id", block_id)
    }

    pub async fn search_block_access_data(
        &self,
        query: &AccessDataQuery,
        block_id: Option<&str>,
    ) -> Result<PageData<BlockAccessData>, LarkError> {
        self.scope.call(Self::block_request(query, block_id)).await
    }

    pub fn search_block_access_data_iter(
        &self,
        query: &AccessDataQuery,
        block_id: Option<&str>,
    ) -> PageStream<'static, PageData<BlockAccessData>> {
        self.scope.pages(Self::block_request(query, block_id))
    }
}
