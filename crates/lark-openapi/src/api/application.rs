use lark_core::{ApiRequest, EmptyData, LarkError, PageData, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required, PageQuery};
use crate::client::Scope;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppScope {
    pub scope: Option<String>,
    pub description: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppI18nInfo {
    pub i18n_key: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub help_use: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppOwner {
    /// 0: Feishu tech support, 1: developer enterprise, 2: developer individual.
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub owner_id: Option<String>,
    pub name: Option<String>,
    pub help_desk: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// An application registered on the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub app_id: Option<String>,
    pub creator_id: Option<String>,
    /// 0: disabled, 1: enabled, 2: unknown.
    pub status: Option<i32>,
    /// 0: self-built, 1: store app, 2: personal store app.
    pub scene_type: Option<i32>,
    pub payment_type: Option<i32>,
    #[serde(default)]
    pub redirect_urls: Vec<String>,
    pub online_version_id: Option<String>,
    pub unaudit_version_id: Option<String>,
    pub app_name: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: Vec<AppScope>,
    pub back_home_url: Option<String>,
    #[serde(default)]
    pub i18n: Vec<AppI18nInfo>,
    pub primary_language: Option<String>,
    #[serde(default)]
    pub common_categories: Vec<String>,
    pub owner: Option<AppOwner>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppVersion {
    pub app_id: Option<String>,
    pub version: Option<String>,
    pub version_id: Option<String>,
    pub app_name: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: Vec<AppScope>,
    pub back_home_url: Option<String>,
    #[serde(default)]
    pub i18n: Vec<AppI18nInfo>,
    #[serde(default)]
    pub common_categories: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    /// 0: unknown, 1: audited, 2: rejected, 3: under audit, 4: unaudited.
    pub status: Option<i32>,
    pub create_time: Option<String>,
    pub publish_time: Option<String>,
    /// Per-ability configuration (bot, web app, gadget, ...); shape varies by ability.
    pub ability: Option<Value>,
    pub remark: Option<Value>,
    pub creator_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppFeedback {
    pub feedback_id: Option<String>,
    pub app_id: Option<String>,
    pub feedback_time: Option<String>,
    pub tenant_name: Option<String>,
    pub feedback_type: Option<i32>,
    pub status: Option<i32>,
    #[serde(default)]
    pub fault_type: Vec<i32>,
    pub fault_time: Option<String>,
    pub source: Option<i32>,
    pub contact: Option<String>,
    pub update_time: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub operator_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub feedback_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRecommendRule {
    pub id: Option<String>,
    pub name: Option<String>,
    pub visibility_info: Option<Value>,
    pub recommend_item_infos: Option<Value>,
    pub distributed_visibility_infos: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetric {
    pub metric_name: Option<String>,
    pub metric_value: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageOverviewBody {
    /// `YYYY-MM-DD`; the first day of the week/month for those cycles.
    pub date: String,
    /// 1: day, 2: week, 3: month.
    pub cycle_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    /// `app`, `mp`, `h5` or `bot`.
    pub ability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleList {
    #[serde(default)]
    pub open_ids: Vec<String>,
    #[serde(default)]
    pub department_ids: Vec<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

/// One slice of the app's address-book range. Long visible lists are split
/// across pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactsRange {
    /// `equal_to_availability`, `some` or `all`.
    pub contacts_scope_type: Option<String>,
    pub visible_list: Option<VisibleList>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactsRangePage {
    pub contacts_range: Option<ContactsRange>,
    #[serde(default)]
    pub has_more: bool,
    pub page_token: Option<String>,
}

impl lark_core::Page for ContactsRangePage {
    type Item = ContactsRange;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn cursor(&self) -> (Option<&str>, Option<&str>) {
        (self.page_token.as_deref(), None)
    }

    fn into_items(self) -> Vec<ContactsRange> {
        self.contacts_range.into_iter().collect()
    }
}

keyed_page!(
    /// A page of `list_apps`.
    AppListPage,
    App,
    "app_list"
);

keyed_page!(FeedbackPage, AppFeedback, "feedback_list");

keyed_page!(RecommendRulePage, AppRecommendRule, "rules");

#[derive(Debug, Clone, Default)]
pub struct ListAppsQuery {
    pub page: PageQuery,
    pub lang: Option<String>,
    pub user_id_type: Option<String>,
    pub status: Option<i32>,
    pub payment_type: Option<i32>,
    pub owner_type: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAppVersionsQuery {
    pub page: PageQuery,
    pub lang: String,
    /// 0: newest first, 1: oldest first.
    pub order: Option<i32>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListFeedbacksQuery {
    pub page: PageQuery,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub feedback_type: Option<i32>,
    pub status: Option<i32>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatchAppVersion {
    pub status: i32,
    pub operator_id: String,
    pub reject_reason: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Deserialize)]
struct AppData {
    app: Option<App>,
}

#[derive(Deserialize)]
struct AppVersionData {
    app_version: Option<AppVersion>,
}

#[derive(Deserialize)]
struct UsageData {
    #[serde(default)]
    items: Vec<UsageMetric>,
}

/// Application v6: app info, versions, audit, usage and feedback.
pub struct Application<'a> {
    scope: Scope<'a>,
}

impl<'a> Application<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    pub async fn get_app(
        &self,
        app_id: &str,
        lang: &str,
        user_id_type: Option<&str>,
    ) -> Result<App, LarkError> {
        let req = ApiRequest::get("/open-apis/application/v6/applications/:app_id")
            .path_param("app_id", app_id)
            .query("lang", lang)
            .query_opt("user_id_type", user_id_type);
        let data: AppData = self.scope.call(req).await?;
        required(data.app, "app")
    }

    fn list_apps_request(query: &ListAppsQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/application/v6/applications")
                .query_opt("lang", query.lang.as_deref())
                .query_opt("user_id_type", query.user_id_type.as_deref())
                .query_opt("status", query.status)
                .query_opt("payment_type", query.payment_type)
                .query_opt("owner_type", query.owner_type),
        )
    }

    /// List the tenant's installed apps. Requires the admin scope.
    pub async fn list_apps(&self, query: &ListAppsQuery) -> Result<AppListPage, LarkError> {
        self.scope.call(Self::list_apps_request(query)).await
    }

    pub fn list_apps_iter(&self, query: &ListAppsQuery) -> PageStream<'static, AppListPage> {
        self.scope.pages(Self::list_apps_request(query))
    }

    /// Update the app's store categories.
    pub async fn patch_app(
        &self,
        app_id: &str,
        lang: &str,
        common_categories: &[String],
    ) -> Result<(), LarkError> {
        let req = ApiRequest::patch("/open-apis/application/v6/applications/:app_id")
            .path_param("app_id", app_id)
            .query("lang", lang)
            .body(json!({ "common_categories": common_categories }));
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    // ── Versions ─────────────────────────────────────────────────────────────

    fn list_versions_request(app_id: &str, query: &ListAppVersionsQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/application/v6/applications/:app_id/app_versions")
                .path_param("app_id", app_id)
                .query("lang", &query.lang)
                .query_opt("order", query.order)
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    pub async fn list_app_versions(
        &self,
        app_id: &str,
        query: &ListAppVersionsQuery,
    ) -> Result<PageData<AppVersion>, LarkError> {
        self.scope
            .call(Self::list_versions_request(app_id, query))
            .await
    }

    pub fn list_app_versions_iter(
        &self,
        app_id: &str,
        query: &ListAppVersionsQuery,
    ) -> PageStream<'static, PageData<AppVersion>> {
        self.scope.pages(Self::list_versions_request(app_id, query))
    }

    pub async fn get_app_version(
        &self,
        app_id: &str,
        version_id: &str,
        lang: &str,
        user_id_type: Option<&str>,
    ) -> Result<AppVersion, LarkError> {
        let req = ApiRequest::get(
            "/open-apis/application/v6/applications/:app_id/app_versions/:version_id",
        )
        .path_param("app_id", app_id)
        .path_param("version_id", version_id)
        .query("lang", lang)
        .query_opt("user_id_type", user_id_type);
        let data: AppVersionData = self.scope.call(req).await?;
        required(data.app_version, "app_version")
    }

    /// Approve or reject a version submitted for audit.
    pub async fn patch_app_version(
        &self,
        app_id: &str,
        version_id: &str,
        patch: &PatchAppVersion,
    ) -> Result<(), LarkError> {
        let req = ApiRequest::patch(
            "/open-apis/application/v6/applications/:app_id/app_versions/:version_id",
        )
        .path_param("app_id", app_id)
        .path_param("version_id", version_id)
        .query("operator_id", &patch.operator_id)
        .query_opt("reject_reason", patch.reject_reason.as_deref())
        .query_opt("user_id_type", patch.user_id_type.as_deref())
        .body(json!({ "status": patch.status }));
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    fn underaudit_request(lang: &str, query: &PageQuery, user_id_type: Option<&str>) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/application/v6/applications/underauditlist")
                .query("lang", lang)
                .query_opt("user_id_type", user_id_type),
        )
    }

    /// Apps with a version waiting for the tenant admin's review.
    pub async fn list_underaudit_apps(
        &self,
        lang: &str,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> Result<PageData<App>, LarkError> {
        self.scope
            .call(Self::underaudit_request(lang, query, user_id_type))
            .await
    }

    pub fn list_underaudit_apps_iter(
        &self,
        lang: &str,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> PageStream<'static, PageData<App>> {
        self.scope
            .pages(Self::underaudit_request(lang, query, user_id_type))
    }

    // ── Usage & feedback ─────────────────────────────────────────────────────

    pub async fn app_usage_overview(
        &self,
        app_id: &str,
        body: &UsageOverviewBody,
        department_id_type: Option<&str>,
    ) -> Result<Vec<UsageMetric>, LarkError> {
        let req = ApiRequest::post(
            "/open-apis/application/v6/applications/:app_id/app_usage/overview",
        )
        .path_param("app_id", app_id)
        .query_opt("department_id_type", department_id_type)
        .json(body)?;
        let data: UsageData = self.scope.call(req).await?;
        Ok(data.items)
    }

    fn list_feedbacks_request(app_id: &str, query: &ListFeedbacksQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/application/v6/applications/:app_id/feedbacks")
                .path_param("app_id", app_id)
                .query_opt("from_date", query.from_date.as_deref())
                .query_opt("to_date", query.to_date.as_deref())
                .query_opt("feedback_type", query.feedback_type)
                .query_opt("status", query.status)
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    pub async fn list_feedbacks(
        &self,
        app_id: &str,
        query: &ListFeedbacksQuery,
    ) -> Result<FeedbackPage, LarkError> {
        self.scope
            .call(Self::list_feedbacks_request(app_id, query))
            .await
    }

    pub fn list_feedbacks_iter(
        &self,
        app_id: &str,
        query: &ListFeedbacksQuery,
    ) -> PageStream<'static, FeedbackPage> {
        self.scope.pages(Self::list_feedbacks_request(app_id, query))
    }

    /// Mark a feedback entry as processed (1) or unprocessed (0).
    pub async fn patch_feedback(
        &self,
        app_id: &str,
        feedback_id: &str,
        status: i32,
        operator_id: &str,
        user_id_type: Option<&str>,
    ) -> Result<(), LarkError> {
        let req = ApiRequest::patch(
            "/open-apis/application/v6/applications/:app_id/feedbacks/:feedback_id",
        )
        .path_param("app_id", app_id)
        .path_param("feedback_id", feedback_id)
        .query("status", status)
        .query("operator_id", operator_id)
        .query_opt("user_id_type", user_id_type);
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }

    // ── Tenant configuration ─────────────────────────────────────────────────

    fn recommend_rules_request(query: &PageQuery, user_id_type: Option<&str>) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/application/v6/app_recommend_rules")
                .query_opt("user_id_type", user_id_type),
        )
    }

    pub async fn list_recommend_rules(
        &self,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> Result<RecommendRulePage, LarkError> {
        self.scope
            .call(Self::recommend_rules_request(query, user_id_type))
            .await
    }

    pub fn list_recommend_rules_iter(
        &self,
        query: &PageQuery,
        user_id_type: Option<&str>,
    ) -> PageStream<'static, RecommendRulePage> {
        self.scope
            .pages(Self::recommend_rules_request(query, user_id_type))
    }

    fn contacts_range_request(
        app_id: &str,
        query: &PageQuery,
        department_id_type: Option<&str>,
        user_id_type: Option<&str>,
    ) -> ApiRequest {
        query.apply(
            ApiRequest::get(
                "/open-apis/application/v6/applications/:app_id/contacts_range_configuration",
            )
            .path_param("app_id", app_id)
            .query_opt("department_id_type", department_id_type)
            .query_opt("user_id_type", user_id_type),
        )
    }

    /// The address-book range the app may read.
    pub async fn contacts_range_configuration(
        &self,
        app_id: &str,
        query: &PageQuery,
        department_id_type: Option<&str>,
        user_id_type: Option<&str>,
    ) -> Result<ContactsRangePage, LarkError> {
        self.scope
            .call(Self::contacts_range_request(
                app_id,
                query,
                department_id_type,
                user_id_type,
            ))
            .await
    }

    /// Yields one [`ContactsRange`] slice per page.
    pub fn contacts_range_configuration_iter(
        &self,
        app_id: &str,
        query: &PageQuery,
        department_id_type: Option<&str>,
        user_id_type: Option<&str>,
    ) -> PageStream<'static, ContactsRangePage> {
        self.scope.pages(Self::contacts_range_request(
            app_id,
            query,
            department_id_type,
            user_id_type,
        ))
    }
}
