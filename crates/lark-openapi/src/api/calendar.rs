use lark_core::{ApiRequest, EmptyData, LarkError, Page, PageStream, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{required, PageQuery};
use crate::client::Scope;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub calendar_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// `private`, `show_only_free_busy` or `public`.
    pub permissions: Option<String>,
    pub color: Option<i32>,
    /// `primary`, `shared`, `google`, `resource` or `exchange`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub summary_alias: Option<String>,
    pub is_deleted: Option<bool>,
    pub is_third_party: Option<bool>,
    pub role: Option<String>,
}

/// A point in time: either `timestamp` (seconds) or an all-day `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl TimeInfo {
    pub fn timestamp(seconds: impl Into<String>) -> Self {
        Self {
            timestamp: Some(seconds.into()),
            ..Self::default()
        }
    }
}

/// A calendar event. Also used as the create/patch body; unset fields are
/// left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_calendar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vchat: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_ability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_busy_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Value>,
    /// RFC 5545 recurrence rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exception: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

/// A page of calendars or events. `sync_token` is set on the last page and
/// can seed incremental sync later.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncPage<T> {
    #[serde(default = "Vec::new", alias = "calendar_list")]
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub sync_token: Option<String>,
}

impl<T> Page for SyncPage<T> {
    type Item = T;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn cursor(&self) -> (Option<&str>, Option<&str>) {
        (self.page_token.as_deref(), None)
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListEventsQuery {
    pub page: PageQuery,
    /// Seconds since epoch.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub anchor_time: Option<String>,
    pub sync_token: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Deserialize)]
struct EventData {
    event: Option<Event>,
}

/// Calendar v4: calendars and events.
pub struct Calendar<'a> {
    scope: Scope<'a>,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    fn list_calendars_request(query: &PageQuery, sync_token: Option<&str>) -> ApiRequest {
        query.apply(
            ApiRequest::get("/open-apis/calendar/v4/calendars").query_opt("sync_token", sync_token),
        )
    }

    pub async fn list_calendars(
        &self,
        query: &PageQuery,
        sync_token: Option<&str>,
    ) -> Result<SyncPage<CalendarInfo>, LarkError> {
        self.scope
            .call(Self::list_calendars_request(query, sync_token))
            .await
    }

    pub fn list_calendars_iter(
        &self,
        query: &PageQuery,
        sync_token: Option<&str>,
    ) -> PageStream<'static, SyncPage<CalendarInfo>> {
        self.scope
            .pages(Self::list_calendars_request(query, sync_token))
    }

    // ── Events ───────────────────────────────────────────────────────────────

    fn list_events_request(calendar_id: &str, query: &ListEventsQuery) -> ApiRequest {
        query.page.apply(
            ApiRequest::get("/open-apis/calendar/v4/calendars/:calendar_id/events")
                .path_param("calendar_id", calendar_id)
                .query_opt("start_time", query.start_time.as_deref())
                .query_opt("end_time", query.end_time.as_deref())
                .query_opt("anchor_time", query.anchor_time.as_deref())
                .query_opt("sync_token", query.sync_token.as_deref())
                .query_opt("user_id_type", query.user_id_type.as_deref()),
        )
    }

    pub async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> Result<SyncPage<Event>, LarkError> {
        self.scope
            .call(Self::list_events_request(calendar_id, query))
            .await
    }

    pub fn list_events_iter(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> PageStream<'static, SyncPage<Event>> {
        self.scope.pages(Self::list_events_request(calendar_id, query))
    }

    pub async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        user_id_type: Option<&str>,
    ) -> Result<Event, LarkError> {
        let req = ApiRequest::get("/open-apis/calendar/v4/calendars/:calendar_id/events/:event_id")
            .path_param("calendar_id", calendar_id)
            .path_param("event_id", event_id)
            .query_opt("user_id_type", user_id_type);
        let data: EventData = self.scope.call(req).await?;
        required(data.event, "event")
    }

    pub async fn create_event(
        &self,
        calendar_id: &str,
        event: &Event,
        idempotency_key: Option<&str>,
    ) -> Result<Event, LarkError> {
        let req = ApiRequest::post("/open-apis/calendar/v4/calendars/:calendar_id/events")
            .path_param("calendar_id", calendar_id)
            .query_opt("idempotency_key", idempotency_key)
            .json(event)?;
        let data: EventData = self.scope.call(req).await?;
        required(data.event, "event")
    }

    /// Update the fields set on `event`.
    pub async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &Event,
    ) -> Result<Event, LarkError> {
        let req =
            ApiRequest::patch("/open-apis/calendar/v4/calendars/:calendar_id/events/:event_id")
                .path_param("calendar_id", calendar_id)
                .path_param("event_id", event_id)
                .json(event)?;
        let data: EventData = self.scope.call(req).await?;
        required(data.event, "event")
    }

    pub async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        need_notification: Option<bool>,
    ) -> Result<(), LarkError> {
        let req =
            ApiRequest::delete("/open-apis/calendar/v4/calendars/:calendar_id/events/:event_id")
                .path_param("calendar_id", calendar_id)
                .path_param("event_id", event_id)
                .query_opt("need_notification", need_notification);
        let _: EmptyData = self.scope.call(req).await?;
        Ok(())
    }
}
