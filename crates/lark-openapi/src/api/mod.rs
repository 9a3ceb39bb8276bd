//! Endpoint namespaces.
//!
//! Every namespace borrows the [`Client`](crate::Client) and carries the
//! [`RequestOptions`](lark_core::RequestOptions) set through `with_options`.
//! List endpoints come in pairs: `list_x` fetches one page, `list_x_iter`
//! streams every page lazily.

/// Declare a page type whose item list sits under a resource-specific key
/// instead of `items`.
macro_rules! keyed_page {
    ($(#[$meta:meta])* $name:ident, $item:ty, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
        pub struct $name {
            #[serde(default, rename = $field)]
            pub items: Vec<$item>,
            #[serde(default)]
            pub has_more: bool,
            #[serde(default)]
            pub page_token: Option<String>,
            #[serde(default)]
            pub total_count: Option<i64>,
        }

        impl lark_core::Page for $name {
            type Item = $item;

            fn has_more(&self) -> bool {
                self.has_more
            }

            fn cursor(&self) -> (Option<&str>, Option<&str>) {
                (self.page_token.as_deref(), None)
            }

            fn into_items(self) -> Vec<$item> {
                self.items
            }
        }
    };
}

pub mod application;
pub mod bitable;
pub mod calendar;
pub mod contact;
pub mod drive;
pub mod im;
pub mod sheets;
pub mod task;
pub mod wiki;
pub mod workplace;

use lark_core::{ApiRequest, LarkError};
use serde::{Deserialize, Serialize};

/// Cursor parameters shared by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page_size: Option<i32>,
    /// Start from this cursor instead of the first page.
    pub page_token: Option<String>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("page_size", self.page_size)
            .query_opt("page_token", self.page_token.as_deref())
    }
}

/// Localized text keyed by language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zh_cn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_us: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ja_jp: Option<String>,
}

/// Unwrap a field the platform always returns on success.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, LarkError> {
    value.ok_or_else(|| LarkError::Parsing(format!("response data is missing `{field}`")))
}
