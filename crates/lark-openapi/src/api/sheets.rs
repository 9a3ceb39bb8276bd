use lark_core::{ApiRequest, LarkError, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::required;
use crate::client::Scope;

/// A block of cells. `range` is `<sheetId>!A1:C3` style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, values: Vec<Vec<Value>>) -> Self {
        Self {
            range: range.into(),
            values,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadValues {
    pub revision: Option<i64>,
    pub spreadsheet_token: Option<String>,
    #[serde(default)]
    pub value_range: ValueRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedRange {
    pub spreadsheet_token: Option<String>,
    pub revision: Option<i64>,
    pub updated_range: Option<String>,
    pub updated_rows: Option<i64>,
    pub updated_columns: Option<i64>,
    pub updated_cells: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResult {
    pub spreadsheet_token: Option<String>,
    pub table_range: Option<String>,
    pub revision: Option<i64>,
    #[serde(default)]
    pub updates: UpdatedRange,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// `ToString`, `FormattedValue`, `Formula` or `UnformattedValue`.
    pub value_render_option: Option<String>,
    /// `FormattedString`.
    pub date_time_render_option: Option<String>,
    pub user_id_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spreadsheet {
    pub title: Option<String>,
    pub folder_token: Option<String>,
    pub url: Option<String>,
    pub spreadsheet_token: Option<String>,
    pub owner_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridProperties {
    pub frozen_row_count: Option<i64>,
    pub frozen_column_count: Option<i64>,
    pub row_count: Option<i64>,
    pub column_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub sheet_id: Option<String>,
    pub title: Option<String>,
    pub index: Option<i32>,
    pub hidden: Option<bool>,
    pub grid_properties: Option<GridProperties>,
    /// `sheet`, `bitable` or `#UNSUPPORTED_TYPE`.
    pub resource_type: Option<String>,
    #[serde(default)]
    pub merges: Vec<Value>,
}

#[derive(Deserialize)]
struct SpreadsheetData {
    spreadsheet: Option<Spreadsheet>,
}

#[derive(Deserialize)]
struct SheetsData {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

/// Sheets: cell values (v2) and workbook metadata (v3).
pub struct Sheets<'a> {
    scope: Scope<'a>,
}

impl<'a> Sheets<'a> {
    pub(crate) fn new(scope: Scope<'a>) -> Self {
        Self { scope }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.scope.set_options(options);
        self
    }

    /// Read a single range. The range is percent-encoded into the path.
    pub async fn read_values(
        &self,
        spreadsheet_token: &str,
        range: &str,
        options: &ReadOptions,
    ) -> Result<ReadValues, LarkError> {
        let req = ApiRequest::get(
            "/open-apis/sheets/v2/spreadsheets/:spreadsheet_token/values/:range",
        )
        .path_param("spreadsheet_token", spreadsheet_token)
        .path_param("range", range)
        .query_opt("valueRenderOption", options.value_render_option.as_deref())
        .query_opt(
            "dateTimeRenderOption",
            options.date_time_render_option.as_deref(),
        )
        .query_opt("user_id_type", options.user_id_type.as_deref());
        self.scope.call(req).await
    }

    /// Overwrite a range.
    pub async fn write_values(
        &self,
        spreadsheet_token: &str,
        value_range: &ValueRange,
    ) -> Result<UpdatedRange, LarkError> {
        let req = ApiRequest::put("/open-apis/sheets/v2/spreadsheets/:spreadsheet_token/values")
            .path_param("spreadsheet_token", spreadsheet_token)
            .body(json!({ "valueRange": value_range }));
        self.scope.call(req).await
    }

    /// Append rows after the last non-empty row of the range.
    /// `insert_data_option` is `OVERWRITE` (default) or `INSERT_ROWS`.
    pub async fn append_values(
        &self,
        spreadsheet_token: &str,
        value_range: &ValueRange,
        insert_data_option: Option<&str>,
    ) -> Result<AppendResult, LarkError> {
        let req =
            ApiRequest::post("/open-apis/sheets/v2/spreadsheets/:spreadsheet_token/values_append")
                .path_param("spreadsheet_token", spreadsheet_token)
                .query_opt("insertDataOption", insert_data_option)
                .body(json!({ "valueRange": value_range }));
        self.scope.call(req).await
    }

    pub async fn clear_values(
        &self,
        spreadsheet_token: &str,
        ranges: &[&str],
    ) -> Result<(), LarkError> {
        let req = ApiRequest::put(
            "/open-apis/sheets/v2/spreadsheets/:spreadsheet_token/values_batch_clear",
        )
        .path_param("spreadsheet_token", spreadsheet_token)
        .body(json!({ "ranges": ranges }));
        let _: Value = self.scope.call(req).await?;
        Ok(())
    }

    // ── v3 ───────────────────────────────────────────────────────────────────

    pub async fn get_spreadsheet(
        &self,
        spreadsheet_token: &str,
        user_id_type: Option<&str>,
    ) -> Result<Spreadsheet, LarkError> {
        let req = ApiRequest::get("/open-apis/sheets/v3/spreadsheets/:spreadsheet_token")
            .path_param("spreadsheet_token", spreadsheet_token)
            .query_opt("user_id_type", user_id_type);
        let data: SpreadsheetData = self.scope.call(req).await?;
        required(data.spreadsheet, "spreadsheet")
    }

    /// Every worksheet in the workbook.
    pub async fn query_sheets(&self, spreadsheet_token: &str) -> Result<Vec<Sheet>, LarkError> {
        let req =
            ApiRequest::get("/open-apis/sheets/v3/spreadsheets/:spreadsheet_token/sheets/query")
                .path_param("spreadsheet_token", spreadsheet_token);
        let data: SheetsData = self.scope.call(req).await?;
        Ok(data.sheets)
    }
}
