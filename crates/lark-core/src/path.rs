use std::collections::BTreeMap;

use crate::LarkError;

/// Path parameters keyed by placeholder name (without the leading `:`).
pub type PathParams = BTreeMap<String, String>;

/// Substitute every `:name` placeholder in `template` with its value from
/// `params`.
///
/// A placeholder is a `:` followed by one or more characters other than `/`.
/// Values are percent-encoded as a single path segment. Parameters that do
/// not appear in the template are ignored.
///
/// ```
/// use lark_core::{fill_api_path, PathParams};
///
/// let mut params = PathParams::new();
/// params.insert("space_id".into(), "7034502641455497244".into());
/// let path = fill_api_path("/open-apis/wiki/v2/spaces/:space_id/nodes", &params).unwrap();
/// assert_eq!(path, "/open-apis/wiki/v2/spaces/7034502641455497244/nodes");
/// ```
pub fn fill_api_path(template: &str, params: &PathParams) -> Result<String, LarkError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find(':') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let name_len = after.find('/').unwrap_or(after.len());
        if name_len == 0 {
            // A bare ':' is literal text.
            out.push(':');
            rest = after;
            continue;
        }
        let name = &after[..name_len];
        let value = params
            .get(name)
            .ok_or_else(|| LarkError::MissingPathParam(name.to_string()))?;
        out.push_str(&urlencoding::encode(value));
        rest = &after[name_len..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Join a base URL and a templated path into a fully-qualified URL.
pub fn build_url(base_url: &str, template: &str, params: &PathParams) -> Result<String, LarkError> {
    let path = fill_api_path(template, params)?;
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(format!("{base}/{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> PathParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fills_multiple_placeholders() {
        let p = params(&[("space_id", "s1"), ("node_token", "wikcn1")]);
        let path = fill_api_path(
            "/open-apis/wiki/v2/spaces/:space_id/nodes/:node_token/move",
            &p,
        )
        .unwrap();
        assert_eq!(path, "/open-apis/wiki/v2/spaces/s1/nodes/wikcn1/move");
    }

    #[test]
    fn placeholder_at_end() {
        let p = params(&[("app_id", "cli_a")]);
        let path = fill_api_path("/open-apis/application/v6/applications/:app_id", &p).unwrap();
        assert_eq!(path, "/open-apis/application/v6/applications/cli_a");
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let path = fill_api_path("/open-apis/wiki/v2/spaces", &PathParams::new()).unwrap();
        assert_eq!(path, "/open-apis/wiki/v2/spaces");
    }

    #[test]
    fn missing_param_names_the_placeholder() {
        let err = fill_api_path("/open-apis/wiki/v2/spaces/:space_id", &PathParams::new())
            .unwrap_err();
        assert!(matches!(err, LarkError::MissingPathParam(ref n) if n == "space_id"));
        assert_eq!(err.to_string(), "request miss space_id path argument");
    }

    #[test]
    fn values_are_percent_encoded() {
        let p = params(&[("range", "Sheet1!A1:B2")]);
        let path = fill_api_path("/open-apis/sheets/v2/spreadsheets/x/values/:range", &p).unwrap();
        assert_eq!(path, "/open-apis/sheets/v2/spreadsheets/x/values/Sheet1%21A1%3AB2");
    }

    #[test]
    fn bare_colon_is_literal() {
        let path = fill_api_path("/a/:/b", &PathParams::new()).unwrap();
        assert_eq!(path, "/a/:/b");
    }

    #[test]
    fn build_url_joins_with_single_slash() {
        let p = params(&[("space_id", "s1")]);
        assert_eq!(
            build_url("https://open.feishu.cn/", "/open-apis/wiki/v2/spaces/:space_id", &p)
                .unwrap(),
            "https://open.feishu.cn/open-apis/wiki/v2/spaces/s1"
        );
        assert_eq!(
            build_url("http://127.0.0.1:8080", "open-apis/x", &p).unwrap(),
            "http://127.0.0.1:8080/open-apis/x"
        );
    }
}
