//! Request option mappings for the create and list operations.
//!
//! Callers pass options as a JSON mapping so any field the service accepts can
//! be forwarded unchanged. Operation defaults are merged underneath the
//! caller's fields, and the client-side `raise_exception_on_failure` flag is
//! split off before anything is sent.

use serde_json::{Map, Value};

use crate::error::DocRaptorError;

/// Option key selecting the strict call path; never sent to the service.
pub const RAISE_ON_FAILURE_KEY: &str = "raise_exception_on_failure";

/// Default document name.
pub const DEFAULT_NAME: &str = "default";

/// Default output document type.
pub const DEFAULT_DOCUMENT_TYPE: &str = "pdf";

/// Default listing page.
pub const DEFAULT_PAGE: u64 = 1;

/// Default listing page size.
pub const DEFAULT_PER_PAGE: u64 = 100;

/// Merged fields for `POST /docs`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateParams {
    /// Document fields, sent as `doc[<field>]`.
    pub fields: Map<String, Value>,
    /// Whether an asynchronous job was requested.
    pub async_job: bool,
    /// Whether remote failures become errors.
    pub strict: bool,
}

impl CreateParams {
    /// Validates `options` and merges them over the create defaults.
    ///
    /// # Errors
    ///
    /// - [`DocRaptorError::InvalidArgument`] if `options` is not a mapping.
    /// - [`DocRaptorError::NoContent`] if neither `document_content` nor
    ///   `document_url` is present and non-blank.
    pub fn from_options(options: Value) -> Result<Self, DocRaptorError> {
        let options = into_mapping(options)?;

        let has_content = ["document_content", "document_url"]
            .iter()
            .any(|key| options.get(*key).is_some_and(|v| !is_blank(v)));
        if !has_content {
            return Err(DocRaptorError::NoContent);
        }

        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(DEFAULT_NAME));
        fields.insert(
            "document_type".to_string(),
            Value::from(DEFAULT_DOCUMENT_TYPE),
        );
        fields.insert("test".to_string(), Value::Bool(false));
        fields.insert("async".to_string(), Value::Bool(false));
        fields.extend(options);

        let strict = fields
            .remove(RAISE_ON_FAILURE_KEY)
            .is_some_and(|v| is_truthy(&v));
        let async_job = fields.get("async").is_some_and(is_truthy);

        Ok(Self {
            fields,
            async_job,
            strict,
        })
    }

    /// URL-encoded request body (`doc[name]=...&doc[document_type]=...`).
    #[must_use]
    pub fn form_body(&self) -> String {
        let mut pairs = Vec::new();
        flatten_mapping("doc", &self.fields, &mut pairs);
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

/// Merged query parameters for `GET /docs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    /// Query fields, `page` and `per_page` always present.
    pub fields: Map<String, Value>,
    /// Whether remote failures become errors.
    pub strict: bool,
}

impl ListParams {
    /// Validates `options` and merges them over the pagination defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DocRaptorError::InvalidArgument`] if `options` is not a mapping.
    pub fn from_options(options: Value) -> Result<Self, DocRaptorError> {
        let options = into_mapping(options)?;

        let mut fields = Map::new();
        fields.insert("page".to_string(), Value::from(DEFAULT_PAGE));
        fields.insert("per_page".to_string(), Value::from(DEFAULT_PER_PAGE));
        fields.extend(options);

        let strict = fields
            .remove(RAISE_ON_FAILURE_KEY)
            .is_some_and(|v| is_truthy(&v));

        Ok(Self { fields, strict })
    }

    /// Flattened `(key, value)` query pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.fields {
            flatten_value(key.clone(), value, &mut pairs);
        }
        pairs
    }
}

/// Marks `options` as strict by setting the raise-on-failure flag.
///
/// `null` becomes a mapping holding only the flag. Other non-mapping values
/// are passed through so the operation itself reports them.
pub(crate) fn with_strict_flag(options: Value) -> Value {
    let mut map = match options {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return other,
    };
    map.insert(RAISE_ON_FAILURE_KEY.to_string(), Value::Bool(true));
    Value::Object(map)
}

fn into_mapping(options: Value) -> Result<Map<String, Value>, DocRaptorError> {
    match options {
        Value::Object(map) => Ok(map),
        // An absent options argument behaves like an empty mapping.
        Value::Null => Ok(Map::new()),
        other => Err(DocRaptorError::invalid_argument(format!(
            "please pass in an options mapping (got {})",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

/// Null, false, whitespace-only strings, and empty collections are blank.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}

/// Only `null` and `false` switch a flag off; `0`, `""` and `"false"` all
/// switch it on.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn flatten_mapping(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        flatten_value(format!("{prefix}[{key}]"), value, out);
    }
}

/// Rack-style nesting: `a[b]=..` for mappings, `a[]=..` for arrays.
fn flatten_value(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => flatten_mapping(&key, map, out),
        Value::Array(items) => {
            let item_key = format!("{key}[]");
            for item in items {
                flatten_value(item_key.clone(), item, out);
            }
        }
        Value::String(s) => out.push((key, s.clone())),
        Value::Null => out.push((key, String::new())),
        Value::Bool(b) => out.push((key, b.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
    }
}

/// Typed builder for a create request's option mapping.
///
/// ```
/// use docraptor::CreateOptions;
///
/// let options = CreateOptions::from_content("<h1>Hello</h1>")
///     .name("hello.pdf")
///     .test(true)
///     .into_value();
/// assert_eq!(options["document_content"], "<h1>Hello</h1>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    name: Option<String>,
    document_type: Option<String>,
    document_content: Option<String>,
    document_url: Option<String>,
    test: Option<bool>,
    async_job: Option<bool>,
    extra: Map<String, Value>,
}

impl CreateOptions {
    /// Options rendering inline HTML.
    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            document_content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Options rendering a publicly reachable URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            document_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the document name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the output type (`document_type`), passed through unvalidated.
    #[must_use]
    pub fn document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Marks the document as a free, watermarked test document.
    #[must_use]
    pub fn test(mut self, test: bool) -> Self {
        self.test = Some(test);
        self
    }

    /// Requests an asynchronous job instead of a blocking render.
    #[must_use]
    pub fn async_job(mut self, async_job: bool) -> Self {
        self.async_job = Some(async_job);
        self
    }

    /// Adds any other field the service accepts (e.g. `prince_options`).
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Converts into the mapping accepted by [`DocRaptor::create`](crate::DocRaptor::create).
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl From<CreateOptions> for Value {
    fn from(options: CreateOptions) -> Self {
        let mut map = Map::new();
        if let Some(name) = options.name {
            map.insert("name".to_string(), Value::from(name));
        }
        if let Some(document_type) = options.document_type {
            map.insert("document_type".to_string(), Value::from(document_type));
        }
        if let Some(content) = options.document_content {
            map.insert("document_content".to_string(), Value::from(content));
        }
        if let Some(url) = options.document_url {
            map.insert("document_url".to_string(), Value::from(url));
        }
        if let Some(test) = options.test {
            map.insert("test".to_string(), Value::Bool(test));
        }
        if let Some(async_job) = options.async_job {
            map.insert("async".to_string(), Value::Bool(async_job));
        }
        map.extend(options.extra);
        Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_defaults_fill_missing_fields() {
        let params = CreateParams::from_options(json!({"document_content": "<p>hi</p>"})).unwrap();
        assert_eq!(params.fields["name"], "default");
        assert_eq!(params.fields["document_type"], "pdf");
        assert_eq!(params.fields["test"], false);
        assert_eq!(params.fields["async"], false);
        assert!(!params.async_job);
        assert!(!params.strict);
    }

    #[test]
    fn test_create_caller_fields_override_defaults() {
        let params = CreateParams::from_options(json!({
            "document_url": "https://example.com",
            "name": "report.xls",
            "document_type": "xls",
            "async": true,
        }))
        .unwrap();
        assert_eq!(params.fields["name"], "report.xls");
        assert_eq!(params.fields["document_type"], "xls");
        assert!(params.async_job);
    }

    #[test]
    fn test_create_requires_content_or_url() {
        for options in [
            json!({}),
            json!({"name": "x"}),
            json!({"document_content": ""}),
            json!({"document_content": "   ", "document_url": null}),
            json!({"document_url": ""}),
            Value::Null,
        ] {
            let result = CreateParams::from_options(options.clone());
            assert!(
                matches!(result, Err(DocRaptorError::NoContent)),
                "expected NoContent for {options}"
            );
        }
    }

    #[test]
    fn test_either_content_field_suffices() {
        assert!(CreateParams::from_options(json!({"document_content": "x"})).is_ok());
        assert!(CreateParams::from_options(json!({"document_url": "http://a.b"})).is_ok());
        assert!(
            CreateParams::from_options(json!({"document_content": "", "document_url": "http://a.b"}))
                .is_ok()
        );
    }

    #[test]
    fn test_non_mapping_options_are_invalid() {
        for options in [json!("html"), json!(42), json!([1, 2]), json!(true)] {
            assert!(matches!(
                CreateParams::from_options(options.clone()),
                Err(DocRaptorError::InvalidArgument { .. })
            ));
            assert!(matches!(
                ListParams::from_options(options),
                Err(DocRaptorError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_strict_flag_is_removed_from_fields() {
        let params = CreateParams::from_options(with_strict_flag(json!({"document_content": "x"})))
            .unwrap();
        assert!(params.strict);
        assert!(!params.fields.contains_key(RAISE_ON_FAILURE_KEY));
        assert!(!params.form_body().contains(RAISE_ON_FAILURE_KEY));
    }

    #[test]
    fn test_strict_flag_on_null_options() {
        let params = ListParams::from_options(with_strict_flag(Value::Null)).unwrap();
        assert!(params.strict);
        assert!(!params.fields.contains_key(RAISE_ON_FAILURE_KEY));
        assert!(matches!(
            with_strict_flag(json!("html")),
            Value::String(_)
        ));
    }

    #[test]
    fn test_flags_follow_nil_false_truthiness() {
        for flag in [json!(true), json!(0), json!(1), json!("1"), json!("false"), json!(""), json!([])] {
            let params = CreateParams::from_options(json!({
                "document_content": "x",
                "async": flag.clone(),
                "raise_exception_on_failure": flag.clone(),
            }))
            .unwrap();
            assert!(params.async_job, "async should be on for {flag}");
            assert!(params.strict, "strict should be on for {flag}");
        }
        for flag in [json!(false), Value::Null] {
            let params = CreateParams::from_options(json!({
                "document_content": "x",
                "async": flag.clone(),
                "raise_exception_on_failure": flag.clone(),
            }))
            .unwrap();
            assert!(!params.async_job, "async should be off for {flag}");
            assert!(!params.strict, "strict should be off for {flag}");
        }
    }

    #[test]
    fn test_form_body_nests_under_doc() {
        let params = CreateParams::from_options(json!({
            "document_content": "<b>a & b</b>",
            "prince_options": {"media": "print"},
            "tags": ["x", "y"],
        }))
        .unwrap();
        let body = params.form_body();
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert!(pairs.contains(&("doc[document_content]".into(), "<b>a & b</b>".into())));
        assert!(pairs.contains(&("doc[name]".into(), "default".into())));
        assert!(pairs.contains(&("doc[test]".into(), "false".into())));
        assert!(pairs.contains(&("doc[prince_options][media]".into(), "print".into())));
        assert!(pairs.contains(&("doc[tags][]".into(), "x".into())));
        assert!(pairs.contains(&("doc[tags][]".into(), "y".into())));
    }

    #[test]
    fn test_list_defaults_and_overrides() {
        let params = ListParams::from_options(json!({})).unwrap();
        let pairs = params.query_pairs();
        assert!(pairs.contains(&("page".into(), "1".into())));
        assert!(pairs.contains(&("per_page".into(), "100".into())));

        let params = ListParams::from_options(json!({"page": 3, "raise_exception_on_failure": true}))
            .unwrap();
        assert!(params.strict);
        let pairs = params.query_pairs();
        assert!(pairs.contains(&("page".into(), "3".into())));
        assert!(!pairs.iter().any(|(k, _)| k == RAISE_ON_FAILURE_KEY));
    }

    #[test]
    fn test_blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!(false)));
        assert!(is_blank(&json!(" \n")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!("x")));
        assert!(!is_blank(&json!(0)));
    }

    #[test]
    fn test_typed_builder_produces_mapping() {
        let value = CreateOptions::from_url("https://example.com/invoice")
            .name("invoice.pdf")
            .async_job(true)
            .field("javascript", true)
            .into_value();
        assert_eq!(
            value,
            json!({
                "name": "invoice.pdf",
                "document_url": "https://example.com/invoice",
                "async": true,
                "javascript": true,
            })
        );
        let params = CreateParams::from_options(value).unwrap();
        assert!(params.async_job);
    }
}
