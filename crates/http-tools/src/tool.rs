//! Declarative HTTP tool definitions.
//!
//! A [`ToolSpec`] describes one Bitrise API endpoint: method, path template, parameters and the API
//! groups it belongs to. From that description we derive the MCP input schema, the tool
//! annotations and, per call, the concrete [`UpstreamRequest`].

use crate::runtime::{ApiBase, HttpToolsError, Result, UpstreamRequest};
use reqwest::Method;
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;

/// Group every `GET` tool is a member of.
pub const READ_ONLY_GROUP: &str = "read-only";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    fn schema_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    location: ParamLocation,
    ty: ParamType,
    description: String,
    required: bool,
    default: Option<Value>,
    one_of: Vec<Value>,
    /// Dotted field path inside the request body; defaults to `name`.
    sent_as: Option<String>,
}

impl Param {
    fn new(name: &str, location: ParamLocation, ty: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            location,
            ty,
            description: description.to_string(),
            required: false,
            default: None,
            one_of: Vec::new(),
            sent_as: None,
        }
    }

    /// A required string path segment (`{name}` in the path template).
    #[must_use]
    pub fn path(name: &str, description: &str) -> Self {
        Self::new(name, ParamLocation::Path, ParamType::String, description).required()
    }

    #[must_use]
    pub fn query(name: &str, ty: ParamType, description: &str) -> Self {
        Self::new(name, ParamLocation::Query, ty, description)
    }

    #[must_use]
    pub fn body(name: &str, ty: ParamType, description: &str) -> Self {
        Self::new(name, ParamLocation::Body, ty, description)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.one_of = values.into_iter().map(Into::into).collect();
        self
    }

    /// Send a body parameter under a different (possibly nested, dot-separated) field.
    #[must_use]
    pub fn sent_as(mut self, field: &str) -> Self {
        self.sent_as = Some(field.to_string());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn wire_name(&self) -> &str {
        self.sent_as.as_deref().unwrap_or(&self.name)
    }

    fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.ty.schema_type(),
            "description": self.description,
        });
        match self.ty {
            ParamType::Array => schema["items"] = json!({ "type": "string" }),
            ParamType::Object => schema["additionalProperties"] = json!({ "type": "string" }),
            _ => {}
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        if !self.one_of.is_empty() {
            schema["enum"] = Value::Array(self.one_of.clone());
        }
        schema
    }

    fn check(&self, value: &Value) -> Result<()> {
        if !self.ty.accepts(value) {
            return Err(HttpToolsError::InvalidArguments(format!(
                "parameter '{}' must be of type {}",
                self.name,
                self.ty.schema_type()
            )));
        }
        if !self.one_of.is_empty() && !self.one_of.contains(value) {
            return Err(HttpToolsError::InvalidArguments(format!(
                "parameter '{}' must be one of {}",
                self.name,
                Value::Array(self.one_of.clone())
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    name: String,
    description: String,
    base: ApiBase,
    method: Method,
    path: String,
    fallback_path: Option<String>,
    params: Vec<Param>,
    groups: Vec<String>,
    fixed_body: Option<Value>,
}

impl ToolSpec {
    #[must_use]
    pub fn new(name: &str, method: Method, path: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            base: ApiBase::Core,
            method,
            path: path.to_string(),
            fallback_path: None,
            params: Vec::new(),
            groups: Vec::new(),
            fixed_body: None,
        }
    }

    #[must_use]
    pub fn group(mut self, group: &str) -> Self {
        self.groups.push(group.to_string());
        self
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Resolve the path against `base` instead of the core API.
    #[must_use]
    pub fn on(mut self, base: ApiBase) -> Self {
        self.base = base;
        self
    }

    /// Path used when an optional path parameter is not supplied.
    #[must_use]
    pub fn fallback_path(mut self, path: &str) -> Self {
        self.fallback_path = Some(path.to_string());
        self
    }

    /// JSON object every request body starts from; parameters are merged into it.
    #[must_use]
    pub fn fixed_body(mut self, body: Value) -> Self {
        self.fixed_body = Some(body);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared groups plus [`READ_ONLY_GROUP`] for `GET` tools.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.groups.iter().map(String::as_str).collect();
        if self.is_read_only() && !groups.contains(&READ_ONLY_GROUP) {
            groups.push(READ_ONLY_GROUP);
        }
        groups
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.method == Method::GET
    }

    /// Reject definitions whose parameters cannot produce a well-formed request.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(HttpToolsError::Config(format!(
                    "tool '{}' declares parameter '{}' twice",
                    self.name, param.name
                )));
            }
            if param.location == ParamLocation::Path
                && !self.path.contains(&format!("{{{}}}", param.name))
            {
                return Err(HttpToolsError::Config(format!(
                    "tool '{}' has path parameter '{}' missing from '{}'",
                    self.name, param.name, self.path
                )));
            }
            if param.location == ParamLocation::Path && !param.required && self.fallback_path.is_none()
            {
                return Err(HttpToolsError::Config(format!(
                    "tool '{}' has optional path parameter '{}' but no fallback path",
                    self.name, param.name
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(param.name.clone(), param.schema());
            if param.required && param.default.is_none() {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        schema
    }

    #[must_use]
    pub fn annotations(&self) -> ToolAnnotations {
        let method = &self.method;
        let (read_only, destructive, idempotent) = if method == Method::GET {
            (true, false, Some(true))
        } else if method == Method::POST {
            (false, false, Some(false))
        } else if method == Method::PUT || method == Method::DELETE {
            (false, true, Some(true))
        } else {
            // PATCH may or may not be idempotent.
            (false, true, None)
        };
        ToolAnnotations {
            title: None,
            read_only_hint: Some(read_only),
            destructive_hint: Some(destructive),
            idempotent_hint: idempotent,
            open_world_hint: Some(true),
        }
    }

    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema()),
        );
        tool.annotations = Some(self.annotations());
        tool
    }

    /// Assemble the upstream request for one call.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::InvalidArguments`] if `arguments` is not an object, a required
    /// parameter is missing, or a value has the wrong type or is outside its allowed set.
    pub fn build_request(&self, arguments: &Value) -> Result<UpstreamRequest> {
        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(HttpToolsError::InvalidArguments(
                    "arguments must be a JSON object".to_string(),
                ));
            }
        };

        let mut path = self.path.clone();
        let mut path_complete = true;
        let mut query = Vec::new();
        let mut body = self.fixed_body.clone();

        for param in &self.params {
            let value = match args.get(&param.name) {
                None | Some(Value::Null) => param.default.clone(),
                Some(v) => Some(v.clone()),
            };
            let Some(value) = value else {
                if param.required {
                    return Err(HttpToolsError::InvalidArguments(format!(
                        "missing required parameter: {}",
                        param.name
                    )));
                }
                if param.location == ParamLocation::Path {
                    path_complete = false;
                }
                continue;
            };
            param.check(&value)?;

            match param.location {
                ParamLocation::Path => {
                    let segment = path_segment(&param.name, &value)?;
                    path = path.replace(&format!("{{{}}}", param.name), &segment);
                }
                ParamLocation::Query => push_query(&mut query, &param.name, &value),
                ParamLocation::Body => {
                    let root = body.get_or_insert_with(|| Value::Object(Map::new()));
                    insert_dotted(root, param.wire_name(), value);
                }
            }
        }

        if !path_complete {
            path = self.fallback_path.clone().ok_or_else(|| {
                HttpToolsError::InvalidArguments(format!("incomplete path for tool {}", self.name))
            })?;
        }

        Ok(UpstreamRequest {
            base: self.base,
            method: self.method.clone(),
            path,
            query,
            body,
        })
    }
}

fn path_segment(name: &str, value: &Value) -> Result<String> {
    let segment = scalar_to_string(value);
    if segment.is_empty() || segment.contains(['/', '?', '#']) || segment == ".." {
        return Err(HttpToolsError::InvalidArguments(format!(
            "parameter '{name}' is not a valid path segment"
        )));
    }
    Ok(segment)
}

/// Empty strings are treated as "not set"; arrays repeat the key.
fn push_query(query: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                push_query(query, name, item);
            }
        }
        Value::String(s) if s.is_empty() => {}
        other => query.push((name.to_string(), scalar_to_string(other))),
    }
}

fn insert_dotted(root: &mut Value, field: &str, value: Value) {
    let mut current = root;
    let mut segments = field.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
