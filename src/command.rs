use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::{BookishError, Result};

/// The request methods understood by the router
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// read a collection or a single entity
    Get,
    /// create an entity, or run an auth command
    Post,
    /// merge fields onto an existing entity
    Put,
    /// remove an entity
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request sent to the router: a method, a path, an optional query string and an
/// optional JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// the request method
    pub method: Method,
    /// the path component, e.g. `/api/books/book-1`
    pub path: String,
    /// the raw query string without the leading `?`
    pub query: Option<String>,
    /// the raw JSON body
    pub body: Option<String>,
}

impl Request {
    /// builds a request from a method and a target of the form `path[?query]`
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        Request {
            method,
            path: path.to_string(),
            query,
            body: None,
        }
    }

    /// a GET request for `target`
    pub fn get(target: &str) -> Self {
        Request::new(Method::Get, target)
    }

    /// a DELETE request for `target`
    pub fn delete(target: &str) -> Self {
        Request::new(Method::Delete, target)
    }

    /// attaches a raw body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// attaches `value` serialized as JSON
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.with_body(serde_json::to_string(value)?))
    }

    /// returns the first value of the query parameter `name`, percent-decoded.
    /// Empty values are reported as absent.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// deserializes the body into `T`
    ///
    /// # Errors
    /// `BookishError::BadRequest` if the body is missing or is not a valid `T`
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| BookishError::BadRequest("request body is required".to_string()))?;
        serde_json::from_str(body)
            .map_err(|e| BookishError::BadRequest(format!("invalid request body: {}", e)))
    }
}

/// The response envelope returned for every routed request.
///
/// On success `body` holds the serialized result, on failure it holds `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// an HTTP like status code
    pub status: u16,
    /// the JSON body
    pub body: Value,
}

impl Response {
    /// a 200 response containing `value`
    pub fn ok<T: Serialize>(value: &T) -> Result<Self> {
        Response::with_status(value, 200)
    }

    /// a 201 response containing `value`
    pub fn created<T: Serialize>(value: &T) -> Result<Self> {
        Response::with_status(value, 201)
    }

    /// a response containing `value` with the given `status`
    pub fn with_status<T: Serialize>(value: &T, status: u16) -> Result<Self> {
        Ok(Response {
            status,
            body: serde_json::to_value(value)?,
        })
    }

    /// an error envelope
    pub fn error(message: &str, status: u16) -> Self {
        Response {
            status,
            body: json!({ "error": message }),
        }
    }

    /// true if status is within 200..=299
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// the `error` field of an error envelope, if present
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl From<BookishError> for Response {
    fn from(err: BookishError) -> Self {
        Response::error(&err.to_string(), err.status())
    }
}
