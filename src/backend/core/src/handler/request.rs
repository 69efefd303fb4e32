//! Per-request state handed to guards, stores and wrapped handlers.

use std::collections::HashMap;
use uuid::Uuid;

use crate::access::AccessContext;
use crate::error::{PortcullisError, Result};
use crate::identity::User;

/// Addressing parameters extracted by the router (`id`, slugs, parents).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse the parameter `key` as a UUID. Absent keys yield `Ok(None)`.
    pub fn uuid(&self, key: &str) -> Result<Option<Uuid>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|e| {
                PortcullisError::validation(format!("Invalid {}: {}", key, raw)).with_source(e)
            }),
        }
    }
}

impl From<HashMap<String, String>> for RouteParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

/// Everything a gated dispatch knows about the request it serves.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    user: User,
    params: RouteParams,
    context: AccessContext,
}

impl RequestContext {
    pub fn new(user: User) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            user,
            params: RouteParams::default(),
            context: AccessContext::default(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params = self.params.with(key, value);
        self
    }

    /// Extra values forwarded to every predicate of the access check.
    pub fn with_context(mut self, context: AccessContext) -> Self {
        self.context = context;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn context(&self) -> &AccessContext {
        &self.context
    }
}
