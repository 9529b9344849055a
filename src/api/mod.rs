// src/api/mod.rs
//! MOJi API interaction: the ability to call the service the way its web
//! client does.
//!
//! Business logic depends on the [`MojiGateway`] trait, never on HTTP
//! details. The two endpoint families (Parse Cloud Functions and the REST
//! resources) share one transport primitive, [`MojiGateway::send`].

pub mod client;
pub mod envelope;
pub mod folders;
pub mod words;

use crate::error::GatewayError;
use envelope::Envelope;
use serde_json::{Map, Value};

/// A single remote call, independent of transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    /// `POST {parse}/functions/{name}`; auth fields are merged into the body.
    Function {
        name: String,
        params: Map<String, Value>,
    },
    /// `GET {rest}/{segments...}?{query}`; auth travels in headers only.
    Resource {
        segments: Vec<String>,
        query: Vec<(String, String)>,
    },
}

impl RemoteCall {
    pub fn function(name: &str, params: Map<String, Value>) -> Self {
        Self::Function {
            name: name.to_string(),
            params,
        }
    }

    pub fn resource(segments: &[&str], query: &[(&str, &str)]) -> Self {
        Self::Resource {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Function name or resource path, for logs.
    pub fn label(&self) -> String {
        match self {
            Self::Function { name, .. } => name.clone(),
            Self::Resource { segments, .. } => segments.join("/"),
        }
    }
}

/// The ability to talk to the MOJi backend as the logged-in user.
///
/// Calls are issued strictly one at a time by the exporter; implementors do
/// not need to support concurrent use beyond `Send + Sync`.
#[async_trait::async_trait]
pub trait MojiGateway: Send + Sync {
    /// Performs the call and returns the parsed JSON body.
    async fn send(&self, call: RemoteCall) -> Result<Value, GatewayError>;

    /// Invokes a Cloud Function and normalizes its envelope.
    ///
    /// A missing or null `result` is not an error here: the caller gets a
    /// synthetic `code: -1` envelope and must check [`Envelope::is_success`].
    async fn call_function(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Envelope, GatewayError> {
        let response = self.send(RemoteCall::function(name, params)).await?;
        Ok(Envelope::from_response(response))
    }

    /// Reads a REST resource.
    async fn get_resource(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        self.send(RemoteCall::resource(segments, query)).await
    }
}

pub use client::{ApiEndpoints, AppIdentity, MojiHttpClient, SessionContext};
pub use envelope::FolderPage;
pub use folders::{
    discover_folders, fetch_item_targets, select_folders, FolderHeuristic, FolderSelection,
    ItemTargets, SentenceKeywordHeuristic,
};
pub use words::WordResolver;
