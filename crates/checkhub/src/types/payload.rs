//! Type-specific payloads carried in envelopes.
//!
//! `CheckSpec` is what a check tests, `CheckReply` is what one check run
//! returned. Each variant's inner type implements [`Payload`] so the registry
//! can decode it from its tag.

use serde::{Deserialize, Serialize};

use crate::registry::{self, Envelope, Payload};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub values: Vec<String>,
}

/// HTTP check parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCheck {
    pub name: String,
    pub path: String,
    pub protocol: String,
    pub port: u16,
    pub verb: String,
    pub headers: Vec<Header>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudWatchMetric {
    pub namespace: String,
    pub name: String,
}

/// CloudWatch metric check parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudWatchCheck {
    pub metrics: Vec<CloudWatchMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub tags: Vec<Tag>,
    /// Unix seconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpResponse {
    pub code: u16,
    pub body: String,
    pub headers: Vec<Header>,
    pub metrics: Vec<Metric>,
    pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudWatchResponse {
    pub namespace: String,
    pub metrics: Vec<Metric>,
    pub errors: Vec<String>,
}

impl Payload for HttpCheck {
    const TAG: &'static str = "HttpCheck";
}

impl Payload for CloudWatchCheck {
    const TAG: &'static str = "CloudWatchCheck";
}

impl Payload for HttpResponse {
    const TAG: &'static str = "HttpResponse";
}

impl Payload for CloudWatchResponse {
    const TAG: &'static str = "CloudWatchResponse";
}

/// Decoded check specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSpec {
    HttpCheck(HttpCheck),
    CloudwatchCheck(CloudWatchCheck),
}

impl CheckSpec {
    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        match self {
            CheckSpec::HttpCheck(spec) => registry::encode(spec),
            CheckSpec::CloudwatchCheck(spec) => registry::encode(spec),
        }
    }
}

impl From<HttpCheck> for CheckSpec {
    fn from(spec: HttpCheck) -> Self {
        CheckSpec::HttpCheck(spec)
    }
}

impl From<CloudWatchCheck> for CheckSpec {
    fn from(spec: CloudWatchCheck) -> Self {
        CheckSpec::CloudwatchCheck(spec)
    }
}

/// Decoded reply of a single check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckReply {
    HttpResponse(HttpResponse),
    CloudwatchResponse(CloudWatchResponse),
}

impl CheckReply {
    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        match self {
            CheckReply::HttpResponse(reply) => registry::encode(reply),
            CheckReply::CloudwatchResponse(reply) => registry::encode(reply),
        }
    }
}

impl From<HttpResponse> for CheckReply {
    fn from(reply: HttpResponse) -> Self {
        CheckReply::HttpResponse(reply)
    }
}

impl From<CloudWatchResponse> for CheckReply {
    fn from(reply: CloudWatchResponse) -> Self {
        CheckReply::CloudwatchResponse(reply)
    }
}
