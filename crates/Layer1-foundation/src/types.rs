//! Wire types shared between the backend client and the dispatch server
//!
//! Field names follow the backend's JSON surface (camelCase).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Employee availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Busy,
}

/// Capability proficiency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    Junior,
    Senior,
    Expert,
}

/// One rated capability of an employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCapability {
    /// Capability tag, e.g. "code-review" or "analysis"
    #[serde(rename = "type")]
    pub capability_type: String,

    pub level: CapabilityLevel,

    #[serde(default)]
    pub domains: Vec<String>,
}

/// A digital employee profile as published by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,

    pub name: String,

    pub role: String,

    #[serde(default)]
    pub expertise: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub capabilities: Vec<EmployeeCapability>,

    pub status: EmployeeStatus,
}

/// Request envelope sent to the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(rename = "employeeId", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: None,
            priority: Priority::Normal,
            employee_id: None,
            capabilities: None,
            metadata: None,
        }
    }
}

/// Token accounting reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCounts {
    pub input: u32,
    pub output: u32,
}

/// Processing metadata attached to every answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "processingTime")]
    pub processing_time: u64,

    pub model: String,

    pub tokens: TokenCounts,
}

/// A cited source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub excerpt: String,
}

/// Answer envelope returned by the backend, cached verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,

    #[serde(rename = "employeeId")]
    pub employee_id: String,

    #[serde(rename = "employeeName")]
    pub employee_name: String,

    /// Confidence in [0, 1]
    pub confidence: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,

    #[serde(rename = "relatedQuestions", skip_serializing_if = "Option::is_none")]
    pub related_questions: Option<Vec<String>>,

    pub metadata: ResponseMetadata,
}

/// Backend health check outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Ok,
    Error,
}

impl HealthStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthState::Ok
    }
}
