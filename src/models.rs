use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend implementation targeted by the generic-model slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    SiliconFlow,
    ModelScope,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::SiliconFlow, ProviderId::ModelScope];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::SiliconFlow => "siliconflow",
            ProviderId::ModelScope => "modelscope",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderId::SiliconFlow => "https://api.siliconflow.cn",
            ProviderId::ModelScope => "https://dashscope.aliyuncs.com/compatible-mode",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProviderId::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!("Unsupported provider '{normalized}'. Use siliconflow or modelscope.")
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Dify,
    GenericLlm,
}

impl SlotKind {
    pub fn requires_variant(self) -> bool {
        matches!(self, SlotKind::GenericLlm)
    }

    pub fn as_label(self) -> &'static str {
        match self {
            SlotKind::Dify => "dify",
            SlotKind::GenericLlm => "generic-llm",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Empty,
    Filled,
    Testing,
    Valid,
    Invalid,
    Saved,
}

impl SlotStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            SlotStatus::Empty => "empty",
            SlotStatus::Filled => "filled",
            SlotStatus::Testing => "testing",
            SlotStatus::Valid => "valid",
            SlotStatus::Invalid => "invalid",
            SlotStatus::Saved => "saved",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Address,
    Key,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.key.is_none() && self.variant.is_none()
    }

    pub fn set(&mut self, field: CredentialField, error: Option<String>) {
        match field {
            CredentialField::Address => self.address = error,
            CredentialField::Key => self.key = error,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(e) = &self.address {
            out.push(format!("address: {e}"));
        }
        if let Some(e) = &self.key {
            out.push(format!("key: {e}"));
        }
        if let Some(e) = &self.variant {
            out.push(format!("provider: {e}"));
        }
        out
    }
}

/// Structured error body returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TeacherSettingsWire {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

/// Persisted configuration as reported by the backend. Never carries real secrets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfigResponse {
    pub has_dify_key: bool,
    pub has_generic_llm_key: bool,
    #[serde(default)]
    pub dify_base_url: Option<String>,
    #[serde(default)]
    pub generic_llm_base_url: Option<String>,
    #[serde(default)]
    pub generic_llm_provider: Option<String>,
    #[serde(default)]
    pub masked_dify_key: Option<String>,
    #[serde(default)]
    pub masked_generic_llm_key: Option<String>,
    pub teacher_settings: TeacherSettingsWire,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifyCredentialPayload {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenericLlmCredentialPayload {
    pub provider: ProviderId,
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveRequest {
    pub dify: DifyCredentialPayload,
    pub generic_llm: GenericLlmCredentialPayload,
    pub teacher_settings: TeacherSettingsWire,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestConnectionResult {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveConfigResponse {
    pub message: String,
}
