use crate::models::TeacherSettingsWire;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

pub const TEMPERATURE: Bounds<f64> = Bounds { min: 0.0, max: 2.0 };
pub const TOP_P: Bounds<f64> = Bounds { min: 0.0, max: 1.0 };
pub const MAX_TOKENS: Bounds<u32> = Bounds { min: 1, max: 8192 };

/// Sampling parameters for the teacher model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterBlock {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for ParameterBlock {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<String>,
}

impl ParamErrors {
    pub fn messages(&self) -> Vec<String> {
        [&self.temperature, &self.top_p, &self.max_tokens]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamUpdate {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
}

fn range_error<T>(name: &str, value: T, bounds: Bounds<T>) -> Option<String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    // Written so that NaN fails both comparisons and is reported.
    if value >= bounds.min && value <= bounds.max {
        None
    } else {
        Some(format!(
            "{name} must be between {} and {}",
            bounds.min, bounds.max
        ))
    }
}

impl ParameterBlock {
    pub fn errors(&self) -> ParamErrors {
        ParamErrors {
            temperature: range_error("temperature", self.temperature, TEMPERATURE),
            top_p: range_error("top_p", self.top_p, TOP_P),
            max_tokens: range_error("max_tokens", self.max_tokens, MAX_TOKENS),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors() != ParamErrors::default()
    }

    pub fn apply(&mut self, update: ParamUpdate) {
        if let Some(v) = update.temperature {
            self.temperature = v;
        }
        if let Some(v) = update.top_p {
            self.top_p = v;
        }
        if let Some(v) = update.max_tokens {
            self.max_tokens = v;
        }
    }

    pub fn to_wire(self) -> TeacherSettingsWire {
        TeacherSettingsWire {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

impl From<TeacherSettingsWire> for ParameterBlock {
    fn from(wire: TeacherSettingsWire) -> Self {
        Self {
            temperature: wire.temperature,
            top_p: wire.top_p,
            max_tokens: wire.max_tokens,
        }
    }
}
