use crate::model::{ModelConfig, Parameters};

/// Command-line selection and overrides for one invocation.
///
/// Passed explicitly to the runner; an override always beats the model's
/// configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunPlan {
    pub prompt_filter: Option<String>,
    pub model_filter: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub repeat: Option<u32>,
}

/// Settings actually used for a model after overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub repeat: u32,
}

impl RunPlan {
    pub fn matches_prompt(&self, name: &str) -> bool {
        self.prompt_filter.as_deref().map_or(true, |f| f == name)
    }

    pub fn matches_model(&self, name: &str) -> bool {
        self.model_filter.as_deref().map_or(true, |f| f == name)
    }

    pub fn resolve(&self, model: &ModelConfig) -> EffectiveSettings {
        EffectiveSettings {
            temperature: self.temperature.unwrap_or(model.temperature),
            max_tokens: self.max_tokens.unwrap_or(model.max_tokens),
            repeat: self.repeat.unwrap_or(model.repeat),
        }
    }
}

impl EffectiveSettings {
    pub fn parameters(&self, model: &ModelConfig) -> Parameters {
        Parameters {
            model: model.name.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
