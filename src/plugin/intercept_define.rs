//! Replaces compile-time feature flags in module source

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{BuildPlugin, PluginContext};
use regex::{NoExpand, Regex};
use serde_json::{Map, Value};

pub const INTERCEPT_DEFINE_PLUGIN_NAME: &str = "uniboost:intercept-define";

/// Replacement table used when none is configured
pub fn default_replacements() -> Map<String, Value> {
    let mut replacements = Map::new();
    replacements.insert("__UNI_FEATURE_PAGES__".to_string(), Value::Bool(true));
    replacements
}

#[derive(Debug)]
pub struct InterceptDefinePlugin {
    replacements: Vec<(Regex, String)>,
    enable_logging: bool,
}

impl InterceptDefinePlugin {
    /// Keys are regular expressions; values are inserted in their string form
    pub fn new(replacements: &Map<String, Value>) -> PluginResult<Self> {
        let replacements = replacements
            .iter()
            .map(|(pattern, value)| {
                let regex = Regex::new(pattern).map_err(|e| PluginError::Creation {
                    kind: "intercept-define".to_string(),
                    message: format!("invalid pattern '{}': {}", pattern, e),
                })?;
                Ok((regex, define_value(value)))
            })
            .collect::<PluginResult<Vec<_>>>()?;

        Ok(Self {
            replacements,
            enable_logging: false,
        })
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Apply every replacement, `None` when nothing matched
    pub fn replace(&self, code: &str, id: &str) -> Option<String> {
        if code.is_empty() || self.replacements.is_empty() {
            return None;
        }

        let mut current = code.to_string();
        let mut changed = false;
        for (regex, value) in &self.replacements {
            if regex.is_match(&current) {
                current = regex.replace_all(&current, NoExpand(value)).into_owned();
                changed = true;
                if self.enable_logging {
                    log::debug!("Replaced {} -> {} in {}", regex.as_str(), value, id);
                }
            }
        }
        changed.then_some(current)
    }
}

fn define_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl BuildPlugin for InterceptDefinePlugin {
    fn name(&self) -> &str {
        INTERCEPT_DEFINE_PLUGIN_NAME
    }

    async fn transform(
        &mut self,
        code: &str,
        id: &str,
        _ctx: &mut dyn PluginContext,
    ) -> PluginResult<Option<String>> {
        Ok(self.replace(code, id))
    }
}
