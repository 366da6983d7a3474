//! Built-in value resolver strategies

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::ValueResolver;
use crate::settings::SettingValues;
use crate::task::model::Placeholder;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::env;

pub const STATIC_RESOLVER: &str = "STATIC";
pub const FLAG_RESOLVER: &str = "FLAG";
pub const SETTING_RESOLVER: &str = "SETTING";
pub const ENV_RESOLVER: &str = "ENV";

/// Resolver configuration shared by the built-in strategies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Alias used for supplied values and prompts
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub value_type: Option<String>,

    #[serde(default)]
    pub default_value: Option<Value>,

    /// Settings that must exist before resolving
    #[serde(default)]
    pub setting_paths: Vec<String>,

    /// Setting to derive the default from (`SETTING`)
    #[serde(default)]
    pub setting: Option<String>,

    /// Environment variable to derive the default from (`ENV`)
    #[serde(default)]
    pub env: Option<String>,
}

impl ResolverConfig {
    /// Parse the configuration mapping of a placeholder
    pub fn from_mapping(resolver: &str, mapping: &Mapping) -> ResolveResult<Self> {
        serde_yaml::from_value(Value::Mapping(mapping.clone())).map_err(|e| {
            ResolveError::InvalidConfiguration {
                resolver: resolver.to_string(),
                error: e.to_string(),
            }
        })
    }
}

/// What sets one built-in strategy apart from the others
///
/// Everything else (id, alias, description, required settings) is shared
/// through [`BuiltinResolver`].
pub trait Strategy: Sized {
    /// Resolver id used in task records
    const ID: &'static str;

    /// Build the strategy from its placeholder configuration
    fn from_config(config: &ResolverConfig, placeholder: &str) -> ResolveResult<Self>;

    /// Value type forced by the strategy, if any
    fn value_type(&self) -> Option<&'static str> {
        None
    }

    fn default_value(&self, config: &ResolverConfig) -> Option<Value> {
        config.default_value.clone()
    }

    /// Setting paths the strategy itself depends on
    fn setting_paths(&self) -> Vec<String> {
        Vec::new()
    }

    /// Derive a default; `name` is the value name of the placeholder
    fn value_from_settings(&self, settings: &SettingValues, name: &str) -> ResolveResult<Value>;
}

/// A built-in resolver: shared configuration plus one [`Strategy`]
#[derive(Debug, Clone)]
pub struct BuiltinResolver<S> {
    id: String,
    config: ResolverConfig,
    description: String,
    strategy: S,
}

impl<S: Strategy> BuiltinResolver<S> {
    pub fn from_placeholder(placeholder: &Placeholder) -> ResolveResult<Self> {
        let config = ResolverConfig::from_mapping(S::ID, placeholder.configuration())?;
        let strategy = S::from_config(&config, placeholder.name())?;
        let description = config
            .description
            .clone()
            .unwrap_or_else(|| format!("Value for {}", placeholder.name()));

        Ok(BuiltinResolver {
            id: placeholder.name().to_string(),
            config,
            description,
            strategy,
        })
    }
}

impl<S: Strategy> ValueResolver for BuiltinResolver<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn alias(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn value_type(&self) -> &str {
        self.strategy
            .value_type()
            .or(self.config.value_type.as_deref())
            .unwrap_or("string")
    }

    fn default_value(&self) -> Option<Value> {
        self.strategy.default_value(&self.config)
    }

    fn required_setting_paths(&self) -> Vec<String> {
        let mut paths = self.strategy.setting_paths();
        for path in &self.config.setting_paths {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    fn value_from_settings(&self, settings: &SettingValues) -> ResolveResult<Value> {
        self.strategy.value_from_settings(settings, self.value_name())
    }
}

fn required_config(resolver: &str, key: &str, value: &Option<String>, placeholder: &str) -> ResolveResult<String> {
    value.clone().ok_or_else(|| ResolveError::InvalidConfiguration {
        resolver: resolver.to_string(),
        error: format!("'{}' is required for placeholder '{}'", key, placeholder),
    })
}

/// Offers a configured default value
#[derive(Debug, Clone, Copy)]
pub struct Static;

impl Strategy for Static {
    const ID: &'static str = STATIC_RESOLVER;

    fn from_config(_config: &ResolverConfig, _placeholder: &str) -> ResolveResult<Self> {
        Ok(Static)
    }

    fn value_from_settings(&self, _settings: &SettingValues, name: &str) -> ResolveResult<Value> {
        Err(ResolveError::MissingValue(name.to_string()))
    }
}

/// A yes/no flag, `false` unless configured otherwise
#[derive(Debug, Clone, Copy)]
pub struct Flag;

impl Strategy for Flag {
    const ID: &'static str = FLAG_RESOLVER;

    fn from_config(_config: &ResolverConfig, _placeholder: &str) -> ResolveResult<Self> {
        Ok(Flag)
    }

    fn value_type(&self) -> Option<&'static str> {
        Some("boolean")
    }

    fn default_value(&self, config: &ResolverConfig) -> Option<Value> {
        Some(config.default_value.clone().unwrap_or(Value::Bool(false)))
    }

    fn value_from_settings(&self, _settings: &SettingValues, _name: &str) -> ResolveResult<Value> {
        Ok(Value::Bool(false))
    }
}

/// Derives its default from a stored setting
#[derive(Debug, Clone)]
pub struct SettingLookup {
    setting: String,
}

impl Strategy for SettingLookup {
    const ID: &'static str = SETTING_RESOLVER;

    fn from_config(config: &ResolverConfig, placeholder: &str) -> ResolveResult<Self> {
        let setting = required_config(Self::ID, "setting", &config.setting, placeholder)?;
        Ok(SettingLookup { setting })
    }

    fn setting_paths(&self) -> Vec<String> {
        vec![self.setting.clone()]
    }

    fn value_from_settings(&self, settings: &SettingValues, _name: &str) -> ResolveResult<Value> {
        match settings.get(&self.setting) {
            Some(Value::Null) | None => Err(ResolveError::MissingValue(self.setting.clone())),
            Some(value) => Ok(value.clone()),
        }
    }
}

/// Derives its default from an environment variable
#[derive(Debug, Clone)]
pub struct EnvLookup {
    variable: String,
}

impl Strategy for EnvLookup {
    const ID: &'static str = ENV_RESOLVER;

    fn from_config(config: &ResolverConfig, placeholder: &str) -> ResolveResult<Self> {
        let variable = required_config(Self::ID, "env", &config.env, placeholder)?;
        Ok(EnvLookup { variable })
    }

    fn value_from_settings(&self, _settings: &SettingValues, _name: &str) -> ResolveResult<Value> {
        env::var(&self.variable)
            .map(Value::String)
            .map_err(|_| ResolveError::MissingValue(self.variable.clone()))
    }
}

pub type StaticValueResolver = BuiltinResolver<Static>;
pub type FlagValueResolver = BuiltinResolver<Flag>;
pub type SettingValueResolver = BuiltinResolver<SettingLookup>;
pub type EnvValueResolver = BuiltinResolver<EnvLookup>;
