//! Resolver strategy lookup

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::builtin::{
    EnvValueResolver, FlagValueResolver, SettingValueResolver, StaticValueResolver, ENV_RESOLVER,
    FLAG_RESOLVER, SETTING_RESOLVER, STATIC_RESOLVER,
};
use crate::resolver::{ResolvedValues, ValueReceiver, ValueResolver};
use crate::settings::SettingValues;
use crate::task::model::{Placeholder, Placeholders};
use serde_yaml::Value;
use std::collections::HashMap;
use tracing::debug;

/// Builds a resolver for one placeholder
pub type ResolverFactory = fn(&Placeholder) -> ResolveResult<Box<dyn ValueResolver>>;

/// Maps strategy ids to resolver factories
#[derive(Clone)]
pub struct ResolverRegistry {
    factories: HashMap<String, ResolverFactory>,
}

impl ResolverRegistry {
    /// Create a registry without any strategy
    pub fn empty() -> Self {
        ResolverRegistry {
            factories: HashMap::new(),
        }
    }

    /// Register a strategy, replacing any previous one with the same id
    pub fn register(&mut self, id: impl Into<String>, factory: ResolverFactory) {
        self.factories.insert(id.into(), factory);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Build the resolver a placeholder asks for
    pub fn create(&self, placeholder: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
        let factory = self
            .factories
            .get(placeholder.value_resolver())
            .ok_or_else(|| ResolveError::UnknownResolver(placeholder.value_resolver().to_string()))?;

        factory(placeholder)
    }

    /// Resolve one placeholder
    pub fn resolve(
        &self,
        placeholder: &Placeholder,
        settings: &SettingValues,
        receiver: &mut dyn ValueReceiver,
    ) -> ResolveResult<Option<Value>> {
        let resolver = self.create(placeholder)?;
        resolver.resolve(settings, receiver, placeholder.is_optional())
    }

    /// Resolve every placeholder in declaration order
    ///
    /// The first failure aborts; nothing is partially returned.
    pub fn resolve_all(
        &self,
        placeholders: &Placeholders,
        settings: &SettingValues,
        receiver: &mut dyn ValueReceiver,
    ) -> ResolveResult<ResolvedValues> {
        let mut values = ResolvedValues::new();

        for (name, placeholder) in placeholders {
            let value = self.resolve(placeholder, settings, receiver)?;
            debug!(placeholder = name.as_str(), resolved = value.is_some(), "resolved placeholder");
            values.insert(name.clone(), value);
        }

        Ok(values)
    }
}

impl Default for ResolverRegistry {
    /// Registry with the built-in strategies
    fn default() -> Self {
        let mut registry = ResolverRegistry::empty();
        registry.register(STATIC_RESOLVER, static_resolver);
        registry.register(FLAG_RESOLVER, flag_resolver);
        registry.register(SETTING_RESOLVER, setting_resolver);
        registry.register(ENV_RESOLVER, env_resolver);
        registry
    }
}

fn static_resolver(placeholder: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
    Ok(Box::new(StaticValueResolver::from_placeholder(placeholder)?))
}

fn flag_resolver(placeholder: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
    Ok(Box::new(FlagValueResolver::from_placeholder(placeholder)?))
}

fn setting_resolver(placeholder: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
    Ok(Box::new(SettingValueResolver::from_placeholder(placeholder)?))
}

fn env_resolver(placeholder: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
    Ok(Box::new(EnvValueResolver::from_placeholder(placeholder)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PresetReceiver;
    use serde_yaml::Mapping;

    fn placeholder(name: &str, resolver: &str, optional: bool, yaml: &str) -> Placeholder {
        let configuration: Mapping = serde_yaml::from_str(yaml).unwrap();
        Placeholder::new(name, resolver, configuration, optional)
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_default_registry_has_builtins() {
        let registry = ResolverRegistry::default();
        for id in [STATIC_RESOLVER, FLAG_RESOLVER, SETTING_RESOLVER, ENV_RESOLVER] {
            assert!(registry.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn test_unknown_resolver() {
        let registry = ResolverRegistry::default();
        let p = placeholder("%x%", "NOPE", false, "{}");
        let mut receiver = PresetReceiver::new();
        let result = registry.resolve(&p, &SettingValues::new(), &mut receiver);
        assert!(matches!(result, Err(ResolveError::UnknownResolver(ref id)) if id == "NOPE"));
    }

    #[test]
    fn test_supplied_value_wins_over_everything() {
        let registry = ResolverRegistry::default();
        // required setting missing and not optional: the supplied value still wins
        let p = placeholder(
            "%dir%",
            SETTING_RESOLVER,
            false,
            "name: dir\nsetting: project_dir\ndefaultValue: default\n",
        );
        let mut receiver = PresetReceiver::new().with_value("dir", string("supplied"));

        let value = registry.resolve(&p, &SettingValues::new(), &mut receiver).unwrap();
        assert_eq!(value, Some(string("supplied")));
        assert!(receiver.prompts().is_empty());
    }

    #[test]
    fn test_missing_required_setting() {
        let registry = ResolverRegistry::default();
        let p = placeholder(
            "%dir%",
            STATIC_RESOLVER,
            true,
            "defaultValue: x\nsettingPaths: [project_dir, php_version]\n",
        );
        let mut settings = SettingValues::new();
        settings.insert("project_dir".to_string(), string("/srv"));
        let mut receiver = PresetReceiver::new();

        let result = registry.resolve(&p, &settings, &mut receiver);
        match result {
            Err(ResolveError::MissingSetting { placeholder, paths }) => {
                assert_eq!(placeholder, "%dir%");
                assert_eq!(paths, vec!["php_version".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_required_prompts_exactly_once() {
        let registry = ResolverRegistry::default();
        let p = placeholder(
            "%name%",
            STATIC_RESOLVER,
            false,
            "description: Your name\ndefaultValue: World\n",
        );
        let mut receiver = PresetReceiver::new().with_answer(string("Rust"));

        let value = registry.resolve(&p, &SettingValues::new(), &mut receiver).unwrap();
        assert_eq!(value, Some(string("Rust")));
        assert_eq!(receiver.prompts(), &["Your name".to_string()]);
    }

    #[test]
    fn test_optional_never_prompts() {
        let registry = ResolverRegistry::default();
        let p = placeholder("%name%", STATIC_RESOLVER, true, "defaultValue: World\n");
        let mut receiver = PresetReceiver::new().with_answer(string("ignored"));

        let value = registry.resolve(&p, &SettingValues::new(), &mut receiver).unwrap();
        assert_eq!(value, Some(string("World")));
        assert!(receiver.prompts().is_empty());
    }

    #[test]
    fn test_static_default_wins_over_settings() {
        let registry = ResolverRegistry::default();
        let p = placeholder(
            "%dir%",
            SETTING_RESOLVER,
            true,
            "setting: project_dir\ndefaultValue: static\n",
        );
        let mut settings = SettingValues::new();
        settings.insert("project_dir".to_string(), string("/srv"));
        let mut receiver = PresetReceiver::new();

        let value = registry.resolve(&p, &settings, &mut receiver).unwrap();
        assert_eq!(value, Some(string("static")));
    }

    #[test]
    fn test_resolve_all_in_order() {
        let registry = ResolverRegistry::default();
        let mut placeholders = Placeholders::new();
        for p in [
            placeholder("%b%", STATIC_RESOLVER, true, "defaultValue: 2\n"),
            placeholder("%a%", FLAG_RESOLVER, true, "{}"),
        ] {
            placeholders.insert(p.name().to_string(), p);
        }
        let mut receiver = PresetReceiver::new();

        let values = registry
            .resolve_all(&placeholders, &SettingValues::new(), &mut receiver)
            .unwrap();
        let names: Vec<&String> = values.keys().collect();
        assert_eq!(names, vec!["%b%", "%a%"]);
        assert_eq!(values["%b%"], Some(Value::Number(2.into())));
        assert_eq!(values["%a%"], Some(Value::Bool(false)));
    }

    #[test]
    fn test_custom_strategy() {
        struct Answer;

        impl ValueResolver for Answer {
            fn id(&self) -> &str {
                "%answer%"
            }

            fn description(&self) -> &str {
                "The answer"
            }

            fn value_from_settings(&self, _settings: &SettingValues) -> ResolveResult<Value> {
                Ok(Value::Number(42.into()))
            }
        }

        fn answer(_: &Placeholder) -> ResolveResult<Box<dyn ValueResolver>> {
            Ok(Box::new(Answer))
        }

        let mut registry = ResolverRegistry::empty();
        registry.register("ANSWER", answer);

        let p = placeholder("%answer%", "ANSWER", true, "{}");
        let mut receiver = PresetReceiver::new();
        let value = registry.resolve(&p, &SettingValues::new(), &mut receiver).unwrap();
        assert_eq!(value, Some(Value::Number(42.into())));
    }
}
