//! Placeholder value resolution
//!
//! Every strategy follows the same precedence chain, implemented once in
//! [`ValueResolver::resolve`]:
//!
//! 1. a value already supplied to the receiver (e.g. a CLI flag) wins;
//! 2. every required setting path must be present, else `MissingSetting`;
//! 3. the default is the static default, else one derived from settings
//!    (a `MissingValue` during derivation just means "no default");
//! 4. non-optional placeholders are confirmed through the receiver's prompt,
//!    optional ones return the default untouched.

pub mod builtin;
pub mod receiver;
pub mod registry;

pub use builtin::*;
pub use receiver::*;
pub use registry::*;

use crate::error::{is_missing_value, ResolveError, ResolveResult};
use crate::settings::SettingValues;
use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

/// Resolved placeholder values keyed by placeholder name
pub type ResolvedValues = IndexMap<String, Option<Value>>;

/// A strategy producing a concrete value for one placeholder
pub trait ValueResolver {
    /// Placeholder this resolver was built for
    fn id(&self) -> &str;

    /// Name used for externally supplied values and prompts, if not the id
    fn alias(&self) -> Option<&str> {
        None
    }

    /// Prompt text
    fn description(&self) -> &str;

    /// Value type passed to the receiver (`string`, `boolean`, ...)
    fn value_type(&self) -> &str {
        "string"
    }

    /// Static default, if configured
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Setting paths that must exist before resolving
    fn required_setting_paths(&self) -> Vec<String> {
        Vec::new()
    }

    /// Derive a default from settings
    ///
    /// Returns [`ResolveError::MissingValue`] when nothing usable is found.
    fn value_from_settings(&self, settings: &SettingValues) -> ResolveResult<Value>;

    /// Name the value is looked up and asked under
    fn value_name(&self) -> &str {
        self.alias().unwrap_or_else(|| self.id())
    }

    /// Run the precedence chain
    fn resolve(
        &self,
        settings: &SettingValues,
        receiver: &mut dyn ValueReceiver,
        optional: bool,
    ) -> ResolveResult<Option<Value>> {
        let name = self.value_name();

        if receiver.has(name) {
            debug!(placeholder = self.id(), name, "using supplied value");
            return Ok(receiver.get(name));
        }

        let missing: Vec<String> = self
            .required_setting_paths()
            .into_iter()
            .filter(|path| !settings.contains_key(path))
            .collect();

        if !missing.is_empty() {
            return Err(ResolveError::MissingSetting {
                placeholder: self.id().to_string(),
                paths: missing,
            });
        }

        let default = match self.default_value() {
            Some(value) => Some(value),
            None => match self.value_from_settings(settings) {
                Ok(value) => Some(value),
                Err(e) if is_missing_value(&e) => None,
                Err(e) => return Err(e),
            },
        };

        if optional {
            debug!(placeholder = self.id(), "optional, keeping default");
            return Ok(default);
        }

        receiver.receive_value(self.description(), default, self.value_type())
    }
}
