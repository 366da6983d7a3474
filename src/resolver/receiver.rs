//! Value receivers
//!
//! A receiver knows the values supplied up front (command line `--set`
//! options) and asks the operator for everything else.

use crate::error::{ResolveError, ResolveResult};
use crate::task::render::value_to_string;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Source of externally supplied and interactively confirmed values
pub trait ValueReceiver {
    /// Check if a value was supplied for `name`
    fn has(&self, name: &str) -> bool;

    /// Get a supplied value
    fn get(&self, name: &str) -> Option<Value>;

    /// Ask for a value, offering `default`
    fn receive_value(
        &mut self,
        description: &str,
        default: Option<Value>,
        value_type: &str,
    ) -> ResolveResult<Option<Value>>;
}

/// Non-interactive receiver
///
/// Answers prompts from a queue of scripted answers, falling back to the
/// offered default. Every prompt is recorded.
#[derive(Debug, Clone, Default)]
pub struct PresetReceiver {
    values: IndexMap<String, Value>,
    answers: VecDeque<Value>,
    prompts: Vec<String>,
}

impl PresetReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a value up front
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Queue an answer for the next prompt
    pub fn with_answer(mut self, value: Value) -> Self {
        self.answers.push_back(value);
        self
    }

    /// Descriptions of the prompts asked so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl ValueReceiver for PresetReceiver {
    fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn receive_value(
        &mut self,
        description: &str,
        default: Option<Value>,
        _value_type: &str,
    ) -> ResolveResult<Option<Value>> {
        self.prompts.push(description.to_string());
        Ok(self.answers.pop_front().or(default))
    }
}

/// Interactive receiver reading answers line by line
///
/// An empty answer accepts the default.
pub struct ConsoleReceiver<R, W> {
    values: IndexMap<String, Value>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleReceiver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsoleReceiver {
            values: IndexMap::new(),
            input,
            output,
        }
    }

    /// Supply values up front
    pub fn with_values(mut self, values: IndexMap<String, Value>) -> Self {
        self.values = values;
        self
    }

    fn prompt(&mut self, description: &str, default: Option<&Value>) -> ResolveResult<String> {
        let io_err = |e: std::io::Error| ResolveError::Receiver(e.to_string());

        let written = match default {
            Some(value) => write!(self.output, "{} [{}]: ", description, value_to_string(Some(value))),
            None => write!(self.output, "{}: ", description),
        };
        written.map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io_err)?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> ValueReceiver for ConsoleReceiver<R, W> {
    fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn receive_value(
        &mut self,
        description: &str,
        default: Option<Value>,
        value_type: &str,
    ) -> ResolveResult<Option<Value>> {
        let answer = self.prompt(description, default.as_ref())?;

        if answer.is_empty() {
            return Ok(default);
        }

        parse_answer(&answer, value_type).map(Some)
    }
}

/// Convert a typed answer to a value of the requested type
pub fn parse_answer(answer: &str, value_type: &str) -> ResolveResult<Value> {
    match value_type {
        "bool" | "boolean" => match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Ok(Value::Bool(true)),
            "n" | "no" | "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(ResolveError::Receiver(format!("'{}' is not a yes/no answer", answer))),
        },
        "int" | "integer" => answer
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|e| ResolveError::Receiver(format!("'{}' is not an integer: {}", answer, e))),
        "array" => Ok(Value::Sequence(
            answer
                .split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect(),
        )),
        _ => Ok(Value::String(answer.to_string())),
    }
}
