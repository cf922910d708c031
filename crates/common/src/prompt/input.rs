use std::str::FromStr;

use cliclack::{Input, Validate};

use super::{map_interact_error, PromptCancelled};

pub struct Prompt {
    inner: Input,
}

impl Prompt {
    pub fn new(question: &str) -> Self {
        Self {
            inner: Input::new(question),
        }
    }

    pub fn allow_empty(mut self) -> Self {
        self.inner = self.inner.required(false);
        self
    }

    pub fn default(mut self, default: &str) -> Self {
        self.inner = self.inner.default_input(default);
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.inner = self.inner.placeholder(placeholder);
        self
    }

    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Validate<String> + 'static,
        F::Err: ToString,
    {
        self.inner = self.inner.validate(f);
        self
    }

    pub fn ask<T>(mut self) -> anyhow::Result<T>
    where
        T: FromStr,
    {
        self.inner.interact().map_err(map_interact_error)
    }

    /// Asks for a value where an empty answer aborts the whole command.
    pub fn ask_required(self) -> anyhow::Result<String> {
        let answer: String = self.allow_empty().ask()?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(PromptCancelled.into());
        }
        Ok(answer.to_string())
    }
}
