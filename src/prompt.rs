//! User interaction for pybake.
//! Questions go through the [`Prompter`] trait so answer collection can be
//! driven without a terminal.

use crate::error::Result;
use dialoguer::{Confirm, Input, Select};

pub trait Prompter {
    /// Asks for free text.
    fn text(&self, prompt: &str, default: &str) -> Result<String>;

    /// Asks to pick one of `choices`; returns the chosen index.
    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, prompt: &str, default: &str) -> Result<String> {
        let input = Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()?;
        Ok(input)
    }

    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize> {
        let selection =
            Select::new().with_prompt(prompt).default(default).items(choices).interact()?;
        Ok(selection)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::new().with_prompt(prompt).default(default).interact()?;
        Ok(answer)
    }
}
