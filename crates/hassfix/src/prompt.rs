//! Interactive fix decisions.
//!
//! Implements the audit pipeline's decision seam with a dialoguer menu.
//! With `--yes` the first suggestion is taken without asking, which makes
//! `audit --fix -y` usable from scripts.

use dialoguer::Select;
use owo_colors::OwoColorize;

use hassfix_core::{FixContext, FixDecision, Prompt};

pub struct InteractivePrompt {
    assume_yes: bool,
    color: bool,
}

impl InteractivePrompt {
    pub fn new(assume_yes: bool, color: bool) -> Self {
        Self { assume_yes, color }
    }
}

impl Prompt for InteractivePrompt {
    fn decide(&mut self, context: &FixContext<'_>) -> FixDecision {
        if self.assume_yes {
            return if context.suggestions.is_empty() {
                FixDecision::Skip
            } else {
                FixDecision::Apply(0)
            };
        }

        let header = format!(
            "{}: '{}' references missing '{}'",
            context.target_label, context.document.label, context.identifier
        );
        if self.color {
            eprintln!("\n{}", header.yellow());
        } else {
            eprintln!("\n{header}");
        }

        let mut items: Vec<String> = context
            .suggestions
            .iter()
            .map(|s| format!("Replace with {s}"))
            .collect();
        let delete_index = context.can_delete.then(|| {
            items.push("Remove the reference".to_owned());
            items.len() - 1
        });
        items.push("Skip".to_owned());

        let selection = Select::new()
            .with_prompt("How should this be resolved?")
            .items(&items)
            .default(0)
            .interact();

        match selection {
            Ok(index) if index < context.suggestions.len() => FixDecision::Apply(index),
            Ok(index) if Some(index) == delete_index => FixDecision::Delete,
            // "Skip", or a prompt failure (e.g. no TTY).
            _ => FixDecision::Skip,
        }
    }
}
