//! Shared helpers for command handlers.

use dialoguer::Confirm;

use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for confirmation, honoring `--yes`.
pub fn confirm(message: &str, assume_yes: bool) -> Result<bool, CliError> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Minimal CSV field escaping: quote when the field contains a comma,
/// quote or newline, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_fields_are_untouched() {
        assert_eq!(csv_field("light.kitchen"), "light.kitchen");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        assert_eq!(csv_field("Lamp, left"), "\"Lamp, left\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
