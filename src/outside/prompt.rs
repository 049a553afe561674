use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use miette::{Context, IntoDiagnostic};

use crate::result::Result;

/// Interface for asking the user questions.
///
/// Every method returns `Ok(None)` when the user dismissed the prompt.
pub trait Prompter: Sync {
    /// Pick one of the choices, returning its index
    fn ask_list(&self, message: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Pick any number of the choices, returning their indexes in ascending order
    fn ask_checkbox(&self, message: &str, choices: &[String]) -> Result<Option<Vec<usize>>>;

    fn ask_confirm(&self, message: &str, default: bool) -> Result<Option<bool>>;

    /// Free text answer
    fn ask_text(&self, message: &str) -> Result<Option<String>>;
}

/// Prompts rendered on the terminal
#[derive(Debug, Default)]
pub struct Terminal;

impl Prompter for Terminal {
    fn ask_list(&self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        Ok(Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(choices)
            .default(0)
            .interact_opt()
            .into_diagnostic()
            .wrap_err("Could not read the answer")?)
    }

    fn ask_checkbox(&self, message: &str, choices: &[String]) -> Result<Option<Vec<usize>>> {
        let selection = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(choices)
            .interact_opt()
            .into_diagnostic()
            .wrap_err("Could not read the selection")?;

        Ok(selection.map(|mut idx| {
            idx.sort_unstable();
            idx
        }))
    }

    fn ask_confirm(&self, message: &str, default: bool) -> Result<Option<bool>> {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact_opt()
            .into_diagnostic()
            .wrap_err("Could not read the answer")?)
    }

    fn ask_text(&self, message: &str) -> Result<Option<String>> {
        let answer = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()
            .wrap_err("Could not read the answer")?;

        Ok(Some(answer))
    }
}
