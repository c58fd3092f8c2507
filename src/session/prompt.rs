//! Interactive credential prompts

use std::io::{self, BufRead, Write};

use crate::error::{Result, ShellError};

/// Source of credentials the configuration does not supply
pub trait Prompter {
    /// Ask for a non-empty username
    fn username(&self) -> Result<String>;

    fn password(&self) -> Result<String>;
}

/// Prompts on stderr, reads the username from stdin and the password without echo
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn username(&self) -> Result<String> {
        let stdin = io::stdin();
        loop {
            eprint!("Username: ");
            io::stderr().flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                return Err(ShellError::Prompt("no username given".to_string()));
            }

            let input = input.trim();
            if !input.is_empty() {
                return Ok(input.to_string());
            }
        }
    }

    fn password(&self) -> Result<String> {
        rpassword::prompt_password("Password: ").map_err(|e| ShellError::Prompt(e.to_string()))
    }
}

/// Prompter answering with fixed values; `None` fails like a closed terminal
#[cfg(test)]
#[derive(Default)]
pub struct FixedPrompter {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
impl Prompter for FixedPrompter {
    fn username(&self) -> Result<String> {
        self.username
            .clone()
            .ok_or_else(|| ShellError::Prompt("no username given".to_string()))
    }

    fn password(&self) -> Result<String> {
        self.password
            .clone()
            .ok_or_else(|| ShellError::Prompt("no password given".to_string()))
    }
}
