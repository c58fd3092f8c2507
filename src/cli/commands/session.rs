//! Session commands: login, logout and who/what am I talking to

use crate::cli::args::{LoginArgs, OutputFormat};
use crate::cli::Shell;
use crate::error::{Result, ShellError};
use crate::output;

/// Handle the login command
pub fn login(shell: &mut Shell, args: &LoginArgs, format: OutputFormat) -> Result<String> {
    let fresh = shell
        .session
        .login(&mut shell.caches, args.username.as_deref(), args.server.as_deref())?;
    let session = shell.session.session().ok_or(ShellError::NotLoggedIn)?;

    let message = if fresh {
        format!("Logged in to {} as {}", session.server, session.username)
    } else {
        format!("Already logged in to {} as {}", session.server, session.username)
    };
    output::format_success(&message, session, format)
}

/// Handle the logout command.
///
/// Never prompts: a session still valid on the server is ended there, and
/// the caches of the configured server/user pair are cleared either way.
pub fn logout(shell: &mut Shell, format: OutputFormat) -> Result<String> {
    shell.session.resume(&mut shell.caches);
    let server = shell.session.server().map(str::to_string);
    shell.session.logout(&mut shell.caches);

    let message = match server {
        Some(ref server) => format!("Logged out of {server}"),
        None => "Logged out".to_string(),
    };
    output::format_success(&message, &serde_json::json!({ "logged_out": server }), format)
}

/// Handle the whoami command
pub fn whoami(shell: &Shell, format: OutputFormat) -> Result<String> {
    let username = shell.session.whoami().ok_or(ShellError::NotLoggedIn)?;
    output::format_value("username", &username, format)
}

/// Handle the whoamitalkingto command
pub fn whoamitalkingto(shell: &Shell, format: OutputFormat) -> Result<String> {
    let server = shell.session.server().ok_or(ShellError::NotLoggedIn)?;
    output::format_value("server", &server, format)
}

/// Handle the get_apiversion command
pub fn get_apiversion(shell: &Shell, format: OutputFormat) -> Result<String> {
    let version = shell.session.api_version().ok_or(ShellError::NotLoggedIn)?;
    output::format_value("api_version", &version, format)
}

/// Handle the get_serverversion command
pub fn get_serverversion(shell: &Shell, format: OutputFormat) -> Result<String> {
    let version = shell.session.server_version()?;
    output::format_value("server_version", &version, format)
}

/// Handle the get_session command
pub fn get_session(shell: &Shell, format: OutputFormat) -> Result<String> {
    let session = shell.session.session().ok_or(ShellError::NotLoggedIn)?;
    output::format_session(session, format)
}
