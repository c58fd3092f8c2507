//! Software channel listing commands

use crate::cli::args::{ChildChannelArgs, OutputFormat};
use crate::cli::Shell;
use crate::error::Result;
use crate::output;

/// Handle the list_basechannels command
pub fn list_basechannels(shell: &mut Shell, format: OutputFormat) -> Result<String> {
    let channels = shell.resolver()?.list_base_channels()?;
    output::format_list(&channels, "No base channels found.", format)
}

/// Handle the list_childchannels command
pub fn list_childchannels(shell: &mut Shell, args: &ChildChannelArgs, format: OutputFormat) -> Result<String> {
    let channels = shell.resolver()?.list_child_channels(args.parent.as_deref())?;
    output::format_list(&channels, "No child channels found.", format)
}
