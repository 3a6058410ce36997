//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(global)?;
            let rendered = match global.output {
                OutputFormat::Json => output::render_json(&config)?,
                OutputFormat::Table | OutputFormat::Plain => config.to_toml()?,
            };
            output::print_output(&rendered);
            Ok(())
        }
        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(satwatch_config::config_path);
            output::print_output(&path.display().to_string());
            Ok(())
        }
    }
}
