use super::args::{Cli, Commands, ConfigCommand};
use super::handlers;
use super::logging;
use anyhow::Result;
use buildscan_runtime::{AnalyzeRequest, Config};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    match cli.command {
        Commands::Analyze {
            inputs,
            out,
            no_sanity,
            report_unresolved,
            no_augment,
            validate,
            report,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if no_sanity {
                config.sanity.enabled = false;
            }
            if report_unresolved {
                config.sanity.unresolved_references = true;
            }
            if no_augment {
                config.output.augment_metadata_as_source = false;
            }
            if validate {
                config.output.validate_outputs = true;
            }
            log::debug!("Effective configuration: {:?}", config);

            let request = AnalyzeRequest {
                inputs,
                out_dir: out,
                write_report: report,
            };
            handlers::analyze::handle(&config, &request, cli.format)
        }

        Commands::Patch { manifest } => handlers::patch::handle(&manifest, cli.format),

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(cli.config.as_deref(), cli.format),
            ConfigCommand::Init { force } => handlers::config::init(cli.config.as_deref(), force),
        },
    }
}
