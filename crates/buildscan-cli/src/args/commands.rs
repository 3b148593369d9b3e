use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Reconcile compiler invocations from build logs")]
    Analyze {
        #[arg(required = true, help = "Log files, or directories searched for *.log")]
        inputs: Vec<PathBuf>,

        #[arg(long, help = "Directory receiving the output lists")]
        out: PathBuf,

        #[arg(long, help = "Skip the sanity checks")]
        no_sanity: bool,

        #[arg(long, help = "Also report every unresolved reference")]
        report_unresolved: bool,

        #[arg(long, help = "Do not synthesize invocations for uncompiled references")]
        no_augment: bool,

        #[arg(long, help = "Fail when a final output assembly is missing")]
        validate: bool,

        #[arg(long, help = "Write report.json next to the output lists")]
        report: bool,
    },

    #[command(about = "Rewrite a fixed-width marker in produced files")]
    Patch {
        #[arg(long, help = "JSON manifest: marker, replacement, files")]
        manifest: PathBuf,
    },

    #[command(about = "Inspect or create the configuration file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,

    #[command(about = "Write the default configuration file")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}
