use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a registered process by name
    Run {
        #[arg(long, help = "Process name as registered in the metadata store")]
        process: String,

        #[arg(
            long,
            help = "Session variables, e.g. '{COBID: 20210401, MARKET: EU}'"
        )]
        variables: Option<String>,

        #[arg(long, help = "Render and report every statement without executing it")]
        no_execute: bool,

        #[arg(
            long,
            help = "If specified, writes the JSON run report to this file instead of stdout"
        )]
        output: Option<String>,

        #[arg(long, help = "Config file path, defaults to ~/.tideway/config.toml")]
        config: Option<String>,
    },
}
