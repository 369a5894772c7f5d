use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Sweep service - run options")]
pub struct RunOptions {
    #[structopt(
        long = "sweep-once",
        help = "Evaluate all enabled rules once and exit"
    )]
    pub sweep_once: bool,

    #[structopt(long = "http", help = "Enable http server")]
    pub http: bool,

    #[structopt(
        long = "http-threads",
        help = "Number of threads to use for the server",
        default_value = "2"
    )]
    pub http_threads: u64,

    #[structopt(
        long = "http-port",
        help = "Port number of the server",
        default_value = "8080"
    )]
    pub http_port: u16,

    #[structopt(
        long = "http-addr",
        help = "Bind address of the server",
        default_value = "127.0.0.1"
    )]
    pub http_addr: String,

    #[structopt(long = "debug", help = "Enabled debug endpoint for the server")]
    pub debug: bool,
}

#[derive(StructOpt)]
#[structopt(about = "Options for the stats command")]
pub struct StatsOptions {
    #[structopt(
        short = "r",
        long = "rule-id",
        help = "Limit record counts to one rule"
    )]
    pub rule_id: Option<i64>,
}

#[derive(StructOpt)]
pub enum SweeperCommands {
    #[structopt(about = "Watch enabled rules and sweep matured balances")]
    Run {
        #[structopt(flatten)]
        run_options: RunOptions,
    },
    #[structopt(about = "Generate a signing key and print the derived address")]
    GenerateKey,
    #[structopt(about = "Show rule and history counts from the database")]
    Stats {
        #[structopt(flatten)]
        stats_options: StatsOptions,
    },
}

#[derive(StructOpt)]
#[structopt(about = "TRC20 sweep service admin tool")]
pub struct SweeperOptions {
    #[structopt(
        short = "c",
        long = "config",
        default_value = "config-sweeper.toml",
        help = "Path to the service configuration file"
    )]
    pub config: String,

    #[structopt(subcommand)]
    pub commands: SweeperCommands,
}
