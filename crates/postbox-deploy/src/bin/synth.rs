//! Stack synthesis CLI.
//!
//! Every flag is backed by the environment variable of the same concern,
//! so a `.env`-style deployment shell needs no arguments at all:
//! `postbox-synth > template.json`.

use std::path::PathBuf;

use clap::Parser;

use postbox_deploy::app::build_main_stack;
use postbox_types::config::DeployConfig;

#[derive(Debug, Parser)]
#[command(name = "postbox-synth", about = "Synthesize the Postbox deployment template")]
struct Args {
    #[arg(long, env = "APP_NAME")]
    app_name: String,

    #[arg(long, env = "ENV_NAME")]
    env_name: String,

    #[arg(long, env = "DB_NAME")]
    db_name: String,

    #[arg(long, env = "REPO_OWNER_NAME")]
    repo_owner_name: String,

    #[arg(long, env = "REPO_NAME")]
    repo_name: String,

    #[arg(long, env = "BRANCH_NAME")]
    branch_name: String,

    #[arg(long, env = "CONNECTION_ID")]
    connection_id: String,

    #[arg(long, env = "S3_LOGGING_BUCKET_NAME")]
    s3_logging_bucket_name: Option<String>,

    #[arg(long, env = "READER_NUM", default_value_t = 1)]
    reader_num: u32,

    #[arg(long, env = "MIN_ACU", default_value_t = 0.5)]
    min_acu: f64,

    #[arg(long, env = "MAX_ACU", default_value_t = 2.0)]
    max_acu: f64,

    #[arg(long, env = "ALLOW_ORIGINS", value_delimiter = ',')]
    allow_origins: Vec<String>,

    #[arg(long, env = "NOTICE_EMAIL_ADDRESSES", value_delimiter = ',')]
    notice_email_addresses: Vec<String>,

    #[arg(long, env = "ALERT_EMAIL_ADDRESSES", value_delimiter = ',')]
    alert_email_addresses: Vec<String>,

    #[arg(long, env = "ALARM_ACTIONS_ENABLED", default_value_t = false)]
    alarm_actions_enabled: bool,

    /// Write the template here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> (DeployConfig, Option<PathBuf>) {
        let output = self.output;
        let config = DeployConfig {
            app_name: self.app_name,
            env_name: self.env_name,
            db_name: self.db_name,
            repo_owner_name: self.repo_owner_name,
            repo_name: self.repo_name,
            branch_name: self.branch_name,
            connection_id: self.connection_id,
            s3_logging_bucket_name: self.s3_logging_bucket_name,
            reader_num: self.reader_num,
            min_acu: self.min_acu,
            max_acu: self.max_acu,
            allow_origins: self.allow_origins,
            notice_email_addresses: self.notice_email_addresses,
            alert_email_addresses: self.alert_email_addresses,
            alarm_actions_enabled: self.alarm_actions_enabled,
        };
        (config, output)
    }
}

fn main() -> anyhow::Result<()> {
    postbox_observe::tracing_setup::init_cli();

    let (config, output) = Args::parse().into_config();
    let app_id = config.app_id();
    let template = build_main_stack(&config)?;
    let rendered = template.to_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            tracing::info!(stack = %app_id, path = %path.display(), "template written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
