use anyhow::{Context, bail};
use clap::Parser;
use difyctl::config::{Args, Command};
use difyctl::{Client, Config, UploadRequest, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    let Some(command) = args.command else {
        bail!("no command given, see --help");
    };

    let client = Client::new(&config)?;

    match command {
        Command::Upload { file, user } => {
            let user = user
                .or_else(|| config.user.clone())
                .context("no user given: pass --user or set `user` in the config")?;

            let uploaded = client.upload_file(&UploadRequest::new(file, user)).await?;
            println!("{}", serde_json::to_string_pretty(&uploaded)?);
        }
    }

    Ok(())
}
