use anyhow::Context;
use structopt::StructOpt;

use crate::config::Config;
use crate::mpd::Mpd;

#[derive(StructOpt)]
pub enum Cmd {
    /// Connects to mpd and reports its version and database size.
    Ping,
}

pub async fn run(cmd: Cmd, config: Config) -> anyhow::Result<()> {
    match cmd {
        Cmd::Ping => ping(config).await,
    }
}

async fn ping(config: Config) -> anyhow::Result<()> {
    let mut mpd = Mpd::connect(&config.mpd).await?;
    let version = mpd.protocol_version().to_string();

    let files = mpd.listall().await.context("reading the mpd database")?;
    mpd.close().await?;

    log::info!("mpd at {} speaks protocol {version}, {} files in database",
        config.mpd.address, files.len());

    Ok(())
}
