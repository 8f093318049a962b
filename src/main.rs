mod api;
mod config;
mod error;
mod http;
mod mpd;
mod tools;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use log::LevelFilter;
use structopt::StructOpt;

use crate::config::Config;
use crate::mpd::Mpd;

#[derive(StructOpt)]
struct Opt {
    /// Path to config.toml. Defaults to ./config.toml if present.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt)]
enum Cmd {
    Server,
    #[structopt(flatten)]
    Tool(tools::Cmd),
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::formatted_timed_builder()
        .filter(Some("mpd_remote"), LevelFilter::Debug)
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::from_args();

    let result: anyhow::Result<()> = async move {
        let config = config::load(opt.config.as_deref())?;

        match opt.cmd {
            Cmd::Server => run(config).await,
            Cmd::Tool(cmd) => tools::run(cmd, config).await,
        }
    }.await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let listen = config.http.listen;
    log::info!("Controlling mpd at {}", config.mpd.address);

    let app = App::new(config);
    let router = http::routes(app);
    let router = http::cors::wrap(router);

    let fut = axum::Server::try_bind(&listen)?
        .serve(router.into_make_service());

    log::info!("API on {listen}");

    fut.await?;

    Ok(())
}

#[derive(Clone)]
pub struct App(pub Arc<AppShared>);

impl App {
    pub async fn session(&self) -> anyhow::Result<api::Session> {
        api::Session::new(self).await
    }

    pub async fn mpd(&self) -> anyhow::Result<Mpd> {
        Mpd::connect(&self.0.config.mpd).await
    }
}

pub struct AppShared {
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        App(Arc::new(AppShared { config }))
    }
}
