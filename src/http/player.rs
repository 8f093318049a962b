use axum::extract::{RawQuery, State};

use crate::api::{self, Track, Volume, VolumeError};
use crate::error::AppResult;
use crate::http::params::Params;
use crate::http::{Envelope, Reply};
use crate::App;

pub async fn current(app: State<App>) -> AppResult<Reply<Track>> {
    let mut session = app.session().await?;
    let track = api::current_track(&mut session).await?;
    session.finish().await;

    if let Some(id) = &track.id {
        log::debug!("Current song {:?} has id {id}", track.file);
    }

    Ok(Envelope::data(format!("Currently playing {}", track.file), track))
}

pub async fn play(app: State<App>, RawQuery(query): RawQuery) -> AppResult<Reply<()>> {
    // an empty `file=` means the same as leaving it out
    let file = Params::parse(query.as_deref())
        .single("file")?
        .filter(|file| !file.is_empty())
        .map(str::to_string);

    let mut session = app.session().await?;

    let message = match file.as_deref() {
        Some(file) => {
            log::info!("Playing {file:?}");
            api::play_file(&mut session, file).await?;
            format!("Playing {file}")
        }
        None => {
            log::info!("Resuming playback");
            api::resume(&mut session).await?;
            "Playback started".to_string()
        }
    };

    session.finish().await;
    Ok(Envelope::message(message))
}

pub async fn pause(app: State<App>) -> AppResult<Reply<()>> {
    let mut session = app.session().await?;
    api::pause(&mut session).await?;
    session.finish().await;

    log::info!("Paused");
    Ok(Envelope::message("Paused"))
}

pub async fn volume(app: State<App>, RawQuery(query): RawQuery) -> AppResult<Reply<()>> {
    // validated before touching mpd
    let params = Params::parse(query.as_deref());
    let level = params.single("level").map_err(|_| VolumeError::Conflicting)?;
    let volume = Volume::from_param(level)?;

    let mut session = app.session().await?;
    api::set_volume(&mut session, volume).await?;
    session.finish().await;

    log::info!("Volume set to {}", volume.get());
    Ok(Envelope::message(format!("Volume set to {}", volume.get())))
}
