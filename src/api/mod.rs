pub mod session;
pub use session::Session;

use anyhow::Context;
use serde::Serialize;

use crate::mpd::{self, Id};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Track {
    pub file: String,
    pub last_modified: Option<String>,
    pub id: Option<Id>,
    pub title: Option<String>,
}

impl From<mpd::Song> for Track {
    fn from(song: mpd::Song) -> Self {
        Track {
            file: song.file,
            last_modified: song.last_modified,
            id: song.id,
            title: song.title,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{file:?} was not found in the mpd database")]
pub struct NotInCatalog {
    pub file: String,
}

#[derive(Debug, thiserror::Error)]
#[error("no files were found in the mpd database")]
pub struct EmptyCatalog;

#[derive(Debug, thiserror::Error)]
#[error("no song is currently playing")]
pub struct NoCurrentSong;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume(u8);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VolumeError {
    #[error("missing 'level' query parameter")]
    Missing,
    #[error("invalid volume level: 'level' was given conflicting values")]
    Conflicting,
    #[error("invalid volume level: {0:?} is not an integer")]
    NotInteger(String),
    #[error("invalid volume level: {0} is out of bounds ({min}-{max})", min = Volume::MIN, max = Volume::MAX)]
    OutOfRange(i64),
}

impl Volume {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    /// Validates the raw `level` query parameter.
    pub fn from_param(level: Option<&str>) -> Result<Volume, VolumeError> {
        let level = match level {
            None | Some("") => return Err(VolumeError::Missing),
            Some(level) => level,
        };

        let level: i64 = level.parse()
            .map_err(|_| VolumeError::NotInteger(level.to_string()))?;

        match u8::try_from(level) {
            Ok(volume) if volume <= Self::MAX => Ok(Volume(volume)),
            _ => Err(VolumeError::OutOfRange(level)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

pub async fn current_track(session: &mut Session) -> anyhow::Result<Track> {
    let song = session.mpd().currentsong().await
        .context("reading the current song")?;

    match song {
        Some(song) => Ok(song.into()),
        None => Err(NoCurrentSong.into()),
    }
}

pub async fn catalog(session: &mut Session) -> anyhow::Result<Vec<String>> {
    let files = session.mpd().listall().await
        .context("reading the mpd database")?;

    if files.is_empty() {
        return Err(EmptyCatalog.into());
    }

    Ok(files)
}

/// Replaces the queue with `file` and starts it. Stops at the first failing
/// step; steps already applied are left as they are.
pub async fn play_file(session: &mut Session, file: &str) -> anyhow::Result<()> {
    let files = session.mpd().listall().await
        .context("reading the mpd database")?;

    if !files.iter().any(|f| f == file) {
        return Err(NotInCatalog { file: file.to_string() }.into());
    }

    let mpd = session.mpd();
    mpd.clear().await.context("clearing the queue")?;
    mpd.add(file).await.with_context(|| format!("adding {file:?} to the queue"))?;
    mpd.play().await.context("starting playback")?;

    Ok(())
}

pub async fn resume(session: &mut Session) -> anyhow::Result<()> {
    session.mpd().play().await.context("starting playback")
}

pub async fn pause(session: &mut Session) -> anyhow::Result<()> {
    session.mpd().pause(true).await.context("pausing playback")
}

pub async fn set_volume(session: &mut Session, volume: Volume) -> anyhow::Result<()> {
    session.mpd().setvol(volume.get()).await.context("setting the volume")
}
