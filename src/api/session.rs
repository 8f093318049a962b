use crate::App;
use crate::mpd::Mpd;

/// The mpd connection for one request. Dropping the session without
/// calling `finish` still closes the socket.
pub struct Session {
    mpd: Mpd,
}

impl Session {
    pub async fn new(app: &App) -> Result<Self, anyhow::Error> {
        let mpd = app.mpd().await?;
        Ok(Session { mpd })
    }

    pub fn mpd(&mut self) -> &mut Mpd {
        &mut self.mpd
    }

    pub async fn finish(self) {
        if let Err(e) = self.mpd.close().await {
            log::debug!("closing mpd connection: {e:?}");
        }
    }
}
