pub mod protocol;

#[cfg(test)]
pub mod fake;

use std::{str::FromStr, convert::Infallible};

use anyhow::{Result, Context};
use derive_more::Display;
use serde::{Serialize, Deserialize};
use tokio::net::TcpStream;

use crate::config;

use self::protocol::{MpdReader, MpdWriter, Protocol, Response};

/// A single connection to mpd. Not shared between requests; dropping it
/// closes the socket.
pub struct Mpd {
    conn: Conn,
    protocol: Protocol,
}

#[derive(Serialize, Deserialize, Debug, Display, Clone, PartialEq, Eq)]
pub struct Id(String);

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Id(s.to_string()))
    }
}

#[derive(Debug)]
pub struct Song {
    pub file: String,
    pub last_modified: Option<String>,
    pub id: Option<Id>,
    pub title: Option<String>,
}

impl Mpd {
    pub async fn connect(config: &config::Mpd) -> Result<Mpd> {
        let (conn, protocol) = Conn::connect(config).await
            .with_context(|| format!("connecting to mpd at {}", config.address))?;
        log::debug!("Connected to mpd at {}, protocol version {}",
            config.address, protocol.version);
        Ok(Mpd { conn, protocol })
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol.version
    }

    async fn command(&mut self, cmd: &str, args: &[&str]) -> Result<Response> {
        self.conn.writer.send_command(cmd, args).await?;
        let response = self.conn.reader.read_response().await?;
        if let Err(ack) = &response {
            log::debug!("mpd rejected {cmd:?} (error {:?} in {:?}): {}",
                ack.code, ack.command, ack.message);
        }
        Ok(response)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.command("clear", &[]).await??;
        Ok(())
    }

    pub async fn add(&mut self, uri: &str) -> Result<()> {
        self.command("add", &[uri]).await??;
        Ok(())
    }

    pub async fn play(&mut self) -> Result<()> {
        self.command("play", &[]).await??;
        Ok(())
    }

    pub async fn pause(&mut self, pause: bool) -> Result<()> {
        let state = if pause { "1" } else { "0" };
        self.command("pause", &[state]).await??;
        Ok(())
    }

    pub async fn setvol(&mut self, volume: u8) -> Result<()> {
        self.command("setvol", &[&volume.to_string()]).await??;
        Ok(())
    }

    /// Returns `None` when nothing is queued.
    pub async fn currentsong(&mut self) -> Result<Option<Song>> {
        let resp = self.command("currentsong", &[]).await??;
        let attrs = resp.attributes;

        if attrs.is_empty() {
            return Ok(None);
        }

        let song = Song {
            file: attrs.get("file")?,
            last_modified: attrs.get_opt("Last-Modified")?,
            id: attrs.get_opt("Id")?,
            title: attrs.get_opt("Title")?,
        };

        Ok(Some(song))
    }

    /// Every file path in the database, in the order mpd lists them.
    pub async fn listall(&mut self) -> Result<Vec<String>> {
        let resp = self.command("listall", &[]).await??;
        let files = resp.attributes.get_all("file")
            .map(|file| file.to_string())
            .collect();
        Ok(files)
    }

    /// Politely ends the session. mpd sends no reply to `close`.
    pub async fn close(mut self) -> Result<()> {
        self.conn.writer.send_command("close", &[]).await
    }
}

struct Conn {
    reader: MpdReader,
    writer: MpdWriter,
}

impl Conn {
    pub async fn connect(config: &config::Mpd) -> Result<(Conn, Protocol)> {
        let sock = TcpStream::connect(&config.address).await?;
        let (rx, tx) = sock.into_split();
        let (reader, proto) = MpdReader::open(rx).await?;
        let writer = MpdWriter::open(tx);
        Ok((Conn { reader, writer }, proto))
    }
}
