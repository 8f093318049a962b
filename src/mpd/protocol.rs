use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, bail};
use tokio::io::{BufReader, AsyncRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct MpdReader {
    r: BufReader<Box<dyn AsyncRead + Send + Unpin>>,
}

pub struct Protocol {
    pub version: String,
}

impl MpdReader {
    pub async fn open<R>(r: R) -> anyhow::Result<(Self, Protocol)>
        where R: AsyncRead + Send + Unpin + 'static
    {
        let mut r = BufReader::new(Box::new(r) as Box<_>);

        let mut line = String::new();
        r.read_line(&mut line).await?;
        let line = line.trim_end();

        let Some(proto) = line.strip_prefix("OK MPD ") else {
            bail!("unexpected initial line from mpd: {line:?}")
        };

        let reader = MpdReader { r };
        let protocol = Protocol { version: proto.to_string() };

        Ok((reader, protocol))
    }

    pub async fn read_response(&mut self) -> anyhow::Result<Response> {
        let mut attributes = Attributes::default();

        let mut buff = String::new();
        loop {
            buff.truncate(0);
            self.r.read_line(&mut buff).await?;
            if buff.len() == 0 {
                bail!("connection eof");
            }

            let line = buff.trim_end();
            log::debug!("reading {line:?}");

            if line == "OK" {
                return Ok(Ok(Reply { attributes }));
            }

            if let Some(ack) = line.strip_prefix("ACK ") {
                return Ok(Err(AckError::parse(ack)));
            }

            // none of our commands want binary payloads, skip them without keeping the bytes
            if let Some(len) = line.strip_prefix("binary: ") {
                let len: u64 = len.parse().context("parsing length of binary data")?;
                let skipped = tokio::io::copy(&mut (&mut self.r).take(len), &mut tokio::io::sink())
                    .await
                    .context("reading binary data")?;
                if skipped != len {
                    bail!("connection eof in binary data");
                }
                let nl = self.r.read_u8().await.context("reading binary trailing newline")?;
                if nl != b'\n' {
                    bail!("binary data did not end with trailing newline");
                }
                continue;
            }

            if let Some((key, value)) = line.split_once(": ") {
                attributes.push(key, value);
            } else {
                bail!("unrecognised response line from mpd: {line:?}");
            }
        }
    }
}

pub type Response = Result<Reply, AckError>;

/// An `ACK [error@command_listNum] {current_command} message_text` line.
#[derive(Debug)]
pub struct AckError {
    pub line: String,
    pub code: Option<u32>,
    pub command: Option<String>,
    pub message: String,
}

impl AckError {
    fn parse(line: &str) -> Self {
        let mut code = None;
        let mut command = None;
        let mut rest = line;

        if let Some((head, tail)) = rest.strip_prefix('[').and_then(|s| s.split_once(']')) {
            code = head.split_once('@').and_then(|(code, _)| code.parse().ok());
            rest = tail.trim_start();
        }

        if let Some((cmd, tail)) = rest.strip_prefix('{').and_then(|s| s.split_once('}')) {
            if !cmd.is_empty() {
                command = Some(cmd.to_string());
            }
            rest = tail.trim_start();
        }

        AckError {
            line: line.to_string(),
            code,
            command,
            message: rest.to_string(),
        }
    }
}

impl Display for AckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mpd error response: {}", self.line)
    }
}

impl std::error::Error for AckError {}

#[derive(Debug)]
pub struct Reply {
    pub attributes: Attributes,
}

/// Response attributes in the order mpd sent them. Keys may repeat, eg. one
/// `file` per entry in a listing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn push(&mut self, key: &str, value: &str) {
        self.0.push((key.to_string(), value.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_opt<T>(&self, key: &str) -> anyhow::Result<Option<T>>
        where T: FromStr, T::Err: std::error::Error + Send + Sync + 'static
    {
        let Some(value) = self.get_all(key).next() else {
            return Ok(None);
        };

        let value = value.parse()
            .with_context(|| format!("parsing {key:?} attribute from mpd: {value:?}"))?;

        Ok(Some(value))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
        where T: FromStr, T::Err: std::error::Error + Send + Sync + 'static
    {
        match self.get_opt(key)? {
            Some(value) => Ok(value),
            None => bail!("missing {key:?} attribute in mpd response"),
        }
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct MpdWriter {
    w: Box<dyn AsyncWrite + Send + Unpin>,
}

impl MpdWriter {
    pub fn open<W>(w: W) -> Self
        where W: AsyncWrite + Send + Unpin + 'static
    {
        MpdWriter { w: Box::new(w) }
    }

    pub async fn send_command(&mut self, cmd: &str, args: &[&str]) -> anyhow::Result<()> {
        let line = encode_command(cmd, args)?;
        log::debug!("writing {:?}", line.trim_end());
        self.w.write_all(line.as_bytes()).await?;
        self.w.flush().await?;
        Ok(())
    }
}

fn encode_command(cmd: &str, args: &[&str]) -> anyhow::Result<String> {
    let mut line = cmd.to_string();
    for arg in args {
        line.push(' ');
        line.push('"');
        for c in arg.chars() {
            match c {
                '"' | '\\' => {
                    line.push('\\');
                    line.push(c);
                }
                '\n' => {
                    bail!("newline in command argument");
                }
                _ => {
                    line.push(c);
                }
            }
        }
        line.push('"');
    }
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn reader_with(script: &'static str) -> MpdReader {
        let (mut server, client) = tokio::io::duplex(1024);
        server.write_all(script.as_bytes()).await.unwrap();
        let (reader, _) = MpdReader::open(client).await.unwrap();
        reader
    }

    #[tokio::test]
    async fn greeting_reports_protocol_version() {
        let (mut server, client) = tokio::io::duplex(64);
        server.write_all(b"OK MPD 0.23.5\n").await.unwrap();

        let (_, proto) = MpdReader::open(client).await.unwrap();
        assert_eq!(proto.version, "0.23.5");
    }

    #[tokio::test]
    async fn rejects_unexpected_greeting() {
        let (mut server, client) = tokio::io::duplex(64);
        server.write_all(b"HTTP/1.1 400 Bad Request\n").await.unwrap();

        assert!(MpdReader::open(client).await.is_err());
    }

    #[tokio::test]
    async fn keeps_repeated_keys_in_order() {
        let mut reader = reader_with(
            "OK MPD 0.23.5\ndirectory: albums\nfile: b.mp3\nfile: albums/a.mp3\nOK\n",
        ).await;

        let reply = reader.read_response().await.unwrap().unwrap();
        let files: Vec<_> = reply.attributes.get_all("file").collect();
        assert_eq!(files, vec!["b.mp3", "albums/a.mp3"]);
    }

    #[tokio::test]
    async fn parses_typed_attributes() {
        let mut reader = reader_with("OK MPD 0.23.5\nvolume: 42\nstate: play\nOK\n").await;

        let reply = reader.read_response().await.unwrap().unwrap();
        assert_eq!(reply.attributes.get::<u8>("volume").unwrap(), 42);
        assert_eq!(reply.attributes.get_opt::<u8>("missing").unwrap(), None);
        assert!(reply.attributes.get::<u8>("state").is_err());
    }

    #[tokio::test]
    async fn parses_ack_lines() {
        let mut reader = reader_with(
            "OK MPD 0.23.5\nACK [50@0] {add} No such directory\n",
        ).await;

        let err = reader.read_response().await.unwrap().unwrap_err();
        assert_eq!(err.code, Some(50));
        assert_eq!(err.command.as_deref(), Some("add"));
        assert_eq!(err.message, "No such directory");
        assert_eq!(err.to_string(), "mpd error response: [50@0] {add} No such directory");
    }

    #[tokio::test]
    async fn skips_binary_chunks() {
        let mut reader = reader_with(
            "OK MPD 0.23.5\nsize: 6\nbinary: 3\nOK\n\ntype: image/png\nOK\n",
        ).await;

        let reply = reader.read_response().await.unwrap().unwrap();
        assert_eq!(reply.attributes.get::<u32>("size").unwrap(), 6);
        assert_eq!(reply.attributes.get::<String>("type").unwrap(), "image/png");
    }

    #[tokio::test]
    async fn truncated_binary_chunk_is_an_error() {
        let mut reader = reader_with("OK MPD 0.23.5\nbinary: 4096\nabc").await;
        assert!(reader.read_response().await.is_err());
    }

    #[tokio::test]
    async fn eof_mid_response_is_an_error() {
        let mut reader = reader_with("OK MPD 0.23.5\nfile: a.mp3\n").await;
        // dropping the server half closes the stream once the buffer drains
        assert!(reader.read_response().await.is_err());
    }

    #[test]
    fn quotes_and_escapes_arguments() {
        let line = encode_command("add", &[r#"say "hi"\there.mp3"#]).unwrap();
        assert_eq!(line, "add \"say \\\"hi\\\"\\\\there.mp3\"\n");
    }

    #[test]
    fn rejects_newlines_in_arguments() {
        assert!(encode_command("add", &["a\nclear"]).is_err());
    }
}
