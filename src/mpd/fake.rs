//! A scripted stand-in for mpd, listening on a loopback port. Records every
//! command line it receives, except the final `close`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config;

pub const PROTOCOL_VERSION: &str = "0.23.5";

#[derive(Default, Clone)]
struct Script {
    catalog: Vec<String>,
    current_song: Vec<(String, String)>,
    failures: Vec<(String, String)>,
}

#[derive(Default)]
struct Recorded {
    connections: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

pub struct FakeMpd {
    address: SocketAddr,
    recorded: Arc<Recorded>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct Builder {
    script: Script,
}

impl Builder {
    pub fn catalog<const N: usize>(mut self, files: [&str; N]) -> Self {
        self.script.catalog = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn current_song(mut self, attrs: &[(&str, &str)]) -> Self {
        self.script.current_song = attrs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    /// Answer `command` with `ACK <ack>` instead of `OK`.
    pub fn fail(mut self, command: &str, ack: &str) -> Self {
        self.script.failures.push((command.to_string(), ack.to_string()));
        self
    }

    pub async fn spawn(self) -> FakeMpd {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let recorded = Arc::new(Recorded::default());

        let task = tokio::spawn({
            let recorded = recorded.clone();
            let script = self.script;
            async move {
                loop {
                    let Ok((sock, _)) = listener.accept().await else { return };
                    recorded.connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(sock, script.clone(), recorded.clone()));
                }
            }
        });

        FakeMpd { address, recorded, task }
    }
}

impl FakeMpd {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn config(&self) -> config::Mpd {
        config::Mpd { address: self.address.to_string() }
    }

    pub fn commands(&self) -> Vec<String> {
        self.recorded.commands.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.recorded.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeMpd {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An address nothing is listening on.
pub fn unreachable_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn serve(sock: TcpStream, script: Script, recorded: Arc<Recorded>) {
    let (rx, mut tx) = sock.into_split();
    let mut lines = BufReader::new(rx).lines();

    if tx.write_all(format!("OK MPD {PROTOCOL_VERSION}\n").as_bytes()).await.is_err() {
        return;
    }

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.split(' ').next().unwrap_or_default().to_string();
        if command == "close" {
            return;
        }

        recorded.commands.lock().unwrap().push(line);

        let reply = match script.failures.iter().find(|(cmd, _)| *cmd == command) {
            Some((_, ack)) => format!("ACK {ack}\n"),
            None => ok_reply(&script, &command),
        };

        if tx.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn ok_reply(script: &Script, command: &str) -> String {
    let mut reply = String::new();

    match command {
        "listall" => {
            for file in &script.catalog {
                reply.push_str(&format!("file: {file}\n"));
            }
        }
        "currentsong" => {
            for (key, value) in &script.current_song {
                reply.push_str(&format!("{key}: {value}\n"));
            }
        }
        _ => {}
    }

    reply.push_str("OK\n");
    reply
}
