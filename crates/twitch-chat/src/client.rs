//! Connection task and the handle used to drive it.

use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::irc::{IrcLine, PrivMsg};
use crate::token::{irc_password, TokenProvider};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const EVENT_BUFFER: usize = 256;
const OUTGOING_BUFFER: usize = 64;

/// Events emitted by the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Logged in and joined every configured channel.
    Connected,
    /// A channel message.
    Message(PrivMsg),
    /// An established session ended; a reconnect follows unless shut down.
    Disconnected { reason: String },
}

#[derive(Debug)]
struct Outgoing {
    channel: String,
    text: String,
}

enum SessionEnd {
    Shutdown,
    Dropped(String),
}

/// Handle to a running chat connection.
///
/// Cloning is cheap; the connection task stops once [`disconnect`](Self::disconnect)
/// is called or every handle is dropped.
#[derive(Clone)]
pub struct TwitchClient {
    outgoing: mpsc::Sender<Outgoing>,
    shutdown: Arc<watch::Sender<bool>>,
    username: String,
}

impl TwitchClient {
    /// Start the connection task.
    ///
    /// Returns the handle and the receiving end of the event stream. The
    /// task keeps reconnecting per `config.reconnect` and asks `tokens` for a
    /// token before every attempt.
    pub fn spawn(
        config: ChatConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(OUTGOING_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let client = Self {
            outgoing: outgoing_tx,
            shutdown: Arc::new(shutdown_tx),
            username: config.username.clone(),
        };

        tokio::spawn(run_connection(config, tokens, outgoing_rx, event_tx, shutdown_rx));

        (client, event_rx)
    }

    /// Login the client connects as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Queue a message for a channel.
    ///
    /// Messages queued while reconnecting are sent once the next session is up.
    pub async fn say(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.outgoing
            .send(Outgoing {
                channel: channel.to_string(),
                text: text.to_string(),
            })
            .await
            .map_err(|_| ChatError::Closed)
    }

    /// Stop the connection task.
    pub fn disconnect(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether the connection task has stopped.
    pub fn is_closed(&self) -> bool {
        self.outgoing.is_closed()
    }
}

async fn run_connection(
    config: ChatConfig,
    tokens: Arc<dyn TokenProvider>,
    mut outgoing: mpsc::Receiver<Outgoing>,
    events: mpsc::Sender<ChatEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }

        match session(&config, tokens.as_ref(), &mut outgoing, &events, &mut shutdown).await {
            Ok(SessionEnd::Shutdown) => break,
            Ok(SessionEnd::Dropped(reason)) => {
                failures = 0;
                warn!("Twitch chat session ended: {}", reason);
                if events.send(ChatEvent::Disconnected { reason }).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                failures += 1;
                warn!("Twitch chat connection attempt {} failed: {}", failures, e);
            }
        }

        if !config.reconnect.should_retry(failures) {
            error!("Giving up on Twitch chat after {} failed attempts", failures);
            break;
        }

        let delay = config.reconnect.delay_for_attempt(failures.saturating_sub(1));
        info!("Reconnecting to Twitch chat in {:?}", delay);
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("Twitch chat client stopped");
}

async fn session(
    config: &ChatConfig,
    tokens: &dyn TokenProvider,
    outgoing: &mut mpsc::Receiver<Outgoing>,
    events: &mpsc::Sender<ChatEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<SessionEnd, ChatError> {
    let token = tokens.token().await?;

    let (stream, _) = connect_async(config.server_url.as_str()).await?;
    let (mut sink, mut source) = stream.split();

    send_line(&mut sink, format!("PASS {}", irc_password(&token))).await?;
    send_line(&mut sink, format!("NICK {}", config.username)).await?;
    send_line(&mut sink, "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string()).await?;

    timeout(
        config.login_timeout,
        await_welcome(&mut sink, &mut source, &config.username),
    )
    .await
    .map_err(|_| ChatError::AuthTimeout)??;

    for channel in &config.channels {
        send_line(&mut sink, format!("JOIN {}", channel)).await?;
        info!("Joined {}", channel);
    }

    info!("Connected to Twitch chat as {}", config.username);
    if events.send(ChatEvent::Connected).await.is_err() {
        return Ok(SessionEnd::Shutdown);
    }

    let mut keepalive = interval_at(Instant::now() + config.keepalive, config.keepalive);

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
            }

            message = outgoing.recv() => {
                let Some(Outgoing { channel, text }) = message else {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                };
                debug!("Sending to {}: {}", channel, text);
                if let Err(e) = send_line(&mut sink, format!("PRIVMSG {} :{}", channel, text)).await {
                    return Ok(SessionEnd::Dropped(e.to_string()));
                }
            }

            frame = source.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        return Ok(SessionEnd::Dropped("connection closed".to_string()));
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Ok(SessionEnd::Dropped(e.to_string())),
                };

                for line in text.lines() {
                    match IrcLine::parse(line, &config.username) {
                        IrcLine::Ping(payload) => {
                            if let Err(e) = send_line(&mut sink, format!("PONG {}", payload)).await {
                                return Ok(SessionEnd::Dropped(e.to_string()));
                            }
                        }
                        IrcLine::Reconnect => {
                            return Ok(SessionEnd::Dropped("server requested reconnect".to_string()));
                        }
                        IrcLine::PrivMsg(msg) => {
                            debug!("{} in {}: {}", msg.display_name, msg.channel, msg.text);
                            if events.send(ChatEvent::Message(msg)).await.is_err() {
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                        _ => {}
                    }
                }
            }

            _ = keepalive.tick() => {
                if let Err(e) = send_line(&mut sink, "PING :tmi.twitch.tv".to_string()).await {
                    return Ok(SessionEnd::Dropped(e.to_string()));
                }
            }
        }
    }
}

async fn await_welcome(
    sink: &mut WsSink,
    source: &mut WsSource,
    username: &str,
) -> Result<(), ChatError> {
    while let Some(frame) = source.next().await {
        let Message::Text(text) = frame? else {
            continue;
        };
        for line in text.lines() {
            match IrcLine::parse(line, username) {
                IrcLine::Welcome => return Ok(()),
                IrcLine::LoginFailed => return Err(ChatError::AuthFailed),
                IrcLine::Ping(payload) => send_line(sink, format!("PONG {}", payload)).await?,
                _ => {}
            }
        }
    }

    Err(ChatError::Connection("closed before login completed".to_string()))
}

async fn send_line(sink: &mut WsSink, line: String) -> Result<(), ChatError> {
    sink.send(Message::Text(line)).await?;
    Ok(())
}
