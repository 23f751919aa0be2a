//! Drives the client against an in-process WebSocket server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use twitch_chat::{
    ChatConfig, ChatError, ChatEvent, ReconnectConfig, StaticToken, TokenProvider, TwitchClient,
};

const WAIT: Duration = Duration::from_secs(5);

struct CountingToken {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for CountingToken {
    async fn token(&self) -> Result<String, ChatError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token{}", n))
    }
}

fn config_for(addr: std::net::SocketAddr) -> ChatConfig {
    ChatConfig::new("companion_bot", ["chan"])
        .with_server_url(format!("ws://{}", addr))
        .with_reconnect(ReconnectConfig {
            max_retries: Some(1),
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
        })
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match timeout(WAIT, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return text,
            Ok(Some(Ok(_))) => continue,
            other => panic!("expected text frame, got {:?}", other),
        }
    }
}

/// Accept one connection, read the login lines and send the welcome.
async fn accept_and_login(listener: &TcpListener) -> (WebSocketStream<TcpStream>, Vec<String>) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

    let mut login = Vec::new();
    for _ in 0..3 {
        login.push(next_text(&mut ws).await);
    }
    ws.send(Message::Text(":tmi.twitch.tv 001 companion_bot :Welcome, GLHF!".into()))
        .await
        .unwrap();
    login.push(next_text(&mut ws).await);

    (ws, login)
}

async fn next_event(events: &mut tokio::sync::mpsc::Receiver<ChatEvent>) -> ChatEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream closed")
}

#[tokio::test]
async fn test_login_receive_and_send() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut ws, login) = accept_and_login(&listener).await;
        ws.send(Message::Text(
            "@display-name=Alice;msg-id=highlighted-message :alice!alice@x PRIVMSG #chan :hello bot"
                .into(),
        ))
        .await
        .unwrap();
        let reply = next_text(&mut ws).await;
        (login, reply)
    });

    let (client, mut events) =
        TwitchClient::spawn(config_for(addr), Arc::new(StaticToken::new("secret")));

    assert_eq!(next_event(&mut events).await, ChatEvent::Connected);

    let ChatEvent::Message(msg) = next_event(&mut events).await else {
        panic!("expected a chat message");
    };
    assert_eq!(msg.author, "alice");
    assert_eq!(msg.display_name, "Alice");
    assert_eq!(msg.text, "hello bot");
    assert!(msg.is_highlighted);
    assert!(!msg.is_self);

    client.say("#chan", "hi alice").await.unwrap();

    let (login, reply) = server.await.unwrap();
    assert_eq!(login[0], "PASS oauth:secret");
    assert_eq!(login[1], "NICK companion_bot");
    assert_eq!(login[2], "CAP REQ :twitch.tv/tags twitch.tv/commands");
    assert_eq!(login[3], "JOIN #chan");
    assert_eq!(reply, "PRIVMSG #chan :hi alice");

    client.disconnect();
}

#[tokio::test]
async fn test_reconnect_pulls_a_fresh_token() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut first, first_login) = accept_and_login(&listener).await;
        first.send(Message::Text(":tmi.twitch.tv RECONNECT".into())).await.unwrap();
        let (_second, second_login) = accept_and_login(&listener).await;
        (first_login, second_login)
    });

    let tokens = Arc::new(CountingToken {
        calls: AtomicUsize::new(0),
    });
    let (client, mut events) = TwitchClient::spawn(config_for(addr), tokens.clone());

    assert_eq!(next_event(&mut events).await, ChatEvent::Connected);
    assert!(matches!(
        next_event(&mut events).await,
        ChatEvent::Disconnected { .. }
    ));
    assert_eq!(next_event(&mut events).await, ChatEvent::Connected);

    let (first_login, second_login) = server.await.unwrap();
    assert_eq!(first_login[0], "PASS oauth:token1");
    assert_eq!(second_login[0], "PASS oauth:token2");
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 2);

    client.disconnect();
}

#[tokio::test]
async fn test_rejected_login_gives_up_after_retries() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for _ in 0..3 {
            next_text(&mut ws).await;
        }
        ws.send(Message::Text(
            ":tmi.twitch.tv NOTICE * :Login authentication failed".into(),
        ))
        .await
        .unwrap();
    });

    let (client, mut events) =
        TwitchClient::spawn(config_for(addr), Arc::new(StaticToken::new("bad")));

    let closed = timeout(WAIT, events.recv()).await.unwrap();
    assert!(closed.is_none());
    assert!(client.say("#chan", "anyone?").await.is_err());
}
