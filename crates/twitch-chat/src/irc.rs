//! Parser for the subset of Twitch IRC the client reacts to.
//!
//! Lines look like `@tags :nick!user@host COMMAND params :trailing`.

/// A chat message received in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivMsg {
    /// Channel with leading `#`.
    pub channel: String,
    /// Sender login (lowercase).
    pub author: String,
    /// Sender display name, falling back to the login.
    pub display_name: String,
    /// Message body.
    pub text: String,
    /// Sent with the "highlight my message" channel-point reward.
    pub is_highlighted: bool,
    /// Sent by the connected account.
    pub is_self: bool,
}

/// One classified IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcLine {
    /// Server keepalive; reply with `PONG` and the same payload.
    Ping(String),
    /// Registration finished (`001` or end of MOTD `376`).
    Welcome,
    /// The server rejected the credentials.
    LoginFailed,
    /// The server asks the client to reconnect.
    Reconnect,
    /// A channel message.
    PrivMsg(PrivMsg),
    /// Anything else.
    Other,
}

impl IrcLine {
    /// Classify a raw line. `self_login` is the connected account's login.
    pub fn parse(line: &str, self_login: &str) -> IrcLine {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(payload) = line.strip_prefix("PING") {
            return IrcLine::Ping(payload.trim_start().to_string());
        }

        let (tags, rest) = match line.strip_prefix('@') {
            Some(tagged) => match tagged.split_once(' ') {
                Some((tags, rest)) => (tags, rest),
                None => return IrcLine::Other,
            },
            None => ("", line),
        };

        let (prefix, rest) = match rest.strip_prefix(':') {
            Some(prefixed) => match prefixed.split_once(' ') {
                Some((prefix, rest)) => (prefix, rest),
                None => return IrcLine::Other,
            },
            None => ("", rest),
        };

        let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));

        match command {
            "001" | "376" => IrcLine::Welcome,
            "RECONNECT" => IrcLine::Reconnect,
            "NOTICE" if is_login_failure(params) => IrcLine::LoginFailed,
            "PRIVMSG" => parse_privmsg(tags, prefix, params, self_login),
            _ => IrcLine::Other,
        }
    }
}

fn is_login_failure(params: &str) -> bool {
    params.contains("Login authentication failed") || params.contains("Improperly formatted auth")
}

fn parse_privmsg(tags: &str, prefix: &str, params: &str, self_login: &str) -> IrcLine {
    let author = prefix.split('!').next().unwrap_or("").to_lowercase();
    let Some((channel, text)) = params.split_once(" :") else {
        return IrcLine::Other;
    };
    if author.is_empty() || text.is_empty() {
        return IrcLine::Other;
    }

    let text = strip_action(text);
    let display_name = tag(tags, "display-name")
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| author.clone());
    let is_highlighted = tag(tags, "msg-id").as_deref() == Some("highlighted-message");
    let is_self = author.eq_ignore_ascii_case(self_login);

    IrcLine::PrivMsg(PrivMsg {
        channel: channel.trim().to_string(),
        author,
        display_name,
        text: text.to_string(),
        is_highlighted,
        is_self,
    })
}

/// `/me` messages arrive wrapped in `\x01ACTION ...\x01`.
fn strip_action(text: &str) -> &str {
    text.strip_prefix("\u{1}ACTION ")
        .map(|inner| inner.trim_end_matches('\u{1}'))
        .unwrap_or(text)
}

/// Look up and unescape a single tag value from `key1=val1;key2=val2`.
pub fn tag(tags: &str, key: &str) -> Option<String> {
    tags.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == key).then(|| unescape_tag_value(v))
    })
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some(':') => out.push(';'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "companion_bot";

    fn privmsg(line: &str) -> PrivMsg {
        match IrcLine::parse(line, BOT) {
            IrcLine::PrivMsg(msg) => msg,
            other => panic!("expected PRIVMSG, got {:?}", other),
        }
    }

    #[test]
    fn test_ping() {
        assert_eq!(
            IrcLine::parse("PING :tmi.twitch.tv", BOT),
            IrcLine::Ping(":tmi.twitch.tv".to_string())
        );
    }

    #[test]
    fn test_welcome_and_failure() {
        assert_eq!(
            IrcLine::parse(":tmi.twitch.tv 001 companion_bot :Welcome, GLHF!", BOT),
            IrcLine::Welcome
        );
        assert_eq!(
            IrcLine::parse(":tmi.twitch.tv NOTICE * :Login authentication failed", BOT),
            IrcLine::LoginFailed
        );
        assert_eq!(IrcLine::parse(":tmi.twitch.tv RECONNECT", BOT), IrcLine::Reconnect);
        assert_eq!(
            IrcLine::parse(":tmi.twitch.tv CAP * ACK :twitch.tv/tags", BOT),
            IrcLine::Other
        );
    }

    #[test]
    fn test_tagged_privmsg() {
        let msg = privmsg(
            "@badge-info=;display-name=Alice;msg-id=highlighted-message;mod=0 \
             :alice!alice@alice.tmi.twitch.tv PRIVMSG #gigasnail :hello: world\r\n",
        );

        assert_eq!(msg.channel, "#gigasnail");
        assert_eq!(msg.author, "alice");
        assert_eq!(msg.display_name, "Alice");
        assert_eq!(msg.text, "hello: world");
        assert!(msg.is_highlighted);
        assert!(!msg.is_self);
    }

    #[test]
    fn test_untagged_privmsg_and_self() {
        let msg = privmsg(":Companion_Bot!companion_bot@x PRIVMSG #chan :hi");
        assert_eq!(msg.display_name, "companion_bot");
        assert!(!msg.is_highlighted);
        assert!(msg.is_self);
    }

    #[test]
    fn test_action_is_unwrapped() {
        let msg = privmsg(":bob!bob@x PRIVMSG #chan :\u{1}ACTION dances\u{1}");
        assert_eq!(msg.text, "dances");
    }

    #[test]
    fn test_malformed_privmsg_is_other() {
        assert_eq!(IrcLine::parse(":bob!bob@x PRIVMSG #chan", BOT), IrcLine::Other);
        assert_eq!(IrcLine::parse("@tagsonly", BOT), IrcLine::Other);
    }

    #[test]
    fn test_tag_unescape() {
        assert_eq!(
            tag(r"display-name=A\sB;system-msg=x\:y", "display-name"),
            Some("A B".to_string())
        );
        assert_eq!(tag(r"system-msg=x\:y", "system-msg"), Some("x;y".to_string()));
        assert_eq!(tag("a=1", "b"), None);
    }
}
