//! Completion requests issued by the mode handlers.

use brain_core::{ChatTurn, CompletionRequest};

/// Who the bot is and whose chat it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub bot_name: String,
    pub streamer_name: String,
}

impl Persona {
    pub fn new(bot_name: impl Into<String>, streamer_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            streamer_name: streamer_name.into(),
        }
    }
}

/// Command or highlight reply: system context, prior exchanges, new input.
pub fn command(system_prompt: &str, history: Vec<ChatTurn>, input: &str) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn::system(system_prompt));
    messages.extend(history);
    messages.push(ChatTurn::user(input));
    CompletionRequest::new(messages)
}

/// Strict yes/no: should the bot join this conversation?
pub fn relevance(transcript: &str) -> CompletionRequest {
    CompletionRequest::prompt(
        "You are judging a Twitch chat conversation. Decide whether a chatbot \
         joining in right now would feel natural. Answer with ONLY \"yes\" or \"no\". \
         Answer \"yes\" when there is an interesting discussion, a question put to \
         the chat, or room for a witty or helpful remark. Answer \"no\" when the \
         conversation is too short, personal, or the bot would be intrusive.",
        format!("Recent chat messages:\n{}\n\nShould the bot join in?", transcript),
    )
    .max_tokens(10)
    .temperature(0.7)
}

/// A casual reply to the recent conversation.
pub fn contextual(persona: &Persona, transcript: &str) -> CompletionRequest {
    CompletionRequest::prompt(
        format!(
            "You are {}, a friendly and witty assistant in {}'s Twitch chat. \
             Join the conversation naturally with something helpful or entertaining. \
             Keep it to one or two sentences, casual, matching the chat's energy.",
            persona.bot_name, persona.streamer_name
        ),
        format!("Recent chat conversation:\n{}\n\nReply naturally:", transcript),
    )
    .max_tokens(100)
    .temperature(0.9)
}

/// Something to fill a quiet chat.
pub fn story(persona: &Persona) -> CompletionRequest {
    CompletionRequest::prompt(
        format!(
            "You are {}, keeping {}'s Twitch chat entertained while things are quiet. \
             Share a short story or an interesting fact in two or three sentences: \
             gaming facts, trivia, tiny stories or playful notes on Twitch culture.",
            persona.bot_name, persona.streamer_name
        ),
        "Tell chat something entertaining while the streamer is away:",
    )
    .max_tokens(150)
    .temperature(0.9)
}

/// Reaction to someone mentioning the streamer.
pub fn mention(persona: &Persona, author: &str, text: &str, transcript: &str) -> CompletionRequest {
    CompletionRequest::prompt(
        format!(
            "You are {}, {}'s loyal chat assistant. Someone just mentioned {} in chat. \
             Respond naturally: defend them, agree, add context or make a playful \
             remark. Keep it to one or two sentences and stay in character.",
            persona.bot_name, persona.streamer_name, persona.streamer_name
        ),
        format!(
            "{} said: \"{}\"\n\nRecent context:\n{}\n\nRespond naturally:",
            author, text, transcript
        ),
    )
    .max_tokens(100)
    .temperature(0.8)
}

/// Comma-separated topics of the recent conversation.
pub fn topics(transcript: &str) -> CompletionRequest {
    CompletionRequest::prompt(
        "Extract the main conversation topics from these Twitch chat messages. \
         Return ONLY a comma-separated list of one to three short topics, for \
         example \"boss fight, weapon choice\" or \"stream schedule, new game\".",
        transcript,
    )
    .max_tokens(30)
    .temperature(0.5)
}

/// Parse the topic list returned by [`topics`].
pub fn parse_topics(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(|t| t.trim().trim_matches('"').trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Whether a relevance answer means yes.
pub fn is_affirmative(reply: &str) -> bool {
    reply.to_lowercase().contains("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Persona {
        Persona::new("gigarob0t", "Gigasnail")
    }

    #[test]
    fn test_command_request_layout() {
        let history = vec![ChatTurn::user("earlier"), ChatTurn::assistant("answer")];
        let request = command("be nice", history, "Message from user alice: hi");

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.system_content(), Some("be nice"));
        assert_eq!(request.messages[1].content, "earlier");
        assert_eq!(request.last_user_content(), Some("Message from user alice: hi"));
        assert_eq!(request.max_tokens, None);
    }

    #[test]
    fn test_request_limits() {
        assert_eq!(relevance("a: b").max_tokens, Some(10));
        assert_eq!(contextual(&persona(), "a: b").max_tokens, Some(100));
        assert_eq!(story(&persona()).max_tokens, Some(150));
        assert_eq!(mention(&persona(), "a", "b", "").temperature, Some(0.8));
        assert_eq!(topics("a: b").max_tokens, Some(30));
    }

    #[test]
    fn test_prompts_carry_context() {
        let request = mention(&persona(), "alice", "giga is cracked", "bob: lol");
        let user = request.last_user_content().unwrap();
        assert!(user.contains("alice said: \"giga is cracked\""));
        assert!(user.contains("bob: lol"));
        assert!(request.system_content().unwrap().contains("Gigasnail"));

        let request = relevance("carol: what game is next?");
        assert!(request.last_user_content().unwrap().contains("carol: what game is next?"));
    }

    #[test]
    fn test_parse_topics() {
        assert_eq!(
            parse_topics("boss fight, weapon choice ,, \"memes\""),
            vec!["boss fight", "weapon choice", "memes"]
        );
        assert!(parse_topics(" , ").is_empty());
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("Yes."));
        assert!(is_affirmative("yes"));
        assert!(!is_affirmative("No"));
        assert!(!is_affirmative(""));
    }
}
