//! `whois`: look up a link record from either side.

use async_trait::async_trait;
use chat_platform_client::{ChatClient, IncomingMessage};
use command_router::{Command, CommandHandler, CommandSource, HandlerError};
use linked_user_store::UserStore;
use std::sync::Arc;
use tracing::debug;

/// Strip mention syntax (`<@id>`, `<@!id>`) down to the raw id.
pub fn parse_user_reference(arg: &str) -> &str {
    let arg = arg.trim();
    arg.strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|id| id.strip_prefix('!').unwrap_or(id))
        .unwrap_or(arg)
}

pub struct WhoisCommand {
    chat: Arc<dyn ChatClient>,
    store: Arc<dyn UserStore>,
}

impl WhoisCommand {
    pub fn new(chat: Arc<dyn ChatClient>, store: Arc<dyn UserStore>) -> Self {
        Self { chat, store }
    }

    pub fn command(self: &Arc<Self>) -> Command {
        Command::new("whois", CommandSource::Administrative, self.clone())
            .parameters(1, 1)
            .usage("whois <user mention | chat id | forum id>")
            .description("Show which forum account a chat user is linked to, or the reverse")
            .example("whois @alice")
            .require_admin()
    }
}

#[async_trait]
impl CommandHandler for WhoisCommand {
    async fn run(&self, args: &str, message: &IncomingMessage) -> Result<bool, HandlerError> {
        let target = parse_user_reference(args);
        if target.is_empty() {
            return Ok(false);
        }

        let linked = match self.store.get_user_by_chat(target).await? {
            Some(user) => Some(user),
            None => self.store.get_user_by_forum(target).await?,
        };
        debug!(target, found = linked.is_some(), "whois lookup");

        let reply = match linked {
            Some(user) => format!(
                "<@{}> is linked to forum account {} (since {})",
                user.chat_id,
                user.forum_id,
                user.linked_at.format("%Y-%m-%d")
            ),
            None => format!("{} has no linked account", target),
        };
        self.chat.send_message(&message.channel_id, &reply).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_platform_client::RecordingChatClient;
    use linked_user_store::InMemoryUserStore;

    fn message(args: &str) -> IncomingMessage {
        IncomingMessage {
            id: "1".to_string(),
            author_id: "admin".to_string(),
            author_name: "admin".to_string(),
            channel_id: "400".to_string(),
            guild_id: Some("200".to_string()),
            content: format!("whois {}", args),
            mentions: Vec::new(),
        }
    }

    fn whois(chat: &Arc<RecordingChatClient>) -> WhoisCommand {
        WhoisCommand::new(
            chat.clone(),
            Arc::new(InMemoryUserStore::new().with_user("1001", "21")),
        )
    }

    #[test]
    fn test_parse_user_reference() {
        assert_eq!(parse_user_reference("<@1001>"), "1001");
        assert_eq!(parse_user_reference("<@!1001>"), "1001");
        assert_eq!(parse_user_reference(" 1001 "), "1001");
        assert_eq!(parse_user_reference("<@1001"), "<@1001");
    }

    #[tokio::test]
    async fn test_lookup_by_mention() {
        let chat = Arc::new(RecordingChatClient::new());

        assert!(whois(&chat).run("<@!1001>", &message("<@!1001>")).await.unwrap());

        let replies = chat.messages_to("400");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("<@1001> is linked to forum account 21"));
    }

    #[tokio::test]
    async fn test_lookup_by_forum_id() {
        let chat = Arc::new(RecordingChatClient::new());

        assert!(whois(&chat).run("21", &message("21")).await.unwrap());

        assert!(chat.messages_to("400")[0].starts_with("<@1001>"));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let chat = Arc::new(RecordingChatClient::new());

        assert!(whois(&chat).run("77", &message("77")).await.unwrap());

        assert_eq!(chat.messages_to("400"), vec!["77 has no linked account"]);
    }

    #[tokio::test]
    async fn test_reply_failure_is_an_error() {
        let chat = Arc::new(RecordingChatClient::new());
        chat.fail_sends(true);

        assert!(whois(&chat).run("77", &message("77")).await.is_err());
    }
}
