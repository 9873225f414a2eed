//! Gateway event handling.

use chat_gateway::GatewayEvent;
use chat_platform_client::{ChatClient, ErrorReporter, IncomingMessage};
use command_router::Router;
use linked_user_store::UserStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reacts to gateway events one at a time.
pub struct EventHandler {
    pub router: Router,
    pub chat: Arc<dyn ChatClient>,
    pub store: Arc<dyn UserStore>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub bot_id: String,
    pub debug_user: Option<String>,
    pub guild_id: String,
    pub verified_role: String,
    /// Example shown to newcomers who have not verified yet.
    pub profile_example: String,
}

impl EventHandler {
    pub async fn handle(&self, event: GatewayEvent) {
        match event {
            GatewayEvent::Ready {
                user_id,
                session_id,
            } => {
                info!(user_id = %user_id, session_id = %session_id, "Gateway session ready");
            }
            GatewayEvent::MessageCreate(message) => self.on_message(message).await,
            GatewayEvent::MemberJoined {
                guild_id,
                user_id,
                username,
            } => {
                if guild_id != self.guild_id {
                    debug!(guild_id = %guild_id, "Ignoring join in foreign guild");
                    return;
                }
                self.on_member_joined(&user_id, &username).await;
            }
        }
    }

    async fn on_message(&self, message: IncomingMessage) {
        if message.author_id == self.bot_id {
            return;
        }
        if let Some(debug_user) = &self.debug_user {
            if &message.author_id != debug_user {
                return;
            }
        }

        let outcome = self.router.process(&message).await;
        if outcome.exists {
            debug!(
                user_id = %message.author_id,
                source = ?outcome.source,
                errors = outcome.errors.len(),
                "Command processed"
            );
        }

        for error in &outcome.errors {
            self.reporter
                .report(&format!(
                    "Command from {} failed: {}",
                    message.author_id, error
                ))
                .await;
        }
    }

    async fn on_member_joined(&self, user_id: &str, username: &str) {
        let linked = match self.store.get_user_by_chat(user_id).await {
            Ok(linked) => linked,
            Err(e) => {
                self.reporter
                    .report(&format!("Failed to look up joining member {}: {}", user_id, e))
                    .await;
                return;
            }
        };

        if let Some(user) = linked {
            info!(user_id, forum_id = %user.forum_id, "Linked member rejoined, restoring role");
            if let Err(e) = self
                .chat
                .grant_role(&self.guild_id, user_id, &self.verified_role)
                .await
            {
                self.reporter
                    .report(&format!(
                        "Failed to restore verified role for {}: {}",
                        user_id, e
                    ))
                    .await;
            }
            return;
        }

        info!(user_id, username, "New member joined, sending verification prompt");
        let prompt = format!(
            "Hi {}! To get verified, reply here with `verify <your forum profile link>`, for example:\nverify {}",
            username, self.profile_example
        );
        let sent = match self.chat.open_direct_channel(user_id).await {
            Ok(channel_id) => self.chat.send_message(&channel_id, &prompt).await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            // Members may block direct messages; nothing else to do.
            warn!(user_id, error = %e, "Failed to send verification prompt");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StoreVerificationCheck;
    use crate::commands::WhoisCommand;
    use chat_platform_client::{ChannelKind, RecordingChatClient, RecordingErrorReporter};
    use command_router::{ChannelConfig, CommandRegistry};
    use linked_user_store::InMemoryUserStore;

    const ADMIN: &str = "400";

    struct Fixture {
        chat: Arc<RecordingChatClient>,
        reporter: Arc<RecordingErrorReporter>,
        handler: EventHandler,
    }

    fn fixture(store: InMemoryUserStore, debug_user: Option<&str>) -> Fixture {
        let chat = Arc::new(RecordingChatClient::new().with_channel("dm-1", ChannelKind::Direct));
        let store: Arc<dyn UserStore> = Arc::new(store);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let whois = Arc::new(WhoisCommand::new(chat.clone(), store.clone()));
        let router = Router::new(
            CommandRegistry::new([whois.command()]).unwrap(),
            chat.clone(),
            ChannelConfig {
                administrative_channel: ADMIN.to_string(),
                primary_channel: "500".to_string(),
            },
            Arc::new(StoreVerificationCheck::new(store.clone())),
            tracing::Span::none(),
        );

        let handler = EventHandler {
            router,
            chat: chat.clone(),
            store,
            reporter: reporter.clone(),
            bot_id: "100".to_string(),
            debug_user: debug_user.map(str::to_string),
            guild_id: "200".to_string(),
            verified_role: "300".to_string(),
            profile_example: "https://forum.example.com/profile/1234-username/".to_string(),
        };

        Fixture {
            chat,
            reporter,
            handler,
        }
    }

    fn message(author: &str, channel: &str, content: &str) -> GatewayEvent {
        GatewayEvent::MessageCreate(IncomingMessage {
            id: "1".to_string(),
            author_id: author.to_string(),
            author_name: author.to_string(),
            channel_id: channel.to_string(),
            guild_id: Some("200".to_string()),
            content: content.to_string(),
            mentions: Vec::new(),
        })
    }

    fn joined(guild: &str, user: &str) -> GatewayEvent {
        GatewayEvent::MemberJoined {
            guild_id: guild.to_string(),
            user_id: user.to_string(),
            username: "newbie".to_string(),
        }
    }

    #[tokio::test]
    async fn test_command_is_dispatched() {
        let f = fixture(InMemoryUserStore::new().with_user("alice#0001", "21"), None);

        f.handler.handle(message("admin", ADMIN, "whois 21")).await;

        let replies = f.chat.messages_to(ADMIN);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("alice#0001"));
    }

    #[tokio::test]
    async fn test_own_messages_are_ignored() {
        let f = fixture(InMemoryUserStore::new(), None);

        f.handler.handle(message("100", ADMIN, "whois 21")).await;

        assert!(f.chat.messages().is_empty());
        assert!(f.chat.typing().is_empty());
    }

    #[tokio::test]
    async fn test_debug_user_filter() {
        let f = fixture(InMemoryUserStore::new(), Some("tester"));

        f.handler.handle(message("someone", ADMIN, "whois 21")).await;
        assert!(f.chat.messages().is_empty());

        f.handler.handle(message("tester", ADMIN, "whois 21")).await;
        assert_eq!(f.chat.messages_to(ADMIN).len(), 1);
    }

    #[tokio::test]
    async fn test_router_errors_are_reported() {
        let f = fixture(InMemoryUserStore::new(), None);
        f.chat.fail_sends(true);

        f.handler.handle(message("admin", ADMIN, "whois 21")).await;

        let reports = f.reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("Command from admin failed"));
    }

    #[tokio::test]
    async fn test_linked_member_rejoining_gets_role_back() {
        let f = fixture(InMemoryUserStore::new().with_user("alice#0001", "21"), None);

        f.handler.handle(joined("200", "alice#0001")).await;

        assert_eq!(
            f.chat.grants(),
            vec![(
                "200".to_string(),
                "alice#0001".to_string(),
                "300".to_string()
            )]
        );
        assert!(f.chat.messages().is_empty());
    }

    #[tokio::test]
    async fn test_new_member_gets_prompt() {
        let f = fixture(InMemoryUserStore::new(), None);

        f.handler.handle(joined("200", "bob#0002")).await;

        assert!(f.chat.grants().is_empty());
        let prompts = f.chat.messages_to("dm-bob#0002");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("verify https://forum.example.com/profile/1234-username/"));
    }

    #[tokio::test]
    async fn test_join_in_other_guild_is_ignored() {
        let f = fixture(InMemoryUserStore::new().with_user("alice#0001", "21"), None);

        f.handler.handle(joined("999", "alice#0001")).await;

        assert!(f.chat.grants().is_empty());
        assert!(f.chat.messages().is_empty());
    }
}
