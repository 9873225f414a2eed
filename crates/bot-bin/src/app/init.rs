//! Bot initialization.

use crate::app::{EventHandler, StoreVerificationCheck};
use crate::commands::WhoisCommand;
use bot_config_and_utils::{Config, CoreError};
use chat_gateway::{GatewayClient, GatewayConfig};
use chat_platform_client::{ChannelErrorReporter, ChatClient, DiscordRestClient, ErrorReporter};
use command_router::{ChannelConfig, CommandRegistry, Router};
use forum_client::{ForumClient, InvisionClient};
use linked_user_store::{SqliteUserStore, UserStore};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use url::Url;
use verification_workflow::{
    Collaborators, SessionOutcome, SessionReport, VerificationConfig, VerificationWorkflow,
};

/// Example profile link shown in usage text, on the forum's own host.
pub fn profile_example(forum_url: &Url) -> String {
    let port = forum_url
        .port()
        .map(|port| format!(":{}", port))
        .unwrap_or_default();
    match forum_url.host_str() {
        Some(host) => format!(
            "{}://{}{}/profile/1234-username/",
            forum_url.scheme(),
            host,
            port
        ),
        None => "https://forum.example.com/profile/1234-username/".to_string(),
    }
}

/// Run the bot until Ctrl-C or a fatal gateway error.
pub async fn run_bot(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(config = ?config, "Starting maccer");

    let store: Arc<dyn UserStore> = Arc::new(
        SqliteUserStore::open(Path::new(&config.database_path))
            .await
            .map_err(|e| format!("Failed to open user store: {}", e))?,
    );
    info!(path = %config.database_path, "User store ready");

    let chat: Arc<dyn ChatClient> = Arc::new(DiscordRestClient::new(
        config.discord_token.clone(),
        config.http_timeout(),
    )?);
    let forum: Arc<dyn ForumClient> = Arc::new(InvisionClient::new(
        config.forum_endpoint.clone(),
        config.forum_key.clone(),
        config.http_timeout(),
    )?);
    info!(timeout_secs = config.http_timeout_secs, "REST clients ready");

    let roles = chat
        .guild_roles(&config.guild_id)
        .await
        .map_err(|e| format!("Failed to load guild roles: {}", e))?;
    if !roles.iter().any(|role| role.id == config.verified_role) {
        return Err(CoreError::Config(format!(
            "verified role {} does not exist in guild {}",
            config.verified_role, config.guild_id
        ))
        .into());
    }
    info!(role = %config.verified_role, "Verified role found");

    let reporter: Arc<dyn ErrorReporter> =
        Arc::new(ChannelErrorReporter::new(chat.clone(), config.log_channel.clone()));

    let example = profile_example(&config.forum_url()?);
    let verification_config = VerificationConfig::new(&config.guild_id, &config.verified_role)
        .with_timing(config.verify_poll_interval(), config.verify_timeout())
        .with_profile_example(example.clone());

    let (report_tx, report_rx) = mpsc::channel(64);
    let workflow = Arc::new(VerificationWorkflow::new(
        Collaborators {
            chat: chat.clone(),
            forum,
            store: store.clone(),
            reporter: reporter.clone(),
        },
        verification_config,
        report_tx,
        tracing::info_span!("verify"),
    ));
    let whois = Arc::new(WhoisCommand::new(chat.clone(), store.clone()));

    let registry = CommandRegistry::new([workflow.command(), whois.command()])?;
    info!(commands = ?registry.triggers(), "Command registry built");

    let router = Router::new(
        registry,
        chat.clone(),
        ChannelConfig {
            administrative_channel: config.administrative_channel.clone(),
            primary_channel: config.primary_channel.clone(),
        },
        Arc::new(StoreVerificationCheck::new(store.clone())),
        tracing::info_span!("router"),
    );

    tokio::spawn(drain_reports(report_rx));

    let handler = EventHandler {
        router,
        chat,
        store,
        reporter,
        bot_id: config.bot_id.clone(),
        debug_user: config.debug_user.clone(),
        guild_id: config.guild_id.clone(),
        verified_role: config.verified_role.clone(),
        profile_example: example,
    };
    if let Some(user) = &handler.debug_user {
        warn!(user = %user, "Debug mode: serving a single user");
    }

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let gateway = GatewayClient::new(GatewayConfig::new(config.discord_token.clone()), event_tx);
    let mut gateway_task = tokio::spawn(async move { gateway.run().await });

    info!("Maccer running");
    let result: Result<(), Box<dyn std::error::Error>> = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                gateway_task.abort();
                break Ok(());
            }
            joined = &mut gateway_task => {
                break match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!(error = %e, "Gateway stopped");
                        Err(e.into())
                    }
                    Err(e) => Err(format!("Gateway task failed: {}", e).into()),
                };
            }
            Some(event) = event_rx.recv() => handler.handle(event).await,
        }
    };

    info!("Maccer stopped");
    result
}

/// Log every finished verification session.
async fn drain_reports(mut reports: mpsc::Receiver<SessionReport>) {
    while let Some(report) = reports.recv().await {
        match &report.outcome {
            SessionOutcome::Matched => {
                info!(user_id = %report.requester, forum_id = %report.forum_id, "User verified")
            }
            SessionOutcome::Expired => {
                info!(user_id = %report.requester, forum_id = %report.forum_id, "Verification expired")
            }
            SessionOutcome::Failed(reason) => warn!(
                user_id = %report.requester,
                forum_id = %report.forum_id,
                reason = %reason,
                "Verification failed"
            ),
        }
    }
}
