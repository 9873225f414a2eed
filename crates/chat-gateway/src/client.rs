//! Gateway websocket client.

use crate::payload::{intents, is_fatal_close, opcode, parse_dispatch, GatewayPayload};
use crate::{GatewayError, GatewayEvent, GatewayResult};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

/// Default gateway URL.
pub const DISCORD_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Gateway client configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub intents: u64,
    /// Base reconnect delay in seconds.
    pub reconnect_base_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub reconnect_max_delay_secs: u64,
    /// Consecutive failed connections tolerated before giving up.
    pub max_reconnect_attempts: u32,
}

impl GatewayConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            url: DISCORD_GATEWAY_URL.to_string(),
            token: token.into(),
            intents: intents::DEFAULT,
            reconnect_base_delay_secs: 1,
            reconnect_max_delay_secs: 60,
            max_reconnect_attempts: 10,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("reconnect_base_delay_secs", &self.reconnect_base_delay_secs)
            .field("reconnect_max_delay_secs", &self.reconnect_max_delay_secs)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .finish()
    }
}

/// Reconnect delay for the given attempt, doubling from the base up to the cap.
pub fn backoff_delay(config: &GatewayConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let secs = config
        .reconnect_base_delay_secs
        .saturating_mul(2u64.pow(exponent));
    Duration::from_secs(secs.min(config.reconnect_max_delay_secs))
}

enum SessionEnd {
    /// Connection dropped or the gateway asked us to reconnect.
    Reconnect,
    /// Nobody is listening for events any more.
    Stopped,
}

/// Connects to the gateway and forwards events until the receiver is dropped.
pub struct GatewayClient {
    config: GatewayConfig,
    event_tx: mpsc::Sender<GatewayEvent>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, event_tx: mpsc::Sender<GatewayEvent>) -> Self {
        Self { config, event_tx }
    }

    /// Run the connection loop.
    ///
    /// Returns `Ok` once the event receiver is gone, or an error when the
    /// gateway rejects the bot outright or reconnecting keeps failing.
    pub async fn run(&self) -> GatewayResult<()> {
        let mut attempts: u32 = 0;

        loop {
            match self.connect_once(&mut attempts).await {
                Ok(SessionEnd::Stopped) => {
                    info!("Event receiver closed, leaving gateway");
                    return Ok(());
                }
                Ok(SessionEnd::Reconnect) => {}
                Err(e @ GatewayError::Fatal { .. }) => {
                    error!(error = %e, "Gateway rejected the session");
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, "Gateway connection failed");
                }
            }

            attempts += 1;
            if attempts > self.config.max_reconnect_attempts {
                warn!("Max reconnect attempts reached");
                return Err(GatewayError::ReconnectExhausted(
                    self.config.max_reconnect_attempts,
                ));
            }

            let delay = backoff_delay(&self.config, attempts);
            info!(attempt = attempts, delay_secs = delay.as_secs(), "Scheduling reconnect");
            tokio::time::sleep(delay).await;
        }
    }

    async fn connect_once(&self, attempts: &mut u32) -> GatewayResult<SessionEnd> {
        info!(url = %self.config.url, "Connecting to gateway");

        let (ws_stream, _) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        let hello = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => break GatewayPayload::from_json(&text)?,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(GatewayError::Protocol(
                        "connection closed before HELLO".to_string(),
                    ))
                }
            }
        };
        let heartbeat_period = Duration::from_millis(hello.heartbeat_interval_ms()?);
        debug!(heartbeat_ms = heartbeat_period.as_millis() as u64, "Received HELLO");

        let identify = GatewayPayload::identify(&self.config.token, self.config.intents).to_json()?;
        write.send(Message::Text(identify.into())).await?;
        debug!("Sent IDENTIFY");

        let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(32);
        let sender_handle = tokio::spawn(async move {
            while let Some(msg) = msg_rx.recv().await {
                if write.send(msg).await.is_err() {
                    break;
                }
            }
        });

        // 0 means no dispatch seen yet; gateway sequence numbers start at 1.
        let sequence = Arc::new(AtomicU64::new(0));

        let heartbeat_sender = msg_tx.clone();
        let heartbeat_sequence = sequence.clone();
        let heartbeat_handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + heartbeat_period, heartbeat_period);
            loop {
                ticker.tick().await;
                let seq = heartbeat_sequence.load(Ordering::Relaxed);
                let beat = GatewayPayload::heartbeat((seq > 0).then_some(seq));
                if let Ok(json) = beat.to_json() {
                    if heartbeat_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        });

        let result = self
            .read_loop(&mut read, &msg_tx, &sequence, attempts)
            .await;

        heartbeat_handle.abort();
        sender_handle.abort();
        result
    }

    async fn read_loop<S>(
        &self,
        read: &mut S,
        msg_tx: &mpsc::Sender<Message>,
        sequence: &AtomicU64,
        attempts: &mut u32,
    ) -> GatewayResult<SessionEnd>
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    let payload = match GatewayPayload::from_json(&text) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(error = %e, "Failed to parse gateway payload");
                            continue;
                        }
                    };
                    if let Some(seq) = payload.s {
                        sequence.store(seq, Ordering::Relaxed);
                    }

                    match payload.op {
                        opcode::DISPATCH => {
                            let kind = payload.t.unwrap_or_default();
                            let event = match parse_dispatch(&kind, payload.d) {
                                Ok(Some(event)) => event,
                                Ok(None) => {
                                    trace!(kind = %kind, "Ignoring dispatch");
                                    continue;
                                }
                                Err(e) => {
                                    warn!(kind = %kind, error = %e, "Malformed dispatch");
                                    continue;
                                }
                            };
                            if let GatewayEvent::Ready { ref user_id, .. } = event {
                                *attempts = 0;
                                info!(user_id = %user_id, "Gateway session ready");
                            }
                            if self.event_tx.send(event).await.is_err() {
                                return Ok(SessionEnd::Stopped);
                            }
                        }
                        opcode::HEARTBEAT => {
                            let seq = sequence.load(Ordering::Relaxed);
                            let beat = GatewayPayload::heartbeat((seq > 0).then_some(seq)).to_json()?;
                            let _ = msg_tx.send(Message::Text(beat.into())).await;
                        }
                        opcode::HEARTBEAT_ACK => trace!("Heartbeat acknowledged"),
                        opcode::RECONNECT => {
                            info!("Gateway requested reconnect");
                            return Ok(SessionEnd::Reconnect);
                        }
                        opcode::INVALID_SESSION => {
                            warn!("Gateway invalidated the session");
                            return Ok(SessionEnd::Reconnect);
                        }
                        other => debug!(op = other, "Unhandled gateway opcode"),
                    }
                }
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        let code = u16::from(frame.code);
                        if is_fatal_close(code) {
                            return Err(GatewayError::Fatal {
                                code,
                                reason: frame.reason.to_string(),
                            });
                        }
                        info!(code, reason = %frame.reason, "Gateway connection closed");
                    } else {
                        info!("Gateway connection closed");
                    }
                    return Ok(SessionEnd::Reconnect);
                }
                Ok(Message::Ping(data)) => {
                    let _ = msg_tx.send(Message::Pong(data)).await;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    return Ok(SessionEnd::Reconnect);
                }
            }
        }

        Ok(SessionEnd::Reconnect)
    }
}
