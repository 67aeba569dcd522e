//! Realtime client using `tokio-tungstenite`.
//!
//! One websocket carries the traffic of both accounts. Writes go through a
//! mutex-guarded sink; a background task reads the stream and completes
//! pending calls as their acknowledgements arrive.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rengo_protocol::{
    ClientEvent, ClientFrame, Codec, GameId, JsonCodec, PlayerId, ServerFrame, ServerMove,
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{MoveGateway, RealtimeAuth, RealtimeConfig, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Calls waiting for an acknowledgement, keyed by `seq`. The value sent
/// through the channel is the server's error string, if any.
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Option<String>>>>>;

/// Connection to the game server's realtime endpoint.
pub struct RealtimeClient {
    sink: Mutex<SplitSink<WsStream, Message>>,
    pending: Pending,
    next_seq: AtomicU64,
    config: RealtimeConfig,
    codec: JsonCodec,
    reader: JoinHandle<()>,
}

impl RealtimeClient {
    /// Opens the websocket at `url` (`ws://` or `wss://`).
    pub async fn connect(
        url: &str,
        config: RealtimeConfig,
    ) -> Result<Self, TransportError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        tracing::info!(url, "realtime connection established");

        let (sink, stream) = ws.split();
        let pending: Pending = Arc::default();
        let reader = tokio::spawn(read_loop(stream, Arc::clone(&pending)));

        Ok(Self {
            sink: Mutex::new(sink),
            pending,
            next_seq: AtomicU64::new(1),
            config,
            codec: JsonCodec,
            reader,
        })
    }

    /// Binds the connection to an account. Call once per account before
    /// connecting it to any game.
    pub async fn authenticate(&self, auth: &RealtimeAuth) -> Result<(), TransportError> {
        tracing::debug!(player_id = %auth.player_id, "authenticating realtime account");
        self.emit(ClientEvent::Authenticate {
            auth: auth.chat_auth.clone(),
            player_id: auth.player_id,
            username: auth.username.clone(),
            jwt: auth.jwt.clone(),
        })
        .await
    }

    /// Closes the websocket.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Sends a frame without waiting for anything back.
    async fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        self.send_frame(&ClientFrame { seq: None, event }).await
    }

    /// Sends a frame and waits up to `timeout` for its acknowledgement.
    async fn call(
        &self,
        event: ClientEvent,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let operation = event.name();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(seq, tx);

        if let Err(e) = self.send_frame(&ClientFrame { seq: Some(seq), event }).await {
            self.pending.lock().await.remove(&seq);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(None)) => {
                tracing::debug!(operation, seq, "call acknowledged");
                Ok(())
            }
            Ok(Ok(Some(reason))) => Err(TransportError::Refused { operation, reason }),
            Ok(Err(_)) => Err(TransportError::ConnectionClosed(
                "realtime reader stopped".into(),
            )),
            Err(_) => {
                self.pending.lock().await.remove(&seq);
                Err(TransportError::Timeout {
                    operation,
                    after: timeout,
                })
            }
        }
    }

    async fn send_frame(&self, frame: &ClientFrame) -> Result<(), TransportError> {
        let bytes = self.codec.encode(frame)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        self.sink
            .lock()
            .await
            .send(Message::text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl MoveGateway for RealtimeClient {
    async fn connect_game(&self, game: GameId, player: PlayerId) -> Result<(), TransportError> {
        self.emit(ClientEvent::GameConnect {
            game_id: game,
            player_id: player,
            chat: 0,
        })
        .await
    }

    async fn submit_move(
        &self,
        game: GameId,
        player: PlayerId,
        mv: &ServerMove,
    ) -> Result<(), TransportError> {
        let event = ClientEvent::GameMove {
            game_id: game,
            player_id: player,
            mv: mv.as_str().to_string(),
        };
        self.call(event, self.config.ack_timeout).await
    }

    async fn submit_resign(&self, game: GameId, player: PlayerId) -> Result<(), TransportError> {
        let event = ClientEvent::GameResign {
            game_id: game,
            player_id: player,
        };
        self.call(event, self.config.quick_timeout).await
    }

    async fn submit_stone_acceptance(
        &self,
        game: GameId,
        player: PlayerId,
        stones: &str,
    ) -> Result<(), TransportError> {
        let event = ClientEvent::AcceptRemovedStones {
            game_id: game,
            player_id: player,
            stones: stones.to_string(),
            strict_seki_mode: false,
        };
        self.call(event, self.config.ack_timeout).await
    }
}

/// Routes acknowledgements to their waiting calls until the stream ends.
///
/// On exit every pending sender is dropped, which fails the waiting calls
/// with `ConnectionClosed` instead of letting them run into their timeout.
async fn read_loop(mut stream: SplitStream<WsStream>, pending: Pending) {
    let codec = JsonCodec;
    loop {
        let data = match stream.next().await {
            Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
            Some(Ok(Message::Binary(data))) => data.to_vec(),
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!("realtime connection closed");
                break;
            }
            Some(Ok(_)) => continue, // ping/pong/frame
            Some(Err(e)) => {
                tracing::warn!(error = %e, "realtime receive failed");
                break;
            }
        };

        match codec.decode::<ServerFrame>(&data) {
            Ok(ServerFrame::Ack { seq, error }) => {
                if let Some(tx) = pending.lock().await.remove(&seq) {
                    let _ = tx.send(error);
                } else {
                    tracing::debug!(seq, "acknowledgement for unknown call");
                }
            }
            Ok(ServerFrame::Event { name }) => {
                tracing::trace!(%name, "server event");
            }
            Err(e) => {
                tracing::debug!(error = %e, "undecodable realtime frame");
            }
        }
    }
    pending.lock().await.clear();
}
