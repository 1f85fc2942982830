//! WebSocket Game Server
//!
//! Accepts WebSocket connections and wires them to the session actor.
//! Each connection gets a reader loop and a writer task; the arena itself is
//! only touched by the world loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::network::config::{ServerConfig, TICK_INTERVAL};
use crate::network::protocol::{Inbound, ProtocolError, ServerMessage};
use crate::network::session::{ArenaSession, SessionInput};

/// How long a closing connection may spend flushing its queue.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection limit reached.
    #[error("Connection limit reached")]
    ConnectionLimitReached,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Open connections.
    connections: Arc<AtomicUsize>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Bind the configured address and run until shutdown.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run on an already bound listener until shutdown.
    #[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Arena server listening");

        let seed = match self.config.rng_seed {
            Some(seed) => seed,
            None => rand::random(),
        };
        let (input_tx, input_rx) = mpsc::channel(self.config.inbound_buffer);
        let world = tokio::spawn(run_world_loop(
            ArenaSession::new(seed),
            input_rx,
            self.shutdown_tx.subscribe(),
        ));

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            if self.connection_count() >= self.config.max_connections {
                                let err = GameServerError::ConnectionLimitReached;
                                warn!(%addr, %err, "rejecting connection");
                                continue;
                            }

                            info!(%addr, "new connection");
                            self.handle_connection(stream, addr, input_tx.clone());
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        drop(input_tx);
        if let Err(e) = world.await {
            return Err(GameServerError::Internal(format!("world loop failed: {e}")));
        }
        Ok(())
    }

    /// Spawn the tasks of a new connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, input_tx: mpsc::Sender<SessionInput>) {
        let connections = self.connections.clone();
        let outbound_buffer = self.config.outbound_buffer;
        let shutdown_rx = self.shutdown_tx.subscribe();

        connections.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, addr, input_tx, outbound_buffer, shutdown_rx).await {
                debug!(%addr, "connection ended with error: {}", e);
            }
            connections.fetch_sub(1, Ordering::SeqCst);
            info!(%addr, "client cleaned up");
        });
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Drive one WebSocket connection until it closes.
async fn serve_connection(
    stream: TcpStream,
    addr: SocketAddr,
    input_tx: mpsc::Sender<SessionInput>,
    outbound_buffer: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), GameServerError> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(outbound_buffer);
    let id = Uuid::new_v4();

    input_tx
        .send(SessionInput::Connected { id, addr, sender: msg_tx.clone() })
        .await
        .map_err(|_| GameServerError::Internal("session closed".to_string()))?;

    // Spawn message sender task
    let mut sender_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            let text = match msg.to_json() {
                Ok(t) => t,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    // Handle incoming messages
    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let input = match msg {
                    Some(Ok(Message::Text(text))) => match Inbound::decode(&text) {
                        Ok(Inbound::Message(message)) => SessionInput::Message { id, message },
                        Ok(Inbound::Legacy(frame)) => SessionInput::Legacy { id, frame },
                        Err(e) => SessionInput::Malformed { id, error: e.to_string() },
                    },
                    Some(Ok(Message::Binary(_))) => SessionInput::Malformed {
                        id,
                        error: ProtocolError::Binary.to_string(),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%addr, "client closed the connection");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(%addr, "WebSocket error: {}", e);
                        break;
                    }
                    // Pings are answered by tungstenite itself
                    Some(Ok(_)) => continue,
                };
                if input_tx.send(input).await.is_err() {
                    break;
                }
            }
            _ = shutdown_rx.recv() => {
                let _ = msg_tx.try_send(ServerMessage::Shutdown {
                    reason: "Server shutting down".to_string(),
                });
                break;
            }
        }
    }

    // The session drops its clone of the sender on disconnect, which lets
    // the writer drain and exit.
    let _ = input_tx.send(SessionInput::Disconnected { id }).await;
    drop(msg_tx);
    if tokio::time::timeout(FLUSH_TIMEOUT, &mut sender_task).await.is_err() {
        sender_task.abort();
    }
    Ok(())
}

/// The single writer: applies session inputs and runs the fixed-rate tick.
pub async fn run_world_loop(
    mut session: ArenaSession,
    mut inputs: mpsc::Receiver<SessionInput>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.run_tick();
            }
            input = inputs.recv() => match input {
                Some(input) => session.handle(input),
                None => break,
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    let score = session.state().score;
    info!(tick = session.state().tick, %score, "world loop stopped");
}
