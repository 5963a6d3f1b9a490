//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers.

use crate::handlers::{
    handle_add_member, handle_add_relation, handle_info, handle_members, handle_relation,
    handle_spouses, handle_tree,
};
use crate::protocol::{AddMemberParams, AddRelationParams, RelationParams, Request, Response};
use crate::{ServerContext, ServerError, SharedGraph, SnapshotSink};
use futures_util::{SinkExt, StreamExt};
use kindred_graph::KinGraph;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,

    /// Generation bound for family tree queries.
    pub max_tree_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 7460)),
            max_tree_depth: kindred_graph::DEFAULT_MAX_DEPTH,
        }
    }
}

/// The Kindred WebSocket server.
pub struct KindredServer {
    config: ServerConfig,
    ctx: ServerContext,
}

impl KindredServer {
    /// Creates a new server with the given graph.
    pub fn new(graph: KinGraph, config: ServerConfig) -> Self {
        Self::new_with_shared(Arc::new(RwLock::new(graph)), config)
    }

    /// Creates a server over a graph that other tasks also hold.
    pub fn new_with_shared(graph: SharedGraph, config: ServerConfig) -> Self {
        let mut ctx = ServerContext::new(graph);
        ctx.max_tree_depth = config.max_tree_depth;
        Self { config, ctx }
    }

    /// Saves the graph to `store` after every mutation.
    pub fn with_snapshot<P: SnapshotSink + 'static>(mut self, store: P) -> Self {
        self.ctx.snapshot = Some(Arc::new(store));
        self
    }

    /// Runs the server, accepting connections forever.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Kindred server listening on {}", self.config.addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, ctx).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handles a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    ctx: ServerContext,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket connection established with {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if msg.is_ping() {
            write.send(Message::Pong(msg.into_data())).await?;
            continue;
        }

        if msg.is_text() {
            let text = msg.to_text().unwrap_or("");
            let response = process_message(text, &ctx).await;
            let json = serde_json::to_string(&response)?;
            write.send(Message::Text(json)).await?;
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

/// Processes a JSON-RPC message and returns a response.
pub async fn process_message(text: &str, ctx: &ServerContext) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Processing method: {}", method);

    match method {
        "graph.info" => handle_info(ctx, id).await,

        "family.members" => handle_members(ctx, id).await,

        "family.spouses" => handle_spouses(ctx, id).await,

        "family.tree" => handle_tree(ctx, id).await,

        "family.relation" => match serde_json::from_value::<RelationParams>(request.params) {
            Ok(params) => handle_relation(ctx, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "family.addMember" => match serde_json::from_value::<AddMemberParams>(request.params) {
            Ok(params) => handle_add_member(ctx, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "family.addRelation" => match serde_json::from_value::<AddRelationParams>(request.params)
        {
            Ok(params) => handle_add_relation(ctx, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        _ => Response::method_not_found(id, method),
    }
}
