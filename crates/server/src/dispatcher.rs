//! TCP accept loop and per-connection request dispatch.

use std::sync::Arc;

use tokio::net::TcpListener;
use wire::{Request, Response};

use crate::handler::Handler;

/// Bind `addr` and serve storage RPCs until the process is stopped.
pub async fn serve(addr: &str, handler: Arc<Handler>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "storage server listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, handler).await {
                tracing::warn!(%peer, error = %err, "connection ended with an error");
            }
        });
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, handler: Arc<Handler>) -> Result<(), wire::Error> {
    let mut t = wire::transport(stream);
    let req: Request = wire::codec::recv(&mut t).await?;
    let resp = dispatch(&handler, req).await;
    wire::codec::send(&mut t, &resp).await
}

async fn dispatch(handler: &Handler, req: Request) -> Response {
    match req {
        Request::Init { self_addr, other_nodes, replicas } => {
            match handler.init(self_addr, other_nodes, replicas).await {
                Ok(()) => Response::Ok,
                Err(err) => Response::Err(err.to_string()),
            }
        }
        Request::AddNode { address } => {
            handler.add_node(address).await;
            Response::Ok
        }
        Request::RemoveNode { address } => {
            handler.remove_node(&address).await;
            Response::Ok
        }
        Request::Put { key, value } => match handler.put(&key, &value).await {
            Ok(()) => Response::Ok,
            Err(err) => Response::Err(err.to_string()),
        },
        Request::Get { key } => match handler.get(&key).await {
            Ok(value) => Response::Value(value),
            Err(err) => Response::Err(err.to_string()),
        },
        Request::Delete { key } => match handler.delete(&key).await {
            Ok(()) => Response::Ok,
            Err(err) => Response::Err(err.to_string()),
        },
    }
}
