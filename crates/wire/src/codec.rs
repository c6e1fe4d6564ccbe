//! Framed transport: dial with a deadline, then send/receive
//! bincode-encoded messages over a length-delimited frame.

use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::error::Error;

/// Deadline for establishing a new TCP connection to a peer.
pub const DIAL_DEADLINE: Duration = Duration::from_secs(3);
/// Soft deadline around a single framed read or write once connected.
pub const FRAME_DEADLINE: Duration = Duration::from_secs(30);

/// A length-delimited framed TCP connection.
pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

/// Wrap an already-connected stream in the length-delimited frame codec.
pub fn transport(stream: TcpStream) -> Transport {
    Framed::new(stream, LengthDelimitedCodec::new())
}

/// Dial `addr`, failing if the TCP handshake doesn't complete within
/// [`DIAL_DEADLINE`].
pub async fn dial(addr: &str) -> Result<Transport, Error> {
    let stream = timeout(DIAL_DEADLINE, TcpStream::connect(addr)).await??;
    stream.set_nodelay(true)?;
    Ok(transport(stream))
}

/// Serialize `msg` and write it as one frame, bounded by
/// [`FRAME_DEADLINE`].
pub async fn send<T: Serialize>(t: &mut Transport, msg: &T) -> Result<(), Error> {
    let bytes = bincode::serialize(msg)?;
    timeout(FRAME_DEADLINE, t.send(Bytes::from(bytes))).await??;
    Ok(())
}

/// Read one frame and deserialize it, bounded by [`FRAME_DEADLINE`].
pub async fn recv<T: DeserializeOwned>(t: &mut Transport) -> Result<T, Error> {
    let frame = timeout(FRAME_DEADLINE, t.next())
        .await?
        .ok_or(Error::Closed)??;
    Ok(bincode::deserialize(&frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Request, Response};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn round_trip_request_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut t = transport(stream);
            let req: Request = recv(&mut t).await.unwrap();
            match req {
                Request::Get { key } => {
                    assert_eq!(key, b"hello".to_vec());
                    send(&mut t, &Response::Value(Some(b"world".to_vec())))
                        .await
                        .unwrap();
                }
                _ => panic!("unexpected request"),
            }
        });

        let mut client = dial(&addr.to_string()).await.unwrap();
        send(&mut client, &Request::Get { key: b"hello".to_vec() })
            .await
            .unwrap();
        let resp: Response = recv(&mut client).await.unwrap();
        match resp {
            Response::Value(Some(v)) => assert_eq!(v, b"world".to_vec()),
            other => panic!("unexpected response: {other:?}"),
        }

        server.await.unwrap();
    }
}
