//! The transport boundary between a comparison server and its client.
//!
//! No network transport is specified by the protocol itself; a [`Channel`] is
//! any ordered, reliable way to exchange [`ComparisonMessage`]s. The default,
//! [`InProcessChannel`], is a `tokio::sync::mpsc`-backed duplex pair, so the
//! full protocol can be driven end to end without any sockets, mirroring this
//! codebase's own request/response round-trip style (just over an in-process
//! queue instead of a websocket).

use secomp_core::error::{Error, Result};
use secomp_types::message::ComparisonMessage;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

/// An ordered, reliable, bidirectional channel carrying
/// [`ComparisonMessage`]s between one comparison server and its client.
pub trait Channel<Outer, Inner>: Send + Sync {
    /// Sends one message. Returns an error if the peer has disconnected.
    fn send(
        &self,
        message: ComparisonMessage<Outer, Inner>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Waits for the next message from the peer.
    fn recv(&self) -> impl Future<Output = Result<ComparisonMessage<Outer, Inner>>> + Send;
}

/// One end of an in-process duplex channel.
pub struct InProcessChannel<Outer, Inner> {
    tx: mpsc::Sender<ComparisonMessage<Outer, Inner>>,
    rx: AsyncMutex<mpsc::Receiver<ComparisonMessage<Outer, Inner>>>,
}

/// Builds a connected pair of [`InProcessChannel`]s: messages sent on one end
/// are received on the other.
pub fn duplex<Outer, Inner>(
    buffer: usize,
) -> (InProcessChannel<Outer, Inner>, InProcessChannel<Outer, Inner>)
where
    Outer: Send + 'static,
    Inner: Send + 'static,
{
    let (tx_a, rx_b) = mpsc::channel(buffer);
    let (tx_b, rx_a) = mpsc::channel(buffer);
    (
        InProcessChannel {
            tx: tx_a,
            rx: AsyncMutex::new(rx_a),
        },
        InProcessChannel {
            tx: tx_b,
            rx: AsyncMutex::new(rx_b),
        },
    )
}

impl<Outer, Inner> Channel<Outer, Inner> for InProcessChannel<Outer, Inner>
where
    Outer: Send + Sync + 'static,
    Inner: Send + Sync + 'static,
{
    async fn send(&self, message: ComparisonMessage<Outer, Inner>) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| Error::ProtocolViolation("peer channel closed".into()))
    }

    async fn recv(&self) -> Result<ComparisonMessage<Outer, Inner>> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| Error::ProtocolViolation("peer channel closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secomp_types::session::{ComparisonCounter, SessionId};

    #[tokio::test]
    async fn messages_sent_on_one_end_arrive_on_the_other() {
        let (server_end, client_end) = duplex::<i64, i64>(8);
        let message = ComparisonMessage::PaillierZ {
            session: SessionId::new(),
            counter: ComparisonCounter::initial(),
            z: 42,
        };
        server_end.send(message.clone()).await.unwrap();
        let received = client_end.recv().await.unwrap();
        assert_eq!(received.kind(), "PaillierZ");
    }

    #[tokio::test]
    async fn recv_errors_once_peer_is_dropped() {
        let (server_end, client_end) = duplex::<i64, i64>(8);
        drop(server_end);
        assert!(client_end.recv().await.is_err());
    }
}
