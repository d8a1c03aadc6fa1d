//! Wire format for the move relay.
//!
//! Every packet travels as one frame: a 4-byte big-endian payload length
//! followed by the `bincode` encoding of a [`Packet`].

use crate::board::Color;
use crate::error::TransportError;
use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::lookup_host;

/// Largest payload accepted from a peer
pub const MAX_FRAME_LEN: usize = 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Packet {
    /// First frame sent by the connecting side
    Connect { client_version: u32 },
    /// Host's answer: the guest's color and the board geometry
    Connected { color: Color, columns: u8, rows: u8 },
    Move { column: u8, color: Color },
    Disconnect { reason: String },
}

impl Packet {
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Connect { .. } => "Connect",
            Packet::Connected { .. } => "Connected",
            Packet::Move { .. } => "Move",
            Packet::Disconnect { .. } => "Disconnect",
        }
    }
}

/// Encode `packet` as a length-prefixed frame
pub fn encode_frame(packet: &Packet) -> Result<Vec<u8>, TransportError> {
    let payload = serialize(packet).map_err(TransportError::Encode)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_LEN,
        });
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub fn decode_payload(payload: &[u8]) -> Result<Packet, TransportError> {
    deserialize(payload).map_err(TransportError::Malformed)
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next packet.
///
/// Returns `Ok(None)` when the peer closed or reset the stream between
/// frames. A stream that ends inside a frame, header included, is an I/O
/// error.
pub async fn read_packet<R>(reader: &mut R) -> Result<Option<Packet>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    match reader.read(&mut header[..1]).await {
        Ok(0) => return Ok(None),
        Ok(_) => {}
        Err(e) if is_hangup(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    reader.read_exact(&mut header[1..]).await?;

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    decode_payload(&payload).map(Some)
}

/// A peer closing with unread data surfaces as a reset rather than EOF
fn is_hangup(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}

/// Resolve `addr` to its first IPv4 socket address
pub async fn resolve_ipv4(addr: &str) -> Result<SocketAddr, TransportError> {
    let mut addrs = lookup_host(addr)
        .await
        .map_err(|source| TransportError::Resolve {
            addr: addr.to_string(),
            source,
        })?;
    addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| TransportError::NoAddress(addr.to_string()))
}
