//! TCP command link — one listening socket, one client at a time.
//!
//! Implements [`CommandLink`] over non-blocking std sockets, so the
//! control loop can poll it without a reactor or extra threads.  A newly
//! accepted client replaces the previous one.  Reply bytes are queued in
//! a fixed-capacity buffer and written opportunistically; whatever the
//! socket cannot take yet stays queued for the next [`flush`].
//!
//! [`flush`]: TcpCommandLink::flush

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use anyhow::{Context, Result};
use heapless::Vec;
use log::{debug, info, warn};

use crate::app::commands::ChannelId;
use crate::app::ports::CommandLink;
use crate::app::router::served_channels;
use crate::config::StationConfig;
use crate::error::{CommsError, Error};

/// Queued reply bytes per link.
const OUTBOUND_CAP: usize = 64;

/// Links for every channel the configured router variant serves, in
/// polling order.  Unserved channels get no listening socket.
pub type ServedLinks = Vec<(ChannelId, TcpCommandLink), 2>;

pub fn bind_served(config: &StationConfig) -> Result<ServedLinks> {
    let mut links = ServedLinks::new();
    for &channel in served_channels(config.variant) {
        let link = TcpCommandLink::bind(channel.label(), config.port(channel))?;
        if links.push((channel, link)).is_err() {
            anyhow::bail!("more than {} served channels", links.capacity());
        }
    }
    Ok(links)
}

pub struct TcpCommandLink {
    label: &'static str,
    listener: TcpListener,
    client: Option<TcpStream>,
    outbound: Vec<u8, OUTBOUND_CAP>,
}

impl TcpCommandLink {
    /// Listen on `0.0.0.0:port`.  Port 0 picks an ephemeral port.
    pub fn bind(label: &'static str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .map_err(|e| {
                warn!("{}: {} ({})", label, Error::from(CommsError::BindFailed), e);
                e
            })
            .with_context(|| format!("{label}: bind port {port}"))?;
        listener
            .set_nonblocking(true)
            .with_context(|| format!("{label}: set non-blocking"))?;
        info!("{} listening on {}", label, listener.local_addr()?);
        Ok(Self {
            label,
            listener,
            client: None,
            outbound: Vec::new(),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    /// Push queued reply bytes to the client.
    pub fn flush(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.outbound.clear();
            return;
        };
        if self.outbound.is_empty() {
            return;
        }
        match client.write(&self.outbound) {
            Ok(n) => {
                let left = self.outbound.len() - n;
                self.outbound.rotate_left(n);
                self.outbound.truncate(left);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => {
                warn!("{}: {} ({})", self.label, Error::from(CommsError::WriteFailed), e);
                self.drop_client();
            }
        }
    }

    fn accept_pending(&mut self) {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!("{}: cannot make {} non-blocking ({})", self.label, peer, e);
                    return;
                }
                if let Err(e) = stream.set_nodelay(true) {
                    debug!("{}: cannot disable Nagle for {} ({})", self.label, peer, e);
                }
                if self.client.is_some() {
                    info!("{}: {} replaces previous client", self.label, peer);
                } else {
                    info!("{}: {} attached", self.label, peer);
                }
                self.client = Some(stream);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("{}: accept failed ({})", self.label, e),
        }
    }

    fn drop_client(&mut self) {
        if self.client.take().is_some() {
            info!("{}: client detached", self.label);
        }
        self.outbound.clear();
    }
}

impl CommandLink for TcpCommandLink {
    fn is_connected(&mut self) -> bool {
        self.accept_pending();
        self.client.is_some()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let client = self.client.as_mut()?;
        let mut buf = [0u8; 1];
        match client.read(&mut buf) {
            Ok(0) => {
                self.drop_client();
                None
            }
            Ok(_) => Some(buf[0]),
            Err(e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("{}: {} ({})", self.label, Error::from(CommsError::ReadFailed), e);
                self.drop_client();
                None
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if self.outbound.push(byte).is_err() {
            warn!("{}: {}", self.label, Error::from(CommsError::BufferFull));
            return;
        }
        self.flush();
    }

    fn discard_pending_output(&mut self) {
        self.outbound.clear();
    }
}
