//! UDP responder that lets clients find the server on the LAN.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::error::DiscoveryError;
use crate::protocol::{DISCOVERY_PROBE, DISCOVERY_REPLY_PREFIX};
use crate::server::metrics;
use crate::Result;

/// Largest datagram the responder will look at.
const RECV_BUFFER: usize = 1024;

/// Answers discovery probes with the server's reachable URL.
///
/// Clients broadcast a fixed probe string; the responder replies to the
/// sender with `HotWatchServer:http://<host>:<port>`. Anything else on
/// the socket is ignored.
pub struct DiscoveryResponder {
    socket: UdpSocket,
    advertised_port: u16,
    advertise_ip: Option<Ipv4Addr>,
}

impl DiscoveryResponder {
    /// Bind the responder socket.
    ///
    /// `advertised_port` is the HTTP port clients should connect to,
    /// not the UDP port. When `advertise_ip` is set it is used verbatim
    /// in replies instead of the interface scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the UDP socket cannot be bound.
    pub async fn bind(
        addr: SocketAddr,
        advertised_port: u16,
        advertise_ip: Option<Ipv4Addr>,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| DiscoveryError::BindFailed {
                address: addr.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(%addr, "Discovery responder bound");

        Ok(Self {
            socket,
            advertised_port,
            advertise_ip,
        })
    }

    /// The address the responder actually bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket's local address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| DiscoveryError::NoLocalAddr(e.to_string()).into())
    }

    /// Answer probes until `shutdown` is cancelled.
    ///
    /// Read errors are logged and the loop keeps going; a dead read
    /// never takes discovery down.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut buf = [0u8; RECV_BUFFER];

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("Discovery responder shutting down");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => self.answer(&buf[..len], peer).await,
                        Err(err) => {
                            tracing::warn!(error = %err, "Discovery read error");
                        }
                    }
                }
            }
        }
    }

    /// Reply to a single datagram if it is a recognized probe.
    async fn answer(&self, payload: &[u8], peer: SocketAddr) {
        if !matches_probe(payload) {
            tracing::trace!(%peer, len = payload.len(), "Ignoring unrecognized datagram");
            return;
        }

        // The host is resolved per probe so replies track interface
        // changes without a restart.
        let Some(host) = advertised_host(self.advertise_ip) else {
            tracing::warn!(%peer, "No non-loopback IPv4 address, leaving probe unanswered");
            return;
        };
        let reply = format_reply(&host, self.advertised_port);

        match self.socket.send_to(reply.as_bytes(), peer).await {
            Ok(_) => {
                metrics::DISCOVERY_PROBES.inc();
                tracing::debug!(%peer, %reply, "Answered discovery probe");
            }
            Err(err) => {
                tracing::warn!(%peer, error = %err, "Failed to answer discovery probe");
            }
        }
    }
}

/// Whether a datagram is exactly the discovery probe.
fn matches_probe(payload: &[u8]) -> bool {
    payload == DISCOVERY_PROBE
}

/// Build the reply advertising the server at `host:port`.
fn format_reply(host: &str, port: u16) -> String {
    format!("{DISCOVERY_REPLY_PREFIX}http://{host}:{port}")
}

/// The host to advertise: the override if configured, otherwise the
/// first non-loopback IPv4 address. `None` when neither exists; a
/// probe without a reachable address gets no reply at all.
fn advertised_host(advertise_ip: Option<Ipv4Addr>) -> Option<String> {
    if let Some(ip) = advertise_ip {
        return Some(ip.to_string());
    }

    first_nonloopback_ipv4().map(|ip| ip.to_string())
}

/// First non-loopback IPv4 address on any interface.
fn first_nonloopback_ipv4() -> Option<Ipv4Addr> {
    let interfaces = local_ip_address::list_afinet_netifas().ok()?;
    interfaces.into_iter().find_map(|(_name, ip)| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
        IpAddr::V4(_) | IpAddr::V6(_) => None,
    })
}
