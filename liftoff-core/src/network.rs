//! Local network address discovery and the URLs advertised in the ready banner.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

/// Public address used only to select the outbound interface. No packet is sent.
pub const PROBE_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 80));

pub const FALLBACK_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// The machine's LAN address, or `127.0.0.1` when it cannot be determined.
pub fn local_ip() -> IpAddr {
    local_ip_via(PROBE_ADDRESS)
}

/// Same as [`local_ip`] with an explicit probe address.
///
/// Never fails: any socket error, or an unspecified local address, yields
/// [`FALLBACK_IP`].
pub fn local_ip_via(probe: SocketAddr) -> IpAddr {
    match probe_local_ip(probe) {
        Ok(ip) if !ip.is_unspecified() => ip,
        _ => FALLBACK_IP,
    }
}

fn probe_local_ip(probe: SocketAddr) -> io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(probe)?;
    Ok(socket.local_addr()?.ip())
}

/// Local and network URLs for a server listening on all interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrls {
    pub local: String,
    pub network: String,
}

impl ServerUrls {
    pub fn new(port: u16, network_ip: IpAddr) -> Self {
        let host = match network_ip {
            IpAddr::V4(ip) => ip.to_string(),
            IpAddr::V6(ip) => format!("[{ip}]"),
        };
        Self {
            local: format!("http://localhost:{port}"),
            network: format!("http://{host}:{port}"),
        }
    }
}

impl fmt::Display for ServerUrls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.local, self.network)
    }
}
