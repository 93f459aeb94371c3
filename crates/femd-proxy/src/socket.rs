//! Per-card UDP socket setup: non-blocking, large receive buffer, optional
//! bind-interface.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;

/// Requested `SO_RCVBUF` size. The kernel may clamp this; a shortfall is
/// logged, not fatal.
pub const RECV_BUFFER_SIZE: usize = 200 * 1024;

/// Default UDP port the remote firmware listens on.
pub const DEFAULT_PORT: u16 = 1122;

/// Default MTU-sized read buffer.
pub const MTU: usize = 1500;

pub fn open(bind_addr: SocketAddr, target: SocketAddr) -> std::io::Result<Socket> {
    let domain = if bind_addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_nonblocking(true)?;
    socket.bind(&bind_addr.into())?;
    socket.connect(&target.into()).or_else(|e| {
        // A connected UDP socket lets us use recv()/send() directly; some
        // platforms reject connect() on a non-blocking socket mid-flight,
        // so fall back to sendto/recvfrom semantics by leaving it unconnected.
        if e.kind() == std::io::ErrorKind::WouldBlock {
            Ok(())
        } else {
            Err(e)
        }
    })?;

    if let Err(e) = socket.set_recv_buffer_size(RECV_BUFFER_SIZE) {
        tracing::warn!(error = %e, requested = RECV_BUFFER_SIZE, "failed to set SO_RCVBUF");
    } else if let Ok(actual) = socket.recv_buffer_size() {
        if actual < RECV_BUFFER_SIZE {
            tracing::warn!(requested = RECV_BUFFER_SIZE, actual, "recv buffer smaller than requested; losses may occur");
        }
    }

    Ok(socket)
}

/// Compute the target address for card `index` as `base_ip + index` on
/// `port`.
pub fn target_for_card(base_ip: std::net::Ipv4Addr, index: u8, port: u16) -> SocketAddr {
    let octets = base_ip.octets();
    let last = octets[3].wrapping_add(index);
    let ip = std::net::Ipv4Addr::new(octets[0], octets[1], octets[2], last);
    SocketAddr::new(ip.into(), port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn target_for_card_adds_index_to_last_octet() {
        let base = Ipv4Addr::new(192, 168, 1, 10);
        let addr = target_for_card(base, 3, DEFAULT_PORT);
        assert_eq!(addr, SocketAddr::new(Ipv4Addr::new(192, 168, 1, 13).into(), DEFAULT_PORT));
    }

    #[test]
    fn target_for_card_wraps_on_octet_overflow() {
        let base = Ipv4Addr::new(192, 168, 1, 254);
        let addr = target_for_card(base, 3, DEFAULT_PORT);
        assert_eq!(addr, SocketAddr::new(Ipv4Addr::new(192, 168, 1, 1).into(), DEFAULT_PORT));
    }
}
