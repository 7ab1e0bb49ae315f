use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use tracing::warn;

/// Bind address for `host`, falling back to loopback for unparseable values.
pub fn bind_ip(host: &str) -> IpAddr {
    host.parse().unwrap_or_else(|_| {
        warn!("Invalid host '{}', binding to 127.0.0.1", host);
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    })
}

/// Check if a specific port can be bound on `ip`. Port 0 never counts.
pub fn is_port_available(ip: IpAddr, port: u16) -> bool {
    port != 0 && TcpListener::bind(SocketAddr::new(ip, port)).is_ok()
}

/// Find an available port in `start_port..=end_port`.
pub fn find_available_port(ip: IpAddr, start_port: u16, end_port: u16) -> Option<u16> {
    (start_port..=end_port).find(|&port| is_port_available(ip, port))
}

/// The preferred port, or the first free one in 8000-9999.
pub fn get_available_port_or_default(ip: IpAddr, preferred_port: u16) -> u16 {
    if is_port_available(ip, preferred_port) {
        return preferred_port;
    }

    warn!("Port {} is not available, searching for alternative...", preferred_port);

    if let Some(port) = find_available_port(ip, 8000, 9999) {
        warn!("Using alternative port: {}", port);
        return port;
    }

    // Will fail at bind time with a proper error
    warn!("No available ports found, returning preferred port {}", preferred_port);
    preferred_port
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_ip() {
        assert_eq!(bind_ip("0.0.0.0"), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(bind_ip("::1").to_string(), "::1");
        assert_eq!(bind_ip("not an ip"), LOCALHOST);
    }

    #[test]
    fn test_busy_port_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(!is_port_available(LOCALHOST, port));
        drop(listener);
    }

    #[test]
    fn test_port_zero_is_never_available() {
        assert!(!is_port_available(LOCALHOST, 0));
    }

    #[test]
    fn test_find_available_port_in_range() {
        let port = find_available_port(LOCALHOST, 60000, 60010).unwrap();
        assert!((60000..=60010).contains(&port));
    }

    #[test]
    fn test_find_available_port_empty_range() {
        assert!(find_available_port(LOCALHOST, 8080, 8070).is_none());
    }

    #[test]
    fn test_busy_preferred_port_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let busy_port = listener.local_addr().unwrap().port();

        let result = get_available_port_or_default(LOCALHOST, busy_port);
        assert_ne!(result, busy_port);
        assert!((8000..=9999).contains(&result));
        drop(listener);
    }
}
