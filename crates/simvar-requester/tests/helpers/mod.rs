//! Loopback UDP servers standing in for the SimVar bridge.

#![allow(dead_code, reason = "each test binary uses a subset of these helpers")]

use msfs_simvar_requester::Endpoint;
use std::io;
use std::net::{Ipv4Addr, UdpSocket};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Datagram observed by a [`ReplyServer`].
#[derive(Debug, Clone)]
pub struct ObservedRequest {
    pub payload: Vec<u8>,
}

/// Loopback server that answers every request with a fixed reply until
/// `max_requests` have been served or it sits idle for five seconds.
pub struct ReplyServer {
    pub endpoint: Endpoint,
    requests: mpsc::Receiver<ObservedRequest>,
    handle: thread::JoinHandle<()>,
}

impl ReplyServer {
    pub fn spawn(reply: Vec<u8>, max_requests: usize) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?;
        socket.set_read_timeout(Some(Duration::from_secs(5)))?;
        let port = socket.local_addr()?.port();
        let (tx, requests) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 2048];
            for _ in 0..max_requests {
                let Ok((len, peer)) = socket.recv_from(&mut buf) else {
                    break;
                };
                let payload = buf.get(..len).unwrap_or_default().to_vec();
                let _observed = tx.send(ObservedRequest { payload });
                let _sent = socket.send_to(&reply, peer);
            }
        });

        Ok(Self {
            endpoint: Endpoint::new(Ipv4Addr::LOCALHOST, port),
            requests,
            handle,
        })
    }

    /// Wait for the requests served so far, then stop the server.
    pub fn finish(self) -> Vec<ObservedRequest> {
        let _joined = self.handle.join();
        self.requests.try_iter().collect()
    }
}

/// A bound loopback socket that never answers. Keep it alive for the duration
/// of the test so nothing else grabs the port.
pub fn silent_server() -> io::Result<(UdpSocket, Endpoint)> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = socket.local_addr()?.port();
    Ok((socket, Endpoint::new(Ipv4Addr::LOCALHOST, port)))
}

/// A loopback port with nothing bound to it.
pub fn unused_endpoint() -> io::Result<Endpoint> {
    let (socket, endpoint) = silent_server()?;
    drop(socket);
    Ok(endpoint)
}
