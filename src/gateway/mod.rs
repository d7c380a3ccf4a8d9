//! TCP operator gateway.
//!
//! Accepts operator sessions on the configured port, caps how many run at
//! once, and feeds each received text chunk to the dispatcher's command
//! parser. The gateway owns the session sockets; everything else holds the
//! sessions only weakly.

use crate::error::Result;
use crate::station::{GroundStation, Operator};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Largest command chunk read from a session in one go.
const MAX_COMMAND_SIZE: usize = 8 * 1024;

/// One connected operator.
///
/// Writes go through a mutex so concurrent deliveries from the dispatcher
/// and the command path do not interleave. After a write fails the session
/// is marked inactive and further deliveries are dropped.
pub struct ClientSession {
    id: u64,
    peer: SocketAddr,
    stream: Mutex<TcpStream>,
    active: AtomicBool,
}

impl ClientSession {
    fn new(id: u64, peer: SocketAddr, stream: TcpStream) -> ClientSession {
        ClientSession {
            id,
            peer,
            stream: Mutex::new(stream),
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Operator for ClientSession {
    fn send_text(&self, text: &str) {
        if !self.active.load(Ordering::Relaxed) {
            return;
        }

        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = stream.write_all(text.as_bytes()) {
            log::error!("Write error for client {}: {}", self.id, e);
            self.active.store(false, Ordering::Relaxed);
        }
    }
}

/// TCP acceptor plus the set of live sessions.
pub struct Gateway {
    local_addr: SocketAddr,
}

impl Gateway {
    /// Bind `bind_address` and spawn the accept loop.
    pub fn start(
        bind_address: &str,
        max_clients: usize,
        station: Arc<GroundStation>,
        running: Arc<AtomicBool>,
    ) -> Result<Gateway> {
        let listener = TcpListener::bind(bind_address)?;
        let local_addr = listener.local_addr()?;
        // Non-blocking accept so the loop can notice shutdown.
        listener.set_nonblocking(true)?;

        log::info!("Operator gateway listening on {}", local_addr);

        let sessions: Arc<Mutex<HashMap<u64, Arc<ClientSession>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        thread::Builder::new()
            .name("gateway-accept".to_string())
            .spawn(move || {
                accept_loop(listener, max_clients, station, sessions, running);
            })?;

        Ok(Gateway { local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

fn accept_loop(
    listener: TcpListener,
    max_clients: usize,
    station: Arc<GroundStation>,
    sessions: Arc<Mutex<HashMap<u64, Arc<ClientSession>>>>,
    running: Arc<AtomicBool>,
) {
    let next_id = AtomicU64::new(1);

    while running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let count = sessions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len();
                if count >= max_clients {
                    log::warn!("Connection rejected: maximum connections reached");
                    drop(stream);
                    continue;
                }

                let id = next_id.fetch_add(1, Ordering::Relaxed);
                match spawn_session(stream, peer, id, &station, &sessions, &running) {
                    Ok(()) => log::info!("New client connected: {} (ID: {})", peer, id),
                    Err(e) => log::error!("Error starting client session: {}", e),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                log::error!("Accept error: {}", e);
            }
        }
    }

    log::info!("Gateway accept loop exiting");
}

fn spawn_session(
    stream: TcpStream,
    peer: SocketAddr,
    id: u64,
    station: &Arc<GroundStation>,
    sessions: &Arc<Mutex<HashMap<u64, Arc<ClientSession>>>>,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    // Separate handles: the session thread reads its own clone while
    // deliveries write through the session's mutex-guarded stream.
    let read_stream = stream.try_clone()?;
    read_stream.set_read_timeout(Some(Duration::from_millis(500)))?;

    let session = Arc::new(ClientSession::new(id, peer, stream));
    sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id, Arc::clone(&session));

    let station = Arc::clone(station);
    let sessions = Arc::clone(sessions);
    let running = Arc::clone(running);

    thread::Builder::new()
        .name(format!("client-{}", id))
        .spawn(move || {
            session_loop(read_stream, &session, &station, &running);
            session.active.store(false, Ordering::Relaxed);
            sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            log::info!("Client disconnected: {} (ID: {})", session.peer, id);
        })?;

    Ok(())
}

fn session_loop(
    mut stream: TcpStream,
    session: &Arc<ClientSession>,
    station: &Arc<GroundStation>,
    running: &Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; MAX_COMMAND_SIZE];

    while running.load(Ordering::Relaxed) && session.active.load(Ordering::Relaxed) {
        match stream.read(&mut buf) {
            Ok(0) => {
                log::info!("Client {} closed connection", session.id);
                return;
            }
            Ok(n) => {
                let message = String::from_utf8_lossy(&buf[..n]).into_owned();
                let op: Arc<dyn Operator> = session.clone();
                station.handle_command(&message, &op);
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                log::error!("Read error for client {}: {}", session.id, e);
                return;
            }
        }
    }
}
