//! Server lifecycle: binding, readiness probing and shutdown.

use super::config::ServerConfig;
use super::service::RouterService;
use may::coroutine::JoinHandle;
use may_minihttp::HttpServer;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const READY_TIMEOUT: Duration = Duration::from_secs(1);
const READY_PROBE_INTERVAL: Duration = Duration::from_millis(5);

/// Start a router service with the given configuration.
///
/// Applies the coroutine stack size, resolves the configured bind address
/// and spawns the accept loop. The returned handle probes readiness and
/// stops the server.
///
/// # Errors
///
/// Fails when the configured address does not resolve or the port cannot be
/// bound.
pub fn serve(service: RouterService, config: &ServerConfig) -> io::Result<ServerHandle> {
    may::config().set_stack_size(config.stack_size);
    let addr = config
        .addr()
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address: {}", config.addr()),
            )
        })?;
    let handle = HttpServer(service).start(addr)?;
    info!(
        addr = %addr,
        stack_size = config.stack_size,
        "http server started"
    );
    Ok(ServerHandle { addr, handle })
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts connections, probing the bound
    /// address until the readiness deadline passes.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        loop {
            match TcpStream::connect(self.addr) {
                Ok(_) => {
                    debug!(addr = %self.addr, "listener ready");
                    return Ok(());
                }
                Err(probe_error) => {
                    if Instant::now() >= deadline {
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("server not ready on {}: {probe_error}", self.addr),
                        ));
                    }
                    thread::sleep(READY_PROBE_INTERVAL);
                }
            }
        }
    }

    /// Cancel the accept loop and wait for it to unwind.
    pub fn stop(self) {
        info!(addr = %self.addr, "stopping http server");
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Wait for the accept loop without stopping it.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}
