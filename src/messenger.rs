//! Local socket endpoint that delivers one message per connection.
//!
//! [`InputMessenger`] listens on a filesystem-path Unix stream socket. Each
//! client connects, writes its message and closes; the messenger reads
//! until end-of-stream and hands the whole text to its handler, once.
//! Nothing is sent back.
//!
//! # Protocol
//!
//! ```text
//! client                       messenger
//!   connect ─────────────────▶ accept
//!   write bytes ─────────────▶ read, append
//!   close ───────────────────▶ EOF → handler(text)
//!                              check stop flag, accept next
//! ```
//!
//! Clients are served strictly one at a time; up to [`LISTEN_BACKLOG`]
//! others wait in the kernel backlog. Accept and read block without a
//! timeout.
//!
//! # Errors
//!
//! Failures are kept as state instead of being returned:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | empty address, socket creation, bind, listen | `error_id() != 0`, [`run_loop`](InputMessenger::run_loop) does nothing |
//! | accept | recorded, run loop exits |
//! | read | recorded, that message is dropped, loop continues |
//!
//! # Example
//!
//! ```rust,no_run
//! use pinbox::InputMessenger;
//!
//! let mut messenger = InputMessenger::new("/tmp/pinbox.socket", |text: &str| {
//!     println!("received: {}", text);
//! });
//! if messenger.error_id() == 0 {
//!     messenger.run_loop();
//! }
//! ```

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Read};
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use socket2::{Domain, SockAddr, Socket, Type};

use crate::error::MessengerError;

/// Size of `sun_path` in `sockaddr_un` on Linux.
pub const SUN_PATH_LEN: usize = 108;

/// Longest usable socket path in bytes. A path filling all of `sun_path`
/// is bound without a terminating NUL.
pub const MAX_SOCKET_PATH: usize = SUN_PATH_LEN;

/// Pending connections the kernel queues while one is being served.
pub const LISTEN_BACKLOG: i32 = 4;

/// Default read chunk size.
pub const DEFAULT_BUFFER_SIZE: usize = 255;

/// Kernel table of Unix sockets in this network namespace.
const PROC_NET_UNIX: &str = "/proc/net/unix";

/// `__SO_ACCEPTCON` in the flags column of [`PROC_NET_UNIX`].
const SO_ACCEPTCON: u32 = 0x0001_0000;

/// Cooperative stop request for a running [`InputMessenger`].
///
/// Clones share one flag. The flag is checked after each connection has
/// been handled, so it never interrupts a blocked accept or read.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// A new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the flag.
    pub fn set(&self, flag: bool) {
        self.0.store(flag, Ordering::SeqCst);
    }

    /// Shorthand for `set(true)`.
    pub fn request_stop(&self) {
        self.set(true);
    }

    /// True if a stop has been requested.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Socket path actually used for `addr`.
///
/// Stops at the first NUL and keeps at most [`MAX_SOCKET_PATH`] bytes.
/// Longer paths are cut without warning.
///
/// ```
/// use pinbox::messenger::{socket_path, MAX_SOCKET_PATH};
///
/// assert_eq!(socket_path("/tmp/a.socket").to_str(), Some("/tmp/a.socket"));
/// let long = format!("/tmp/{}", "x".repeat(200));
/// assert_eq!(socket_path(&long).as_os_str().len(), MAX_SOCKET_PATH);
/// ```
pub fn socket_path(addr: &str) -> PathBuf {
    let bytes = addr.as_bytes();
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(bytes.len())
        .min(MAX_SOCKET_PATH);
    PathBuf::from(OsStr::from_bytes(&bytes[..end]))
}

/// `AF_UNIX` address for `path`, NUL-padded to the full `sun_path`.
///
/// Unlike `std` and `SockAddr::unix`, this accepts a path of exactly
/// [`SUN_PATH_LEN`] bytes, which the kernel reads without a terminator.
/// Clients use it to reach such a path.
pub fn socket_addr(path: &Path) -> io::Result<SockAddr> {
    let bytes = path.as_os_str().as_bytes();
    if bytes.len() > SUN_PATH_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "socket path longer than sun_path",
        ));
    }

    // SAFETY: `try_init` hands out zeroed storage sized for any socket
    // address, so it holds a `sockaddr_un`, and `bytes` fits `sun_path`.
    let ((), addr) = unsafe {
        SockAddr::try_init(|storage, len| {
            let sun = &mut *storage.cast::<libc::sockaddr_un>();
            sun.sun_family = libc::AF_UNIX as libc::sa_family_t;
            for (dst, &src) in sun.sun_path.iter_mut().zip(bytes) {
                *dst = src as libc::c_char;
            }
            *len = mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;
            Ok(())
        })?
    };
    Ok(addr)
}

/// Single-client local socket listener.
///
/// Owns the listening socket and its path entry: dropping the messenger
/// closes the socket and removes the path.
///
/// # Type Parameter
///
/// - `H`: message handler, called with the full text of each connection
pub struct InputMessenger<H: FnMut(&str)> {
    listener: Option<UnixListener>,
    path: PathBuf,
    owns_path: bool,
    error_id: i32,
    last_error: Option<MessengerError>,
    stop: StopHandle,
    buffer_size: usize,
    handler: H,
}

impl<H: FnMut(&str)> InputMessenger<H> {
    /// Create the socket, bind it to `addr` and listen with a backlog of
    /// [`LISTEN_BACKLOG`].
    ///
    /// A leftover entry at the path from an unclean shutdown is removed
    /// first. A path that some live listener is bound to is left alone, so
    /// binding it fails. Liveness is read from `/proc/net/unix`; where that
    /// table is unavailable a connect is tried instead, and a live listener
    /// then receives that connection as an empty message.
    ///
    /// Check [`error_id`](Self::error_id) before calling
    /// [`run_loop`](Self::run_loop).
    pub fn new(addr: &str, handler: H) -> Self {
        let mut messenger = Self {
            listener: None,
            path: socket_path(addr),
            owns_path: false,
            error_id: 0,
            last_error: None,
            stop: StopHandle::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            handler,
        };

        if messenger.path.as_os_str().is_empty() {
            error!("cannot listen on an empty socket address");
            messenger.record(MessengerError::EmptyAddress);
            return messenger;
        }

        remove_stale_socket(&messenger.path);

        match messenger.listen() {
            Ok(listener) => {
                info!("listening on {}", messenger.path.display());
                messenger.listener = Some(listener);
            }
            Err(err) => {
                error!("{}", err);
                messenger.record(err);
            }
        }

        messenger
    }

    fn listen(&mut self) -> Result<UnixListener, MessengerError> {
        let socket =
            Socket::new(Domain::UNIX, Type::STREAM, None).map_err(MessengerError::Socket)?;

        let bind_err = |source| MessengerError::Bind {
            path: self.path.clone(),
            source,
        };
        let addr = socket_addr(&self.path).map_err(bind_err)?;
        socket.bind(&addr).map_err(bind_err)?;
        self.owns_path = true;

        socket
            .listen(LISTEN_BACKLOG)
            .map_err(|source| MessengerError::Listen {
                path: self.path.clone(),
                source,
            })?;

        Ok(socket.into())
    }

    /// Use `stop` as this messenger's stop flag.
    ///
    /// Lets the handler, built before the messenger exists, hold a clone.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Read connections in chunks of `size` bytes (at least 1).
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Serve connections until the stop flag is set or accept fails.
    ///
    /// Blocks the calling thread. Returns immediately if the messenger is
    /// not listening.
    pub fn run_loop(&mut self) {
        let Some(listener) = self.listener.take() else {
            error!("run_loop on a messenger that is not listening");
            return;
        };
        self.serve_all(listener.incoming());
        self.listener = Some(listener);
    }

    /// Serve each accepted connection in turn. An accept failure is
    /// recorded and ends the loop.
    fn serve_all<R, I>(&mut self, connections: I)
    where
        R: Read,
        I: IntoIterator<Item = io::Result<R>>,
    {
        for accepted in connections {
            match accepted {
                Ok(conn) => self.serve(conn),
                Err(e) => {
                    let err = MessengerError::Accept(e);
                    error!("{}", err);
                    self.record(err);
                    break;
                }
            }

            if self.stop.is_set() {
                debug!("stop requested, leaving run loop");
                break;
            }
        }
    }

    /// Read one connection to the end and hand its text to the handler.
    /// A read failure is recorded and the message dropped.
    fn serve<R: Read>(&mut self, mut conn: R) {
        match drain(&mut conn, self.buffer_size) {
            Ok(bytes) => {
                drop(conn);
                let text = String::from_utf8_lossy(&bytes);
                debug!("received {} bytes", bytes.len());
                (self.handler)(&*text);
            }
            Err(e) => {
                let err = MessengerError::Read(e);
                warn!("dropping message: {}", err);
                self.record(err);
            }
        }
    }

    /// Set or clear the stop flag. Takes effect after the connection being
    /// handled, if any.
    pub fn set_stop_flag(&self, flag: bool) {
        self.stop.set(flag);
    }

    /// A handle sharing this messenger's stop flag.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Last recorded failure code, 0 if none.
    pub fn error_id(&self) -> i32 {
        self.error_id
    }

    /// Last recorded failure.
    pub fn last_error(&self) -> Option<&MessengerError> {
        self.last_error.as_ref()
    }

    /// True if the socket is bound and listening.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Socket path, after truncation.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&mut self, err: MessengerError) {
        self.error_id = err.code();
        self.last_error = Some(err);
    }
}

impl<H: FnMut(&str)> Drop for InputMessenger<H> {
    fn drop(&mut self) {
        drop(self.listener.take());
        if self.owns_path {
            if let Err(e) = fs::remove_file(&self.path) {
                debug!("could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Remove whatever sits at `path` unless a live listener is bound to it.
fn remove_stale_socket(path: &Path) {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    if meta.file_type().is_socket() && is_live_listener(path) {
        debug!("{} is in use, leaving it in place", path.display());
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => debug!("removed stale {}", path.display()),
        Err(e) => debug!("could not remove stale {}: {}", path.display(), e),
    }
}

fn is_live_listener(path: &Path) -> bool {
    match fs::read(PROC_NET_UNIX) {
        Ok(table) => listening_in_table(&table, path.as_os_str().as_bytes()),
        Err(e) => {
            debug!("{} unreadable ({}), probing with connect", PROC_NET_UNIX, e);
            UnixStream::connect(path).is_ok()
        }
    }
}

/// True if the `/proc/net/unix` dump `table` has a listening socket bound
/// to `path`.
///
/// Each row is `Num RefCount Protocol Flags Type St Inode [Path]`, the
/// columns separated by runs of spaces and the path running to the end of
/// the line.
fn listening_in_table(table: &[u8], path: &[u8]) -> bool {
    table.split(|&b| b == b'\n').skip(1).any(|row| {
        let mut rest = row;
        let mut flags = None;
        for column in 0..7 {
            let start = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
            rest = &rest[start..];
            let end = rest.iter().position(|&b| b == b' ').unwrap_or(rest.len());
            if column == 3 {
                flags = std::str::from_utf8(&rest[..end])
                    .ok()
                    .and_then(|f| u32::from_str_radix(f, 16).ok());
            }
            rest = &rest[end..];
        }
        let bound = rest.strip_prefix(b" ").unwrap_or(rest);
        let listening = flags.is_some_and(|f| f & SO_ACCEPTCON != 0);
        listening && bound == path
    })
}

/// Read until end-of-stream in chunks of `buffer_size` bytes.
fn drain<R: Read>(stream: &mut R, buffer_size: usize) -> io::Result<Vec<u8>> {
    let mut chunk = vec![0u8; buffer_size];
    let mut message = Vec::new();
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(message),
            Ok(n) => message.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_keeps_short_paths() {
        assert_eq!(socket_path("/tmp/pbOffApp.socket"), PathBuf::from("/tmp/pbOffApp.socket"));
    }

    #[test]
    fn socket_path_truncates() {
        let addr = format!("/tmp/{}", "a".repeat(150));
        let path = socket_path(&addr);
        assert_eq!(path.as_os_str().len(), MAX_SOCKET_PATH);
        assert!(addr.starts_with(path.to_str().unwrap()));
    }

    #[test]
    fn socket_path_exactly_at_limit() {
        let addr = format!("/{}", "b".repeat(MAX_SOCKET_PATH - 1));
        assert_eq!(socket_path(&addr).as_os_str().len(), MAX_SOCKET_PATH);
    }

    #[test]
    fn socket_path_stops_at_nul() {
        assert_eq!(socket_path("/tmp/a\0ignored"), PathBuf::from("/tmp/a"));
        assert!(socket_path("\0abc").as_os_str().is_empty());
    }

    #[test]
    fn drain_reads_across_chunks() {
        let data = b"hello world, this spans chunks".to_vec();
        let mut reader = io::Cursor::new(data.clone());
        assert_eq!(drain(&mut reader, 4).unwrap(), data);
    }

    #[test]
    fn drain_empty_stream() {
        let mut reader = io::Cursor::new(Vec::new());
        assert!(drain(&mut reader, 16).unwrap().is_empty());
    }

    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                Err(io::Error::from_raw_os_error(104))
            } else {
                self.sent = true;
                buf[0] = b'x';
                Ok(1)
            }
        }
    }

    #[test]
    fn drain_discards_partial_on_error() {
        let mut reader = FailingReader { sent: false };
        let err = drain(&mut reader, 8).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(104));
    }

    // =========================================================================
    // Connection handling
    // =========================================================================

    type Received = std::rc::Rc<std::cell::RefCell<Vec<String>>>;

    fn recording(tag: &str) -> (InputMessenger<impl FnMut(&str)>, Received) {
        let path =
            std::env::temp_dir().join(format!("pinbox-unit-{}-{}.socket", std::process::id(), tag));
        let received = Received::default();
        let sink = received.clone();
        let messenger = InputMessenger::new(path.to_str().unwrap(), move |text: &str| {
            sink.borrow_mut().push(text.to_string());
        });
        (messenger, received)
    }

    fn good(text: &str) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(io::Cursor::new(text.as_bytes().to_vec())))
    }

    fn failing() -> io::Result<Box<dyn Read>> {
        Ok(Box::new(FailingReader { sent: false }))
    }

    #[test]
    fn read_failure_skips_handler_and_loop_continues() {
        let (mut messenger, received) = recording("read-fail");
        assert_eq!(messenger.error_id(), 0);

        let connections: Vec<io::Result<Box<dyn Read>>> = vec![
            failing(),
            good("after"),
        ];
        messenger.serve_all(connections);

        assert_eq!(*received.borrow(), vec!["after".to_string()]);
        assert_eq!(messenger.error_id(), 104);
        assert!(matches!(messenger.last_error(), Some(MessengerError::Read(_))));
    }

    #[test]
    fn accept_failure_ends_loop() {
        let (mut messenger, received) = recording("accept-fail");

        let connections: Vec<io::Result<Box<dyn Read>>> = vec![
            good("first"),
            Err(io::Error::from_raw_os_error(24)),
            good("never"),
        ];
        messenger.serve_all(connections);

        assert_eq!(*received.borrow(), vec!["first".to_string()]);
        assert_eq!(messenger.error_id(), 24);
        assert!(matches!(messenger.last_error(), Some(MessengerError::Accept(_))));
    }

    #[test]
    fn stop_flag_checked_after_each_connection() {
        let (mut messenger, received) = recording("stop-unit");
        messenger.set_stop_flag(true);

        let connections: Vec<io::Result<Box<dyn Read>>> = vec![good("one"), good("two")];
        messenger.serve_all(connections);

        assert_eq!(*received.borrow(), vec!["one".to_string()]);
        assert_eq!(messenger.error_id(), 0);
    }

    // =========================================================================
    // Listener table
    // =========================================================================

    const TABLE: &[u8] = b"Num       RefCount Protocol Flags    Type St Inode Path\n\
0000000000000000: 00000002 00000000 00010000 0001 01 20731 /run/live.socket\n\
0000000000000000: 00000002 00000000 00000000 0001 03 20732 /run/connected.socket\n\
0000000000000000: 00000003 00000000 00000000 0001 03  8421\n\
0000000000000000: 00000002 00000000 00010000 0001 01 20733 /tmp/with space.socket\n";

    #[test]
    fn table_finds_listening_path() {
        assert!(listening_in_table(TABLE, b"/run/live.socket"));
        assert!(listening_in_table(TABLE, b"/tmp/with space.socket"));
    }

    #[test]
    fn table_ignores_non_listening_and_absent_paths() {
        assert!(!listening_in_table(TABLE, b"/run/connected.socket"));
        assert!(!listening_in_table(TABLE, b"/run/missing.socket"));
        assert!(!listening_in_table(TABLE, b"/run/live"));
        assert!(!listening_in_table(b"", b"/run/live.socket"));
    }

    #[test]
    fn socket_addr_accepts_full_sun_path() {
        let path = PathBuf::from(format!("/{}", "c".repeat(SUN_PATH_LEN - 1)));
        assert!(socket_addr(&path).is_ok());
        let too_long = PathBuf::from(format!("/{}", "c".repeat(SUN_PATH_LEN)));
        assert_eq!(
            socket_addr(&too_long).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn stop_handle_clones_share_flag() {
        let a = StopHandle::new();
        let b = a.clone();
        assert!(!b.is_set());
        a.request_stop();
        assert!(b.is_set());
        b.set(false);
        assert!(!a.is_set());
    }

    #[test]
    fn empty_address_records_einval() {
        let mut calls = 0;
        let mut messenger = InputMessenger::new("", |_: &str| calls += 1);
        assert_eq!(messenger.error_id(), crate::error::EINVAL);
        assert!(matches!(messenger.last_error(), Some(MessengerError::EmptyAddress)));
        assert!(!messenger.is_listening());
        messenger.run_loop();
        drop(messenger);
        assert_eq!(calls, 0);
    }
}
