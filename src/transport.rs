//! CAN bus access.
//!
//! The integration loop only sees [`InboundFrame`]s coming out of a
//! [`FrameSource`]. On Linux the source is a raw SocketCAN socket bound to
//! one interface with the command/status acceptance filter installed.

use crate::error::TransportError;
use crate::protocol::{InboundFrame, CAN_EFF_FLAG, CAN_ERR_FLAG, CAN_MAX_DLEN, CAN_RTR_FLAG};
use crate::simulator::Input;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Size of a classic `struct can_frame`.
pub const CAN_MTU: usize = 16;
const DLC_OFFSET: usize = 4;
const DATA_OFFSET: usize = 8;

/// A stream of already filtered bus frames.
pub trait FrameSource: Send + 'static {
    /// Wait for the next frame. An error ends the stream.
    fn recv(&mut self) -> impl Future<Output = Result<InboundFrame, TransportError>> + Send;
}

/// Parse a raw `struct can_frame` as read from the socket.
///
/// Remote requests, error frames and standard-id frames carry no command and
/// yield `None`, as does a truncated read.
pub fn parse_raw_frame(raw: &[u8]) -> Option<InboundFrame> {
    if raw.len() < DATA_OFFSET {
        return None;
    }
    let can_id = u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
    if can_id & (CAN_RTR_FLAG | CAN_ERR_FLAG) != 0 || can_id & CAN_EFF_FLAG == 0 {
        return None;
    }
    let dlc = usize::from(raw[DLC_OFFSET]).min(CAN_MAX_DLEN);
    let end = (DATA_OFFSET + dlc).min(raw.len());
    Some(InboundFrame::new(can_id, &raw[DATA_OFFSET..end]))
}

/// Forward frames from `source` to the integration task until the source
/// fails or the loop goes away.
pub fn spawn_bus_reader<S: FrameSource>(mut source: S, inputs: mpsc::Sender<Input>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match source.recv().await {
                Ok(frame) => {
                    if inputs.send(Input::Frame(frame)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("bus reader stopped: {}", e);
                    break;
                }
            }
        }
        warn!("no more bus frames, keeping last rudder command");
    })
}

#[cfg(target_os = "linux")]
pub use socket::CanSocket;

#[cfg(target_os = "linux")]
mod socket {
    use super::{parse_raw_frame, FrameSource, CAN_MTU};
    use crate::error::TransportError;
    use crate::protocol::{CanFilter, InboundFrame};
    use std::ffi::CString;
    use std::future::Future;
    use std::io;
    use std::mem;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use tokio::io::unix::AsyncFd;
    use tracing::{info, trace};

    /// Raw SocketCAN socket with one acceptance filter.
    #[derive(Debug)]
    pub struct CanSocket {
        fd: AsyncFd<OwnedFd>,
    }

    impl CanSocket {
        /// Open, bind and filter. Must be called inside a tokio runtime.
        pub fn open(interface: &str, filter: CanFilter) -> Result<Self, TransportError> {
            // SAFETY: plain socket(2) call, the result is checked below.
            let raw = unsafe {
                libc::socket(
                    libc::PF_CAN,
                    libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                    libc::CAN_RAW,
                )
            };
            if raw < 0 {
                return Err(TransportError::Socket(io::Error::last_os_error()));
            }
            // SAFETY: `raw` is a freshly opened descriptor nobody else owns.
            let fd = unsafe { OwnedFd::from_raw_fd(raw) };

            let name = CString::new(interface)
                .map_err(|_| TransportError::InterfaceName(interface.to_string()))?;
            // SAFETY: `name` is a valid NUL terminated string.
            let ifindex = unsafe { libc::if_nametoindex(name.as_ptr()) };
            if ifindex == 0 {
                return Err(TransportError::UnknownInterface {
                    interface: interface.to_string(),
                    source: io::Error::last_os_error(),
                });
            }

            // SAFETY: sockaddr_can is plain old data, all zeroes is valid.
            let mut addr: libc::sockaddr_can = unsafe { mem::zeroed() };
            addr.can_family = libc::AF_CAN as libc::sa_family_t;
            addr.can_ifindex = ifindex as libc::c_int;
            // SAFETY: `addr` outlives the call and the length matches its type.
            let rc = unsafe {
                libc::bind(
                    fd.as_raw_fd(),
                    (&addr as *const libc::sockaddr_can).cast::<libc::sockaddr>(),
                    mem::size_of::<libc::sockaddr_can>() as libc::socklen_t,
                )
            };
            if rc < 0 {
                return Err(TransportError::Bind {
                    interface: interface.to_string(),
                    source: io::Error::last_os_error(),
                });
            }

            let raw_filter = libc::can_filter {
                can_id: filter.id,
                can_mask: filter.mask,
            };
            // SAFETY: `raw_filter` outlives the call and the length matches.
            let rc = unsafe {
                libc::setsockopt(
                    fd.as_raw_fd(),
                    libc::SOL_CAN_RAW,
                    libc::CAN_RAW_FILTER,
                    (&raw_filter as *const libc::can_filter).cast::<libc::c_void>(),
                    mem::size_of::<libc::can_filter>() as libc::socklen_t,
                )
            };
            if rc < 0 {
                return Err(TransportError::Filter(io::Error::last_os_error()));
            }

            // SAFETY: `fd` is an open socket owned by the OwnedFd, which the
            // AsyncFd holds until it is dropped.
            let fd = unsafe { AsyncFd::register(fd) }
                .map_err(|e| TransportError::Register(e.into()))?;
            info!(
                "listening on {} (id {:#010x} mask {:#010x})",
                interface, filter.id, filter.mask
            );
            Ok(Self { fd })
        }

        async fn read_frame(&mut self) -> Result<InboundFrame, TransportError> {
            loop {
                let mut guard = self.fd.readable().await.map_err(TransportError::Read)?;
                let mut buf = [0u8; CAN_MTU];
                let result = guard.try_io(|inner| {
                    // SAFETY: `buf` is valid for `buf.len()` bytes of writes.
                    let n = unsafe {
                        libc::read(inner.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len())
                    };
                    if n < 0 {
                        Err(io::Error::last_os_error())
                    } else {
                        Ok(n as usize)
                    }
                });
                match result {
                    Ok(Ok(n)) => match parse_raw_frame(&buf[..n]) {
                        Some(frame) => return Ok(frame),
                        None => trace!("skipping {} byte non-command frame", n),
                    },
                    Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Ok(Err(e)) => return Err(TransportError::Read(e)),
                    // Spurious readiness, wait again.
                    Err(_would_block) => continue,
                }
            }
        }
    }

    impl FrameSource for CanSocket {
        fn recv(&mut self) -> impl Future<Output = Result<InboundFrame, TransportError>> + Send {
            self.read_frame()
        }
    }
}
