//! Thin wrapper over `libc::select` for the receive loop's readiness check.

use std::os::unix::io::RawFd;
use std::time::Duration;

/// Build an `fd_set` from `fds` and block until one is readable or
/// `timeout` elapses. Returns the subset of `fds` that are ready.
pub fn select_readable(fds: &[RawFd], timeout: Duration) -> std::io::Result<Vec<RawFd>> {
    if fds.is_empty() {
        std::thread::sleep(timeout);
        return Ok(Vec::new());
    }

    // SAFETY: `fd_set` is a plain C struct; zeroing it is the documented way
    // to initialise one before FD_SET/FD_ZERO.
    let mut read_set: libc::fd_set = unsafe { std::mem::zeroed() };
    unsafe { libc::FD_ZERO(&mut read_set) };
    let mut max_fd = 0;
    for &fd in fds {
        unsafe { libc::FD_SET(fd, &mut read_set) };
        max_fd = max_fd.max(fd);
    }

    let mut tv = libc::timeval { tv_sec: timeout.as_secs() as libc::time_t, tv_usec: timeout.subsec_micros() as libc::suseconds_t };

    // SAFETY: `read_set` was just initialised above and `max_fd + 1` matches
    // the fds inserted into it; `tv` outlives the call.
    let ready = unsafe { libc::select(max_fd + 1, &mut read_set, std::ptr::null_mut(), std::ptr::null_mut(), &mut tv) };
    if ready < 0 {
        return Err(std::io::Error::last_os_error());
    }

    let mut out = Vec::with_capacity(ready as usize);
    for &fd in fds {
        // SAFETY: `read_set` was populated by `select` above and `fd` was one
        // of the descriptors inserted into it.
        if unsafe { libc::FD_ISSET(fd, &read_set) } {
            out.push(fd);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn select_reports_socket_with_pending_datagram() {
        let a = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let b = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        a.connect(b.local_addr().unwrap()).unwrap();
        a.send(b"hi").unwrap();

        let fds = [a.as_raw_fd(), b.as_raw_fd()];
        let ready = select_readable(&fds, Duration::from_millis(500)).unwrap();
        assert_eq!(ready, vec![b.as_raw_fd()]);
    }

    #[test]
    fn select_times_out_with_no_ready_fds() {
        let a = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let fds = [a.as_raw_fd()];
        let ready = select_readable(&fds, Duration::from_millis(50)).unwrap();
        assert!(ready.is_empty());
    }
}
