/// Classification of I/O errors raised while polling the terminal.
use std::io;

/// `true` when the terminal stream is gone (broken pipe, closed or bad
/// descriptor, low-level I/O error). The run loop treats these as a quit
/// request instead of an error to report.
pub fn is_terminal_stream_failure(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::BrokenPipe {
        return true;
    }
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        matches!(
            err.raw_os_error(),
            Some(code) if code == Errno::EPIPE as i32
                || code == Errno::EBADF as i32
                || code == Errno::EIO as i32
        )
    }
    #[cfg(not(unix))]
    {
        false
    }
}
