use crate::system::sessions::Session;

/// Walks the login-record database and returns every `USER_PROCESS` entry.
///
/// The utmpx cursor is process-global state. Only the sessions worker calls
/// this, and it rewinds before and closes after every walk.
pub fn user_processes() -> Vec<Session> {
    let mut sessions = Vec::new();

    // SAFETY: `getutxent` returns either null or a pointer to a static record
    // that stays valid until the next call; the record is copied out before
    // advancing.
    unsafe {
        libc::setutxent();
        loop {
            let entry = libc::getutxent();
            if entry.is_null() {
                break;
            }
            let entry = &*entry;
            if entry.ut_type == libc::USER_PROCESS {
                sessions.push(Session::new(
                    c_field(&entry.ut_user),
                    c_field(&entry.ut_line),
                    c_field(&entry.ut_host),
                ));
            }
        }
        libc::endutxent();
    }

    sessions
}

/// Fixed-width record fields are NUL-padded but not always NUL-terminated.
fn c_field(field: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
