use crate::format::{pad_to_width, truncate_to_width};
use crate::system::sessions::{Session, SessionList};

pub const TITLE: &str = "### Sessions/users ###";

const USER_COLUMN: usize = 12;
const HOST_WIDTH: usize = 40;

pub fn session_line(session: &Session) -> String {
    let user = pad_to_width(&session.user, USER_COLUMN);
    if session.host.is_empty() {
        format!("{user} {}", session.terminal)
    } else {
        let host = truncate_to_width(&session.host, HOST_WIDTH);
        format!("{user} {} ({host})", session.terminal)
    }
}

pub fn session_lines(list: &SessionList) -> Vec<String> {
    list.entries.iter().map(session_line).collect()
}

pub fn discarded_line(discarded: usize) -> Option<String> {
    match discarded {
        0 => None,
        1 => Some("... 1 more session not shown".to_owned()),
        n => Some(format!("... {n} more sessions not shown")),
    }
}
