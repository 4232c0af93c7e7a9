use crate::error::SourceUnavailable;
use crate::system::Category;
use crate::system::platform;
use crate::system::source::CounterSource;

/// One logged-in session as recorded by the login database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: String,
    pub terminal: String,
    pub host: String,
}

impl Session {
    pub fn new(user: impl Into<String>, terminal: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            terminal: terminal.into(),
            host: host.into(),
        }
    }
}

/// A session listing capped at a maximum length.
///
/// Entries past the cap are counted in `discarded` and dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionList {
    pub entries: Vec<Session>,
    pub discarded: usize,
}

impl SessionList {
    pub fn bounded(sessions: impl IntoIterator<Item = Session>, max: usize) -> Self {
        let mut list = SessionList {
            entries: Vec::with_capacity(max.min(64)),
            discarded: 0,
        };
        for session in sessions {
            if list.entries.len() < max {
                list.entries.push(session);
            } else {
                list.discarded += 1;
            }
        }
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sessions read from the utmpx login records.
#[derive(Default)]
pub struct UtmpSessions;

impl CounterSource for UtmpSessions {
    type Sample = Vec<Session>;

    fn category(&self) -> Category {
        Category::Sessions
    }

    fn read(&mut self) -> Result<Vec<Session>, SourceUnavailable> {
        platform::login_sessions()
            .map_err(|e| SourceUnavailable::new(Category::Sessions, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions(n: usize) -> Vec<Session> {
        (0..n)
            .map(|i| Session::new(format!("user{i}"), format!("pts/{i}"), ""))
            .collect()
    }

    #[test]
    fn under_the_cap_keeps_everything() {
        let list = SessionList::bounded(sessions(3), 5);
        assert_eq!(list.len(), 3);
        assert_eq!(list.discarded, 0);
    }

    #[test]
    fn excess_entries_are_counted_not_stored() {
        let list = SessionList::bounded(sessions(7), 4);
        assert_eq!(list.len(), 4);
        assert_eq!(list.discarded, 3);
        assert_eq!(list.entries[3].user, "user3");
    }

    #[test]
    fn zero_cap_discards_all() {
        let list = SessionList::bounded(sessions(2), 0);
        assert!(list.is_empty());
        assert_eq!(list.discarded, 2);
    }

    #[test]
    fn utmp_source_never_fails_for_no_sessions() {
        let mut source = UtmpSessions;
        assert!(source.read().is_ok());
    }
}
