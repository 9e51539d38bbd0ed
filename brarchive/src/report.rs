use std::fmt;

use log::warn;

use crate::Error;

/// A problem that made an operation leave out one entry or file while
/// carrying on with the rest
#[derive(Debug)]
pub struct Warning {
    /// Name of the entry or file, when it could be read
    pub name: Option<String>,
    pub error: Error,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}, skipping: {}", self.error, name),
            None => write!(f, "{}, skipping", self.error),
        }
    }
}

/// Outcome of a successful operation
#[derive(Debug, Default)]
pub struct Report {
    /// Entries the operation acted on, in stored order: added, listed,
    /// extracted, printed or deleted
    pub entries: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl Report {
    pub(crate) fn done(&mut self, name: &[u8]) {
        self.entries.push(display_name(name));
    }

    /// Record and log an entry that was left out
    pub(crate) fn skip(&mut self, name: Option<&[u8]>, error: impl Into<Error>) {
        let warning = Warning {
            name: name.map(display_name),
            error: error.into(),
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Stored names are bytes; show them the way a terminal would
pub fn display_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}
