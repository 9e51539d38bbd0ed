/// Return the part of `name` after the last `/`, or all of it
pub fn basename(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b'/') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

/// How a list of names given by the user selects archive entries.
///
/// An empty list selects every entry regardless of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter {
    /// Compare the basename of the stored name with the basename of each
    /// pattern, the way ar(1) selects members for extraction
    Basename,
    /// The stored name must equal a pattern byte for byte
    Exact,
}

impl NameFilter {
    pub fn matches<P: AsRef<[u8]>>(self, name: &[u8], patterns: &[P]) -> bool {
        if patterns.is_empty() {
            return true;
        }
        patterns.iter().any(|pattern| self.matches_one(name, pattern.as_ref()))
    }

    pub fn matches_one(self, name: &[u8], pattern: &[u8]) -> bool {
        match self {
            NameFilter::Basename => basename(name) == basename(pattern),
            NameFilter::Exact => name == pattern,
        }
    }
}
