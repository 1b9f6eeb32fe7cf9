//! counter.rs - Per-call bookkeeping of unclosed tags.

/// Tracks how many instances of each tag are currently open.
///
/// One counter exists per `sanitize` call. Tags are remembered in the order
/// they were first opened so the closers appended at the end of the document
/// come out in a stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenTagCounter {
    counts: Vec<(String, usize)>,
}

impl OpenTagCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more open instance of `name`.
    pub fn increment(&mut self, name: &str) {
        match self.counts.iter_mut().find(|(tag, _)| tag == name) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((name.to_string(), 1)),
        }
    }

    /// Closes one instance of `name`. Returns `false`, leaving the counter
    /// untouched, when nothing of that name is open.
    pub fn decrement(&mut self, name: &str) -> bool {
        match self.counts.iter_mut().find(|(tag, _)| tag == name) {
            Some((_, count)) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn count(&self, name: &str) -> usize {
        self.counts
            .iter()
            .find(|(tag, _)| tag == name)
            .map_or(0, |(_, count)| *count)
    }

    #[cfg(test)]
    pub fn is_balanced(&self) -> bool {
        self.counts.iter().all(|(_, count)| *count == 0)
    }

    /// Consumes the counter and yields every tag still open, with its count,
    /// in first-opened order.
    pub fn into_unclosed(self) -> impl Iterator<Item = (String, usize)> {
        self.counts.into_iter().filter(|(_, count)| *count > 0)
    }
}
