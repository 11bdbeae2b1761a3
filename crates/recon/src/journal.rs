//! Ordered, human-readable run log.
//!
//! Lines are kept for the caller (they are part of the run result) and
//! mirrored to the `log` facade so they also reach whatever logger the host
//! process installed.

#[derive(Debug, Clone, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{}", line.trim_start());
        self.lines.push(line);
    }

    pub fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::warn!("{}", line.trim_start());
        self.lines.push(line);
    }

    pub fn error(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::error!("{}", line.trim_start());
        self.lines.push(line);
    }

    /// A full-width `=` rule, used around section banners.
    pub fn rule(&mut self) {
        self.lines.push("=".repeat(50));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut log = RunLog::new();
        log.info("first");
        log.warn("   second");
        log.rule();
        log.error("third");
        assert_eq!(log.len(), 4);
        assert_eq!(log.lines()[1], "   second");
        assert_eq!(log.lines()[2].len(), 50);
        assert_eq!(log.into_lines().last().map(String::as_str), Some("third"));
    }
}
