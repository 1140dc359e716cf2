//! Output mode routing.

/// How results are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Machine-readable JSON only
    Json,
    /// Plain `key=value` text, stable for scripts
    #[default]
    Plain,
    /// Colors and tables (TTY only)
    Pretty,
}

impl OutputMode {
    /// `--json` wins, then `--format plain` and `TERM=dumb` force plain;
    /// otherwise pretty on a TTY and plain elsewhere.
    pub fn resolve(
        json_flag: bool,
        format_flag: Option<&str>,
        is_tty: bool,
        term_is_dumb: bool,
    ) -> Self {
        match (json_flag, format_flag) {
            (true, _) => Self::Json,
            (false, Some("plain")) => Self::Plain,
            _ if term_is_dumb || !is_tty => Self::Plain,
            _ => Self::Pretty,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}
