//! Run settings.
//!
//! Every setting has a flag, a `PAIRGRAPH_*` environment fallback and a
//! default. Numeric settings are range-checked by [`Settings::validate`].

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use pairgraph_core::{ShortcutPolicy, SolveOptions};

use crate::error::{CliError, CliResult};

pub const DEFAULT_ENTRIES_PER_LINE: usize = 12;
pub const MAX_ENTRIES_PER_LINE: usize = 64;

/// Extension of the adjacency report.
pub const ADJACENCY_EXT: &str = "adj";
/// Extension of the closure report.
pub const CLOSURE_EXT: &str = "cnt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shortcut {
    /// Reuse the closure of a solved dual-side neighbor.
    DualSide,
    /// Traverse every node.
    Disabled,
}

impl From<Shortcut> for ShortcutPolicy {
    fn from(s: Shortcut) -> Self {
        match s {
            Shortcut::DualSide => ShortcutPolicy::DualSide,
            Shortcut::Disabled => ShortcutPolicy::Disabled,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Directory searched when INPUT is a bare file number
    #[arg(long, env = "PAIRGRAPH_INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory for reports (default: next to the input file)
    #[arg(long, env = "PAIRGRAPH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report entries per line before wrapping
    #[arg(long, env = "PAIRGRAPH_ENTRIES_PER_LINE", default_value_t = DEFAULT_ENTRIES_PER_LINE)]
    pub entries_per_line: usize,

    /// Closure reuse between dual-side neighbors
    #[arg(long, env = "PAIRGRAPH_SHORTCUT", value_enum, default_value_t = Shortcut::DualSide)]
    pub shortcut: Shortcut,

    /// Report format
    #[arg(long, env = "PAIRGRAPH_FORMAT", value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: None,
            entries_per_line: DEFAULT_ENTRIES_PER_LINE,
            shortcut: Shortcut::DualSide,
            format: ReportFormat::Text,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> CliResult<()> {
        if !(1..=MAX_ENTRIES_PER_LINE).contains(&self.entries_per_line) {
            return Err(CliError::Config(format!(
                "entries_per_line must be between 1 and {}, got {}",
                MAX_ENTRIES_PER_LINE, self.entries_per_line
            )));
        }
        Ok(())
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            shortcut: self.shortcut.into(),
        }
    }

    /// Resolve INPUT: a bare number `N` names `pairsN.bin` in the input
    /// directory; anything else is a path.
    pub fn resolve_input(&self, input: &str) -> PathBuf {
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            self.input_dir.join(format!("pairs{}.bin", input))
        } else {
            PathBuf::from(input)
        }
    }

    /// Report path for `input` with the given extension, e.g. `pairs3.adj`.
    pub fn report_path(&self, input: &Path, ext: &str) -> PathBuf {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pairs".to_string());
        let ext = match self.format {
            ReportFormat::Text => ext.to_string(),
            ReportFormat::Json => format!("{}.json", ext),
        };
        dir.join(format!("{}.{}", stem, ext))
    }
}
