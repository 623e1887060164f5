use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub indent_style: IndentStyle,
    pub only_app: bool,
    pub verbosity: VerbosityLevel,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            indent_style: IndentStyle::Spaces(4),
            only_app: false,
            verbosity: VerbosityLevel::Normal,
        }
    }
}

impl EmitterConfig {
    // Plain text for files that are diffed or compared later.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn with_only_app(mut self, only_app: bool) -> Self {
        self.only_app = only_app;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn as_indent(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
}

impl VerbosityLevel {
    pub fn should_print_statistics(&self) -> bool {
        !matches!(self, VerbosityLevel::Quiet)
    }

    pub fn should_print_ids(&self) -> bool {
        matches!(self, VerbosityLevel::Verbose)
    }
}
