use serde::{Deserialize, Deserializer, Serialize};

/// Default upper bound for a loaded input (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Granularity at which two texts are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Index-aligned comparison of individual characters
    #[default]
    Character,
    /// Set-based comparison of whitespace-delimited tokens
    Word,
    /// Set-based comparison of newline-delimited lines
    Line,
}

impl CompareMode {
    /// Resolve a mode by name. Unknown names fall back to `Character`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "word" => CompareMode::Word,
            "line" => CompareMode::Line,
            _ => CompareMode::Character,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareMode::Character => "character",
            CompareMode::Word => "word",
            CompareMode::Line => "line",
        }
    }
}

impl std::fmt::Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CompareMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(CompareMode::from_name(&name))
    }
}

/// Options controlling a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparisonOptions {
    /// Lower-case both sides before comparing
    #[serde(default)]
    pub ignore_case: bool,
    /// Collapse whitespace runs to a single space and trim both sides
    #[serde(default)]
    pub ignore_whitespace: bool,
    #[serde(default)]
    pub compare_mode: CompareMode,
}

impl ComparisonOptions {
    pub fn new(compare_mode: CompareMode) -> Self {
        Self {
            compare_mode,
            ..Default::default()
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore_whitespace: bool) -> Self {
        self.ignore_whitespace = ignore_whitespace;
        self
    }
}

/// Character, word and line counts for one text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
}

/// Outcome of comparing two texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Character offsets flagged as different on the left side, ascending
    pub left_highlights: Vec<usize>,
    /// Character offsets flagged as different on the right side, ascending
    pub right_highlights: Vec<usize>,
    pub left_stats: TextStats,
    pub right_stats: TextStats,
    /// Aggregate difference as a percentage. Character mode stays within
    /// [0, 100]; word and line modes can exceed 100.
    pub diff_percentage: f64,
}

impl ComparisonResult {
    /// True when neither side has a highlighted position
    pub fn is_identical(&self) -> bool {
        self.left_highlights.is_empty() && self.right_highlights.is_empty()
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default for ignoring case differences
    #[serde(default)]
    pub ignore_case: bool,

    /// Default for ignoring whitespace differences
    #[serde(default)]
    pub ignore_whitespace: bool,

    /// Default comparison granularity
    #[serde(default)]
    pub compare_mode: CompareMode,

    /// Largest input accepted by the loader, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Whether terminal output may use ANSI colors
    #[serde(default = "default_color")]
    pub color: bool,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_color() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            ignore_whitespace: false,
            compare_mode: CompareMode::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            color: true,
            portable_mode: false,
        }
    }
}

impl AppConfig {
    /// Comparison options seeded from the configured defaults
    pub fn comparison_options(&self) -> ComparisonOptions {
        ComparisonOptions {
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
            compare_mode: self.compare_mode,
        }
    }
}
