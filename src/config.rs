//! Configuration for the `tiff-stream` inspection tool.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks using the `TIFF_STREAM_` prefix:
//!
//! - `TIFF_STREAM_PATH` - File to inspect
//! - `TIFF_STREAM_MAX_DIRECTORIES` - Directories read per chain (default: 100)
//! - `TIFF_STREAM_FOLLOW_TAGS` - Tags holding sub-directory offsets (default: 330,34665,34853)
//! - `TIFF_STREAM_MAX_VALUES` - Array elements printed per entry (default: 8)

use std::path::PathBuf;

use clap::Parser;

// =============================================================================
// Default Values
// =============================================================================

/// Default limit on directories read from one chain.
pub const DEFAULT_MAX_DIRECTORIES: usize = 100;

/// Default number of array elements printed per entry.
pub const DEFAULT_MAX_VALUES: usize = 8;

/// Default sub-directory tags: SubIFDs (330), EXIF IFD (34665), GPS IFD (34853).
pub const DEFAULT_FOLLOW_TAGS: &[u16] = &[330, 34665, 34853];

// =============================================================================
// CLI Arguments
// =============================================================================

/// TIFF Stream - Print the directory structure of a TIFF, DNG or EXIF file.
///
/// Reads the header and walks the directory chain with positional reads,
/// decoding each entry's value. Sub-directories referenced by the follow
/// tags are walked as well.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiff-stream")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path of the file to inspect.
    #[arg(env = "TIFF_STREAM_PATH")]
    pub path: PathBuf,

    /// Maximum number of directories to read from each chain.
    #[arg(long, default_value_t = DEFAULT_MAX_DIRECTORIES, env = "TIFF_STREAM_MAX_DIRECTORIES")]
    pub max_directories: usize,

    /// Tags whose values are sub-directory offsets (comma-separated).
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_FOLLOW_TAGS.to_vec(),
        env = "TIFF_STREAM_FOLLOW_TAGS"
    )]
    pub follow_tags: Vec<u16>,

    /// Maximum number of array elements printed per entry.
    #[arg(long, default_value_t = DEFAULT_MAX_VALUES, env = "TIFF_STREAM_MAX_VALUES")]
    pub max_values: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("A file path is required. Pass it as an argument or set TIFF_STREAM_PATH"
                .to_string());
        }

        if self.max_directories == 0 {
            return Err("max_directories must be greater than 0".to_string());
        }

        if self.max_values == 0 {
            return Err("max_values must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Whether entries with `tag` point at sub-directories to walk.
    pub fn follows(&self, tag: u16) -> bool {
        self.follow_tags.contains(&tag)
    }
}

// =============================================================================
// Tests
// =============================================================================
