use std::path::PathBuf;

pub const DEFAULT_FONT_PATH: &str = "fonts/NotoSans-Regular.ttf";
pub const DEFAULT_ARCHIVE_NAME: &str = "salary_slips.zip";
/// Family looked up in the font directories when the font file is unusable.
pub const DEFAULT_FONT_FAMILY: &str = "Noto Sans";

/// Settings for one batch run. The CLI fills this from flags and
/// `PAYSLIP_*` environment variables; library callers build it directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Font the payslips are set in.
    pub font_path: PathBuf,
    /// Regular face of this family is the second choice.
    pub font_family: String,
    /// Extra directories searched for the fallback family before the system ones.
    pub font_dirs: Vec<PathBuf>,
    /// Upper bound on concurrent renders; 0 means one per CPU.
    pub max_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_dirs: Vec::new(),
            max_concurrency: 0,
        }
    }
}

impl Config {
    /// Split a `PAYSLIP_FONT_DIRS` style list (`:` separated, `;` on Windows).
    pub fn parse_dir_list(val: &str) -> Vec<PathBuf> {
        let sep = if cfg!(windows) { ';' } else { ':' };
        val.split(sep)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}
