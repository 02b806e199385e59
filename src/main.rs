use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use payslip_pdf::{Config, DEFAULT_ARCHIVE_NAME, DEFAULT_FONT_FAMILY, DEFAULT_FONT_PATH};

#[derive(Parser)]
#[command(name = "payslip-pdf")]
#[command(version)]
#[command(about = "Render one PDF payslip per employee from a payroll workbook and bundle them as a ZIP")]
struct Cli {
    /// Workbook with a company sheet followed by an employee sheet
    input: PathBuf,

    /// Where to write the archive
    #[arg(short, long, default_value = DEFAULT_ARCHIVE_NAME)]
    output: PathBuf,

    /// TrueType/OpenType font the payslips are set in
    #[arg(long, env = "PAYSLIP_FONT", default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    /// Family searched for in the font directories when the font file is unusable
    #[arg(long, env = "PAYSLIP_FONT_FAMILY", default_value = DEFAULT_FONT_FAMILY)]
    font_family: String,

    /// Extra font directories searched when the font file is unusable
    #[arg(long, env = "PAYSLIP_FONT_DIRS")]
    font_dirs: Option<String>,

    /// Maximum payslips rendered at once (0 = one per CPU)
    #[arg(short, long, env = "PAYSLIP_JOBS", default_value_t = 0)]
    jobs: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config {
        font_path: cli.font,
        font_family: cli.font_family,
        font_dirs: cli
            .font_dirs
            .as_deref()
            .map(Config::parse_dir_list)
            .unwrap_or_default(),
        max_concurrency: cli.jobs,
    };

    match payslip_pdf::generate_payslips(&cli.input, &cli.output, &config) {
        Ok(summary) => {
            println!(
                "Wrote {} payslips to {} ({} bytes, font {})",
                summary.documents,
                cli.output.display(),
                summary.archive_bytes,
                summary.font
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error processing {}: {e}", cli.input.display());
            ExitCode::FAILURE
        }
    }
}
