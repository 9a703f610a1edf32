use clap::Parser;
use std::path::PathBuf;

/// Funding ledger reporting tool
#[derive(Parser, Debug, Clone)]
#[command(name = "funding_report")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Funding-arrangement sheet exported as CSV (template headers)
    #[arg(long, default_value = "funding_arrangement.csv")]
    pub funding_csv: PathBuf,

    /// Project registry sheet exported as CSV (template headers)
    #[arg(long, default_value = "project_info.csv")]
    pub project_csv: PathBuf,

    /// Key-project list exported as CSV (template headers)
    #[arg(long, default_value = "key_projects.csv")]
    pub key_projects_csv: PathBuf,

    /// JSON file holding the persisted ledger
    #[arg(long, default_value = "city_construction_data.json")]
    pub store: PathBuf,

    /// Directory receiving report files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Rows shown in each console preview table
    #[arg(long, default_value_t = 3)]
    pub preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_file_names() {
        let cli = Cli::parse_from(["funding_report"]);
        assert_eq!(cli.funding_csv, PathBuf::from("funding_arrangement.csv"));
        assert_eq!(cli.project_csv, PathBuf::from("project_info.csv"));
        assert_eq!(cli.key_projects_csv, PathBuf::from("key_projects.csv"));
        assert_eq!(cli.store, PathBuf::from("city_construction_data.json"));
        assert_eq!(cli.preview_rows, 3);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "funding_report",
            "--out-dir",
            "/tmp/reports",
            "--preview-rows",
            "10",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.out_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(cli.preview_rows, 10);
        assert_eq!(cli.log_level, "debug");
    }
}
