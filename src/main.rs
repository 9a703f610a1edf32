// Entry point and interactive CLI flow.
//
// - Option [1] imports the funding CSV into the store, printing load and
//   validation diagnostics.
// - Option [2] builds the summary and detailed reports, writes them out and
//   previews them on the console.
// - Option [3] imports the project registry sheet the same way as [1].
// - Option [4] imports the key-project list the same way as [1].
// - Option [5] writes every stored table back out as template CSV.
// - After generating reports, the user can go back to the menu or exit.
use anyhow::{Context, Result};
use clap::Parser;
use funding_report::config::Cli;
use funding_report::output;
use funding_report::reports::{generate_detailed_report, generate_summary_report};
use funding_report::store::{DataStore, JsonFileRepository};
use funding_report::util::{calculate_percentage, format_amount, format_int};
use funding_report::validate::{
    has_errors, validate_funding_rows, validate_key_project_rows, validate_project_rows,
    ValidationIssue,
};
use funding_report::{error, loader};
use std::io::{self, Write};
use tracing::{error as log_error, info};
use tracing_subscriber::EnvFilter;

type Store = DataStore<JsonFileRepository>;

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to the menu after generating reports.
///
/// Returns `true` for `Y`, `false` for `N` or closed stdin.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if let Ok(0) | Err(_) = io::stdin().read_line(&mut buf) {
            return false;
        }
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(what: &str, report: &loader::LoadReport) {
    println!(
        "Processing {}... ({} rows read, {} loaded)",
        what,
        format_int(report.total_rows),
        format_int(report.loaded_rows)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped because they could not be read.",
            format_int(report.parse_errors)
        );
    }
}

/// Print every issue; `true` when the batch may be stored.
fn accept_batch(issues: &[ValidationIssue]) -> bool {
    for issue in issues {
        println!("  {}", issue);
    }
    if has_errors(issues) {
        println!("Import aborted: fix the rows above and load again.\n");
        return false;
    }
    true
}

fn report_saved(result: error::Result<()>, count: usize, what: &str, store: &Store) {
    match result {
        Ok(()) => println!(
            "Stored {} {} in {}.\n",
            format_int(count),
            what,
            store.repository().path().display()
        ),
        Err(e) => {
            log_error!(error = %e, "saving store failed");
            eprintln!("Failed to save data: {}\n", e);
        }
    }
}

/// Handle option [1]: import the funding sheet into the store.
///
/// Rows with validation errors block the import; warnings are printed and
/// the rows are kept.
fn handle_load(store: &mut Store, cli: &Cli) {
    let (rows, load_report) = match loader::load_funding_csv(&cli.funding_csv) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    print_load_report("funding sheet", &load_report);
    if !accept_batch(&validate_funding_rows(&rows)) {
        return;
    }
    let count = rows.len();
    let result = store.set_funding_arrangement(rows);
    report_saved(result, count, "funding records", store);
}

/// Handle option [3]: import the project registry into the store.
fn handle_load_projects(store: &mut Store, cli: &Cli) {
    let (rows, load_report) = match loader::load_project_csv(&cli.project_csv) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    print_load_report("project registry", &load_report);
    if !accept_batch(&validate_project_rows(&rows)) {
        return;
    }
    let count = rows.len();
    let result = store.set_project_info(rows);
    report_saved(result, count, "projects", store);
}

/// Handle option [4]: import the key-project list into the store.
fn handle_load_key_projects(store: &mut Store, cli: &Cli) {
    let (rows, load_report) = match loader::load_key_projects_csv(&cli.key_projects_csv) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    print_load_report("key-project list", &load_report);
    if !accept_batch(&validate_key_project_rows(&rows)) {
        return;
    }
    let count = rows.len();
    let result = store.set_key_projects(rows);
    report_saved(result, count, "key projects", store);
}

/// Handle option [5]: export the stored tables with their import headers.
fn handle_export_tables(store: &Store, cli: &Cli) {
    match output::export_tables(store.data(), &cli.out_dir) {
        Ok(written) if written.is_empty() => println!("Nothing stored to export.\n"),
        Ok(written) => {
            for p in written {
                println!("(exported to {})", p.display());
            }
            println!();
        }
        Err(e) => {
            log_error!(error = %e, "table export failed");
            eprintln!("Export failed: {}\n", e);
        }
    }
}

/// Handle option [2]: generate both reports, export them and print previews.
fn handle_generate_reports(store: &Store, cli: &Cli) -> error::Result<()> {
    let records = store.funding_arrangement();
    if records.is_empty() {
        return Err(error::Error::NoData);
    }

    println!("Generating reports...");
    let summary = generate_summary_report(records);
    let detailed = generate_detailed_report(records);
    info!(
        records = records.len(),
        projects = summary.total_stats.total_projects,
        "reports generated"
    );

    let written = output::export_reports(&summary, &detailed, &cli.out_dir)?;
    println!("Outputs saved to individual files...\n");

    let t = &summary.total_stats;
    println!("Funding Summary (万元)");
    println!(
        "Projects: {}  Budget: {}  Funding: {}",
        format_int(t.total_projects),
        format_amount(Some(t.total_budget)),
        format_amount(Some(t.total_funding))
    );
    println!(
        "Local: {} ({})  Central: {} ({})  Provincial: {} ({})\n",
        format_amount(Some(t.total_local_funding)),
        calculate_percentage(t.total_local_funding, t.total_funding),
        format_amount(Some(t.total_central_funding)),
        calculate_percentage(t.total_central_funding, t.total_funding),
        format_amount(Some(t.total_provincial_funding)),
        calculate_percentage(t.total_provincial_funding, t.total_funding),
    );

    println!("Report 1: Project Funding Summary\n");
    output::preview_table_rows(
        &output::summary_export_rows(&summary.project_summaries),
        cli.preview_rows,
    );
    println!("Report 2: Project Funding Breakdown by Source\n");
    output::preview_table_rows(
        &output::detailed_export_rows(&detailed.project_summaries),
        cli.preview_rows,
    );
    println!("Report 3: Funding by Area\n");
    output::preview_table_rows(&output::area_stats_rows(&summary.area_stats), cli.preview_rows);
    println!("Report 4: Funding by Category\n");
    output::preview_table_rows(
        &output::category_stats_rows(&summary.category_stats),
        cli.preview_rows,
    );

    for p in written {
        println!("(exported to {})", p.display());
    }
    println!();
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut store = DataStore::open(JsonFileRepository::new(&cli.store))
        .with_context(|| format!("opening store {}", cli.store.display()))?;

    loop {
        println!("Funding Report");
        println!("[1] Load the funding sheet");
        println!("[2] Generate Reports");
        println!("[3] Load the project registry");
        println!("[4] Load the key-project list");
        println!("[5] Export stored tables\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_load(&mut store, &cli);
            }
            "2" => {
                println!();
                match handle_generate_reports(&store, &cli) {
                    Ok(()) => {}
                    Err(error::Error::NoData) => {
                        println!(
                            "Error: No funding data stored. Please load the funding sheet first (option 1).\n"
                        );
                        continue;
                    }
                    Err(e) => eprintln!("Report error: {}\n", e),
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                handle_load_projects(&mut store, &cli);
            }
            "4" => {
                handle_load_key_projects(&mut store, &cli);
            }
            "5" => {
                handle_export_tables(&store, &cli);
            }
            _ => {
                println!("Invalid choice. Please enter a number from 1 to 5.\n");
            }
        }
    }
    Ok(())
}
