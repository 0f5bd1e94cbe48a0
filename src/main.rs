// Entry point and high-level console flow.
//
// The binary is a thin shell over the library pipeline:
// - Option [1] loads and normalizes an execution report (explicit path or
//   the conventional default), caching parsed tables by file fingerprint.
// - Option [2] prompts for the four multi-select filters, then renders the
//   KPI block, pipeline funnel, savings mix, inference-type breakdown, and
//   sprint summary, exporting the tables to CSV/JSON alongside.
use costopt_report::aggregate::{self, Kpis};
use costopt_report::cache::TableCache;
use costopt_report::filter::{apply_filters, FilterOptions, Selections};
use costopt_report::loader::{self, DEFAULT_REPORT_PATH};
use costopt_report::output;
use costopt_report::types::Record;
use costopt_report::util::{format_int, format_money, format_percent};

use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

// In-memory session state: the parsed-table cache plus the currently loaded
// table, so the dashboard can be re-rendered with new filters without
// re-parsing the file.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        cache: TableCache::new(),
        table: None,
    })
});

struct AppState {
    cache: TableCache,
    table: Option<Vec<Record>>,
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the action menu after rendering.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Dashboard Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and normalize the execution report.
///
/// A blank path uses the default-report convention (missing default is a
/// warning plus an empty table, not an error); an explicit path goes through
/// the fingerprint cache so re-loading the same file is free.
fn handle_load() {
    let input = read_line(&format!("Report path (blank = {}): ", DEFAULT_REPORT_PATH));
    let mut state = APP_STATE.lock().unwrap();
    let loaded = if input.is_empty() {
        loader::load(None).map(|(records, report)| {
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to malformed shape.",
                    format_int(report.skipped_rows as i64)
                );
            }
            records
        })
    } else {
        let path = Path::new(&input);
        state.cache.get_or_load(path).map(|records| records.to_vec())
    };
    match loaded {
        Ok(records) => {
            println!(
                "Processing report... ({} recommendations loaded)\n",
                format_int(records.len() as i64)
            );
            state.table = Some(records);
        }
        Err(e) => {
            eprintln!("Failed to load report: {}\n", e);
        }
    }
}

/// One multi-select filter prompt: show the available options and accept a
/// comma-separated subset. Blank or fully-invalid input selects everything.
fn prompt_multi(label: &str, options: &[String]) -> BTreeSet<String> {
    if options.is_empty() {
        return BTreeSet::new();
    }
    println!("{}: {}", label, options.join(", "));
    let input = read_line(&format!("Select {} (comma-separated, blank = all): ", label));
    let picked: BTreeSet<String> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| options.iter().any(|o| o == s))
        .map(str::to_string)
        .collect();
    if picked.is_empty() {
        options.iter().cloned().collect()
    } else {
        picked
    }
}

fn prompt_selections(options: &FilterOptions) -> Selections {
    let year_strings: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    Selections {
        months: prompt_multi("Month", &options.months),
        years: prompt_multi("Year", &year_strings)
            .into_iter()
            .filter_map(|y| y.parse().ok())
            .collect(),
        fiscal_years: prompt_multi("Fiscal Year (FY)", &options.fiscal_years),
        sprints: prompt_multi("Sprint", &options.sprints),
    }
}

fn print_kpis(kpis: &Kpis) {
    println!("Total Recommendations: {}", format_int(kpis.total_recommendations as i64));
    println!(
        "Total Savings ($):     {}",
        format_money(Some(kpis.total_savings), false)
    );
    println!(
        "Total Savings (%):     {}",
        format_percent(kpis.weighted_savings_percent)
    );
    println!(
        "Avg Savings / Rec ($): {}\n",
        format_money(kpis.avg_savings_per_recommendation, true)
    );
}

/// Handle option [2]: filter the table and render every dashboard section.
fn handle_dashboard() {
    let table = {
        let state = APP_STATE.lock().unwrap();
        state.table.clone()
    };
    let Some(table) = table else {
        println!("Error: No data loaded. Please load a report first (option 1).\n");
        return;
    };
    if table.is_empty() {
        println!("No rows available. Supply an execution report with data first.\n");
        return;
    }

    let options = FilterOptions::from_records(&table);
    let selections = prompt_selections(&options);
    let view = apply_filters(&table, &selections);
    println!(
        "\n{} of {} recommendations match the current filters.\n",
        format_int(view.len() as i64),
        format_int(table.len() as i64)
    );

    let kpis = aggregate::compute_kpis(&view);
    print_kpis(&kpis);
    if let Err(e) = output::write_json(Path::new("kpis.json"), &kpis) {
        eprintln!("Write error: {}", e);
    }

    let stages = aggregate::group_by_stage(&view);
    println!("Savings Pipeline (Funnel)");
    output::preview_table(&output::stage_rows(&stages.funnel()), 4);
    println!("Savings Mix ($)");
    output::preview_table(&output::stage_rows(&stages.mix()), 4);

    let by_inference = aggregate::group_by_inference_type(&view);
    let inference_rows = output::inference_rows(&by_inference);
    println!("Savings by Inference Type ($)");
    output::preview_table(&inference_rows, inference_rows.len());
    if let Err(e) = output::write_csv(Path::new("savings_by_inference_type.csv"), &inference_rows)
    {
        eprintln!("Write error: {}", e);
    }

    let by_sprint = aggregate::group_by_sprint(&view);
    let sprint_rows = output::sprint_rows(&by_sprint);
    println!("Sprint Summary – Savings & Counts");
    output::preview_table(&sprint_rows, sprint_rows.len());
    let file = "sprint_summary.csv";
    if let Err(e) = output::write_csv(Path::new(file), &sprint_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full sprint table exported to {})\n", file);

    println!(
        "FY: Apr 1 to Mar 31 (end-year label, e.g., Apr 2024–Mar 2025 = FY2025). \
         Q1=Apr–Jun, Q2=Jul–Sep, Q3=Oct–Dec, Q4=Jan–Mar.\n"
    );
}

fn main() {
    env_logger::init();
    loop {
        println!("Select an action:");
        println!("[1] Load execution report");
        println!("[2] Render dashboard summary\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_dashboard();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
