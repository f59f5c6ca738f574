// Entry point and interactive CLI flow.
//
// - Option [1] loads the audit export, printing a short diagnostic.
// - Option [2] builds the review summary and quote for every loaded audit,
//   writes them out, and previews them in the terminal.
// - After generating, the user can go back to the menu or exit.
use field_audit::config::SizingConfig;
use field_audit::engine::audit_label;
use field_audit::types::{AdaptedView, EquipmentLine, RawAuditRecord, ReviewRow};
use field_audit::{loader, output, quote, report, util};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

const CONFIG_FILE: &str = "sizing_config.json";
const DEFAULT_AUDIT_FILE: &str = "audits.json";

// Loaded audits survive between menu choices so a file is read once but can
// be reviewed repeatedly.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<RawAuditRecord>>,
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_sizing_config() -> SizingConfig {
    if !Path::new(CONFIG_FILE).exists() {
        return SizingConfig::standard().clone();
    }
    match loader::load_config(CONFIG_FILE) {
        Ok(cfg) => {
            info!(file = CONFIG_FILE, "using custom sizing config");
            cfg
        }
        Err(e) => {
            warn!(error = %e, "falling back to default sizing config");
            SizingConfig::standard().clone()
        }
    }
}

fn handle_load(path: &str) {
    match loader::load_records(path) {
        Ok((data, load_report)) => {
            println!(
                "Loaded {} audit(s) from {}",
                util::format_int(load_report.total_records as u64),
                path
            );
            if load_report.without_service > 0 {
                println!(
                    "Note: {} audit(s) have no service selected and will use the generic summary.",
                    util::format_int(load_report.without_service as u64)
                );
            }
            let missing_stats = load_report.total_records - load_report.with_stats;
            if missing_stats > 0 {
                println!(
                    "Info: {} audit(s) have no load stats; load figures will read as zero.",
                    util::format_int(missing_stats as u64)
                );
            }
            println!();
            match APP_STATE.lock() {
                Ok(mut state) => state.data = Some(data),
                Err(e) => eprintln!("State lock poisoned: {}\n", e),
            }
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_generate(config: &SizingConfig) {
    let data = match APP_STATE.lock() {
        Ok(state) => state.data.clone(),
        Err(e) => {
            eprintln!("State lock poisoned: {}\n", e);
            return;
        }
    };
    let Some(data) = data else {
        println!("Error: No audits loaded. Please load the audit file first (option 1).\n");
        return;
    };

    let mut review_rows: Vec<ReviewRow> = Vec::new();
    let mut quote_lines: Vec<EquipmentLine> = Vec::new();
    let mut views: Vec<AdaptedView> = Vec::new();

    for (idx, record) in data.iter().enumerate() {
        let review = report::build_review(record, config);
        let draft = quote::build_quote(record, config);
        let label = audit_label(record).unwrap_or_else(|| format!("Audit {}", idx + 1));

        println!("{} ({} review)\n", label, review.route);
        output::preview_table_rows(&review.rows, review.rows.len());
        output::preview_table_rows(&draft.lines, draft.lines.len());
        println!(
            "Quote subtotal: {}\n",
            util::format_currency(&config.currency_symbol, draft.subtotal)
        );

        review_rows.extend(review.rows.into_iter().map(|row| ReviewRow {
            audit: label.clone(),
            ..row
        }));
        quote_lines.extend(draft.lines.into_iter().map(|line| EquipmentLine {
            audit: label.clone(),
            ..line
        }));
        views.push(review.view);
    }

    let exports: [(&str, Result<(), field_audit::AuditError>); 3] = [
        ("review_summary.csv", output::write_csv("review_summary.csv", &review_rows)),
        ("quote_lines.csv", output::write_csv("quote_lines.csv", &quote_lines)),
        ("adapted_views.json", output::write_json("adapted_views.json", &views)),
    ];
    for (file, result) in exports {
        match result {
            Ok(()) => println!("(Exported {})", file),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let audit_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_AUDIT_FILE.to_string());
    let config = load_sizing_config();

    loop {
        println!("Field Audit Review:");
        println!("[1] Load audit file ({})", audit_path);
        println!("[2] Generate review & quote\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&audit_path),
            "2" => {
                println!();
                handle_generate(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
