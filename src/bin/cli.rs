use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use leave_planner::{
    BirthDatePolicy, BlockDraft, CaregiverSlot, JsonPlanStore, LeaveCalendar, PersistenceError,
    PlanModel, PlanStore, PlannerConfig, load_holidays_from_csv, load_holidays_from_ics,
    render_view_with, save_plan_to_json, save_view_to_csv,
};
use polars::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Interactive parental-leave planner
#[derive(Parser, Debug)]
#[command(name = "cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/leave-planner/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plan file used by `save` and `load` without a path
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Start a fresh plan with this birth date instead of restoring the last one
    #[arg(long, value_name = "YYYY-MM-DD")]
    birth_date: Option<NaiveDate>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |col: &Column, row_idx: usize| -> String {
        match col.get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(AnyValue::Float64(v)) => format!("{v:.2}"),
            Ok(av) => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            widths[ci] = widths[ci].max(cell(col, row_idx).chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push_str(&format!(" {:<width$} |", name, width = widths[i]));
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            out.push_str(&format!(" {:<width$} |", cell(col, row_idx), width = widths[ci]));
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

/// One row per block, numbered the way REPL commands address them.
fn blocks_dataframe(plan: &PlanModel) -> PolarsResult<DataFrame> {
    let mut caregivers = Vec::new();
    let mut numbers = Vec::new();
    let mut labels = Vec::new();
    let mut modes = Vec::new();
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut weeks = Vec::new();

    for timeline in plan.timelines() {
        for (idx, block) in timeline.blocks().iter().enumerate() {
            caregivers.push(format!("{} ({})", timeline.caregiver_name(), timeline.slot()));
            numbers.push((idx + 1) as i64);
            labels.push(block.label().to_string());
            modes.push(block.mode().as_str());
            starts.push(block.start_date().to_string());
            ends.push(block.end_date().to_string());
            weeks.push(block.duration_weeks_display());
        }
    }

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("caregiver"), caregivers).into_column(),
        Series::new(PlSmallStr::from_static("no"), numbers).into_column(),
        Series::new(PlSmallStr::from_static("label"), labels).into_column(),
        Series::new(PlSmallStr::from_static("mode"), modes).into_column(),
        Series::new(PlSmallStr::from_static("start"), starts).into_column(),
        Series::new(PlSmallStr::from_static("end"), ends).into_column(),
        Series::new(PlSmallStr::from_static("weeks"), weeks).into_column(),
    ])
}

fn print_plan(plan: &PlanModel) {
    println!("Birth date: {}", plan.birth_date());
    match blocks_dataframe(plan) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering plan: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show both timelines\n  chart                              Plain-text chart with overlaps and holidays\n  summary                            Leave, overlap and coverage totals\n  birth <YYYY-MM-DD> [shift]         Set the birth date (shift moves every block)\n  name <who> <name...>               Rename a caregiver (who: first|second)\n  add <who> [weeks] [after_no]       Add a block after block <after_no> (default: last)\n  delete <who> <no>                  Delete a block (block 1 is mandatory)\n  weeks <who> <no> <weeks>           Set whole-week duration\n  end <who> <no> <YYYY-MM-DD>        Set end date (first day back)\n  start <who> <no> <YYYY-MM-DD>      Set start date\n  label <who> <no> <text...>         Set block label\n  holidays show                      List imported holidays\n  holidays import <ics|csv> <path>   Import holidays from a calendar file\n  save [path]                        Save the plan as JSON\n  load [path]                        Load a plan from JSON\n  export csv <path>                  Export the view table as CSV\n  quit|exit                          Exit"
    );
}

fn parse_slot(plan: &PlanModel, s: &str) -> Option<CaregiverSlot> {
    if let Ok(slot) = s.parse::<CaregiverSlot>() {
        return Some(slot);
    }
    CaregiverSlot::ALL
        .into_iter()
        .find(|slot| plan.timeline(*slot).caregiver_name().eq_ignore_ascii_case(s))
}

fn parse_block_no(s: &str) -> Option<usize> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Current draft of block `index`, or the error message to print.
fn block_draft(plan: &PlanModel, slot: CaregiverSlot, index: usize) -> Result<BlockDraft, String> {
    plan.timeline(slot)
        .block(index)
        .map(|block| block.to_draft())
        .map_err(|e| format!("Error: {}", e))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn initial_plan(
    args: &Args,
    config: &PlannerConfig,
    plan_path: Option<&PathBuf>,
) -> Result<PlanModel, String> {
    let fresh = |date: NaiveDate| {
        PlanModel::new(date, &config.first_caregiver, &config.second_caregiver)
            .map_err(|e| e.to_string())
    };
    if let Some(date) = args.birth_date {
        return fresh(date);
    }
    if let Some(path) = plan_path {
        match JsonPlanStore::new(path).load_plan() {
            Ok(Some(plan)) => return Ok(plan),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "last plan could not be restored"
                );
                eprintln!("Could not restore {}: {}", path.display(), e);
            }
        }
    }
    fresh(chrono::Local::now().date_naive())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => PlannerConfig::load_from_file(path),
        None => PlannerConfig::load(),
    };
    let config = match config {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(2);
        }
    };
    let plan_path = args.plan.clone().or_else(|| config.resolved_plan_path());
    let calendar: LeaveCalendar = config.leave_calendar();

    let mut plan = match initial_plan(&args, &config, plan_path.as_ref()) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error creating plan: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Leave Planner (CLI) - type 'help' for commands\n");
    print_plan(&plan);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_plan(&plan),
            "chart" => {
                let view = render_view_with(&plan, &calendar);
                print!("{}", view.to_gantt_text(60));
            }
            "summary" => {
                let view = render_view_with(&plan, &calendar);
                println!("Summary: {}", view.summary.to_cli_summary());
                if view.overlaps.is_empty() {
                    println!("No overlaps.");
                }
                for segment in &view.overlaps {
                    println!(
                        "Overlap {} .. {} ({}d): {}",
                        segment.start_date,
                        segment.end_date,
                        segment.duration_days(),
                        segment.label()
                    );
                }
                for timeline in plan.timelines() {
                    for (a, b) in timeline.self_overlaps() {
                        println!(
                            "Note: {} blocks {} and {} overlap each other.",
                            timeline.caregiver_name(),
                            a + 1,
                            b + 1
                        );
                    }
                }
            }
            "birth" => {
                let date_s = parts.next();
                let policy = match parts.next() {
                    Some("shift") => BirthDatePolicy::ShiftAll,
                    _ => BirthDatePolicy::AnchorMandatory,
                };
                match date_s.map(parse_date) {
                    Some(Some(date)) => match plan.set_birth_date_with(date, policy) {
                        Ok(_) => {
                            println!("Birth date set.");
                            print_plan(&plan);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Some(None) => println!("Invalid date (YYYY-MM-DD)"),
                    None => println!("Usage: birth <YYYY-MM-DD> [shift]"),
                }
            }
            "name" => {
                let who = parts.next().and_then(|s| parse_slot(&plan, s));
                let rest: Vec<&str> = parts.collect();
                match (who, rest.is_empty()) {
                    (Some(slot), false) => {
                        plan.rename_caregiver(slot, rest.join(" "));
                        println!("Caregiver renamed.");
                        print_plan(&plan);
                    }
                    _ => println!("Usage: name <first|second> <name...>"),
                }
            }
            "add" => {
                let Some(slot) = parts.next().and_then(|s| parse_slot(&plan, s)) else {
                    println!("Usage: add <first|second> [weeks] [after_no]");
                    continue;
                };
                let weeks = match parts.next().map(|s| s.parse::<u32>()) {
                    Some(Ok(w)) => Some(w),
                    Some(Err(_)) => {
                        println!("Invalid weeks");
                        continue;
                    }
                    None => None,
                };
                let after = match parts.next().map(parse_block_no) {
                    Some(Some(idx)) => idx,
                    Some(None) => {
                        println!("Invalid block number");
                        continue;
                    }
                    None => plan.timeline(slot).len().saturating_sub(1),
                };
                let res = match weeks {
                    Some(w) => plan.add_block_with_weeks(slot, after, w),
                    None => plan.add_block(slot, after),
                };
                match res {
                    Ok(_) => {
                        println!("Added block {}.", plan.timeline(slot).len());
                        print_plan(&plan);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => {
                let who = parts.next().and_then(|s| parse_slot(&plan, s));
                let no = parts.next();
                match (who, no) {
                    (Some(slot), Some(no_s)) => match parse_block_no(no_s) {
                        Some(index) => match plan.remove_block(slot, index) {
                            Ok(_) => {
                                println!("Deleted block {}.", index + 1);
                                print_plan(&plan);
                            }
                            Err(e) => println!("Error: {}", e),
                        },
                        None => println!("Invalid block number"),
                    },
                    _ => println!("Usage: delete <first|second> <no>"),
                }
            }
            "weeks" | "end" | "start" | "label" => {
                let who = parts.next().and_then(|s| parse_slot(&plan, s));
                let no = parts.next().and_then(parse_block_no);
                let rest: Vec<&str> = parts.collect();
                let (Some(slot), Some(index), false) = (who, no, rest.is_empty()) else {
                    match cmd {
                        "weeks" => println!("Usage: weeks <first|second> <no> <weeks>"),
                        "label" => println!("Usage: label <first|second> <no> <text...>"),
                        _ => println!("Usage: {} <first|second> <no> <YYYY-MM-DD>", cmd),
                    }
                    continue;
                };
                let mut draft = match block_draft(&plan, slot, index) {
                    Ok(draft) => draft,
                    Err(msg) => {
                        println!("{}", msg);
                        continue;
                    }
                };
                match cmd {
                    "weeks" => {
                        let weeks: f64 = match rest[0].parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid weeks");
                                continue;
                            }
                        };
                        draft = BlockDraft::with_weeks(slot, draft.label, draft.start_date, weeks);
                    }
                    "end" => {
                        let Some(date) = parse_date(rest[0]) else {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        };
                        draft =
                            BlockDraft::with_end_date(slot, draft.label, draft.start_date, date);
                    }
                    "start" => {
                        let Some(date) = parse_date(rest[0]) else {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        };
                        draft.start_date = date;
                    }
                    _ => draft.label = rest.join(" "),
                }
                if index == 0 {
                    draft.is_mandatory = true;
                }
                match plan.update_block(slot, index, draft) {
                    Ok(_) => {
                        println!("Block {} updated.", index + 1);
                        print_plan(&plan);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "holidays" => match (parts.next(), parts.next(), parts.next()) {
                (Some("show"), _, _) | (None, _, _) => {
                    if plan.holidays().is_empty() {
                        println!("No holidays imported.");
                    }
                    for event in plan.holidays() {
                        println!("{} .. {}  {}", event.start_date, event.end_date, event.label);
                    }
                }
                (Some("import"), Some(fmt), Some(path)) => {
                    let events = match fmt {
                        "ics" => load_holidays_from_ics(path),
                        "csv" => load_holidays_from_csv(path),
                        _ => {
                            println!("Usage: holidays import <ics|csv> <path>");
                            continue;
                        }
                    };
                    match events {
                        Ok(events) => {
                            let count = events.len();
                            match plan.import_holidays(events) {
                                Ok(_) => println!("Imported {} holidays from {}.", count, path),
                                Err(e) => println!("Error importing holidays: {}", e),
                            }
                        }
                        Err(e) => println!("Error importing holidays: {}", e),
                    }
                }
                _ => println!("Usage: holidays show | holidays import <ics|csv> <path>"),
            },
            "save" => {
                let Some(path) = parts
                    .next()
                    .map(PathBuf::from)
                    .or_else(|| plan_path.clone())
                else {
                    println!("Usage: save <path>");
                    continue;
                };
                match save_plan_to_json(&plan, &path) {
                    Ok(_) => println!("Plan saved to {}.", path.display()),
                    Err(e) => println!("Error saving plan: {}", e),
                }
            }
            "load" => {
                let Some(path) = parts
                    .next()
                    .map(PathBuf::from)
                    .or_else(|| plan_path.clone())
                else {
                    println!("Usage: load <path>");
                    continue;
                };
                let loaded = JsonPlanStore::new(&path)
                    .load_plan()
                    .and_then(|stored| stored.ok_or(PersistenceError::NotFound));
                match loaded {
                    Ok(loaded) => {
                        plan = loaded;
                        println!("Plan loaded from {}.", path.display());
                        print_plan(&plan);
                    }
                    Err(e) => println!("Error loading plan: {}", e),
                }
            }
            "export" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => {
                    let view = render_view_with(&plan, &calendar);
                    match save_view_to_csv(&view, path) {
                        Ok(_) => println!("View exported to {}.", path),
                        Err(e) => println!("Error exporting view: {}", e),
                    }
                }
                _ => println!("Usage: export csv <path>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
    ExitCode::SUCCESS
}
