//! Log parsing and analysis tool for churnboard run logs.
//!
//! Usage:
//!   logparse <command> <file.jsonl> [options]
//!
//! Commands:
//!   summary <file.jsonl>             - Summarize a log file
//!   filter <file.jsonl> [options]    - Filter logs by component/level
//!   requests <file.jsonl>            - Per-endpoint latency and error report
//!   replay <file.jsonl>              - Validate audit-trail continuity
//!   slice <file.jsonl> <start> <end> - Extract time slice
//!
//! Options:
//!   --component=<c1,c2,...>  Filter by component (api,view,metrics,app,audit,system,profile)
//!   --level=<level>          Minimum level (trace,debug,info,warn,error,fatal)
//!   --event=<e1,e2,...>      Filter by event type(s)
//!   --domain=<domain>        Filter by customer domain (telecom,bank,ecommerce)
//!   --json                   Output as JSON (default: human-readable)

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct LogEntry {
    ts: String,
    run_id: String,
    seq: u64,
    lvl: String,
    component: String,
    event: String,
    msg: Option<String>,
    // Hoisted top-level fields; absent on records that don't carry them.
    view: Option<String>,
    page: Option<String>,
    domain: Option<String>,
    path: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default)]
struct LogStats {
    total_entries: u64,
    run_ids: Vec<String>,
    by_level: HashMap<String, u64>,
    by_component: HashMap<String, u64>,
    by_event: HashMap<String, u64>,
    first_ts: Option<String>,
    last_ts: Option<String>,
    // Dashboard-specific
    requests: u64,
    request_errors: u64,
    view_transitions: u64,
    supersessions: u64,
    simulations: u64,
    audits: u64,
    errors: u64,
}

#[derive(Debug, Clone)]
struct FilterConfig {
    components: Option<Vec<String>>,
    min_level: Option<String>,
    events: Option<Vec<String>>,
    domain: Option<String>,
}

fn level_rank(lvl: &str) -> u8 {
    match lvl.to_lowercase().as_str() {
        "trace" => 0,
        "debug" => 1,
        "info" => 2,
        "warn" => 3,
        "error" => 4,
        "fatal" => 5,
        _ => 2,
    }
}

fn parse_log_file(path: &PathBuf) -> impl Iterator<Item = (String, Option<LogEntry>)> {
    let file = File::open(path).expect("Failed to open log file");
    BufReader::new(file).lines().map(|line| {
        let line = line.unwrap_or_default();
        let parsed = serde_json::from_str::<LogEntry>(&line).ok();
        (line, parsed)
    })
}

fn cmd_summary(path: &PathBuf) {
    let mut stats = LogStats::default();

    for (line, entry) in parse_log_file(path) {
        if let Some(e) = entry {
            stats.total_entries += 1;
            if !stats.run_ids.contains(&e.run_id) {
                stats.run_ids.push(e.run_id.clone());
            }
            *stats.by_level.entry(e.lvl.clone()).or_insert(0) += 1;
            *stats.by_component.entry(e.component.clone()).or_insert(0) += 1;
            *stats.by_event.entry(e.event.clone()).or_insert(0) += 1;

            if stats.first_ts.is_none() {
                stats.first_ts = Some(e.ts.clone());
            }
            stats.last_ts = Some(e.ts.clone());

            match e.event.as_str() {
                "request" => {
                    stats.requests += 1;
                    if e.data.get("outcome").and_then(|v| v.as_str()) != Some("ok") {
                        stats.request_errors += 1;
                    }
                }
                "view_transition" => stats.view_transitions += 1,
                "superseded" => stats.supersessions += 1,
                "simulation" => stats.simulations += 1,
                _ => {}
            }
            if e.component == "audit" {
                stats.audits += 1;
            }
            if e.lvl == "ERROR" || e.lvl == "FATAL" {
                stats.errors += 1;
            }
        } else if !line.is_empty() {
            eprintln!("Failed to parse: {}", &line[..line.len().min(80)]);
        }
    }

    println!("=== Log Summary ===\n");
    println!("Total entries: {}", stats.total_entries);
    println!("Runs: {}", stats.run_ids.join(", "));
    println!(
        "Time range: {} -> {}",
        stats.first_ts.as_deref().unwrap_or("?"),
        stats.last_ts.as_deref().unwrap_or("?")
    );

    println!("\n--- By Level ---");
    let mut levels: Vec<_> = stats.by_level.iter().collect();
    levels.sort_by_key(|(k, _)| level_rank(k));
    for (lvl, count) in levels {
        println!("  {:<8} {:>8}", lvl, count);
    }

    println!("\n--- By Component ---");
    let mut components: Vec<_> = stats.by_component.iter().collect();
    components.sort_by(|a, b| b.1.cmp(a.1));
    for (component, count) in components {
        println!("  {:<12} {:>8}", component, count);
    }

    println!("\n--- Top Events ---");
    let mut events: Vec<_> = stats.by_event.iter().collect();
    events.sort_by(|a, b| b.1.cmp(a.1));
    for (event, count) in events.iter().take(15) {
        println!("  {:<24} {:>8}", event, count);
    }

    println!("\n--- Dashboard Activity ---");
    println!("  Requests:          {:>8}", stats.requests);
    println!("  Request errors:    {:>8}", stats.request_errors);
    println!("  View transitions:  {:>8}", stats.view_transitions);
    println!("  Supersessions:     {:>8}", stats.supersessions);
    println!("  Simulations:       {:>8}", stats.simulations);
    println!("  Audit records:     {:>8}", stats.audits);
    println!("  Errors:            {:>8}", stats.errors);
}

fn cmd_filter(path: &PathBuf, config: &FilterConfig, as_json: bool) {
    for (line, entry) in parse_log_file(path) {
        let Some(e) = entry else { continue };

        if let Some(ref min) = config.min_level {
            if level_rank(&e.lvl) < level_rank(min) {
                continue;
            }
        }

        if let Some(ref components) = config.components {
            if !components.iter().any(|c| c == &e.component) {
                continue;
            }
        }

        if let Some(ref events) = config.events {
            if !events.iter().any(|ev| ev == &e.event) {
                continue;
            }
        }

        if let Some(ref wanted) = config.domain {
            let matches = e.domain.as_ref() == Some(wanted)
                || e.data.get("domain").and_then(|v| v.as_str()) == Some(wanted.as_str());
            if !matches {
                continue;
            }
        }

        if as_json {
            println!("{}", line);
        } else {
            let msg = e.msg.as_deref().unwrap_or("");
            let subject = e
                .view
                .as_deref()
                .or(e.page.as_deref())
                .or(e.path.as_deref())
                .unwrap_or("");
            println!(
                "[{}] {} {} {} {} {}",
                &e.ts[11..e.ts.len().min(23)], // HH:MM:SS.mmm
                e.lvl,
                e.component,
                e.event,
                subject,
                msg
            );
        }
    }
}

fn cmd_requests(path: &PathBuf) {
    #[derive(Default)]
    struct PathStats {
        count: u64,
        errors: u64,
        total_ms: f64,
        max_ms: f64,
        by_outcome: HashMap<String, u64>,
    }

    let mut per_path: HashMap<String, PathStats> = HashMap::new();

    for (_, entry) in parse_log_file(path) {
        let Some(e) = entry else { continue };
        if e.event != "request" {
            continue;
        }
        let Some(endpoint) = e.path else { continue };
        let stats = per_path.entry(endpoint).or_default();
        stats.count += 1;
        let outcome = e
            .data
            .get("outcome")
            .and_then(|v| v.as_str())
            .unwrap_or("?")
            .to_string();
        if outcome != "ok" {
            stats.errors += 1;
        }
        *stats.by_outcome.entry(outcome).or_insert(0) += 1;
        if let Some(ms) = e.data.get("elapsed_ms").and_then(|v| v.as_f64()) {
            stats.total_ms += ms;
            if ms > stats.max_ms {
                stats.max_ms = ms;
            }
        }
    }

    if per_path.is_empty() {
        println!("No request records found (requests log at debug level; check LOG_LEVEL)");
        return;
    }

    println!("=== Request Report ===\n");
    println!(
        "{:<34} {:>7} {:>7} {:>10} {:>10}  outcomes",
        "Path", "Count", "Errors", "MeanMs", "MaxMs"
    );
    println!("{}", "-".repeat(92));

    let mut paths: Vec<_> = per_path.iter().collect();
    paths.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    for (endpoint, s) in paths {
        let mean = if s.count > 0 { s.total_ms / s.count as f64 } else { 0.0 };
        let mut outcomes: Vec<String> =
            s.by_outcome.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        outcomes.sort();
        println!(
            "{:<34} {:>7} {:>7} {:>10.1} {:>10.1}  {}",
            endpoint,
            s.count,
            s.errors,
            mean,
            s.max_ms,
            outcomes.join(" ")
        );
    }
}

fn cmd_replay(path: &PathBuf) {
    println!("=== Replay Validation ===\n");

    let mut last_seq: Option<u64> = None;
    let mut seq_regressions = 0u64;
    let mut audit_count = 0u64;
    let mut last_app_seq: Option<u64> = None;
    let mut app_seq_gaps = 0u64;
    let mut distinct_hashes: Vec<String> = Vec::new();
    let mut missing_hash = 0u64;

    for (_, entry) in parse_log_file(path) {
        let Some(e) = entry else { continue };

        // The global seq is shared across sinks, so a single file sees an
        // increasing subsequence rather than a contiguous one.
        if let Some(prev) = last_seq {
            if e.seq <= prev {
                seq_regressions += 1;
            }
        }
        last_seq = Some(e.seq);

        if e.component != "audit" || e.event == "simulation" {
            continue;
        }
        audit_count += 1;

        match e.data.get("state_hash").and_then(|v| v.as_str()) {
            Some(hash) => {
                if !distinct_hashes.iter().any(|h| h == hash) {
                    distinct_hashes.push(hash.to_string());
                }
            }
            None => missing_hash += 1,
        }

        if let Some(app_seq) = e.data.get("app_seq").and_then(|v| v.as_u64()) {
            if let Some(prev) = last_app_seq {
                if app_seq != prev + 1 {
                    app_seq_gaps += 1;
                }
            }
            last_app_seq = Some(app_seq);
        }
    }

    println!("Sequence analysis:");
    println!("  Last log seq: {}", last_seq.unwrap_or(0));
    println!("  Ordering violations: {}", seq_regressions);

    println!("\nAudit chain:");
    println!("  Audit records: {}", audit_count);
    println!("  Last app seq: {}", last_app_seq.unwrap_or(0));
    println!("  App seq gaps: {}", app_seq_gaps);
    println!("  Distinct state hashes: {}", distinct_hashes.len());
    println!("  Records missing state_hash: {}", missing_hash);

    if seq_regressions == 0 && app_seq_gaps == 0 && missing_hash == 0 {
        println!("\nOK: audit trail is continuous; replay comparison is meaningful");
    } else {
        println!("\nWARN: trail has gaps; replay comparison may be unreliable");
    }
}

fn cmd_slice(path: &PathBuf, start: &str, end: &str) {
    for (line, entry) in parse_log_file(path) {
        let Some(e) = entry else { continue };
        if e.ts.as_str() >= start && e.ts.as_str() <= end {
            println!("{}", line);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: logparse <command> <file.jsonl> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  summary <file>              Summarize log file statistics");
    eprintln!("  filter <file> [options]     Filter and display log entries");
    eprintln!("  requests <file>             Per-endpoint latency and error report");
    eprintln!("  replay <file>               Validate audit-trail continuity");
    eprintln!("  slice <file> <start> <end>  Extract entries in time range");
    eprintln!();
    eprintln!("Filter options:");
    eprintln!("  --component=<c1,c2,...>  Filter by component(s)");
    eprintln!("  --level=<level>          Minimum log level");
    eprintln!("  --event=<e1,e2,...>      Filter by event type(s)");
    eprintln!("  --domain=<domain>        Filter by customer domain");
    eprintln!("  --json                   Output raw JSON lines");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = &args[1];
    let path = PathBuf::from(&args[2]);

    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    match cmd.as_str() {
        "summary" => cmd_summary(&path),
        "filter" => {
            let mut config = FilterConfig {
                components: None,
                min_level: None,
                events: None,
                domain: None,
            };
            let mut as_json = false;

            for arg in &args[3..] {
                if let Some(v) = arg.strip_prefix("--component=") {
                    config.components = Some(v.split(',').map(|s| s.trim().to_string()).collect());
                } else if let Some(v) = arg.strip_prefix("--level=") {
                    config.min_level = Some(v.to_string());
                } else if let Some(v) = arg.strip_prefix("--event=") {
                    config.events = Some(v.split(',').map(|s| s.trim().to_string()).collect());
                } else if let Some(v) = arg.strip_prefix("--domain=") {
                    config.domain = Some(v.to_string());
                } else if arg == "--json" {
                    as_json = true;
                }
            }
            cmd_filter(&path, &config, as_json);
        }
        "requests" => cmd_requests(&path),
        "replay" => cmd_replay(&path),
        "slice" => {
            if args.len() < 5 {
                eprintln!("Usage: logparse slice <file> <start_ts> <end_ts>");
                std::process::exit(1);
            }
            cmd_slice(&path, &args[3], &args[4]);
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }
}
