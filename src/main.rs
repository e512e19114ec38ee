use schemalens::config::Settings;
use schemalens::kind::ObjectKind;
use schemalens::mock;
use schemalens::pipeline::{Pipeline, ViewState};
use schemalens::policy::EdgeType;
use schemalens::schema::SchemaGraph;
use schemalens::visibility::{FocusMode, SchemaFilter};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <schema.json> [options]", program);
    eprintln!("       {} --mock <small|medium|large|stress> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <file>     Settings JSON seeding the initial view state");
    eprintln!("  -s, --search <text>     Case-insensitive name/id search");
    eprintln!("      --schema <name>     Only show one schema (default: all)");
    eprintln!("  -t, --types <kinds>     Comma-separated object kinds (table,view,trigger,procedure,function)");
    eprintln!("  -e, --edges <types>     Comma-separated edge types (relationships,viewDependencies,...)");
    eprintln!("  -f, --focus <id>        Focus a node");
    eprintln!("  -m, --mode <mode>       Focus mode: fade, hide (default: fade)");
    eprintln!("  -n, --threshold <n>     Max neighbors expanded around the focused node");
    eprintln!("      --select <id>       Select an edge (repeatable)");
    eprintln!("      --hover <id>        Hovered edge");
    eprintln!("  -l, --labels            Show all edge labels");
    eprintln!("  -o, --output <file>     Output file (default: stdout)");
    process::exit(1);
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn parse_list<T>(value: &str, what: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse(s).unwrap_or_else(|| fail(format!("Invalid {}: {}", what, s))))
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("schemalens");

    if args.len() < 2 {
        usage(program);
    }

    let mut input_path: Option<String> = None;
    let mut mock_size: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut output_path: Option<String> = None;
    let mut overrides: Vec<(String, String)> = Vec::new();
    let mut show_labels = false;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .unwrap_or_else(|| fail(format!("Missing value for {}", arg)))
        };
        match arg {
            "--mock" => mock_size = Some(value()),
            "-c" | "--config" => config_path = Some(value()),
            "-o" | "--output" => output_path = Some(value()),
            "-l" | "--labels" => show_labels = true,
            "-s" | "--search" | "--schema" | "-t" | "--types" | "-e" | "--edges" | "-f"
            | "--focus" | "-m" | "--mode" | "-n" | "--threshold" | "--select" | "--hover" => {
                let v = value();
                overrides.push((arg.to_string(), v));
            }
            "-h" | "--help" => usage(program),
            _ if arg.starts_with('-') => fail(format!("Unknown option: {}", arg)),
            _ => input_path = Some(arg.to_string()),
        }
        i += 1;
    }

    let settings = match &config_path {
        Some(path) => Settings::load(path).unwrap_or_else(|e| fail(e.to_string())),
        None => Settings::default(),
    };

    let schema = match (&input_path, &mock_size) {
        (Some(path), None) => SchemaGraph::load(path).unwrap_or_else(|e| fail(e.to_string())),
        (None, Some(size)) => mock::generate(size),
        _ => usage(program),
    };

    let mut state = settings.view_state();
    state.show_labels |= show_labels;
    for (flag, value) in &overrides {
        apply_override(&mut state, flag, value);
    }

    let mut pipeline = Pipeline::from_schema(&schema, settings.edge_options());
    let view = pipeline.derive(&state);

    let json = serde_json::to_string_pretty(&*view)
        .unwrap_or_else(|e| fail(format!("Failed to serialize output: {}", e)));

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                fail(format!("Failed to write {}: {}", path, e));
            }
        }
        None => println!("{}", json),
    }
}

fn apply_override(state: &mut ViewState, flag: &str, value: &str) {
    match flag {
        "-s" | "--search" => state.filters.search = value.to_string(),
        "--schema" => state.filters.schema = SchemaFilter::from(value.to_string()),
        "-t" | "--types" => {
            state.filters.object_types = parse_list(value, "object kind", ObjectKind::from_str)
                .into_iter()
                .collect()
        }
        "-e" | "--edges" => {
            state.edge_types = parse_list(value, "edge type", EdgeType::from_str)
                .into_iter()
                .collect()
        }
        "-f" | "--focus" => state.focus.node_id = Some(value.to_string()),
        "-m" | "--mode" => {
            state.focus.mode = FocusMode::from_str(value)
                .unwrap_or_else(|| fail(format!("Invalid focus mode: {}", value)))
        }
        "-n" | "--threshold" => {
            state.focus.expand_threshold = value
                .parse()
                .unwrap_or_else(|_| fail(format!("Invalid threshold: {}", value)))
        }
        "--select" => {
            state.selected_edge_ids.insert(value.to_string());
        }
        "--hover" => state.hovered_edge_id = Some(value.to_string()),
        _ => {}
    }
}
