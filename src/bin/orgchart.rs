use clap::Parser;
use tracing_subscriber::EnvFilter;
use orgchart::cli::{Cli, OutputFormat};
use orgchart::config::Config;
use orgchart::record::load_records;
use orgchart::search::SearchSession;
use orgchart::view::{hierarchy_path, initials};
use orgchart::{CollapseSet, count_employees, print_tree, to_json_string, try_build_hierarchy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let config = Config::from(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = &args.file_path;
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()).into());
    }

    let records = load_records(path)?;
    let text = config.format == OutputFormat::Text;
    if text {
        println!("Loaded {} employee records from {}", records.len(), path.display());
    }

    let start = std::time::Instant::now();
    let tree = match try_build_hierarchy(&records, &config.build) {
        Ok(tree) => tree,
        Err(e) if e.is_empty_chart() => {
            println!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if text {
        println!("Hierarchy built in {:?}", start.elapsed());
        println!("{} employees in the chart", count_employees(Some(tree.root())));
    }

    let mut collapsed = CollapseSet::new();
    if args.collapse_all {
        collapsed.collapse_all(tree.root());
    }
    for id in &args.expand {
        if !collapsed.reveal(tree.root(), id) {
            eprintln!("No employee with id {} in the chart", id);
        }
    }

    let session = args
        .search
        .as_deref()
        .map(|term| SearchSession::run(&tree, term))
        .unwrap_or_default();
    if text && args.search.is_some() {
        println!("\nSearch \"{}\": {}", session.term(), session.summary());
        for (i, result) in session.results(&tree).enumerate() {
            println!(
                "  {:>2}. [{}] {} ({})",
                i + 1,
                initials(result.name()),
                result.name(),
                hierarchy_path(result.employee())
            );
        }
    }
    if let Some(id) = session
        .highlighted()
        .and_then(|idx| tree.node(idx))
        .and_then(|node| node.id())
    {
        collapsed.expand_path_to_node(tree.root(), id);
    }

    match config.format {
        OutputFormat::Text => {
            println!("\nOrganization Chart:\n{}", "=".repeat(40));
            print_tree(tree.root(), &collapsed, config.info_level);
        }
        OutputFormat::Json => {
            let matches: Vec<_> = session.results(&tree).map(|node| node.id()).collect();
            // the tree goes through the stack-free writer, everything else through serde
            let report = format!(
                "{{\"tree\":{},\"collapsed\":{},\"search\":{},\"diagnostics\":{}}}",
                to_json_string(tree.root())?,
                serde_json::to_string(&collapsed)?,
                serde_json::to_string(&matches)?,
                serde_json::to_string(tree.diagnostics())?,
            );
            println!("{}", report);
            return Ok(());
        }
    }

    let diagnostics = tree.diagnostics();
    let sections = [
        ("Orphaned employees (no manager found)", &diagnostics.orphans),
        ("Duplicate ids (earlier records dropped)", &diagnostics.duplicate_ids),
        ("Other root candidates (ignored)", &diagnostics.superseded_roots),
        ("Detached employees (manager chain never reaches the root)", &diagnostics.detached),
    ];
    for (heading, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        println!("\n{}:", heading);
        for entry in entries {
            println!("  {}", entry);
        }
    }

    Ok(())
}
