use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use querygraph::config::BuilderConfig;
use querygraph::domain_model::DomainModel;
use querygraph::navigation_plan::NavigationPlan;

/// QueryGraph - Build a query expression graph from a navigation plan
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Domain model YAML file
    #[arg(long)]
    model: PathBuf,

    /// Navigation plan YAML file
    #[arg(long)]
    plan: PathBuf,

    /// Builder configuration YAML file (environment variables are used otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the tree snapshot as JSON instead of the from-clause
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BuilderConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => BuilderConfig::from_env().context("Invalid configuration in environment")?,
    };

    let model = DomainModel::from_yaml_file(&cli.model)
        .with_context(|| format!("Failed to load domain model from {}", cli.model.display()))?;
    log::info!("Loaded domain model with {} types", model.type_names().count());

    let plan = NavigationPlan::from_yaml_file(&cli.plan)
        .with_context(|| format!("Failed to load navigation plan from {}", cli.plan.display()))?;

    let alias_prefix = config.alias_prefix.clone();
    let tree = plan.build(&model, config).context("Failed to build query tree")?;

    if cli.json {
        let snapshot = tree.snapshot(&alias_prefix);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", tree.render_from_clause(&alias_prefix));
        for (position, join) in tree.join_ledger().iter().enumerate() {
            let node = tree.node(*join);
            println!(
                "  {:>2}. {:<12} {} -> {}",
                position + 1,
                node.kind().label(),
                node.path(),
                node.referenced_type()
            );
        }
    }

    Ok(())
}
