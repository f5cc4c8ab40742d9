//! Sovereign — iteration framework CLI.
//!
//! Usage:
//!   sovereign new <workflow> <name> <description>   Create a workflow
//!   sovereign add <workflow> <parent> <step> ...    Add a step
//!   sovereign choose <workflow> <from> <to> ...     Record a choice
//!   sovereign suggest <workflow>                    Rank next steps
//!   sovereign status <workflow>                     Show workflow status
//!   sovereign show <workflow> --format ascii        Render the tree

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use sovereign::collab::TracingEventSink;
use sovereign::config::{self, SovereignConfig};
use sovereign::optimizer::RecommendedAction;
use sovereign::types::{NodeKind, NodeStatus};
use sovereign::visualizer::TreeVisualizer;
use sovereign::workflow::{BranchSpec, SovereignWorkflowManager};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "sovereign")]
#[command(version = "0.1.0")]
#[command(about = "Branching decision trees scored for truth alignment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the sovereign home directory.
    #[arg(long, default_value = "~/.sovereign")]
    home: String,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new workflow with a root node.
    New {
        workflow_id: String,
        name: String,
        description: String,
    },

    /// Add a step under an existing step.
    Add {
        workflow_id: String,
        parent_id: String,
        step_id: String,
        name: String,
        description: String,

        /// Node kind: action, state, decision, or milestone.
        #[arg(long, default_value = "action")]
        kind: String,
    },

    /// Create decision branches under a step.
    Branch {
        workflow_id: String,
        from_step_id: String,

        /// Branch spec `id:name:description`; repeatable.
        #[arg(long = "option", required = true)]
        options: Vec<String>,
    },

    /// Execute a step (activates it, then marks it completed).
    Exec {
        workflow_id: String,
        step_id: String,

        /// JSON context passed to any registered handler.
        #[arg(long, default_value = "{}")]
        context: String,
    },

    /// Record a sovereign choice and navigate to the destination.
    Choose {
        workflow_id: String,
        from_step_id: String,
        to_step_id: String,
        rationale: String,
    },

    /// Rank candidate next steps from the active node.
    Suggest {
        workflow_id: String,

        /// Maximum suggestions to show (config default if omitted).
        #[arg(long)]
        max: Option<usize>,
    },

    /// Recommend the next action to take.
    Recommend { workflow_id: String },

    /// Show a workflow's status.
    Status { workflow_id: String },

    /// Render a workflow's tree.
    Show {
        workflow_id: String,

        /// Output format: ascii, dot, or mermaid.
        #[arg(long, default_value = "ascii")]
        format: String,

        /// Maximum depth for ascii rendering.
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Export a workflow's full history as JSON.
    History { workflow_id: String },

    /// List known workflows.
    Trees,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let home_dir = PathBuf::from(shellexpand::tilde(&cli.home).into_owned());
    let (config, mut manager) = open_manager(&home_dir)?;

    match cli.command {
        Commands::New {
            workflow_id,
            name,
            description,
        } => cmd_new(&mut manager, &workflow_id, &name, &description),
        Commands::Add {
            workflow_id,
            parent_id,
            step_id,
            name,
            description,
            kind,
        } => cmd_add(&mut manager, &workflow_id, &parent_id, &step_id, &name, &description, &kind),
        Commands::Branch {
            workflow_id,
            from_step_id,
            options,
        } => cmd_branch(&mut manager, &workflow_id, &from_step_id, &options),
        Commands::Exec {
            workflow_id,
            step_id,
            context,
        } => cmd_exec(&mut manager, &workflow_id, &step_id, &context),
        Commands::Choose {
            workflow_id,
            from_step_id,
            to_step_id,
            rationale,
        } => cmd_choose(&mut manager, &workflow_id, &from_step_id, &to_step_id, &rationale),
        Commands::Suggest { workflow_id, max } => {
            cmd_suggest(&manager, &workflow_id, max.unwrap_or(config.max_suggestions))
        }
        Commands::Recommend { workflow_id } => cmd_recommend(&manager, &workflow_id),
        Commands::Status { workflow_id } => cmd_status(&manager, &workflow_id),
        Commands::Show {
            workflow_id,
            format,
            depth,
        } => cmd_show(&manager, &workflow_id, &format, depth),
        Commands::History { workflow_id } => cmd_history(&manager, &workflow_id),
        Commands::Trees => cmd_trees(&manager),
    }
}

/// Load config and open the workflow manager over its storage directory.
fn open_manager(home_dir: &Path) -> Result<(SovereignConfig, SovereignWorkflowManager)> {
    let config = config::load_config(&home_dir.join("sovereign.toml"))?;
    let storage_dir = PathBuf::from(config.resolved_storage_dir());

    let mut manager = SovereignWorkflowManager::new(&storage_dir)
        .with_context(|| format!("Failed to open storage at {}", storage_dir.display()))?
        .with_event_sink(Box::new(TracingEventSink));

    for truth in &config.truths {
        manager.optimizer_mut().register_truth(truth.clone());
    }

    Ok((config, manager))
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_new(
    manager: &mut SovereignWorkflowManager,
    workflow_id: &str,
    name: &str,
    description: &str,
) -> Result<()> {
    manager.create_workflow(workflow_id, name, description)?;
    manager.save_memory()?;
    println!(
        "{} Created workflow '{}' with root node",
        ">>>".green().bold(),
        workflow_id
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_add(
    manager: &mut SovereignWorkflowManager,
    workflow_id: &str,
    parent_id: &str,
    step_id: &str,
    name: &str,
    description: &str,
    kind: &str,
) -> Result<()> {
    let node = manager.add_workflow_step(
        workflow_id,
        parent_id,
        step_id,
        name,
        description,
        parse_kind(kind)?,
        Default::default(),
    )?;
    manager.save_memory()?;
    println!(
        "{} Added {} '{}' under '{}' (resonance {:.2})",
        ">>>".green().bold(),
        node.kind,
        step_id,
        parent_id,
        node.resonance_score
    );
    Ok(())
}

fn cmd_branch(
    manager: &mut SovereignWorkflowManager,
    workflow_id: &str,
    from_step_id: &str,
    options: &[String],
) -> Result<()> {
    let specs = options
        .iter()
        .map(|raw| parse_branch_spec(raw))
        .collect::<Result<Vec<_>>>()?;

    let created = manager.branch_workflow(workflow_id, from_step_id, &specs)?;
    manager.save_memory()?;

    println!(
        "{} Created {} branches under '{}':",
        ">>>".green().bold(),
        created.len(),
        from_step_id
    );
    for node in created {
        println!("  {} {} (resonance {:.2})", "-".dimmed(), node.node_id, node.resonance_score);
    }
    Ok(())
}

fn cmd_exec(
    manager: &mut SovereignWorkflowManager,
    workflow_id: &str,
    step_id: &str,
    context: &str,
) -> Result<()> {
    let context: serde_json::Value =
        serde_json::from_str(context).context("Invalid --context JSON")?;

    let outcome = manager.execute_step(workflow_id, step_id, &context)?;
    manager.save_memory()?;

    if outcome.completed {
        println!("{} Step '{}' completed", ">>>".green().bold(), step_id);
    } else {
        println!(
            "{} Step '{}' abandoned: {}",
            "!!!".red().bold(),
            step_id,
            outcome.error.unwrap_or_else(|| "unknown error".into())
        );
    }
    Ok(())
}

fn cmd_choose(
    manager: &mut SovereignWorkflowManager,
    workflow_id: &str,
    from_step_id: &str,
    to_step_id: &str,
    rationale: &str,
) -> Result<()> {
    let choice = manager.choose_path(workflow_id, from_step_id, to_step_id, rationale)?;
    println!(
        "{} Chose '{}' -> '{}' (resonance {:.2})",
        ">>>".green().bold(),
        choice.from_node_id,
        choice.to_node_id,
        choice.resonance_score
    );
    Ok(())
}

fn cmd_suggest(manager: &SovereignWorkflowManager, workflow_id: &str, max: usize) -> Result<()> {
    let suggestions = manager.get_next_steps(workflow_id, max);

    if suggestions.is_empty() {
        println!("No viable next steps.");
        return Ok(());
    }

    println!("{}", "Next steps, best first:".bold());
    for (i, s) in suggestions.iter().enumerate() {
        println!(
            "  {}. {} [{}] {:.3} — {}",
            i + 1,
            s.step_id.bold(),
            colorize_status(s.status),
            s.resonance_score,
            s.name
        );
    }
    Ok(())
}

fn cmd_recommend(manager: &SovereignWorkflowManager, workflow_id: &str) -> Result<()> {
    let tree = manager
        .get_tree(workflow_id)
        .with_context(|| format!("Workflow '{workflow_id}' not found"))?;

    let Some(rec) = manager.optimizer().recommend_action(tree) else {
        bail!("Tree state is inconsistent; no recommendation");
    };

    let action = match rec.action {
        RecommendedAction::CreateRoot => "create-root".cyan(),
        RecommendedAction::Branch => "branch".yellow(),
        RecommendedAction::Complete => "complete".magenta(),
        RecommendedAction::Navigate => "navigate".green(),
    };

    println!("{}: {}", "Recommendation".bold(), action.bold());
    if let Some(node_id) = &rec.node_id {
        println!("  Node:       {}", node_id);
    }
    println!("  Reason:     {}", rec.reason);
    println!("  Confidence: {:.3}", rec.confidence);
    if !rec.alternatives.is_empty() {
        println!("  Alternatives:");
        for alt in &rec.alternatives {
            println!("    {} ({:.3})", alt.node_id, alt.score);
        }
    }
    Ok(())
}

fn cmd_status(manager: &SovereignWorkflowManager, workflow_id: &str) -> Result<()> {
    let status = manager.get_workflow_status(workflow_id)?;

    println!();
    println!("{}", format!("=== Workflow: {} ===", status.workflow_id).bold());
    println!();
    println!("  {}:   {}", "Name".bold(), status.name);
    println!("  {}: {}", "Status".bold(), status.status);
    println!();
    println!("  {}:", "Tree".bold());
    println!("    Nodes:  {}", status.statistics.total_nodes);
    for (kind, count) in &status.statistics.nodes_by_kind {
        println!("      {:10} {}", format!("{kind}:"), count);
    }
    println!("    By status:");
    for (s, count) in &status.statistics.nodes_by_status {
        println!("      {:10} {}", format!("{s}:"), count);
    }
    println!();
    println!("  {}:", "Active path".bold());
    for step in &status.active_path {
        println!("    {} {}", "→".dimmed(), format!("{} ({})", step.name, step.step_id));
    }
    if !status.next_suggestions.is_empty() {
        println!();
        println!("  {}:", "Suggested next".bold());
        for s in &status.next_suggestions {
            println!("    {} ({:.3})", s.step_id, s.resonance_score);
        }
    }
    println!();
    Ok(())
}

fn cmd_show(
    manager: &SovereignWorkflowManager,
    workflow_id: &str,
    format: &str,
    depth: Option<usize>,
) -> Result<()> {
    let tree = manager
        .get_tree(workflow_id)
        .with_context(|| format!("Workflow '{workflow_id}' not found"))?;

    let viz = TreeVisualizer::new(tree);
    let output = match format {
        "ascii" => viz.to_ascii(depth),
        "dot" => viz.to_dot(),
        "mermaid" => viz.to_mermaid(),
        other => bail!("Unknown format '{}'. Use ascii, dot, or mermaid.", other),
    };

    println!("{output}");
    Ok(())
}

fn cmd_history(manager: &SovereignWorkflowManager, workflow_id: &str) -> Result<()> {
    let history = manager.export_workflow_history(workflow_id)?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

fn cmd_trees(manager: &SovereignWorkflowManager) -> Result<()> {
    if manager.workflows().is_empty() {
        println!("No workflows yet. Create one with `sovereign new`.");
        return Ok(());
    }

    println!("{}", "Workflows:".bold());
    for (id, record) in manager.workflows() {
        let nodes = manager
            .get_tree(id)
            .map(|t| t.nodes.len())
            .unwrap_or(0);
        println!(
            "  {} — {} ({} nodes, {})",
            id.bold(),
            record.name,
            nodes,
            record.status
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_kind(raw: &str) -> Result<NodeKind> {
    match raw {
        "action" => Ok(NodeKind::Action),
        "state" => Ok(NodeKind::State),
        "decision" => Ok(NodeKind::Decision),
        "milestone" => Ok(NodeKind::Milestone),
        other => bail!("Unknown node kind '{}'. Use action, state, decision, or milestone.", other),
    }
}

/// Parse a `--option` value of the form `id:name:description`.
fn parse_branch_spec(raw: &str) -> Result<BranchSpec> {
    let mut parts = raw.splitn(3, ':');
    let (Some(step_id), Some(name), Some(description)) =
        (parts.next(), parts.next(), parts.next())
    else {
        bail!("Invalid branch spec '{}'. Expected id:name:description.", raw);
    };

    Ok(BranchSpec {
        step_id: step_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        metadata: Default::default(),
    })
}

fn colorize_status(status: NodeStatus) -> String {
    match status {
        NodeStatus::Pending => "pending".yellow().to_string(),
        NodeStatus::Active => "active".green().to_string(),
        NodeStatus::Completed => "completed".blue().to_string(),
        NodeStatus::Abandoned => "abandoned".red().to_string(),
    }
}
