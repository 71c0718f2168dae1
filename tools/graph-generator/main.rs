use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sekisho::graph::{Block, BlockKind, Connection, GuardrailDefinition, GuardrailGraph};
use sekisho::validator;
use serde_json::json;

const KEYWORDS: &[&str] = &[
    "salary", "password", "ssn", "merger", "layoff", "diagnosis", "invoice", "credentials",
];
const ROLES: &[&str] = &["admin", "hr", "finance", "manager", "engineer"];
const PATTERNS: &[&str] = &[r"\b\d{3}-\d{2}-\d{4}\b", r"\b[A-Z]{2}\d{6}\b", r"api[_-]?key"];
const ACTIONS: &[(&str, &str)] = &[
    ("action-block", "message"),
    ("action-warn", "warning"),
    ("action-allow", ""),
    ("action-approval", "approvers"),
];

/// A CLI tool to generate random, valid guardrail graphs for the Sekisho engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_guardrail.json")]
    output: String,

    /// The minimum number of condition blocks to generate
    #[arg(long, default_value_t = 2)]
    min: usize,

    /// The maximum number of condition blocks to generate
    #[arg(long, default_value_t = 12)]
    max: usize,

    /// Seed for reproducible graphs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.min == 0 || cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) must be at least 1 and not greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let condition_count = rng.random_range(cli.min..=cli.max);

    println!(
        "Generating guardrail with {} condition block(s) (seed {})...",
        condition_count, seed
    );

    let graph = generate_graph(&mut rng, condition_count);
    validator::validate(&graph)?;

    let mut definition = GuardrailDefinition::new(
        format!("generated-{}", seed),
        format!("Generated guardrail #{}", seed),
        graph,
    );
    definition.description = format!("{} conditions, seed {}", condition_count, seed);
    definition.is_active = true;
    definition.save(&cli.output)?;

    println!(
        "Successfully generated and saved guardrail to '{}' ({} blocks, {} connections)",
        cli.output,
        definition.graph.blocks.len(),
        definition.graph.connections.len()
    );

    Ok(())
}

/// Builds a layered graph: one input, a chain of conditions whose branches lead
/// to later conditions or to actions, and an optional OR gate over two conditions.
fn generate_graph(rng: &mut StdRng, condition_count: usize) -> GuardrailGraph {
    let mut blocks = vec![Block::new("input", BlockKind::Input, "input-message").at(0.0, 0.0)];
    let mut connections = Vec::new();
    let mut next_connection = {
        let mut counter = 0usize;
        move || {
            counter += 1;
            format!("conn-{}", counter)
        }
    };

    let action_ids: Vec<String> = ACTIONS
        .iter()
        .map(|(template, _)| template.trim_start_matches("action-").to_string())
        .collect();

    let condition_ids: Vec<String> = (0..condition_count).map(|i| format!("cond-{}", i)).collect();
    for (i, id) in condition_ids.iter().enumerate() {
        blocks.push(generate_condition(rng, id).at(200.0, 120.0 * i as f64));
    }

    // Every condition gets exactly one incoming edge: from the input or an earlier condition's branch.
    for (i, id) in condition_ids.iter().enumerate() {
        if i == 0 || rng.random_bool(0.3) {
            connections.push(Connection::new(next_connection(), "input", "output", id.as_str()));
        } else {
            let parent = &condition_ids[rng.random_range(0..i)];
            let handle = if rng.random_bool(0.5) { "true" } else { "false" };
            connections.push(Connection::new(next_connection(), parent.as_str(), handle, id.as_str()));
        }
    }

    // Branches that lead nowhere yet go to a random action.
    for id in &condition_ids {
        for handle in ["true", "false"] {
            let used = connections
                .iter()
                .any(|c| c.source_block_id == *id && c.source_handle == handle);
            if !used {
                let preferred = if handle == "true" { 0 } else { 2 };
                let target = if rng.random_bool(0.7) {
                    &action_ids[preferred]
                } else {
                    action_ids.choose(rng).unwrap_or(&action_ids[0])
                };
                connections.push(Connection::new(next_connection(), id.as_str(), handle, target.as_str()));
            }
        }
    }

    if condition_count >= 2 && rng.random_bool(0.5) {
        let picks: Vec<&String> = condition_ids.choose_multiple(rng, 2).collect();
        blocks.push(Block::new("gate", BlockKind::Logic, "logic-or").at(400.0, 0.0));
        for pick in picks {
            connections.push(Connection::new(next_connection(), pick.as_str(), "true", "gate"));
        }
        connections.push(Connection::new(next_connection(), "gate", "output", action_ids[1].as_str()));
    }

    for (i, ((template, key), id)) in ACTIONS.iter().zip(&action_ids).enumerate() {
        let mut block = Block::new(id.as_str(), BlockKind::Action, *template).at(600.0, 120.0 * i as f64);
        block = match *key {
            "message" => block.with_config(key, json!("Request blocked by generated policy")),
            "warning" => block.with_config(key, json!("Request touches a monitored topic")),
            "approvers" => block.with_config(key, json!(["security-team"])),
            _ => block,
        };
        blocks.push(block);

        // Unreached actions hang off the input so the graph stays valid.
        if !connections.iter().any(|c| c.target_block_id == *id) {
            connections.push(Connection::new(next_connection(), "input", "output", id.as_str()));
        }
    }

    GuardrailGraph::new(blocks, connections)
}

fn generate_condition(rng: &mut StdRng, id: &str) -> Block {
    match rng.random_range(0..3) {
        0 => {
            let count = rng.random_range(1..=3);
            let keywords: Vec<&str> = KEYWORDS.choose_multiple(rng, count).copied().collect();
            let mode = if rng.random_bool(0.8) { "any" } else { "all" };
            Block::new(id, BlockKind::Condition, "contains-keywords")
                .with_config("keywords", json!(keywords))
                .with_config("matchMode", json!(mode))
        }
        1 => {
            let count = rng.random_range(1..=2);
            let roles: Vec<&str> = ROLES.choose_multiple(rng, count).copied().collect();
            Block::new(id, BlockKind::Condition, "check-role").with_config("allowedRoles", json!(roles))
        }
        _ => {
            let pattern = PATTERNS.choose(rng).copied().unwrap_or(PATTERNS[0]);
            Block::new(id, BlockKind::Condition, "regex-match").with_config("pattern", json!(pattern))
        }
    }
}
