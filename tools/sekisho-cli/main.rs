use clap::{Parser, ValueEnum};
use sekisho::error::GraphConversionError;
use sekisho::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match a raw canvas export (`nodes`/`edges`) and are only used here for conversion.

#[derive(Deserialize)]
struct RawCanvas {
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    data: RawNodeData,
}

#[derive(Deserialize, Default)]
struct RawNodeData {
    #[serde(default, alias = "templateId")]
    template_id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    config: Map<String, JsonValue>,
}

#[derive(Deserialize)]
struct RawEdge {
    id: String,
    source: String,
    target: String,
    #[serde(default, alias = "sourceHandle")]
    source_handle: Option<String>,
    #[serde(default, alias = "targetHandle")]
    target_handle: Option<String>,
}

// --- Converter Implementation ---
// This implements the conversion from the raw canvas model to Sekisho's canonical GuardrailGraph.

impl IntoGraph for RawCanvas {
    fn into_graph(self) -> std::result::Result<GuardrailGraph, GraphConversionError> {
        let blocks = self
            .nodes
            .into_iter()
            .map(|node| {
                let kind: BlockKind = serde_json::from_value(JsonValue::String(node.node_type.clone()))
                    .map_err(|_| {
                        GraphConversionError::Invalid(format!(
                            "node '{}' has unknown type '{}'",
                            node.id, node.node_type
                        ))
                    })?;
                let mut block = Block::new(node.id, kind, node.data.template_id);
                block.name = node.data.label;
                block.config = node.data.config;
                Ok(block)
            })
            .collect::<std::result::Result<Vec<_>, GraphConversionError>>()?;

        let connections = self
            .edges
            .into_iter()
            .map(|edge| {
                let handle = edge.source_handle.unwrap_or_else(|| "output".to_string());
                let connection = Connection::new(edge.id, edge.source, handle, edge.target);
                match edge.target_handle {
                    Some(target_handle) => connection.with_target_handle(target_handle),
                    None => connection,
                }
            })
            .collect();

        Ok(GuardrailGraph::new(blocks, connections))
    }
}

/// The on-disk shape of the guardrail file.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraphFormat {
    /// A stored guardrail document (`blocks`/`connections`)
    Definition,
    /// A raw canvas export (`nodes`/`edges`)
    Canvas,
}

/// Evaluate requests against a guardrail block graph
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the guardrail JSON file
    graph_path: Option<String>,
    /// The message to evaluate
    message: Option<String>,

    /// Role of the requesting user
    #[arg(short, long)]
    role: Option<String>,

    /// Request context as a JSON object
    #[arg(long)]
    context: Option<String>,

    /// Path to an engine configuration JSON file
    #[arg(long)]
    config: Option<String>,

    /// Override the evaluation budget in milliseconds (0 disables it)
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Format of the guardrail file
    #[arg(short, long, value_enum, default_value = "definition")]
    format: GraphFormat,

    /// Print the evaluation result as JSON instead of a readable trace
    #[arg(long)]
    json: bool,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sekisho=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.human {
        run_interactive(cli);
    } else {
        run_non_interactive(cli);
    }
}

/// Reads the guardrail file in the requested format. Returns the guardrail id and its graph.
fn load_graph(path: &str, format: GraphFormat) -> (String, GuardrailGraph) {
    match format {
        GraphFormat::Definition => {
            let definition = GuardrailDefinition::from_file(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load guardrail from '{}': {}", path, e))
            });
            eprintln!(
                "Loaded guardrail '{}' (version {}, {} blocks, {} connections)",
                definition.name,
                definition.version,
                definition.graph.blocks.len(),
                definition.graph.connections.len()
            );
            (definition.id, definition.graph)
        }
        GraphFormat::Canvas => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read canvas file '{}': {}", path, e))
            });
            let canvas: RawCanvas = serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse canvas JSON: {}", e)));
            let graph = canvas.into_graph().unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to convert canvas to graph: {}", e))
            });
            (path.to_string(), graph)
        }
    }
}

fn load_config(config_path: Option<&str>, budget_ms: Option<u64>) -> EngineConfig {
    let mut config = match config_path {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load configuration: {}", e))
        }),
        None => EngineConfig::default(),
    };
    if let Some(ms) = budget_ms {
        config.budget_ms = (ms > 0).then_some(ms);
    }
    config
}

fn parse_context(context: Option<&str>) -> Option<Map<String, JsonValue>> {
    context.map(|raw| {
        serde_json::from_str::<Map<String, JsonValue>>(raw).unwrap_or_else(|e| {
            exit_with_error(&format!("Context must be a JSON object: {}", e))
        })
    })
}

fn run_evaluation(
    graph_path: &str,
    format: GraphFormat,
    input: EvaluationInput,
    config: EngineConfig,
    as_json: bool,
) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let (guardrail_id, graph) = load_graph(graph_path, format);
    let load_duration = load_start.elapsed();

    // --- 2. Validation ---
    let engine = Engine::new(config);
    let validate_start = Instant::now();
    let prepared = engine.prepare(guardrail_id, &graph).unwrap_or_else(|e| {
        exit_with_error(&format!("Cannot run this guardrail: {} [{}]", e, e.code()))
    });
    let validate_duration = validate_start.elapsed();

    // --- 3. Evaluation ---
    let result = prepared.evaluate(&input);

    // --- 4. Results and Summary ---
    if as_json {
        let json = serde_json::to_string_pretty(&result)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
        println!("{}", json);
        return;
    }

    println!("\nEvaluation Finished!");
    println!("{}", TraceFormatter::format_result(&result));

    let total_duration = total_start.elapsed();
    println!("\n--- Performance Summary ---");
    println!("File Loading:         {:?}", load_duration);
    println!("Validation:           {:?}", validate_duration);
    println!("Evaluation:           {:?}", result.total_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_duration);
    println!();
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let graph_path = cli.graph_path.unwrap_or_else(|| {
        exit_with_error("Guardrail path is required in non-interactive mode.");
    });
    let message = cli.message.unwrap_or_else(|| {
        exit_with_error("A message is required in non-interactive mode.");
    });

    let mut input = EvaluationInput::new(message);
    input.user_role = cli.role;
    input.context = parse_context(cli.context.as_deref());

    let config = load_config(cli.config.as_deref(), cli.budget_ms);
    run_evaluation(&graph_path, cli.format, input, config, cli.json);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(cli: Cli) {
    println!("--- Sekisho Interactive Mode ---");

    let graph_path = prompt_for_input("Enter guardrail path", Some("data/guardrail.json"));
    let message = prompt_for_input("Enter the message to evaluate", None);
    let role = prompt_for_input("Enter the user role (optional)", Some(""));
    let context = prompt_for_input("Enter the context as JSON (optional)", Some(""));

    let mut input = EvaluationInput::new(message);
    input.user_role = (!role.is_empty()).then_some(role);
    input.context = parse_context((!context.is_empty()).then_some(context.as_str()));

    let config = load_config(cli.config.as_deref(), cli.budget_ms);
    run_evaluation(&graph_path, cli.format, input, config, cli.json);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = match default {
        Some(d) if !d.is_empty() => format!(" [default: {}]", d),
        _ => String::new(),
    };

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }
    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
