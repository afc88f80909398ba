use clap::Parser;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fs;
use uuid::Uuid;
use windmill::prelude::*;

/// A CLI tool to generate random but well-formed WML files for testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated WML file to
    #[arg(short, long, default_value = "generated.wml")]
    output: String,

    /// Number of operator nodes to generate
    #[arg(long, default_value_t = 8)]
    nodes: usize,

    /// Probability of linking each node to a later one
    #[arg(long, default_value_t = 0.6)]
    density: f64,
}

const OPERATOR_TYPES: &[&str] = &[
    "BashOperator",
    "PythonOperator",
    "BranchPythonOperator",
    "EmailOperator",
    "SimpleHttpOperator",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !(0.0..=1.0).contains(&cli.density) {
        eprintln!("Error: --density ({}) must be within 0..=1", cli.density);
        std::process::exit(1);
    }

    let mut rng = rand::rng();
    println!("Generating a workflow with {} nodes...", cli.nodes);

    let mut nodes = AHashMap::new();
    let mut order = Vec::new();
    for i in 0..cli.nodes {
        let node = generate_node(&mut rng, i);
        order.push(node.id.clone());
        nodes.insert(node.id.clone(), node);
    }

    // Links only run from earlier nodes to later ones, so the result is a
    // DAG by construction.
    let mut links = AHashMap::new();
    for (i, from) in order.iter().enumerate() {
        for to in order.iter().skip(i + 1) {
            if rng.random_bool(cli.density / (cli.nodes as f64)) {
                let id = Uuid::new_v4().to_string();
                links.insert(
                    id.clone(),
                    Link {
                        id,
                        from: LinkEndpoint::new(from.clone(), "port2"),
                        to: Some(LinkEndpoint::new(to.clone(), "port1")),
                    },
                );
            }
        }
    }

    let wml = WmlFile {
        filename: "generated".to_string(),
        dag: DagMetadata {
            name: None,
            description: Some("Randomly generated workflow".to_string()),
            parameters: vec![OperatorParameter {
                id: "schedule_interval".to_string(),
                kind: ParameterKind::Str,
                value: Some("@daily".to_string()),
                default: Some("@daily".to_string()),
                description: None,
                required: false,
                inherited_from: None,
            }],
        },
        nodes,
        links,
    };

    wml.validate()?;
    let json_output = serde_json::to_string_pretty(&wml)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved a workflow with {} links to '{}'",
        wml.links.len(),
        cli.output
    );

    Ok(())
}

fn generate_node(rng: &mut ThreadRng, index: usize) -> Node {
    let op_type = OPERATOR_TYPES[rng.random_range(0..OPERATOR_TYPES.len())];
    Node {
        id: Uuid::new_v4().to_string(),
        position: Point::new(
            rng.random_range(0.0..2000.0),
            200.0 * index as f64 + rng.random_range(0.0..150.0),
        ),
        orientation: 0,
        op_type: op_type.to_string(),
        ports: Port::default_pair(),
        properties: Some(OperatorProperties {
            name: Some(format!("task_{}", index)),
            module: None,
            description: None,
            parameters: vec![OperatorParameter {
                id: "task_id".to_string(),
                kind: ParameterKind::Str,
                value: Some(format!("task_{}", index)),
                default: None,
                description: None,
                required: true,
                inherited_from: None,
            }],
        }),
        size: None,
    }
}
