//! arangraph CLI: shows the AQL a graph session would send
//!
//! Reads a graph configuration and renders traversal queries offline; no
//! database is contacted.

use arangraph::client::CollectionNaming;
use arangraph::{
    Comparator, Direction, DocumentHandle, EdgeDefinition, GraphConfig, GraphDefinition,
    PropertyFilter, PropertyValue, QueryContext, QueryDescriptor, RenderedQuery,
};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arangraph", version, about = "Render arangraph queries for a graph configuration")]
struct Cli {
    /// Graph configuration (YAML)
    #[arg(long, default_value = "graph.yaml", global = true, env = "ARANGRAPH_CONFIG")]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Vertices of the graph
    Vertices(Selection),
    /// Edges of the graph
    Edges(Selection),
    /// Edges incident to a vertex
    Adjacent {
        /// Start vertex handle, `<collection>/<key>`
        #[arg(long)]
        from: String,

        /// in, out or both
        #[arg(long, default_value = "both")]
        direction: String,

        #[command(flatten)]
        selection: Selection,
    },
    /// Vertices adjacent to a vertex
    Neighbors {
        /// Start vertex handle, `<collection>/<key>`
        #[arg(long)]
        from: String,

        /// in, out or both
        #[arg(long, default_value = "both")]
        direction: String,

        #[command(flatten)]
        selection: Selection,
    },
    /// Graph definition the configuration registers
    Schema,
}

#[derive(Args)]
struct Selection {
    /// Restrict to these keys
    #[arg(long = "key")]
    keys: Vec<String>,

    /// Restrict to these collection labels
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Property predicate such as `name=marko` or `age>=30`
    #[arg(long = "has")]
    has: Vec<String>,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<u32>,

    /// Count the results instead of returning them
    #[arg(long)]
    count: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = GraphConfig::from_file(&cli.config)?;
    config.validate()?;
    debug!("Loaded configuration for graph {}", config.graph_name);

    let descriptor = match &cli.command {
        Commands::Schema => return print_schema(&config, &cli.format),
        Commands::Vertices(selection) => selection.apply(QueryDescriptor::vertices())?,
        Commands::Edges(selection) => selection.apply(QueryDescriptor::edges())?,
        Commands::Adjacent { from, direction, selection } => {
            let direction: Direction = direction.parse()?;
            selection.apply(QueryDescriptor::vertex_edges(DocumentHandle::new(from.as_str()), direction))?
        }
        Commands::Neighbors { from, direction, selection } => {
            let direction: Direction = direction.parse()?;
            selection.apply(QueryDescriptor::vertex_neighbors(DocumentHandle::new(from.as_str()), direction))?
        }
    };

    let naming = CollectionNaming::new(config.graph_name.as_str(), config.prefix_collection_names);
    let ctx = QueryContext::new(naming, &config.vertex_collections, &config.edge_collections);
    print_query(&descriptor.render(&ctx), &cli.format)
}

impl Selection {
    fn apply(&self, descriptor: QueryDescriptor) -> Result<QueryDescriptor, String> {
        let mut filter = PropertyFilter::new();
        for text in &self.has {
            let (key, comparator, value) = parse_has(text)?;
            filter.has(key, value, comparator);
        }
        let mut descriptor = descriptor
            .with_keys(&self.keys)
            .with_labels(&self.labels)
            .with_filter(filter)
            .with_count(self.count);
        if let Some(limit) = self.limit {
            descriptor = descriptor.with_limit(limit);
        }
        Ok(descriptor)
    }
}

/// Split `key<op>value`; the value is read as JSON when it parses, else as text
fn parse_has(text: &str) -> Result<(String, Comparator, PropertyValue), String> {
    const OPERATORS: [&str; 7] = ["==", "!=", ">=", "<=", "=", ">", "<"];
    let (position, operator) = OPERATORS
        .iter()
        .filter_map(|op| text.find(op).map(|pos| (pos, *op)))
        .min_by_key(|(pos, op)| (*pos, std::cmp::Reverse(op.len())))
        .ok_or_else(|| format!("expected key=value, got {:?}", text))?;

    let key = text[..position].trim();
    if key.is_empty() {
        return Err(format!("missing property key in {:?}", text));
    }
    let raw = text[position + operator.len()..].trim();
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(|json| PropertyValue::from_json(&json))
        .unwrap_or_else(|_| PropertyValue::from(raw));
    Ok((key.to_string(), operator.parse()?, value))
}

fn print_query(rendered: &RenderedQuery, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "query": rendered.query,
                "bindVars": rendered.bind_vars,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("{}\n", rendered.query);
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Parameter", "Value"]);
            for (name, value) in &rendered.bind_vars {
                table.add_row(vec![name.clone(), serde_json::to_string(value)?]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_schema(config: &GraphConfig, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let naming = CollectionNaming::new(config.graph_name.as_str(), config.prefix_collection_names);
    let definitions: Vec<EdgeDefinition> = EdgeDefinition::resolve(
        &config.relations,
        &config.vertex_collections,
        &config.edge_collections,
    )?
    .iter()
    .map(|d| d.to_database(&naming))
    .collect();
    let graph = GraphDefinition::new(
        config.graph_name.as_str(),
        definitions,
        &naming.resolve_all(&config.vertex_collections),
        &naming.resolve_all(&config.orphan_collections),
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Edge collection", "From", "To"]);
            for definition in &graph.edge_definitions {
                table.add_row(vec![
                    definition.collection.clone(),
                    join(&definition.from),
                    join(&definition.to),
                ]);
            }
            println!("{}", table);
            if !graph.orphan_collections.is_empty() {
                println!("Orphans: {}", graph.orphan_collections.join(", "));
            }
        }
    }
    Ok(())
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_has() {
        let (key, cmp, value) = parse_has("name=marko").unwrap();
        assert_eq!(key, "name");
        assert_eq!(cmp, Comparator::Equal);
        assert_eq!(value, PropertyValue::from("marko"));

        let (key, cmp, value) = parse_has("age>=30").unwrap();
        assert_eq!(key, "age");
        assert_eq!(cmp, Comparator::GreaterThanEqual);
        assert_eq!(value, PropertyValue::Integer(30));

        let (_, cmp, _) = parse_has("lang!=java").unwrap();
        assert_eq!(cmp, Comparator::NotEqual);
    }

    #[test]
    fn test_parse_has_rejects_bare_key() {
        assert!(parse_has("name").is_err());
        assert!(parse_has("=marko").is_err());
    }

    #[test]
    fn test_cli_parses_neighbors() {
        let cli = Cli::try_parse_from([
            "arangraph", "--config", "g.yaml", "neighbors", "--from", "modern_person/1",
            "--direction", "out", "--label", "knows", "--limit", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Neighbors { from, direction, selection } => {
                assert_eq!(from, "modern_person/1");
                assert_eq!(direction, "out");
                assert_eq!(selection.labels, vec!["knows"]);
                assert_eq!(selection.limit, Some(5));
            }
            _ => panic!("expected neighbors"),
        }
    }
}
