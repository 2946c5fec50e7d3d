//! xsdcat CLI: XSD type resolution from the command line.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use roxmltree::{Document, Node, ParsingOptions};
use serde_json::json;
use std::fmt;
use std::process;
use xsd_catalog::{CatalogConfig, FacetGroup, SchemaCatalog, SchemaNode, SchemaSources};

#[derive(Parser)]
#[command(name = "xsdcat", about = "XSD element/type resolution")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a global element and its type
    Element(LookupArgs),
    /// Print the built-in type at the end of a restriction chain
    BaseType(LookupArgs),
    /// Print the facets of a simple type, level by level
    Facets(LookupArgs),
    /// Map every element of an instance document to its declaration
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Schema file(s) (.xsd); imports/includes are followed
    #[arg(short, long = "schema", required = true, num_args = 1..)]
    schemas: Vec<String>,

    /// JSON output
    #[arg(long)]
    json: bool,

    /// Maximum steps per derivation chain
    #[arg(long, default_value_t = xsd_catalog::config::DEFAULT_MAX_CHAIN_DEPTH)]
    max_depth: usize,
}

#[derive(Args)]
struct LookupArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Namespace URI ("" for no namespace)
    #[arg(long, default_value = "")]
    ns: String,

    /// Local name
    #[arg(long)]
    name: String,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Instance document (.xml)
    #[arg(short, long)]
    input: String,
}

/// Ausgang eines Kommandos, der nicht Erfolg ist.
enum Failure {
    /// Exit-Code 1.
    Error(String),
    /// Exit-Code 2.
    NotFound(String),
}

impl From<xsd_catalog::Error> for Failure {
    fn from(e: xsd_catalog::Error) -> Self {
        Self::Error(e.to_string())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(msg) | Self::NotFound(msg) => f.write_str(msg),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(match e {
            Failure::Error(_) => 1,
            Failure::NotFound(_) => 2,
        });
    }
}

fn run(cli: Cli) -> Result<(), Failure> {
    let common = match &cli.command {
        Command::Element(args) | Command::BaseType(args) | Command::Facets(args) => &args.common,
        Command::Resolve(args) => &args.common,
    };

    let mut sources = SchemaSources::new();
    for path in &common.schemas {
        sources.add_file(path)?;
    }
    let trees = sources.parse()?;
    let config = CatalogConfig::default().with_max_chain_depth(common.max_depth);
    let catalog = SchemaCatalog::with_config(&trees, config)?;

    match &cli.command {
        Command::Element(args) => run_element(&catalog, args),
        Command::BaseType(args) => run_base_type(&catalog, args),
        Command::Facets(args) => run_facets(&catalog, args),
        Command::Resolve(args) => run_resolve(&catalog, args),
    }
}

fn run_element(catalog: &SchemaCatalog<'_>, args: &LookupArgs) -> Result<(), Failure> {
    let element = catalog
        .find_element(&args.ns, &args.name)
        .ok_or_else(|| not_found("element", &args.ns, &args.name))?;
    let ty = catalog.find_element_type(&element);
    let type_name = ty.as_ref().map(type_label);
    let pos = element.position();

    if args.common.json {
        let out = json!({
            "element": qname_label(&element),
            "line": pos.row,
            "column": pos.col,
            "type": type_name,
        });
        println!("{out}");
    } else {
        println!(
            "{} at {}:{} type {}",
            qname_label(&element),
            pos.row,
            pos.col,
            type_name.as_deref().unwrap_or("unresolved")
        );
    }
    Ok(())
}

fn run_base_type(catalog: &SchemaCatalog<'_>, args: &LookupArgs) -> Result<(), Failure> {
    let ty = catalog
        .find_type_by_name(&args.ns, &args.name)
        .ok_or_else(|| not_found("type", &args.ns, &args.name))?;
    let base = catalog.find_base_type_for(&ty)?;

    if args.common.json {
        println!("{}", json!({ "type": qname_label(&ty), "base": base }));
    } else {
        println!("{}", base.unwrap_or("anonymous"));
    }
    Ok(())
}

fn run_facets(catalog: &SchemaCatalog<'_>, args: &LookupArgs) -> Result<(), Failure> {
    let ty = catalog
        .find_type_by_name(&args.ns, &args.name)
        .ok_or_else(|| not_found("type", &args.ns, &args.name))?;
    let groups = catalog.collect_facets(&ty)?;

    if args.common.json {
        let out: Vec<_> = groups.iter().map(group_json).collect();
        println!("{}", serde_json::Value::Array(out));
        return Ok(());
    }
    for group in &groups {
        println!("level {} {}", group.level, group.type_name.unwrap_or("anonymous"));
        for facet in &group.facets {
            let fixed = if facet.is_fixed() { " (fixed)" } else { "" };
            println!("  {} = {}{fixed}", facet.kind(), facet.value().unwrap_or(""));
        }
    }
    Ok(())
}

fn group_json(group: &FacetGroup<'_>) -> serde_json::Value {
    let facets: Vec<_> = group
        .facets
        .iter()
        .map(|f| json!({ "kind": f.kind().as_str(), "value": f.value(), "fixed": f.is_fixed() }))
        .collect();
    json!({ "level": group.level, "type": group.type_name, "facets": facets })
}

fn run_resolve(catalog: &SchemaCatalog<'_>, args: &ResolveArgs) -> Result<(), Failure> {
    let text = std::fs::read_to_string(&args.input)
        .map_err(|e| Failure::Error(format!("{}: {e}", args.input)))?;
    let xml_opts = ParsingOptions { allow_dtd: true, ..Default::default() };
    let doc = Document::parse_with_options(&text, xml_opts)
        .map_err(|e| Failure::Error(format!("{}: XML: {e}", args.input)))?;

    let mut rows = Vec::new();
    for node in doc.descendants().filter(Node::is_element) {
        let definition = catalog.find_element_for_xml_node(node)?;
        rows.push((instance_path(node), definition.map(|d| d.to_string())));
    }

    if args.common.json {
        let out: Vec<_> = rows
            .iter()
            .map(|(path, def)| json!({ "path": path, "definition": def }))
            .collect();
        println!("{}", serde_json::Value::Array(out));
    } else {
        for (path, def) in &rows {
            println!("{path}\t{}", def.as_deref().unwrap_or("unresolved"));
        }
    }
    Ok(())
}

/// `/a/b/c` aus lokalen Namen, Wurzel zuerst.
fn instance_path(node: Node<'_, '_>) -> String {
    let mut names: Vec<_> = node
        .ancestors()
        .filter(Node::is_element)
        .map(|n| n.tag_name().name())
        .collect();
    names.reverse();
    format!("/{}", names.join("/"))
}

fn qname_label(node: &SchemaNode<'_>) -> String {
    node.qname().map(|q| q.to_string()).unwrap_or_else(|| "anonymous".to_string())
}

fn type_label(ty: &SchemaNode<'_>) -> String {
    match ty.qname() {
        Some(q) => q.to_string(),
        None => format!("anonymous xs:{}", ty.node().tag_name().name()),
    }
}

fn not_found(what: &str, ns: &str, name: &str) -> Failure {
    Failure::NotFound(format!("{what} {{{ns}}}{name} not found"))
}
