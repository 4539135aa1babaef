//! Command-line interface for apidoc.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::catalog::{self, NAMESPACE_SEPARATOR};
use crate::config::Config;
use crate::doc::DocParser;
use crate::logging;
use crate::reflect::{ClassView, Manifest};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Browse PHP-style API documentation.
///
/// Lists namespaces and classes below include paths, parses doc comment
/// blocks, and shows which ancestor declares each method of a class.
#[derive(Parser)]
#[command(name = "apidoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List namespaces that hold source files
    Namespaces(NamespacesArgs),
    /// List the classes of a namespace
    Classes(ClassesArgs),
    /// Parse one doc comment block
    Parse(ParseArgs),
    /// Group a class's methods by declaring ancestor
    #[command(visible_alias = "ownership")]
    Inherit(ClassArgs),
    /// Show a documented class
    Class(ClassArgs),
}

/// Arguments for the namespaces command.
#[derive(Args)]
pub struct NamespacesArgs {
    /// Only list namespaces below this one
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Include paths (default: from config)
    pub paths: Vec<PathBuf>,
}

/// Arguments for the classes command.
#[derive(Args)]
pub struct ClassesArgs {
    /// Namespace to list, with `/` or `\` separators (default: root)
    pub namespace: Option<String>,

    /// Include paths (default: from config)
    pub paths: Vec<PathBuf>,

    /// Include classes of sub-namespaces
    #[arg(short, long)]
    pub recursive: bool,

    /// Case-insensitive file name filter
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// File holding the comment block, `-` for stdin (default: stdin)
    pub file: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the inherit and class commands.
#[derive(Args)]
pub struct ClassArgs {
    /// Class name, either `ns\Class` or `ns/Class`
    pub class: String,

    /// Path to the class manifest YAML file
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Parse arguments, run the command and return the exit code.
pub fn run(cli: Cli) -> i32 {
    logging::init(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return EXIT_ERROR;
        }
    };

    let result = match &cli.command {
        Commands::Namespaces(args) => run_namespaces(&config, args),
        Commands::Classes(args) => run_classes(&config, args),
        Commands::Parse(args) => run_parse(&config, args),
        Commands::Inherit(args) => run_inherit(&config, args),
        Commands::Class(args) => run_class(&config, args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn validate_format(format: &str) -> anyhow::Result<()> {
    if format != "pretty" && format != "json" {
        anyhow::bail!("invalid format {:?}, must be 'pretty' or 'json'", format);
    }
    Ok(())
}

/// Run the namespaces command.
pub fn run_namespaces(config: &Config, args: &NamespacesArgs) -> anyhow::Result<i32> {
    let catalog = config.catalog(&args.paths)?;

    for namespace in catalog.namespaces(args.namespace.as_deref()) {
        println!("{}", namespace);
    }

    Ok(EXIT_SUCCESS)
}

/// Run the classes command.
pub fn run_classes(config: &Config, args: &ClassesArgs) -> anyhow::Result<i32> {
    let catalog = config.catalog(&args.paths)?;

    let classes = catalog.classes(
        args.namespace.as_deref().unwrap_or(""),
        args.recursive,
        args.query.as_deref(),
    );
    for key in classes.keys() {
        println!("{}", key);
    }

    Ok(EXIT_SUCCESS)
}

/// Run the parse command.
pub fn run_parse(config: &Config, args: &ParseArgs) -> anyhow::Result<i32> {
    validate_format(&args.format)?;

    let comment = match &args.file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?,
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let parser = DocParser::new(config.tag_registry()?);
    let record = parser.parse(&comment);

    match args.format.as_str() {
        "json" => report::write_json(&record)?,
        _ => report::write_record_pretty(&record),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the inherit command.
pub fn run_inherit(config: &Config, args: &ClassArgs) -> anyhow::Result<i32> {
    validate_format(&args.format)?;

    let manifest = Manifest::parse_file(&args.manifest)
        .map_err(|e| anyhow::anyhow!("parsing manifest {}: {}", args.manifest.display(), e))?;
    let parser = DocParser::new(config.tag_registry()?);
    let view = ClassView::load(&parser, &manifest, &qualified_class(&args.class))?;

    let interfaces = report::method_interfaces(&view)?;
    let inheritance = report::inheritance_report(view.name(), &view.ownership()?, &interfaces);

    match args.format.as_str() {
        "json" => report::write_json(&inheritance)?,
        _ => report::write_inheritance_pretty(&inheritance),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the class command.
pub fn run_class(config: &Config, args: &ClassArgs) -> anyhow::Result<i32> {
    validate_format(&args.format)?;

    let manifest = Manifest::parse_file(&args.manifest)
        .map_err(|e| anyhow::anyhow!("parsing manifest {}: {}", args.manifest.display(), e))?;
    let parser = DocParser::new(config.tag_registry()?);
    let view = ClassView::load(&parser, &manifest, &qualified_class(&args.class))?;

    let interfaces = report::method_interfaces(&view)?;
    let class = report::class_report(&view, &interfaces)?;

    match args.format.as_str() {
        "json" => report::write_json(&class)?,
        _ => report::write_class_pretty(&class),
    }

    Ok(EXIT_SUCCESS)
}

/// Accept catalog keys (`ns/Class`) as well as class names.
fn qualified_class(name: &str) -> String {
    match name.rsplit_once(NAMESPACE_SEPARATOR) {
        Some((namespace, class)) => catalog::class_name(namespace, class),
        None => name.to_string(),
    }
}
