// Command-line interface for folio
//
// This binary provides commands for converting page files between dialects and for
// working with a notebook folder: listing, resolving links, backlinks and creating pages.
//
// The inspect command is a development aid showing what the tokenizer and parser see.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  folio convert <input> --to <dialect> [--from <dialect>] [--output <file>]
//  folio inspect <path> [<transform>]          - Execute a transform (defaults to "ir-treeviz")
//  folio --list-transforms                     - List available transforms and dialects
//
// Notebook commands work on the folder given by --notebook (defaults to the current folder).
// A notebook.toml in that folder overrides the notebook section of the configuration:
//  folio ls [<namespace>]
//  folio show <page>
//  folio resolve <link> [--from <page>]
//  folio backlinks <page>
//  folio materialize <page>

use folio_cli::transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use folio_babel::{Dialect, DialectRegistry};
use folio_config::{FolioConfig, Loader};
use folio_notebook::{NotebookSettings, PagePath, PageStore};
use log::debug;
use serde::Serialize;
use std::fs;

fn page_arg() -> Arg {
    Arg::new("page")
        .help("Page path, e.g. Projects:Plan")
        .required(true)
        .index(1)
        .value_hint(ValueHint::Other)
}

fn build_cli() -> Command {
    Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for working with folio notebooks")
        .long_about(
            "folio works with notebooks: folders of wiki or Markdown page files.\n\n\
            Commands:\n  \
            - convert:     Transform a page file between dialects (wiki, markdown)\n  \
            - inspect:     View internal representations (tokens, tree, links)\n  \
            - ls, show, resolve, backlinks, materialize: notebook operations\n\n\
            Examples:\n  \
            folio convert Home.txt --to markdown       # Convert to markdown (stdout)\n  \
            folio inspect Home.txt ir-json             # View the parsed tree as JSON\n  \
            folio -n ~/Notes backlinks Projects:Plan   # Pages linking to Projects:Plan"
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a folio.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("notebook")
                .long("notebook")
                .short('n')
                .value_name("DIR")
                .help("Notebook folder for notebook commands")
                .default_value(".")
                .value_hint(ValueHint::DirPath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a page file between dialects")
                .long_about(
                    "Convert a page file between dialects.\n\n\
                    Supported dialects:\n  \
                    - wiki:     Native wiki markup (.txt)\n  \
                    - markdown: Markdown (.md)\n\n\
                    The source dialect is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file."
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source dialect (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target dialect (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect internal representations of a page file")
                .arg(
                    Arg::new("path")
                        .help("Path to the page file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format). Defaults to 'ir-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Dialect of the file (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("ls")
                .about("List the pages directly below a namespace")
                .arg(
                    Arg::new("namespace")
                        .help("Namespace to list (defaults to the notebook root)")
                        .index(1)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Load a page and print it as JSON")
                .arg(page_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a link as written on a page")
                .arg(
                    Arg::new("link")
                        .help("Link text, e.g. +Child, :Abs:Path, ./file.pdf")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_name("PAGE")
                        .help("Page the link appears on (defaults to the root)"),
                ),
        )
        .subcommand(
            Command::new("backlinks")
                .about("Index the notebook and list pages linking to a page")
                .arg(page_arg()),
        )
        .subcommand(
            Command::new("materialize")
                .about("Create the file of a page that does not exist yet")
                .arg(page_arg()),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        notebook_root(&matches),
    );
    init_logging(&config);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let from = detect_dialect(input, sub_matches.get_one::<String>("from"));
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output);
        }
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            let from = detect_dialect(path, sub_matches.get_one::<String>("from"));
            handle_inspect_command(path, &from, transform, &config);
        }
        Some(("ls", sub_matches)) => {
            let store = open_notebook(&matches, &config);
            let namespace = sub_matches
                .get_one::<String>("namespace")
                .map(|s| parse_page(s))
                .unwrap_or_else(PagePath::root);
            handle_ls_command(&store, &namespace);
        }
        Some(("show", sub_matches)) => {
            let store = open_notebook(&matches, &config);
            handle_show_command(&store, &page_from(sub_matches), &config);
        }
        Some(("resolve", sub_matches)) => {
            let store = open_notebook(&matches, &config);
            let link = sub_matches
                .get_one::<String>("link")
                .expect("link is required");
            let source = sub_matches
                .get_one::<String>("from")
                .map(|s| parse_page(s))
                .unwrap_or_else(PagePath::root);
            handle_resolve_command(&store, link, &source, &config);
        }
        Some(("backlinks", sub_matches)) => {
            let store = open_notebook(&matches, &config);
            handle_backlinks_command(&store, &page_from(sub_matches));
        }
        Some(("materialize", sub_matches)) => {
            let store = open_notebook(&matches, &config);
            handle_materialize_command(&store, &page_from(sub_matches));
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Handle the convert command
fn handle_convert_command(input: &str, from: &str, to: &str, output: Option<&str>) {
    let registry = DialectRegistry::default();
    let source_dialect = dialect_or_exit(&registry, from);
    let target_dialect = dialect_or_exit(&registry, to);

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let parsed = source_dialect.parse(&source);
    for warning in &parsed.warnings {
        eprintln!("Warning: {input}: {warning}");
    }
    let text = target_dialect.serialize_file(&parsed.document);

    match output {
        Some(path) => {
            fs::write(path, text).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{text}"),
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, from: &str, transform: &str, config: &FolioConfig) {
    let registry = DialectRegistry::default();
    let dialect = dialect_or_exit(&registry, from);

    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let output = transforms::execute_transform(&source, dialect, transform, config.inspect.pretty)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("Stages:");
    println!("  token-block   - One token per source line");
    println!("  token-inline  - Inline tokens of each line holding inline text");
    println!("  ir            - Parsed document tree");
    println!("  links         - Links of the parsed document\n");

    println!("Available transform combinations:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nDialects:");
    let registry = DialectRegistry::default();
    for dialect in registry.dialects() {
        println!("  {} (.{})", dialect.id(), dialect.extension());
    }
}

fn handle_ls_command(store: &PageStore, namespace: &PagePath) {
    for page in store.list_children(namespace) {
        println!("{}", page.path);
    }
}

fn handle_show_command(store: &PageStore, page: &PagePath, config: &FolioConfig) {
    let loaded = store.load(page).unwrap_or_else(|e| {
        eprintln!("Error loading page '{page}': {e}");
        std::process::exit(1);
    });
    for warning in &loaded.warnings {
        eprintln!("Warning: {page}: {warning}");
    }
    print_json(&loaded, config);
}

fn handle_resolve_command(store: &PageStore, link: &str, source: &PagePath, config: &FolioConfig) {
    let target = store.resolve(link, source).unwrap_or_else(|e| {
        eprintln!("Error resolving '{link}' from '{source}': {e}");
        std::process::exit(1);
    });
    print_json(&target, config);
}

fn handle_backlinks_command(store: &PageStore, page: &PagePath) {
    let count = store.reindex().unwrap_or_else(|e| {
        eprintln!("Error indexing notebook: {e}");
        std::process::exit(1);
    });
    debug!("Indexed links of {count} pages");

    for source in store.backlinks(page) {
        println!("{source}");
    }
}

fn handle_materialize_command(store: &PageStore, page: &PagePath) {
    let created = store.materialize(page).unwrap_or_else(|e| {
        eprintln!("Error creating page '{page}': {e}");
        std::process::exit(1);
    });
    println!("{}", created.file.display());
}

fn load_cli_config(explicit_path: Option<&str>, notebook: &str) -> FolioConfig {
    let loader = Loader::new().with_optional_file("folio.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.with_notebook(notebook).with_env().build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &FolioConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_filter());
    env_logger::Builder::from_env(env).init();
}

fn notebook_root(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("notebook")
        .map(|s| s.as_str())
        .unwrap_or(".")
}

fn open_notebook(matches: &ArgMatches, config: &FolioConfig) -> PageStore {
    let root = notebook_root(matches);
    let settings = NotebookSettings::from(&config.notebook);

    PageStore::open(root, settings, DialectRegistry::default()).unwrap_or_else(|e| {
        eprintln!("Error opening notebook '{root}': {e}");
        std::process::exit(1);
    })
}

fn detect_dialect(path: &str, explicit: Option<&String>) -> String {
    if let Some(dialect) = explicit {
        return dialect.to_string();
    }
    let registry = DialectRegistry::default();
    match registry.detect_dialect_from_filename(path) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect dialect from filename '{path}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn dialect_or_exit<'a>(registry: &'a DialectRegistry, id: &str) -> &'a Dialect {
    registry.get(id).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

fn page_from(sub_matches: &ArgMatches) -> PagePath {
    let page = sub_matches
        .get_one::<String>("page")
        .expect("page is required");
    parse_page(page)
}

fn parse_page(text: &str) -> PagePath {
    PagePath::parse(text).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

fn print_json<T: Serialize>(value: &T, config: &FolioConfig) {
    let result = if config.inspect.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match result {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("JSON serialization failed: {e}");
            std::process::exit(1);
        }
    }
}
