use clap::{Arg, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "token-block-json",
    "token-block-simple",
    "token-inline-json",
    "ir-json",
    "ir-treeviz",
    "links-json",
];

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn page_arg() -> Arg {
    Arg::new("page")
        .help("Page path, e.g. Projects:Plan")
        .required(true)
        .index(1)
        .value_hint(ValueHint::Other)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for working with folio notebooks")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("notebook")
                .long("notebook")
                .short('n')
                .value_hint(ValueHint::DirPath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(path_arg("input", "Input file path"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .arg(path_arg("path", "Path to a page file"))
                .arg(
                    Arg::new("transform")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2),
                )
                .arg(Arg::new("from").long("from")),
        )
        .subcommand(Command::new("ls").arg(Arg::new("namespace").index(1)))
        .subcommand(Command::new("show").arg(page_arg()))
        .subcommand(
            Command::new("resolve")
                .arg(Arg::new("link").required(true).index(1))
                .arg(Arg::new("from").long("from")),
        )
        .subcommand(Command::new("backlinks").arg(page_arg()))
        .subcommand(Command::new("materialize").arg(page_arg()));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "folio", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "folio", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "folio", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
