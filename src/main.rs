use anyhow::Context;
use biodata_readers::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    if let Err(error) = run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    commands::run(args).context("biodata processing failed")?;
    Ok(())
}

fn show_help_and_commands() {
    println!("biodata-readers - record readers for flat-file biological databases");
    println!();
    println!("USAGE:");
    println!("    biodata-readers <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    fetch    Download a database file into the local working directory");
    println!("    parse    Parse a database file and report or emit its records");
    println!();
    println!("EXAMPLES:");
    println!("    biodata-readers fetch goa --taxon 9606");
    println!("    biodata-readers parse goa --taxon 9606 --json");
    println!("    biodata-readers parse mgi --input MRK_Sequence.rpt");
    println!("    biodata-readers parse taxonomy-names --input names.dmp --limit 100");
    println!();
    println!("Run 'biodata-readers --help' for full option listings.");
}
