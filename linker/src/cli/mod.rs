use crate::builder::{LinkerConfig, ProgramBuilder};
use crate::code_part::CodePart;
use crate::program::Program;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "kerbo-link",
    version,
    about = "Link compiled kerboscript units into a bytecode program"
)]
pub struct Cli {
    /// Log linker progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link a main program and its subprograms
    Link {
        /// Code parts of the main program (JSON array)
        main: PathBuf,

        /// Code parts of each subprogram, one unit per file
        libraries: Vec<PathBuf>,

        /// Extra code parts appended to the main program
        #[arg(long = "append", value_name = "FILE")]
        append: Vec<PathBuf>,

        /// Where to write the linked program (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dump the symbol table while linking
        #[arg(long)]
        debug: bool,

        /// Do not insert the jump over the main program's functions
        #[arg(long)]
        no_skip_jump: bool,
    },

    /// Print the listing of a linked program
    List {
        /// Linked program (JSON)
        program: PathBuf,
    },
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

pub struct CliHandler;

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Link {
                main,
                libraries,
                append,
                output,
                debug,
                no_skip_jump,
            } => {
                let config = LinkerConfig::new()
                    .with_debug_mode(debug)
                    .with_skip_jump(!no_skip_jump);
                let program = self.link(&main, &append, &libraries, config)?;
                let json = serde_json::to_string_pretty(&program)?;

                match output {
                    Some(path) => fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?,
                    None => println!("{}", json),
                }
                Ok(())
            }
            Commands::List { program } => {
                let program = read_program(&program)?;
                print!("{}", program.listing());
                Ok(())
            }
        }
    }

    /// Link the files into one program and report each unit's entry address
    pub fn link(
        &self,
        main: &Path,
        append: &[PathBuf],
        libraries: &[PathBuf],
        config: LinkerConfig,
    ) -> Result<Program> {
        let mut builder = ProgramBuilder::with_config(config);
        let mut units = Vec::new();

        units.push((main.to_path_buf(), builder.add_range(read_parts(main)?)));
        for path in append {
            builder.add_range(read_parts(path)?);
        }
        for path in libraries {
            units.push((path.clone(), builder.add_object_file(read_parts(path)?)));
        }

        let program = builder.build().context("link failed")?;
        for (path, unit) in &units {
            eprintln!(
                "{}: entry at {}",
                path.display(),
                program.entry_address(*unit)?
            );
        }
        Ok(program)
    }
}

fn read_parts(path: &Path) -> Result<Vec<CodePart>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("{} is not a list of code parts", path.display()))
}

fn read_program(path: &Path) -> Result<Program> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("{} is not a linked program", path.display()))
}
