#[macro_use]
extern crate clap;

use clap::Arg;
use dlx::Processor;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Assemble(Vec<dlx::Diagnostic>, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "Reading file \"{}\" failed: {}", path.display(), err),
            Error::Assemble(diagnostics, path) => {
                writeln!(f, "Assembling \"{}\" failed:", path.display())?;
                for diagnostic in diagnostics {
                    writeln!(f, "  {diagnostic}")?;
                }
                Ok(())
            }
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the DLX assembly source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("memory")
                .short("m")
                .long("memory")
                .takes_value(true)
                .value_name("BYTES")
                .default_value("1024")
                .help("Sets the size of the memory block in bytes"),
        )
        .arg(
            Arg::with_name("steps")
                .short("s")
                .long("steps")
                .takes_value(true)
                .value_name("COUNT")
                .help("Caps the number of executed instructions (default: unlimited)"),
        )
        .arg(
            Arg::with_name("starting-address")
                .long("starting-address")
                .takes_value(true)
                .value_name("ADDRESS")
                .default_value("0")
                .help("Sets the first address the memory block responds to"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let memory_size = value_t!(matches, "memory", u32).unwrap_or_else(|e| e.exit());
    let starting_address = value_t!(matches, "starting-address", u32).unwrap_or_else(|e| e.exit());
    let steps = matches.value_of("steps").map(|s| value_t!(matches, "steps", u64).unwrap_or_else(|e| e.exit()));

    if let Err(err) = run(input, memory_size, starting_address, steps) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(input: &str, memory_size: u32, starting_address: u32, steps: Option<u64>) -> Result<(), Error> {
    let input_path = Path::new(input);
    let source = read_source(input_path)?;

    let program = dlx_asm::parse(&source);
    if !program.is_valid() {
        return Err(Error::Assemble(program.diagnostics().to_vec(), input_path.to_owned()));
    }

    let mut processor = Processor::with_starting_address(starting_address, memory_size);
    if let Some(steps) = steps {
        processor.set_max_number_of_steps(steps);
    }
    processor.load_program(&program);
    processor.execute_current_program();

    println!("{}", processor.processor_dump());
    println!("{}", processor.register_dump());
    println!("{}", processor.memory_dump());
    println!("{}", processor.current_program_dump());

    Ok(())
}

fn read_source(path: &Path) -> Result<String, Error> {
    let file = File::open(path).map_err(|err| Error::Io(err, path.to_owned()))?;
    let mut reader = BufReader::new(file);
    let mut source = String::new();
    reader.read_to_string(&mut source).map_err(|err| Error::Io(err, path.to_owned()))?;
    Ok(source)
}
