
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::process::Command;

use worthc::compiler::builder::Builder;
use worthc::compiler::emitter::Emitter;
use worthc::compiler::lexer::tokenize;

// Both side-effect files land in the current working directory and are
// silently overwritten, matching what existing Worth programs expect.
const ASM_PATH: &str = "a.s";
const EXE_PATH: &str = "a.out";

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tNo Assemble: {}\n\tShow: {}\n\tInfile: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.is_present("no-assemble"),
        args.is_present("print-debug"),
        args.value_of("INPUT").unwrap()
    );

    let ipath = args.value_of("INPUT").unwrap();

    let source = match fs::read(ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath, err);
            std::process::exit(1);
        },
        Ok(bytes) => bytes,
    };

    if source.iter().any(|&b| b > 127) {
        error!("invalid ascii");
        std::process::exit(1);
    }

    // Every byte is 127 or below, so the buffer is valid UTF-8.
    let source = match String::from_utf8(source) {
        Err(_) => {
            error!("invalid ascii");
            std::process::exit(1);
        },
        Ok(text) => text,
    };

    let tokens = tokenize(&source);
    debug!("lexed {} tokens", tokens.len());

    let program = match Builder::new(tokens).run() {
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        },
        Ok(program) => program,
    };
    debug!("resolved {} operations", program.len());

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for (addr, op) in program.iter().enumerate() {
            grid.add(Cell::from(format!("{:04}:", addr)));
            grid.add(Cell::from(format!("{}", op.kind)));
            grid.add(Cell::from(format!("({})", op.loc)));
        }

        println!("{}", grid.fit_into_columns(3));
    }

    let ofile = match File::create(ASM_PATH) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", ASM_PATH, err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    if let Err(err) = Emitter::new(BufWriter::new(ofile)).run(&program) {
        error!("fatal: unable to write to output file `{}`: {}", ASM_PATH, err);
        std::process::exit(1);
    }
    info!("wrote {}", ASM_PATH);

    if args.is_present("no-assemble") {
        return;
    }

    match Command::new("fasm").arg(ASM_PATH).arg(EXE_PATH).status() {
        Err(err) => {
            error!("fatal: unable to spawn fasm: {}", err);
            std::process::exit(1);
        },
        Ok(status) if !status.success() => {
            error!("error: fasm failed");
            std::process::exit(1);
        },
        Ok(_) => info!("wrote {}", EXE_PATH),
    }
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the Worth source file to compile")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("no-assemble")
            .short("S")
            .takes_value(false)
            .help("stop after writing the assembly file; do not invoke fasm"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .takes_value(false)
            .help("prints the resolved program listing to STDOUT"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        // All diagnostics go to stderr; stdout is reserved for the
        // program listing requested with -d.
        .chain(std::io::stderr())
        .apply().ok();
}
