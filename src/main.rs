extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate npasm;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use npasm::assembler::ast::Program;
use npasm::assembler::token::to_debug_string;
use npasm::assembler::{Lexer, Parser, UnrecognizedPolicy};

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tStrict: {}\n\tPrint Tokens: {}\n\tInfile: {}",
        verbosity(args.occurrences_of("verbose")),
        args.is_present("strict"),
        args.is_present("tokens"),
        args.value_of("INPUT").unwrap_or("None")
    );

    let ifile = match args.value_of("INPUT") {
        Some(path) => path,
        None => {
            error!("fatal: no input file given");
            std::process::exit(1);
        }
    };

    let policy = if args.is_present("strict") {
        UnrecognizedPolicy::Fail
    } else {
        UnrecognizedPolicy::Skip
    };

    let tokens = match Lexer::with_policy(policy).scan_file(ifile) {
        Ok(tokens) => tokens,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    if args.is_present("tokens") {
        println!("{}", to_debug_string(&tokens));
    }

    let program = match Parser::new(tokens).run() {
        Ok(program) => program,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
    };
    info!("{}: {} line(s), {} instruction(s)", ifile, program.lines.len(), program.instructions().count());

    if args.is_present("print-debug") {
        println!("{}", debug_grid(&program));
    } else {
        println!("{}", program);
    }
}

fn debug_grid(program: &Program) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for line in program.lines.iter() {
        grid.add(Cell::from(format!("{:>4}:", line.number)));
        grid.add(Cell::from(line.label.as_ref().map(|l| l.to_string()).unwrap_or_default()));
        grid.add(Cell::from(line.instruction.as_ref().map(|i| i.to_string()).unwrap_or_default()));
        grid.add(Cell::from(line.comment.as_ref().map(|c| c.to_string()).unwrap_or_default()));
    }

    grid.fit_into_columns(4).to_string()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("strict")
            .short("s")
            .long("strict")
            .takes_value(false)
            .help("fail on characters the lexer does not recognize instead of skipping them"))
        .arg(Arg::with_name("tokens")
            .short("t")
            .long("tokens")
            .takes_value(false)
            .help("prints the token stream to STDOUT"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .long("print-debug")
            .alias("show")
            .takes_value(false)
            .help("prints the parsed lines as a table instead of as source"))
        .get_matches()
}

fn verbosity(occurrences: u64) -> log::LevelFilter {
    match occurrences {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(occurrences: u64) {
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
        .level(verbosity(occurrences))
        .chain(std::io::stderr())
        .apply().ok();
}
