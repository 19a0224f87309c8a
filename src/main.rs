use clap::Parser;
use mp3sum::logger::Level;
use mp3sum::options::{Cli, Options};
use mp3sum::report::{self, Summary};
use mp3sum::scan;
use mp3sum::{verify_path, Logger, Pool};
use std::process;
use std::sync::atomic::Ordering;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let options = match Options::from_env(Cli::parse()) {
        Ok(options) => options,
        Err(e) => {
            eprint!("{}", Cli::usage());
            eprintln!();
            Logger::new(Level::Warning, false).complain(Level::Warning, format!("error: {}", e));
            return 1;
        }
    };

    colored::control::set_override(options.colour);
    let logger = Logger::new(options.level, options.colour);

    let scan = scan::collect_paths(&options.paths, options.recursive);
    for error in &scan.errors {
        logger.complain(Level::Warning, error);
    }

    let pool = Pool::new(options.workers);
    let flag = pool.interrupt_flag();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        logger.complain(Level::Warning, format!("cannot install interrupt handler: {}", e));
    }

    logger.info(format!("Running with {} worker thread(s)", pool.workers()));
    logger.debug("");

    let results = pool.run_with(
        &scan.files,
        |path| {
            logger.debug(format!("{}:", options.display.render(path)));
            let result = verify_path(path, &logger);
            logger.debug("");
            result
        },
        |result| {
            if options.show.shows(result.outcome) {
                let display_path = options.display.render(&result.path);
                logger.warn(report::result_line(result, &display_path, &logger));
            }
        },
    );

    if pool.is_interrupted() {
        logger.log_stderr(Level::Error, "Interrupted by user.");
    }

    let summary = Summary::from_results(&results);
    logger.error(report::summary_line(&summary, &logger));

    let mut status = scan.exit_bits() | report::exit_bits(&results);

    if let Some(path) = &options.report {
        match report::generate(path, &results) {
            Ok(()) => logger.info(format!("Report written to {}", path.display())),
            Err(e) => {
                logger.complain(Level::Error, format!("cannot write report {}: {}", path.display(), e));
                status |= 1;
            }
        }
    }

    status
}
