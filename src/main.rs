#[macro_use]
mod args;

use args::ARGS;

fn dump_log() {
    let logger = log::LOGGER.lock().unwrap_or_else(|err| err.into_inner());
    eprint!("{}", logger.format());
}

fn main() {
    let demangled = symbols::msvc::demangle(&ARGS.symbol);

    if ARGS.verbose {
        dump_log();
    }

    match demangled {
        Ok(demangled) => println!("{demangled}"),
        Err(diag) => exit!(1 => "{diag}"),
    }
}
