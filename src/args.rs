use once_cell::sync::Lazy;

macro_rules! exit {
    ($code:expr => $($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit($code);
    }};
}

const USAGE: &str = "USAGE: undname [options] <SYMBOL>";

const HELP: &str = "OVERVIEW: MSVC symbol demangler

USAGE: undname [options] <SYMBOL>

OPTIONS:
  -H, --help          Print usage information
  -V, --verbose       Print the demangler's log to stderr";

const NAMES: &[&str] = &["--help", "--verbose"];

pub static ARGS: Lazy<Cli> = Lazy::new(Cli::parse);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Dump the log after demangling.
    pub verbose: bool,

    /// Mangled symbol.
    pub symbol: String,
}

/// Reasons for not producing a [`Cli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Help,
    Usage,
    UnknownArg {
        arg: String,
        best_guess: Option<&'static str>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        match Self::try_parse(std::env::args().skip(1)) {
            Ok(cli) => cli,
            Err(Request::Help) => exit!(0 => "{HELP}"),
            Err(Request::Usage) => exit!(1 => "{USAGE}"),
            Err(Request::UnknownArg {
                arg,
                best_guess: Some(best_guess),
            }) => exit!(1 => "Unknown cmd arg '{arg}' did you mean '{best_guess}'?"),
            Err(Request::UnknownArg { arg, .. }) => exit!(1 => "Unknown cmd arg '{arg}' was entered."),
        }
    }

    pub fn try_parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, Request> {
        let mut verbose = false;
        let mut symbols = Vec::new();

        for arg in args {
            match arg.as_str() {
                "-H" | "--help" => return Err(Request::Help),
                "-V" | "--verbose" => verbose = true,
                // mangled names start with '?', so only dashes introduce flags
                unknown if unknown.starts_with('-') && unknown.len() > 1 => {
                    return Err(Request::UnknownArg {
                        best_guess: best_guess(unknown),
                        arg,
                    });
                }
                _ => symbols.push(arg),
            }
        }

        if symbols.len() != 1 {
            return Err(Request::Usage);
        }

        Ok(Cli {
            verbose,
            symbol: symbols.remove(0),
        })
    }
}

fn best_guess(unknown: &str) -> Option<&'static str> {
    let mut distance = u32::MAX;
    let mut best_guess = "";
    for name in NAMES {
        let d = triple_accel::levenshtein_exp(unknown.as_bytes(), name.as_bytes());
        if d < distance {
            distance = d;
            best_guess = name;
        }
    }

    // A guess that's less than 4 `steps` away from a correct arg.
    if distance < 4 {
        Some(best_guess)
    } else {
        None
    }
}
