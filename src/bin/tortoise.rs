use gsubr::logging::{init_logging, LogConfig};
use gsubr::tortoise::{self, parse_command, Tortoise};
use gsubr::{Config, Runtime};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug)]
struct Options {
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    preamble: bool,
}

impl Options {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let prog = args.first().map(String::as_str).unwrap_or("tortoise");

        let mut options = Self {
            output: None,
            config: None,
            preamble: false,
        };

        let mut rest = args.iter().skip(1);
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(Self::usage(prog)),
                "--preamble" => options.preamble = true,
                "--output" | "-o" => {
                    let path = rest.next().ok_or("--output needs a path")?;
                    options.output = Some(PathBuf::from(path));
                }
                "--config" => {
                    let path = rest.next().ok_or("--config needs a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                opt => return Err(format!("Unknown option: {}\n\n{}", opt, Self::usage(prog))),
            }
        }

        Ok(options)
    }

    fn usage(prog: &str) -> String {
        format!(
            "tortoise - drive a drawing tortoise through runtime procedures\n\n\
            USAGE:\n    {} [OPTIONS] < commands\n\n\
            OPTIONS:\n    \
            -h, --help          Print help information\n    \
            -o, --output PATH   Write gnuplot commands to PATH instead of stdout\n    \
            --config PATH       Read settings from PATH instead of gsubr.toml\n    \
            --preamble          Emit gnuplot plot setup before drawing\n\n\
            COMMANDS (one per line):\n    \
            tortoise-reset | tortoise-penup | tortoise-pendown\n    \
            tortoise-turn DEGREES | tortoise-move LENGTH\n\n\
            EXAMPLE:\n    \
            printf 'tortoise-move 5\\ntortoise-turn 90\\ntortoise-move 5\\n' | {} --preamble | gnuplot -p",
            prog, prog
        )
    }
}

fn run(options: Options, config: Config, output: Box<dyn Write + Send>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::new(config.runtime);
    let tortoise = Arc::new(Tortoise::new(output));

    if options.preamble {
        tortoise.preamble(10, 10)?;
    }

    runtime.enter(|| -> Result<(), Box<dyn std::error::Error>> {
        tortoise.install(&runtime)?;
        runtime.call(tortoise::RESET, &[])?;

        let stdin = io::stdin();
        for (number, line) in stdin.lock().lines().enumerate() {
            let line = line?;
            let Some((name, args)) = parse_command(&line) else {
                continue;
            };
            if name == "quit" || name == "exit" {
                break;
            }

            debug!(line = number + 1, command = %name, args = args.len(), "Dispatching");
            match runtime.call(&name, &args) {
                Ok(value) => eprintln!("=> {}", value),
                Err(err) => {
                    error!(line = number + 1, command = %name, error = %err, "Command failed");
                    eprintln!("line {}: {}", number + 1, err);
                }
            }
        }
        Ok(())
    })
}

fn main() {
    let options = match Options::from_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    let config = match &options.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        },
        None => Config::discover(),
    }
    .with_env_overrides();

    // Environment variables win over the config file
    let log_config = if std::env::var_os("GSUBR_LOG_LEVEL").is_some() {
        LogConfig::from_env()
    } else {
        config.logging.to_log_config()
    };
    let _guard = init_logging(log_config);

    info!(options = ?options, "tortoise starting");

    let output: Box<dyn Write + Send> = match &options.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                error!(path = %path.display(), error = %err, "Cannot create output");
                eprintln!("Cannot create {}: {}", path.display(), err);
                std::process::exit(1);
            }
        },
        None => Box::new(io::stdout()),
    };

    if let Err(err) = run(options, config, output) {
        error!(error = %err, "tortoise failed");
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
