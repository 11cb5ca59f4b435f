//! Command that generates, validates or reformats UUIDs

use std::{env, io, io::Write, process::ExitCode};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuidforge::{ExportFormat, GenerationConfig, UuidFormat, Version};

const USAGE: &str = "\
Usage: {} [-v version] [-n count] [-f format] [--namespace ns] [--name name] [-o csv|json|txt] [-m]
       {} validate <text>...
       {} format <format> <text>";

enum Command {
    Generate {
        config: GenerationConfig,
        output: ExportFormat,
        include_metadata: bool,
    },
    Validate(Vec<String>),
    Format(UuidFormat, String),
}

fn main() -> io::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("uuidforge=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let command = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(command) => command,
            Err(message) => {
                let program = program.as_deref().unwrap_or("uuidforge");
                eprintln!("Error: {}", message);
                eprintln!("{}", USAGE.replace("{}", program));
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    match run(command, &mut buf) {
        Ok(code) => {
            buf.flush()?;
            Ok(code)
        }
        Err(err) => {
            buf.flush()?;
            eprintln!("Error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(command: Command, buf: &mut impl Write) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            config,
            output,
            include_metadata,
        } => {
            let batch = uuidforge::generate_batch(&config)?;
            let text = uuidforge::export_uuids(&batch.uuids, output, include_metadata)?;
            writeln!(buf, "{}", text)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate(texts) => {
            let results: Vec<_> = texts.iter().map(|e| uuidforge::validate_uuid(e)).collect();
            writeln!(buf, "{}", serde_json::to_string_pretty(&results)?)?;
            if results.iter().all(|e| e.is_valid) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Format(format, text) => {
            writeln!(buf, "{}", uuidforge::format_uuid(&text, format)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut args = args.peekable();
    let first = args.peek().cloned();
    match first.as_deref() {
        Some("validate") => {
            args.next();
            let texts: Vec<String> = args.collect();
            if texts.is_empty() {
                return Err("nothing to validate".to_owned());
            }
            Ok(Command::Validate(texts))
        }
        Some("format") => {
            args.next();
            let (Some(format), Some(text), None) = (args.next(), args.next(), args.next()) else {
                return Err("'format' takes a format name and one UUID".to_owned());
            };
            let format = format.parse().map_err(|err| format!("{}", err))?;
            Ok(Command::Format(format, text))
        }
        _ => parse_generate_args(args),
    }
}

fn parse_generate_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut config = GenerationConfig::default();
    let mut output = ExportFormat::Txt;
    let mut include_metadata = false;
    let mut seen = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "-m" {
            include_metadata = true;
            continue;
        }
        let opt = match arg.as_str() {
            "-v" | "-n" | "-f" | "-o" => &arg[1..],
            "--namespace" | "--name" => &arg[2..],
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        };
        if seen.contains(&arg) {
            return Err(format!("option '{}' given more than once", opt));
        }
        let Some(value) = args.next() else {
            return Err(format!("argument to option '{}' missing", opt));
        };
        let invalid = || format!("invalid argument to option '{}': '{}'", opt, value);
        match opt {
            "v" => config.version = value.parse::<Version>().map_err(|_| invalid())?,
            "n" => config.count = value.parse().map_err(|_| invalid())?,
            "f" => config.format = value.parse().map_err(|_| invalid())?,
            "o" => output = value.parse().map_err(|_| invalid())?,
            "namespace" => config.namespace = Some(value),
            _ => config.name = Some(value),
        }
        seen.push(arg);
    }

    Ok(Command::Generate {
        config,
        output,
        include_metadata,
    })
}
