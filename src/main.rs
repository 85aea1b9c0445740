use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use mace_lang::cli::{self, CliError, EvalOptions};
use mace_lang::{Grammar, Value, output};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "mace")]
#[command(about = "Mace - An embeddable expression language with host-resolved identifiers")]
#[command(version)]
struct Cli {
    /// Pretty-print the output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum GrammarArg {
    Basic,
    Extended,
}

impl From<GrammarArg> for Grammar {
    fn from(arg: GrammarArg) -> Self {
        match arg {
            GrammarArg::Basic => Grammar::Basic,
            GrammarArg::Extended => Grammar::Extended,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// JSON object of identifier values
        #[arg(long)]
        vars: Option<String>,

        /// Also report the identifiers the evaluation reached
        #[arg(long)]
        track: bool,

        #[arg(long, value_enum, default_value = "extended")]
        grammar: GrammarArg,
    },

    /// Only validate syntax, don't evaluate
    Check {
        expression: Option<String>,

        #[arg(long, value_enum, default_value = "extended")]
        grammar: GrammarArg,
    },

    /// Evaluate a type expression such as `Map<String, Number> | Boolean`
    Type {
        source: Option<String>,

        #[arg(long)]
        vars: Option<String>,
    },

    /// Render `speaker : content` lines
    Message {
        text: Option<String>,

        #[arg(long)]
        vars: Option<String>,
    },

    /// Compile a query filter to a PostgREST query string
    Filter { source: Option<String> },

    /// Split text into paragraphs
    Paragraphs { text: Option<String> },
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli.command).map(|value| {
        if cli.pretty {
            output::to_json_pretty(&value)
        } else {
            output::to_json(&value)
        }
    });

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(command: Commands) -> Result<Value, CliError> {
    match command {
        Commands::Eval {
            expression,
            vars,
            track,
            grammar,
        } => {
            let options = EvalOptions {
                expression: read_input(expression)?,
                vars,
                grammar: grammar.into(),
                track,
            };
            Ok(cli::execute_eval(&options)?.into_value())
        }
        Commands::Check {
            expression,
            grammar,
        } => {
            cli::execute_check(&read_input(expression)?, grammar.into())?;
            Ok(Value::from("Syntax is valid"))
        }
        Commands::Type { source, vars } => cli::execute_type(&read_input(source)?, vars.as_deref()),
        Commands::Message { text, vars } => {
            cli::execute_message(&read_input(text)?, vars.as_deref())
        }
        Commands::Filter { source } => cli::execute_filter(&read_input(source)?),
        Commands::Paragraphs { text } => cli::execute_paragraphs(&read_input(text)?),
    }
}

fn read_input(argument: Option<String>) -> Result<String, CliError> {
    match argument {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}
