//! rshb: inspect command parameter metadata.
//!
//! Usage:
//!   rshb [--config rshell.json] [--commands FILE]... <subcommand>
//!
//! Loads command definition files, compiles their parameter metadata and
//! answers questions about parameter binding and scope resolution.

mod logging;
mod report;

use clap::{Parser as ClapParser, Subcommand};
use rshell_core::Value;
use rshell_engine::{EngineResult, ExecutionContext};
use rshell_options::{parse_engine_options_file, EngineOptions};
use rshell_params::{MergedParameter, ALL_SETS_MASK};
use std::path::PathBuf;
use std::process;
use tracing::debug;

#[derive(ClapParser, Debug)]
#[command(name = "rshb", about = "rshell binder - inspect command parameters and scopes")]
struct Cli {
    /// Path to rshell.json.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Command definition file to load. May be repeated.
    #[arg(long = "commands", value_name = "FILE", global = true)]
    commands: Vec<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Resolve parameter tokens against a command.
    Resolve {
        command: String,
        /// Tokens as typed, e.g. `-fo`. Use `--` before tokens starting with a dash.
        #[arg(required = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
        /// Let an exact name win over a longer prefix match.
        #[arg(long)]
        exact: bool,
    },
    /// Show a command's parameter sets and their members.
    Sets { command: String },
    /// List a command's parameters.
    Params {
        command: String,
        /// Only parameters in this parameter set.
        #[arg(long = "set")]
        set: Option<String>,
    },
    /// Resolve scope identifiers against a nested scope chain.
    Scope {
        #[arg(required = true, allow_hyphen_values = true)]
        ids: Vec<String>,
        /// Number of scopes nested below Global. The first is a script scope.
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            report::print_error(&error);
            1
        }
    };
    process::exit(exit_code);
}

fn load_options(cli: &Cli) -> EngineResult<EngineOptions> {
    let mut options = match &cli.config {
        Some(path) => parse_engine_options_file(path)?,
        None => EngineOptions::default(),
    };
    options.command_files.extend(cli.commands.iter().cloned());
    Ok(options)
}

fn run(cli: &Cli) -> EngineResult<i32> {
    let options = load_options(cli)?;
    logging::init_tracing(options.log_filter.as_deref());
    let context = ExecutionContext::from_options(options)?;
    debug!(commands = context.commands().len(), "Engine ready");

    match &cli.action {
        Action::Resolve { command, tokens, exact } => Ok(run_resolve(&context, command, tokens, *exact)),
        Action::Sets { command } => run_sets(&context, command).map(|()| 0),
        Action::Params { command, set } => run_params(&context, command, set.as_deref()),
        Action::Scope { ids, depth } => run_scope(context, ids, *depth),
    }
}

fn describe(parameter: &MergedParameter) -> String {
    let descriptor = &parameter.parameter;
    let mut text = format!("{} [{}] ({})", descriptor.name, descriptor.type_name, parameter.category);
    if !descriptor.aliases.is_empty() {
        text.push_str(&format!(" aliases: {}", descriptor.aliases.join(", ")));
    }
    text
}

/// Errors for individual tokens are printed and counted; the exit code is 1
/// if any token failed.
fn run_resolve(context: &ExecutionContext, command: &str, tokens: &[String], exact: bool) -> i32 {
    let mut failed = false;
    for token in tokens {
        match context.resolve_parameter(command, token, exact) {
            Ok(parameter) => println!("{} -> {}", token, describe(&parameter)),
            Err(error) => {
                failed = true;
                report::print_error(&error);
            }
        }
    }
    i32::from(failed)
}

fn run_sets(context: &ExecutionContext, command: &str) -> EngineResult<()> {
    let metadata = context.command(command)?;
    println!("{}", metadata.name());
    match metadata.default_parameter_set() {
        Some(name) => println!("  default: {} ({:#b})", name, metadata.default_set_flag()),
        None => println!("  default: {}", metadata.table().parameter_set_name(0)),
    }

    let sets: Vec<(String, u32)> = metadata
        .parameter_set_names()
        .iter()
        .filter_map(|name| metadata.parameter_set_flag(name).map(|flag| (name.clone(), flag)))
        .collect();
    let sets = if sets.is_empty() {
        vec![(metadata.table().parameter_set_name(ALL_SETS_MASK), ALL_SETS_MASK)]
    } else {
        sets
    };

    for (name, flag) in sets {
        println!("  {} ({:#b})", name, flag);
        let mandatory: Vec<&str> = metadata.mandatory_parameters(flag).iter().map(|p| p.name()).collect();
        for parameter in metadata.table().parameters_in_parameter_set(flag) {
            let marker = if mandatory.contains(&parameter.name()) { "*" } else { " " };
            println!("    {}{}", marker, parameter.name());
        }
    }
    Ok(())
}

fn run_params(context: &ExecutionContext, command: &str, set: Option<&str>) -> EngineResult<i32> {
    let metadata = context.command(command)?;
    let parameters = match set {
        Some(name) => match metadata.parameter_set_flag(name) {
            Some(flag) => metadata.table().parameters_in_parameter_set(flag),
            None => {
                let diagnostic = miette::MietteDiagnostic::new(format!(
                    "command '{}' has no parameter set named '{}'",
                    metadata.name(),
                    name
                ))
                .with_code("ParameterSetNotFound")
                .with_help(format!("known sets: {}", metadata.parameter_set_names().join(", ")));
                eprintln!("{:?}", miette::Report::new(diagnostic));
                return Ok(1);
            }
        },
        None => metadata.table().parameters().iter().collect(),
    };
    for parameter in parameters {
        println!("{}", describe(parameter));
    }
    Ok(0)
}

/// Builds Global -> script scope -> nested scopes, with a variable `$depth`
/// in each, then resolves each id from the innermost scope.
fn run_scope(mut context: ExecutionContext, ids: &[String], depth: usize) -> EngineResult<i32> {
    context.set_variable("depth", Value::Int(0))?;
    for level in 1..=depth {
        context.enter_scope(level == 1)?;
        context.set_variable("local:depth", Value::Int(level as i64))?;
    }

    let mut failed = false;
    for id in ids {
        match context.scope_by_id(id) {
            Ok(scope) => {
                let node = context.scopes().scope(scope)?;
                let value = node
                    .variable("depth")
                    .map(|v| v.value.to_string())
                    .unwrap_or_default();
                println!("{:>8} -> {} (depth {}, $depth = {})", id, scope, node.depth(), value);
            }
            Err(error) => {
                failed = true;
                report::print_error(&error);
            }
        }
    }
    Ok(i32::from(failed))
}
