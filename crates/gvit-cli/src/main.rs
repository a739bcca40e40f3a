use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use gvit_core::{
    format_status_message, to_json_response, CommandContext, CommandGroup, CommandInfo,
    CommandStatus, ExecutionOutcome, GlobalOptions,
};
use serde_json::Value;

mod cli;
mod dispatch;
mod style;

use cli::GvitCli;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = GvitCli::parse();

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
        assume_yes: cli.yes,
    };

    let ctx = CommandContext::new(&global).map_err(|err| eyre!("{err:?}"))?;
    // the user config may raise the default verbosity
    let verbose = if cli.verbose == 0 && ctx.verbose() { 1 } else { cli.verbose };
    init_tracing(cli.trace, verbose, cli.quiet);
    let (info, outcome) = dispatch::dispatch_command(&ctx, &cli.command);
    let code = emit_output(&cli, &info, &outcome);

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("gvit={level},gvit_cli={level},gvit_core={level},gvit_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &GvitCli, info: &CommandInfo, outcome: &ExecutionOutcome) -> i32 {
    // exit code surface is 0 on success, 1 on any failure
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError | CommandStatus::Failure => 1,
    };

    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = to_json_response(info, outcome, code);
        match serde_json::to_string_pretty(&payload) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("could not render JSON envelope: {err}"),
        }
    } else if !cli.quiet {
        let message = format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        if let Some(listing) = render_envs_list(&style, info, &outcome.details) {
            println!("{listing}");
        }
        if let Some(diagnostic) = outcome.details.get("diagnostic").and_then(Value::as_str) {
            eprintln!("{}", style.hint(diagnostic));
        }
    } else if code != 0 {
        eprintln!("{}", outcome.message);
    }

    code
}

fn render_envs_list(style: &Style, info: &CommandInfo, details: &Value) -> Option<String> {
    if info.group != CommandGroup::Envs {
        return None;
    }
    let environments = details.get("environments")?.as_array()?;
    if environments.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for env in environments {
        let name = env.get("name")?.as_str()?;
        lines.push(format!("\n  • {}", style.emphasis(name)));
        lines.push(format!(
            "    Backend:      {}",
            env.get("backend")?.as_str()?
        ));
        lines.push(format!("    Python:       {}", env.get("python")?.as_str()?));
        lines.push(format!(
            "    Environment:  {}",
            env.get("environment")?.as_str()?
        ));
        lines.push(format!(
            "    Repository:   {}",
            env.get("repository")?.get("path")?.as_str()?
        ));
        lines.push(format!(
            "    Registry:     {}",
            env.get("registry_file")?.as_str()?
        ));
        lines.push(format!(
            "    Command:      {}",
            style.info(env.get("activation_command")?.as_str()?)
        ));
    }
    Some(lines.join("\n"))
}
