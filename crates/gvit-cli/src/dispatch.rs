use gvit_core::{
    outcome_from_error, CloneRequest, CommandContext, CommandGroup, CommandInfo, CommitRequest,
    ConfigAction, ConfigRequest, ConfigUpdates, EnvsDeleteRequest, EnvsPruneRequest,
    EnvsResetRequest, EnvsShowRequest, ExecutionOutcome, InitRequest, PullRequest, SetupOptions,
    SetupRequest,
};

use crate::cli::{
    CommandGroupCli, ConfigCommand, ConfigSetArgs, EnvsCommand, ProvisionFlags,
};

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> (CommandInfo, ExecutionOutcome) {
    match group {
        CommandGroupCli::Clone(args) => {
            let info = CommandInfo::new(CommandGroup::Clone, "clone");
            let request = CloneRequest {
                url: args.url.clone(),
                target_dir: args.target_dir.clone(),
                options: setup_options(&args.flags),
                git_args: args.git_args.clone(),
            };
            core_call(info, || gvit_core::clone(ctx, &request))
        }
        CommandGroupCli::Init(args) => {
            let info = CommandInfo::new(CommandGroup::Init, "init");
            let request = InitRequest {
                directory: args.directory.clone(),
                remote_url: args.remote_url.clone(),
                options: setup_options(&args.flags),
                git_args: args.git_args.clone(),
            };
            core_call(info, || gvit_core::init(ctx, &request))
        }
        CommandGroupCli::Setup(args) => {
            let info = CommandInfo::new(CommandGroup::Setup, "setup");
            let request = SetupRequest {
                directory: args.directory.clone(),
                options: setup_options(&args.flags),
            };
            core_call(info, || gvit_core::setup(ctx, &request))
        }
        CommandGroupCli::Pull(args) => {
            let info = CommandInfo::new(CommandGroup::Pull, "pull");
            let request = PullRequest {
                directory: args.directory.clone(),
                base_deps: args.base_deps.clone(),
                extra_deps: args.extra_deps.clone(),
                no_deps: args.no_deps,
                force_deps: args.force_deps,
                git_args: args.git_args.clone(),
            };
            core_call(info, || gvit_core::pull(ctx, &request))
        }
        CommandGroupCli::Commit(args) => {
            let info = CommandInfo::new(CommandGroup::Commit, "commit");
            let request = CommitRequest {
                target_dir: args.target_dir.clone(),
                skip_validation: args.skip_validation,
                git_args: args.git_args.clone(),
            };
            core_call(info, || gvit_core::commit(ctx, &request))
        }
        CommandGroupCli::Envs(cmd) => match cmd {
            EnvsCommand::List => {
                let info = CommandInfo::new(CommandGroup::Envs, "envs list");
                core_call(info, || gvit_core::envs_list(ctx))
            }
            EnvsCommand::Show { name } => {
                let info = CommandInfo::new(CommandGroup::Envs, "envs show");
                let request = EnvsShowRequest { name: name.clone() };
                core_call(info, || gvit_core::envs_show(ctx, &request))
            }
            EnvsCommand::Delete { name } => {
                let info = CommandInfo::new(CommandGroup::Envs, "envs delete");
                let request = EnvsDeleteRequest { name: name.clone() };
                core_call(info, || gvit_core::envs_delete(ctx, &request))
            }
            EnvsCommand::Prune { dry_run, yes } => {
                let info = CommandInfo::new(CommandGroup::Envs, "envs prune");
                let request = EnvsPruneRequest {
                    dry_run: *dry_run,
                    yes: *yes,
                };
                core_call(info, || gvit_core::envs_prune(ctx, &request))
            }
            EnvsCommand::Reset { name, no_deps, yes } => {
                let info = CommandInfo::new(CommandGroup::Envs, "envs reset");
                let request = EnvsResetRequest {
                    name: name.clone(),
                    no_deps: *no_deps,
                    yes: *yes,
                };
                core_call(info, || gvit_core::envs_reset(ctx, &request))
            }
        },
        CommandGroupCli::Config(cmd) => {
            let info = CommandInfo::new(CommandGroup::Config, "config");
            let request = ConfigRequest {
                action: config_action(cmd),
            };
            core_call(info, || gvit_core::config(ctx, &request))
        }
    }
}

fn core_call(
    info: CommandInfo,
    call: impl FnOnce() -> anyhow::Result<ExecutionOutcome>,
) -> (CommandInfo, ExecutionOutcome) {
    match call() {
        Ok(outcome) => (info, outcome),
        Err(err) => (info, outcome_from_error(&err)),
    }
}

fn setup_options(flags: &ProvisionFlags) -> SetupOptions {
    SetupOptions {
        venv_name: flags.venv_name.clone(),
        backend: flags.backend.clone(),
        python: flags.python.clone(),
        base_deps: flags.base_deps.clone(),
        extra_deps: flags.extra_deps.clone(),
        no_deps: flags.no_deps,
        force: flags.force,
    }
}

fn config_action(cmd: &ConfigCommand) -> ConfigAction {
    match cmd {
        ConfigCommand::Show => ConfigAction::Show,
        ConfigCommand::Path => ConfigAction::Path,
        ConfigCommand::Set(ConfigSetArgs {
            backend,
            python,
            install_deps,
            deps_path,
            verbose,
            conda_path,
        }) => ConfigAction::Set(ConfigUpdates {
            backend: backend.clone(),
            python: python.clone(),
            install_deps: *install_deps,
            deps_path: deps_path.clone(),
            verbose: *verbose,
            conda_path: conda_path.clone(),
        }),
    }
}
