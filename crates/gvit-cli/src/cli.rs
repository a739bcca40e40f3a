use clap::{ArgAction, Args, Parser, Subcommand};

pub const GVIT_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const GVIT_BEFORE_HELP: &str = concat!(
    "gvit ",
    env!("CARGO_PKG_VERSION"),
    " – Git-aware Virtual Environment Manager\n\n",
    "\x1b[1;36mCore workflow\x1b[0m\n",
    "  clone            Clone a repository and provision its environment.\n",
    "  init             Initialize a repository and provision its environment.\n",
    "  setup            Provision an environment for an existing clone.\n",
    "  pull             Pull changes and reinstall drifted dependency groups.\n",
    "  commit           Commit with dependency-drift validation.\n\n",
    "\x1b[1;36mHousekeeping\x1b[0m\n",
    "  envs             List, inspect, delete, prune, or reset tracked environments.\n",
    "  config           Inspect or update the user-level defaults.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = GVIT_BEFORE_HELP,
    help_template = GVIT_HELP_TEMPLATE
)]
pub struct GvitCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        short = 'y',
        long,
        help = "Assume yes for every confirmation prompt",
        global = true
    )]
    pub yes: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Clone a Git repository and create its virtual environment.",
        override_usage = "gvit clone <URL> [OPTIONS] [-- <GIT_ARG>...]"
    )]
    Clone(CloneArgs),
    #[command(
        about = "Initialize a Git repository and create its virtual environment.",
        override_usage = "gvit init [DIR] [OPTIONS] [-- <GIT_ARG>...]"
    )]
    Init(InitArgs),
    #[command(
        about = "Create and track an environment for an already-cloned repository.",
        override_usage = "gvit setup [DIR] [OPTIONS]"
    )]
    Setup(SetupArgs),
    #[command(
        about = "Pull changes and reinstall dependency groups whose files changed.",
        override_usage = "gvit pull [DIR] [OPTIONS] [-- <GIT_ARG>...]"
    )]
    Pull(PullArgs),
    #[command(
        about = "Commit with dependency validation (drift gates the commit).",
        override_usage = "gvit commit [OPTIONS] [-- <GIT_ARG>...]"
    )]
    Commit(CommitArgs),
    #[command(subcommand, about = "Manage the environment registry.")]
    Envs(EnvsCommand),
    #[command(subcommand, about = "Inspect or update user-level defaults.")]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ProvisionFlags {
    #[arg(
        short = 'n',
        long,
        help = "Name of the virtual environment (defaults to .venv, or the repository name for conda)"
    )]
    pub venv_name: Option<String>,
    #[arg(short = 'b', long, help = "Environment backend (venv/virtualenv/conda)")]
    pub backend: Option<String>,
    #[arg(short = 'p', long, help = "Python version for the environment")]
    pub python: Option<String>,
    #[arg(
        short = 'd',
        long,
        help = "Path to the base dependency file (overrides repo/user config)"
    )]
    pub base_deps: Option<String>,
    #[arg(
        long,
        help = "Extra dependency groups, e.g. 'dev,test' or 'dev:reqs-dev.txt'"
    )]
    pub extra_deps: Option<String>,
    #[arg(long, help = "Skip dependency installation")]
    pub no_deps: bool,
    #[arg(short = 'f', long, help = "Overwrite an existing environment without asking")]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CloneArgs {
    #[arg(help = "Repository URL")]
    pub url: String,
    #[arg(short = 't', long, help = "Directory to clone into")]
    pub target_dir: Option<String>,
    #[command(flatten)]
    pub flags: ProvisionFlags,
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Extra arguments passed through to git clone"
    )]
    pub git_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(default_value = ".", help = "Directory to initialize")]
    pub directory: String,
    #[arg(short = 'r', long, help = "Remote URL to link as origin")]
    pub remote_url: Option<String>,
    #[command(flatten)]
    pub flags: ProvisionFlags,
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Extra arguments passed through to git init"
    )]
    pub git_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[arg(default_value = ".", help = "Directory of the repository")]
    pub directory: String,
    #[command(flatten)]
    pub flags: ProvisionFlags,
}

#[derive(Args, Debug)]
pub struct PullArgs {
    #[arg(default_value = ".", help = "Directory of the repository")]
    pub directory: String,
    #[arg(short = 'd', long, help = "Path to the base dependency file")]
    pub base_deps: Option<String>,
    #[arg(long, help = "Extra dependency groups, e.g. 'dev,test' or 'dev:reqs-dev.txt'")]
    pub extra_deps: Option<String>,
    #[arg(long, help = "Skip the dependency check even if changes are detected")]
    pub no_deps: bool,
    #[arg(short = 'f', long, help = "Reinstall all dependency groups regardless of drift")]
    pub force_deps: bool,
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Extra arguments passed through to git pull"
    )]
    pub git_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CommitArgs {
    #[arg(short = 't', long, default_value = ".", help = "Directory of the repository")]
    pub target_dir: String,
    #[arg(short = 's', long, help = "Skip dependency validation")]
    pub skip_validation: bool,
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Extra arguments passed through to git commit"
    )]
    pub git_args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum EnvsCommand {
    #[command(about = "List the environments tracked in the registry.")]
    List,
    #[command(about = "Display the registry record for one environment.")]
    Show {
        #[arg(help = "Registry name of the environment")]
        name: String,
    },
    #[command(about = "Remove an environment (backend and registry).")]
    Delete {
        #[arg(help = "Registry name of the environment")]
        name: String,
    },
    #[command(about = "Remove environments whose repository no longer exists.")]
    Prune {
        #[arg(long, help = "Only show what would be deleted")]
        dry_run: bool,
        #[arg(long, help = "Delete without asking for confirmation")]
        yes: bool,
    },
    #[command(about = "Recreate an environment and reinstall its tracked groups.")]
    Reset {
        #[arg(help = "Registry name of the environment")]
        name: String,
        #[arg(long, help = "Skip dependency installation")]
        no_deps: bool,
        #[arg(long, help = "Reset without asking for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Print the effective user-level defaults.")]
    Show,
    #[command(about = "Print the path of the user config file.")]
    Path,
    #[command(about = "Update user-level defaults.")]
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    #[arg(long, help = "Default environment backend (venv/virtualenv/conda)")]
    pub backend: Option<String>,
    #[arg(long, help = "Default Python version")]
    pub python: Option<String>,
    #[arg(long, help = "Install dependencies by default", value_name = "BOOL")]
    pub install_deps: Option<bool>,
    #[arg(long, help = "Default base dependency file path")]
    pub deps_path: Option<String>,
    #[arg(long, help = "Verbose output by default", value_name = "BOOL")]
    pub verbose: Option<bool>,
    #[arg(long, help = "Explicit path to the conda executable")]
    pub conda_path: Option<String>,
}
