use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ct", about = concat!("checktree v", env!("CARGO_PKG_VERSION"), " - nested checklists with profile timelines"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new checktree project in the current directory
    Init(InitArgs),
    /// List the built-in checklists
    Templates,
    /// Replace all tasks with a built-in checklist
    Load(LoadArgs),
    /// Show the task tree, or one profile's checklist
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Add a task (at the end of its siblings)
    Add(AddArgs),
    /// Change a task's name or description
    Edit(EditArgs),
    /// Delete a task and everything below it
    Rm(RmArgs),
    /// Add, change or remove profile assignments
    Profile(ProfileCmd),
    /// Move a task before/after/inside another, or to the root
    Mv(MvArgs),
    /// Replace all tasks with an exported JSON document
    Import(ImportArgs),
    /// Export tasks as JSON, CSV, or a profile checklist
    Export(ExportCmd),
    /// Validate the task store
    Check,
}

// ---------------------------------------------------------------------------
// Project setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Project name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Built-in checklist to start from (see `ct templates`)
    #[arg(long, default_value = "sample")]
    pub template: String,
    /// Reinitialize even if checktree/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Template key
    pub key: String,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Show the checklist for this profile, grouped by timeline
    #[arg(long)]
    pub profile: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task name
    pub name: String,
    /// Add as a subtask of this task ID
    #[arg(long)]
    pub parent: Option<String>,
    /// Task description
    #[arg(long, short)]
    pub description: Option<String>,
    /// Insert before the parent's existing subtasks instead of after
    #[arg(long, requires = "parent")]
    pub first: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("fields").required(true).multiple(true).args(["name", "description"])))]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New description (empty string clears it)
    #[arg(long, short)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct ProfileCmd {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Assign a profile (defaults: first configured type and timeline)
    Add(ProfileAddArgs),
    /// Change the profile at a position (1-based, as shown by `ct show`)
    Set(ProfileSetArgs),
    /// Remove the profile at a position (1-based)
    Rm(ProfileRmArgs),
}

#[derive(Args)]
pub struct ProfileAddArgs {
    /// Task ID
    pub id: String,
    /// Profile type
    pub profile_type: Option<String>,
    /// Timeline
    pub timeline: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("fields").required(true).multiple(true).args(["profile_type", "timeline"])))]
pub struct ProfileSetArgs {
    /// Task ID
    pub id: String,
    /// Profile position (1-based)
    pub index: usize,
    /// New profile type
    #[arg(long = "type")]
    pub profile_type: Option<String>,
    /// New timeline
    #[arg(long)]
    pub timeline: Option<String>,
}

#[derive(Args)]
pub struct ProfileRmArgs {
    /// Task ID
    pub id: String,
    /// Profile position (1-based)
    pub index: usize,
}

#[derive(Args)]
#[command(group(ArgGroup::new("destination").required(true).args(["before", "after", "inside", "root"])))]
pub struct MvArgs {
    /// Task ID
    pub id: String,
    /// Place directly before this task, as its sibling
    #[arg(long)]
    pub before: Option<String>,
    /// Place directly after this task, as its sibling
    #[arg(long)]
    pub after: Option<String>,
    /// Make it the last subtask of this task
    #[arg(long)]
    pub inside: Option<String>,
    /// Make it the last top-level task
    #[arg(long)]
    pub root: bool,
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import (as written by `ct export json`)
    pub file: String,
    /// Write the current tasks as JSON to this file before replacing them
    #[arg(long)]
    pub backup: Option<String>,
}

#[derive(Args)]
pub struct ExportCmd {
    #[command(subcommand)]
    pub action: ExportAction,
}

#[derive(Subcommand)]
pub enum ExportAction {
    /// The whole store as JSON (re-importable)
    Json(OutputArg),
    /// The whole store as CSV, one row per task and profile
    Csv(OutputArg),
    /// One profile's checklist, grouped by timeline
    Profile(ExportProfileArgs),
}

#[derive(Args)]
pub struct OutputArg {
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfileFormat {
    Md,
    Csv,
}

#[derive(Args)]
pub struct ExportProfileArgs {
    /// Profile type
    pub profile: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = ProfileFormat::Md)]
    pub format: ProfileFormat,
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<String>,
}
