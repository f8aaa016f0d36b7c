mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::export;
use crate::io::config_io;
use crate::io::project_io::{self, ProjectError};
use crate::io::recovery::atomic_write;
use crate::model::project::Project;
use crate::model::task::ProfileAssignment;
use crate::ops::hierarchy::{build_hierarchy, tasks_for_profile};
use crate::ops::task_ops::{self, DropPosition, NewTask, Placement, ProfileUpdate, TaskUpdate};
use crate::ops::{check, import};
use crate::templates;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Flags shared by every command
pub struct Context {
    pub json: bool,
    /// Directory given with -C, resolved to an absolute path
    pub project_dir: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let project_dir = match &cli.project_dir {
            Some(dir) => Some(
                std::fs::canonicalize(dir)
                    .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
            ),
            None => None,
        };
        Ok(Context {
            json: cli.json,
            project_dir,
        })
    }

    /// Where commands start looking: the -C directory or the working directory
    pub fn start_dir(&self) -> Result<PathBuf, ProjectError> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(ProjectError::IoError),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &ctx),
        Commands::Templates => cmd_templates(&ctx),

        // Read commands
        Commands::List(args) => cmd_list(args, &ctx),
        Commands::Show(args) => cmd_show(args, &ctx),
        Commands::Check => cmd_check(&ctx),
        Commands::Export(args) => cmd_export(args, &ctx),

        // Write commands
        Commands::Load(args) => cmd_load(args, &ctx),
        Commands::Add(args) => cmd_add(args, &ctx),
        Commands::Edit(args) => cmd_edit(args, &ctx),
        Commands::Rm(args) => cmd_rm(args, &ctx),
        Commands::Profile(args) => cmd_profile(args, &ctx),
        Commands::Mv(args) => cmd_mv(args, &ctx),
        Commands::Import(args) => cmd_import(args, &ctx),
    }
}

/// Log level from the project's config, if a project can be found. Used to
/// set up logging before dispatch; any failure here resurfaces when the
/// command loads the project.
pub fn configured_log_level(project_dir: Option<&str>) -> String {
    let start = match project_dir {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(_) => return "warn".to_string(),
        },
    };
    project_io::discover_project(&start)
        .and_then(|root| config_io::read_config(&root.join(project_io::DATA_DIR)))
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| "warn".to_string())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_project(ctx: &Context) -> Result<Project, ProjectError> {
    let root = project_io::discover_project(&ctx.start_dir()?)?;
    project_io::load_project(&root)
}

fn save(project: &Project) -> Result<(), ProjectError> {
    project_io::save_data(&project.data_dir, &project.data)
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a rendered document to stdout, or write it to `path`
fn emit(content: &str, path: Option<&str>) -> CmdResult {
    match path {
        Some(path) => {
            atomic_write(Path::new(path), content.as_bytes())
                .map_err(|e| format!("could not write {}: {}", path, e))?;
            eprintln!("wrote {}", path);
        }
        None if content.ends_with('\n') => print!("{}", content),
        None => println!("{}", content),
    }
    Ok(())
}

fn print_task(project: &Project, id: &str, json: bool) -> CmdResult {
    let task = project
        .data
        .find(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    if json {
        print_json(task)
    } else {
        for line in format_task_detail(task, &project.data) {
            println!("{}", line);
        }
        Ok(())
    }
}

/// 1-based position from the command line to a 0-based index
fn profile_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "profile positions start at 1".to_string())
}

fn check_profile_type(project: &Project, profile_type: &str) -> Result<(), String> {
    if project.config.is_known_profile(profile_type) {
        Ok(())
    } else {
        Err(format!(
            "unknown profile type '{}' (expected: {})",
            profile_type,
            project.config.profiles.types.join(", ")
        ))
    }
}

fn check_timeline(project: &Project, timeline: &str) -> Result<(), String> {
    if project.config.is_known_timeline(timeline) {
        Ok(())
    } else {
        Err(format!(
            "unknown timeline '{}' (expected: {})",
            timeline,
            project.config.timelines.options.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_templates(ctx: &Context) -> CmdResult {
    if ctx.json {
        let list: Vec<_> = templates::TEMPLATES.iter().map(template_to_json).collect();
        return print_json(&list);
    }
    for line in format_templates(templates::TEMPLATES) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_list(args: ListArgs, ctx: &Context) -> CmdResult {
    let project = load_project(ctx)?;

    if let Some(profile) = args.profile {
        let checklist = tasks_for_profile(
            &project.data.tasks,
            &profile,
            &project.config.timelines.options,
        );
        if ctx.json {
            return print_json(&checklist);
        }
        for line in format_profile_checklist(&checklist) {
            println!("{}", line);
        }
        return Ok(());
    }

    let tree = build_hierarchy(&project.data.tasks);
    if ctx.json {
        return print_json(&tree);
    }
    if tree.is_empty() {
        println!("no tasks");
    }
    for line in format_tree(&tree) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, ctx: &Context) -> CmdResult {
    let project = load_project(ctx)?;
    if ctx.json {
        let task = project
            .data
            .find(&args.id)
            .ok_or_else(|| format!("task not found: {}", args.id))?;
        let mut children: Vec<_> = project
            .data
            .tasks
            .iter()
            .filter(|t| t.parent_id.as_deref() == Some(task.id.as_str()))
            .collect();
        children.sort_by(|a, b| a.order.total_cmp(&b.order));
        return print_json(&TaskDetailJson {
            task,
            children: children.iter().map(|t| t.id.as_str()).collect(),
        });
    }
    print_task(&project, &args.id, false)
}

fn cmd_check(ctx: &Context) -> CmdResult {
    let project = load_project(ctx)?;
    let result = check::check_data(&project.data, &project.config);

    if ctx.json {
        print_json(&result)?;
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
    }
    if result.valid {
        Ok(())
    } else {
        Err(format!("task store has {} errors", result.errors.len()).into())
    }
}

fn cmd_export(args: ExportCmd, ctx: &Context) -> CmdResult {
    let project = load_project(ctx)?;
    match args.action {
        ExportAction::Json(out) => {
            let mut content = export::export_json(&project.data)?;
            content.push('\n');
            emit(&content, out.output.as_deref())
        }
        ExportAction::Csv(out) => emit(&export::export_csv(&project.data), out.output.as_deref()),
        ExportAction::Profile(args) => {
            let checklist = tasks_for_profile(
                &project.data.tasks,
                &args.profile,
                &project.config.timelines.options,
            );
            if checklist.is_empty() {
                tracing::warn!(profile = %args.profile, "no tasks assigned to this profile");
            }
            let content = match args.format {
                ProfileFormat::Md => export::export_profile_markdown(&checklist),
                ProfileFormat::Csv => export::export_profile_csv(&checklist),
            };
            emit(&content, args.output.as_deref())
        }
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_load(args: LoadArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;
    let template = templates::find_template(&args.key)
        .ok_or_else(|| format!("unknown template '{}' (see `ct templates`)", args.key))?;
    project.data = template.data()?;
    save(&project)?;
    tracing::info!(template = template.key, tasks = project.data.len(), "template loaded");
    println!("loaded {} ({} tasks)", template.label, project.data.len());
    Ok(())
}

fn cmd_add(args: AddArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;
    let new = NewTask {
        name: args.name,
        description: args.description.unwrap_or_default(),
        parent_id: args.parent,
        placement: if args.first {
            Placement::FirstChild
        } else {
            Placement::Append
        },
    };
    let id = task_ops::add_task(&mut project.data, new)?;
    save(&project)?;

    if ctx.json {
        let task = project
            .data
            .find(&id)
            .ok_or_else(|| format!("task not found: {}", id))?;
        return print_json(&AddedJson {
            id: id.clone(),
            level: task.level,
            order: task.order,
            parent_id: task.parent_id.clone(),
        });
    }
    println!("{}", id);
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;
    task_ops::update_task(
        &mut project.data,
        &args.id,
        TaskUpdate {
            name: args.name,
            description: args.description,
        },
    )?;
    save(&project)?;
    print_task(&project, &args.id, ctx.json)
}

fn cmd_rm(args: RmArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;
    let deleted = task_ops::delete_task(&mut project.data, &args.id)?;
    save(&project)?;

    if ctx.json {
        return print_json(&DeletedJson { deleted });
    }
    match deleted.len() {
        1 => println!("deleted {}", args.id),
        n => println!("deleted {} and {} subtasks", args.id, n - 1),
    }
    Ok(())
}

fn cmd_profile(args: ProfileCmd, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;

    let (id, changed) = match args.action {
        ProfileAction::Add(args) => {
            let profile_type = match args.profile_type {
                Some(p) => p,
                None => project
                    .config
                    .default_profile_type()
                    .ok_or("no profile types configured")?
                    .to_string(),
            };
            let timeline = match args.timeline {
                Some(t) => t,
                None => project
                    .config
                    .default_timeline()
                    .ok_or("no timelines configured")?
                    .to_string(),
            };
            check_profile_type(&project, &profile_type)?;
            check_timeline(&project, &timeline)?;
            task_ops::add_profile(
                &mut project.data,
                &args.id,
                ProfileAssignment::new(profile_type, timeline),
            )?;
            (args.id, true)
        }
        ProfileAction::Set(args) => {
            if let Some(p) = &args.profile_type {
                check_profile_type(&project, p)?;
            }
            if let Some(t) = &args.timeline {
                check_timeline(&project, t)?;
            }
            let changed = task_ops::update_profile(
                &mut project.data,
                &args.id,
                profile_index(args.index)?,
                ProfileUpdate {
                    profile_type: args.profile_type,
                    timeline: args.timeline,
                },
            )?;
            (args.id, changed)
        }
        ProfileAction::Rm(args) => {
            let changed =
                task_ops::remove_profile(&mut project.data, &args.id, profile_index(args.index)?)?;
            (args.id, changed)
        }
    };

    // Out-of-range positions are a logged no-op
    if changed {
        save(&project)?;
    }
    print_task(&project, &id, ctx.json)
}

fn cmd_mv(args: MvArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;

    let (position, target) = if let Some(t) = args.before {
        (DropPosition::Before, Some(t))
    } else if let Some(t) = args.after {
        (DropPosition::After, Some(t))
    } else if let Some(t) = args.inside {
        (DropPosition::Inside, Some(t))
    } else {
        (DropPosition::Root, None)
    };

    let outcome = task_ops::move_task(&mut project.data, &args.id, target.as_deref(), position)?;
    save(&project)?;

    if ctx.json {
        return print_json(&moved_to_json(&args.id, position, target.as_deref(), &outcome));
    }
    match &target {
        Some(t) => println!("moved {} {} {}", args.id, position, t),
        None => println!("moved {} to root", args.id),
    }
    if outcome.relevelled > 0 {
        println!("  {} subtasks re-levelled", outcome.relevelled);
    }
    Ok(())
}

fn cmd_import(args: ImportArgs, ctx: &Context) -> CmdResult {
    let mut project = load_project(ctx)?;
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let data = import::parse_import(&text)?;

    if let Some(backup) = &args.backup {
        let mut current = export::export_json(&project.data)?;
        current.push('\n');
        atomic_write(Path::new(backup), current.as_bytes())
            .map_err(|e| format!("could not write backup {}: {}", backup, e))?;
        println!("backed up {} tasks to {}", project.data.len(), backup);
    }

    project.data = data;
    save(&project)?;
    tracing::info!(file = %args.file, tasks = project.data.len(), "store replaced by import");

    let report = check::check_data(&project.data, &project.config);
    println!("imported {} tasks", project.data.len());
    if !report.valid {
        eprintln!(
            "warning: imported data has {} problems, run `ct check` for details",
            report.errors.len()
        );
    }
    Ok(())
}
