use std::fs;

use crate::cli::commands::InitArgs;
use crate::cli::handlers::Context;
use crate::io::config_io;
use crate::io::project_io;
use crate::templates;

const CONFIG_TOML_TEMPLATE: &str = r##"[project]
name = {name}

# --- Profiles ---
# Role categories a task can be assigned to. The first one is the default
# for `ct profile add`.
[profiles]
types = ["Contractor", "Associate", "CDP", "Intern", "Manager"]

# --- Timelines ---
# Buckets in display order. Exports list timelines in this order; timelines
# not listed here come first. The first one is the default for `ct profile add`.
[timelines]
options = [
  "Week 1", "Week 2", "Week 3", "Week 4",
  "Month 1", "Month 2", "Month 3", "Month 6", "Month 12",
]

# --- Logging ---
# Base level for messages on stderr. -v raises it; RUST_LOG overrides it.
[logging]
level = "warn"
"##;

/// Infer a project name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render config.toml with the project name as a properly escaped TOML string
fn render_config_toml(name: &str) -> String {
    let quoted = toml::Value::String(name.to_string()).to_string();
    CONFIG_TOML_TEMPLATE.replace("{name}", &quoted)
}

pub fn cmd_init(args: InitArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let root = ctx.start_dir()?;
    let data_dir = root.join(project_io::DATA_DIR);

    if data_dir.is_dir() && !args.force {
        return Err("checktree project already exists in ./checktree/ (use --force to reinitialize)".into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!(
            "note: parent project found at {}/",
            parent_root.join(project_io::DATA_DIR).display()
        );
    }

    let template = templates::find_template(&args.template)
        .ok_or_else(|| format!("unknown template '{}' (see `ct templates`)", args.template))?;
    let data = template.data()?;

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&data_dir)?;
    fs::write(config_io::config_path(&data_dir), render_config_toml(&name))?;
    project_io::save_data(&data_dir, &data)?;

    tracing::info!(root = %root.display(), template = template.key, "project initialized");
    println!("Initialized checktree project: {}", name);
    println!("  {} tasks from {}", data.len(), template.label);
    Ok(())
}
