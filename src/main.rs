use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::PathBuf;
use todostore::{
    CategoryProvider, Config, DueState, Priority, SortKey, Status, Task, TaskDraft, TaskPatch,
    TaskQuery, TaskStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore CLI - create, filter, sort and delete local tasks")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,

        #[arg(long, value_parser = parse_status, default_value = "incomplete")]
        status: Status,

        /// Category id or name (default: first category)
        #[arg(long)]
        category: Option<String>,
    },

    /// Add every task listed in a YAML or JSON file
    Bulk { file: PathBuf },

    /// List tasks
    List {
        /// Case-insensitive title substring
        #[arg(long, default_value = "")]
        search: String,

        /// Category id or name
        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,

        /// due-date, priority or status
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortKey>,
    },

    /// Change fields of a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, conflicts_with = "description")]
        clear_description: bool,

        #[arg(long)]
        due: Option<NaiveDate>,

        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Move a task to its next status
    Advance { id: String },

    /// Delete a task
    Delete { id: String },

    /// List categories
    Categories,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.store_path {
        config.data_dir = path;
    }

    let mut store = TaskStore::open(config.open_storage()?)?;
    let categories = CategoryProvider::load(store.storage())?;

    match cli.command {
        Commands::Add {
            title,
            due,
            description,
            priority,
            status,
            category,
        } => {
            let category = resolve_category(&categories, category.as_deref())?;
            let mut draft = TaskDraft::new(require_title(&title)?, due, category)
                .priority(priority)
                .status(status);
            draft.description = description;

            let task = store.create(draft)?;
            println!("Created task {}", task.id.bold());
        }
        Commands::Bulk { file } => {
            let content = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let mut drafts: Vec<TaskDraft> =
                serde_yaml::from_str(&content).with_context(|| format!("Failed to parse drafts in {:?}", file))?;

            for draft in &mut drafts {
                require_title(&draft.title)?;
                if draft.category.is_empty() {
                    draft.category = resolve_category(&categories, None)?;
                }
            }

            let created = store.create_bulk(drafts)?;
            println!("Created {} tasks", created.len());
        }
        Commands::List {
            search,
            category,
            status,
            sort,
        } => {
            let mut query = TaskQuery::new().text(search).sort(sort.unwrap_or(config.default_sort));
            if let Some(category) = category {
                query = query.category(lookup_category(&categories, &category));
            }
            if let Some(status) = status {
                query = query.status(status);
            }

            let view = store.query(&query);
            if view.is_empty() {
                println!("No tasks");
            }
            let today = Local::now().date_naive();
            for task in view {
                print_task(task, &categories, today);
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            clear_description,
            due,
            priority,
            status,
            category,
        } => {
            let mut patch = TaskPatch::new();
            if let Some(title) = title {
                patch = patch.title(require_title(&title)?);
            }
            if clear_description {
                patch = patch.description(None);
            } else if description.is_some() {
                patch = patch.description(description);
            }
            patch.due_date = due;
            patch.priority = priority;
            patch.status = status;
            if let Some(category) = category {
                patch = patch.category(lookup_category(&categories, &category));
            }

            if patch.is_empty() {
                return Err(eyre!("Nothing to change; pass at least one field"));
            }
            match store.update(&id, patch)? {
                Some(task) => println!("Updated task {}", task.id.bold()),
                None => println!("No task with id {}", id),
            }
        }
        Commands::Advance { id } => {
            match store.advance_status(&id)? {
                Some(task) => println!("{} is now {}", task.id.bold(), status_label(task.status)),
                None => println!("No task with id {}", id),
            }
        }
        Commands::Delete { id } => {
            if store.delete(&id)? {
                println!("Deleted task {}", id.bold());
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::Categories => {
            for category in categories.all() {
                println!("{:>4}  {:<12} {}", category.id, category.name, category.color.dimmed());
            }
        }
    }

    Ok(())
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn require_title(title: &str) -> Result<&str> {
    if title.trim().is_empty() {
        return Err(eyre!("Task title cannot be empty"));
    }
    Ok(title)
}

/// Category id for a draft: explicit input, else the first category
fn resolve_category(categories: &CategoryProvider, input: Option<&str>) -> Result<String> {
    match input {
        Some(input) => Ok(lookup_category(categories, input)),
        None => categories
            .default_category()
            .map(|c| c.id.clone())
            .ok_or_else(|| eyre!("No categories available; pass --category")),
    }
}

/// Match by id, then by name; unknown input passes through as an id
fn lookup_category(categories: &CategoryProvider, input: &str) -> String {
    if categories.get(input).is_some() {
        return input.to_string();
    }
    categories
        .all()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(input))
        .map(|c| c.id.clone())
        .unwrap_or_else(|| input.to_string())
}

fn print_task(task: &Task, categories: &CategoryProvider, today: NaiveDate) {
    let category = categories.name_of(&task.category).unwrap_or(task.category.as_str());
    println!(
        "{}  {}  {} {}  due {}  ({})",
        task.id.dimmed(),
        task.title.bold(),
        priority_label(task.priority),
        status_label(task.status),
        due_label(task, today),
        category
    );
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("    {}", description.dimmed());
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("[{}]", priority);
    match priority {
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
    }
}

fn status_label(status: Status) -> ColoredString {
    let label = status.to_string();
    match status {
        Status::Complete => label.green(),
        Status::InProgress => label.blue(),
        Status::Incomplete => label.red(),
        Status::Hold => label.yellow(),
    }
}

fn due_label(task: &Task, today: NaiveDate) -> ColoredString {
    let label = task.due_date.format("%Y-%m-%d").to_string();
    match task.due_state(today) {
        DueState::Overdue => label.red().bold(),
        DueState::Today => label.yellow(),
        DueState::Soon => label.blue(),
        DueState::Later => label.green(),
    }
}
