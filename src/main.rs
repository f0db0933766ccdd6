use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use formfill::{
    plan_order, FieldDescriptor, FillConfig, FillExecutor, HybridMatcher, MappingSession,
    MatcherConfig, ProfileStore, ProviderHandle, UserDataRecord, VirtualPage,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Match form fields to user data and fill forms like a person would
#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(about = "Form-filling assistant engine", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map fields to user data and print the mapping table
    Map {
        #[command(flatten)]
        input: MatchInput,

        /// Print one tab-separated line per field instead of JSON
        #[arg(long)]
        table: bool,
    },
    /// Map fields, then print the order they would be filled in
    Plan {
        #[command(flatten)]
        input: MatchInput,

        /// Page snapshot (JSON)
        #[arg(long)]
        page: PathBuf,
    },
    /// Map fields and fill a page snapshot
    Fill {
        #[command(flatten)]
        input: MatchInput,

        /// Page snapshot (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Where to write the filled page
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage saved profiles
    Profile {
        /// Profile store directory
        #[arg(long, default_value = "./data")]
        store: PathBuf,

        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(ClapArgs, Debug)]
struct MatchInput {
    /// Detected fields (JSON array)
    #[arg(long)]
    fields: PathBuf,

    /// User data record (JSON object)
    #[arg(long)]
    data: PathBuf,

    /// Match with lexical rules only
    #[arg(long)]
    no_semantic: bool,

    /// Settings file (JSON with `matcher` and `fill` sections)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// List saved profiles
    List,
    /// Save a user data record under a name
    Save {
        name: String,
        /// User data record (JSON object)
        #[arg(long)]
        data: PathBuf,
    },
    /// Print one profile
    Show { index: usize },
    /// Delete one profile
    Delete { index: usize },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    matcher: MatcherConfig,
    fill: FillConfig,
}

impl Settings {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let settings: Settings = match path {
            Some(path) => read_json(path)?,
            None => Settings::default(),
        };
        settings.matcher.validate()?;
        settings.fill.validate()?;
        Ok(settings)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Run auto-mapping for the given input
async fn map_fields(input: &MatchInput, settings: &Settings) -> anyhow::Result<MappingSession> {
    let fields: Vec<FieldDescriptor> = read_json(&input.fields)?;
    let data: UserDataRecord = read_json(&input.data)?;

    let handle = (!input.no_semantic).then(ProviderHandle::global);
    let matcher = HybridMatcher::from_config(&settings.matcher, handle);
    if matcher.warm_up().await {
        info!("Semantic matching enabled");
    } else {
        info!("Using rule-based matching only");
    }

    let mut session = MappingSession::new();
    session.set_fields(fields);
    session.set_user_data(data);
    let summary = session.auto_map(&matcher).await?;
    info!("{}", summary.describe());
    Ok(session)
}

/// One line per scanned field: label, selector, key, score, method
fn print_table(session: &MappingSession) {
    for field in session.fields() {
        match session.mappings().get(&field.selector) {
            Some(mapping) => println!(
                "{}\t{}\t{}\t{:.2}\t{}",
                field.display_label(),
                field.selector,
                mapping.data_key,
                mapping.score,
                mapping.method
            ),
            None => println!("{}\t{}\t-\t-\t-", field.display_label(), field.selector),
        }
    }
}

fn load_page(path: &Path) -> anyhow::Result<VirtualPage> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(VirtualPage::from_json(&text)?)
}

fn run_profile(store: &Path, action: ProfileAction) -> anyhow::Result<()> {
    let store = ProfileStore::open(store)?;
    match action {
        ProfileAction::List => {
            for (index, profile) in store.list()?.iter().enumerate() {
                let saved = profile
                    .saved_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}\t{}\t{} keys\t{}", index, profile.name, profile.data.len(), saved);
            }
        }
        ProfileAction::Save { name, data } => {
            let record: UserDataRecord = read_json(&data)?;
            let profile = store.save(&name, record)?;
            println!("Saved profile '{}'", profile.name);
        }
        ProfileAction::Show { index } => {
            let profile = store.get(index)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Delete { index } => {
            let profile = store.delete(index)?;
            println!("Deleted profile '{}'", profile.name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Map { input, table } => {
            let settings = Settings::load(input.config.as_deref())?;
            let session = map_fields(&input, &settings).await?;
            if table {
                print_table(&session);
            } else {
                println!("{}", serde_json::to_string_pretty(session.mappings())?);
            }
        }
        Command::Plan { input, page } => {
            let settings = Settings::load(input.config.as_deref())?;
            let session = map_fields(&input, &settings).await?;
            let page = load_page(&page)?;
            for selector in plan_order(session.mappings(), &page, settings.fill.row_tolerance) {
                println!("{}", selector);
            }
        }
        Command::Fill { input, page, out } => {
            let settings = Settings::load(input.config.as_deref())?;
            let session = map_fields(&input, &settings).await?;
            let mut page_state = load_page(&page)?;

            let executor = FillExecutor::new(settings.fill.clone());
            let report = executor.fill_form(&mut page_state, session.mappings()).await;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(out) = out {
                std::fs::write(&out, page_state.to_json()?)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                info!("Filled page written to {:?}", out);
            }
        }
        Command::Profile { store, action } => run_profile(&store, action)?,
    }

    Ok(())
}
