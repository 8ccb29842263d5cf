//! railchat CLI
//!
//! Terminal client over the same project store and submission flow as the
//! browser client:
//! - Create, list, select and rename projects
//! - Edit the system prompt of the active project
//! - Send prompts (with attachments) through the relay
//! - Manage Azure OpenAI settings

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use railchat::client::{FileStore, PathAttachment, ReqwestTransport};
use railchat::config::{generate_default_config, Config};
use railchat_core::composer::Composer;
use railchat_core::error::{Notice, NoticeLevel};
use railchat_core::kv::{JsonStore, KeyValueStore};
use railchat_core::model::{ChatMessage, Role};
use railchat_core::settings::{Settings, MODEL_CHOICES};
use railchat_core::store::ProjectStore;
use railchat_core::submit::{submit, ChatTransport};

#[derive(Parser)]
#[command(name = "railchat-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with Azure OpenAI deployments from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding projects and settings (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Show info-level logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project and make it active
    New,

    /// List projects, marking the active one
    List,

    /// Make a project active
    Use {
        /// Project id
        id: String,
    },

    /// Rename a project
    Rename {
        /// Project id
        id: String,
        /// New name
        name: String,
    },

    /// Show or set the system prompt of the active project
    System {
        /// New system prompt (omit to show the current one)
        prompt: Option<String>,
    },

    /// Send a prompt to the active project
    Send {
        /// Prompt text (may be empty when files are attached)
        prompt: Option<String>,
        /// Files to attach (csv, pdf, png, jpg)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Print the transcript of the active project
    History,

    /// Show or update the Azure OpenAI settings
    Settings {
        /// Azure OpenAI endpoint, e.g. https://my-resource.openai.azure.com/
        #[arg(long)]
        endpoint: Option<String>,
        /// Azure OpenAI API key
        #[arg(long)]
        api_key: Option<String>,
        /// Model (deployment) to use
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(MODEL_CHOICES))]
        model: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.client.data_dir = dir.to_string_lossy().to_string();
    }

    let mut logging = config.logging.clone();
    if !cli.verbose {
        logging.level = "warn".to_string();
    }
    railchat::logging::init(&logging, &[]);

    if let Commands::Config { output } = &cli.command {
        let template = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &template)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", template),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let kv = JsonStore::new(FileStore::open(&config.client.data_dir));
    let mut settings = Settings::load(&kv);
    let mut store = ProjectStore::load(kv);

    match cli.command {
        Commands::New => {
            let project = store.create_project();
            println!("{}", project.id);
            notify(&Notice::success(format!("Created \"{}\"", project.name)));
        }

        Commands::List => {
            if store.projects().is_empty() {
                println!("No projects yet. Create one with `railchat-cli new`.");
            }
            for project in store.projects() {
                let marker = if store.active_id() == Some(project.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {} ({} messages)",
                    marker,
                    project.id,
                    project.name,
                    project.history.len()
                );
            }
        }

        Commands::Use { id } => {
            if !store.select_project(&id) {
                notify(&Notice::error(format!("No project with id {}", id)));
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Rename { id, name } => {
            if store.get(&id).is_none() {
                notify(&Notice::error(format!("No project with id {}", id)));
                return Ok(ExitCode::FAILURE);
            }
            if store.rename_project(&id, &name) {
                notify(&Notice::success("Project renamed."));
            } else {
                notify(&Notice::warning("Name unchanged."));
            }
        }

        Commands::System { prompt } => {
            let Some(project) = store.active_project() else {
                notify(&Notice::error("No active project selected."));
                return Ok(ExitCode::FAILURE);
            };
            match prompt {
                None => println!("{}", project.resolved_system_prompt()),
                Some(prompt) => {
                    store.update_system_prompt(&prompt);
                    notify(&Notice::success("System prompt updated."));
                }
            }
        }

        Commands::Send { prompt, files } => {
            let transport = ReqwestTransport::new(
                config.client.chat_url.clone(),
                Duration::from_secs(config.client.request_timeout_secs),
            )?;

            let prompt = prompt.unwrap_or_default();
            match send_prompt(&mut store, &settings, prompt, &files, &transport).await {
                Some(reply) => println!("{}", reply.content),
                None => return Ok(ExitCode::FAILURE),
            }
        }

        Commands::History => {
            let Some(project) = store.active_project() else {
                notify(&Notice::error("No active project selected."));
                return Ok(ExitCode::FAILURE);
            };
            println!("# {}", project.name);
            if project.history.is_empty() {
                println!("Start chatting in \"{}\"!", project.name);
            }
            for message in &project.history {
                let speaker = match message.role {
                    Role::User => "You",
                    Role::Assistant => "Assistant",
                };
                println!("\n{}:\n{}", speaker, message.content);
            }
        }

        Commands::Settings {
            endpoint,
            api_key,
            model,
        } => {
            let changed = endpoint.is_some() || api_key.is_some() || model.is_some();
            if let Some(endpoint) = endpoint {
                settings.endpoint = endpoint;
            }
            if let Some(api_key) = api_key {
                settings.api_key = api_key;
            }
            if let Some(model) = model {
                settings.model = model;
            }

            if changed {
                settings.save(store.kv());
                notify(&Notice::success("Settings saved successfully!"));
            }

            println!("Endpoint: {}", settings.endpoint);
            println!(
                "API key:  {}",
                if settings.api_key.is_empty() { "(not set)" } else { "********" }
            );
            println!("Model:    {}", settings.effective_model());
        }

        Commands::Config { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Send `prompt` and `files` to the active project and return the answer.
///
/// Nothing is sent (and the history is untouched) when a file cannot be
/// opened or is refused by the attachment policy. Failures are reported as
/// notices and yield `None`.
async fn send_prompt<K, T>(
    store: &mut ProjectStore<K>,
    settings: &Settings,
    prompt: String,
    files: &[PathBuf],
    transport: &T,
) -> Option<ChatMessage>
where
    K: KeyValueStore,
    T: ChatTransport + ?Sized,
{
    let mut composer: Composer<PathAttachment> = Composer::new();
    composer.sync_project(store.active_id());
    composer.set_text(prompt);

    let mut refused = 0;
    let mut opened = Vec::new();
    for path in files {
        match PathAttachment::open(path).await {
            Ok(file) => opened.push(file),
            Err(e) => {
                notify(&e.notice());
                refused += 1;
            }
        }
    }
    for rejection in composer.attach(opened) {
        notify(&Notice::error(rejection.to_string()));
        refused += 1;
    }
    if refused > 0 {
        notify(&Notice::error(format!(
            "Nothing was sent: {} file(s) could not be attached.",
            refused
        )));
        return None;
    }

    let (text, attachments) = composer.draft();
    match submit(store, settings, text, attachments, transport).await {
        Ok(reply) => Some(reply),
        Err(e) => {
            notify(&e.notice());
            None
        }
    }
}

/// Print a notice on stderr
fn notify(notice: &Notice) {
    let label = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    eprintln!("{}: {}", label, notice.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use railchat_core::kv::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> Settings {
        Settings {
            endpoint: "https://res.openai.azure.com/".to_string(),
            api_key: "key".to_string(),
            ..Settings::default()
        }
    }

    async fn relay(expected_requests: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "done" })))
            .expect(expected_requests)
            .mount(&server)
            .await;
        server
    }

    fn transport(server: &MockServer) -> ReqwestTransport {
        ReqwestTransport::new(format!("{}/api/chat", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_aborts_when_file_is_missing() {
        let server = relay(0).await;
        let mut store = ProjectStore::load(JsonStore::new(MemoryStore::new()));
        let project = store.create_project();

        let reply = send_prompt(
            &mut store,
            &settings(),
            "summarize the attached report".to_string(),
            &[PathBuf::from("/nonexistent/report.pdf")],
            &transport(&server),
        )
        .await;

        assert!(reply.is_none());
        assert!(store.get(&project.id).unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_send_aborts_when_file_is_refused() {
        let server = relay(0).await;
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "plain text").unwrap();

        let mut store = ProjectStore::load(JsonStore::new(MemoryStore::new()));
        let project = store.create_project();

        let reply = send_prompt(&mut store, &settings(), "read this".to_string(), &[notes], &transport(&server)).await;

        assert!(reply.is_none());
        assert!(store.get(&project.id).unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_send_with_attachment() {
        let server = relay(1).await;
        let dir = tempfile::tempdir().unwrap();
        let rows = dir.path().join("rows.csv");
        std::fs::write(&rows, "a,b\n1,2").unwrap();

        let mut store = ProjectStore::load(JsonStore::new(MemoryStore::new()));
        let project = store.create_project();

        let reply = send_prompt(&mut store, &settings(), "sum it".to_string(), &[rows], &transport(&server))
            .await
            .unwrap();

        assert_eq!(reply.content, "done");
        assert_eq!(store.get(&project.id).unwrap().history.len(), 2);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["files"][0]["filename"], "rows.csv");
    }
}
