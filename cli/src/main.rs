use std::fs::File;
use std::io::{self, BufReader, Read};

use canvas::engine::{EngineCore, SceneBundle};
use canvas::error::{CollaboratorError, EngineError};
use canvas::trajectory::{Action, SavePayload};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("step {step} ({kind} {object_id}) rejected: {source}")]
    Replay {
        step: usize,
        kind: String,
        object_id: String,
        #[source]
        source: EngineError,
    },
}

#[derive(Parser, Debug)]
#[command(name = "tabletop-cli", about = "Tabletop scene provider client and trajectory replayer")]
struct Cli {
    #[arg(long, env = "TABLETOP_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Ping,
    /// List recorded scene ids.
    Scenes,
    /// Print a scene's objects, lid map and initial relations.
    Show { scene_id: String },
    /// Re-run a saved trajectory against a freshly loaded scene.
    Replay {
        scene_id: String,

        #[arg(long, default_value = "-", help = "Trajectory file path, or - for stdin")]
        input: String,

        #[arg(long, default_value_t = false, help = "Save the replayed trajectory back to the server")]
        save: bool,
    },
}

/// Saved trajectories are a bare action list; a full save body is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayInput {
    Actions(Vec<Action>),
    Payload(SavePayload),
}

impl ReplayInput {
    fn into_actions(self) -> Vec<Action> {
        match self {
            Self::Actions(actions) => actions,
            Self::Payload(payload) => payload.actions,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();
    let client = Client::new(&cli.base_url);

    match cli.command {
        Command::Ping => run_ping(&client).await,
        Command::Scenes => {
            let json: Value = client.get("/scenes").await?;
            print_json(&json)
        }
        Command::Show { scene_id } => {
            let json: Value = client.get(&format!("/scene/{scene_id}")).await?;
            print_json(&json)
        }
        Command::Replay { scene_id, input, save } => run_replay(&client, &scene_id, &input, save).await,
    }
}

async fn run_ping(client: &Client) -> Result<(), CliError> {
    let response = client.http.get(client.url("/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_replay(client: &Client, scene_id: &str, input: &str, save: bool) -> Result<(), CliError> {
    let actions = read_replay_input(input)?;
    let bundle: SceneBundle = client.get(&format!("/scene/{scene_id}")).await?;

    let mut core = EngineCore::new();
    core.load_scene(bundle)?;
    replay_actions(&mut core, &actions)?;
    info!(%scene_id, steps = actions.len(), "trajectory replayed");

    print_json(&serde_json::json!({
        "scene_id": scene_id,
        "steps": core.trajectory().len(),
        "relations": core.relations(),
    }))?;

    if save {
        let request = core.save_request()?;
        let result = client
            .post(&format!("/save_trajectory/{}", request.scene_id), &request.payload)
            .await
            .map(|_| ())
            .map_err(|e| collaborator_error(&e));
        core.complete_save(&request, result)?;
        println!("saved");
    }
    Ok(())
}

/// Apply `actions` in order, stopping at the first rejected step.
fn replay_actions(core: &mut EngineCore, actions: &[Action]) -> Result<(), CliError> {
    for (i, action) in actions.iter().enumerate() {
        let applied = core.replay(action).map_err(|source| CliError::Replay {
            step: i + 1,
            kind: action.kind.to_string(),
            object_id: action.object_id.clone(),
            source,
        })?;
        if applied.pose() != action.pose() {
            warn!(
                step = i + 1,
                object_id = %action.object_id,
                "recorded pose differs from replayed pose"
            );
        }
    }
    Ok(())
}

fn read_replay_input(input: &str) -> Result<Vec<Action>, CliError> {
    let mut reader: Box<dyn Read> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_replay_input(&text)
}

fn parse_replay_input(text: &str) -> Result<Vec<Action>, CliError> {
    Ok(serde_json::from_str::<ReplayInput>(text)?.into_actions())
}

fn collaborator_error(err: &CliError) -> CollaboratorError {
    match err {
        CliError::ServerError { status, message } => CollaboratorError::Status { status: *status, message: message.clone() },
        CliError::InvalidJson(e) => CollaboratorError::Malformed(e.to_string()),
        other => CollaboratorError::Transport(other.to_string()),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

// =============================================================================
// HTTP
// =============================================================================

struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    fn new(base_url: &str) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let response = self.http.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Value, CliError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CliError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: text });
    }
    Ok(serde_json::from_str(&text)?)
}
