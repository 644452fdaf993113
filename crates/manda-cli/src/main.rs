//! Manda AI CLI — entry point.
//!
//! # Commands
//!
//! - `manda status` — show runtime mode, provider keys, and the resolved provider
//! - `manda feedback -s FILE -r RUBRIC` — structured feedback for a submission
//! - `manda speak -t TEXT -o FILE` — synthesize speech
//! - `manda transcribe -a FILE` — transcribe a recording
//!
//! Each command builds the resolver from the process environment, awaits
//! resolution to completion, and only then runs its flow — no generation
//! call ever observes a partially-resolved client.

mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use manda_core::config::MANDA_SETTINGS_URL;
use manda_core::{ConfigSource, ProcessEnv, SpeechRequest, TranscriptRequest};
use manda_providers::{
    HttpBackendFactory, HttpSettingsStore, NoSettingsStore, ProviderResolver, Resolution,
    SettingsStore,
};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Manda Network — AI tools
#[derive(Parser)]
#[command(name = "manda", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show runtime mode, provider keys, and the resolved provider
    Status,

    /// Generate structured feedback for a submission
    Feedback {
        /// Path to the submission text
        #[arg(short, long)]
        submission: PathBuf,

        /// Rubric to grade against
        #[arg(short, long)]
        rubric: String,

        /// Optional assignment context
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Synthesize speech from text
    Speak {
        /// Text to speak
        #[arg(short, long)]
        text: String,

        /// Voice name (backend default when omitted)
        #[arg(long)]
        voice: Option<String>,

        /// Output audio file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Transcribe an audio recording
    Transcribe {
        /// Path to the audio file
        #[arg(short, long)]
        audio: PathBuf,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Status => status::run(resolve().await),
        Commands::Feedback {
            submission,
            rubric,
            context,
        } => run_feedback(submission, rubric, context).await,
        Commands::Speak { text, voice, out } => run_speak(text, voice, out).await,
        Commands::Transcribe { audio } => run_transcribe(audio).await,
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_feedback(
    submission: PathBuf,
    rubric: String,
    context: Option<String>,
) -> Result<()> {
    let submission_text = std::fs::read_to_string(&submission)
        .with_context(|| format!("failed to read submission: {}", submission.display()))?;

    let resolution = resolve().await;
    let feedback = manda_flows::generate_feedback(
        &resolution.client,
        &manda_core::FeedbackRequest {
            submission: submission_text,
            rubric,
            context,
        },
    )
    .await
    .context("feedback generation failed")?;

    println!("{}", serde_json::to_string_pretty(&feedback)?);
    Ok(())
}

async fn run_speak(text: String, voice: Option<String>, out: PathBuf) -> Result<()> {
    let resolution = resolve().await;
    let audio = manda_flows::synthesize(&resolution.client, &SpeechRequest { text, voice })
        .await
        .context("speech synthesis failed")?;

    std::fs::write(&out, &audio.audio)
        .with_context(|| format!("failed to write audio: {}", out.display()))?;
    info!(path = %out.display(), bytes = audio.audio.len(), mime = %audio.mime_type, "audio written");
    println!("wrote {} ({} bytes, {})", out.display(), audio.audio.len(), audio.mime_type);
    Ok(())
}

async fn run_transcribe(audio: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&audio)
        .with_context(|| format!("failed to read audio: {}", audio.display()))?;
    let mime_type = guess_audio_mime(&audio);

    let resolution = resolve().await;
    let transcript = manda_flows::transcribe_audio(
        &resolution.client,
        &TranscriptRequest {
            audio: bytes,
            mime_type,
        },
    )
    .await
    .context("transcription failed")?;

    println!("{}", transcript.text);
    Ok(())
}

// ─────────────────────────────────────────────
// Bootstrap
// ─────────────────────────────────────────────

/// Build the resolver from the process environment and run one resolution
/// cycle. This is the single place the application decides its provider.
async fn resolve() -> Resolution {
    let env = Arc::new(ProcessEnv);
    let store: Arc<dyn SettingsStore> = match env.get(MANDA_SETTINGS_URL) {
        Some(url) => Arc::new(HttpSettingsStore::new(url)),
        None => Arc::new(NoSettingsStore),
    };

    ProviderResolver::new(env, store, Arc::new(HttpBackendFactory))
        .resolve()
        .await
}

/// Map a file extension to the mime type the transcription flow expects.
fn guess_audio_mime(path: &PathBuf) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        _ => "audio/ogg",
    }
    .to_string()
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("manda=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
