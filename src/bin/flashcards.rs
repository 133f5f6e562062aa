//! CLI binary for edgequake-flashcards.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ChainConfig` and prints the resulting flashcards.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_flashcards::{
    extract, generate, write_flashcards, ChainConfig, ChainOutput, ChainProgressCallback,
    Difficulty, GenerationPath, ProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the running stage, plus one
/// log line per finished or failed stage.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<Stage, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed(&self, stage: Stage) -> String {
        let ms = self
            .start_times
            .lock()
            .map(|mut t| t.remove(&stage))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        dim(&format!("{:.1}s", ms as f64 / 1000.0))
    }
}

impl ChainProgressCallback for CliProgressCallback {
    fn on_chain_start(&self, difficulty: &Difficulty) {
        self.bar.set_prefix("Generating");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating {difficulty} flashcards…"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        if let Ok(mut t) = self.start_times.lock() {
            t.insert(stage, Instant::now());
        }
        self.bar.set_message(format!("{stage}"));
    }

    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        self.bar.println(format!(
            "  {} {:<9} {:<12} {}",
            green("✓"),
            stage,
            dim(&format!("{output_len:>6} chars")),
            self.elapsed(stage),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            let mut s: String = error.chars().take(79).collect();
            s.push('\u{2026}');
            s
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<9} {}  {}",
            red("✗"),
            stage,
            red(&msg),
            self.elapsed(stage),
        ));
    }

    fn on_fallback(&self, _reason: &str) {
        self.bar.println(format!(
            "  {} {}",
            yellow("⚠"),
            "chain failed, switching to one-shot generation"
        ));
    }

    fn on_chain_complete(&self, card_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} flashcards generated",
            green("✔"),
            bold(&card_count.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Medium-difficulty flashcards (stdout)
  flashcards lecture.pdf

  # Easy cards from a Word document, written to a JSON file
  flashcards -d Easy notes.docx -o cards.json

  # Hard cards with a specific model
  flashcards -d Hard --model gpt-4.1 --provider openai chapter.pdf

  # From a URL
  flashcards https://arxiv.org/pdf/1706.03762 --json > cards.json

  # Show the extracted text only (no API key needed)
  flashcards --extract-only lecture.pdf

DIFFICULTY:
  Easy     5–8 cards    basic definitions and key facts
  Medium   8–12 cards   concepts, relationships, applications
  Hard     12–15 cards  synthesis, analysis, edge cases

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise the system library is used)

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Generate:        flashcards lecture.pdf -o cards.json
"#;

/// Generate study flashcards from PDF and DOCX documents using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "flashcards",
    version,
    about = "Generate study flashcards from PDF and DOCX documents using LLMs",
    long_about = "Generate question/answer flashcards from PDF or DOCX documents (local files \
or URLs) with a multi-stage reasoning chain: analyse, plan, generate, evaluate, refine. \
Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/DOCX file path or HTTP/HTTPS URL.
    input: String,

    /// Difficulty tier: Easy, Medium, Hard (other labels are passed through).
    #[arg(short, long, env = "FLASHCARDS_DIFFICULTY", default_value = "Medium")]
    difficulty: String,

    /// Write flashcards as JSON to this file instead of stdout.
    #[arg(short, long, env = "FLASHCARDS_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the full result (cards, path, stats) as JSON.
    #[arg(long, env = "FLASHCARDS_JSON")]
    json: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "FLASHCARDS_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens per stage.
    #[arg(long, env = "FLASHCARDS_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Per-stage LLM call timeout in seconds (0 disables).
    #[arg(long, env = "FLASHCARDS_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Characters of the document shown to the analysis stage.
    #[arg(long, env = "FLASHCARDS_ANALYSIS_CHARS", default_value_t = 3000)]
    analysis_chars: usize,

    /// Cap on characters sent to the generation stage (default: whole document).
    #[arg(long, env = "FLASHCARDS_GENERATION_CHARS")]
    generation_chars: Option<usize>,

    /// Minimum extracted characters required to generate.
    #[arg(long, env = "FLASHCARDS_MIN_TEXT_CHARS", default_value_t = 50)]
    min_text_chars: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "FLASHCARDS_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "FLASHCARDS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the extracted text only, no generation.
    #[arg(long)]
    extract_only: bool,

    /// Disable progress output.
    #[arg(long, env = "FLASHCARDS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLASHCARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLASHCARDS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports every stage; keep library INFO logs out
    // of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ChainProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let doc = extract(&cli.input, &config)
            .await
            .context("Failed to extract text")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&doc).context("Failed to serialise document")?
            );
        } else {
            if !cli.quiet {
                eprintln!("Format:       {}", doc.format);
                if let Some(ref t) = doc.title {
                    eprintln!("Title:        {}", t);
                }
                if let Some(n) = doc.page_count {
                    eprintln!("Pages:        {}", n);
                }
                eprintln!("Characters:   {}", doc.char_count());
            }
            println!("{}", doc.text);
        }
        return Ok(());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let difficulty: Difficulty = cli.difficulty.as_str().into();
    let output = generate(&cli.input, &difficulty, &config)
        .await
        .context("Flashcard generation failed")?;

    if let Some(ref output_path) = cli.output {
        write_flashcards(output_path, &output)
            .await
            .context("Failed to write flashcards")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} flashcards  →  {}",
                green("✔"),
                output.flashcards.len(),
                bold(&output_path.display().to_string()),
            );
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_cards(&output).context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args to `ChainConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ChainConfig> {
    let mut builder = ChainConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .analysis_char_limit(cli.analysis_chars)
        .min_text_chars(cli.min_text_chars)
        .download_timeout_secs(cli.download_timeout);

    if let Some(limit) = cli.generation_chars {
        builder = builder.generation_char_limit(limit);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_cards(output: &ChainOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for (i, card) in output.flashcards.iter().enumerate() {
        if i > 0 {
            writeln!(handle)?;
        }
        writeln!(handle, "Q: {}", card.question)?;
        writeln!(handle, "A: {}", card.answer)?;
    }
    Ok(())
}

fn print_summary(output: &ChainOutput) {
    let path = match &output.path {
        GenerationPath::Chain { refined: true } => green("chain (refined)"),
        GenerationPath::Chain { refined: false } => green("chain"),
        GenerationPath::Fallback { .. } => yellow("fallback"),
        GenerationPath::Degraded { reason } => red(&format!("degraded: {reason}")),
    };
    eprintln!(
        "   {}  {} completions  {} tokens in  /  {} tokens out  {}ms",
        path,
        output.stats.completions,
        dim(&output.stats.input_tokens.to_string()),
        dim(&output.stats.output_tokens.to_string()),
        output.stats.duration_ms,
    );
}
