// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use verso::analysis::{AnalysisDispatcher, AnalysisView};
use verso::config::{AppConfig, ConfigWatcher, LoggingConfig, DEFAULT_CONFIG_FILE};
use verso::store::StropheStore;
use verso::strophe::RhymeScheme;
use verso::ui::{preview_text, App, EditorSession};

#[derive(Parser)]
#[command(name = "verso", version)]
#[command(about = "Terminal strophe editor with rhyme tagging and meter analysis")]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "VERSO_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Strophe number to open
    #[arg(short, long, default_value_t = 1, global = true)]
    strophe: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the strophe in the terminal editor (default)
    Edit,
    /// Analyze the stored strophe and print the breakdown
    Analyze {
        /// Override the configured service URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Print the stored strophe
    Export {
        /// JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// List stored strophe numbers
    List,
    /// Print every stored strophe as one poem
    Preview {
        /// No colors
        #[arg(long)]
        plain: bool,
    },
    /// Show or set the rhyme scheme new lines follow (e.g. ABAB)
    Scheme {
        /// Letters A to D; omit to print the current scheme
        scheme: Option<RhymeScheme>,
        /// Return to cycling A, B, C, D
        #[arg(long, conflicts_with = "scheme")]
        clear: bool,
    },
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.dir))?;
    let file_appender = tracing_appender::rolling::never(&config.dir, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let level = config.level.clone();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

fn run_editor(
    cli: &Cli,
    config: &AppConfig,
    store: StropheStore,
    runtime: &tokio::runtime::Runtime,
) -> Result<()> {
    let editor = store.load_editor(cli.strophe)?;
    let dispatcher = AnalysisDispatcher::new(runtime.handle().clone(), config.analysis.client()?);
    let mut session = EditorSession::new(editor, store, cli.strophe, dispatcher)
        .with_palette(config.palette.to_palette()?)
        .with_autosave(config.store.autosave);
    session.ui_mut().status_ttl = std::time::Duration::from_secs(config.ui.status_secs);

    let watcher = match ConfigWatcher::new(&cli.config, None) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    };

    let mut app = App::new().context("Failed to initialize terminal")?;
    app.set_frame_rate(config.ui.frame_rate);
    app.run(&mut session, watcher.as_ref())
        .context("Terminal UI failed")?;

    tracing::info!(strophe = cli.strophe, lines = session.editor().len(), "Editor closed");
    Ok(())
}

fn analyze(
    strophe: usize,
    config: &AppConfig,
    store: &StropheStore,
    endpoint: Option<String>,
    runtime: &tokio::runtime::Runtime,
) -> Result<()> {
    let mut editor = store.load_editor(strophe)?;
    if editor.is_empty() {
        bail!("Strophe {} has no lines to analyze", strophe);
    }

    let mut analysis = config.analysis.clone();
    if let Some(endpoint) = endpoint {
        analysis.endpoint = endpoint;
    }

    let mut dispatcher = AnalysisDispatcher::new(runtime.handle().clone(), analysis.client()?);
    let (ticket, request) = editor.begin_analysis();
    dispatcher.submit(ticket, request);
    let outcome = runtime
        .block_on(dispatcher.next())
        .context("Analysis task ended without a result")?;

    let result = outcome.result.clone();
    editor.finish_analysis(outcome.ticket, outcome.result);
    match result {
        Ok(result) => {
            print!("{}", AnalysisView::from_result(&result).to_text());
            Ok(())
        }
        Err(e) => {
            let message = editor.analysis().error().unwrap_or("Analysis failed").to_string();
            Err(e).context(message)
        }
    }
}

fn export(strophe: usize, store: &StropheStore, json: bool) -> Result<()> {
    let snapshot = store
        .load(strophe)?
        .with_context(|| format!("No strophe {} in {:?}", strophe, store.dir()))?;
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        print!("{}", snapshot.to_yaml()?);
    }
    Ok(())
}

fn preview(store: &StropheStore, plain: bool) -> Result<()> {
    let poem: Vec<_> = store.load_all()?.into_iter().map(|(_, s)| s).collect();
    if plain {
        print!("{}", preview_text(&poem));
        return Ok(());
    }

    for (i, strophe) in poem.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in &strophe.lines {
            let words: Vec<String> = line
                .words()
                .iter()
                .map(|w| match w.custom_color() {
                    Some(c) => w
                        .display_text()
                        .with(crossterm::style::Color::Rgb { r: c.r, g: c.g, b: c.b })
                        .to_string(),
                    None => w.display_text(),
                })
                .collect();
            println!("{}", words.join(" "));
        }
    }
    Ok(())
}

fn scheme(
    strophe: usize,
    store: &StropheStore,
    scheme: Option<RhymeScheme>,
    clear: bool,
) -> Result<()> {
    let mut editor = store.load_editor(strophe)?;
    if scheme.is_none() && !clear {
        match editor.scheme() {
            Some(scheme) => println!("{}", scheme),
            None => println!("ABCD (default cycle)"),
        }
        return Ok(());
    }

    editor.set_scheme(scheme);
    store.save(strophe, &editor.snapshot())?;
    tracing::info!(strophe, scheme = ?editor.scheme(), "Rhyme scheme updated");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;
    let _guard = init_logging(&config.logging)?;

    tracing::info!(config = ?cli.config, strophe = cli.strophe, "verso starting");

    let store = StropheStore::new(&config.store.dir);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match &cli.command {
        None | Some(Command::Edit) => run_editor(&cli, &config, store, &runtime),
        Some(Command::Analyze { endpoint }) => {
            analyze(cli.strophe, &config, &store, endpoint.clone(), &runtime)
        }
        Some(Command::Export { json }) => export(cli.strophe, &store, *json),
        Some(Command::List) => {
            for number in store.list()? {
                println!("{}", number);
            }
            Ok(())
        }
        Some(Command::Preview { plain }) => preview(&store, *plain),
        Some(Command::Scheme { scheme: value, clear }) => {
            scheme(cli.strophe, &store, value.clone(), *clear)
        }
    }
}
