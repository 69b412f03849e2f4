use anyhow::{Context, Result};
use arboard::Clipboard;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use screenlens_core::{
    capture::PRE_CAPTURE_DELAY, ui, AnalysisResult, Config, HotkeyListener, NotificationSink,
    Region, ScreenLens,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use termimad::crossterm::style::Color;
use termimad::MadSkin;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prompt to send with the capture
    #[arg(trailing_var_arg = true)]
    prompt: Vec<String>,

    /// Override the model defined in .env
    #[arg(short, long)]
    model: Option<String>,

    /// Copy the result to clipboard automatically
    #[arg(short, long, default_value_t = false)]
    copy: bool,

    /// Skip the selection overlay and capture the whole display
    #[arg(long, default_value_t = false)]
    full: bool,

    /// Select which monitor to capture (with --full)
    #[arg(long, default_value_t = 0)]
    monitor: usize,

    /// List available monitors and exit
    #[arg(long)]
    list_monitors: bool,

    /// Run in the background: hotkey -> overlay -> clipboard + notification
    #[arg(long, default_value_t = false)]
    daemon: bool,

    /// Open the conversation window
    #[arg(long, default_value_t = false)]
    chat: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    // Load config and override model if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.model.clone() {
        config.model_name = m;
    }

    // Handle --list-monitors
    if args.list_monitors {
        let app = ScreenLens::with_config(config)
            .context("Failed to initialize screen capturer")?;
        println!("Available monitors:");
        for info in app.list_monitors() {
            println!("{}", info);
        }
        return Ok(());
    }

    if args.daemon {
        return run_daemon(config).await;
    }
    if args.chat {
        return run_chat(config);
    }
    run_once(config, args).await
}

/// One-shot mode: overlay (or full grab), one request, markdown to stdout.
async fn run_once(config: Config, args: Args) -> Result<()> {
    let app = ScreenLens::with_config(config.clone())
        .context("Failed to initialize screen capturer")?;

    let captured = if args.full {
        // Give the user a moment to bring the right window forward.
        tokio::time::sleep(PRE_CAPTURE_DELAY).await;
        app.capture_monitor(args.monitor)
            .context("Failed to capture screen. Try using --list-monitors to check indices")?
    } else {
        match ui::select_region()? {
            Some(region) => app
                .capture(Some(region))
                .context("Failed to capture the selected region")?,
            None => {
                println!("Selection cancelled");
                return Ok(());
            }
        }
    };

    let prompt = args.prompt.join(" ");

    println!(); // Spacer
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Analyzing with {}...", config.model_name));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = app.analyze(&captured, &prompt).await?;

    spinner.finish_and_clear();

    match result {
        AnalysisResult::Success(response) => {
            // Render Markdown
            print_markdown(&response);

            // Copy to clipboard if requested
            if args.copy {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if let Err(e) = clipboard.set_text(response.clone()) {
                            eprintln!("Warning: Failed to copy to clipboard: {}", e);
                        } else {
                            println!("(Copied to clipboard)");
                        }
                    }
                    Err(e) => eprintln!("Warning: Could not access clipboard: {}", e),
                }
            }
        }
        AnalysisResult::Failure { message, .. } => {
            eprintln!("Analysis failed: {}", message);
        }
    }

    Ok(())
}

/// Daemon mode: global hotkey wakes the resident overlay; each selection is
/// captured, analyzed off the UI thread, and delivered to the clipboard
/// with a notification.
async fn run_daemon(config: Config) -> Result<()> {
    let (hotkey_tx, hotkey_rx) = kanal::bounded(8);
    let mut listener = HotkeyListener::register(&config.hotkey)
        .context("Failed to register the global hotkey")?;
    listener.spawn_listener(hotkey_tx);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let pipeline_config = config.clone();
    let on_region: Arc<dyn Fn(Region) + Send + Sync> = Arc::new(move |region| {
        // Runs on a worker thread, never the UI loop.
        if let Err(e) = analyze_and_deliver(&pipeline_config, region) {
            tracing::error!(error = %e, "capture pipeline failed");
        }
    });

    println!(
        "screenlens daemon running: press {} to capture, Ctrl+C to quit",
        config.hotkey
    );

    ui::run_daemon_overlay(hotkey_rx, on_region, shutdown)?;

    // Drop would also release the hook, but surface a failure if it occurs.
    listener
        .unregister()
        .context("Failed to release the global hotkey")?;
    Ok(())
}

/// Captures one region, asks the model about it with the default prompt,
/// and delivers the outcome clipboard + notification style.
fn analyze_and_deliver(config: &Config, region: Region) -> screenlens_core::Result<()> {
    let app = ScreenLens::with_config(config.clone())?;
    let captured = app.capture(Some(region))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(app.analyze(&captured, ""))?;

    NotificationSink::new("ScreenLens").deliver(&result)
}

/// Chat mode: conversation window, with the global hotkey as an optional
/// extra capture trigger.
fn run_chat(config: Config) -> Result<()> {
    let (hotkey_tx, hotkey_rx) = kanal::bounded(8);
    let listener = match HotkeyListener::register(&config.hotkey) {
        Ok(listener) => {
            listener.spawn_listener(hotkey_tx);
            Some(listener)
        }
        Err(e) => {
            // Feature-fatal only; the window still works without the hotkey.
            tracing::warn!(error = %e, "running without a global hotkey");
            None
        }
    };

    ui::run_chat(config, listener.as_ref().map(|_| hotkey_rx))?;

    drop(listener); // releases the hook
    Ok(())
}

/// Helper to print markdown
fn print_markdown(text: &str) {
    let mut skin = MadSkin::default();
    skin.bold.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::Magenta);
    skin.code_block.set_bg(Color::Rgb { r: 40, g: 40, b: 40 });

    skin.print_text(text);
}
