//! `graphnav-cli` – GraphNav Command Line Interface
//!
//! Interactive shell over a building's occupancy maps and navigation graph.
//! It:
//!
//! 1. Checks for `~/.graphnav/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 2. Loads the configured building description and graph.
//! 3. Drops the user into an **interactive REPL** issuing nearest-node, snap
//!    and wall-crossing queries (`/help` lists the commands).
//! 4. Intercepts **Ctrl-C**: the shell leaves cleanly once the pending input
//!    line is submitted (a blocked read is not interrupted).

mod config;
mod repl;
mod session;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use session::Session;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); GRAPHNAV_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Query results still go through
    // println!.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("GRAPHNAV_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – press Enter to leave GraphNav.".yellow().bold()
        );
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will terminate immediately");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    // ── Initial load ──────────────────────────────────────────────────────
    let mut session = Session::from_config(&cfg);
    println!();
    repl::cmd_load(&cfg, &mut session, None);

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(shutdown, &cfg, &mut session);
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║      GraphNav First-Run Wizard       ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's point GraphNav at a building.\n");

    let mut cfg = config::Config::default();

    let building = prompt_line(
        &format!("  Building description [{}]: ", cfg.building_file.display()),
        &cfg.building_file.display().to_string(),
    );
    cfg.building_file = building.into();

    let graph = prompt_line(
        &format!("  Navigation graph JSON [{}]: ", cfg.graph_file.display()),
        &cfg.graph_file.display().to_string(),
    );
    cfg.graph_file = graph.into();

    let floor = prompt_line(
        &format!("  Default floor [{}]: ", cfg.default_floor),
        &cfg.default_floor.to_string(),
    );
    if let Ok(f) = floor.trim().parse() {
        cfg.default_floor = f;
    }

    let walls = prompt_line("  Skip nodes hidden behind walls? (on/off) [off]: ", "off");
    cfg.check_walls = config::parse_switch(&walls).unwrap_or(false);

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }

    config::apply_env_overrides(&mut cfg);
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ______                 __    _   __"#.bold().cyan());
    println!("{}", r#"  / ____/________ _____  / /_  / | / /___ __   __"#.bold().cyan());
    println!("{}", r#" / / __/ ___/ __ `/ __ \/ __ \/  |/ / __ `/ | / /"#.bold().cyan());
    println!("{}", r#"/ /_/ / /  / /_/ / /_/ / / / / /|  / /_/ /| |/ /"#.bold().cyan());
    println!("{}", r#"\____/_/   \__,_/ .___/_/ /_/_/ |_/\__,_/ |___/"#.bold().cyan());
    println!("{}", r#"               /_/"#.bold().cyan());
    println!();
    println!("  {} {}",
        "GraphNav".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Indoor wayfinding over occupancy maps and navigation graphs");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
