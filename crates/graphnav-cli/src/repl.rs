//! REPL – Read-Eval-Print Loop for the GraphNav interactive shell.
//!
//! Supported slash-commands:
//!   /help                     – show this list
//!   /load [building graph]    – load the configured (or given) files
//!   /reload                   – re-read the files of the last load
//!   /floor <n>                – switch the active floor
//!   /info                     – summary of the loaded building and graph
//!   /nearest <x> <y>          – closest node to a metric position
//!   /snap <x> <y>             – snap a metric position onto the graph
//!   /walls <r1> <c1> <r2> <c2> – line-of-sight test between two pixels
//!   /walls-check on|off       – toggle wall-aware filtering
//!   /quit | /exit             – exit the shell
//!
//! Ctrl-C does not interrupt a pending read: the shell exits once the
//! current line is submitted, without running it.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use graphnav_types::{FloorNumber, MetricPoint, RasterCoord};

use crate::config::{self, Config};
use crate::session::{FloorPlan, Session};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Load(Option<(PathBuf, PathBuf)>),
    Reload,
    Floor(FloorNumber),
    Info,
    Nearest(MetricPoint),
    Snap(MetricPoint),
    Walls(RasterCoord, RasterCoord),
    WallsCheck(bool),
    Quit,
}

/// Parse one input line.  The error is a user-facing message.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    match cmd {
        "/help" => Ok(Command::Help),
        "/load" => match args.as_slice() {
            [] => Ok(Command::Load(None)),
            [building, graph] => Ok(Command::Load(Some((
                PathBuf::from(building),
                PathBuf::from(graph),
            )))),
            _ => Err("usage: /load [<building.toml> <graph.json>]".to_string()),
        },
        "/reload" => Ok(Command::Reload),
        "/floor" => match args.as_slice() {
            [n] => n
                .parse::<FloorNumber>()
                .map(Command::Floor)
                .map_err(|_| format!("invalid floor number '{}'", n)),
            _ => Err("usage: /floor <n>".to_string()),
        },
        "/info" => Ok(Command::Info),
        "/nearest" => parse_point(&args, "/nearest").map(Command::Nearest),
        "/snap" => parse_point(&args, "/snap").map(Command::Snap),
        "/walls" => match args.as_slice() {
            [r1, c1, r2, c2] => Ok(Command::Walls(
                RasterCoord::new(parse_int(r1)?, parse_int(c1)?),
                RasterCoord::new(parse_int(r2)?, parse_int(c2)?),
            )),
            _ => Err("usage: /walls <r1> <c1> <r2> <c2>".to_string()),
        },
        "/walls-check" => match args.as_slice() {
            [v] => config::parse_switch(v)
                .map(Command::WallsCheck)
                .ok_or_else(|| format!("expected on or off, got '{}'", v)),
            _ => Err("usage: /walls-check on|off".to_string()),
        },
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn parse_point(args: &[&str], cmd: &str) -> Result<MetricPoint, String> {
    match args {
        [x, y] => Ok(MetricPoint::new(parse_float(x)?, parse_float(y)?)),
        _ => Err(format!("usage: {} <x> <y>", cmd)),
    }
}

fn parse_float(raw: &str) -> Result<f32, String> {
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid coordinate '{}'", raw)),
    }
}

fn parse_int(raw: &str) -> Result<i32, String> {
    raw.parse::<i32>()
        .map_err(|_| format!("invalid pixel index '{}'", raw))
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled before and after every read; when set the REPL
/// exits cleanly.  A blocked read is not interrupted, so after Ctrl-C the
/// shell leaves on the next Enter and drops whatever was typed.
pub fn run(shutdown: Arc<AtomicBool>, cfg: &Config, session: &mut Session) {
    run_with(io::stdin().lock(), &shutdown, cfg, session);
}

/// The REPL loop over any line source.
pub(crate) fn run_with(
    mut input: impl BufRead,
    shutdown: &AtomicBool,
    cfg: &Config,
    session: &mut Session,
) {
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", prompt(session).bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(c) => c,
            Err(msg) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    msg.yellow(),
                    "/help".bold()
                );
                continue;
            }
        };

        match command {
            Command::Help => cmd_help(),
            Command::Load(paths) => cmd_load(cfg, session, paths),
            Command::Reload => cmd_reload(session),
            Command::Floor(n) => cmd_floor(session, n),
            Command::Info => cmd_info(session),
            Command::Nearest(pos) => cmd_nearest(session, pos),
            Command::Snap(pos) => cmd_snap(session, pos),
            Command::Walls(start, end) => cmd_walls(session, start, end),
            Command::WallsCheck(on) => {
                session.set_check_walls(on);
                println!("  Wall checks {}", if on { "on".green() } else { "off".yellow() });
            }
            Command::Quit => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
        }
    }
}

fn prompt(session: &Session) -> String {
    match session.plan() {
        Some(_) => format!("graphnav[{}]>", session.floor()),
        None => "graphnav>".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "GraphNav Commands".bold().underline());
    println!("  {}  – load configured or given files", "/load [building graph]".bold().cyan());
    println!("  {}                  – re-read the last loaded files", "/reload".bold().cyan());
    println!("  {}               – switch the active floor", "/floor <n>".bold().cyan());
    println!("  {}                    – building and graph summary", "/info".bold().cyan());
    println!("  {}         – closest node to a position", "/nearest <x> <y>".bold().cyan());
    println!("  {}            – snap a position onto the graph", "/snap <x> <y>".bold().cyan());
    println!("  {} – wall crossing between two pixels", "/walls <r1> <c1> <r2> <c2>".bold().cyan());
    println!("  {}   – toggle wall-aware filtering", "/walls-check on|off".bold().cyan());
    println!("  {}            – exit the shell", "/quit  /exit".bold().cyan());
    println!();
}

/// Load the given files, or the configured ones, and report the result.
pub(crate) fn cmd_load(cfg: &Config, session: &mut Session, paths: Option<(PathBuf, PathBuf)>) {
    let (building_file, graph_file) =
        paths.unwrap_or_else(|| (cfg.building_file.clone(), cfg.graph_file.clone()));
    println!(
        "  Loading {} and {} …",
        building_file.display().to_string().dimmed(),
        graph_file.display().to_string().dimmed()
    );
    match session.load(&building_file, &graph_file) {
        Ok(plan) => {
            print_plan_summary(&plan);
            if plan.building.floor(session.floor()).is_none() {
                println!(
                    "  {} floor {} is not in this building; use {}",
                    "Note:".yellow(),
                    session.floor(),
                    "/floor <n>".bold()
                );
            }
        }
        Err(e) => println!("{}: {}", "Load failed".red(), e),
    }
}

fn cmd_reload(session: &mut Session) {
    match session.reload() {
        Ok(plan) => {
            println!("{}", "✓ Reloaded.".green());
            print_plan_summary(&plan);
        }
        Err(e) => println!("{}: {}", "Reload failed".red(), e),
    }
}

fn cmd_floor(session: &mut Session, floor: FloorNumber) {
    match session.set_floor(floor) {
        Ok(()) => println!("  Active floor: {}", floor.to_string().bold()),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_info(session: &Session) {
    let Some(plan) = session.plan() else {
        println!("  {}", "Nothing loaded. Use /load first.".yellow());
        return;
    };
    println!("{}", plan.building.name().bold().underline());
    for floor in plan.building.floor_numbers() {
        let Some(map) = plan.building.floor(floor) else {
            continue;
        };
        let (w, h) = map.size_pixels();
        let (mw, mh) = map.size_metric();
        let marker = if floor == session.floor() { "▶" } else { " " };
        println!(
            "  {} floor {:>3}: {}×{} px, scale {}, {:.1}×{:.1} m, {} node(s)",
            marker.green(),
            floor,
            w,
            h,
            map.scale(),
            mw,
            mh,
            plan.graph.nodes_on_floor(floor).count()
        );
    }
    println!(
        "  Graph: {} node(s), {} edge(s)",
        plan.graph.len(),
        plan.graph.edge_count()
    );
    println!(
        "  Wall checks: {}",
        if session.check_walls() { "on".green() } else { "off".yellow() }
    );
}

fn cmd_nearest(session: &Session, pos: MetricPoint) {
    match session.nearest(pos) {
        Ok(Some(node)) => {
            println!(
                "  Node {} ({}) at {}, distance {:.3}",
                node.id.to_string().bold(),
                node.node_type,
                node.position,
                pos.distance(node.position)
            );
            if !node.label.is_empty() {
                println!("    label: {}", node.label.cyan());
            }
        }
        Ok(None) => println!("  {}", "No visible node on this floor.".yellow()),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_snap(session: &Session, pos: MetricPoint) {
    match session.snap(pos) {
        Ok(snapped) => println!(
            "  {} → {} (moved {:.3})",
            pos,
            snapped.to_string().bold(),
            pos.distance(snapped)
        ),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_walls(session: &Session, start: RasterCoord, end: RasterCoord) {
    match session.walls(start, end) {
        Ok(true) => println!("  {} → {}: {}", start, end, "crosses a wall".red()),
        Ok(false) => println!("  {} → {}: {}", start, end, "clear".green()),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn print_plan_summary(plan: &FloorPlan) {
    let floors: Vec<String> = plan.building.floor_numbers().map(|f| f.to_string()).collect();
    println!(
        "  {} {}: floor(s) [{}], {} node(s), {} edge(s)",
        "✓".green().bold(),
        plan.building.name().bold(),
        floors.join(", "),
        plan.graph.len(),
        plan.graph.edge_count()
    );
}
