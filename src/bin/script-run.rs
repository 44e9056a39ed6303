use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use btcscript_rs::{Debugger, DebuggerConfig, Navigation, Phase, ProcessEngine, RunOutcome, RunStatus};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Step through a script's execution trace from an external engine"
)]
struct Opts {
    /// JSON config (engine command, breakpoint and navigation defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Breakpoint source lines. Repeat to add several.
    #[arg(short, long = "break", value_name = "LINE")]
    breaks: Vec<usize>,
    /// Print every step and exit instead of reading commands from stdin
    #[arg(long)]
    dump: bool,
    #[arg(value_name = "ASMFILE")]
    input: PathBuf,
    /// Engine command line, overrides the config
    #[arg(last = true, value_name = "ENGINE")]
    engine: Vec<String>,
}

fn print_view(dbg: &Debugger) {
    let s = dbg.session();
    let view = dbg.view();
    let line = view.highlight_line.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
    println!("step {}/{}  line {line}", s.step_index(), s.trace_len());
    println!("  stack   : [{}]", view.stack.replace('\n', ", "));
    println!("  altstack: [{}]", view.alt_stack.replace('\n', ", "));
    match s.phase() {
        Phase::Terminal(RunStatus::Success) => println!("  finished: success"),
        Phase::Terminal(RunStatus::Error) => {
            println!("  finished: error: {}", s.error_detail())
        }
        _ => {}
    }
}

fn run(dbg: &mut Debugger, engine: &ProcessEngine, nav: Navigation) {
    match dbg.run(engine, nav) {
        None => eprintln!("script does not assemble: {}", dbg.error().map(|e| e.to_string()).unwrap_or_default()),
        Some(RunOutcome::Transport(msg)) => eprintln!("engine unavailable: {msg}"),
        Some(RunOutcome::Loaded(_)) => print_view(dbg),
        Some(other) => eprintln!("run discarded: {other:?}"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut cfg = match &opts.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    };
    if !opts.engine.is_empty() {
        cfg.engine = opts.engine.clone();
    }
    let engine = ProcessEngine::from_argv(&cfg.engine)
        .ok_or_else(|| anyhow!("no engine command; pass it after `--` or set \"engine\" in the config"))?;
    let start_at = cfg.start_at;

    let text = std::fs::read_to_string(&opts.input)?;
    let mut dbg = Debugger::new(cfg);
    dbg.update_source(&text)?;
    for line in &opts.breaks {
        dbg.toggle_breakpoint(*line);
    }

    if opts.dump {
        run(&mut dbg, &engine, Navigation::Start);
        while matches!(dbg.session().phase(), Phase::Active) {
            dbg.step_forward();
            print_view(&dbg);
        }
        return Ok(());
    }

    run(&mut dbg, &engine, start_at);
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("n") | Some("next") => {
                dbg.step_forward();
                print_view(&dbg);
            }
            Some("p") | Some("prev") => {
                dbg.step_backward();
                print_view(&dbg);
            }
            Some("b") | Some("break") => match parts.next().map(str::parse::<usize>) {
                Some(Ok(l)) => {
                    let on = dbg.toggle_breakpoint(l);
                    println!("breakpoint line {l}: {}", if on { "on" } else { "off" });
                }
                _ => eprintln!("usage: b <line>"),
            },
            Some("c") | Some("clear") => {
                dbg.clear_breakpoints();
                println!("breakpoints cleared");
            }
            Some("r") | Some("run") => run(&mut dbg, &engine, Navigation::Start),
            Some("e") | Some("end") => run(&mut dbg, &engine, Navigation::End),
            Some("reload") => {
                let text = std::fs::read_to_string(&opts.input)?;
                if text == dbg.source() {
                    println!("source unchanged");
                    continue;
                }
                if let Err(e) = dbg.update_source(&text) {
                    eprintln!("{e}");
                }
                print_view(&dbg);
            }
            Some("q") | Some("quit") => break,
            Some(cmd) => eprintln!("unknown command: {cmd} (n, p, b <line>, c, r, e, reload, q)"),
            None => {}
        }
    }

    Ok(())
}
