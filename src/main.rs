//! Glyph Surge entry point
//!
//! Headless driver: replays a recorded script (or a seeded autoplay run)
//! against a puzzle config and prints the final board.
//!
//! Usage: `glyph-surge [--config PATH] [--script PATH] [--seed N] [--frames N]`

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glyph_surge::PuzzleConfig;
use glyph_surge::consts::FRAME_DT;
use glyph_surge::sim::{Autoplayer, CellPos, PuzzleSession, Script, SessionSnapshot, replay};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Glyph Surge puzzle runner", long_about = None)]
struct Args {
    /// Puzzle config JSON (defaults to the reference layout)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recorded frame script to replay instead of autoplaying
    #[arg(long)]
    script: Option<PathBuf>,

    /// Autoplay RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of autoplay frames
    #[arg(long, default_value_t = 3600)]
    frames: usize,
}

/// ASCII board: glyphs, S for sources, N/n for active/drained nodes, [] around the cursor
fn render_text(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    for row in 0..snap.rows {
        for col in 0..snap.cols {
            let pos = CellPos::new(row, col);
            let mark = if snap.sources.contains(&pos) {
                'S'
            } else if let Some(node) = snap.nodes.iter().find(|n| n.cell == pos) {
                if node.active { 'N' } else { 'n' }
            } else {
                snap.cell(pos).as_char()
            };
            if snap.cursor == pos {
                out.push('[');
                out.push(mark);
                out.push(']');
            } else {
                out.push(' ');
                out.push(mark);
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "load {:.1}/{:.1}  outcome {:?}  t={:.2}s\n",
        snap.load, snap.max_load, snap.outcome, snap.elapsed
    ));
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Glyph Surge starting...");

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PuzzleConfig::from_file(path)?,
        None => PuzzleConfig::default(),
    };
    let mut session = PuzzleSession::new(config)?;

    let script = match &args.script {
        Some(path) => Script::from_file(path)?,
        None => {
            log::info!("Autoplay: seed {}, {} frames", args.seed, args.frames);
            Autoplayer::new(args.seed).script(args.frames, FRAME_DT)
        }
    };

    let summary = replay(&mut session, &script)?;
    for event in session.drain_events() {
        log::debug!("event: {:?}", event);
    }

    let snapshot = session.snapshot();
    print!("{}", render_text(&snapshot));
    println!("frames run: {}", summary.frames_run);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
