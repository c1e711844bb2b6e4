//! Example: Trace the bracket automaton over command-line inputs.
//!
//! This example demonstrates how to:
//! 1. Gate and simulate inputs through a `Session`
//! 2. Walk the resulting trace with `Playback`
//! 3. Export the last trace as NDJSON and replay it
//!
//! Run with: cargo run --example trace_brackets -- "([])" "(]"

use bracket_pda::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = vec!["([{}])".into(), "(]".into(), ")".into(), "((".into()];
    }

    let mut session = Session::new(SessionConfig::default());

    for input in &inputs {
        println!("== {input}");
        if let Err(e) = session.submit(input) {
            println!("   refused: {e}");
            continue;
        }

        let playback = session.playback_mut().ok_or("no playback after submit")?;
        loop {
            let (n, total) = playback.progress();
            if let Some(step) = playback.current() {
                println!(
                    "   [{n}/{total}] {:<10} stack={:<8} {}",
                    step.state(),
                    step.stack().to_string(),
                    step
                );
            }
            if !playback.step_forward() {
                break;
            }
        }
    }

    println!();
    println!("History (most recent first):");
    for entry in session.history().entries() {
        let mark = if entry.accepted { "accept" } else { "reject" };
        println!("   {mark}  {}", entry.input);
    }

    if let Some(playback) = session.playback() {
        let path = std::env::temp_dir().join("bracket_pda_trace.ndjson");
        let lines = write_ndjson(playback.trace(), &path)?;
        let loaded = read_ndjson(&path)?;
        replay_trace(&loaded)?;
        println!();
        println!("Wrote {lines} steps to {} and replayed them", path.display());
    }

    Ok(())
}
