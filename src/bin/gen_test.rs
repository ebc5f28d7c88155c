//! Synthetic Chat 2 log generator for stress testing rpformat.
//!
//! Usage: cargo run --features gen-test --bin gen_test -- [messages] [output] [seed]
//! Example: cargo run --features gen-test --bin gen_test -- 100000 heavy_session.json 42

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

const AUTHORS: &[&str] = &["Aria Vel", "Tomas Reed", "Kiri Ashe", "Old Man Hobb"];

const OPENINGS: &[&str] = &[
    "She sets her cup down on the counter",
    "He glances toward the door",
    "The lantern flickers as the wind picks up",
    "A low murmur runs through the tavern",
    "Her fingers drum against the hilt of her sword",
    "He leans back and folds his arms",
    "Rain hammers on the shutters",
    "The innkeeper wipes the same glass for the third time",
];

const ENDINGS: &[&str] = &[
    "and says nothing at all.",
    "before letting out a long breath.",
    "as if waiting for someone to speak first.",
    "with a crooked little smile.",
    "while the fire crackles behind them.",
    "and the room falls quiet.",
];

const EMPHASIS: &[&str] = &["*really*", "_never_", "~softly~", "/now/"];

const OOC: &[&str] = &[
    "(brb, doorbell)",
    "(sorry, lag spike)",
    "[afk 5 min]",
    "(lol that was great)",
    "{heading to bed soon}",
];

fn main() {
    let args: Vec<String> = env::args().collect();

    let count: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10_000);
    let output = args.get(2).map(|s| s.as_str()).unwrap_or("heavy_session.json");
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(7);

    println!("🧪 Session Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Messages: {}", count);
    println!("   Output:   {}", output);
    println!("   Seed:     {}", seed);
    println!();

    let file = File::create(output).expect("Failed to create output file");
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    let mut rng = StdRng::seed_from_u64(seed);

    let start = std::time::Instant::now();
    let entries = generate(&mut rng, count);

    serde_json::to_writer_pretty(&mut writer, &entries).expect("Failed to write log");
    writer.flush().expect("Failed to flush output");

    println!(
        "✅ Wrote {} entries in {:.2}s",
        entries.len(),
        start.elapsed().as_secs_f64()
    );
}

/// Produces `count` log entries with split posts, asides, emphasis and the
/// occasional multi-hour silence.
fn generate(rng: &mut StdRng, count: usize) -> Vec<serde_json::Value> {
    let owner = AUTHORS[0];
    let mut now: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 3, 1, 20, 0, 0)
        .single()
        .expect("valid start time");
    let mut entries = Vec::with_capacity(count);

    while entries.len() < count {
        now += if rng.gen_bool(0.005) {
            TimeDelta::hours(rng.gen_range(2..9))
        } else {
            TimeDelta::seconds(rng.gen_range(20..240))
        };
        let author = *AUTHORS.choose(rng).expect("authors not empty");

        let roll: f64 = rng.gen_range(0.0..1.0);
        if roll < 0.08 {
            let aside = *OOC.choose(rng).expect("asides not empty");
            entries.push(entry(owner, author, aside, now));
        } else if roll < 0.23 {
            let parts = rng.gen_range(2..=3);
            for (i, body) in split_post(rng, parts).into_iter().enumerate() {
                if i > 0 {
                    now += TimeDelta::seconds(rng.gen_range(5..40));
                }
                entries.push(entry(owner, author, &body, now));
            }
        } else {
            entries.push(entry(owner, author, &sentence(rng), now));
        }
    }

    entries.truncate(count);
    entries
}

fn sentence(rng: &mut StdRng) -> String {
    let opening = OPENINGS.choose(rng).expect("openings not empty");
    let ending = ENDINGS.choose(rng).expect("endings not empty");
    if rng.gen_bool(0.2) {
        let mark = EMPHASIS.choose(rng).expect("emphasis not empty");
        format!("{opening}, {mark}, {ending}")
    } else {
        format!("{opening} {ending}")
    }
}

/// A post split into `parts` fragments, tagged either with trailing dots or
/// with `(n/m)` counters.
fn split_post(rng: &mut StdRng, parts: usize) -> Vec<String> {
    let counters = rng.gen_bool(0.5);
    (1..=parts)
        .map(|n| {
            let text = sentence(rng);
            if counters {
                format!("{text} ({n}/{parts})")
            } else if n < parts {
                format!("{}...", text.trim_end_matches('.'))
            } else {
                text
            }
        })
        .collect()
}

fn entry(owner: &str, author: &str, body: &str, at: DateTime<Utc>) -> serde_json::Value {
    json!({
        "OwnerId": owner,
        "SenderName": author,
        "Message": body,
        "DateSent": at.to_rfc3339(),
    })
}
