//! # rpformat CLI
//!
//! Command-line interface for the rpformat library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use rpformat::RpError;
use rpformat::cli::Args;
use rpformat::config::Settings;
use rpformat::core::images::{discover_images, encode_images};
use rpformat::core::output::HtmlWriter;
use rpformat::core::pipeline::Pipeline;
use rpformat::format::write_to_format;
use rpformat::message::format_hh_mm;
use rpformat::parser::create_loader;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "rpformat=debug" } else { "rpformat=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), RpError> {
    let total_start = Instant::now();

    let settings = args.apply(Settings::load(&args.settings)?)?;
    if args.save_settings {
        settings.save(&args.settings)?;
    }

    let log_path = settings.log_file_path.clone().ok_or_else(|| {
        RpError::invalid_format(
            "settings",
            "no log file given: pass a path or set log_file_path in the settings file",
        )
    })?;
    let output_path = settings.output_file_path.to_string_lossy().into_owned();
    let config = &settings.pipeline;

    // Header
    println!("📜 rpformat v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📖 Source:  {}", settings.log_format);
    println!("📂 Input:   {}", log_path.display());
    println!("💾 Output:  {}", output_path);
    println!("📄 Format:  {}", settings.output_format);
    if let Some(template) = &settings.template_file_path {
        println!("🧩 Template: {}", template.display());
    }
    if args.save_settings {
        println!("⚙️  Settings saved to {}", args.settings.display());
    }
    println!();

    // Step 1: Load
    let loader = create_loader(settings.log_format, config.min_message_length);
    println!("⏳ Loading {} log...", loader.name());
    let load_start = Instant::now();
    let log = loader.load(&log_path)?;
    println!(
        "   Found {} messages from {} participants, {} skipped ({:.2}s)",
        log.messages.len(),
        log.session.participants.len(),
        log.skipped,
        load_start.elapsed().as_secs_f64()
    );

    // Step 2: Images
    let images = match config.image_search.resolve(&log_path) {
        Some(dir) => {
            println!("🖼️  Looking for images in {}...", dir.display());
            let images = discover_images(&dir)?;
            println!("   Found {} images", images.len());
            images
        }
        None => Vec::new(),
    };

    // Step 3: Reconstruct
    println!("🔀 Reconstructing session...");
    let pipeline_start = Instant::now();
    let output = Pipeline::new(config.clone()).run(log, images);
    let stats = &output.stats;
    if config.combine_messages {
        println!(
            "   Combined {} fragments, {} continuations left open",
            stats.combined, stats.failed_continuations
        );
    } else {
        println!("⏭️  Skipping combine (--no-combine)");
    }
    if config.remove_out_of_character {
        println!("   Removed {} OOC messages", stats.ooc_removed);
    }
    println!(
        "   Found {} gaps (typical pause {}){}",
        stats.gaps_found,
        format_hh_mm(stats.average_gap),
        if config.squash_time_gaps {
            format!(", squashed {}", format_hh_mm(stats.time_squashed))
        } else {
            String::new()
        }
    );
    println!(
        "   {} messages ({:.1}% reduction, {:.2}s)",
        stats.messages,
        stats.reduction_ratio(),
        pipeline_start.elapsed().as_secs_f64()
    );

    let related = encode_images(&output.images.assignments)?;

    // Step 4: Write
    let mut writer = match &settings.template_file_path {
        Some(path) => HtmlWriter::load_template(path)?,
        None => HtmlWriter::new(),
    };
    writer = if config.highlight_emphasis {
        writer.with_emphasis_color(config.emphasis_color.clone())
    } else {
        writer.without_emphasis()
    };

    println!("💾 Writing {}...", settings.output_format);
    let write_start = Instant::now();
    write_to_format(
        &output.transcript,
        &related,
        &writer,
        &output_path,
        settings.output_format,
    )?;
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    let total_time = total_start.elapsed();
    let transcript = &output.transcript;

    println!();
    println!("✅ Done! Output saved to {}", output_path);

    // Summary
    println!();
    println!("📊 Summary:");
    println!("   Authors:   {}", transcript.authors_summary());
    println!("   Session:   {}", transcript.datetime());
    println!("   Duration:  {}", transcript.duration_display());
    println!("   Messages:  {}", transcript.metadata());
    if stats.images.found > 0 {
        println!(
            "   Images:    {} found, {} by id, {} by name time, {} by file time, {} fallback, {} pushed down, {} unplaced",
            stats.images.found,
            stats.images.manually,
            stats.images.by_timestamp,
            stats.images.by_file_time,
            stats.images.randomly,
            stats.images.pushed_down,
            stats.images.unresolved
        );
    }

    // Performance stats
    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", total_time.as_secs_f64());

    Ok(())
}
