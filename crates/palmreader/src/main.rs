//! `palmread` - CLI for palmreader
//!
//! This binary runs the palm analysis HTTP API, reads single photos from disk,
//! and inspects configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use palmreader::cli::{AnalyzeCommand, Cli, Command, ConfigCommand, OutputFormat, ServeCommand};
use palmreader::{init_logging, server, AnalysisReport, Analyzer, Config, Error, Outcome, PalmImage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => {
            let config = Config::load_from(cli.config)?;
            handle_serve(config, &serve_cmd).await
        }
        Command::Analyze(analyze_cmd) => {
            let config = Config::load_from(cli.config)?;
            handle_analyze(config, &analyze_cmd).await
        }
        Command::Config(config_cmd) => handle_config(cli.config.as_deref(), config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate()?;
    server::serve(&config).await?;
    info!("Server stopped");
    Ok(())
}

async fn handle_analyze(mut config: Config, cmd: &AnalyzeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);

    let bytes = tokio::fs::read(&cmd.image)
        .await
        .map_err(|source| Error::FileRead {
            path: cmd.image.clone(),
            source,
        })?;
    let image = PalmImage::from_bytes(&bytes);

    let analyzer = Analyzer::from_config(&config)?;
    let report = match analyzer.analyze(&image).await? {
        Outcome::Complete(report) => report,
        Outcome::NoLines => {
            println!("{}", palmreader::analysis::NO_LINES_MESSAGE);
            return Ok(());
        }
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print_report(&report),
    }

    if let Some(path) = &cmd.svg {
        let svg = report
            .overlay
            .to_svg(report.frame(), Some(&image.to_data_url()));
        tokio::fs::write(path, svg)
            .await
            .with_context(|| format!("failed to write overlay to {}", path.display()))?;
        info!(path = %path.display(), "Overlay written");
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let reading = &report.analysis;

    println!("Palm Reading ({} data)", report.source);
    println!("======================");
    println!();
    println!("{}", reading.overall);
    println!();
    println!("Personality:  {}", reading.personality);
    println!("Lineage:      {}", reading.lineage);
    println!("Starseed:     {}", reading.starseed);
    println!();
    println!("[Strengths]");
    for strength in &reading.strengths {
        println!("  - {strength}");
    }
    println!();
    println!("[Challenges]");
    for challenge in &reading.challenges {
        println!("  - {challenge}");
    }
    println!();
    println!(
        "[Lines] {}x{} image",
        report.image_info.width, report.image_info.height
    );
    for line in &report.lines {
        println!(
            "  {:<12} ({}, {}) -> ({}, {})  {:>3.0}%",
            line.class.label(),
            line.x1,
            line.y1,
            line.x2,
            line.y2,
            line.confidence * 100.0
        );
    }
    println!();
    println!("[Fingertips]");
    for tip in &report.fingertips {
        println!(
            "  {:<12} ({}, {})  {:>3.0}%",
            tip.name.as_str(),
            tip.x,
            tip.y,
            tip.confidence * 100.0
        );
    }
}

fn handle_config(path: Option<&Path>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path.map(Path::to_path_buf))?.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.bind_address()?);
                println!("  Body limit (bytes): {}", config.server.body_limit_bytes);
                if config.server.allowed_origins.is_empty() {
                    println!("  Allowed origins:    any");
                } else {
                    println!(
                        "  Allowed origins:    {}",
                        config.server.allowed_origins.join(", ")
                    );
                }
                println!();
                println!("[Detection]");
                println!("  Enabled:            {}", config.detection.enabled);
                println!("  Endpoint:           {}", config.detection.endpoint);
                if config.detection.api_key.is_empty() {
                    println!("  API key:            (not set, demo data only)");
                } else {
                    println!("  API key:            {}", config.detection.api_key);
                }
                println!("  Timeout (ms):       {}", config.detection.timeout_ms);
                println!("  Demo fallback:      {}", config.detection.demo_fallback);
                println!();
                println!("[Overlay]");
                println!(
                    "  Reveal interval:    {} ms",
                    config.overlay.reveal_interval_ms
                );
            }
        }
        ConfigCommand::Path => {
            let path = path.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or_else(|| path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
