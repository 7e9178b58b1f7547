use std::{io, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use tcxride::{DecoderConfig, MalformedNumberPolicy, TcxError, decode_file, write_activities};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MalformedArg {
    Zero,
    LastKnown,
    Reject,
}

impl From<MalformedArg> for MalformedNumberPolicy {
    fn from(value: MalformedArg) -> Self {
        match value {
            MalformedArg::Zero => MalformedNumberPolicy::Zero,
            MalformedArg::LastKnown => MalformedNumberPolicy::LastKnown,
            MalformedArg::Reject => MalformedNumberPolicy::Reject,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a TCX file and summarize its activities
    Decode {
        input: PathBuf,

        /// Print every sample as JSON Lines instead of the summary
        #[arg(short, long)]
        samples: bool,

        #[arg(long)]
        no_smart_recording: bool,

        /// Smart recording high-water mark in seconds
        #[arg(long)]
        hwm: Option<i64>,

        #[arg(long, value_enum)]
        malformed: Option<MalformedArg>,
    },
    /// Show the effective decoder configuration
    Config {
        #[arg(long)]
        save: bool,
    },
}

fn local_config() -> DecoderConfig {
    DecoderConfig::from_local_file().unwrap_or_else(|e| {
        warn!("Could not load config file, using defaults: {}", e);
        DecoderConfig::default()
    })
}

fn decode(input: &PathBuf, samples: bool, config: DecoderConfig) -> Result<(), TcxError> {
    let config = config.normalized();
    let activities = decode_file(input, config.clone())?;
    if samples {
        return write_activities(io::stdout().lock(), &activities);
    }

    println!(
        "smart recording: {}, high-water mark: {}s",
        config.smart_recording, config.high_water_mark_s
    );
    for (idx, activity) in activities.iter().enumerate() {
        let start = activity
            .start_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "#{} {:?} start {} laps {} samples {} duration {}s{}",
            idx + 1,
            activity.sport,
            start,
            activity.lap_count(),
            activity.samples.len(),
            activity.duration_s(),
            if activity.is_valid() { "" } else { " (invalid)" }
        );
        for issue in &activity.issues {
            println!("    {:?}", issue);
        }
    }
    Ok(())
}

fn show_config(save: bool) -> Result<(), TcxError> {
    let config = local_config();
    println!(
        "{}",
        serde_json::to_string_pretty(&config)
            .map_err(|e| TcxError::ConfigSerializeError { source: e })?
    );
    if save {
        config.save()?;
        println!("Saved to {:?}", DecoderConfig::default_path()?);
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let result = match &cli.command {
        Commands::Decode {
            input,
            samples,
            no_smart_recording,
            hwm,
            malformed,
        } => {
            let mut config = local_config();
            if *no_smart_recording {
                config.smart_recording = false;
            }
            if let Some(hwm) = hwm {
                config.high_water_mark_s = *hwm;
            }
            if let Some(malformed) = malformed {
                config.malformed_numbers = (*malformed).into();
            }
            decode(input, *samples, config)
        }
        Commands::Config { save } => show_config(*save),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
