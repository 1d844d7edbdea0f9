//! Command-line interface for the gradient analysis.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processors::diagnostics::LogSink;
use crate::processors::pipeline::{self, SectionReport};
use crate::visualization::{self, ProfilePlot};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "cfd-gradients")]
#[command(about = "Zero-crossing slope extraction for CFD line scans", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate crossing slopes over every station of a gradient batch
    Gradients {
        /// Any one station file of the batch, e.g. PICTURES/Ux_GRAD_0.700
        grad_file: PathBuf,
        /// Output directory (defaults to the directory of the selected file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Also render the slope series as PNG
        #[arg(long)]
        plot: bool,
    },

    /// Find crossings on XY profiles of up to three variants
    Profiles {
        /// Variant directories to compare (1 to 3)
        #[arg(short = 'V', long = "variant", required = true)]
        variants: Vec<PathBuf>,
        /// Profile file names (defaults to profiles.sections from config)
        #[arg(short, long = "section")]
        sections: Vec<String>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Also render each section as PNG
        #[arg(long)]
        plot: bool,
    },

    /// Write the default configuration as YAML
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Gradients {
            grad_file,
            output_dir,
            plot,
        } => {
            cmd_gradients(&grad_file, output_dir, plot, &config);
        }
        Commands::Profiles {
            variants,
            sections,
            output_dir,
            plot,
        } => {
            cmd_profiles(&variants, sections, &output_dir, plot, &config);
        }
        Commands::InitConfig { path } => {
            cmd_init_config(&path, &config);
        }
    }
}

fn cmd_gradients(grad_file: &Path, output_dir: Option<PathBuf>, plot: bool, config: &PipelineConfig) {
    let start = Instant::now();

    let out_dir = output_dir.unwrap_or_else(|| match grad_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    });

    println!("Analysing gradient batch...");
    println!("Selected file: {}", grad_file.display());
    println!("Output directory: {}", out_dir.display());

    let spinner = create_spinner("Detecting crossings...");

    let run = match pipeline::gradients_from_file(grad_file, config, &mut LogSink) {
        Ok(run) => run,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Gradient analysis failed: {:#}", e);
            std::process::exit(1);
        }
    };

    spinner.set_message("Writing results...");

    let written = match run.export_csv(&out_dir, config) {
        Ok(paths) => paths,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Failed to write results: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut chart = None;
    if plot {
        let path = out_dir.join(format!("{}_results.png", run.base));
        match visualization::plot_slope_series(
            &path,
            &run.report.slopes,
            config.output.chart_width,
            config.output.chart_height,
        ) {
            Ok(()) => chart = Some(path),
            Err(e) => warn!("Skipping chart: {}", e),
        }
    }

    spinner.finish_and_clear();

    let report = &run.report;
    let mut items = vec![
        ("Station files", run.files.len().to_string()),
        ("Scans analysed", report.scans_analyzed.to_string()),
        ("Scans skipped", report.scans_skipped.to_string()),
        ("Crossings", report.crossings.to_string()),
        ("Discarded", report.discarded.to_string()),
        ("Unclassified", report.unclassified.to_string()),
        (
            config.output.region_a_label.as_str(),
            report.slopes.region_a.len().to_string(),
        ),
        (
            config.output.region_b_label.as_str(),
            report.slopes.region_b.len().to_string(),
        ),
    ];
    for path in &written {
        items.push(("Output CSV", path.display().to_string()));
    }
    if let Some(path) = &chart {
        items.push(("Output PNG", path.display().to_string()));
    }
    items.push(("Duration", format!("{:.2?}", start.elapsed())));

    print_summary("Gradient Analysis Complete", &items);
}

fn plot_sections(reports: &[SectionReport], output_dir: &Path, config: &PipelineConfig) -> usize {
    let mut plotted = 0;
    for report in reports {
        let profiles: Vec<ProfilePlot<'_>> = report
            .variants
            .iter()
            .map(|v| ProfilePlot {
                name: &v.name,
                scan: &v.table.scan,
                estimates: &v.estimates,
            })
            .collect();

        let path = output_dir.join(format!("{}.png", report.section));
        match visualization::plot_profiles(
            &path,
            &profiles,
            config.output.chart_width,
            config.output.chart_height,
        ) {
            Ok(()) => plotted += 1,
            Err(e) => warn!("Skipping chart for {}: {}", report.section, e),
        }
    }
    plotted
}

fn cmd_profiles(
    variants: &[PathBuf],
    sections: Vec<String>,
    output_dir: &Path,
    plot: bool,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    // Use config sections if none were given
    let sections = if sections.is_empty() {
        config.profiles.sections.clone()
    } else {
        sections
    };

    println!("Analysing profiles...");
    println!("Variants: {}", variants.len());
    println!("Sections: {}", sections.join(", "));
    println!("Output directory: {}", output_dir.display());

    let spinner = create_spinner("Detecting crossings...");

    let reports = match pipeline::profiles_from_variants(variants, &sections, config, &mut LogSink) {
        Ok(reports) => reports,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Profile analysis failed: {:#}", e);
            std::process::exit(1);
        }
    };

    spinner.set_message("Writing results...");

    let written = match pipeline::export_profile_crossings(&reports, output_dir) {
        Ok(paths) => paths,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Failed to write results: {:#}", e);
            std::process::exit(1);
        }
    };

    let plotted = if plot {
        plot_sections(&reports, output_dir, config)
    } else {
        0
    };

    spinner.finish_and_clear();

    let crossings: usize = reports
        .iter()
        .flat_map(|r| r.variants.iter())
        .map(|v| v.estimates.len())
        .sum();

    print_summary(
        "Profile Analysis Complete",
        &[
            ("Variants", variants.len().to_string()),
            ("Sections", reports.len().to_string()),
            ("Crossings", crossings.to_string()),
            ("CSV files", written.len().to_string()),
            ("Charts", plotted.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_init_config(path: &Path, config: &PipelineConfig) {
    match config.to_yaml(path) {
        Ok(()) => println!("Wrote configuration to {}", path.display()),
        Err(e) => {
            error!("Failed to write config to {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
