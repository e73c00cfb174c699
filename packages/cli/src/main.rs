#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the tree census toolchain.
//!
//! Every subcommand reads the same `TREE_CENSUS_*` environment as the
//! server, with flags taking precedence. Without a subcommand an
//! interactive menu is shown.

mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;
use tree_census_geography::sampling::{MapQuery, sample};
use tree_census_metrics::aggregator::{CensusSnapshot, load_snapshot};
use tree_census_metrics::classifier::train_canopy_classifier;
use tree_census_metrics::config::{PipelineConfig, parse_delimiter};
use tree_census_models::BoundingBox;
use tree_census_notebook::try_extract_gallery;
use tree_census_server::ServerConfig;

#[derive(Parser)]
#[command(name = "tree_census_cli", about = "Tree census dashboard toolchain")]
struct Cli {
    /// Census CSV (overrides `TREE_CENSUS_DATA`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// CSV delimiter (overrides `TREE_CENSUS_DELIMITER`)
    #[arg(long, global = true)]
    delimiter: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard metrics
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Sample tree locations for the map
    Sample {
        /// Comma-separated region keys (e.g. "1,2")
        #[arg(long)]
        regions: Option<String>,
        /// Bounding box as `west,south,east,north`
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<BoundingBox>,
        /// Maximum number of points
        #[arg(long)]
        max_points: Option<usize>,
        /// Sampling seed
        #[arg(long)]
        seed: Option<u64>,
        /// Use the unfiltered dashboard preview defaults
        #[arg(long)]
        preview: bool,
    },
    /// List the charts extracted from the analysis notebook
    Gallery {
        /// Notebook path (overrides `TREE_CENSUS_NOTEBOOK`)
        #[arg(long)]
        notebook: Option<PathBuf>,
    },
    /// Fit and evaluate the large-canopy classifier
    Classify {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Start the API server
    Serve {
        /// Listen address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Listen port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Entries of the interactive menu.
enum Tool {
    Summary,
    Classify,
    Gallery,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Summary, Self::Classify, Self::Gallery, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Show census summary",
            Self::Classify => "Evaluate canopy classifier",
            Self::Gallery => "List notebook charts",
            Self::Server => "Start server",
        }
    }
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [west, south, east, north] => Ok(BoundingBox::new(*west, *south, *east, *north)),
        _ => Err(format!("expected 4 comma-separated numbers, got {}", parts.len())),
    }
}

fn pipeline_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(data) = &cli.data {
        config.data_path.clone_from(data);
    }
    if let Some(delimiter) = &cli.delimiter {
        config.delimiter = parse_delimiter(delimiter)?;
    }
    Ok(config)
}

fn snapshot(config: &PipelineConfig) -> Result<CensusSnapshot, Box<dyn std::error::Error>> {
    let mut snapshot = load_snapshot(&config.data_path, config.delimiter).ok_or_else(|| {
        format!(
            "census data unavailable at {}",
            config.data_path.display()
        )
    })?;
    snapshot.attach_species_images(&config.species_images_dir);
    Ok(snapshot)
}

fn print_summary(config: &PipelineConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = snapshot(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.summary())?);
    } else {
        report::write_summary(&mut std::io::stdout().lock(), snapshot.summary())?;
    }
    Ok(())
}

fn print_classifier(config: &PipelineConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = snapshot(config)?;
    let report = train_canopy_classifier(snapshot.table(), snapshot.schema())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report::write_classifier(&mut std::io::stdout().lock(), &report)?;
    }
    Ok(())
}

fn print_gallery(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let images = try_extract_gallery(&config.notebook_path)?;
    println!("{:<6} {:<14} {:<5} TITLE", "CELL", "KIND", "AXES");
    println!("{}", "-".repeat(60));
    for image in &images {
        println!(
            "{:<6} {:<14} {:<5} {}",
            image.cell_index, image.chart.kind, image.axes, image.title
        );
    }
    println!();
    println!("{} charts", images.len());
    Ok(())
}

fn serve(pipeline: PipelineConfig, server: ServerConfig) -> std::io::Result<()> {
    actix_web::rt::System::new().block_on(tree_census_server::run_server(pipeline, server))
}

fn interactive(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tree Census Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Summary => print_summary(&config, false)?,
        Tool::Classify => print_classifier(&config, false)?,
        Tool::Gallery => print_gallery(&config)?,
        Tool::Server => {
            actix_web::rt::System::new().block_on(tree_census_server::interactive::run())?;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let mut config = pipeline_config(&cli)?;

    let Some(command) = cli.command else {
        return interactive(config);
    };

    match command {
        Commands::Summary { json } => print_summary(&config, json)?,
        Commands::Sample {
            regions,
            bbox,
            max_points,
            seed,
            preview,
        } => {
            let mut query = if preview {
                MapQuery::preview()
            } else {
                MapQuery::detailed()
            };
            if let Some(regions) = regions {
                let keys: Vec<&str> = regions.split(',').filter(|r| !r.trim().is_empty()).collect();
                query = query.with_regions(&keys);
            }
            if bbox.is_some() {
                query = query.with_bbox(bbox);
            }
            if let Some(max_points) = max_points {
                query = query.with_max_points(max_points.max(1));
            }
            if let Some(seed) = seed {
                query = query.with_seed(seed);
            }

            let snapshot = snapshot(&config)?;
            let drawn = sample(snapshot.table(), snapshot.region_column(), &query);
            log::info!(
                "{} of {} matching trees",
                drawn.points.len(),
                drawn.total_matching
            );

            println!("latitude,longitude,region");
            for point in &drawn.points {
                println!(
                    "{},{},{}",
                    point.coordinate.latitude,
                    point.coordinate.longitude,
                    point.region.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Gallery { notebook } => {
            if let Some(notebook) = notebook {
                config.notebook_path = notebook;
            }
            print_gallery(&config)?;
        }
        Commands::Classify { json } => print_classifier(&config, json)?,
        Commands::Serve { bind, port } => {
            let mut server = ServerConfig::from_env();
            if let Some(bind) = bind {
                server.bind_addr = bind;
            }
            if let Some(port) = port {
                server.port = port;
            }
            serve(config, server)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bbox_requires_four_numbers() {
        let bbox = parse_bbox("-35.0,-8.1,-34.9,-8.0").unwrap();
        assert!((bbox.south - -8.1).abs() < f64::EPSILON);
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,x").is_err());
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from([
            "tree_census_cli",
            "--data",
            "other.csv",
            "--delimiter",
            ";",
            "summary",
        ]);
        let config = pipeline_config(&cli).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.delimiter, b';');
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["tree_census_cli", "sample", "--regions", "1,2", "--data", "x.csv"]);
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        assert!(matches!(
            cli.command,
            Some(Commands::Sample { regions: Some(ref r), .. }) if r == "1,2"
        ));
    }
}
