use clap::{Parser, Subcommand};
use cli::{check_image_path, RunConfig};
use color_eyre::eyre::Result;
use shapes::{AnalysisCommand, AnalysisOutput, ImageAnalyzer};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "shape-cli", author, version, about, long_about = None)]
struct Cli {
    /// Analysis settings (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Font used to draw shape and symmetry labels
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and label geometric shapes
    Detect {
        /// Input image (png, jpg, jpeg)
        image: PathBuf,
        /// Where to save the annotated image
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the detected shapes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark centroids and axes and flag symmetric regions
    Symmetry {
        /// Input image (png, jpg, jpeg)
        image: PathBuf,
        /// Where to save the annotated image
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the regions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Close gaps in broken outlines
    Complete {
        /// Input image (png, jpg, jpeg)
        image: PathBuf,
        /// Where to save the completed image
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every analysis and save images and JSON summaries into a directory
    All {
        /// Input image (png, jpg, jpeg)
        image: PathBuf,
        /// Output directory
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// List the available analysis commands and their JSON schema
    Commands,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    let analyzer = || -> Result<ImageAnalyzer> {
        let config = match &cli.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        let pipeline = config.build_pipeline(cli.font.as_deref())?;
        Ok(ImageAnalyzer::with_pipeline(pipeline))
    };

    match &cli.command {
        Commands::Detect { image, output, json } => {
            run_one(&mut analyzer()?, AnalysisCommand::DetectShapes, image, output.as_deref(), *json)?;
        }
        Commands::Symmetry { image, output, json } => {
            run_one(&mut analyzer()?, AnalysisCommand::FindSymmetry, image, output.as_deref(), *json)?;
        }
        Commands::Complete { image, output } => {
            run_one(&mut analyzer()?, AnalysisCommand::CompleteCurves, image, output.as_deref(), false)?;
        }
        Commands::All { image, output_dir } => {
            run_all(&mut analyzer()?, image, output_dir)?;
        }
        Commands::Commands => list_commands()?,
    }

    Ok(())
}

fn list_commands() -> Result<()> {
    for command in AnalysisCommand::iter() {
        println!("{:<16} {}", command, command.description());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&AnalysisCommand::schema())?);
    Ok(())
}

fn run_one(
    analyzer: &mut ImageAnalyzer,
    command: AnalysisCommand,
    image: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    check_image_path(image)?;
    analyzer.select_image(image)?;
    let result = analyzer.execute(command)?;

    print_summary(result);
    if json {
        println!("{}", result.to_json()?);
    }
    if let Some(output) = output {
        result.image().save(output)?;
        info!("Saved {} result to {}", command, output.display());
    }
    Ok(())
}

fn run_all(analyzer: &mut ImageAnalyzer, image: &Path, output_dir: &Path) -> Result<()> {
    check_image_path(image)?;
    analyzer.select_image(image)?;
    std::fs::create_dir_all(output_dir)?;

    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    for command in AnalysisCommand::iter() {
        let result = analyzer.execute(command)?;
        print_summary(result);

        let image_path = output_dir.join(format!("{stem}_{command}.png"));
        result.image().save(&image_path)?;
        let json_path = output_dir.join(format!("{stem}_{command}.json"));
        std::fs::write(&json_path, result.to_json()?)?;
        info!("Processing '{}' -> {}", command, image_path.display());
    }

    info!("✅ Analysis completed!");
    Ok(())
}

fn print_summary(output: &AnalysisOutput) {
    match output {
        AnalysisOutput::Shapes(detection) => {
            println!("Detected {} shapes", detection.labels.len());
            for (shape, label) in detection.shapes.iter().zip(&detection.labels) {
                println!("  #{:<3} {}", shape.contour_index, label);
            }
        }
        AnalysisOutput::Symmetry(report) => {
            println!(
                "{} of {} regions symmetric",
                report.symmetric_count(),
                report.regions.len()
            );
        }
        AnalysisOutput::Completion(completion) => {
            println!("Filled {} closed regions", completion.filled_regions);
        }
    }
}
