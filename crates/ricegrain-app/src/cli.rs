use clap::{Args, Parser, Subcommand};
use ricegrain_classifiers::FallbackPolicy;
use ricegrain_core::FeatureVector;
use ricegrain_policy::PolicyKind;
use std::path::PathBuf;

use crate::config::ModelSource;

#[derive(Parser, Debug)]
#[command(name = "ricegrain")]
#[command(
    author,
    version,
    about = "Classify rice grains as Cammeo or Osmancik from seven measurements"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web form server
    Serve {
        /// Listen port
        #[arg(short, long, env = "RICEGRAIN_PORT")]
        port: Option<u16>,

        /// Listen address
        #[arg(short, long, env = "RICEGRAIN_ADDRESS")]
        address: Option<String>,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify a single grain and print the result
    Predict {
        #[command(flatten)]
        features: FeatureArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Print the full JSON response
        #[arg(long)]
        json: bool,

        /// Write the probability chart as a standalone HTML page
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a synthetic demonstration artifact (no predictive validity)
    ExportModel {
        /// Output path
        #[arg(short, long, default_value = "./model.json")]
        output: PathBuf,

        /// Number of trees
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Random training rows
        #[arg(long, default_value = "100")]
        samples: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Model and decision settings shared by `serve` and `predict`.
///
/// Anything given here overrides the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "ricegrain.yaml", env = "RICEGRAIN_CONFIG")]
    pub config: String,

    /// Model artifact path
    #[arg(short, long, env = "RICEGRAIN_MODEL")]
    pub model: Option<PathBuf>,

    /// Model source: artifact or mock
    #[arg(long, value_parser = parse_source)]
    pub source: Option<ModelSource>,

    /// Behavior when the artifact cannot be loaded: permissive or strict
    #[arg(long, value_parser = parse_fallback)]
    pub fallback: Option<FallbackPolicy>,

    /// Label policy: argmax or threshold
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<PolicyKind>,

    /// Confidence threshold for the threshold policy
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Seed for the synthetic fallback model
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Grain measurements; defaults match the web form
#[derive(Args, Debug, Clone)]
pub struct FeatureArgs {
    #[arg(long, default_value = "12000.0")]
    pub area: f64,

    #[arg(long, default_value = "400.0")]
    pub perimeter: f64,

    #[arg(long, default_value = "200.0")]
    pub major_axis_length: f64,

    #[arg(long, default_value = "100.0")]
    pub minor_axis_length: f64,

    #[arg(long, default_value = "0.8")]
    pub eccentricity: f64,

    #[arg(long, default_value = "12500.0")]
    pub convex_area: f64,

    #[arg(long, default_value = "0.75")]
    pub extent: f64,
}

impl From<FeatureArgs> for FeatureVector {
    fn from(args: FeatureArgs) -> Self {
        FeatureVector {
            area: args.area,
            perimeter: args.perimeter,
            major_axis_length: args.major_axis_length,
            minor_axis_length: args.minor_axis_length,
            eccentricity: args.eccentricity,
            convex_area: args.convex_area,
            extent: args.extent,
        }
    }
}

fn parse_source(s: &str) -> Result<ModelSource, String> {
    s.parse()
}

fn parse_fallback(s: &str) -> Result<FallbackPolicy, String> {
    s.parse()
}

fn parse_policy(s: &str) -> Result<PolicyKind, String> {
    s.parse()
}
