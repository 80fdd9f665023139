//! Command-line interface for the `ccqo` binary.
//!
//! # Commands
//!
//! - `fwm-detuning`: four-wave mixing energy detuning (CCqo101)
//! - `ring-damping`: ring damping from coupled channels (CCqo102)
//! - `spectral-pump`: spectral pump in the ring from a spectral input file (CCqo103)
//! - `catalog`: list, show and audit catalog modules
//!
//! Long options and subcommands may be abbreviated while unambiguous.

pub mod commands;
pub mod report;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use ccqo::verify::Tolerance;

#[derive(Parser, Debug)]
#[command(
    name = "ccqo",
    version,
    about = "Quantum-optics concept calculations",
    infer_long_args = true,
    infer_subcommands = true
)]
pub struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write log entries to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Validate parameters before calculating (default)
    #[arg(long, global = true, overrides_with = "no_validate")]
    pub validate: bool,

    /// Skip parameter validation
    #[arg(long, global = true, overrides_with = "validate")]
    pub no_validate: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Reference outputs (.csv or .json) to verify the results against
    #[arg(long, global = true)]
    pub reference: Option<PathBuf>,

    /// Relative tolerance for verification
    #[arg(long, default_value_t = 1e-5, global = true)]
    pub rtol: f64,

    /// Absolute tolerance for verification
    #[arg(long, default_value_t = 1e-8, global = true)]
    pub atol: f64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn should_validate(&self) -> bool {
        !self.no_validate
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            rtol: self.rtol,
            atol: self.atol,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Energy detuning of a four-wave mixing process (CCqo101)
    FwmDetuning(FwmDetuningArgs),

    /// Ring damping from the channels coupled to it (CCqo102)
    RingDamping(RingDampingArgs),

    /// Spectral pump in the ring from a spectral input file (CCqo103)
    SpectralPump(SpectralPumpArgs),

    /// Inspect the catalog of concept calculations
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Args, Debug)]
pub struct FwmDetuningArgs {
    /// Frequency of the first pump photon
    #[arg(long, allow_negative_numbers = true, required_unless_present = "params_file")]
    pub pump1: Option<f64>,

    /// Frequency of the signal photon
    #[arg(long, allow_negative_numbers = true, required_unless_present = "params_file")]
    pub signal: Option<f64>,

    /// Frequency of the second pump photon (default: pump1)
    #[arg(long, allow_negative_numbers = true)]
    pub pump2: Option<f64>,

    /// Frequency of the idler photon (default: signal)
    #[arg(long, allow_negative_numbers = true)]
    pub idler: Option<f64>,

    /// JSON file holding the parameters instead
    #[arg(long, conflicts_with_all = ["pump1", "signal", "pump2", "idler"])]
    pub params_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RingDampingArgs {
    /// Coupling constant of each channel
    #[arg(
        long,
        num_args = 1..,
        allow_negative_numbers = true,
        required_unless_present = "params_file"
    )]
    pub couplings: Vec<f64>,

    /// Group velocity of each channel
    #[arg(
        long,
        num_args = 1..,
        allow_negative_numbers = true,
        required_unless_present = "params_file"
    )]
    pub velocities: Vec<f64>,

    /// JSON file holding the parameters instead
    #[arg(long, conflicts_with_all = ["couplings", "velocities"])]
    pub params_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SpectralPumpArgs {
    /// Spectral input table (.csv, .txt, .dat, .json or .parquet)
    #[arg(long)]
    pub spectral_inputs: PathBuf,

    /// Rows before the data in delimited files; the first holds column names
    #[arg(long, default_value_t = 2)]
    pub num_header_rows: usize,

    /// Field separator for delimited files
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List every registered module
    List,

    /// Show one module with its parameter definitions
    Show {
        /// Module name, catalog number or concept
        module: String,
    },

    /// Check module names against the naming convention and for clashes
    Audit {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use ccqo::models::fwm_detuning::calc_fwm_detuning;
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ccqo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validation_is_on_by_default() {
        let cli = parse(&["fwm-detuning", "--pump1", "10", "--signal", "8"]);
        assert!(cli.should_validate());
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.tolerance(), Tolerance::default());
    }

    #[test]
    fn last_validate_flag_wins() {
        let ring = ["ring-damping", "--couplings", "1", "--velocities", "2"];
        let cli = parse(&[&["--no-validate", "--validate"][..], &ring[..]].concat());
        assert!(cli.should_validate());
        let cli = parse(&[&["--validate", "--no-validate"][..], &ring[..]].concat());
        assert!(!cli.should_validate());
    }

    #[test]
    fn abbreviations_are_accepted() {
        let cli = parse(&["fwm", "--pump1", "10", "--sig", "8", "--idl", "12"]);
        match cli.command {
            Command::FwmDetuning(args) => {
                assert_eq!(args.signal, Some(8.0));
                assert_eq!(args.idler, Some(12.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn ring_damping_takes_lists_and_negative_values() {
        let cli = parse(&["ring-damping", "--couplings", "-1", "2", "--velocities", "3", "4"]);
        match cli.command {
            Command::RingDamping(args) => {
                assert_eq!(args.couplings, [-1.0, 2.0]);
                assert_eq!(args.velocities, [3.0, 4.0]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn params_file_replaces_required_values() {
        let cli = parse(&["fwm-detuning", "--params-file", "p.json"]);
        assert!(matches!(
            cli.command,
            Command::FwmDetuning(FwmDetuningArgs {
                params_file: Some(_),
                ..
            })
        ));
        let clash = Cli::try_parse_from([
            "ccqo",
            "fwm-detuning",
            "--params-file",
            "p.json",
            "--pump1",
            "1",
        ]);
        assert!(clash.is_err());
    }

    #[test]
    fn idler_help_names_the_default_used_by_the_calculation() {
        let mut cli = Cli::command();
        let help = cli
            .find_subcommand_mut("fwm-detuning")
            .unwrap()
            .render_long_help()
            .to_string();
        assert!(help.contains("Frequency of the idler photon (default: signal)"));

        // Without an idler the output sum is twice the signal.
        let out = calc_fwm_detuning(10.0, 8.0, None, None);
        assert_eq!(out.output_sum, 16.0);
        assert_eq!(out.detuning, -4.0);
    }

    #[test]
    fn missing_required_values_are_rejected() {
        assert!(Cli::try_parse_from(["ccqo", "fwm-detuning", "--pump1", "1"]).is_err());
        assert!(Cli::try_parse_from(["ccqo", "catalog", "audit"]).is_err());
    }
}
