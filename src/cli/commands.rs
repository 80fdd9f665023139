//! Command handlers. Each returns `Ok(false)` when the command ran but its
//! result is a failure (verification mismatches, audit problems).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use serde::de::DeserializeOwned;

use ccqo::catalog::audit_names;
use ccqo::data::loader::{get_inputs, InputOptions};
use ccqo::models::fwm_detuning::{FwmDetuningCalc, FwmDetuningParams};
use ccqo::models::ring_damping::{RingDampingCalc, RingDampingParams};
use ccqo::models::spectral_pump::{SpectralPumpCalc, SpectralPumpParams};
use ccqo::models::ConceptCalculation;
use ccqo::verify::{verify_against, ReferenceData, Tolerance, Verification};
use ccqo::Catalog;

use super::report;
use super::{
    CatalogCommand, Cli, Command, FwmDetuningArgs, OutputFormat, RingDampingArgs, SpectralPumpArgs,
};

/// Settings shared by every calculation command.
struct RunOptions {
    validate: bool,
    format: OutputFormat,
    reference: Option<PathBuf>,
    tolerance: Tolerance,
}

pub fn execute(cli: &Cli) -> Result<bool> {
    let opts = RunOptions {
        validate: cli.should_validate(),
        format: cli.format,
        reference: cli.reference.clone(),
        tolerance: cli.tolerance(),
    };

    match &cli.command {
        Command::FwmDetuning(args) => run_calculation::<FwmDetuningCalc>(&fwm_params(args)?, &opts),
        Command::RingDamping(args) => {
            run_calculation::<RingDampingCalc>(&ring_params(args)?, &opts)
        }
        Command::SpectralPump(args) => {
            run_calculation::<SpectralPumpCalc>(&spectral_params(args)?, &opts)
        }
        Command::Catalog(cmd) => handle_catalog(cmd, cli.format),
    }
}

fn run_calculation<C: ConceptCalculation>(params: &C::Params, opts: &RunOptions) -> Result<bool> {
    let id = C::catalog_id()?;
    if !opts.validate {
        info!("{id}: parameter validation skipped");
    }
    let outcome = C::run(params, opts.validate)?;

    let verification = match &opts.reference {
        Some(path) => {
            let reference = ReferenceData::load(path)
                .with_context(|| format!("loading reference data {}", path.display()))?;
            Some(verify_against(&outcome.output, &reference, opts.tolerance)?)
        }
        None => None,
    };

    print!(
        "{}",
        report::render_outcome(&id, &outcome, verification.as_deref(), opts.format)?
    );
    Ok(verification.map_or(true, |results| results.iter().all(Verification::passed)))
}

fn load_params<P: DeserializeOwned>(path: &Path) -> Result<P> {
    let file = File::open(path).with_context(|| format!("opening params file {}", path.display()))?;
    let params = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing params file {}", path.display()))?;
    Ok(params)
}

fn fwm_params(args: &FwmDetuningArgs) -> Result<FwmDetuningParams> {
    if let Some(path) = &args.params_file {
        return load_params(path);
    }
    match (args.pump1, args.signal) {
        (Some(pump1), Some(signal)) => Ok(FwmDetuningParams {
            pump1,
            signal,
            pump2: args.pump2,
            idler: args.idler,
        }),
        _ => bail!("--pump1 and --signal are required unless --params-file is given"),
    }
}

fn ring_params(args: &RingDampingArgs) -> Result<RingDampingParams> {
    if let Some(path) = &args.params_file {
        return load_params(path);
    }
    Ok(RingDampingParams {
        couplings: args.couplings.clone(),
        velocities: args.velocities.clone(),
    })
}

fn spectral_params(args: &SpectralPumpArgs) -> Result<SpectralPumpParams> {
    let delimiter = match u8::try_from(args.delimiter) {
        Ok(byte) if byte.is_ascii() => byte,
        _ => bail!("Delimiter must be a single ASCII character, got {:?}", args.delimiter),
    };
    let options = InputOptions {
        delimiter,
        num_header_rows: args.num_header_rows,
    };
    let inputs = get_inputs(&args.spectral_inputs, &options)?;
    info!(
        "Loaded {} spectral samples from {}",
        inputs.len(),
        args.spectral_inputs.display()
    );
    Ok(SpectralPumpParams::from(inputs))
}

fn handle_catalog(cmd: &CatalogCommand, format: OutputFormat) -> Result<bool> {
    match cmd {
        CatalogCommand::List => {
            let catalog = Catalog::builtin()?;
            print!("{}", report::render_catalog(catalog.iter(), format)?);
            Ok(true)
        }
        CatalogCommand::Show { module } => {
            let catalog = Catalog::builtin()?;
            let entry = catalog.lookup(module)?;
            print!("{}", report::render_entry(entry, format)?);
            Ok(true)
        }
        CatalogCommand::Audit { names } => {
            let problems: Vec<String> = audit_names(names.iter().map(String::as_str))
                .iter()
                .map(ToString::to_string)
                .collect();
            print!("{}", report::render_audit(&problems, format)?);
            Ok(problems.is_empty())
        }
    }
}
