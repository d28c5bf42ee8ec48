use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};

use crate::chemistry::Ion;
use crate::chemistry::catalog::Catalog;
use crate::dosing::calculator::{
    DosePlan, SolvedPlan, concentrate, direct_dose, solve_batch, stock_back_calc,
};
use crate::error::AppError;
use crate::models::{
    ConcentrateInput, DirectInput, PRESETS, Preset, SolveInput, StockInput, UnitMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Brewing water mineral calculator — optional JSON output", long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "Accept negative volumes and calcium shares outside [0, 1]"
    )]
    permissive: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the salt catalog with molar masses and ion fractions
    Salts,
    /// List the built-in presets
    Presets,
    /// Fit arbitrary ion targets with a chosen set of salts
    Solve(DocArgs),
    /// Salts to weigh straight into a batch
    Direct(DocArgs),
    /// A single concentrate dosed per litre of water
    Concentrate(DocArgs),
    /// Stock strengths for per-component dose rates
    Stock(DocArgs),
}

#[derive(clap::Args, Debug)]
struct DocArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON input document; '-' reads from stdin"
    )]
    input: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON input document (overrides --input)"
    )]
    inputs_json: Option<String>,
    #[arg(
        long,
        value_name = "NAME",
        help = "Apply a built-in preset on top of the input document"
    )]
    preset: Option<String>,
}

/// Input documents the CLI can read.
trait Document: DeserializeOwned + Default {
    fn apply_preset(&mut self, preset: &Preset);
    fn check(&self) -> Result<(), AppError>;
}

impl Document for SolveInput {
    fn apply_preset(&mut self, preset: &Preset) {
        preset.apply_to_targets(&mut self.targets);
        self.unit_mode = preset.unit_mode;
    }
    fn check(&self) -> Result<(), AppError> {
        self.validate()
    }
}

impl Document for DirectInput {
    fn apply_preset(&mut self, preset: &Preset) {
        preset.apply_to_profile(&mut self.profile);
        self.unit_mode = preset.unit_mode;
    }
    fn check(&self) -> Result<(), AppError> {
        self.validate()
    }
}

impl Document for ConcentrateInput {
    fn apply_preset(&mut self, preset: &Preset) {
        preset.apply_to_profile(&mut self.profile);
        self.unit_mode = preset.unit_mode;
    }
    fn check(&self) -> Result<(), AppError> {
        self.validate()
    }
}

impl Document for StockInput {
    fn apply_preset(&mut self, preset: &Preset) {
        preset.apply_to_profile(&mut self.profile);
        self.unit_mode = preset.unit_mode;
    }
    fn check(&self) -> Result<(), AppError> {
        self.validate()
    }
}

fn read_source(doc: &DocArgs) -> Result<Option<String>, AppError> {
    match (&doc.inputs_json, &doc.input) {
        (Some(_), _) | (None, None) => Ok(None),
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            Ok(Some(s))
        }
        (None, Some(path)) => fs::read_to_string(path)
            .map(Some)
            .map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            }),
    }
}

fn load<T: Document>(doc: &DocArgs, permissive: bool) -> Result<T, AppError> {
    let mut parsed: T = if let Some(inline) = &doc.inputs_json {
        serde_json::from_str(inline).map_err(|source| AppError::ParseInputsJson { source })?
    } else if let Some(text) = read_source(doc)? {
        serde_json::from_str(&text).map_err(|source| AppError::ParseCmdInputJson { source })?
    } else if doc.preset.is_some() {
        T::default()
    } else {
        return Err(AppError::MissingInputData);
    };

    if let Some(name) = &doc.preset {
        let preset = Preset::find(name).ok_or_else(|| AppError::UnknownPreset(name.clone()))?;
        parsed.apply_preset(preset);
    }
    if !permissive {
        parsed.check()?;
    }
    Ok(parsed)
}

pub fn execute(args: &Args, catalog: &Catalog) -> Result<(), AppError> {
    match &args.command {
        Command::Salts => emit(args, catalog.entries(), || print_catalog(catalog)),
        Command::Presets => emit(args, &PRESETS, print_presets),
        Command::Solve(doc) => {
            let input: SolveInput = load(doc, args.permissive)?;
            let salts = input.salts.clone().unwrap_or_else(|| catalog.list_salts());
            let plan = solve_batch(
                catalog,
                &input.targets,
                input.unit_mode,
                &salts,
                &input.solver,
                input.batch_l,
            );
            emit(args, &plan, || print_solved(&plan, input.unit_mode))
        }
        Command::Direct(doc) => {
            let input: DirectInput = load(doc, args.permissive)?;
            let plan = direct_dose(catalog, &input.profile, input.unit_mode, input.batch_l);
            emit(args, &plan, || print_plan(&plan, "g / L", "g for batch"))
        }
        Command::Concentrate(doc) => {
            let input: ConcentrateInput = load(doc, args.permissive)?;
            let plan = concentrate(
                catalog,
                &input.profile,
                input.unit_mode,
                input.dose_ml,
                input.bottle_l,
            );
            emit(args, &plan, || {
                print_plan(&plan, "g/L (concentrate)", "Grams for bottle")
            })
        }
        Command::Stock(doc) => {
            let input: StockInput = load(doc, args.permissive)?;
            let plan = stock_back_calc(
                catalog,
                &input.profile,
                input.unit_mode,
                &input.dose_rates,
                input.bottle_l,
            );
            emit(args, &plan, || {
                print_plan(&plan, "Required strength (g/L)", "Grams for bottle")
            })
        }
    }
}

fn emit<T: Serialize + ?Sized>(
    args: &Args,
    out: &T,
    text: impl FnOnce(),
) -> Result<(), AppError> {
    if args.json {
        let s = serde_json::to_string_pretty(out)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
    } else {
        text();
    }
    Ok(())
}

/// Two decimals from 1 upwards, four below; blank for non-finite values.
pub fn format_amount(n: f64) -> String {
    if !n.is_finite() {
        String::new()
    } else if n.abs() >= 1.0 {
        format!("{:.2}", n)
    } else {
        format!("{:.4}", n)
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("{:<16} {:>10}  Ion mass fractions", "Salt", "g/mol");
    for entry in catalog.entries() {
        let mut parts: Vec<String> = Ion::ALL
            .into_iter()
            .filter(|&ion| entry.fraction(ion) > 0.0)
            .map(|ion| format!("{}={:.4}", ion, entry.fraction(ion)))
            .collect();
        if entry.carbonate_fraction > 0.0 {
            parts.push(format!("CO3={:.4}", entry.carbonate_fraction));
        }
        println!(
            "{:<16} {:>10.3}  {}",
            entry.salt.key(),
            entry.molar_mass,
            parts.join(" ")
        );
    }
}

fn print_presets() {
    for p in &PRESETS {
        println!(
            "{:<18} GH {:>5.1}  Alk {:>5.1}  Ca share {:.2}  ({})",
            p.name,
            p.gh,
            p.alk,
            p.ca_share,
            unit_label(p.unit_mode)
        );
    }
}

fn unit_label(mode: UnitMode) -> &'static str {
    match mode {
        UnitMode::Caco3 => "ppm as CaCO3",
        UnitMode::Mass => "mg/L by ion",
    }
}

fn print_plan(plan: &DosePlan, per_l_header: &str, grams_header: &str) {
    println!(
        "{:<12} {:<16} {:>24} {:>18}",
        "Component", "Salt", per_l_header, grams_header
    );
    for line in &plan.lines {
        println!(
            "{:<12} {:<16} {:>24} {:>18}",
            line.component.label(),
            line.salt.key(),
            format_amount(line.g_per_l),
            format_amount(line.grams)
        );
    }
    println!(
        "{:<12} {:<16} {:>24} {:>18}",
        "Total",
        "",
        "",
        format_amount(plan.total_grams())
    );
}

fn print_solved(plan: &SolvedPlan, mode: UnitMode) {
    println!("{:<16} {:>10} {:>14}", "Salt", "g / L", "g for batch");
    for line in &plan.lines {
        println!(
            "{:<16} {:>10} {:>14}",
            line.salt.key(),
            format_amount(line.g_per_l),
            format_amount(line.grams)
        );
    }
    let rep = &plan.report;
    println!();
    println!(
        "Status: {:?} after {} iterations (targets in {})",
        rep.status,
        rep.iterations,
        unit_label(mode)
    );
    println!("Residual sum of squares: {} (mg/L)^2", format_amount(rep.residual_sq));
    println!("{:<6} {:>12} {:>12}", "Ion", "target mg/L", "achieved");
    for ion in Ion::ALL {
        println!(
            "{:<6} {:>12} {:>12}",
            ion.symbol(),
            format_amount(rep.target.get(ion)),
            format_amount(rep.achieved.get(ion))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_switch_precision_at_one() {
        assert_eq!(format_amount(12.3456), "12.35");
        assert_eq!(format_amount(0.123456), "0.1235");
        assert_eq!(format_amount(-2.0), "-2.00");
        assert_eq!(format_amount(f64::NAN), "");
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::try_parse_from(["mineral_rs", "--json", "direct", "--preset", "SCA mid"])
            .unwrap();
        assert!(args.json);
        assert!(matches!(args.command, Command::Direct(_)));
    }
}
