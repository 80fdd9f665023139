//! Text and JSON rendering of command results.

use std::fmt::Write as _;

use anyhow::Result;
use num_complex::Complex64;
use serde::Serialize;

use ccqo::catalog::{CatalogEntry, CatalogId};
use ccqo::models::{Outcome, Quantities};
use ccqo::verify::Verification;

use super::OutputFormat;

#[derive(Serialize)]
struct CalculationReport<'a, O> {
    module: &'a CatalogId,
    output: &'a O,
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    verification: Option<&'a [Verification]>,
}

/// `1.5`, or `1.5-0.2i` when the imaginary part is non-zero.
pub fn format_value(z: Complex64) -> String {
    if z.im == 0.0 {
        format!("{}", z.re)
    } else if z.im.is_sign_negative() {
        format!("{}-{}i", z.re, -z.im)
    } else {
        format!("{}+{}i", z.re, z.im)
    }
}

fn format_values(values: &[Complex64]) -> String {
    match values {
        [single] => format_value(*single),
        many => {
            let items: Vec<String> = many.iter().copied().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Continuation lines of a multi-line message, indented under its first line.
fn push_indented(out: &mut String, indent: &str, message: &str) {
    for (k, line) in message.lines().enumerate() {
        let lead = if k == 0 { "- " } else { "  " };
        let _ = writeln!(out, "{indent}{lead}{line}");
    }
}

pub fn render_outcome<O: Quantities + Serialize>(
    id: &CatalogId,
    outcome: &Outcome<O>,
    verification: Option<&[Verification]>,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        let report = CalculationReport {
            module: id,
            output: &outcome.output,
            warnings: &outcome.warnings,
            verification,
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{id}");
    let quantities = outcome.output.quantities();
    let width = quantities.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, values) in &quantities {
        let _ = writeln!(out, "  {name:<width$} = {}", format_values(values));
    }

    if !outcome.warnings.is_empty() {
        let _ = writeln!(out, "warnings:");
        for warning in &outcome.warnings {
            push_indented(&mut out, "  ", warning);
        }
    }

    if let Some(results) = verification {
        let _ = writeln!(out, "verification:");
        for v in results {
            let status = if v.passed() { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "  {:<width$} {status} ({} values, max |deviation| {:e})",
                v.quantity, v.compared, v.max_abs_deviation
            );
            for m in &v.mismatches {
                let _ = writeln!(
                    out,
                    "    [{}] computed {}, expected {}",
                    m.index,
                    format_value(m.computed),
                    format_value(m.expected)
                );
            }
        }
    }
    Ok(out)
}

pub fn render_catalog<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    format: OutputFormat,
) -> Result<String> {
    let entries: Vec<&CatalogEntry> = entries.into_iter().collect();
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&entries)?);
    }

    let width = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{:<width$}  {}", entry.id.to_string(), entry.summary);
    }
    Ok(out)
}

pub fn render_entry(entry: &CatalogEntry, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(entry)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", entry.id);
    let _ = writeln!(out, "  {}", entry.summary);
    let _ = writeln!(out, "  module: {}", entry.id.module_name());
    let _ = writeln!(out, "parameters:");
    for p in entry.params {
        let _ = writeln!(out, "  {} ({:?}, {}, {})", p.name, p.flow, p.datatype, p.units);
        let _ = writeln!(out, "      {}", p.desc);
        if !p.valrange.is_empty() {
            let _ = writeln!(out, "      range: {}", p.valrange);
        }
        if !p.default.is_empty() {
            let _ = writeln!(out, "      default: {}", p.default);
        }
    }
    Ok(out)
}

pub fn render_audit(problems: &[String], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(problems)?);
    }
    if problems.is_empty() {
        return Ok("All module names are valid and unique\n".to_string());
    }
    let mut out = String::new();
    for problem in problems {
        push_indented(&mut out, "", problem);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use ccqo::models::ring_damping::calc_ring_damping;
    use ccqo::verify::Mismatch;
    use ccqo::Catalog;

    use super::*;

    fn ring_outcome() -> (CatalogId, Outcome<ccqo::models::ring_damping::RingDamping>) {
        let output = calc_ring_damping(&[12.0, 20.0], &[3.0, 4.0]).unwrap();
        let id = CatalogId::new(102, "ring_damping").unwrap();
        (
            id,
            Outcome {
                output,
                warnings: vec!["first line\nsecond line".to_string()],
            },
        )
    }

    #[test]
    fn values_render_real_and_complex() {
        assert_eq!(format_value(Complex64::new(74.0, 0.0)), "74");
        assert_eq!(format_value(Complex64::new(1.2, -1.6)), "1.2-1.6i");
        assert_eq!(format_value(Complex64::new(0.5, 2.0)), "0.5+2i");
        assert_eq!(format_values(&[Complex64::from(24.0), Complex64::from(50.0)]), "[24, 50]");
    }

    #[test]
    fn text_outcome_lists_quantities_and_warnings() {
        let (id, outcome) = ring_outcome();
        let text = render_outcome(&id, &outcome, None, OutputFormat::Text).unwrap();
        assert!(text.starts_with("CCqo102_ring_damping\n"));
        assert!(text.contains("damping     = 74"));
        assert!(text.contains("path_losses = [24, 50]"));
        assert!(text.contains("  - first line\n    second line\n"));
        assert!(!text.contains("verification:"));
    }

    #[test]
    fn text_outcome_shows_failed_verification() {
        let (id, outcome) = ring_outcome();
        let verification = [Verification {
            quantity: "damping".to_string(),
            compared: 1,
            max_abs_deviation: 1.0,
            mismatches: vec![Mismatch {
                index: 0,
                computed: Complex64::from(74.0),
                expected: Complex64::from(75.0),
            }],
        }];
        let text = render_outcome(&id, &outcome, Some(&verification), OutputFormat::Text).unwrap();
        assert!(text.contains("FAIL"));
        assert!(text.contains("[0] computed 74, expected 75"));
    }

    #[test]
    fn json_outcome_is_structured() {
        let (id, outcome) = ring_outcome();
        let json = render_outcome(&id, &outcome, None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["module"], "CCqo102_ring_damping");
        assert_eq!(value["output"]["damping"], 74.0);
        assert!(value.get("verification").is_none());
    }

    #[test]
    fn catalog_listing_has_one_line_per_module() {
        let catalog = Catalog::builtin().unwrap();
        let text = render_catalog(catalog.iter(), OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().starts_with("CCqo101_FWM_detuning"));
    }

    #[test]
    fn clean_audit_says_so() {
        assert_eq!(
            render_audit(&[], OutputFormat::Text).unwrap(),
            "All module names are valid and unique\n"
        );
        assert_eq!(render_audit(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
