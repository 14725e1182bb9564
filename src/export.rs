use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::pipeline::{ChunkTrace, RunState};
use crate::settings::Settings;

/// Display cutoff for candidate values in the flat text report. The JSON
/// form never truncates.
const TEXT_PREVIEW_CHARS: usize = 100;

/// Flat export of one finished (or aborted) run: the settings snapshot, every
/// recorded per-chunk per-pass candidate set, and the final versions.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub settings: Settings,
    pub intermediate_outputs: Vec<ChunkTrace>,
    pub final_outputs: Vec<String>,
}

pub fn build_report(state: &RunState, settings: &Settings) -> RunReport {
    RunReport {
        timestamp: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
        settings: settings.clone(),
        intermediate_outputs: state.intermediate.clone(),
        final_outputs: state
            .final_versions
            .as_ref()
            .map(|v| v.to_vec())
            .unwrap_or_default(),
    }
}

pub fn write_json_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("write report: {}", path.display()))?;
    Ok(())
}

pub fn write_text_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    std::fs::write(path, render_text_report(report))
        .with_context(|| format!("write report: {}", path.display()))?;
    Ok(())
}

/// Renders the report as a human-readable document with a fixed section
/// order: header, settings, per-chunk per-pass candidates, final versions.
pub fn render_text_report(report: &RunReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);
    let sub_rule = "-".repeat(30);

    let _ = writeln!(out, "Humanizer Run - {}", report.timestamp);
    let _ = writeln!(out, "{rule}\n");

    let s = &report.settings;
    out.push_str("SETTINGS:\n");
    let _ = writeln!(out, "  Strength: {}", s.strength.name());
    let _ = writeln!(out, "  Custom Passes: {}", s.custom_passes);
    let _ = writeln!(out, "  Use Custom Passes: {}", s.use_custom_passes);
    let _ = writeln!(out, "  Remove Dashes: {}", s.remove_dashes);
    let _ = writeln!(out, "  Save Intermediate: {}\n", s.save_intermediate);

    out.push_str("INTERMEDIATE OUTPUTS:\n");
    let _ = writeln!(out, "{rule}\n");
    for (i, chunk) in report.intermediate_outputs.iter().enumerate() {
        let _ = writeln!(out, "CHUNK {}:", i + 1);
        let _ = writeln!(out, "{sub_rule}");
        let _ = writeln!(out, "  Original: {}", preview(&chunk.original));
        for (pass, outputs) in chunk.outputs.iter().enumerate() {
            let _ = writeln!(out, "\n  Pass {}:", pass + 1);
            for (v, candidate) in outputs.iter().enumerate() {
                let _ = writeln!(out, "    Version {}: {}", v + 1, preview(candidate));
            }
        }
        out.push('\n');
    }

    out.push_str("\nFINAL OUTPUTS:\n");
    let _ = writeln!(out, "{rule}\n");
    for (i, version) in report.final_outputs.iter().enumerate() {
        let _ = writeln!(out, "Version {}:", i + 1);
        let _ = writeln!(out, "{sub_rule}");
        let _ = writeln!(out, "{version}\n");
    }

    out
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TEXT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn default_report_filename(timestamp: &str, json: bool) -> String {
    let ext = if json { "json" } else { "txt" };
    format!("humanizer_run_{timestamp}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Strength;

    fn sample_report() -> RunReport {
        RunReport {
            timestamp: "20250101_120000".to_string(),
            settings: Settings {
                strength: Strength::Maximum,
                ..Settings::default()
            },
            intermediate_outputs: vec![ChunkTrace {
                original: "the original chunk.".to_string(),
                outputs: vec![vec![
                    "cand one".to_string(),
                    "cand two".to_string(),
                    "cand three".to_string(),
                    "x".repeat(150),
                ]],
            }],
            final_outputs: vec![
                "v1".to_string(),
                "v2".to_string(),
                "v3".to_string(),
                "v4".to_string(),
            ],
        }
    }

    #[test]
    fn json_form_keeps_full_candidates() {
        let report = sample_report();
        let value = serde_json::to_value(&report).expect("json");
        let long = value["intermediate_outputs"][0]["outputs"][0][3]
            .as_str()
            .expect("candidate");
        assert_eq!(long.len(), 150);
        assert_eq!(value["timestamp"], "20250101_120000");
        assert_eq!(value["final_outputs"].as_array().expect("arr").len(), 4);
    }

    #[test]
    fn text_form_sections_appear_in_fixed_order() {
        let text = render_text_report(&sample_report());
        let header = text.find("Humanizer Run -").expect("header");
        let settings = text.find("SETTINGS:").expect("settings");
        let intermediate = text.find("INTERMEDIATE OUTPUTS:").expect("intermediate");
        let finals = text.find("FINAL OUTPUTS:").expect("finals");
        assert!(header < settings && settings < intermediate && intermediate < finals);
        assert!(text.contains("Strength: Maximum"));
        assert!(text.contains("CHUNK 1:"));
        assert!(text.contains("Pass 1:"));
        assert!(text.contains("Version 4:"));
    }

    #[test]
    fn text_form_truncates_long_candidates_only() {
        let text = render_text_report(&sample_report());
        let truncated = format!("{}...", "x".repeat(100));
        assert!(text.contains(&truncated));
        assert!(!text.contains(&"x".repeat(150)));
    }

    #[test]
    fn default_filename_uses_timestamp_and_format() {
        assert_eq!(
            default_report_filename("20250101_120000", true),
            "humanizer_run_20250101_120000.json"
        );
        assert_eq!(
            default_report_filename("20250101_120000", false),
            "humanizer_run_20250101_120000.txt"
        );
    }
}
