// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, to_value, Map, Value};

use crate::aggregate::Breakdown;
use crate::engine::ReportRun;

fn counts_line(label: &str, breakdown: &Breakdown) -> String {
    let c = &breakdown.counts;
    let r = &breakdown.requirements;
    format!(
        "{label}: tests={} pass={} fail={} skip={} unresolved={} requirements={} covered={} passed={}",
        c.total,
        c.pass,
        c.fail,
        c.skip,
        c.unresolved,
        r.requirements_total,
        r.requirements_covered,
        r.requirements_passed
    )
}

pub fn render_text_summary(run: &ReportRun) -> String {
    let report = &run.prepared.aggregate;
    let mut lines = vec![counts_line("summary", &report.totals)];
    for level in report.levels.iter().filter(|l| l.breakdown.counts.total > 0) {
        lines.push(counts_line(&format!("level {}", level.level), &level.breakdown));
    }
    for entry in &report.unresolved {
        lines.push(format!("unresolved: {} ({})", entry.id, entry.reason.label()));
    }
    for written in &run.writes.written {
        lines.push(format!(
            "written: {} {} sha256={}",
            written.kind.as_str(),
            written.path.display(),
            written.sha256
        ));
    }
    for failed in &run.writes.failed {
        lines.push(format!(
            "failed: {} {} ({})",
            failed.kind.as_str(),
            failed.file_name,
            failed.error
        ));
    }
    lines.join("\n")
}

/// Machine-readable run summary. Fails instead of panicking when a value
/// cannot be represented in JSON, such as a non UTF-8 artifact path.
pub fn summary_value(run: &ReportRun) -> Result<Value, serde_json::Error> {
    let report = &run.prepared.aggregate;
    let failed = run
        .writes
        .failed
        .iter()
        .map(|f| {
            json!({
                "kind": f.kind.as_str(),
                "file_name": f.file_name,
                "error": f.error.to_string(),
            })
        })
        .collect();
    let mut artifacts = Map::new();
    artifacts.insert("written".to_string(), to_value(&run.writes.written)?);
    artifacts.insert("failed".to_string(), Value::Array(failed));

    let mut summary = Map::new();
    summary.insert("context".to_string(), to_value(&report.context)?);
    summary.insert("totals".to_string(), to_value(&report.totals)?);
    summary.insert("levels".to_string(), to_value(&report.levels)?);
    summary.insert("feed".to_string(), to_value(&run.prepared.feed)?);
    summary.insert("unresolved".to_string(), to_value(&report.unresolved)?);
    summary.insert("artifacts".to_string(), Value::Object(artifacts));
    Ok(Value::Object(summary))
}

pub fn render_json(run: &ReportRun) -> Result<String, String> {
    summary_value(run)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .map_err(|err| err.to_string())
}
