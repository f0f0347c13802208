//! Table rendering of pipeline results

use agent_core::Opinion;
use agent_workflow::{AgentFailure, PipelineResult, QuickPipelineResult, Summary};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::fmt::Write;

/// Render a full pipeline result
pub fn full_report(result: &PipelineResult) -> String {
    let mut out = header(&result.subject_name, &result.subject_id, &result.run_id, result.elapsed_ms);

    let stages = [
        ("analysts", result.analyst_results.as_slice()),
        ("researchers", result.research_results.as_slice()),
        ("traders", result.trading_results.as_slice()),
        ("reflection", std::slice::from_ref(&result.reflection_result)),
    ];
    let _ = writeln!(out, "{}", opinion_table(&stages));
    let _ = writeln!(out, "{}", summary_table(&result.summary));
    push_list(&mut out, "Key insights", &result.summary.key_insights);
    push_list(&mut out, "Major risks", &result.summary.major_risks);
    push_failures(&mut out, &result.failures);

    out
}

/// Render a quick pipeline result
pub fn quick_report(result: &QuickPipelineResult) -> String {
    let mut out = header(&result.subject_name, &result.subject_id, &result.run_id, result.elapsed_ms);

    let stages = [
        ("core analysts", result.core_results.as_slice()),
        ("decision", std::slice::from_ref(&result.trading_result)),
    ];
    let _ = writeln!(out, "{}", opinion_table(&stages));

    let summary = &result.quick_summary;
    let mut table = new_table(vec!["Average score", "Recommendation", "Confidence"]);
    table.add_row(vec![
        format!("{:.1}", summary.average_score),
        summary.recommendation.to_string(),
        format!("{:.0}%", summary.confidence * 100.0),
    ]);
    let _ = writeln!(out, "{table}");
    push_list(&mut out, "Key points", &summary.key_points);
    push_list(&mut out, "Main risks", &summary.main_risks);
    push_failures(&mut out, &result.failures);

    out
}

fn header(name: &str, id: &str, run_id: &str, elapsed_ms: u64) -> String {
    format!("{name} ({id})\nrun {run_id}, {elapsed_ms} ms\n\n")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn opinion_table(stages: &[(&str, &[Opinion])]) -> Table {
    let mut table = new_table(vec!["Stage", "Agent", "Score", "Confidence", "Recommendation"]);
    for (stage, opinions) in stages {
        for opinion in *opinions {
            table.add_row(vec![
                (*stage).to_string(),
                opinion.source_name.clone(),
                opinion.score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}")),
                opinion
                    .confidence
                    .map_or_else(|| "-".to_string(), |c| format!("{:.0}%", c * 100.0)),
                opinion
                    .recommendation
                    .map_or_else(|| "-".to_string(), |r| r.to_string()),
            ]);
        }
    }
    table
}

fn summary_table(summary: &Summary) -> Table {
    let mut table = new_table(vec![
        "Average score",
        "Dominant",
        "Consensus",
        "Final",
        "Confidence",
    ]);
    table.add_row(vec![
        format!("{:.1}", summary.average_score),
        summary
            .dominant_recommendation
            .map_or_else(|| "-".to_string(), |r| r.to_string()),
        format!("{:.0}%", summary.consensus * 100.0),
        summary.final_recommendation.to_string(),
        format!("{:.0}%", summary.confidence * 100.0),
    ]);
    table
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn push_failures(out: &mut String, failures: &[AgentFailure]) {
    if failures.is_empty() {
        return;
    }
    let _ = writeln!(out, "Failed agents:");
    for failure in failures {
        let _ = writeln!(
            out,
            "  - [{}] {}: {}",
            failure.stage, failure.agent_name, failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, Recommendation, SourceKind};
    use agent_workflow::Aggregator;

    fn opinion(name: &str, kind: SourceKind, rec: Recommendation, score: f64) -> Opinion {
        Opinion::new(name, kind, "view")
            .with_recommendation(rec)
            .with_score(score)
            .with_insight(format!("{name} insight"))
    }

    #[test]
    fn test_quick_report() {
        let core = vec![opinion("technical_analyst", SourceKind::Analyst, Recommendation::Buy, 66.0)];
        let decision = opinion("trader", SourceKind::Trader, Recommendation::Hold, 55.0);
        let result = QuickPipelineResult {
            run_id: "run-1".to_string(),
            subject_id: "AAPL".to_string(),
            subject_name: "Apple Inc.".to_string(),
            started_at: decision.produced_at,
            elapsed_ms: 12,
            quick_summary: Aggregator::default().summarize_quick(&core, &decision),
            core_results: core,
            trading_result: decision,
            failures: vec![AgentFailure::new(
                "core_analysts",
                "fundamental_analyst",
                AgentError::missing("pe_ratio"),
            )],
        };

        let report = quick_report(&result);

        assert!(report.starts_with("Apple Inc. (AAPL)"));
        assert!(report.contains("technical_analyst"));
        assert!(report.contains("decision"));
        assert!(report.contains("technical_analyst insight"));
        assert!(report.contains("[core_analysts] fundamental_analyst: Data not available"));
    }
}
