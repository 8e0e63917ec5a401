//! Reporting and export: CSV tables and a JSON run summary.
//!
//! Artifacts for one run:
//! - **flip_results.csv**: one row per (deal, lens)
//! - **monetization_opportunities.csv**: the ranked (region, lens) table
//! - **summary.json**: per-lens verdicts, active bars and tuning details

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use fliplab_core::DealSimulationResult;

use crate::opportunity::Opportunity;
use crate::orchestrator::{Evaluation, RunSummary};

pub const RESULTS_FILE: &str = "flip_results.csv";
pub const OPPORTUNITIES_FILE: &str = "monetization_opportunities.csv";
pub const SUMMARY_FILE: &str = "summary.json";

// ─── CSV export ─────────────────────────────────────────────────────

/// Result rows as CSV.
///
/// Columns: address, region_ring, lens, friction, p10_roi, p50_roi, p90_roi,
/// var5_roi, cvar5_roi, p_loss, risk_adj_roi
pub fn results_csv(rows: &[DealSimulationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "address",
        "region_ring",
        "lens",
        "friction",
        "p10_roi",
        "p50_roi",
        "p90_roi",
        "var5_roi",
        "cvar5_roi",
        "p_loss",
        "risk_adj_roi",
    ])?;

    for r in rows {
        wtr.write_record([
            r.address.as_str(),
            r.region_ring.name(),
            r.lens.name(),
            &format!("{:.1}", r.friction),
            &format!("{:.2}", r.p10_roi),
            &format!("{:.2}", r.p50_roi),
            &format!("{:.2}", r.p90_roi),
            &format!("{:.2}", r.var5_roi),
            &format!("{:.2}", r.cvar5_roi),
            &format!("{:.2}", r.p_loss),
            &format!("{:.2}", r.risk_adj_roi),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Ranked opportunity table as CSV, in rank order.
pub fn opportunities_csv(table: &[Opportunity]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["region", "lens", "risk_adj", "ploss", "cvar5", "status", "nudge"])?;
    for o in table {
        wtr.write_record([
            o.region.name(),
            o.lens.name(),
            &format!("{:.2}", o.risk_adj),
            &format!("{:.2}", o.ploss),
            &format!("{:.2}", o.cvar5),
            o.status.label(),
            o.nudge.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the three artifacts into `{output_dir}/run_{timestamp}/`.
///
/// Returns the path to the created directory.
pub fn save_artifacts(eval: &Evaluation, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_artifact(&run_dir, RESULTS_FILE, &results_csv(&eval.results)?)?;
    write_artifact(&run_dir, OPPORTUNITIES_FILE, &opportunities_csv(&eval.opportunities)?)?;
    write_artifact(&run_dir, SUMMARY_FILE, &summary_json(&eval.summary)?)?;

    tracing::info!(dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}

fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunity::{nudge, CAUTION_NUDGE};
    use fliplab_core::{DecisionBars, DecisionStatus, DecisionSummary, Lens, RegionRing};
    use std::collections::BTreeMap;

    fn row() -> DealSimulationResult {
        DealSimulationResult {
            address: "12 N State St, Chicago".into(),
            region_ring: RegionRing::UrbanCore,
            lens: Lens::Engineer,
            friction: 50.3,
            p10_roi: -17.8,
            p50_roi: 1.46,
            p90_roi: 20.8,
            var5_roi: -23.2,
            cvar5_roi: -29.5,
            p_loss: 46.1,
            risk_adj_roi: 0.73,
        }
    }

    fn evaluation() -> Evaluation {
        let summary = DecisionSummary {
            risk_adj: 0.73,
            ploss: 46.1,
            cvar5: -29.5,
            status: DecisionStatus::Caution,
        };
        Evaluation {
            results: vec![row()],
            summary: RunSummary {
                lenses: BTreeMap::from([(Lens::Engineer, summary)]),
                bars: DecisionBars::default(),
                defaults: None,
                tune: None,
                trials: 10_000,
                seed: 42,
            },
            opportunities: vec![Opportunity {
                region: RegionRing::UrbanCore,
                lens: Lens::Engineer,
                risk_adj: 0.73,
                ploss: 46.1,
                cvar5: -29.5,
                status: DecisionStatus::Caution,
                nudge: nudge(DecisionStatus::Caution).to_string(),
            }],
        }
    }

    #[test]
    fn results_csv_quotes_addresses() {
        let csv = results_csv(&[row()]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("address,region_ring,lens,friction"));
        assert_eq!(
            lines.next().unwrap(),
            "\"12 N State St, Chicago\",Urban Core,Engineer,50.3,-17.80,1.46,20.80,-23.20,-29.50,46.10,0.73"
        );
    }

    #[test]
    fn opportunities_csv_keeps_nudge_text() {
        let csv = opportunities_csv(&evaluation().opportunities).unwrap();
        assert!(csv.contains("CAUTION"));
        assert!(csv.contains(CAUTION_NUDGE));
    }

    #[test]
    fn summary_json_names_lenses() {
        let json = summary_json(&evaluation().summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lenses"]["Engineer"]["status"], "CAUTION");
        assert_eq!(value["bars"]["risk_adj"], 8.5);
        assert!(value.get("defaults").is_none());
    }

    #[test]
    fn save_artifacts_writes_bundle() {
        let dir = tempfile::TempDir::new().unwrap();
        let run_dir = save_artifacts(&evaluation(), dir.path()).unwrap();
        for name in [RESULTS_FILE, OPPORTUNITIES_FILE, SUMMARY_FILE] {
            assert!(run_dir.join(name).is_file(), "missing {name}");
        }
    }
}
