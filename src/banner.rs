//! Startup banner and screening report display.

use crate::consts::{AUTHOR, REPO};
use crate::pipeline::Screening;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub rate_source: &'a str,
    pub rate_query: &'a str,
    pub threshold: f64,
    pub config: &'a str,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ┌───────────────────────────────────────┐
   │          P R E S C R E E N            │
   │   income, debt, rate: a first look    │
   └───────────────────────────────────────┘

   version    {}
   by         {}
   repo       {}
   rates      {} ({:?})
   threshold  {:.2}%
   config     {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        REPO,
        info.rate_source,
        info.rate_query,
        info.threshold,
        info.config,
    );
}

/// The text shown to the user at the end of a run.
pub fn render_report(screening: &Screening) -> String {
    let mut out = String::new();
    for m in &screening.messages {
        // The decision summary is printed on its own below.
        if screening
            .decision()
            .is_some_and(|d| d.summary == m.message)
        {
            continue;
        }
        out.push_str(&format!("  [{}] ✓ {}\n", m.stage, m.message));
    }
    if let Some(halt) = &screening.halted {
        out.push_str(&format!("  ✗ {halt}\n"));
        out.push_str("screening stopped before a decision was made.");
    } else if let Some(decision) = screening.decision() {
        out.push('\n');
        out.push_str(&decision.summary);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageMessage;
    use crate::stages::Phase;
    use crate::state::{Decision, SessionState, Status};

    #[test]
    fn print_banner_does_not_panic() {
        print_banner(&BannerInfo {
            rate_source: "fixed",
            rate_query: "current mortgage rates",
            threshold: 43.0,
            config: "/tmp/prescreen.db",
        });
    }

    #[test]
    fn report_for_halted_run() {
        let screening = Screening {
            state: SessionState::default(),
            phase: Phase::Halted,
            messages: vec![],
            halted: Some("Error: Monthly income must be greater than zero.".to_string()),
        };
        let report = render_report(&screening);
        assert!(report.contains("✗ Error: Monthly income"));
        assert!(report.contains("stopped before a decision"));
    }

    #[test]
    fn report_prints_summary_once() {
        let summary = "Loan prescreening summary\n  Status:          Approved".to_string();
        let screening = Screening {
            state: SessionState {
                final_decision: Some(Decision {
                    status: Status::Approved,
                    summary: summary.clone(),
                }),
                ..SessionState::default()
            },
            phase: Phase::Done,
            messages: vec![
                StageMessage {
                    stage: "dti_calculator".to_string(),
                    message: "DTI ratio calculated as 20.00%.".to_string(),
                },
                StageMessage {
                    stage: "decision_maker".to_string(),
                    message: summary.clone(),
                },
            ],
            halted: None,
        };
        let report = render_report(&screening);
        assert!(report.contains("[dti_calculator] ✓ DTI ratio calculated as 20.00%."));
        assert_eq!(report.matches("Loan prescreening summary").count(), 1);
    }
}
