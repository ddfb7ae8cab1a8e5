use beadring_core::{
    ActionOutcome, CatalogLookup, CompositionSummary, DesignerAction, DesignerRules,
    DesignerSession, FixedViewport, GestureOutcome, ManualScheduler, ViewportSize,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One line of a replay script: either a designer action or a pause that
/// lets pending long-press timers fire.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    Wait { wait_ms: u64 },
    Action(DesignerAction),
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub outcome: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub summary: CompositionSummary,
}

pub fn parse_script(raw: &str) -> Result<Vec<ReplayStep>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Drives a session through `steps` against a virtual clock.
pub fn run<C: CatalogLookup>(
    catalog: C,
    rules: DesignerRules,
    viewport: ViewportSize,
    steps: &[ReplayStep],
) -> ReplayReport {
    let scheduler = ManualScheduler::new();
    let mut session = DesignerSession::new(
        catalog,
        rules,
        scheduler.clone(),
        &FixedViewport(viewport),
    );
    let mut reports = Vec::with_capacity(steps.len());
    for (step, entry) in steps.iter().enumerate() {
        match entry {
            ReplayStep::Wait { wait_ms } => {
                for ticket in scheduler.advance(*wait_ms) {
                    let outcome = session.long_press(ticket);
                    if outcome != GestureOutcome::Ignored {
                        reports.push(StepReport {
                            step,
                            outcome: describe_gesture(&outcome),
                        });
                    }
                }
                debug!(step, now_ms = scheduler.now_ms(), "clock advanced");
            }
            ReplayStep::Action(action) => {
                let outcome = session.apply_action(action.clone());
                let outcome = describe_action(&outcome);
                info!(step, %outcome, "replayed");
                reports.push(StepReport { step, outcome });
            }
        }
    }
    session.teardown();
    ReplayReport {
        steps: reports,
        summary: session.summary(),
    }
}

fn describe_action(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Appended(Ok(status)) => format!("appended ({})", status.message()),
        ActionOutcome::Appended(Err(err)) => format!("declined: {err}"),
        ActionOutcome::Gesture(gesture) => describe_gesture(gesture),
        ActionOutcome::Removed(Some(bead)) => format!("removed {}", bead.name),
        ActionOutcome::Removed(None) => "nothing selected".to_string(),
        ActionOutcome::Updated => "updated".to_string(),
    }
}

fn describe_gesture(outcome: &GestureOutcome) -> String {
    match outcome {
        GestureOutcome::Selected { index } => format!("selected {index}"),
        GestureOutcome::DragStarted { index } => format!("drag started {index}"),
        GestureOutcome::DragMoved {
            index,
            swap_target,
            over_delete_zone,
            ..
        } => match (swap_target, over_delete_zone) {
            (_, true) => format!("drag {index} over delete zone"),
            (Some(target), false) => format!("drag {index} targets {target}"),
            (None, false) => format!("drag {index}"),
        },
        GestureOutcome::Swap { from, to } => format!("swapped {from} and {to}"),
        GestureOutcome::Delete { index } => format!("deleted {index}"),
        GestureOutcome::Cancelled { index } => format!("cancelled {index}"),
        GestureOutcome::SelectionCleared => "selection cleared".to_string(),
        GestureOutcome::Ignored => "ignored".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use beadring_core::BuiltinCatalog;

    use super::*;

    #[test]
    fn script_mixes_waits_and_actions() {
        let steps = parse_script(
            r#"[
                {"action": "append", "catalog_id": "rose-quartz-8"},
                {"wait_ms": 300},
                {"action": "stage_tap"}
            ]"#,
        )
        .expect("script");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1], ReplayStep::Wait { wait_ms: 300 });
        assert!(matches!(steps[2], ReplayStep::Action(DesignerAction::StageTap)));
    }

    #[test]
    fn long_press_fires_during_wait() {
        let viewport = ViewportSize::new(390.0, 844.0);
        let mut steps = vec![
            ReplayStep::Action(DesignerAction::Append {
                catalog_id: "rose-quartz-8".to_string(),
            }),
            ReplayStep::Action(DesignerAction::Append {
                catalog_id: "amethyst-10".to_string(),
            }),
        ];
        steps.push(ReplayStep::Action(DesignerAction::GestureStart {
            index: 0,
            x: 0.0,
            y: 0.0,
        }));
        steps.push(ReplayStep::Wait { wait_ms: 400 });
        steps.push(ReplayStep::Action(DesignerAction::GestureMove { x: 0.0, y: 830.0 }));
        steps.push(ReplayStep::Action(DesignerAction::GestureEnd));

        let report = run(BuiltinCatalog, DesignerRules::default(), viewport, &steps);
        let outcomes: Vec<_> = report.steps.iter().map(|step| step.outcome.as_str()).collect();
        assert!(outcomes.contains(&"drag started 0"));
        assert!(outcomes.contains(&"deleted 0"));
        assert_eq!(report.summary.beads.len(), 1);
        assert_eq!(report.summary.beads[0].catalog_id, "amethyst-10");
    }

    #[test]
    fn unknown_bead_is_reported_not_fatal() {
        let steps = vec![ReplayStep::Action(DesignerAction::Append {
            catalog_id: "unobtainium".to_string(),
        })];
        let report = run(
            BuiltinCatalog,
            DesignerRules::default(),
            ViewportSize::new(390.0, 844.0),
            &steps,
        );
        assert_eq!(report.steps[0].outcome, "declined: unknown bead 'unobtainium'");
        assert!(report.summary.beads.is_empty());
    }
}
