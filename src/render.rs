//! Plain-text rendering of the capture view for the terminal client.

use std::fmt::Write as _;

use crate::capture::{CaptureState, Phase, ERROR_MESSAGE};
use crate::verdict::AnalysisVerdict;

/// Render the verdict block: indicator, explanation, restrictions and time
/// limit, each section present only when it has content.
pub fn render_verdict(verdict: &AnalysisVerdict) -> String {
    let mut out = String::new();
    if verdict.can_park {
        out.push_str("✓ Parking Allowed\n");
    } else {
        out.push_str("✗ No Parking\n");
    }

    let _ = writeln!(out, "\n{}", verdict.explanation);

    if !verdict.restrictions.is_empty() {
        out.push_str("\nRestrictions:\n");
        for restriction in &verdict.restrictions {
            let _ = writeln!(out, "  • {restriction}");
        }
    }

    if let Some(minutes) = verdict.time_limit {
        let _ = writeln!(out, "\nTime limit: {minutes} minutes");
    }

    out
}

/// Render whatever the current phase calls for.
pub fn render_state(state: &CaptureState) -> String {
    match state.phase() {
        Phase::Idle => "No images selected.\n".to_string(),
        Phase::ImagesSelected => format!("{} image(s) ready to analyze.\n", state.images().len()),
        Phase::Analyzing => "Analyzing...\n".to_string(),
        Phase::ResultShown(verdict) => render_verdict(verdict),
        Phase::ErrorShown => format!("{ERROR_MESSAGE}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Action, CapturedImage};

    fn verdict(can_park: bool, restrictions: &[&str], time_limit: Option<u32>) -> AnalysisVerdict {
        AnalysisVerdict {
            can_park,
            explanation: "2 hour parking 8am-6pm, it is 10am on a Tuesday.".into(),
            restrictions: restrictions.iter().map(|r| r.to_string()).collect(),
            time_limit,
        }
    }

    #[test]
    fn allowed_verdict_renders_every_section() {
        let text = render_verdict(&verdict(true, &["Pay at meter", "No trucks"], Some(120)));

        assert!(text.starts_with("✓ Parking Allowed"));
        assert!(text.contains("\n2 hour parking 8am-6pm, it is 10am on a Tuesday.\n"));
        let pay = text.find("  • Pay at meter").unwrap();
        let trucks = text.find("  • No trucks").unwrap();
        assert!(pay < trucks);
        assert_eq!(text.matches("Pay at meter").count(), 1);
        assert!(text.ends_with("Time limit: 120 minutes\n"));
    }

    #[test]
    fn disallowed_verdict_omits_empty_sections() {
        let text = render_verdict(&verdict(false, &[], None));

        assert!(text.starts_with("✗ No Parking"));
        assert!(!text.contains("Restrictions:"));
        assert!(!text.contains("Time limit"));
    }

    #[test]
    fn zero_minute_limit_is_still_shown() {
        let text = render_verdict(&verdict(false, &[], Some(0)));
        assert!(text.contains("Time limit: 0 minutes"));
    }

    #[test]
    fn state_rendering_follows_phase() {
        let mut state = CaptureState::new();
        assert_eq!(render_state(&state), "No images selected.\n");

        state.apply(Action::ImageAdded(CapturedImage::from_bytes("image/png", b"a")));
        assert_eq!(render_state(&state), "1 image(s) ready to analyze.\n");

        state.apply(Action::AnalysisStarted);
        assert_eq!(render_state(&state), "Analyzing...\n");

        state.apply(Action::AnalysisFailed);
        assert_eq!(render_state(&state), format!("{ERROR_MESSAGE}\n"));
    }
}
