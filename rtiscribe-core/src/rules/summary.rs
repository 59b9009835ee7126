//! Analysis summary templates, one per score band

const LISTED_ENTRIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Excellent,
            70..=89 => ScoreBand::Good,
            50..=69 => ScoreBand::NeedsWork,
            _ => ScoreBand::Poor,
        }
    }
}

fn first_entries(entries: &[String]) -> String {
    if entries.is_empty() {
        return "none".to_string();
    }
    entries
        .iter()
        .take(LISTED_ENTRIES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn analysis_summary(score: u8, points: &[String], issues: &[String]) -> String {
    let strengths = first_entries(points);
    let gaps = first_entries(issues);
    match ScoreBand::for_score(score) {
        ScoreBand::Excellent => format!(
            "Score {score}/100. The application is well formed and ready to file. Strengths: {strengths}."
        ),
        ScoreBand::Good => format!(
            "Score {score}/100. The application is mostly complete. Strengths: {strengths}. Address before filing: {gaps}."
        ),
        ScoreBand::NeedsWork => format!(
            "Score {score}/100. The application needs revision before filing. Missing: {gaps}. Present: {strengths}."
        ),
        ScoreBand::Poor => format!(
            "Score {score}/100. The application lacks essential elements and is likely to be rejected. Missing: {gaps}."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::for_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(89), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(50), ScoreBand::NeedsWork);
        assert_eq!(ScoreBand::for_score(49), ScoreBand::Poor);
    }

    #[test]
    fn lists_at_most_three_entries() {
        let issues: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let summary = analysis_summary(40, &[], &issues);
        assert!(summary.contains("Missing: a; b; c."));
        assert!(!summary.contains("; d"));
    }

    #[test]
    fn empty_lists_read_none() {
        let summary = analysis_summary(75, &[], &[]);
        assert!(summary.contains("Strengths: none."));
        assert!(summary.contains("Address before filing: none."));
    }
}
