// src/engine/policy.rs

use std::collections::BTreeMap;

use crate::models::skill::Skill;

/// Skills whose percentage is strictly below `threshold`.
///
/// A skill missing from the map (or scored 0 for lack of answers) is weak by
/// definition: an unassessed fundamental is unproven, not excused. The
/// resulting list is the handoff to practice-session generation.
pub fn weak_skills(per_skill: &BTreeMap<Skill, i64>, threshold: i64) -> Vec<Skill> {
    Skill::ALL
        .into_iter()
        .filter(|skill| per_skill.get(skill).copied().unwrap_or(0) < threshold)
        .collect()
}

/// Whether the distinct-answer count has reached the expected total.
/// Attempts without an expected count only complete explicitly.
pub fn reached_expected_count(answer_count: usize, expected: Option<i32>) -> bool {
    match expected {
        Some(expected) if expected > 0 => answer_count >= expected as usize,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WEAK_SKILL_THRESHOLD;

    fn scores(pairs: &[(Skill, i64)]) -> BTreeMap<Skill, i64> {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn skills_strictly_below_threshold_are_weak() {
        let per_skill = scores(&[
            (Skill::Listening, 80),
            (Skill::Grasping, 60),
            (Skill::Retention, 50),
            (Skill::Application, 90),
        ]);
        assert_eq!(
            weak_skills(&per_skill, 70),
            vec![Skill::Grasping, Skill::Retention]
        );
    }

    #[test]
    fn exactly_at_threshold_is_not_weak() {
        let per_skill = scores(&[
            (Skill::Listening, 70),
            (Skill::Grasping, 70),
            (Skill::Retention, 70),
            (Skill::Application, 70),
        ]);
        assert!(weak_skills(&per_skill, WEAK_SKILL_THRESHOLD).is_empty());
    }

    #[test]
    fn missing_skills_are_weak() {
        let per_skill = scores(&[(Skill::Listening, 95)]);
        assert_eq!(
            weak_skills(&per_skill, 70),
            vec![Skill::Application, Skill::Grasping, Skill::Retention]
        );
    }

    #[test]
    fn expected_count_reached() {
        assert!(reached_expected_count(3, Some(3)));
        assert!(reached_expected_count(4, Some(3)));
        assert!(!reached_expected_count(2, Some(3)));
    }

    #[test]
    fn no_expected_count_never_auto_completes() {
        assert!(!reached_expected_count(50, None));
        assert!(!reached_expected_count(50, Some(0)));
    }
}
