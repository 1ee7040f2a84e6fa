//! Candidate search and match scoring.
//!
//! The engine is a bounded relational read plus in-memory scoring: the read
//! port fetches candidate-skill rows for the required skill set, and
//! `rank_candidates` filters, enforces ALL-skills matching, scores and
//! ranks. It never touches the event pipeline and tolerates eventually
//! stale reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::shared_kernel::{ExperienceLevel, Proficiency, ProfileId, Result, SkillId};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// One candidate-skill row as returned by the read side: the skill entry
/// plus the owning profile's experience label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkillRecord {
    pub profile_id: ProfileId,
    pub skill_id: SkillId,
    pub proficiency: Proficiency,
    pub years_experience: u32,
    pub experience_level: ExperienceLevel,
    pub note: Option<String>,
}

/// Search criteria. All fields are independent AND-conditions; an empty
/// required-skill set yields no results by design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    pub skill_ids: Vec<SkillId>,
    pub min_proficiency: Option<Proficiency>,
    pub min_years: Option<u32>,
    pub experience_level: Option<ExperienceLevel>,
}

/// A candidate that satisfied the filter, with the matching skill rows and
/// the computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub profile_id: ProfileId,
    pub experience_level: ExperienceLevel,
    pub matched_skills: Vec<CandidateSkillRecord>,
    /// Sum of years of experience across the matched required skills.
    pub score: u32,
}

/// A page of ranked results plus pagination bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn empty(page: usize, limit: usize) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page,
            limit,
            total_pages: 0,
        }
    }
}

/// Rank the candidates that possess every required skill, highest score
/// first.
///
/// Record order is preserved for grouping and tie-breaking, so equal scores
/// keep the underlying storage order.
pub fn rank_candidates(
    records: Vec<CandidateSkillRecord>,
    filter: &SearchFilter,
) -> Vec<MatchResult> {
    let required: HashSet<SkillId> = filter.skill_ids.iter().copied().collect();
    if required.is_empty() {
        return Vec::new();
    }

    // Per-record constraints: skill membership, proficiency and years
    // minimums (both inclusive).
    let eligible = records.into_iter().filter(|r| {
        required.contains(&r.skill_id)
            && filter.min_proficiency.is_none_or(|min| r.proficiency >= min)
            && filter.min_years.is_none_or(|min| r.years_experience >= min)
    });

    // Group by profile, keeping first-seen order.
    let mut order: Vec<ProfileId> = Vec::new();
    let mut by_profile: HashMap<ProfileId, Vec<CandidateSkillRecord>> = HashMap::new();
    for record in eligible {
        by_profile
            .entry(record.profile_id)
            .or_insert_with(|| {
                order.push(record.profile_id);
                Vec::new()
            })
            .push(record);
    }

    let mut results: Vec<MatchResult> = order
        .into_iter()
        .filter_map(|profile_id| {
            let matched = by_profile.remove(&profile_id)?;

            // ALL required skills, not any: the distinct matched-skill
            // count must equal the required-set size.
            let distinct: HashSet<SkillId> = matched.iter().map(|r| r.skill_id).collect();
            if distinct.len() != required.len() {
                return None;
            }

            let experience_level = matched[0].experience_level;
            if let Some(wanted) = filter.experience_level {
                if experience_level != wanted {
                    return None;
                }
            }

            let score = matched.iter().map(|r| r.years_experience).sum();
            Some(MatchResult {
                profile_id,
                experience_level,
                matched_skills: matched,
                score,
            })
        })
        .collect();

    // Stable sort: ties keep storage order.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Slice `items` into the requested page. `total_pages` is
/// `ceil(total / limit)`; a page past the end yields an empty `data`.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(limit);

    let data = items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Page {
        data,
        total,
        page,
        limit,
        total_pages,
    }
}

/// Read port feeding the engine: candidate-skill rows for active profiles
/// holding any of the given skills.
#[async_trait]
pub trait CandidateSkillReads: Send + Sync {
    async fn fetch_by_skill_ids(
        &self,
        skill_ids: &[SkillId],
    ) -> Result<Vec<CandidateSkillRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        profile_id: ProfileId,
        skill_id: SkillId,
        proficiency: Proficiency,
        years: u32,
        level: ExperienceLevel,
    ) -> CandidateSkillRecord {
        CandidateSkillRecord {
            profile_id,
            skill_id,
            proficiency,
            years_experience: years,
            experience_level: level,
            note: None,
        }
    }

    fn filter(skill_ids: Vec<SkillId>) -> SearchFilter {
        SearchFilter {
            skill_ids,
            ..Default::default()
        }
    }

    #[test]
    fn requires_every_skill_not_any() {
        let (x, y) = (SkillId::new(), SkillId::new());
        let (a, b) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(a, x, Proficiency::Advanced, 5, ExperienceLevel::Senior),
            record(a, y, Proficiency::Advanced, 3, ExperienceLevel::Senior),
            record(b, x, Proficiency::Expert, 9, ExperienceLevel::Senior),
        ];

        let results = rank_candidates(records, &filter(vec![x, y]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile_id, a);
    }

    #[test]
    fn score_is_the_sum_of_years_and_ranks_descending() {
        let (x, y) = (SkillId::new(), SkillId::new());
        let (a, b) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(b, x, Proficiency::Advanced, 2, ExperienceLevel::Mid),
            record(b, y, Proficiency::Advanced, 2, ExperienceLevel::Mid),
            record(a, x, Proficiency::Advanced, 5, ExperienceLevel::Senior),
            record(a, y, Proficiency::Advanced, 3, ExperienceLevel::Senior),
        ];

        let results = rank_candidates(records, &filter(vec![x, y]));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].profile_id, a);
        assert_eq!(results[0].score, 8);
        assert_eq!(results[1].profile_id, b);
        assert_eq!(results[1].score, 4);
    }

    #[test]
    fn empty_required_set_returns_nothing() {
        let a = ProfileId::new();
        let records = vec![record(
            a,
            SkillId::new(),
            Proficiency::Expert,
            10,
            ExperienceLevel::Lead,
        )];

        let results = rank_candidates(records, &filter(vec![]));
        assert!(results.is_empty());
    }

    #[test]
    fn minimum_proficiency_bound_is_inclusive() {
        let x = SkillId::new();
        let (at_minimum, below) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(at_minimum, x, Proficiency::Intermediate, 3, ExperienceLevel::Mid),
            record(below, x, Proficiency::Beginner, 3, ExperienceLevel::Mid),
        ];

        let results = rank_candidates(
            records,
            &SearchFilter {
                skill_ids: vec![x],
                min_proficiency: Some(Proficiency::Intermediate),
                ..Default::default()
            },
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile_id, at_minimum);
    }

    #[test]
    fn minimum_years_bound_is_inclusive() {
        let x = SkillId::new();
        let (enough, short) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(enough, x, Proficiency::Advanced, 4, ExperienceLevel::Senior),
            record(short, x, Proficiency::Advanced, 3, ExperienceLevel::Senior),
        ];

        let results = rank_candidates(
            records,
            &SearchFilter {
                skill_ids: vec![x],
                min_years: Some(4),
                ..Default::default()
            },
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile_id, enough);
    }

    #[test]
    fn experience_level_filter_is_an_exact_match() {
        let x = SkillId::new();
        let (senior, mid) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(senior, x, Proficiency::Advanced, 5, ExperienceLevel::Senior),
            record(mid, x, Proficiency::Advanced, 5, ExperienceLevel::Mid),
        ];

        let results = rank_candidates(
            records,
            &SearchFilter {
                skill_ids: vec![x],
                experience_level: Some(ExperienceLevel::Senior),
                ..Default::default()
            },
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].profile_id, senior);
    }

    #[test]
    fn per_record_filter_can_break_the_all_skills_requirement() {
        // A profile holding every required skill still drops out when one
        // of those skills misses the proficiency floor.
        let (x, y) = (SkillId::new(), SkillId::new());
        let a = ProfileId::new();
        let records = vec![
            record(a, x, Proficiency::Expert, 6, ExperienceLevel::Senior),
            record(a, y, Proficiency::Beginner, 6, ExperienceLevel::Senior),
        ];

        let results = rank_candidates(
            records,
            &SearchFilter {
                skill_ids: vec![x, y],
                min_proficiency: Some(Proficiency::Intermediate),
                ..Default::default()
            },
        );

        assert!(results.is_empty());
    }

    #[test]
    fn duplicate_required_ids_collapse() {
        let x = SkillId::new();
        let a = ProfileId::new();
        let records = vec![record(a, x, Proficiency::Advanced, 5, ExperienceLevel::Senior)];

        let results = rank_candidates(records, &filter(vec![x, x]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 5);
    }

    #[test]
    fn ties_keep_storage_order() {
        let x = SkillId::new();
        let (first, second) = (ProfileId::new(), ProfileId::new());
        let records = vec![
            record(first, x, Proficiency::Advanced, 5, ExperienceLevel::Senior),
            record(second, x, Proficiency::Expert, 5, ExperienceLevel::Senior),
        ];

        let results = rank_candidates(records, &filter(vec![x]));

        assert_eq!(results[0].profile_id, first);
        assert_eq!(results[1].profile_id, second);
    }

    #[test]
    fn pagination_total_pages_is_ceil() {
        let items: Vec<u32> = (0..45).collect();
        let page = paginate(items, 1, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 20);
    }

    #[test]
    fn concatenating_pages_reproduces_the_full_set() {
        let items: Vec<u32> = (0..45).collect();
        let mut seen = Vec::new();
        for page_no in 1..=3 {
            let page = paginate(items.clone(), page_no, 20);
            seen.extend(page.data);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn page_past_the_end_is_empty_with_correct_total() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(items, 4, 2);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn limit_is_clamped_to_the_maximum() {
        let items: Vec<u32> = (0..300).collect();
        let page = paginate(items, 1, 500);
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.data.len(), MAX_PAGE_SIZE);
    }
}
