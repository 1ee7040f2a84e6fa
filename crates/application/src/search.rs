//! Skill-based candidate search.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use talentgrid_domain::search::{
    paginate, rank_candidates, CandidateSkillReads, Page, SearchFilter, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
use talentgrid_domain::shared_kernel::{ExperienceLevel, Proficiency, SkillId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidatesRequest {
    pub skill_ids: Vec<Uuid>,
    pub min_proficiency: Option<Proficiency>,
    pub min_years: Option<u32>,
    pub experience_level: Option<ExperienceLevel>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedSkillResponse {
    pub skill_id: String,
    pub proficiency: String,
    pub years_experience: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatchResponse {
    pub profile_id: String,
    pub experience_level: String,
    pub matched_skills: Vec<MatchedSkillResponse>,
    pub score: u32,
}

/// Find candidates holding every required skill, ranked by match score.
///
/// Read-only: runs outside the event pipeline and tolerates eventually
/// stale reads.
pub struct SearchCandidatesUseCase {
    skill_reads: Arc<dyn CandidateSkillReads>,
}

impl SearchCandidatesUseCase {
    pub fn new(skill_reads: Arc<dyn CandidateSkillReads>) -> Self {
        Self { skill_reads }
    }

    pub async fn execute(
        &self,
        request: SearchCandidatesRequest,
    ) -> anyhow::Result<Page<CandidateMatchResponse>> {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        // No required skills means no results, not an unfiltered listing.
        let mut seen = std::collections::HashSet::new();
        let skill_ids: Vec<SkillId> = request
            .skill_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(SkillId)
            .collect();
        if skill_ids.is_empty() {
            return Ok(Page::empty(page, limit));
        }

        let filter = SearchFilter {
            skill_ids,
            min_proficiency: request.min_proficiency,
            min_years: request.min_years,
            experience_level: request.experience_level,
        };

        let records = self.skill_reads.fetch_by_skill_ids(&filter.skill_ids).await?;
        let ranked = rank_candidates(records, &filter);

        tracing::debug!(
            required_skills = filter.skill_ids.len(),
            matches = ranked.len(),
            "Candidate search completed"
        );

        let responses: Vec<CandidateMatchResponse> = ranked
            .into_iter()
            .map(|m| CandidateMatchResponse {
                profile_id: m.profile_id.to_string(),
                experience_level: m.experience_level.to_string(),
                matched_skills: m
                    .matched_skills
                    .iter()
                    .map(|s| MatchedSkillResponse {
                        skill_id: s.skill_id.to_string(),
                        proficiency: s.proficiency.to_string(),
                        years_experience: s.years_experience,
                    })
                    .collect(),
                score: m.score,
            })
            .collect();

        Ok(paginate(responses, page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use talentgrid_domain::search::CandidateSkillRecord;
    use talentgrid_domain::shared_kernel::{ProfileId, Result};

    struct StubReads {
        records: Mutex<Vec<CandidateSkillRecord>>,
    }

    impl StubReads {
        fn new(records: Vec<CandidateSkillRecord>) -> Self {
            Self {
                records: Mutex::new(records),
            }
        }
    }

    #[async_trait]
    impl CandidateSkillReads for StubReads {
        async fn fetch_by_skill_ids(
            &self,
            skill_ids: &[SkillId],
        ) -> Result<Vec<CandidateSkillRecord>> {
            let wanted: Vec<SkillId> = skill_ids.to_vec();
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| wanted.contains(&r.skill_id))
                .cloned()
                .collect())
        }
    }

    fn record(
        profile_id: ProfileId,
        skill_id: SkillId,
        years: u32,
    ) -> CandidateSkillRecord {
        CandidateSkillRecord {
            profile_id,
            skill_id,
            proficiency: Proficiency::Advanced,
            years_experience: years,
            experience_level: ExperienceLevel::Senior,
            note: None,
        }
    }

    #[tokio::test]
    async fn empty_skill_list_returns_an_empty_page() {
        let reads = Arc::new(StubReads::new(vec![record(
            ProfileId::new(),
            SkillId::new(),
            5,
        )]));
        let use_case = SearchCandidatesUseCase::new(reads);

        let page = use_case
            .execute(SearchCandidatesRequest {
                skill_ids: vec![],
                min_proficiency: None,
                min_years: None,
                experience_level: None,
                page: None,
                limit: None,
            })
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn ranks_by_score_and_paginates() {
        let (x, y) = (SkillId::new(), SkillId::new());
        let (a, b) = (ProfileId::new(), ProfileId::new());
        let reads = Arc::new(StubReads::new(vec![
            record(b, x, 2),
            record(b, y, 2),
            record(a, x, 5),
            record(a, y, 3),
        ]));
        let use_case = SearchCandidatesUseCase::new(reads);

        let page = use_case
            .execute(SearchCandidatesRequest {
                skill_ids: vec![x.0, y.0],
                min_proficiency: None,
                min_years: None,
                experience_level: None,
                page: Some(1),
                limit: Some(1),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].profile_id, a.to_string());
        assert_eq!(page.data[0].score, 8);
    }

    #[tokio::test]
    async fn unmatched_filters_return_zero_total_not_an_error() {
        let x = SkillId::new();
        let reads = Arc::new(StubReads::new(vec![record(ProfileId::new(), x, 2)]));
        let use_case = SearchCandidatesUseCase::new(reads);

        let page = use_case
            .execute(SearchCandidatesRequest {
                skill_ids: vec![x.0],
                min_proficiency: None,
                min_years: Some(10),
                experience_level: None,
                page: None,
                limit: None,
            })
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
    }
}
