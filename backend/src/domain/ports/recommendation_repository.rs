//! Driven port for the set-based lot ranking query.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{LotCandidate, RecommendationRequest};

define_port_error! {
    /// Errors raised while ranking lots.
    pub enum RecommendationRepositoryError {
        /// Connection to the backing store failed.
        Connection { message: String } =>
            "recommendation connection failed: {message}",
        /// Query failed during execution or decoding.
        Query { message: String } =>
            "recommendation query failed: {message}",
    }
}

/// Port running the distance, inventory and permit join.
///
/// Implementations return lots for the request's building within the walk
/// budget that have at least one inventory snapshot, restricted to the
/// requested permit, ordered by distance ascending then capacity descending,
/// and truncated to the request limit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Ranked candidates for `request`.
    async fn rank_lots(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<LotCandidate>, RecommendationRepositoryError>;
}

/// Fixture repository returning no candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRecommendationRepository;

#[async_trait]
impl RecommendationRepository for FixtureRecommendationRepository {
    async fn rank_lots(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Vec<LotCandidate>, RecommendationRepositoryError> {
        Ok(Vec::new())
    }
}
