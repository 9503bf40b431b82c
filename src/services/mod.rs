pub mod analyzer;
pub mod candidates;
pub mod providers;
pub mod recommender;

pub use candidates::CandidateSearch;
pub use recommender::RecommendationService;
