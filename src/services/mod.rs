pub mod candidate_pipeline;
pub mod review_generator;
pub mod review_writer;
pub mod reviewed_store;

pub use candidate_pipeline::{CandidatePipeline, CandidatePool};
pub use review_generator::{GeneratedReview, ReviewGenerator, ReviewSource};
pub use review_writer::ReviewWriter;
pub use reviewed_store::ReviewedStore;
