pub mod recommender;
pub mod treatment;

pub use treatment::TreatmentService;
