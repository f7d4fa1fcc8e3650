pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{doctor_routes, review_routes};
pub use services::{DoctorService, ReviewService};
