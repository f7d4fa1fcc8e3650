pub mod doctor;
pub mod review;

pub use doctor::DoctorService;
pub use review::ReviewService;
