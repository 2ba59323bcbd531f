pub mod json_recovery;
pub mod inference;
pub mod detection;
pub mod feedback;
pub mod assistant;
