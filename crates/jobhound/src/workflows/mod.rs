pub mod applications;
pub mod lever;
pub mod listings;
pub mod pacing;
pub mod search;
