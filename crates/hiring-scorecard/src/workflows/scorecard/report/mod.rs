mod insights;
mod summary;
pub mod views;

pub use summary::Scorecard;

pub(crate) use insights::generate_insights;
