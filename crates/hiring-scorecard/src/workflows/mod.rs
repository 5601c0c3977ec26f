pub mod ats;
pub mod scorecard;
