pub mod categorize;
pub mod combine;
pub mod resolve;
pub mod run;
