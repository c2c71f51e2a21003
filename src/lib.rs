//! Charity selection and scoring for the charitable gaming dashboard.
//!
//! Match statistics become charity points through [`analysis::ScoringEngine`];
//! the user's charity choice, the catalog search and the remote write of the
//! choice are kept consistent by [`selection::CharitySelectionController`].

pub mod analysis;
pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod selection;
pub mod session;
pub mod telemetry;
