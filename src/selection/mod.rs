pub mod controller;
pub mod state;

pub use controller::{BranchState, CharitySelectionController, Phase, SelectionWarning};
pub use state::{filter_catalog, SelectionState};
