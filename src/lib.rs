//! Loading, filtering and exporting the Tijuca National Park visitor
//! spreadsheets.
//!
//! The desktop dashboard (`tijuca-visitors`) and the batch tool
//! (`filter-sheet`) both drive a [`state::Session`].

pub mod data;
pub mod state;
