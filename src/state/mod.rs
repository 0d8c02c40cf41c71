//! State module for tracking item progress
//!
//! # Components
//!
//! - `ItemStage`: the stage an item is in while it is processed
//! - `ItemOutcome`: how processing of an item ended

mod item_stage;
mod outcome;

pub use item_stage::ItemStage;
pub use outcome::{ArticleOutcome, ItemOutcome, ItemReport};
