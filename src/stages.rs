//! The eight ordered stage groups of the formatting pipeline.
//!
//! Each submodule contributes labeled pure transforms; [`all`] assembles
//! them into the single ordered list the runner executes. Order is part of
//! the contract: structural detection must run before header promotion,
//! list formatting before inline formatting, polish last.

pub mod grammar;
pub mod headers;
pub mod inline;
pub mod lists;
pub mod paragraphs;
pub mod polish;
pub mod semantic;
pub mod structure;

use crate::stage::Stage;

/// The full ordered stage list for one pipeline pass.
pub fn all() -> Vec<Stage> {
    let mut stages = Vec::new();
    stages.extend(structure::stages());
    stages.extend(paragraphs::stages());
    stages.extend(headers::stages());
    stages.extend(lists::stages());
    stages.extend(inline::stages());
    stages.extend(grammar::stages());
    stages.extend(semantic::stages());
    stages.extend(polish::stages());
    stages
}
