pub mod catalog;
pub mod similarity;

/// The kind of entity a provider lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Album,
    Track,
}
