pub(crate) mod classify;
pub(crate) mod extract;
pub(crate) mod geometry;
pub(crate) mod preprocess;
pub(crate) mod select;
