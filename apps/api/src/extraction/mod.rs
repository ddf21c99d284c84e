// Resume-extraction boundary: turns the structured payload produced by an
// upstream extractor into clean, categorized terms the matching engine accepts.

pub mod flatten;
pub mod handlers;
pub mod pipeline;
