pub mod document;
pub mod lifecycle;
pub mod model;
pub mod transform;
