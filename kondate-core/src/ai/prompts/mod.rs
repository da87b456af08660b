//! AI prompt templates.

pub mod photo;
pub mod recipe;

pub use photo::render_photo_prompt;
pub use recipe::build_prompt;
