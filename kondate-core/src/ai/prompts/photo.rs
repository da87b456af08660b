//! Image prompt for a freshly saved recipe.

/// Render the food photo prompt for the image generation API.
pub fn render_photo_prompt(title: &str, category: &str) -> String {
    format!(
        "Professional overhead food photograph of \"{title}\", a home-cooked {category} dish \
         plated on everyday Japanese tableware. Natural window light, shallow depth of field, \
         appetizing and realistic, no text, no people."
    )
}
