// Handler modules
pub mod list;
pub mod render;
pub mod utils;
pub mod validate;

// Re-export all handler functions
pub use list::handle_list;
pub use render::handle_render;
pub use validate::handle_validate;
