pub mod exclusions;
pub mod patterns;

pub use exclusions::{detect_project_type, get_default_exclusions, ProjectType};
pub use patterns::{accelerator_pattern, has_accelerator, placeholder_pattern, placeholders};
