mod models;
mod verses;

pub use models::*;
pub use verses::{paginate_verses, split_verses, VERSE_SEPARATOR};
