mod config;
mod inspect;
mod list;
mod scan;

pub use config::*;
pub use inspect::*;
pub use list::*;
pub use scan::*;
