pub mod filter;
pub mod progress;
pub mod record;
pub mod user;

pub use filter::*;
pub use progress::*;
pub use record::*;
pub use user::*;
