pub mod session;
pub mod session_cache;
pub mod traits;

pub use session::*;
pub use session_cache::*;
pub use traits::*;
