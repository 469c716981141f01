pub mod proxy;
pub mod scene;

pub use proxy::*;
pub use scene::*;
