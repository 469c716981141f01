pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod proxy;
pub mod scene;
pub mod selection;
pub mod standin;
pub mod testing;
pub mod traits;

pub use config::Convention;
pub use convert::convert_to_native;
pub use error::{SceneError, SceneResult};
pub use layout::{parse_standin_path, InvalidPath, StandinPath};
pub use proxy::HostProxy;
pub use scene::JsonScene;
pub use selection::{Selection, StandinRow};
pub use standin::{SkipReason, Standin, SwitchOutcome, VersionEntry};
pub use traits::{ProxyHandle, SceneHost};
