pub mod error;
pub mod root;
pub mod song;
pub use error::ApiError;
pub use root::RootController;
pub use song::SongController;
