mod download;
mod filename;

pub use download::download_episode;
pub use filename::{derive_filename, episode_filename};
