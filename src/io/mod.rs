pub mod cache;
pub mod layout_store;
pub mod ytdlp;

pub use cache::{AudioCache, CachedAudio, DownloadStage, Downloader, TrackMetadata};
pub use layout_store::LayoutStore;
pub use ytdlp::YtDlp;
