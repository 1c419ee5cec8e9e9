//! Infrastructure Adapters - 外部服务适配器

pub mod ffmpeg_post;
pub mod tts;

pub use ffmpeg_post::FfmpegPost;
