//! Package Stage - 发布打包阶段
//!
//! 汇总各阶段产物，复制章节音频到发布目录，
//! 生成 meta.json 与 README。

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{
    ArtifactStorePort, ReleaseAudio, ReleaseChapter, ReleaseMeta, ReleaseProject, ReleaseSource,
    ReleaseVoices,
};

/// 执行发布打包
pub async fn run_package(
    store: &dyn ArtifactStorePort,
    project_name: &str,
    version: &str,
) -> Result<ReleaseMeta, ApplicationError> {
    let chapters_file = store.load_chapters().await?;
    let mapping = store.load_voice_mapping().await?;
    let manifest = store.load_manifest().await?;
    let log = store.load_processing_log().await?;

    let mut release_chapters = Vec::new();
    for chapter_audio in &log.chapter_files {
        let size_bytes = store.publish_chapter_audio(&chapter_audio.chapter_id).await?;
        let title = chapters_file
            .chapters
            .iter()
            .find(|c| c.id().as_str() == chapter_audio.chapter_id)
            .map(|c| c.title().to_string())
            .unwrap_or_else(|| chapter_audio.chapter_id.clone());
        release_chapters.push(ReleaseChapter {
            chapter_id: chapter_audio.chapter_id.clone(),
            title,
            audio_file: format!("{}.mp3", chapter_audio.chapter_id),
            size_bytes,
        });
    }

    let meta = ReleaseMeta {
        project: ReleaseProject {
            name: project_name.to_string(),
            version: version.to_string(),
            generation_date: Utc::now(),
            pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        source: ReleaseSource {
            total_chapters: chapters_file.total_chapters,
            total_word_count: chapters_file.total_word_count,
        },
        audio: ReleaseAudio {
            total_duration_seconds: manifest.total_duration_seconds,
            total_duration_formatted: format_duration(manifest.total_duration_seconds),
            total_segments: manifest.total_segments,
            average_segment_duration: manifest.average_segment_duration,
        },
        voices: ReleaseVoices {
            narrator_voice: mapping.narrator_voice.clone(),
            cast_size: mapping.voice_assignments.len(),
            shared_voice_warnings: mapping.shared_voice_warnings.clone(),
        },
        chapters: release_chapters,
    };

    store.save_release_meta(&meta).await?;
    store.save_release_readme(&render_readme(&meta)).await?;

    tracing::info!(
        chapters = meta.chapters.len(),
        duration = %meta.audio.total_duration_formatted,
        dir = %store.release_dir().display(),
        "发布打包完成"
    );

    Ok(meta)
}

/// 格式化时长: "1h 23m 45s" / "23m 45s" / "45s"
pub fn format_duration(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn render_readme(meta: &ReleaseMeta) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", meta.project.name));
    out.push_str(&format!(
        "版本: {}  生成时间: {}\n\n",
        meta.project.version,
        meta.project.generation_date.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str("## 统计\n\n");
    out.push_str(&format!("- 章节数: {}\n", meta.source.total_chapters));
    out.push_str(&format!("- 总字数: {}\n", meta.source.total_word_count));
    out.push_str(&format!(
        "- 总时长: {}\n",
        meta.audio.total_duration_formatted
    ));
    out.push_str(&format!("- 片段数: {}\n", meta.audio.total_segments));
    out.push_str(&format!(
        "- 配音角色: {} + 旁白 ({})\n\n",
        meta.voices.cast_size, meta.voices.narrator_voice
    ));
    out.push_str("## 章节\n\n");
    for chapter in &meta.chapters {
        out.push_str(&format!(
            "- {} — `{}` ({:.1} MB)\n",
            chapter.title,
            chapter.audio_file,
            chapter.size_bytes as f64 / 1_048_576.0
        ));
    }
    if !meta.voices.shared_voice_warnings.is_empty() {
        out.push_str("\n## 告警\n\n");
        for warning in &meta.voices.shared_voice_warnings {
            out.push_str(&format!("- {}\n", warning));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(125.4), "2m 5s");
    }

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(45.0), "45s");
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(-3.0), "0s");
    }
}
