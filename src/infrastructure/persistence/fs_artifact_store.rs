//! FS Artifact Store - 基于本地文件系统的产物存储
//!
//! 工作目录按阶段编号布局:
//!
//! ```text
//! workspace/
//!   01_extracted/chapters.json
//!   02_analyzed/voice_mapping.json
//!   03_attributed/ch_001.json ...
//!   04_segments/{tts_segments,segment_manifest,scenes}.json
//!   05_audio/{raw,post,chapters}/ + processing_log.json
//!   release/{meta.json, README.md, *.mp3}
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::ports::artifact_store::{
    ArtifactError, ArtifactStorePort, AttributedChapterFile, ChaptersFile, ProcessingLogFile,
    ScenesFile, SegmentManifestFile, TtsSegmentsFile, VoiceMappingFile,
};

/// 文件系统产物存储
pub struct FsArtifactStore {
    base_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn stage_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ArtifactError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArtifactError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ArtifactError::Json(e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Artifact written");
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ArtifactError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(ArtifactError::Io(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_str(&content)
            .map_err(|e| ArtifactError::Json(format!("{}: {}", path.display(), e)))
    }

    fn chapters_path(&self) -> PathBuf {
        self.stage_dir("01_extracted").join("chapters.json")
    }

    fn voice_mapping_path(&self) -> PathBuf {
        self.stage_dir("02_analyzed").join("voice_mapping.json")
    }

    fn attributed_dir(&self) -> PathBuf {
        self.stage_dir("03_attributed")
    }

    fn segments_dir(&self) -> PathBuf {
        self.stage_dir("04_segments")
    }

    fn audio_dir(&self) -> PathBuf {
        self.stage_dir("05_audio")
    }
}

#[async_trait]
impl ArtifactStorePort for FsArtifactStore {
    async fn save_chapters(&self, file: &ChaptersFile) -> Result<(), ArtifactError> {
        self.write_json(&self.chapters_path(), file).await
    }

    async fn load_chapters(&self) -> Result<ChaptersFile, ArtifactError> {
        self.read_json(&self.chapters_path()).await
    }

    async fn save_voice_mapping(&self, file: &VoiceMappingFile) -> Result<(), ArtifactError> {
        self.write_json(&self.voice_mapping_path(), file).await
    }

    async fn load_voice_mapping(&self) -> Result<VoiceMappingFile, ArtifactError> {
        self.read_json(&self.voice_mapping_path()).await
    }

    async fn save_attributed_chapter(
        &self,
        file: &AttributedChapterFile,
    ) -> Result<(), ArtifactError> {
        let path = self
            .attributed_dir()
            .join(format!("{}.json", file.chapter.chapter_id.as_str()));
        self.write_json(&path, file).await
    }

    async fn load_attributed_chapters(&self) -> Result<Vec<AttributedChapterFile>, ArtifactError> {
        let dir = self.attributed_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound(dir.display().to_string()));
            }
            Err(e) => return Err(ArtifactError::Io(format!("{}: {}", dir.display(), e))),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // 章节标识零填充，字典序即章节序
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.read_json(&path).await?);
        }
        Ok(files)
    }

    async fn save_tts_segments(&self, file: &TtsSegmentsFile) -> Result<(), ArtifactError> {
        self.write_json(&self.segments_dir().join("tts_segments.json"), file)
            .await
    }

    async fn load_tts_segments(&self) -> Result<TtsSegmentsFile, ArtifactError> {
        self.read_json(&self.segments_dir().join("tts_segments.json"))
            .await
    }

    async fn save_manifest(&self, file: &SegmentManifestFile) -> Result<(), ArtifactError> {
        self.write_json(&self.segments_dir().join("segment_manifest.json"), file)
            .await
    }

    async fn load_manifest(&self) -> Result<SegmentManifestFile, ArtifactError> {
        self.read_json(&self.segments_dir().join("segment_manifest.json"))
            .await
    }

    async fn save_scenes(&self, file: &ScenesFile) -> Result<(), ArtifactError> {
        self.write_json(&self.segments_dir().join("scenes.json"), file)
            .await
    }

    async fn save_processing_log(&self, file: &ProcessingLogFile) -> Result<(), ArtifactError> {
        self.write_json(&self.audio_dir().join("processing_log.json"), file)
            .await
    }

    async fn load_processing_log(&self) -> Result<ProcessingLogFile, ArtifactError> {
        self.read_json(&self.audio_dir().join("processing_log.json"))
            .await
    }

    async fn save_raw_audio(
        &self,
        segment_id: &str,
        data: &[u8],
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.raw_audio_path(segment_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArtifactError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    fn raw_audio_path(&self, segment_id: &str) -> PathBuf {
        self.audio_dir().join("raw").join(format!("{}.wav", segment_id))
    }

    fn post_audio_path(&self, segment_id: &str) -> PathBuf {
        self.audio_dir().join("post").join(format!("{}.mp3", segment_id))
    }

    fn chapter_audio_path(&self, chapter_id: &str) -> PathBuf {
        self.audio_dir()
            .join("chapters")
            .join(format!("{}.mp3", chapter_id))
    }

    fn release_dir(&self) -> PathBuf {
        self.base_dir.join("release")
    }

    async fn save_release_meta(
        &self,
        meta: &crate::application::ports::artifact_store::ReleaseMeta,
    ) -> Result<(), ArtifactError> {
        self.write_json(&self.release_dir().join("meta.json"), meta)
            .await
    }

    async fn save_release_readme(&self, content: &str) -> Result<(), ArtifactError> {
        let dir = self.release_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", dir.display(), e)))?;
        let path = dir.join("README.md");
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))
    }

    async fn publish_chapter_audio(&self, chapter_id: &str) -> Result<u64, ArtifactError> {
        let source = self.chapter_audio_path(chapter_id);
        let dir = self.release_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", dir.display(), e)))?;
        let target = dir.join(format!("{}.mp3", chapter_id));
        match tokio::fs::copy(&source, &target).await {
            Ok(size) => Ok(size),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound(source.display().to_string()))
            }
            Err(e) => Err(ArtifactError::Io(format!("{}: {}", source.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    use crate::domain::attribution::{AttributedChapter, AttributionReport, Span};
    use crate::domain::novel::Chapter;

    fn store(dir: &Path) -> FsArtifactStore {
        FsArtifactStore::new(dir)
    }

    #[tokio::test]
    async fn test_chapters_roundtrip() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let chapter = Chapter::new(1, "第一章 陨落的天才", "萧炎站在山巅。").unwrap();
        let file = ChaptersFile {
            creation_date: Utc::now(),
            source_file: "novel.txt".to_string(),
            total_chapters: 1,
            total_word_count: chapter.word_count() as i64,
            chapters: vec![chapter],
        };
        store.save_chapters(&file).await.unwrap();

        let loaded = store.load_chapters().await.unwrap();
        assert_eq!(loaded.total_chapters, 1);
        assert_eq!(loaded.chapters[0].title(), "第一章 陨落的天才");
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let err = store.load_voice_mapping().await.unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_attributed_chapters_sorted_by_id() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        for number in [3usize, 1, 2] {
            let chapter = Chapter::new(number, format!("第{}章", number), "正文。").unwrap();
            store
                .save_attributed_chapter(&AttributedChapterFile {
                    creation_date: Utc::now(),
                    report: AttributionReport::default(),
                    chapter: AttributedChapter {
                        chapter_id: chapter.id().clone(),
                        spans: vec![Span::narration("正文。", 3)],
                    },
                })
                .await
                .unwrap();
        }

        let loaded = store.load_attributed_chapters().await.unwrap();
        let ids: Vec<_> = loaded
            .iter()
            .map(|f| f.chapter.chapter_id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["ch_001", "ch_002", "ch_003"]);
    }

    #[tokio::test]
    async fn test_raw_audio_written_to_expected_path() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let path = store.save_raw_audio("seg_00001", &[1, 2, 3]).await.unwrap();
        assert_eq!(path, store.raw_audio_path("seg_00001"));
        assert!(path.ends_with("05_audio/raw/seg_00001.wav"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);
    }
}
