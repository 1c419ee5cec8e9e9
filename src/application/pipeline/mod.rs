//! Pipeline - 流水线阶段编排
//!
//! 七个阶段通过产物文件交接，可独立重跑:
//! extract → analyze → attribute → build → synthesize → postprocess → package

mod analyze;
mod attribute;
mod build;
mod extract;
mod package;
mod postprocess;
mod synthesize;

pub use analyze::{run_analyze, AnalyzeOutcome};
pub use attribute::run_attribute;
pub use build::{run_build, BuildOptions};
pub use extract::{run_extract, ExtractOutcome};
pub use package::{format_duration, run_package};
pub use postprocess::run_postprocess;
pub use synthesize::{run_synthesize, SynthOutcome};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;
    use crate::application::ports::{ArtifactStorePort, AudioCachePort, TtsEnginePort};
    use crate::domain::character::{RoleThresholds, VoicePools};
    use crate::domain::{CharCountEstimator, Lexicon};
    use crate::infrastructure::adapters::tts::FakeTtsClient;
    use crate::infrastructure::persistence::{FsArtifactStore, SledAudioCache, SledCacheConfig};

    const NOVEL: &str = "\
第一章 陨落的天才
萧炎说道：“斗之力，三段。”
大厅中一片寂静。
萧炎喊道：“给我出来！”

第二章 离别
药老说道：“走吧。”
“嗯。”
";

    async fn run_front_stages(store: &FsArtifactStore, source: &std::path::Path) {
        let lexicon = Lexicon::default();
        let estimator = CharCountEstimator::default();

        run_extract(store, source).await.unwrap();
        run_analyze(
            store,
            &lexicon,
            &RoleThresholds::default(),
            &VoicePools::default(),
        )
        .await
        .unwrap();
        run_attribute(store, &lexicon, &estimator).await.unwrap();
        run_build(
            store,
            &estimator,
            &BuildOptions {
                target_duration_secs: 75.0,
                scene_word_cap: 600,
                emotion_intensity: "low".to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_front_stages_end_to_end() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("novel.txt");
        tokio::fs::write(&source, NOVEL).await.unwrap();
        let store = FsArtifactStore::new(dir.path().join("workspace"));

        run_front_stages(&store, &source).await;

        let mapping = store.load_voice_mapping().await.unwrap();
        assert!(mapping.character_names.values().any(|n| n == "萧炎"));
        assert!(mapping.character_names.values().any(|n| n == "药老"));

        let segments = store.load_tts_segments().await.unwrap();
        assert!(segments.total_segments > 0);
        // 编号从 seg_00001 起跨章单调递增
        for (index, record) in segments.segments.iter().enumerate() {
            assert_eq!(record.segment_id, format!("seg_{:05}", index + 1));
            assert!(!record.voice.is_empty());
            assert!(record.word_count > 0);
        }
        // 对话片段归属到角色，说话人与音色一一对应
        let dialogue: Vec<_> = segments
            .segments
            .iter()
            .filter(|r| r.speaker_id.starts_with("char_"))
            .collect();
        assert!(!dialogue.is_empty());
        for record in &dialogue {
            assert_eq!(
                Some(&record.voice),
                mapping.voice_assignments.get(&record.speaker_id)
            );
        }

        let manifest = store.load_manifest().await.unwrap();
        assert_eq!(manifest.chapters_processed, 2);
        assert_eq!(manifest.total_segments, segments.total_segments);
        // 延续规则: 裸引号"嗯。"归给上一个说话人 药老，无未解析标签
        assert_eq!(manifest.unresolved_attributions, 0);
    }

    #[tokio::test]
    async fn test_synthesize_with_fake_engine_and_cache() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("novel.txt");
        tokio::fs::write(&source, NOVEL).await.unwrap();
        let store = Arc::new(FsArtifactStore::new(dir.path().join("workspace")));

        run_front_stages(store.as_ref(), &source).await;

        let cache = SledAudioCache::new(&SledCacheConfig {
            db_path: dir.path().join("cache.sled").to_string_lossy().to_string(),
            max_size_bytes: 1024 * 1024,
        })
        .unwrap()
        .arc();
        let engine: Arc<dyn TtsEnginePort> = Arc::new(FakeTtsClient::with_defaults());

        let store_port: Arc<dyn ArtifactStorePort> = store.clone();
        let cache_port: Arc<dyn AudioCachePort> = cache.clone();
        let first = run_synthesize(store_port.clone(), engine.clone(), cache_port.clone(), 2)
            .await
            .unwrap();
        assert_eq!(first.failed, 0);
        assert!(first.synthesized > 0);

        let segments = store.load_tts_segments().await.unwrap();
        for record in &segments.segments {
            assert!(store.raw_audio_path(&record.segment_id).exists());
        }

        // 重跑全部命中缓存
        let second = run_synthesize(store_port, engine, cache_port, 2).await.unwrap();
        assert_eq!(second.failed, 0);
        assert_eq!(second.synthesized, 0);
        assert_eq!(second.cache_hits, segments.total_segments);
    }
}
