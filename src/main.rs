//! Novox - 小说转有声书 TTS 流水线
//!
//! 七个阶段通过工作目录中的产物文件交接，可单独重跑:
//! extract → analyze → attribute → build → synth → post → package

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use novox::application::pipeline::{
    run_analyze, run_attribute, run_build, run_extract, run_package, run_postprocess,
    run_synthesize, BuildOptions,
};
use novox::application::ports::{ArtifactStorePort, AudioCachePort, PostParams, TtsEnginePort};
use novox::config::{load_config, load_config_from_path, print_config, AppConfig};
use novox::domain::{CharCountEstimator, DurationEstimator, Lexicon, SpaceDelimitedEstimator};
use novox::infrastructure::adapters::tts::{FakeTtsClient, HttpTtsClient, HttpTtsClientConfig};
use novox::infrastructure::adapters::FfmpegPost;
use novox::infrastructure::persistence::{FsArtifactStore, SledAudioCache, SledCacheConfig};

/// 小说转有声书 TTS 流水线
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 配置文件路径（默认搜索 config.toml / config.local.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 切分章节
    Extract {
        /// 原始小说文本文件
        input: PathBuf,
    },
    /// 角色发现、分级与选角
    Analyze,
    /// 对话归属
    Attribute,
    /// 构建 TTS 片段与 Scene 清单
    Build,
    /// 批量合成音频
    Synth,
    /// 音频后处理与章节拼接
    Post,
    /// 发布打包
    Package {
        /// 项目名
        #[arg(short, long, default_value = "audiobook")]
        name: String,
        /// 发布版本号
        #[arg(long, default_value = "1.0")]
        release_version: String,
    },
    /// 依次运行全部阶段
    Run {
        /// 原始小说文本文件
        input: PathBuf,
        /// 项目名
        #[arg(short, long, default_value = "audiobook")]
        name: String,
        /// 发布版本号
        #[arg(long, default_value = "1.0")]
        release_version: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);
    print_config(&config);

    let store = Arc::new(FsArtifactStore::new(config.storage.workspace_dir.clone()));
    let lexicon = load_lexicon(&config)?;
    let estimator = build_estimator(&config);

    match cli.command {
        Commands::Extract { input } => {
            run_extract(store.as_ref(), &input).await?;
        }
        Commands::Analyze => {
            run_analyze(
                store.as_ref(),
                &lexicon,
                &config.casting.thresholds,
                &config.casting.pools,
            )
            .await?;
        }
        Commands::Attribute => {
            run_attribute(store.as_ref(), &lexicon, estimator.as_ref()).await?;
        }
        Commands::Build => {
            run_build(store.as_ref(), estimator.as_ref(), &build_options(&config)).await?;
        }
        Commands::Synth => {
            synth(&config, store.clone()).await?;
        }
        Commands::Post => {
            post(&config, store.as_ref()).await?;
        }
        Commands::Package {
            name,
            release_version,
        } => {
            run_package(store.as_ref(), &name, &release_version).await?;
        }
        Commands::Run {
            input,
            name,
            release_version,
        } => {
            run_extract(store.as_ref(), &input).await?;
            run_analyze(
                store.as_ref(),
                &lexicon,
                &config.casting.thresholds,
                &config.casting.pools,
            )
            .await?;
            run_attribute(store.as_ref(), &lexicon, estimator.as_ref()).await?;
            run_build(store.as_ref(), estimator.as_ref(), &build_options(&config)).await?;
            synth(&config, store.clone()).await?;
            post(&config, store.as_ref()).await?;
            run_package(store.as_ref(), &name, &release_version).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let log_filter = format!("{},novox={}", config.log.level, config.log.level);
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
    );
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_lexicon(config: &AppConfig) -> anyhow::Result<Lexicon> {
    match &config.lexicon.path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("读取词表 {} 失败: {}", path.display(), e))?;
            let lexicon = Lexicon::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("解析词表 {} 失败: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "已加载自定义词表");
            Ok(lexicon)
        }
        None => Ok(Lexicon::default()),
    }
}

fn build_estimator(config: &AppConfig) -> Box<dyn DurationEstimator> {
    // alphabetic 族按空白分词计数，此时 chars_per_second 解释为词/秒
    match config.segment.script_family.as_str() {
        "alphabetic" => Box::new(SpaceDelimitedEstimator::new(config.segment.chars_per_second)),
        _ => Box::new(CharCountEstimator::new(config.segment.chars_per_second)),
    }
}

fn build_options(config: &AppConfig) -> BuildOptions {
    BuildOptions {
        target_duration_secs: config.segment.target_duration_seconds,
        scene_word_cap: config.segment.scene_word_cap,
        emotion_intensity: config.segment.emotion_intensity.clone(),
    }
}

async fn synth(config: &AppConfig, store: Arc<FsArtifactStore>) -> anyhow::Result<()> {
    let engine: Arc<dyn TtsEnginePort> = if config.tts.fake {
        tracing::warn!("使用 FakeTtsClient，不会调用真实 TTS 服务");
        Arc::new(FakeTtsClient::with_defaults())
    } else {
        let tts_config = HttpTtsClientConfig {
            base_url: config.tts.url.clone(),
            timeout_secs: config.tts.timeout_secs,
            max_retries: config.tts.max_retries,
        };
        Arc::new(HttpTtsClient::new(tts_config)?)
    };

    let cache_config = SledCacheConfig {
        db_path: config.storage.cache_path.clone(),
        max_size_bytes: config.storage.cache_max_bytes,
    };
    let cache: Arc<dyn AudioCachePort> = SledAudioCache::new(&cache_config)?.arc();

    let store: Arc<dyn ArtifactStorePort> = store;
    run_synthesize(store, engine, cache, config.synth.max_concurrent).await?;
    Ok(())
}

async fn post(config: &AppConfig, store: &dyn ArtifactStorePort) -> anyhow::Result<()> {
    let ffmpeg = FfmpegPost::new(config.post.ffmpeg_path.clone());
    let params = PostParams {
        silence_start_ms: config.post.silence_start_ms,
        silence_end_ms: config.post.silence_end_ms,
        target_lufs: config.post.target_lufs,
        true_peak_dbtp: config.post.true_peak_dbtp,
        bitrate: config.post.bitrate.clone(),
    };
    run_postprocess(store, &ffmpeg, &params).await?;
    Ok(())
}
