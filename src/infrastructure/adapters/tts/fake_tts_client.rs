//! Fake TTS Client - 用于测试与干跑的 TTS 客户端
//!
//! 不调用外部服务，按文本长度生成占位音频数据

use async_trait::async_trait;

use crate::application::ports::{InferRequest, InferResponse, TtsEnginePort, TtsError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个字符生成的占位字节数
    pub bytes_per_char: usize,
    /// 每个字符折算的时长（毫秒）
    pub ms_per_char: u64,
    /// 采样率
    pub sample_rate: u32,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            bytes_per_char: 64,
            ms_per_char: 400,
            sample_rate: 22050,
        }
    }
}

/// Fake TTS Client
///
/// 用于测试与 dry-run，返回确定性的占位音频
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError> {
        let chars = request.text.chars().count();
        tracing::debug!(
            segment = %request.segment_id,
            chars,
            voice = %request.voice,
            "FakeTtsClient: generating placeholder audio"
        );

        Ok(InferResponse {
            session_id: format!("fake-{}", uuid::Uuid::new_v4()),
            audio_data: vec![0u8; chars.max(1) * self.config.bytes_per_char],
            duration_ms: Some(chars as u64 * self.config.ms_per_char),
            sample_rate: Some(self.config.sample_rate),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_infer_is_deterministic() {
        let client = FakeTtsClient::with_defaults();
        let request = InferRequest {
            text: "萧炎点了点头。".to_string(),
            voice: "voice_a".to_string(),
            emotion: "neutral".to_string(),
            emotion_intensity: "low".to_string(),
            segment_id: "seg_00001".to_string(),
        };

        let a = client.infer(request.clone()).await.unwrap();
        let b = client.infer(request).await.unwrap();
        assert_eq!(a.audio_data.len(), b.audio_data.len());
        assert_eq!(a.duration_ms, Some(7 * 400));
    }
}
