//! Remote voice-synthesis backends: ElevenLabs (JSON), Google Cloud
//! Text-to-Speech (JSON, base64 audio) and Azure (SSML).

use crate::config::{SynthesisConfig, VoiceService};
use crate::error::{Error, Result};
use crate::http::{self, ensure_success};
use crate::narration::VoiceStyle;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::escape;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";
pub const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";
pub const AZURE_OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";

pub trait VoiceBackend {
    fn name(&self) -> &'static str;

    /// MP3 bytes for one chunk of text.
    async fn synthesize(&self, text: &str, style: VoiceStyle) -> Result<Vec<u8>>;
}

async fn audio_bytes(backend: &str, response: reqwest::Response) -> Result<Vec<u8>> {
    let bytes = ensure_success(backend, response).await?.bytes().await?;
    if bytes.is_empty() {
        return Err(Error::MalformedResponse {
            backend: backend.to_string(),
            what: "audio bytes".to_string(),
        });
    }
    Ok(bytes.to_vec())
}

pub struct ElevenLabs {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VoiceBackend for ElevenLabs {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, style: VoiceStyle) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            style.elevenlabs_voice_id()
        );
        let body = json!({
            "text": text,
            "model_id": ELEVENLABS_MODEL,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
                "style": 0.5,
                "use_speaker_boost": true,
            },
        });
        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;
        audio_bytes(self.name(), response).await
    }
}

pub struct Google {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

impl VoiceBackend for Google {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(&self, text: &str, style: VoiceStyle) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text:synthesize", self.base_url.trim_end_matches('/'));
        let (voice_name, gender) = style.google_voice();
        let body = json!({
            "input": { "text": text },
            "voice": { "languageCode": "ko-KR", "name": voice_name, "ssmlGender": gender },
            "audioConfig": { "audioEncoding": "MP3", "speakingRate": 1.0, "pitch": 0.0 },
        });
        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let parsed: SynthesizeResponse = ensure_success(self.name(), response).await?.json().await?;
        let malformed = || Error::MalformedResponse {
            backend: self.name().to_string(),
            what: "audioContent".to_string(),
        };
        let encoded = parsed
            .audio_content
            .filter(|a| !a.is_empty())
            .ok_or_else(malformed)?;
        STANDARD.decode(encoded).map_err(|_| malformed())
    }
}

pub struct Azure {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Wrap `text` in a single-voice SSML document. The text is XML-escaped.
pub fn ssml(text: &str, voice_name: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='ko-KR'><voice xml:lang='ko-KR' name='{voice_name}'>{}</voice></speak>",
        escape(text)
    )
}

impl VoiceBackend for Azure {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn synthesize(&self, text: &str, style: VoiceStyle) -> Result<Vec<u8>> {
        let url = format!("{}/cognitiveservices/v1", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)
            .body(ssml(text, style.azure_voice_name()))
            .send()
            .await?;
        audio_bytes(self.name(), response).await
    }
}

pub enum RemoteVoice {
    ElevenLabs(ElevenLabs),
    Google(Google),
    Azure(Azure),
}

impl RemoteVoice {
    /// `None` for the offline service or a remote service without an API key.
    pub fn from_config(config: &SynthesisConfig) -> Result<Option<Self>> {
        if config.service == VoiceService::Offline {
            return Ok(None);
        }
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            warn!(service = ?config.service, "No synthesis API key; using offline stand-in");
            return Ok(None);
        };
        let client = http::client(config.timeout_secs)?;
        debug!(service = ?config.service, "Configured synthesis backend");

        Ok(match config.service {
            VoiceService::ElevenLabs => Some(RemoteVoice::ElevenLabs(ElevenLabs {
                client,
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| ELEVENLABS_BASE_URL.to_string()),
                api_key,
            })),
            VoiceService::Google => Some(RemoteVoice::Google(Google {
                client,
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| GOOGLE_TTS_BASE_URL.to_string()),
                api_key,
            })),
            VoiceService::Azure => Some(RemoteVoice::Azure(Azure {
                client,
                base_url: config.base_url.clone().unwrap_or_else(|| {
                    format!("https://{}.tts.speech.microsoft.com", config.region)
                }),
                api_key,
            })),
            VoiceService::Offline => None,
        })
    }
}

impl VoiceBackend for RemoteVoice {
    fn name(&self) -> &'static str {
        match self {
            RemoteVoice::ElevenLabs(b) => b.name(),
            RemoteVoice::Google(b) => b.name(),
            RemoteVoice::Azure(b) => b.name(),
        }
    }

    #[instrument(level = "debug", skip_all, fields(backend = self.name(), chars = text.chars().count()))]
    async fn synthesize(&self, text: &str, style: VoiceStyle) -> Result<Vec<u8>> {
        match self {
            RemoteVoice::ElevenLabs(b) => b.synthesize(text, style).await,
            RemoteVoice::Google(b) => b.synthesize(text, style).await,
            RemoteVoice::Azure(b) => b.synthesize(text, style).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubResponse, serve};

    fn config(service: VoiceService, base: &str) -> SynthesisConfig {
        SynthesisConfig {
            service,
            api_key: Some("voice-key".to_string()),
            base_url: Some(base.to_string()),
            ..SynthesisConfig::default()
        }
    }

    #[test]
    fn test_ssml_escapes_text() {
        let doc = ssml("A&B <태그> \"인용\"", "ko-KR-SunHiNeural");
        assert!(doc.contains("name='ko-KR-SunHiNeural'"));
        assert!(doc.contains("A&amp;B &lt;태그&gt; &quot;인용&quot;"));
        assert!(!doc.contains("<태그>"));
    }

    #[test]
    fn test_azure_default_endpoint_uses_region() {
        let config = SynthesisConfig {
            service: VoiceService::Azure,
            api_key: Some("k".to_string()),
            ..SynthesisConfig::default()
        };
        let Some(RemoteVoice::Azure(azure)) = RemoteVoice::from_config(&config).unwrap() else {
            panic!("expected azure backend");
        };
        assert_eq!(azure.base_url, "https://koreacentral.tts.speech.microsoft.com");
    }

    #[tokio::test]
    async fn test_elevenlabs_wire_format() {
        let (base, requests) = serve(|_| vec![StubResponse::new(200, b"ID3-audio".to_vec())]).await;
        let backend = RemoteVoice::from_config(&config(VoiceService::ElevenLabs, &base))
            .unwrap()
            .unwrap();
        let audio = backend.synthesize("안녕하세요", VoiceStyle::Friendly).await.unwrap();
        assert_eq!(audio, b"ID3-audio");

        let seen = requests.await.unwrap();
        assert!(
            seen[0]
                .request_line()
                .starts_with("POST /v1/text-to-speech/AZnzlk1XvdvUeBnXmlld")
        );
        assert_eq!(seen[0].header("xi-api-key").as_deref(), Some("voice-key"));
        let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
    }

    #[tokio::test]
    async fn test_google_wire_format_decodes_audio() {
        let (base, requests) = serve(|_| {
            vec![StubResponse::json(200, json!({ "audioContent": "SUQzLWdvb2dsZQ==" }))]
        })
        .await;
        let backend = RemoteVoice::from_config(&config(VoiceService::Google, &base))
            .unwrap()
            .unwrap();
        let audio = backend.synthesize("오늘의 뉴스", VoiceStyle::Energetic).await.unwrap();
        assert_eq!(audio, b"ID3-google");

        let seen = requests.await.unwrap();
        assert!(
            seen[0]
                .request_line()
                .starts_with("POST /v1/text:synthesize?key=voice-key")
        );
        let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(body["input"]["text"], "오늘의 뉴스");
        assert_eq!(body["voice"]["name"], "ko-KR-Standard-C");
        assert_eq!(body["voice"]["ssmlGender"], "MALE");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
    }

    #[tokio::test]
    async fn test_google_without_audio_is_malformed() {
        let (base, _requests) =
            serve(|_| vec![StubResponse::json(200, json!({ "audioContent": "%%%" }))]).await;
        let backend = RemoteVoice::from_config(&config(VoiceService::Google, &base))
            .unwrap()
            .unwrap();
        let err = backend.synthesize("텍스트", VoiceStyle::Professional).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_azure_wire_format() {
        let (base, requests) = serve(|_| vec![StubResponse::new(200, b"mp3".to_vec())]).await;
        let backend = RemoteVoice::from_config(&config(VoiceService::Azure, &base))
            .unwrap()
            .unwrap();
        backend.synthesize("뉴스 & 날씨", VoiceStyle::Energetic).await.unwrap();

        let seen = requests.await.unwrap();
        assert!(seen[0].request_line().starts_with("POST /cognitiveservices/v1"));
        assert_eq!(
            seen[0].header("x-microsoft-outputformat").as_deref(),
            Some(AZURE_OUTPUT_FORMAT)
        );
        let body = String::from_utf8(seen[0].body.clone()).unwrap();
        assert!(body.contains("ko-KR-BongJinNeural"));
        assert!(body.contains("뉴스 &amp; 날씨"));
    }

    #[tokio::test]
    async fn test_empty_audio_is_malformed() {
        let (base, _requests) = serve(|_| vec![StubResponse::new(200, "")]).await;
        let backend = RemoteVoice::from_config(&config(VoiceService::ElevenLabs, &base))
            .unwrap()
            .unwrap();
        let err = backend.synthesize("텍스트", VoiceStyle::Professional).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}
