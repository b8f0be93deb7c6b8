use super::{prompts, AiGateway, CacheTier, GenerativeModel};
use anyhow::{ensure, Context, Result};
use base64::Engine;
use fridge::Language;
use tokio::process::Command;

/// The service speaks 16-bit mono PCM at this rate unless the mime type says otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Raw narration audio.
#[derive(Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
}

impl std::fmt::Debug for SpeechAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAudio")
            .field("pcm", &self.pcm.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl SpeechAudio {
    /// Wrap the samples in a WAV container.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for chunk in self.pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

/// Read `rate=<n>` out of a mime type like `audio/L16;codec=pcm;rate=24000`.
fn sample_rate_of(mime_type: &str) -> u32 {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

impl<M: GenerativeModel, C: CacheTier> AiGateway<M, C> {
    /// Narrate one instruction. `None` on any failure.
    pub async fn speak_step(&self, text: &str, language: Language) -> Option<SpeechAudio> {
        let request = prompts::speech_request(text, &self.models.voice, language);
        let response = match self
            .model
            .generate_content(self.models.speech.clone(), request)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Speech synthesis failed: {}", e);
                return None;
            }
        };
        let Some(inline) = response.first_inline_data() else {
            tracing::warn!("Speech synthesis returned no audio");
            return None;
        };
        match base64::engine::general_purpose::STANDARD.decode(&inline.data) {
            Ok(pcm) => Some(SpeechAudio {
                pcm,
                sample_rate: sample_rate_of(&inline.mime_type),
            }),
            Err(e) => {
                tracing::warn!("Speech payload is not base64: {}", e);
                None
            }
        }
    }
}

fn audio_player() -> String {
    dotenvy::var("FRIDGE_AUDIO_PLAYER").unwrap_or_else(|_| {
        if cfg!(target_os = "macos") {
            "afplay".into()
        } else {
            "aplay".into()
        }
    })
}

/// Play a WAV file through the platform's command-line player, waiting until it ends.
pub async fn play_wav(wav: &[u8]) -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let temp_wav = temp_dir.path().join("step.wav");
    tokio::fs::write(&temp_wav, wav).await?;
    let player = audio_player();
    let status = Command::new(&player)
        .arg(&temp_wav)
        .status()
        .await
        .with_context(|| format!("Could not start audio player {player}"))?;
    ensure!(status.success(), "Audio playback failed.");
    Ok(())
}
