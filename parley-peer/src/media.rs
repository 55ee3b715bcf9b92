use crate::error::{PeerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
}

/// Locally captured stream whose tracks get attached to an outgoing offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMedia {
    pub stream_id: String,
    pub tracks: Vec<MediaTrack>,
}

impl LocalMedia {
    pub fn has(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub label: String,
    pub kind: DeviceKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDevices {
    pub audio_inputs: Vec<MediaDeviceInfo>,
    pub audio_outputs: Vec<MediaDeviceInfo>,
    pub video_inputs: Vec<MediaDeviceInfo>,
}

impl MediaDevices {
    pub fn group(devices: Vec<MediaDeviceInfo>) -> Self {
        let mut grouped = Self::default();
        for device in devices {
            match device.kind {
                DeviceKind::AudioInput => grouped.audio_inputs.push(device),
                DeviceKind::AudioOutput => grouped.audio_outputs.push(device),
                DeviceKind::VideoInput => grouped.video_inputs.push(device),
            }
        }
        grouped
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaAccess {
    pub video: bool,
    pub audio: bool,
}

/// Capture capability supplied by the host. Failures are reported, never retried.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalMedia>;

    async fn list_devices(&self) -> Result<Vec<MediaDeviceInfo>>;

    /// Stop capturing the given stream.
    async fn release(&self, _media: &LocalMedia) {}

    async fn enumerate_devices(&self) -> MediaDevices {
        match self.list_devices().await {
            Ok(devices) => MediaDevices::group(devices),
            Err(e) => {
                warn!("Failed to enumerate devices: {}", e);
                MediaDevices::default()
            }
        }
    }

    /// Acquire and immediately release, reporting which kinds were granted.
    async fn test_access(&self) -> MediaAccess {
        match self.acquire().await {
            Ok(media) => {
                let access = MediaAccess {
                    video: media.has(TrackKind::Video),
                    audio: media.has(TrackKind::Audio),
                };
                self.release(&media).await;
                access
            }
            Err(e) => {
                warn!("Media access test failed: {}", e);
                MediaAccess::default()
            }
        }
    }
}

/// Headless hosts: no devices, access always denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

#[async_trait]
impl MediaSource for NoMedia {
    async fn acquire(&self) -> Result<LocalMedia> {
        Err(PeerError::Media("no capture devices available".to_owned()))
    }

    async fn list_devices(&self) -> Result<Vec<MediaDeviceInfo>> {
        Ok(Vec::new())
    }
}
