//! Audio cue playback
//!
//! Playback is fire-and-forget: failures are logged and never reach the
//! workout engine.

use std::{
    collections::HashMap,
    fmt,
    io::Cursor,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, warn};

/// Named audio signals played at phase-transition events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Short pulse, used by the countdown and when a set finishes
    Beep,
    /// A jump phase begins
    Start,
    /// The workout is complete
    Finish,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Beep => "beep",
            Cue::Start => "start",
            Cue::Finish => "finish",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can play a cue without blocking the caller
pub trait CuePlayer: Send + Sync + fmt::Debug {
    /// Play `cue` from the start at `volume` (0.0 to 1.0)
    fn play_cue(&self, cue: Cue, volume: f32);
}

/// Player used when audio is muted
#[derive(Debug, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play_cue(&self, cue: Cue, volume: f32) {
        debug!("Muted cue: {} (volume {:.2})", cue, volume);
    }
}

/// Lazily loaded cue files, read once per cue and kept for the session
#[derive(Debug)]
struct CueResources {
    sounds_dir: PathBuf,
    cache: Mutex<HashMap<Cue, Arc<Vec<u8>>>>,
}

impl CueResources {
    fn new(sounds_dir: PathBuf) -> Self {
        Self {
            sounds_dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn path_for(&self, cue: Cue) -> PathBuf {
        self.sounds_dir.join(format!("{}.mp3", cue.name()))
    }

    fn cached(&self, cue: Cue) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok().and_then(|cache| cache.get(&cue).cloned())
    }

    fn load(&self, cue: Cue) -> Result<Arc<Vec<u8>>, String> {
        if let Some(bytes) = self.cached(cue) {
            return Ok(bytes);
        }

        let path = self.path_for(cue);
        let bytes = std::fs::read(&path)
            .map_err(|e| format!("Failed to read cue file {}: {}", path.display(), e))?;
        let bytes = Arc::new(bytes);

        debug!("Loaded cue {} ({} bytes)", cue, bytes.len());
        if let Ok(mut cache) = self.cache.lock() {
            cache.entry(cue).or_insert_with(|| Arc::clone(&bytes));
        }
        Ok(bytes)
    }
}

/// Cached cue data shared with the decoder without copying
#[derive(Debug, Clone)]
struct CueBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for CueBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

fn decode(bytes: Arc<Vec<u8>>) -> Result<Decoder<Cursor<CueBytes>>, String> {
    Decoder::new(Cursor::new(CueBytes(bytes))).map_err(|e| format!("Failed to decode cue: {}", e))
}

/// Clamp a requested volume into 0.0-1.0; non-finite values play at full volume
fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 }
}

/// Plays cues from `<sounds_dir>/<cue>.mp3` through the default output
/// device. Each playback gets its own sink on a short-lived thread, so a cue
/// always starts from its beginning and never blocks the caller.
#[derive(Debug, Clone)]
pub struct RodioCuePlayer {
    resources: Arc<CueResources>,
}

impl RodioCuePlayer {
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources: Arc::new(CueResources::new(sounds_dir.into())),
        }
    }

    pub fn sounds_dir(&self) -> &Path {
        &self.resources.sounds_dir
    }

    fn play(resources: &CueResources, cue: Cue, volume: f32) -> Result<(), String> {
        let source = decode(resources.load(cue)?)?;

        let (_stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| format!("No audio output device: {}", e))?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| format!("Failed to open audio sink: {}", e))?;

        sink.set_volume(clamp_volume(volume));
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

impl CuePlayer for RodioCuePlayer {
    fn play_cue(&self, cue: Cue, volume: f32) {
        let resources = Arc::clone(&self.resources);
        let spawned = std::thread::Builder::new()
            .name(format!("cue-{}", cue.name()))
            .spawn(move || {
                if let Err(e) = Self::play(&resources, cue, volume) {
                    warn!("Error playing cue {}: {}", cue, e);
                }
            });

        if let Err(e) = spawned {
            warn!("Cannot play cue {}: {}", cue, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::{Cue, CuePlayer};

    /// Test player that remembers every cue it was asked to play
    #[derive(Debug, Default)]
    pub struct RecordingCuePlayer {
        played: Mutex<Vec<(Cue, f32)>>,
    }

    impl RecordingCuePlayer {
        pub fn cues(&self) -> Vec<Cue> {
            self.played.lock().unwrap().iter().map(|(cue, _)| *cue).collect()
        }

        pub fn played(&self) -> Vec<(Cue, f32)> {
            self.played.lock().unwrap().clone()
        }
    }

    impl CuePlayer for RecordingCuePlayer {
        fn play_cue(&self, cue: Cue, volume: f32) {
            self.played.lock().unwrap().push((cue, volume));
        }
    }
}
