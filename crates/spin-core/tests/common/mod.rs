use spin_core::catalog::Track;
use spin_core::playback::AudioOutput;

/// Every side effect the state machine pushed to the primitive, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Position(u32),
    Volume(f32),
    Muted(bool),
    Looping(bool),
    Stop,
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn last_volume(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Volume(v) => Some(*v),
            _ => None,
        })
    }
}

impl AudioOutput for Recorder {
    fn load(&mut self, source: &str) {
        self.calls.push(Call::Load(source.to_string()));
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
    fn set_position(&mut self, secs: u32) {
        self.calls.push(Call::Position(secs));
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::Volume(volume));
    }
    fn set_muted(&mut self, muted: bool) {
        self.calls.push(Call::Muted(muted));
    }
    fn set_looping(&mut self, looping: bool) {
        self.calls.push(Call::Looping(looping));
    }
    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }
}

pub fn track(id: u32, duration_secs: u32) -> Track {
    Track {
        id,
        source_url: format!("https://example.test/{}.mp3", id),
        thumbnail_url: format!("https://example.test/{}.jpg", id),
        name: format!("Track {}", id),
        album: "Album".to_string(),
        duration_secs,
    }
}
