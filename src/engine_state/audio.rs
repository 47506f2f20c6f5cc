//! # Sound Requests
//!
//! The simulation never plays audio itself. It records fire-and-forget
//! requests carrying a sound, where it happened and how loud it should be
//! for the listener, and the audio collaborator drains them once per tick.

use cgmath::{MetricSpace, Point3};

/// Distance beyond which a sound is inaudible.
pub const HEARING_RANGE: f32 = 32.0;

/// Every sound the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Player pistol shot
    Pistol,
    /// Player shotgun blast
    Shotgun,
    /// Rocket launch
    RocketLauncher,
    /// Rocket detonation
    Explosion,
    /// Bullet striking a block
    Hit,
    /// Ammo pickup collected
    Ammo,
    /// Ground enemy firing
    EnemyPistol,
    /// Flying enemy self-destructing
    DroneExplosion,
}

/// A request to play `id` at `position` with a pre-computed volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundRequest {
    /// Which sound to play
    pub id: SoundId,
    /// Where the sound originated
    pub position: Point3<f32>,
    /// Volume in `(0, 1]`
    pub volume: f32,
}

/// Linear falloff with distance.
///
/// # Returns
/// `None` when the source is out of earshot.
pub fn attenuate(distance: f32) -> Option<f32> {
    if distance > HEARING_RANGE {
        return None;
    }
    let volume = 1.0 - distance / HEARING_RANGE;
    (volume > 0.0).then_some(volume)
}

/// Sound requests buffered during a tick.
#[derive(Debug, Default)]
pub struct SoundQueue {
    requests: Vec<SoundRequest>,
}

impl SoundQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `id` at `source` as heard from `listener`. Inaudible sounds are dropped.
    pub fn play_at(&mut self, id: SoundId, source: Point3<f32>, listener: Point3<f32>) {
        if let Some(volume) = attenuate(source.distance(listener)) {
            self.requests.push(SoundRequest {
                id,
                position: source,
                volume,
            });
        }
    }

    /// Takes every queued request.
    pub fn drain(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_is_linear_and_capped() {
        assert_eq!(attenuate(0.0), Some(1.0));
        assert_eq!(attenuate(16.0), Some(0.5));
        assert_eq!(attenuate(32.0), None);
        assert_eq!(attenuate(40.0), None);
    }

    #[test]
    fn test_queue_drops_inaudible_requests() {
        let mut queue = SoundQueue::new();
        let listener = Point3::new(0.0, 0.0, 0.0);
        queue.play_at(SoundId::Hit, Point3::new(8.0, 0.0, 0.0), listener);
        queue.play_at(SoundId::Explosion, Point3::new(100.0, 0.0, 0.0), listener);

        let requests = queue.drain();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, SoundId::Hit);
        assert!((requests[0].volume - 0.75).abs() < 1e-6);
        assert!(queue.is_empty());
    }
}
