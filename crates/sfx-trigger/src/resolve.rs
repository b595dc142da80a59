//! Per-play parameter resolution
//!
//! Turns a descriptor's pools and ranges into the concrete clip, volume
//! and pitch of one play. Pure apart from the random source.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::clip::ClipRef;
use crate::descriptor::SoundDescriptor;

/// Concrete parameters for one play
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlay {
    pub clip: ClipRef,
    pub volume: f32,
    pub pitch: f32,
}

impl ResolvedPlay {
    /// Fixed play, bypassing any ranges
    pub fn new(clip: ClipRef, volume: f32, pitch: f32) -> Self {
        Self {
            clip,
            volume,
            pitch,
        }
    }

    #[inline]
    pub fn duration_secs(&self) -> f32 {
        self.clip.duration_secs
    }
}

/// Pick a clip uniformly and sample volume and pitch from their ranges
///
/// Returns `None` only for an empty clip pool.
pub fn resolve_play<R: Rng>(descriptor: &SoundDescriptor, rng: &mut R) -> Option<ResolvedPlay> {
    let clip = descriptor.clips.choose(rng)?.clone();
    let pitch = descriptor.pitch.sample(rng);
    let volume = descriptor.volume.sample(rng);

    Some(ResolvedPlay {
        clip,
        volume,
        pitch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sfx_core::ValueRange;
    use std::collections::HashSet;

    fn pool(n: u32) -> Vec<ClipRef> {
        (1..=n)
            .map(|i| ClipRef::new(i, format!("Clip_{i}"), 0.5))
            .collect()
    }

    #[test]
    fn test_empty_pool_resolves_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let desc = SoundDescriptor::new("Empty", vec![]);
        assert!(resolve_play(&desc, &mut rng).is_none());
    }

    #[test]
    fn test_single_clip_always_selected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let desc = SoundDescriptor::new("One", pool(1));
        for _ in 0..20 {
            assert_eq!(resolve_play(&desc, &mut rng).unwrap().clip.id, 1);
        }
    }

    #[test]
    fn test_pool_selection_covers_every_clip() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let desc = SoundDescriptor::new("Four", pool(4));

        let seen: HashSet<u32> = (0..200)
            .map(|_| resolve_play(&desc, &mut rng).unwrap().clip.id)
            .collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_fixed_ranges_resolve_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let desc = SoundDescriptor::new("Fixed", pool(2))
            .with_volume(ValueRange::fixed(0.6))
            .with_pitch(ValueRange::fixed(1.25));

        let play = resolve_play(&desc, &mut rng).unwrap();
        assert_eq!(play.volume, 0.6);
        assert_eq!(play.pitch, 1.25);
    }

    #[test]
    fn test_full_float_volume_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let desc = SoundDescriptor::new("Wide", pool(1))
            .with_volume(ValueRange::from((-f32::MAX, f32::MAX)));

        assert!(desc.validate().is_err());
        // Unvalidated ranges still resolve without panicking
        let play = resolve_play(&desc, &mut rng).unwrap();
        assert_eq!(play.volume, -f32::MAX);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let desc = SoundDescriptor::new("Var", pool(3))
            .with_volume(ValueRange::new(0.5, 1.0).unwrap())
            .with_pitch(ValueRange::new(0.9, 1.1).unwrap());

        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(resolve_play(&desc, &mut a), resolve_play(&desc, &mut b));
        }
    }
}
