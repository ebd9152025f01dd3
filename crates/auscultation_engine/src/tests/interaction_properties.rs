//! Playback invariants under arbitrary intersection sequences

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{bound_playing, fetcher, session, CRACKLES, HEART, LUNG};
use crate::audio::backend::{AudioBackend, HeadlessBackend};
use crate::interaction::{ControllerId, PairState, NO_SOUND_PLAYING};
use crate::session::Session;
use crate::triggers::TriggerId;

const CONTROLLERS: [ControllerId; 3] = [ControllerId(0), ControllerId(1), ControllerId(2)];
const TRIGGERS: [TriggerId; 3] = [LUNG, HEART, CRACKLES];

/// Reference model of which pairs intersect
#[derive(Default)]
struct Model {
    pairs: BTreeSet<(ControllerId, TriggerId)>,
}

impl Model {
    fn held(&self, trigger: TriggerId) -> bool {
        self.pairs.iter().any(|(_, t)| *t == trigger)
    }

    fn check(&self, session: &Session<HeadlessBackend>, step: usize) {
        for trigger in TRIGGERS {
            assert_eq!(
                bound_playing(session, trigger),
                self.held(trigger),
                "step {step}: playback of {trigger} disagrees with its holders"
            );
            for controller in CONTROLLERS {
                let expected = if self.pairs.contains(&(controller, trigger)) {
                    PairState::Intersecting
                } else {
                    PairState::Apart
                };
                assert_eq!(session.interaction().state(controller, trigger), expected, "step {step}");
            }
        }

        // Nothing outside the held triggers is audible
        let held = TRIGGERS.iter().filter(|t| self.held(**t)).count();
        assert_eq!(session.backend().playing_names().len(), held, "step {step}");

        if held == 0 {
            assert_eq!(session.currently_playing_label(), NO_SOUND_PLAYING, "step {step}");
        }
    }
}

#[tokio::test]
async fn test_random_sequences_keep_playback_consistent() {
    let fetcher = fetcher();
    let collections = ["normal", "intermediate", "cardiac"];

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = session("normal").await;
        let mut model = Model::default();

        for step in 0..300 {
            let controller = CONTROLLERS[rng.gen_range(0..CONTROLLERS.len())];
            let trigger = TRIGGERS[rng.gen_range(0..TRIGGERS.len())];

            match rng.gen_range(0..100) {
                0..=44 => {
                    session.on_controller_enter(controller, trigger);
                    if session.registry().binding(trigger).is_some() {
                        model.pairs.insert((controller, trigger));
                    }
                }
                45..=89 => {
                    session.on_controller_exit(controller, trigger);
                    model.pairs.remove(&(controller, trigger));
                }
                90..=94 => {
                    session.on_controller_removed(controller);
                    model.pairs.retain(|(c, _)| *c != controller);
                }
                _ => {
                    let name = collections[rng.gen_range(0..collections.len())];
                    session.switch_to(name, &fetcher).await.unwrap();
                    // Held triggers without a sound in the new collection are forced apart
                    model.pairs.retain(|(_, t)| session.registry().binding(*t).is_some());
                }
            }

            model.check(&session, step);
        }
    }
}

#[tokio::test]
async fn test_two_holders_share_one_playback() {
    let mut session = session("normal").await;
    let left = ControllerId(0);
    let right = ControllerId(1);
    let heart = session.registry().binding(HEART).unwrap().handle;

    session.on_controller_enter(left, HEART);
    session.on_controller_enter(right, HEART);
    assert_eq!(session.backend().play_count(heart), 1);

    session.on_controller_exit(left, HEART);
    assert!(session.backend().is_playing(heart));
    assert_eq!(session.currently_playing_label(), "Normal Heart");

    session.on_controller_exit(right, HEART);
    assert!(!session.backend().is_playing(heart));
    assert_eq!(session.backend().stop_count(heart), 1);
    assert_eq!(session.currently_playing_label(), NO_SOUND_PLAYING);
}

#[tokio::test]
async fn test_unbound_crackles_trigger() {
    let mut session = session("normal").await;
    assert!(session.registry().binding(CRACKLES).is_none());
    session.backend_mut().clear_calls();

    let hand = ControllerId(0);
    session.on_controller_enter(hand, CRACKLES);
    assert!(session.backend().calls().is_empty());
    assert_eq!(session.interaction().state(hand, CRACKLES), PairState::Apart);
    assert_eq!(session.currently_playing_label(), NO_SOUND_PLAYING);

    // The later exit is not a transition either
    session.on_controller_exit(hand, CRACKLES);
    assert!(session.backend().calls().is_empty());
}

#[tokio::test]
async fn test_label_follows_most_recent_playing_sound() {
    let mut session = session("intermediate").await;
    let hand = ControllerId(0);

    session.on_controller_enter(hand, LUNG);
    session.on_controller_enter(ControllerId(1), CRACKLES);
    assert_eq!(session.currently_playing_label(), "Late Inspiratory Crackles");

    session.on_controller_exit(ControllerId(1), CRACKLES);
    assert_eq!(session.currently_playing_label(), "Normal Bronchial");
}
