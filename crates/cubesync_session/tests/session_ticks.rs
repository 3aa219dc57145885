//! Multi-tick sessions over a simulated pile of settling cubes.

use cubesync_codec::{first_mismatch, Cube};
use cubesync_session::{Receiver, Sender, SessionConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Cubes fall until they hit the floor, then rest; a few get knocked around.
struct Pile {
    rng: ChaCha8Rng,
    frame: Vec<Cube>,
}

impl Pile {
    fn new(seed: u64, objects: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let frame = (0..objects)
            .map(|_| Cube {
                largest: rng.gen_range(0..4),
                a: rng.gen_range(-200..200),
                b: rng.gen_range(-200..200),
                c: rng.gen_range(-200..200),
                x: rng.gen_range(-4_000..4_000),
                y: rng.gen_range(0..3_000),
                z: rng.gen_range(-4_000..4_000),
                interacting: 0,
            })
            .collect();
        Self { rng, frame }
    }

    fn tick(&mut self) -> &[Cube] {
        for cube in &mut self.frame {
            if cube.y > 0 {
                cube.y = (cube.y - 40).max(0);
                cube.a += 1;
                if cube.y == 0 {
                    cube.interacting = 1;
                }
            } else if self.rng.gen_bool(0.03) {
                cube.x += self.rng.gen_range(-30..30);
                cube.z += self.rng.gen_range(-30..30);
                cube.largest = self.rng.gen_range(0..4);
            }
        }
        &self.frame
    }
}

fn run(config: &SessionConfig, ticks: usize) -> (Sender, Receiver) {
    let mut sender = Sender::new(config).unwrap();
    let mut receiver = Receiver::new(config).unwrap();
    let mut pile = Pile::new(42, config.objects);

    for tick in 0..ticks {
        let frame = pile.tick().to_vec();
        let bytes = sender.send(&frame).unwrap();
        let decoded = receiver.receive(&bytes).unwrap();
        assert_eq!(first_mismatch(&frame, decoded), None, "tick {tick}");
        assert_eq!(sender.ordering(), receiver.ordering(), "tick {tick}");
    }
    (sender, receiver)
}

#[test]
fn test_default_session() {
    let config = SessionConfig {
        objects: 300,
        ..SessionConfig::default()
    };
    let (sender, receiver) = run(&config, 100);
    assert_eq!(sender.ticks(), 100);
    assert_eq!(receiver.ticks(), 100);
    assert_eq!(sender.stats(), receiver.stats());
}

#[test]
fn test_every_sort_strategy() {
    for kind in [
        "kind = \"stable\"",
        "kind = \"approx\"\nmax_passes = 3",
        "kind = \"frozen\"",
    ] {
        let text = format!("objects = 120\nhistory_depth = 3\n\n[codec.sort]\n{kind}\n");
        let config = SessionConfig::from_toml_str(&text).unwrap();
        run(&config, 60);
    }
}

#[test]
fn test_resting_pile_gets_cheap() {
    let config = SessionConfig {
        objects: 500,
        ..SessionConfig::default()
    };
    let (sender, _) = run(&config, 120);
    let first = sender.stats().max_bytes;
    let last = sender.stats().last_bytes;
    // Everything has landed by now; only the odd knock remains
    assert!(last * 4 < first, "last {last} bytes, largest {first} bytes");
    assert!(last < 500 * Cube::RECORD_SIZE / 16);
}
