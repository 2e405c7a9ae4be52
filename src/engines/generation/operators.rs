use crate::music::{Bar, Track};
use rand::Rng;
use std::cmp::Ordering;

/// Indices of the two highest scores. Ties keep the earlier index first;
/// with a single individual both indices point at it.
pub fn top_two(fitness: &[f64]) -> (usize, usize) {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[b].partial_cmp(&fitness[a]).unwrap_or(Ordering::Equal));

    let best = order.first().copied().unwrap_or(0);
    let second = order.get(1).copied().unwrap_or(best);
    (best, second)
}

/// Pick one of the two elites uniformly.
pub fn select_elite<'a, R: Rng>(elites: &'a [Track; 2], rng: &mut R) -> &'a Track {
    &elites[rng.gen_range(0..2)]
}

/// Even-bar single-point crossover: the child takes `parent1`'s bars before
/// the cut and `parent2`'s bars from it on. The cut always lands on an even
/// bar so two-bar phrases stay intact.
pub fn crossover<R: Rng>(parent1: &Track, parent2: &Track, rng: &mut R) -> Track {
    let bars1 = parent1.split_into_bars();
    let bars2 = parent2.split_into_bars();
    let phrases = bars1.len().min(bars2.len()) / 2;
    let cross_point = if phrases == 0 {
        0
    } else {
        rng.gen_range(0..phrases) * 2
    };

    let bars: Vec<Bar> = bars1
        .into_iter()
        .take(cross_point)
        .chain(bars2.into_iter().skip(cross_point))
        .collect();

    let mut child = parent1.clone();
    child.join_bars(bars);
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MusicSettings;
    use crate::music::Note;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn half_note_track(settings: &Arc<MusicSettings>, pitch: u8, bars: u32) -> Track {
        let half = settings.half();
        let notes = (0..bars * 2)
            .map(|i| Note::new(pitch, half, i * half, 80))
            .collect();
        Track::with_notes(Arc::clone(settings), notes)
    }

    #[test]
    fn test_top_two_orders_by_fitness() {
        assert_eq!(top_two(&[0.1, 0.9, 0.5, 0.7]), (1, 3));
    }

    #[test]
    fn test_top_two_ties_keep_first_seen() {
        assert_eq!(top_two(&[0.5, 0.9, 0.9, 0.9]), (1, 2));
        assert_eq!(top_two(&[1.0, 1.0]), (0, 1));
    }

    #[test]
    fn test_top_two_single_individual() {
        assert_eq!(top_two(&[3.0]), (0, 0));
    }

    #[test]
    fn test_crossover_cuts_on_even_bars() {
        let settings = Arc::new(MusicSettings::with_resolution(4));
        let a = half_note_track(&settings, 60, 8);
        let b = half_note_track(&settings, 72, 8);
        let bar_length = settings.bar_length();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let child = crossover(&a, &b, &mut rng);
            assert_eq!(child.full_length(), a.full_length());

            let switch = child
                .notes
                .iter()
                .position(|n| n.pitch == 72)
                .expect("child always takes at least one bar from parent2");
            let switch_bar = child.notes[switch].start_time / bar_length;
            assert_eq!(switch_bar % 2, 0);
            assert!(child.notes[switch..].iter().all(|n| n.pitch == 72));
        }
    }

    #[test]
    fn test_crossover_of_single_bar_takes_parent2() {
        let settings = Arc::new(MusicSettings::with_resolution(4));
        let a = half_note_track(&settings, 60, 1);
        let b = half_note_track(&settings, 72, 1);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(crossover(&a, &b, &mut rng), b);
    }
}
