//! Weber's regional chart, extended with the church modes.
//!
//! Each region is a mode on one of the 15 key signatures. Edges join
//! regions a fifth apart in the same mode, a major key and its relative
//! and parallel minor, and two modes sharing a key signature whose tonics
//! are neighbours on the circle of fifths (Lydian, major, Mixolydian,
//! Dorian, minor, Phrygian, Locrian). The distance between two tonalities
//! is the length of the shortest path between their regions.
//!
//! Modal edges never change the key signature, so distances between major
//! and minor keys are those of the tonal chart.

use std::collections::VecDeque;
use std::sync::OnceLock;

use crate::tonality::{Mode, Tonality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

const REGIONS: [Region; 7] = [
    Region::Major,
    Region::Minor,
    Region::Dorian,
    Region::Phrygian,
    Region::Lydian,
    Region::Mixolydian,
    Region::Locrian,
];

/// Regions on one key signature, by tonic along the circle of fifths.
const MODAL_ORDER: [Region; 7] = [
    Region::Lydian,
    Region::Major,
    Region::Mixolydian,
    Region::Dorian,
    Region::Minor,
    Region::Phrygian,
    Region::Locrian,
];

const SIGNATURES: usize = 15;
const NODES: usize = REGIONS.len() * SIGNATURES;

impl Region {
    /// Natural and melodic minor share the minor region, blues scales the
    /// region of their major or minor key.
    fn of(mode: Mode) -> Self {
        match mode {
            Mode::Major | Mode::Ionian | Mode::MajorBlues => Region::Major,
            Mode::Minor
            | Mode::MinorNatural
            | Mode::MinorMelodic
            | Mode::Aeolian
            | Mode::MinorBlues => Region::Minor,
            Mode::Dorian => Region::Dorian,
            Mode::Phrygian => Region::Phrygian,
            Mode::Lydian => Region::Lydian,
            Mode::Mixolydian => Region::Mixolydian,
            Mode::Locrian => Region::Locrian,
        }
    }
}

fn node(region: Region, fifths: i32) -> Option<usize> {
    if !(-7..=7).contains(&fifths) {
        return None;
    }
    Some(region as usize * SIGNATURES + (fifths + 7) as usize)
}

fn neighbours(n: usize) -> Vec<usize> {
    let region = REGIONS[n / SIGNATURES];
    let fifths = (n % SIGNATURES) as i32 - 7;
    let mut next = vec![node(region, fifths - 1), node(region, fifths + 1)];
    match region {
        Region::Major => {
            next.push(node(Region::Minor, fifths));
            next.push(node(Region::Minor, fifths - 3));
        }
        Region::Minor => {
            next.push(node(Region::Major, fifths));
            next.push(node(Region::Major, fifths + 3));
        }
        _ => {}
    }
    if let Some(pos) = MODAL_ORDER.iter().position(|r| *r == region) {
        if pos > 0 {
            next.push(node(MODAL_ORDER[pos - 1], fifths));
        }
        if let Some(r) = MODAL_ORDER.get(pos + 1) {
            next.push(node(*r, fifths));
        }
    }
    next.into_iter().flatten().collect()
}

fn bfs(source: usize) -> [u32; NODES] {
    let mut dist = [u32::MAX; NODES];
    let mut queue = VecDeque::new();
    dist[source] = 0;
    queue.push_back(source);
    while let Some(n) = queue.pop_front() {
        for next in neighbours(n) {
            if dist[next] == u32::MAX {
                dist[next] = dist[n] + 1;
                queue.push_back(next);
            }
        }
    }
    dist
}

fn table() -> &'static [[u32; NODES]; NODES] {
    static TABLE: OnceLock<Box<[[u32; NODES]; NODES]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t = Box::new([[0; NODES]; NODES]);
        for (source, row) in t.iter_mut().enumerate() {
            *row = bfs(source);
        }
        t
    })
}

fn node_of(ton: &Tonality) -> usize {
    // fifths is validated at construction
    node(Region::of(ton.mode()), ton.fifths() as i32).unwrap_or(7)
}

pub fn distance(lhs: &Tonality, rhs: &Tonality) -> u32 {
    table()[node_of(lhs)][node_of(rhs)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_are_one_step() {
        let c = Tonality::major(0).unwrap();
        assert_eq!(distance(&c, &c), 0);
        assert_eq!(distance(&c, &Tonality::major(1).unwrap()), 1);
        assert_eq!(distance(&c, &Tonality::minor(0).unwrap()), 1);
        assert_eq!(distance(&c, &Tonality::minor(-3).unwrap()), 1);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Tonality::major(-5).unwrap();
        let b = Tonality::minor(4).unwrap();
        assert_eq!(distance(&a, &b), distance(&b, &a));
        let dorian = Tonality::new(-2, Mode::Dorian).unwrap();
        assert_eq!(distance(&a, &dorian), distance(&dorian, &a));
    }

    #[test]
    fn test_far_keys() {
        let c = Tonality::major(0).unwrap();
        let fsharp = Tonality::major(6).unwrap();
        assert_eq!(distance(&c, &Tonality::major(2).unwrap()), 2);
        // C -> a -> A -> f# -> F#
        assert_eq!(distance(&c, &fsharp), 4);
        // natural minor lives in the minor region
        let e_aeolian = Tonality::new(1, Mode::Aeolian).unwrap();
        assert_eq!(distance(&c, &e_aeolian), 2);
    }

    #[test]
    fn test_modes_have_their_own_regions() {
        let c = Tonality::major(0).unwrap();
        let a = Tonality::minor(0).unwrap();
        let d_dorian = Tonality::new(0, Mode::Dorian).unwrap();
        let g_mixolydian = Tonality::new(0, Mode::Mixolydian).unwrap();
        let f_lydian = Tonality::new(0, Mode::Lydian).unwrap();
        let b_locrian = Tonality::new(0, Mode::Locrian).unwrap();

        // same signature, different modes
        assert_eq!(distance(&c, &d_dorian), 2);
        assert_eq!(distance(&c, &g_mixolydian), 1);
        assert_eq!(distance(&c, &f_lydian), 1);
        assert_eq!(distance(&a, &d_dorian), 1);
        assert_eq!(distance(&a, &b_locrian), 2);
        // A dorian is a fifth above D dorian
        assert_eq!(distance(&d_dorian, &Tonality::new(1, Mode::Dorian).unwrap()), 1);
        // ionian is the major region
        assert_eq!(distance(&c, &Tonality::new(0, Mode::Ionian).unwrap()), 0);
    }

    #[test]
    fn test_modes_keep_tonal_distances() {
        // every major/minor pair within the tonal chart bound
        for f in -7..=7 {
            let c = Tonality::major(0).unwrap();
            let major = Tonality::major(f).unwrap();
            let minor = Tonality::minor(f).unwrap();
            assert_eq!(distance(&major, &minor), 1);
            assert!(distance(&c, &major) <= f.unsigned_abs() as u32);
        }
    }

    #[test]
    fn test_every_region_reachable() {
        for row in table().iter() {
            assert!(row.iter().all(|d| *d < u32::MAX));
        }
    }
}
