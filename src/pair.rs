use rayon::prelude::*;

use crate::search::Searcher;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub released: usize,
    pub skips: [Vec<String>; 2],
}

// Each split of the working valves between the two agents is described by the
// skip mask handed to the first agent; the second agent skips the complement.
// A mask and its complement name the same split, so only the lower half of
// the mask space needs enumerating. Mask 0 stays in: one agent covering
// everything while the other idles is a legal assignment.
pub fn best_pairing(searcher: &Searcher, minutes: usize) -> Pairing {
    let n = searcher.nworking();
    if n == 0 {
        return Pairing { released: 0, skips: [Vec::new(), Vec::new()] };
    }

    let all_open = searcher.all_open();
    let half: u32 = 1 << (n - 1);

    // Every mask's pair of searches is independent and owns its caches, so
    // the sweep fans out cleanly. Ties go to the smallest mask so the
    // reduction gives the same answer no matter how the work is split up.
    let (released, mask) = (0..half).into_par_iter()
        .map(|mask| {
            let yours = searcher.released_masked(minutes, mask);
            let others = searcher.released_masked(minutes, all_open & !mask);
            (yours + others, mask)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .unwrap_or((0, 0));

    Pairing {
        released,
        skips: [
            searcher.labels_for_mask(mask),
            searcher.labels_for_mask(all_open & !mask),
        ],
    }
}
