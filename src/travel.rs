use std::cmp;
use std::collections::HashMap;

use crate::volcano::{RoomHandle, SquareArray, Volcano};

pub fn shortest_paths(weights: &SquareArray) -> SquareArray {
    let mut min_weights = weights.clone();

    // extend_shortest_paths() kind of "squares" the matrix, so instead of needing to extend the
    // shortest paths for each neighbor (or n-1 times) to propagate weights fully, we instead only
    // need to square the weights lg(n -1) times.
    let mut i = 1;
    while i < min_weights.cols {
        i *= 2;
        extend_shortest_paths(&mut min_weights);
    }
    min_weights
}

// Do an analog of multiplying a matrix by itself, but with "min" instead. See Section 25.1 in
// Cormen et al's Introduction to Algorithms.
//
// It seems safe to update min_weights in place and avoid copies, since while operations in the
// same call to extend_shortest_paths() can depend on each other, the result converges, so taking
// advantage of intermediate result for some nodes but not others is fine: some nodes will just get
// to their smallest weight earlier.
fn extend_shortest_paths(min_weights: &mut SquareArray) {
    let n = min_weights.cols;
    for src in 0..n {
        for dst in 0..n {
            for mid in 0..n {  // "mid" is short for "middleman"
                let direct = min_weights.get_raw(src, dst);
                let b = min_weights.get_raw(src, mid);
                let c = min_weights.get_raw(mid, dst);
                let mediated = if let (Some(b), Some(c)) = (b, c) {
                    Some(b + c)
                } else {
                    None
                };
                let min = inner_min(direct, mediated);
                min_weights.set_raw(src, dst, min);
            }
        }
    }
}

fn inner_min<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(cmp::min(a, b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        _ => None,
    }
}

// Travel times between the rooms that matter: the start room and every room
// with a working valve. Moving anywhere else is only ever an intermediate
// step, which the shortest-path weights already account for.
pub struct TravelTimes {
    rooms: Vec<RoomHandle>,
    edges: HashMap<RoomHandle, Vec<(RoomHandle, usize)>>,
}

impl TravelTimes {
    pub fn new(volcano: &Volcano, start: RoomHandle) -> Self {
        let paths = shortest_paths(&volcano.graph);

        let mut rooms = volcano.working_rooms();
        if !rooms.contains(&start) {
            rooms.push(start);
            rooms.sort();
        }

        let mut edges: HashMap<RoomHandle, Vec<(RoomHandle, usize)>> = HashMap::new();
        for &src in &rooms {
            let mut reachable: Vec<(RoomHandle, usize)> = Vec::new();
            for &dst in &rooms {
                if src == dst {
                    continue;
                }
                if let Some(d) = paths.get(src, dst) {
                    reachable.push((dst, d));
                }
            }
            edges.insert(src, reachable);
        }

        TravelTimes { rooms, edges }
    }

    pub fn rooms(&self) -> &[RoomHandle] {
        &self.rooms
    }

    pub fn edges_from(&self, src: RoomHandle) -> &[(RoomHandle, usize)] {
        self.edges.get(&src).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn between(&self, src: RoomHandle, dst: RoomHandle) -> Option<usize> {
        if src == dst {
            return Some(0);
        }
        self.edges_from(src).iter()
            .find(|&&(rh, _)| rh == dst)
            .map(|&(_, d)| d)
    }
}
