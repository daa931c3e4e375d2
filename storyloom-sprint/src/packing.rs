//! 0/1 knapsack selection used by the optimal allocation mode.

use storyloom_core::Story;

/// Selection score: total points first, then summed priority weight.
type Value = (u64, u64);

fn value_of(story: &Story) -> Value {
    (u64::from(story.estimation), story.priority.weight())
}

fn add(a: Value, b: Value) -> Value {
    (a.0 + b.0, a.1 + b.1)
}

/// One bit per (item, points) cell recording whether the item is taken.
struct KeepTable {
    width: usize,
    bits: Vec<u64>,
}

impl KeepTable {
    fn new(items: usize, width: usize) -> Self {
        Self {
            width,
            bits: vec![0; (items * width).div_ceil(64)],
        }
    }

    fn set(&mut self, item: usize, points: usize) {
        let at = item * self.width + points;
        self.bits[at / 64] |= 1 << (at % 64);
    }

    fn get(&self, item: usize, points: usize) -> bool {
        let at = item * self.width + points;
        self.bits[at / 64] & (1 << (at % 64)) != 0
    }
}

/// Choose the subset of `items` that maximizes (points, priority weight)
/// without exceeding `room` points.
///
/// Between equally valued subsets the one containing earlier items wins, so
/// callers should pass items in scheduling order. Returns one flag per item.
///
/// Memory is one value row of `min(room, total points) + 1` entries plus one
/// bit per item and point of that row.
pub fn select(items: &[&Story], room: u32) -> Vec<bool> {
    let total: u64 = items.iter().map(|s| u64::from(s.estimation)).sum();
    let cap = u64::from(room).min(total) as usize;
    let n = items.len();

    // best[c]: best value from the items already swept (a suffix) within c points
    let mut best = vec![(0u64, 0u64); cap + 1];
    let mut keep = KeepTable::new(n, cap + 1);
    for i in (0..n).rev() {
        let weight = items[i].estimation as usize;
        if weight > cap {
            continue;
        }
        let value = value_of(items[i]);
        for c in (weight..=cap).rev() {
            let take = add(best[c - weight], value);
            if take >= best[c] {
                best[c] = take;
                keep.set(i, c);
            }
        }
    }

    let mut chosen = vec![false; n];
    let mut c = cap;
    for (i, flag) in chosen.iter_mut().enumerate() {
        if keep.get(i, c) {
            *flag = true;
            c -= items[i].estimation as usize;
        }
    }
    chosen
}
