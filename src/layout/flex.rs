//! # Space Distribution Utilities
//!
//! Lower-level distribution math for the constraint solver. The solver
//! decides *which* children share free space; this module decides *how
//! much* each one gets.

const EPSILON: f64 = 1e-6;

/// One Grow child's share of free space, bounded by its sizing clamps.
#[derive(Debug, Clone, Copy)]
pub struct GrowSlot {
    pub min: f64,
    pub max: f64,
    /// Output: the size this slot receives.
    pub size: f64,
}

impl GrowSlot {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            size: 0.0,
        }
    }
}

/// Distribute `available` points equally among Grow slots.
///
/// Each slot is clamped to its (min, max) window; space freed (or
/// consumed) by a clamped slot is re-offered to the rest. Any sub-point
/// residue left by floating division lands on the earliest unclamped
/// slot, keeping the result deterministic in input order.
pub fn distribute_grow(slots: &mut [GrowSlot], available: f64) {
    if slots.is_empty() {
        return;
    }

    let mut active: Vec<usize> = (0..slots.len()).collect();
    let mut remaining = available;

    while !active.is_empty() {
        let share = remaining / active.len() as f64;
        let mut clamped_any = false;

        active.retain(|&i| {
            let target = slots[i].min.max(share.min(slots[i].max));
            if (target - share).abs() > EPSILON {
                slots[i].size = target;
                remaining -= target;
                clamped_any = true;
                false
            } else {
                true
            }
        });

        if !clamped_any {
            for &i in &active {
                slots[i].size = share;
            }
            // Floating residue goes to the first slot in input order.
            slots[active[0]].size += remaining - share * active.len() as f64;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(slots: &[GrowSlot]) -> Vec<f64> {
        slots.iter().map(|s| s.size).collect()
    }

    #[test]
    fn test_even_split() {
        let mut slots = vec![GrowSlot::new(0.0, 1000.0), GrowSlot::new(0.0, 1000.0)];
        distribute_grow(&mut slots, 100.0);
        assert_eq!(sizes(&slots), vec![50.0, 50.0]);
    }

    #[test]
    fn test_max_clamp_redistributes() {
        let mut slots = vec![GrowSlot::new(0.0, 20.0), GrowSlot::new(0.0, 1000.0)];
        distribute_grow(&mut slots, 100.0);
        assert_eq!(sizes(&slots), vec![20.0, 80.0]);
    }

    #[test]
    fn test_min_clamp_consumes_more() {
        let mut slots = vec![GrowSlot::new(60.0, 1000.0), GrowSlot::new(0.0, 1000.0)];
        distribute_grow(&mut slots, 100.0);
        assert_eq!(sizes(&slots), vec![60.0, 40.0]);
    }

    #[test]
    fn test_no_space_leaves_minimums() {
        let mut slots = vec![GrowSlot::new(10.0, 1000.0), GrowSlot::new(0.0, 1000.0)];
        distribute_grow(&mut slots, 0.0);
        assert_eq!(sizes(&slots), vec![10.0, 0.0]);
    }

    #[test]
    fn test_negative_space_leaves_minimums() {
        let mut slots = vec![GrowSlot::new(5.0, 1000.0), GrowSlot::new(5.0, 1000.0)];
        distribute_grow(&mut slots, -30.0);
        assert_eq!(sizes(&slots), vec![5.0, 5.0]);
    }

    #[test]
    fn test_all_clamped_below_available() {
        let mut slots = vec![GrowSlot::new(0.0, 10.0), GrowSlot::new(0.0, 10.0)];
        distribute_grow(&mut slots, 100.0);
        assert_eq!(sizes(&slots), vec![10.0, 10.0]);
    }

    #[test]
    fn test_three_way_split_is_exact() {
        let mut slots = vec![
            GrowSlot::new(0.0, 1000.0),
            GrowSlot::new(0.0, 1000.0),
            GrowSlot::new(0.0, 1000.0),
        ];
        distribute_grow(&mut slots, 100.0);
        let total: f64 = sizes(&slots).iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        // Residue lands on the first slot.
        assert!(slots[0].size >= slots[1].size);
        assert_eq!(slots[1].size, slots[2].size);
    }
}
