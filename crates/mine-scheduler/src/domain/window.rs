//! Production window arithmetic
//!
//! Pure calculation of how long a deputy has to wait before its slot in
//! the rotation opens. The deputies take turns in fixed slots of
//! `timeout_ms` each; one full pass over all deputies is one rotation.
//! The caller supplies the wall clock so the function stays pure.

/// Inputs for one window calculation
///
/// All fields are validated by the caller: `node_count >= 1`,
/// `distance >= 1`, `block_interval_ms < timeout_ms`.
#[derive(Clone, Copy, Debug)]
pub struct WindowParams {
    /// Number of deputies authorized to produce at the target height
    pub node_count: u64,

    /// Duration of one deputy's exclusive slot (milliseconds)
    pub timeout_ms: u64,

    /// Minimum desired spacing between consecutive blocks (milliseconds)
    pub block_interval_ms: u64,

    /// This node's 1-based rank in the rotation (1 = immediately next)
    pub distance: u64,

    /// Parent block header timestamp (Unix epoch seconds)
    pub parent_block_time: u64,

    /// Current wall clock (Unix epoch milliseconds)
    pub now_ms: u64,
}

/// Milliseconds to wait before this node's production window opens
///
/// Returns 0 when the window is already open. The minimum block-interval
/// throttle only applies to the immediate successor (`distance == 1`)
/// and only until the first rotation wraparound; once a full rotation
/// has passed a block is overdue and must not be delayed further.
///
/// Arithmetic is done in `i64` with Euclidean remainders so a skewed
/// clock (`now_ms` earlier than the parent timestamp) still yields a
/// well-defined non-negative wait.
pub fn sleep_time(params: &WindowParams) -> u64 {
    let one_loop = (params.node_count * params.timeout_ms) as i64;
    let total_pass = params.now_ms as i64 - params.parent_block_time as i64 * 1000;
    let pass = total_pass.rem_euclid(one_loop);
    let window_from = ((params.distance - 1) * params.timeout_ms) as i64;
    let window_to = (params.distance * params.timeout_ms) as i64;

    if params.distance == 1 && total_pass < params.timeout_ms as i64 {
        // Immediate successor before any wraparound: throttle to the
        // minimum block interval so near-empty blocks are not produced
        // back to back.
        (params.block_interval_ms as i64 - pass).max(0) as u64
    } else if (window_from..window_to).contains(&pass) {
        // Window already open.
        0
    } else {
        // Time until the window next opens, wrapping across the
        // rotation boundary.
        (window_from - pass).rem_euclid(one_loop) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(distance: u64, parent_block_time: u64, now_ms: u64) -> WindowParams {
        WindowParams {
            node_count: 3,
            timeout_ms: 10_000,
            block_interval_ms: 3_000,
            distance,
            parent_block_time,
            now_ms,
        }
    }

    #[test]
    fn test_window_open_waits_zero() {
        // pass_time lands exactly at the start of window 2.
        let p = params(2, 1_000, 1_000_000 + 10_000);
        assert_eq!(sleep_time(&p), 0);
    }

    #[test]
    fn test_window_open_mid_window() {
        let p = params(2, 1_000, 1_000_000 + 15_500);
        assert_eq!(sleep_time(&p), 0);
    }

    #[test]
    fn test_wraparound_wait() {
        // 1 ms before the 30_000 ms rotation repeats; window is
        // [10_000, 20_000), so the wait wraps to 10_001.
        let p = params(2, 1_000, 1_000_000 + 29_999);
        assert_eq!(sleep_time(&p), 10_001);
    }

    #[test]
    fn test_immediate_successor_throttle() {
        let p = params(1, 1_000, 1_000_000 + 1_000);
        assert_eq!(sleep_time(&p), 2_000);
    }

    #[test]
    fn test_immediate_successor_throttle_clamps_to_zero() {
        // Past the block interval but still inside the first slot.
        let p = params(1, 1_000, 1_000_000 + 5_000);
        assert_eq!(sleep_time(&p), 0);
    }

    #[test]
    fn test_throttle_suppressed_after_wraparound() {
        // One full rotation plus 500 ms elapsed: the throttle no longer
        // applies, and pass_time 500 is inside window 1.
        let p = params(1, 1_000, 1_000_000 + 30_500);
        assert_eq!(sleep_time(&p), 0);
    }

    #[test]
    fn test_before_own_window() {
        // pass_time 4_000 with window [10_000, 20_000).
        let p = params(2, 1_000, 1_000_000 + 4_000);
        assert_eq!(sleep_time(&p), 6_000);
    }

    #[test]
    fn test_skewed_clock_is_non_negative() {
        // Clock behind the parent timestamp by 2 seconds.
        let p = params(2, 1_000, 1_000_000 - 2_000);
        let wait = sleep_time(&p);
        assert!(wait < 30_000);
    }

    #[test]
    fn test_single_deputy_rotation() {
        let p = WindowParams {
            node_count: 1,
            timeout_ms: 10_000,
            block_interval_ms: 3_000,
            distance: 1,
            parent_block_time: 1_000,
            now_ms: 1_000_000 + 12_345,
        };
        // Past the first slot, so the throttle is gone and the single
        // window [0, 10_000) covers pass_time 2_345.
        assert_eq!(sleep_time(&p), 0);
    }

    proptest! {
        #[test]
        fn test_wait_bounded_by_rotation(
            node_count in 1u64..=21,
            timeout_ms in 1_000u64..=60_000,
            block_interval_ms in 0u64..1_000,
            distance_seed in 0u64..100,
            parent_block_time in 0u64..2_000_000_000,
            offset_ms in 0u64..10_000_000,
        ) {
            let distance = distance_seed % node_count + 1;
            let p = WindowParams {
                node_count,
                timeout_ms,
                block_interval_ms,
                distance,
                parent_block_time,
                now_ms: parent_block_time * 1000 + offset_ms,
            };
            let wait = sleep_time(&p);
            prop_assert!(wait < node_count * timeout_ms);
        }

        #[test]
        fn test_wait_lands_on_window_start(
            node_count in 2u64..=21,
            timeout_ms in 1_000u64..=60_000,
            distance_seed in 0u64..100,
            parent_block_time in 0u64..2_000_000_000,
            offset_ms in 0u64..10_000_000,
        ) {
            // Non-successor ranks: a positive wait must land exactly on
            // the opening edge of this node's window.
            let distance = distance_seed % (node_count - 1) + 2;
            let p = WindowParams {
                node_count,
                timeout_ms,
                block_interval_ms: 0,
                distance,
                parent_block_time,
                now_ms: parent_block_time * 1000 + offset_ms,
            };
            let wait = sleep_time(&p);
            if wait > 0 {
                let one_loop = node_count * timeout_ms;
                let pass = offset_ms % one_loop;
                prop_assert_eq!((pass + wait) % one_loop, (distance - 1) * timeout_ms);
            }
        }
    }
}
