//! Reproducible default colors.
//!
//! Uncolored primitives get a color derived from an integer hash of their
//! staging index. Neighbouring primitives are visually distinguishable and
//! the same insertion order always produces the same colors.

/// Linear RGB color with components in `[0, 1]`.
pub type Rgb = [f32; 3];

/// 32-bit integer mix (Bob Jenkins' six-shift hash).
pub fn hash_index(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a_4f09) ^ (a >> 16);
    a
}

/// Low byte of the hash, scaled to `[0, 1]`.
fn shade(index: usize) -> f32 {
    (hash_index(index as u32) & 0xff) as f32 / 255.0
}

/// Default color of the point at `index`: a blue with varying green.
pub fn default_point_color(index: usize) -> Rgb {
    [0.0, 0.4 + shade(index) * 0.2, 1.0]
}

/// Default color of the line at `index`: an orange with varying green.
pub fn default_line_color(index: usize) -> Rgb {
    [1.0, 0.3 + shade(index) * 0.4, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash_index(0), 0x6b4e_d927);
        assert_eq!(hash_index(1), 0xb486_81b6);
    }

    #[test]
    fn colors_are_deterministic() {
        let first: Vec<Rgb> = (0..64).map(default_point_color).collect();
        let second: Vec<Rgb> = (0..64).map(default_point_color).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn colors_stay_in_range() {
        for i in 0..1000 {
            let p = default_point_color(i);
            assert!((0.4..=0.6).contains(&p[1]));
            let l = default_line_color(i);
            assert!((0.3..=0.7).contains(&l[1]));
        }
    }

    #[test]
    fn neighbours_differ() {
        assert_ne!(default_point_color(0), default_point_color(1));
    }
}
