// Application logo: a red drop on a transparent square. Also pulled into
// build.rs with `include!`, so this file only uses `core`/`std`.

pub const LOGO_RGB: (u8, u8, u8) = (0xE5, 0x39, 0x35);

/// Straight RGBA pixels, row-major, `size` x `size`.
pub fn logo_rgba(size: u32) -> Vec<u8> {
    let s = size as f32;
    let cx = s * 0.5;
    let cy = s * 0.62;
    let r = s * 0.33;
    let tip_y = s * 0.06;
    let (red, green, blue) = LOGO_RGB;

    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let dx = px - cx;
            let dy = py - cy;
            let in_bulb = (dx * dx + dy * dy).sqrt() <= r;
            let in_cone = py >= tip_y && py < cy && dx.abs() <= r * (py - tip_y) / (cy - tip_y);
            if in_bulb || in_cone {
                rgba.extend_from_slice(&[red, green, blue, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_is_opaque_inside_and_clear_at_corners() {
        let size = 32;
        let rgba = logo_rgba(size);
        assert_eq!(rgba.len(), (size * size * 4) as usize);
        let alpha = |x: u32, y: u32| rgba[((y * size + x) * 4 + 3) as usize];
        assert_eq!(alpha(16, 20), 255);
        assert_eq!(alpha(16, 4), 255);
        assert_eq!(alpha(0, 0), 0);
        assert_eq!(alpha(31, 31), 0);
        assert_eq!(alpha(4, 4), 0);
    }
}
