use crate::motion::domain::mask::{Mask, FOREGROUND};
use crate::shared::math::{find, union};
use crate::shared::region::MotionRegion;

#[derive(Clone, Copy)]
struct Bounds {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    pixels: usize,
}

/// Bounding rectangles of 8-connected foreground components in `mask`.
///
/// Only pixels equal to [`FOREGROUND`] participate, so shadow pixels never
/// form or join a region. A component is kept when its pixel count strictly
/// exceeds `min_area`. Regions come out in scan order of their first pixel.
pub fn extract_regions(mask: &Mask, min_area: usize) -> Vec<MotionRegion> {
    let w = mask.width as usize;
    let h = mask.height as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let data = &mask.data;
    let is_fg = |i: usize| data[i] == FOREGROUND;
    let mut parent: Vec<usize> = (0..w * h).collect();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !is_fg(i) {
                continue;
            }
            if x > 0 && is_fg(i - 1) {
                union(&mut parent, i, i - 1);
            }
            if y > 0 {
                let up = i - w;
                if is_fg(up) {
                    union(&mut parent, i, up);
                }
                if x > 0 && is_fg(up - 1) {
                    union(&mut parent, i, up - 1);
                }
                if x + 1 < w && is_fg(up + 1) {
                    union(&mut parent, i, up + 1);
                }
            }
        }
    }

    // Roots are the smallest index in their set, so visiting pixels in scan
    // order assigns slots in first-pixel order.
    let mut slot_of_root: Vec<Option<usize>> = vec![None; w * h];
    let mut components: Vec<Bounds> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !is_fg(i) {
                continue;
            }
            let root = find(&mut parent, i);
            match slot_of_root[root] {
                Some(slot) => {
                    let b = &mut components[slot];
                    b.min_x = b.min_x.min(x);
                    b.min_y = b.min_y.min(y);
                    b.max_x = b.max_x.max(x);
                    b.max_y = b.max_y.max(y);
                    b.pixels += 1;
                }
                None => {
                    slot_of_root[root] = Some(components.len());
                    components.push(Bounds {
                        min_x: x,
                        min_y: y,
                        max_x: x,
                        max_y: y,
                        pixels: 1,
                    });
                }
            }
        }
    }

    components
        .into_iter()
        .filter(|b| b.pixels > min_area)
        .map(|b| {
            MotionRegion::new(
                b.min_x as i32,
                b.min_y as i32,
                (b.max_x - b.min_x + 1) as i32,
                (b.max_y - b.min_y + 1) as i32,
            )
        })
        .collect()
}
