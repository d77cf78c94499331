//! Magic wand selection using flood fill.
//!
//! Selects pixels whose color lies within a tolerance of the seed color,
//! either the region reachable from the seed (contiguous) or every matching
//! pixel in the image.
//!
//! Distance is always measured against the seed color, never a running
//! average, so a slow gradient cannot pull the region across it.

use crate::color::ColorSample;
use crate::config::WandSettings;
use crate::pixels::PixelBuffer;

/// Reusable traversal buffers, sized once per image.
///
/// Hover previews call the wand many times a second; keeping the queue and
/// the visited bits around avoids allocating `O(width * height)` per call.
#[derive(Debug, Clone)]
pub struct FloodScratch {
    queue: Vec<u32>,
    visited: Vec<u64>,
}

impl FloodScratch {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            queue: vec![0; pixel_count],
            visited: vec![0; pixel_count.div_ceil(64)],
        }
    }

    fn reset(&mut self, pixel_count: usize) {
        if self.queue.len() != pixel_count {
            *self = Self::new(pixel_count);
        } else {
            self.visited.fill(0);
        }
    }

    /// Mark a pixel; returns false if it was already marked.
    #[inline]
    fn mark(&mut self, index: usize) -> bool {
        let word = &mut self.visited[index >> 6];
        let bit = 1u64 << (index & 63);
        if *word & bit != 0 {
            return false;
        }
        *word |= bit;
        true
    }
}

/// Select pixels similar to the seed.
///
/// # Arguments
/// * `buffer` - Source pixels
/// * `scratch` - Traversal buffers for this image
/// * `seed_x`, `seed_y` - Seed coordinate in image pixels
/// * `settings` - Tolerance, color space, connectivity, contiguous flag
///
/// # Returns
/// Sorted pixel indices. Empty when the seed is outside the image.
pub fn magic_wand_select(
    buffer: &PixelBuffer,
    scratch: &mut FloodScratch,
    seed_x: i64,
    seed_y: i64,
    settings: &WandSettings,
) -> Vec<usize> {
    if !buffer.contains(seed_x, seed_y) {
        return Vec::new();
    }

    let seed_index = buffer.index_of(seed_x as usize, seed_y as usize);
    let seed = buffer.sample(seed_index, settings.color_space);

    let mut selected = if settings.contiguous {
        flood_contiguous(buffer, scratch, seed_index, &seed, settings)
    } else {
        select_global(buffer, &seed, settings)
    };

    // Canonical order regardless of traversal
    selected.sort_unstable();
    selected
}

#[inline]
fn matches(buffer: &PixelBuffer, index: usize, seed: &ColorSample, settings: &WandSettings) -> bool {
    buffer.sample(index, settings.color_space).distance(seed) <= settings.tolerance
}

/// Breadth-first flood from the seed.
///
/// Pixels are marked visited when enqueued and tested when dequeued; only an
/// accepted pixel pushes its neighbors. Each pixel enters the queue at most
/// once, so a queue of `width * height` slots never overflows.
fn flood_contiguous(
    buffer: &PixelBuffer,
    scratch: &mut FloodScratch,
    seed_index: usize,
    seed: &ColorSample,
    settings: &WandSettings,
) -> Vec<usize> {
    let width = buffer.width() as i64;
    let height = buffer.height() as i64;
    scratch.reset(buffer.len());

    let mut selected = Vec::new();
    let mut head = 0usize;
    let mut tail = 0usize;

    scratch.mark(seed_index);
    scratch.queue[tail] = seed_index as u32;
    tail += 1;

    while head < tail {
        let index = scratch.queue[head] as usize;
        head += 1;

        if !matches(buffer, index, seed, settings) {
            continue;
        }
        selected.push(index);

        let x = (index as i64) % width;
        let y = (index as i64) / width;
        for &(dx, dy) in settings.connectivity.offsets() {
            let nx = x + dx as i64;
            let ny = y + dy as i64;
            if nx < 0 || nx >= width || ny < 0 || ny >= height {
                continue;
            }
            let nidx = (ny * width + nx) as usize;
            if scratch.mark(nidx) {
                scratch.queue[tail] = nidx as u32;
                tail += 1;
            }
        }
    }

    selected
}

/// Every matching pixel, adjacency ignored.
fn select_global(buffer: &PixelBuffer, seed: &ColorSample, settings: &WandSettings) -> Vec<usize> {
    (0..buffer.len())
        .filter(|&index| matches(buffer, index, seed, settings))
        .collect()
}
