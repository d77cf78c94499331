//! Edge-snapping lasso.
//!
//! A session is `Idle` or `Drawing`. While drawing, the path is a list of
//! fixed anchors plus a live preview running from the last anchor toward the
//! cursor. Every preview update samples the straight line anchor -> cursor
//! about every `snap_radius / 2` pixels, snaps each sample to the strongest
//! nearby edge, and blends the result with the previous preview using
//! `w(i) = (i / (N - 1))^1.5`: the old path holds near the anchor, the new one
//! takes over toward the cursor.
//!
//! Snapping is a greedy local-maximum search per sample. No shortest-path
//! search happens anywhere.
//!
//! Moving the cursor back over the preview retracts it one point per update
//! (progressive undo).

use std::collections::VecDeque;

use log::{debug, trace};

use super::edge_field::EdgeField;
use super::Point;
use crate::config::LassoSettings;

/// Raw cursor positions kept for the current session.
pub const TRACE_CAPACITY: usize = 64;

/// Blend weight of the fresh path at index `i` of `n` points.
#[inline]
pub fn elastic_weight(i: usize, n: usize) -> f32 {
    if n < 2 {
        return 1.0;
    }
    (i as f32 / (n - 1) as f32).powf(1.5)
}

/// Round and clamp a point into the field's pixel grid.
fn to_pixel(field: &EdgeField, point: Point) -> Point {
    let max_x = field.width().saturating_sub(1) as f32;
    let max_y = field.height().saturating_sub(1) as f32;
    Point::new(
        point.x.round().clamp(0.0, max_x),
        point.y.round().clamp(0.0, max_y),
    )
}

/// Strongest edge pixel within `snap_radius` of `point` (square window).
///
/// Only pixels stronger than `snap_threshold * 255` qualify; ties keep the
/// first one in row-major order. Without a qualifying pixel the rounded
/// input comes back unchanged.
pub fn snap_to_edge(field: &EdgeField, settings: &LassoSettings, point: Point) -> Point {
    let center = to_pixel(field, point);
    if field.width() == 0 || field.height() == 0 {
        return center;
    }

    let r = settings.snap_radius as usize;
    let (cx, cy) = (center.x as usize, center.y as usize);
    let x0 = cx.saturating_sub(r);
    let y0 = cy.saturating_sub(r);
    let x1 = (cx + r).min(field.width() - 1);
    let y1 = (cy + r).min(field.height() - 1);

    let mut best = None;
    let mut best_strength = settings.snap_threshold * 255.0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let s = field.strength(x, y);
            if s > best_strength {
                best_strength = s;
                best = Some(Point::new(x as f32, y as f32));
            }
        }
    }

    best.unwrap_or(center)
}

/// Snap when edge snapping is on, otherwise just round onto the grid.
fn place(field: &EdgeField, settings: &LassoSettings, point: Point) -> Point {
    if settings.edge_snapping {
        snap_to_edge(field, settings, point)
    } else {
        to_pixel(field, point)
    }
}

/// Approximate boundary following between two points.
///
/// Both ends are first moved onto the pixel grid, so a stray pointer far
/// outside the image costs no more than a trip across it. The segment is then
/// split into steps of about `snap_radius / 2` and each sample is placed
/// independently. The start point itself is not included; repeated
/// consecutive points are dropped.
pub fn find_edge_path(field: &EdgeField, settings: &LassoSettings, p1: Point, p2: Point) -> Vec<Point> {
    let p1 = to_pixel(field, p1);
    let p2 = to_pixel(field, p2);
    let distance = p1.distance(p2);
    let mut path = Vec::new();
    if distance < f32::EPSILON {
        return path;
    }

    let steps = (distance / settings.sample_step()).ceil().max(1.0) as usize;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let placed = place(field, settings, p1.lerp(p2, t));
        if path.last() != Some(&placed) {
            path.push(placed);
        }
    }
    path
}

/// Drop consecutive duplicates, including the wrap-around pair.
fn dedup_closed(path: &mut Vec<Point>) {
    path.dedup();
    while path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
}

/// Path data of an active session.
///
/// The first anchor is stored apart from the rest so a drawing session can
/// never be without one.
#[derive(Debug, Clone)]
pub struct LassoPath {
    settings: LassoSettings,
    first_anchor: Point,
    anchors: Vec<Point>,
    preview: Vec<Point>,
    trace: VecDeque<Point>,
}

impl LassoPath {
    fn new(settings: LassoSettings, first_anchor: Point) -> Self {
        Self {
            settings,
            first_anchor,
            anchors: Vec::new(),
            preview: Vec::new(),
            trace: VecDeque::with_capacity(TRACE_CAPACITY),
        }
    }

    pub fn settings(&self) -> &LassoSettings {
        &self.settings
    }

    /// All anchors in order, first one included.
    pub fn anchors(&self) -> Vec<Point> {
        std::iter::once(self.first_anchor)
            .chain(self.anchors.iter().copied())
            .collect()
    }

    pub fn anchor_count(&self) -> usize {
        1 + self.anchors.len()
    }

    pub fn first_anchor(&self) -> Point {
        self.first_anchor
    }

    pub fn last_anchor(&self) -> Point {
        self.anchors.last().copied().unwrap_or(self.first_anchor)
    }

    pub fn preview(&self) -> &[Point] {
        &self.preview
    }

    pub fn trace(&self) -> impl Iterator<Item = &Point> {
        self.trace.iter()
    }

    fn record(&mut self, point: Point) {
        if self.trace.len() == TRACE_CAPACITY {
            self.trace.pop_front();
        }
        self.trace.push_back(point);
    }

    /// Progressive undo: drop the trailing preview point when the cursor sits
    /// on an interior point of the preview.
    ///
    /// "On" means closer to that point than the spacing to its successor and
    /// closer to it than to the trailing point.
    fn retract_toward(&mut self, cursor: Point) -> bool {
        let len = self.preview.len();
        if len < 3 {
            return false;
        }

        let last = len - 1;
        let nearest = (1..last)
            .map(|i| (i, cursor.distance(self.preview[i])))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((i, d)) = nearest else {
            return false;
        };
        let spacing = self.preview[i].distance(self.preview[i + 1]);
        if d < spacing && d < cursor.distance(self.preview[last]) {
            self.preview.pop();
            return true;
        }
        false
    }

    fn update(&mut self, field: &EdgeField, cursor: Point) {
        self.record(cursor);

        if self.retract_toward(cursor) {
            trace!("lasso preview retracted to {} points", self.preview.len());
            return;
        }

        let fresh = find_edge_path(field, &self.settings, self.last_anchor(), cursor);
        self.preview = blend_paths(&self.preview, fresh);
    }

    fn commit_node(&mut self) -> Option<Point> {
        let terminal = self.preview.last().copied()?;
        self.anchors.push(terminal);
        self.preview.clear();
        Some(terminal)
    }

    /// The closed path this session encloses, or `None` if it encloses no area.
    ///
    /// Edge paths join consecutive anchors, the live preview follows the last
    /// anchor, and a final edge path returns to the first anchor.
    pub fn closed_path(&self, field: &EdgeField) -> Option<Vec<Point>> {
        let control_points = self.anchor_count() + usize::from(!self.preview.is_empty());
        if self.anchor_count() < 2 || control_points < 3 {
            return None;
        }

        let anchors = self.anchors();
        let mut path = Vec::new();
        for pair in anchors.windows(2) {
            path.push(pair[0]);
            path.extend(find_edge_path(field, &self.settings, pair[0], pair[1]));
        }
        path.push(self.last_anchor());
        path.extend_from_slice(&self.preview);

        let tail = path.last().copied().unwrap_or(self.first_anchor);
        path.extend(find_edge_path(field, &self.settings, tail, self.first_anchor));

        dedup_closed(&mut path);
        (path.len() >= 3).then_some(path)
    }
}

/// Point-by-point blend of the previous preview with a fresh candidate.
///
/// The result has the fresh path's length. Fresh points past the end of the
/// old path are taken as-is.
pub fn blend_paths(old: &[Point], fresh: Vec<Point>) -> Vec<Point> {
    if old.is_empty() {
        return fresh;
    }
    let n = fresh.len();
    fresh
        .iter()
        .enumerate()
        .map(|(i, &new)| match old.get(i) {
            Some(&prev) => prev.lerp(new, elastic_weight(i, n)).rounded(),
            None => new,
        })
        .collect()
}

/// Close an externally supplied path the same way a drawn one is closed.
///
/// Points are moved onto the pixel grid but not snapped; only the closing
/// segment back to the first point follows edges.
pub fn close_external_path(field: &EdgeField, settings: &LassoSettings, points: &[Point]) -> Option<Vec<Point>> {
    let mut path: Vec<Point> = points.iter().map(|&p| to_pixel(field, p)).collect();
    path.dedup();
    if path.len() < 3 {
        return None;
    }
    let (&first, &tail) = (path.first()?, path.last()?);
    path.extend(find_edge_path(field, settings, tail, first));

    dedup_closed(&mut path);
    (path.len() >= 3).then_some(path)
}

/// Lasso session state.
#[derive(Debug, Clone, Default)]
pub enum LassoState {
    #[default]
    Idle,
    Drawing(LassoPath),
}

/// Lasso session controller.
#[derive(Debug, Clone, Default)]
pub struct Lasso {
    state: LassoState,
}

impl Lasso {
    pub fn state(&self) -> &LassoState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, LassoState::Drawing(_))
    }

    pub fn path(&self) -> Option<&LassoPath> {
        match &self.state {
            LassoState::Drawing(path) => Some(path),
            LassoState::Idle => None,
        }
    }

    /// Idle -> Drawing. An in-progress session is discarded.
    pub fn start(&mut self, field: &EdgeField, settings: LassoSettings, point: Point) -> Point {
        let anchor = place(field, &settings, point);
        if self.is_drawing() {
            debug!("lasso restarted, previous session discarded");
        }
        debug!("lasso started at ({}, {})", anchor.x, anchor.y);
        self.state = LassoState::Drawing(LassoPath::new(settings, anchor));
        anchor
    }

    /// Recompute the live preview for a cursor position. No-op when idle.
    pub fn update_live_preview(&mut self, field: &EdgeField, point: Point) {
        if let LassoState::Drawing(path) = &mut self.state {
            path.update(field, point);
        }
    }

    /// Pin the preview's terminal point as a new anchor.
    pub fn commit_node(&mut self) -> Option<Point> {
        let LassoState::Drawing(path) = &mut self.state else {
            return None;
        };
        let anchor = path.commit_node()?;
        debug!("lasso anchor {} at ({}, {})", path.anchor_count(), anchor.x, anchor.y);
        Some(anchor)
    }

    /// Drawing -> Idle, returning the closed path to fill if it encloses any.
    pub fn finish(&mut self, field: &EdgeField) -> Option<Vec<Point>> {
        match std::mem::take(&mut self.state) {
            LassoState::Drawing(path) => path.closed_path(field),
            LassoState::Idle => None,
        }
    }

    /// Drawing -> Idle, keeping the session's settings for closing an
    /// external path.
    pub fn take_settings(&mut self) -> Option<LassoSettings> {
        match std::mem::take(&mut self.state) {
            LassoState::Drawing(path) => Some(path.settings),
            LassoState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        if self.is_drawing() {
            debug!("lasso cancelled");
        }
        self.state = LassoState::Idle;
    }
}
