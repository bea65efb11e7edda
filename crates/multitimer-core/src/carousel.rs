//! Vertical carousel keeping the selected timer centered.
//!
//! Geometry is pulled through [`Measure`] on every use, never cached, and
//! scrolling is delegated to a [`ScrollDriver`]. Scroll offsets are in
//! content coordinates where offset `i * item_height` centers item `i`; the
//! filler above the list makes that hold.
//!
//! Programmatic centering marks the viewport busy until scroll motion has
//! been quiet for the settle delay. While busy, scroll events only extend the
//! settle window and never change the selection, which breaks the
//! center -> scroll -> reselect feedback loop.

use crate::storage::CarouselConfig;
use crate::throttle::{Debounce, Throttle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Pull-based layout queries.
pub trait Measure {
    /// The scroll container. `None` until laid out.
    fn viewport(&self) -> Option<Rect>;

    /// Item `index` in list coordinates (excluding fillers). `None` if the
    /// item has not been laid out yet.
    fn item(&self, index: usize) -> Option<Rect>;

    /// Controls docked over the bottom of the viewport, if any.
    fn controls_overlay(&self) -> Option<Rect> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub index: usize,
    pub offset: f64,
    pub smooth: bool,
}

pub trait ScrollDriver {
    fn scroll_to(&mut self, request: ScrollRequest);
}

/// Filler heights around the list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    pub top_filler: f64,
    pub bottom_filler: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prominence {
    pub scale: f64,
    pub opacity: f64,
}

impl Prominence {
    pub const FULL: Self = Self {
        scale: 1.0,
        opacity: 1.0,
    };
    pub const DIMMED: Self = Self {
        scale: 0.85,
        opacity: 0.4,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselEvent {
    /// The user moved the selection by scrolling or swiping.
    SelectedIndexChanged(usize),
}

#[derive(Debug)]
pub struct CarouselViewport<M, D> {
    measure: M,
    driver: D,
    item_count: usize,
    selected: usize,
    mounted: bool,
    busy: bool,
    settle: Debounce,
    scroll_throttle: Throttle,
    gesture_throttle: Throttle,
    dead_zone_px: f64,
    visibility_window: usize,
    gesture_delta: f64,
    last_offset: f64,
    /// Centering that could not be measured yet: `(index, smooth)`.
    pending_center: Option<(usize, bool)>,
    geometry: ScrollGeometry,
}

impl<M: Measure, D: ScrollDriver> CarouselViewport<M, D> {
    pub fn new(
        measure: M,
        driver: D,
        item_count: usize,
        selected: usize,
        config: &CarouselConfig,
    ) -> Self {
        Self {
            measure,
            driver,
            item_count,
            selected: clamp_index(selected, item_count),
            mounted: false,
            busy: false,
            settle: Debounce::new(config.settle_delay_ms),
            scroll_throttle: Throttle::new(config.scroll_throttle_ms),
            gesture_throttle: Throttle::new(config.gesture_throttle_ms),
            dead_zone_px: config.gesture_dead_zone_px,
            visibility_window: config.visibility_window,
            gesture_delta: 0.0,
            last_offset: 0.0,
            pending_center: None,
            geometry: ScrollGeometry::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn geometry(&self) -> ScrollGeometry {
        self.geometry
    }

    /// True while a programmatic scroll is settling.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_pending_center(&self) -> bool {
        self.pending_center.is_some()
    }

    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Visual weight of item `index`. Items outside the window stay mounted
    /// but are dimmed.
    pub fn prominence(&self, index: usize) -> Prominence {
        if index.abs_diff(self.selected) <= self.visibility_window {
            Prominence::FULL
        } else {
            Prominence::DIMMED
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn mount(&mut self, now_ms: u64) {
        self.mounted = true;
        self.recompute_geometry();
        self.center(self.selected, true, now_ms);
    }

    /// Tear down. Pending throttles, settle timers and deferred centering
    /// are dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.busy = false;
        self.settle.cancel();
        self.scroll_throttle.cancel();
        self.gesture_throttle.cancel();
        self.pending_center = None;
        self.gesture_delta = 0.0;
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Programmatic selection change. Centers without emitting an event.
    pub fn set_selected_index(&mut self, index: usize, now_ms: u64) {
        let index = clamp_index(index, self.item_count);
        if index == self.selected {
            return;
        }
        self.selected = index;
        if self.mounted {
            self.recompute_geometry();
            self.center(index, true, now_ms);
        }
    }

    /// Raw scroll position report.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64) -> Option<CarouselEvent> {
        if !self.mounted {
            return None;
        }
        self.last_offset = offset;
        if self.busy {
            self.settle.touch(now_ms);
            return None;
        }
        if self.scroll_throttle.call(now_ms) {
            self.reconcile(offset)
        } else {
            None
        }
    }

    /// Touch or wheel delta. Positive moves toward later items.
    pub fn on_gesture(&mut self, delta: f64, now_ms: u64) -> Option<CarouselEvent> {
        if !self.mounted || self.item_count == 0 {
            return None;
        }
        self.gesture_delta += delta;
        if self.gesture_delta.abs() <= self.dead_zone_px {
            return None;
        }
        let forward = self.gesture_delta > 0.0;
        self.gesture_delta = 0.0;
        // One step per throttle window. The rest of the burst is dropped.
        if !self.gesture_throttle.try_fire(now_ms) {
            return None;
        }
        let target = if forward {
            (self.selected + 1).min(self.item_count - 1)
        } else {
            self.selected.saturating_sub(1)
        };
        if target == self.selected {
            return None;
        }
        self.selected = target;
        self.center(target, true, now_ms);
        tracing::debug!(index = target, "carousel stepped by gesture");
        Some(CarouselEvent::SelectedIndexChanged(target))
    }

    pub fn on_resize(&mut self, now_ms: u64) {
        if !self.mounted {
            return;
        }
        self.recompute_geometry();
        self.center(self.selected, false, now_ms);
    }

    pub fn set_item_count(&mut self, count: usize, now_ms: u64) {
        if count == self.item_count {
            return;
        }
        self.item_count = count;
        self.selected = clamp_index(self.selected, count);
        if self.mounted {
            self.recompute_geometry();
            self.center(self.selected, true, now_ms);
        }
    }

    /// The driver finished a smooth scroll. The settle window runs from now.
    pub fn on_animation_complete(&mut self, now_ms: u64) {
        if self.busy {
            self.settle.touch(now_ms);
        }
    }

    /// Run due deferred work: settle expiry, trailing scroll reconciliation
    /// and centering that was waiting for layout.
    pub fn poll(&mut self, now_ms: u64) -> Option<CarouselEvent> {
        if !self.mounted {
            return None;
        }
        if let Some((index, smooth)) = self.pending_center.take() {
            self.recompute_geometry();
            self.center(index, smooth, now_ms);
        }
        if self.busy && self.pending_center.is_none() && self.settle.poll(now_ms) {
            self.busy = false;
        }
        if !self.busy && self.scroll_throttle.poll(now_ms) {
            return self.reconcile(self.last_offset);
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reconcile(&mut self, offset: f64) -> Option<CarouselEvent> {
        if self.item_count == 0 {
            return None;
        }
        let height = self.measure.item(self.selected)?.height;
        if height <= 0.0 {
            return None;
        }
        let raw = (offset / height).floor();
        let index = if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.item_count - 1)
        };
        if index == self.selected {
            return None;
        }
        self.selected = index;
        tracing::debug!(index, offset, "carousel reconciled from scroll");
        Some(CarouselEvent::SelectedIndexChanged(index))
    }

    fn center(&mut self, index: usize, smooth: bool, now_ms: u64) {
        let (Some(viewport), Some(item)) = (self.measure.viewport(), self.measure.item(index))
        else {
            // Stay busy so scroll reports cannot reselect before centering.
            self.pending_center = Some((index, smooth));
            self.busy = true;
            return;
        };
        let offset = self.geometry.top_filler + item.center() - viewport.height / 2.0;
        self.busy = true;
        self.settle.touch(now_ms);
        self.scroll_throttle.cancel();
        self.driver.scroll_to(ScrollRequest {
            index,
            offset,
            smooth,
        });
    }

    fn recompute_geometry(&mut self) {
        let (Some(viewport), Some(active)) =
            (self.measure.viewport(), self.measure.item(self.selected))
        else {
            return;
        };
        let top_filler = (viewport.height / 2.0 - active.height / 2.0).max(0.0);
        let controls = self.measure.controls_overlay().map_or(0.0, |r| r.height);
        self.geometry = ScrollGeometry {
            top_filler,
            bottom_filler: (top_filler - controls).max(0.0),
        };
    }
}

fn clamp_index(index: usize, count: usize) -> usize {
    index.min(count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 100.0;

    #[derive(Debug)]
    struct Fixed {
        viewport: Option<Rect>,
        items: usize,
        controls: Option<Rect>,
    }

    impl Measure for Fixed {
        fn viewport(&self) -> Option<Rect> {
            self.viewport
        }

        fn item(&self, index: usize) -> Option<Rect> {
            (index < self.items).then(|| Rect::new(index as f64 * H, H))
        }

        fn controls_overlay(&self) -> Option<Rect> {
            self.controls
        }
    }

    #[derive(Debug, Default)]
    struct Recorder(Vec<ScrollRequest>);

    impl ScrollDriver for Recorder {
        fn scroll_to(&mut self, request: ScrollRequest) {
            self.0.push(request);
        }
    }

    fn carousel(items: usize, selected: usize) -> CarouselViewport<Fixed, Recorder> {
        let measure = Fixed {
            viewport: Some(Rect::new(0.0, 600.0)),
            items,
            controls: Some(Rect::new(520.0, 80.0)),
        };
        CarouselViewport::new(
            measure,
            Recorder::default(),
            items,
            selected,
            &CarouselConfig::default(),
        )
    }

    /// Mounted and settled, scroll throttle fresh.
    fn settled(items: usize) -> CarouselViewport<Fixed, Recorder> {
        let mut c = carousel(items, 0);
        c.mount(0);
        c.poll(10_000);
        assert!(!c.is_busy());
        c
    }

    #[test]
    fn mount_centers_selected_once() {
        let mut c = carousel(3, 1);
        c.mount(0);
        let calls = &c.driver().0;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].index, 1);
        assert_eq!(calls[0].offset, H);
        assert_eq!(c.geometry().top_filler, 300.0 - H / 2.0);
        assert_eq!(c.geometry().bottom_filler, 250.0 - 80.0);
    }

    #[test]
    fn scroll_of_one_item_height_selects_next() {
        let mut c = settled(3);
        assert_eq!(
            c.on_scroll(H, 20_000),
            Some(CarouselEvent::SelectedIndexChanged(1))
        );
    }

    #[test]
    fn scroll_just_short_of_item_height_does_not() {
        let mut c = settled(3);
        assert_eq!(c.on_scroll(H - 1.0, 20_000), None);
        assert_eq!(c.selected_index(), 0);
    }

    #[test]
    fn over_scroll_is_clamped() {
        let mut c = settled(3);
        assert_eq!(c.on_scroll(-1.0, 20_000), None);
        assert_eq!(
            c.on_scroll(H * 3.0 + 1.0, 30_000),
            Some(CarouselEvent::SelectedIndexChanged(2))
        );
    }

    #[test]
    fn programmatic_scroll_is_suppressed_until_settled() {
        let mut c = settled(3);
        c.set_selected_index(2, 20_000);
        assert!(c.is_busy());
        // Animation frames pass through index 1 on the way.
        assert_eq!(c.on_scroll(H * 1.5, 20_100), None);
        assert_eq!(c.on_scroll(H * 2.0, 20_300), None);
        c.poll(20_700);
        assert!(c.is_busy());
        c.poll(20_800);
        assert!(!c.is_busy());
        assert_eq!(c.selected_index(), 2);
    }

    #[test]
    fn throttled_scroll_reconciles_on_trailing_poll() {
        let mut c = settled(3);
        assert_eq!(c.on_scroll(10.0, 20_000), None);
        assert_eq!(c.on_scroll(H * 2.0, 20_050), None);
        assert_eq!(c.poll(20_100), None);
        assert_eq!(
            c.poll(20_150),
            Some(CarouselEvent::SelectedIndexChanged(2))
        );
    }

    #[test]
    fn gesture_dead_zone_and_throttle() {
        let mut c = settled(5);
        assert_eq!(c.on_gesture(6.0, 20_000), None);
        assert_eq!(
            c.on_gesture(6.0, 20_010),
            Some(CarouselEvent::SelectedIndexChanged(1))
        );
        // Same burst: no multi-step skip.
        assert_eq!(c.on_gesture(40.0, 20_050), None);
        assert_eq!(c.selected_index(), 1);
        assert_eq!(
            c.on_gesture(-20.0, 20_400),
            Some(CarouselEvent::SelectedIndexChanged(0))
        );
        assert_eq!(c.on_gesture(-20.0, 21_000), None);
    }

    #[test]
    fn centering_waits_for_layout() {
        let mut c = carousel(3, 1);
        c.measure_mut().viewport = None;
        c.mount(0);
        assert!(c.driver().0.is_empty());
        assert!(c.has_pending_center());
        c.measure_mut().viewport = Some(Rect::new(0.0, 600.0));
        c.poll(16);
        assert_eq!(c.driver().0.len(), 1);
        assert!(!c.has_pending_center());
    }

    #[test]
    fn scroll_before_layout_does_not_reselect() {
        let mut c = carousel(3, 1);
        c.measure_mut().viewport = None;
        c.mount(0);
        assert!(c.is_busy());
        assert_eq!(c.on_scroll(0.0, 100), None);
        assert_eq!(c.selected_index(), 1);

        // Still unmeasured long after the settle delay.
        assert_eq!(c.poll(5_000), None);
        assert!(c.is_busy());
        assert!(c.has_pending_center());

        c.measure_mut().viewport = Some(Rect::new(0.0, 600.0));
        c.poll(5_016);
        assert_eq!(c.driver().0.len(), 1);
        assert_eq!(c.driver().0[0].index, 1);
        c.poll(6_000);
        assert!(!c.is_busy());
        assert_eq!(c.selected_index(), 1);
    }

    #[test]
    fn shrinking_clamps_selection() {
        let mut c = settled(4);
        c.set_selected_index(3, 20_000);
        c.measure_mut().items = 2;
        c.set_item_count(2, 21_000);
        assert_eq!(c.selected_index(), 1);
    }

    #[test]
    fn prominence_window() {
        let mut c = settled(8);
        c.set_selected_index(4, 20_000);
        assert_eq!(c.prominence(4), Prominence::FULL);
        assert_eq!(c.prominence(2), Prominence::FULL);
        assert_eq!(c.prominence(7), Prominence::DIMMED);
        assert_eq!(c.prominence(0), Prominence::DIMMED);
    }

    #[test]
    fn unmount_cancels_pending_work() {
        let mut c = settled(3);
        c.on_scroll(10.0, 20_000);
        c.on_scroll(H * 2.0, 20_050);
        c.unmount();
        assert_eq!(c.poll(30_000), None);
        assert_eq!(c.on_scroll(H, 30_000), None);
    }
}
