//=========================================================================
// Loading Screens
//=========================================================================
//
// Background and progress-bar views shown while the main loop is not
// drawing frames (startup, map loads, GL resets).
//
// Layout is pure: the view functions turn a size and some text into
// `HudItem`s, measured through the renderer's font metrics. The
// `LoadingScreen` state decides when to draw and remembers the last
// background so progress updates can redraw it.
//
// ```text
//   render_background ── 3x (draw + swap) ──> remember info
//   render_progress ──── [restore background] ──> bar ──> swap
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use super::render::{HudItem, HudTexture, LogoSize, Rect, RenderContext};
use crate::config::{EngineVars, Var};

/// Smallest view the loading screens are laid out for.
pub const MIN_BACKGROUND_SIZE: (i32, i32) = (1024, 768);

//=== LoadingHooks ========================================================

/// Game callbacks the loading screens need.
pub trait LoadingHooks {
    /// Silences sound while loading (with `menumute`).
    fn stop_sounds(&mut self) {}

    /// Services the network so long loads do not time out.
    fn keep_alive(&mut self) {}
}

//=== BackgroundInfo ======================================================

/// What the loading background shows besides the logo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundInfo {
    pub caption: Option<String>,
    /// The game supplied a map shot texture.
    pub mapshot: bool,
    pub mapname: Option<String>,
    pub mapinfo: Option<String>,
}

impl BackgroundInfo {
    pub fn caption(caption: &str) -> Self {
        Self { caption: Some(caption.to_string()), ..Self::default() }
    }
}

//=== Layout ==============================================================

/// Scales `size` up so both axes reach the minimum, keeping aspect.
///
/// Both axes use the larger of the two factors, rounded up. The factor
/// is kept as a fraction so exact fits stay exact.
pub fn background_resolution(w: i32, h: i32) -> (i32, i32) {
    let (min_w, min_h) = MIN_BACKGROUND_SIZE;
    let (w, h) = (i64::from(w.max(1)), i64::from(h.max(1)));
    let (min_w, min_h) = (i64::from(min_w), i64::from(min_h));

    let (mut num, mut den) = (1, 1);
    if w < min_w {
        (num, den) = (min_w, w);
    }
    if h < min_h && min_h * den > num * h {
        (num, den) = (min_h, h);
    }

    let scale = |v: i64| ((v * num + den - 1) / den) as i32;
    (scale(w), scale(h))
}

/// Largest logo the hardware can hold that is not wasted at this width.
pub fn choose_logo(max_texture: i32, logo_width: f32) -> LogoSize {
    if max_texture >= 1500 && logo_width >= 1150.0 {
        LogoSize::Large
    } else if max_texture >= 1024 && logo_width >= 600.0 {
        LogoSize::Medium
    } else {
        LogoSize::Small
    }
}

fn quad(texture: HudTexture, rect: Rect, uv: Rect) -> HudItem {
    HudItem::Quad { texture, rect, uv }
}

fn text(text: &str, x: f32, y: f32, scale: f32, wrap: Option<f32>) -> HudItem {
    HudItem::Text { text: text.to_string(), x, y, scale, wrap }
}

/// Background with tiled texture, shadow, logo, caption and map info.
pub fn background_view(
    size: (i32, i32),
    info: &BackgroundInfo,
    uv_offset: (f32, f32),
    metrics: &dyn RenderContext,
) -> Vec<HudItem> {
    let (w, h) = (size.0 as f32, size.1 as f32);
    let min = w.min(h);
    let font_h = metrics.font_height();
    let mut items = Vec::with_capacity(8);

    let tile = Rect::new(uv_offset.0, uv_offset.1, w * 0.67 / 256.0, h * 0.67 / 256.0);
    items.push(quad(HudTexture::Background, Rect::new(0.0, 0.0, w, h), tile));
    items.push(quad(HudTexture::Shadow, Rect::new(0.0, 0.0, w, h), Rect::UNIT));

    let lh = 0.2 * min;
    let lw = lh * (1500.0 / 320.0);
    let lx = 0.5 * (w - lw);
    let ly = 0.1 * lh;
    let logo = choose_logo(metrics.max_texture_size(), lw);
    items.push(quad(HudTexture::Logo(logo), Rect::new(lx, ly, lw, lh), Rect::UNIT));

    if let Some(caption) = &info.caption {
        let tw = metrics.text_width(caption);
        let tsz = 0.04 * min / font_h;
        let tx = 0.5 * (w - tw * tsz);
        let ty = h - 0.075 * 1.5 * min - font_h * tsz;
        items.push(text(caption, tx, ty, tsz, None));
    }

    if info.mapshot || info.mapname.is_some() {
        let info_width = 14.0 * font_h;
        let sz = 0.35 * min;
        let msz = (0.85 * min - sz) / (info_width + font_h);
        let mut x = 0.5 * w;
        let y = ly + lh - sz / 15.0;
        let (mut mx, mut my, mut mw) = (0.0, 0.0, 0.0);

        if let Some(mapinfo) = &info.mapinfo {
            mw = metrics.text_bounds(mapinfo, info_width).0;
            x -= 0.5 * mw * msz;
            if info.mapshot {
                x -= 0.5 * font_h * msz;
                mx = sz + font_h * msz;
            }
        }
        if info.mapshot {
            x -= 0.5 * sz;
            items.push(quad(HudTexture::MapShot, Rect::new(x, y, sz, sz), Rect::UNIT));
        }
        if let Some(mapname) = &info.mapname {
            let tw = metrics.text_width(mapname);
            let tsz = sz / (8.0 * font_h);
            let tx = (0.5 * (mw * msz - tw * tsz)).max(0.0);
            items.push(text(mapname, x + mx + tx, y, tsz, None));
            my = 1.5 * font_h * tsz;
        }
        if let Some(mapinfo) = &info.mapinfo {
            items.push(text(mapinfo, x + mx, y + my, msz, Some(info_width)));
        }
    }

    items
}

/// Progress frame with a three-part bar and optional label.
///
/// Centred near the bottom before the first rendered frame, tucked into
/// the top-right corner once the world is visible.
pub fn progress_view(
    size: (i32, i32),
    bar: f32,
    label: Option<&str>,
    rendered_frame: bool,
    metrics: &dyn RenderContext,
) -> Vec<HudItem> {
    let (w, h) = (size.0 as f32, size.1 as f32);
    let font_h = metrics.font_height();
    let mut items = Vec::with_capacity(5);

    let fh = 0.060 * w.min(h);
    let fw = fh * 15.0;
    let (fx, fy) = if rendered_frame {
        (w - fw - fh / 4.0, fh / 4.0)
    } else {
        (0.5 * (w - fw), h - fh * 1.5)
    };
    items.push(quad(HudTexture::LoadingFrame, Rect::new(fx, fy, fw, fh), Rect::UNIT));

    let cap = fw * 8.0 / 512.0;
    let bw = fw * (512.0 - 2.0 * 8.0) / 512.0;
    let bh = fh * 20.0 / 32.0;
    let bx = fx + cap;
    let by = fy + fh * 6.0 / 32.0;
    let (su1, su2) = (0.0 / 32.0, 8.0 / 32.0);
    let (eu1, eu2) = (24.0 / 32.0, 32.0 / 32.0);
    let (sw, ew) = (cap, cap);
    let mw = bw - sw - ew;
    let ex = bx + sw + (mw * bar).max(cap);

    if bar > 0.0 {
        let bar_quad = |x: f32, w: f32, u: f32, uw: f32| {
            quad(HudTexture::LoadingBar, Rect::new(x, by, w, bh), Rect::new(u, 0.0, uw, 1.0))
        };
        items.push(bar_quad(bx, sw, su1, su2 - su1));
        items.push(bar_quad(bx + sw, ex - (bx + sw), su2, eu1 - su2));
        items.push(bar_quad(ex, ew, eu1, eu2 - eu1));
    }

    if let Some(label) = label {
        let tw = metrics.text_width(label);
        let mut tsz = bh * 0.6 / font_h;
        if tw * tsz > mw {
            tsz = mw / tw;
        }
        items.push(text(label, bx + sw, by + (bh - font_h * tsz) / 2.0, tsz, None));
    }

    items
}

//=== LoadingScreen =======================================================

/// Drawing state shared between the frame loop and loading screens.
#[derive(Debug)]
pub struct LoadingScreen {
    /// The loop is between frames (loading screens may draw).
    pub between_frames: bool,

    /// A world frame has been presented since the last background.
    pub rendered_frame: bool,

    /// Progress updates pump the event queue (macOS stalls the window
    /// otherwise).
    pub pump_on_progress: bool,

    saved: BackgroundInfo,
    uv_offset: (f32, f32),
    last_update: Option<i32>,
    last_size: (i32, i32),
    rng: StdRng,
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            between_frames: false,
            rendered_frame: false,
            pump_on_progress: cfg!(target_os = "macos"),
            saved: BackgroundInfo::default(),
            uv_offset: (0.0, 0.0),
            last_update: None,
            last_size: (-1, -1),
            rng,
        }
    }

    pub fn saved_background(&self) -> &BackgroundInfo {
        &self.saved
    }

    /// Picks a new random texture offset when the view changed.
    fn update_offset(&mut self, size: (i32, i32), lastmillis: i32, main_menu: bool) {
        let new_frame = self.last_update != Some(lastmillis);
        if (self.rendered_frame && !main_menu && new_frame) || self.last_size != size {
            self.last_size = size;
            self.uv_offset = (self.rng.gen::<f32>(), self.rng.gen::<f32>());
        }
        self.last_update = Some(lastmillis);
    }

    fn draw_background(
        &mut self,
        render: &mut dyn RenderContext,
        size: (i32, i32),
        info: &BackgroundInfo,
        lastmillis: i32,
        main_menu: bool,
    ) {
        self.update_offset(size, lastmillis, main_menu);
        let items = background_view(size, info, self.uv_offset, &*render);
        render.draw_hud(size, &items);
    }
}

impl Default for LoadingScreen {
    fn default() -> Self {
        Self::new()
    }
}

//=== LoadingView =========================================================

/// Everything a loading screen draws with, borrowed from the engine.
pub struct LoadingView<'a> {
    pub screen: &'a mut LoadingScreen,
    pub render: &'a mut dyn RenderContext,
    pub vars: &'a EngineVars,
    pub hud: (i32, i32),
    pub lastmillis: i32,
    pub main_menu: bool,
    /// Pumps pending window events without dispatching them.
    pub pump: Option<&'a mut dyn FnMut()>,
}

impl LoadingView<'_> {
    /// Draws the loading background.
    ///
    /// Does nothing while a frame is being drawn unless forced. A forced
    /// draw is a single pass into the current frame; otherwise every
    /// buffer is filled and the info is kept for later progress updates.
    pub fn render_background(&mut self, info: BackgroundInfo, force: bool, hooks: &mut dyn LoadingHooks) {
        if !self.screen.between_frames && !force {
            return;
        }
        if self.vars.flag(Var::MenuMute) {
            hooks.stop_sounds();
        }

        let size = background_resolution(self.hud.0, self.hud.1);
        trace!(target: "render::loading", "Background {:?} at {}x{}", info.caption, size.0, size.1);

        if force {
            self.draw(size, &info);
            return;
        }

        for _ in 0..3 {
            self.draw(size, &info);
            self.render.swap_buffers(false);
        }

        self.screen.rendered_frame = false;
        self.screen.saved = info;
    }

    /// Draws a progress bar (0..1) with an optional label.
    pub fn render_progress(
        &mut self,
        bar: f32,
        label: Option<&str>,
        background: bool,
        hooks: &mut dyn LoadingHooks,
    ) {
        if !self.screen.between_frames {
            return;
        }
        hooks.keep_alive();
        if self.screen.pump_on_progress {
            if let Some(pump) = self.pump.as_deref_mut() {
                pump();
            }
        }

        let size = background_resolution(self.hud.0, self.hud.1);
        let force_background = self.vars.flag(Var::ProgressBackground);
        if background || force_background {
            self.restore_background(size, force_background);
        }

        let items = progress_view(size, bar, label, self.screen.rendered_frame, &*self.render);
        self.render.draw_hud(size, &items);
        self.render.swap_buffers(false);
    }

    /// Redraws the remembered background, or a blank one when forced
    /// after the world has been shown.
    fn restore_background(&mut self, size: (i32, i32), force: bool) {
        if self.screen.rendered_frame {
            if !force {
                return;
            }
            self.screen.rendered_frame = false;
            self.screen.saved = BackgroundInfo::default();
        }
        let info = self.screen.saved.clone();
        self.draw(size, &info);
    }

    fn draw(&mut self, size: (i32, i32), info: &BackgroundInfo) {
        self.screen.draw_background(&mut *self.render, size, info, self.lastmillis, self.main_menu);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeRenderer;

    #[derive(Default)]
    struct Hooks {
        stopped: u32,
        kept_alive: u32,
    }

    impl LoadingHooks for Hooks {
        fn stop_sounds(&mut self) {
            self.stopped += 1;
        }

        fn keep_alive(&mut self) {
            self.kept_alive += 1;
        }
    }

    fn seeded() -> LoadingScreen {
        LoadingScreen::with_rng(StdRng::seed_from_u64(7))
    }

    fn view<'a>(
        screen: &'a mut LoadingScreen,
        render: &'a mut FakeRenderer,
        vars: &'a EngineVars,
    ) -> LoadingView<'a> {
        LoadingView {
            screen,
            render,
            vars,
            hud: (1280, 720),
            lastmillis: 1,
            main_menu: true,
            pump: None,
        }
    }

    fn quads(items: &[HudItem], texture: HudTexture) -> usize {
        items
            .iter()
            .filter(|i| matches!(i, HudItem::Quad { texture: t, .. } if *t == texture))
            .count()
    }

    //=====================================================================
    // Layout
    //=====================================================================

    #[test]
    fn small_views_scaled_up_keeping_aspect() {
        assert_eq!(background_resolution(800, 600), (1024, 768));
        assert_eq!(background_resolution(512, 768), (1024, 1536));
        assert_eq!(background_resolution(1920, 1080), (1920, 1080));
        assert_eq!(background_resolution(1280, 720), (1366, 768));
    }

    #[test]
    fn logo_follows_texture_limit_and_width() {
        assert_eq!(choose_logo(4096, 1200.0), LogoSize::Large);
        assert_eq!(choose_logo(1024, 1200.0), LogoSize::Medium);
        assert_eq!(choose_logo(4096, 700.0), LogoSize::Medium);
        assert_eq!(choose_logo(4096, 500.0), LogoSize::Small);
        assert_eq!(choose_logo(512, 1200.0), LogoSize::Small);
    }

    #[test]
    fn background_has_tiles_shadow_logo_and_caption() {
        let render = FakeRenderer::new();
        let info = BackgroundInfo::caption("initializing...");

        let items = background_view((1024, 768), &info, (0.25, 0.5), &render);

        assert_eq!(items.len(), 4);
        match &items[0] {
            HudItem::Quad { texture: HudTexture::Background, uv, .. } => {
                assert_eq!((uv.x, uv.y), (0.25, 0.5));
                assert!((uv.w - 1024.0 * 0.67 / 256.0).abs() < 1e-4);
            }
            other => panic!("expected background quad, got {:?}", other),
        }
        assert!(matches!(&items[3], HudItem::Text { text, .. } if text == "initializing..."));
    }

    #[test]
    fn map_info_adds_shot_name_and_description() {
        let render = FakeRenderer::new();
        let info = BackgroundInfo {
            caption: None,
            mapshot: true,
            mapname: Some("complex".into()),
            mapinfo: Some("a map by someone".into()),
        };

        let items = background_view((1024, 768), &info, (0.0, 0.0), &render);

        assert_eq!(quads(&items, HudTexture::MapShot), 1);
        let wrapped = items
            .iter()
            .any(|i| matches!(i, HudItem::Text { wrap: Some(_), .. }));
        assert!(wrapped, "map info wraps");
    }

    #[test]
    fn empty_bar_draws_frame_only() {
        let render = FakeRenderer::new();
        let items = progress_view((1024, 768), 0.0, None, false, &render);
        assert_eq!(items.len(), 1);
        assert_eq!(quads(&items, HudTexture::LoadingFrame), 1);
    }

    #[test]
    fn bar_has_three_parts_and_label() {
        let render = FakeRenderer::new();
        let items = progress_view((1024, 768), 0.5, Some("loading"), false, &render);
        assert_eq!(quads(&items, HudTexture::LoadingBar), 3);
        assert!(matches!(items.last(), Some(HudItem::Text { .. })));
    }

    #[test]
    fn frame_moves_to_corner_after_world_shown() {
        let render = FakeRenderer::new();
        let frame_x = |rendered| match progress_view((1024, 768), 0.0, None, rendered, &render)[0] {
            HudItem::Quad { rect, .. } => (rect.x, rect.y),
            _ => unreachable!(),
        };

        let (cx, cy) = frame_x(false);
        let (tx, ty) = frame_x(true);
        assert!(tx > cx);
        assert!(ty < cy);
    }

    //=====================================================================
    // LoadingScreen
    //=====================================================================

    #[test]
    fn background_skipped_mid_frame() {
        let mut screen = seeded();
        let mut render = FakeRenderer::new();
        let vars = EngineVars::new();
        let mut hooks = Hooks::default();

        view(&mut screen, &mut render, &vars).render_background(
            BackgroundInfo::caption("x"),
            false,
            &mut hooks,
        );

        assert!(render.huds.is_empty());
        assert_eq!(hooks.stopped, 0);
    }

    #[test]
    fn background_fills_every_buffer() {
        let mut screen = seeded();
        screen.between_frames = true;
        screen.rendered_frame = true;
        let mut render = FakeRenderer::new();
        let vars = EngineVars::new();
        let mut hooks = Hooks::default();

        view(&mut screen, &mut render, &vars).render_background(
            BackgroundInfo::caption("loading map"),
            false,
            &mut hooks,
        );

        assert_eq!(render.huds.len(), 3);
        assert_eq!(render.swaps, vec![false, false, false]);
        assert_eq!(render.huds[0].0, (1366, 768), "laid out at background resolution");
        assert_eq!(hooks.stopped, 1, "menumute stops sounds");
        assert!(!screen.rendered_frame);
        assert_eq!(screen.saved_background().caption.as_deref(), Some("loading map"));
    }

    #[test]
    fn forced_background_draws_once_without_swap() {
        let mut screen = seeded();
        let mut render = FakeRenderer::new();
        let mut vars = EngineVars::new();
        vars.set(Var::MenuMute, 0).unwrap();
        let mut hooks = Hooks::default();

        view(&mut screen, &mut render, &vars).render_background(
            BackgroundInfo::caption("x"),
            true,
            &mut hooks,
        );

        assert_eq!(render.huds.len(), 1);
        assert!(render.swaps.is_empty());
        assert_eq!(hooks.stopped, 0);
        assert_eq!(screen.saved_background(), &BackgroundInfo::default());
    }

    #[test]
    fn progress_restores_saved_background() {
        let mut screen = seeded();
        screen.between_frames = true;
        let mut render = FakeRenderer::new();
        let vars = EngineVars::new();
        let mut hooks = Hooks::default();

        let mut v = view(&mut screen, &mut render, &vars);
        v.render_background(BackgroundInfo::caption("loading"), false, &mut hooks);
        v.render_progress(0.3, Some("textures"), true, &mut hooks);

        assert_eq!(hooks.kept_alive, 1);
        assert_eq!(render.huds.len(), 5, "3 backgrounds, restore, bar");
        assert_eq!(render.swaps.len(), 4);
        assert_eq!(quads(&render.huds[3].1, HudTexture::Background), 1);
        assert_eq!(quads(&render.huds[4].1, HudTexture::LoadingBar), 3);
    }

    #[test]
    fn progress_over_world_skips_background_unless_forced() {
        let mut screen = seeded();
        screen.between_frames = true;
        screen.rendered_frame = true;
        let mut render = FakeRenderer::new();
        let mut vars = EngineVars::new();
        let mut hooks = Hooks::default();

        view(&mut screen, &mut render, &vars).render_progress(0.5, None, true, &mut hooks);
        assert_eq!(render.huds.len(), 1);

        vars.set(Var::ProgressBackground, 1).unwrap();
        view(&mut screen, &mut render, &vars).render_progress(0.5, None, false, &mut hooks);
        assert_eq!(render.huds.len(), 3);
        assert!(!screen.rendered_frame);
    }

    #[test]
    fn progress_pumps_events_when_enabled() {
        let mut screen = seeded();
        screen.between_frames = true;
        let mut render = FakeRenderer::new();
        let vars = EngineVars::new();
        let mut hooks = Hooks::default();
        let mut pumps = 0;

        screen.pump_on_progress = false;
        let mut pump = || pumps += 1;
        let mut v = view(&mut screen, &mut render, &vars);
        v.pump = Some(&mut pump);
        v.render_progress(0.1, None, false, &mut hooks);
        v.screen.pump_on_progress = true;
        v.render_progress(0.2, None, false, &mut hooks);
        v.render_progress(0.3, None, false, &mut hooks);
        drop(v);

        assert_eq!(pumps, 2);
        assert_eq!(hooks.kept_alive, 3);
    }

    #[test]
    fn progress_skipped_mid_frame() {
        let mut screen = seeded();
        let mut render = FakeRenderer::new();
        let vars = EngineVars::new();
        let mut hooks = Hooks::default();

        view(&mut screen, &mut render, &vars).render_progress(0.5, None, true, &mut hooks);

        assert!(render.huds.is_empty());
        assert_eq!(hooks.kept_alive, 0);
    }

    #[test]
    fn texture_offset_only_changes_with_size_in_menu() {
        let mut screen = seeded();
        screen.update_offset((1024, 768), 1, true);
        let first = screen.uv_offset;

        screen.update_offset((1024, 768), 2, true);
        assert_eq!(screen.uv_offset, first);

        screen.update_offset((1280, 768), 2, true);
        assert_ne!(screen.uv_offset, first);
    }
}
