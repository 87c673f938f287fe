use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as RandrExt;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

use crate::constants::{window, x11};
use crate::screenshot::{PixelLayout, Screenshot};
use crate::types::Vec2;

/// Open connection to the X server plus the default screen index
pub struct X11Context {
    pub conn: RustConnection,
    pub screen_num: usize,
}

impl X11Context {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .context("Failed to connect to X11 server. Is DISPLAY set correctly?")?;
        let ctx = Self { conn, screen_num };
        let screen = ctx.screen();
        info!(
            screen = screen_num,
            width = screen.width_in_pixels,
            height = screen.height_in_pixels,
            "Connected to X11 server"
        );
        Ok(ctx)
    }

    pub fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    pub fn root(&self) -> Window {
        self.screen().root
    }
}

/// Let the user click a window with a crosshair cursor.
/// Any key press cancels and picks the root window.
#[tracing::instrument(skip(ctx))]
pub fn select_window(ctx: &X11Context) -> Result<Window> {
    let conn = &ctx.conn;
    let root = ctx.root();

    let font = conn.generate_id().context("Failed to generate font ID")?;
    conn.open_font(font, x11::CURSOR_FONT)
        .context("Failed to open the core cursor font")?;
    let cursor = conn.generate_id().context("Failed to generate cursor ID")?;
    conn.create_glyph_cursor(
        cursor,
        font,
        font,
        x11::CROSSHAIR_GLYPH,
        x11::CROSSHAIR_GLYPH + 1,
        0,
        0,
        0,
        0xFFFF,
        0xFFFF,
        0xFFFF,
    )
    .context("Failed to create crosshair cursor")?;
    conn.close_font(font).context("Failed to close cursor font")?;

    let picked = grab_and_pick(conn, root, cursor);

    // Release the grabs even when picking failed
    conn.ungrab_pointer(CURRENT_TIME)
        .context("Failed to ungrab pointer")?;
    conn.ungrab_keyboard(CURRENT_TIME)
        .context("Failed to ungrab keyboard")?;
    conn.free_cursor(cursor).context("Failed to free crosshair cursor")?;
    conn.flush()
        .context("Failed to flush X11 connection after window selection")?;

    let window = picked?;
    info!(window = window, is_root = window == root, "Selected window");
    Ok(window)
}

fn grab_and_pick(conn: &RustConnection, root: Window, cursor: Cursor) -> Result<Window> {
    let pointer = conn
        .grab_pointer(
            false,
            root,
            EventMask::BUTTON_MOTION | EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
            root,
            cursor,
            CURRENT_TIME,
        )
        .context("Failed to grab pointer")?
        .reply()
        .context("Failed to get reply for pointer grab")?;
    if pointer.status != GrabStatus::SUCCESS {
        anyhow::bail!("Pointer is grabbed by another client ({:?})", pointer.status);
    }

    let keyboard = conn
        .grab_keyboard(false, root, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)
        .context("Failed to grab keyboard")?
        .reply()
        .context("Failed to get reply for keyboard grab")?;
    if keyboard.status != GrabStatus::SUCCESS {
        warn!(status = ?keyboard.status, "Keyboard grab failed, selection can't be cancelled with a key");
    }

    loop {
        match conn.wait_for_event().context("Failed to wait for X11 event")? {
            Event::ButtonPress(event) => {
                debug!(button = event.detail, child = event.child, "Button pressed during selection");
                // Clicking the desktop background reports no child
                return Ok(if event.child == x11rb::NONE { root } else { event.child });
            }
            Event::KeyPress(event) => {
                debug!(keycode = event.detail, "Selection cancelled, using root window");
                return Ok(root);
            }
            _ => (),
        }
    }
}

/// Grab the current contents of `window`
#[tracing::instrument(skip(ctx))]
pub fn capture_window(ctx: &X11Context, window: Window) -> Result<Screenshot> {
    let conn = &ctx.conn;
    let geom = conn
        .get_geometry(window)
        .context(format!("Failed to query geometry of window {}", window))?
        .reply()
        .context(format!("Failed to get geometry reply for window {}", window))?;

    let image = conn
        .get_image(
            ImageFormat::Z_PIXMAP,
            window,
            0,
            0,
            geom.width,
            geom.height,
            x11::ALL_PLANES,
        )
        .context(format!("Failed to request image of window {}", window))?
        .reply()
        .context(format!("Failed to get image of window {} (is it mapped and visible?)", window))?;

    let layout = pixel_layout(ctx, image.depth, image.visual, geom.width)?;
    debug!(layout = ?layout, bytes = image.data.len(), "Decoding screenshot");
    let screenshot = Screenshot::from_zpixmap(geom.width, geom.height, &image.data, layout)
        .context(format!("Failed to decode image of window {}", window))?;
    info!(window = window, width = screenshot.width, height = screenshot.height, "Captured screenshot");
    Ok(screenshot)
}

fn pixel_layout(ctx: &X11Context, depth: u8, visual: Visualid, width: u16) -> Result<PixelLayout> {
    let setup = ctx.conn.setup();
    let format = setup
        .pixmap_formats
        .iter()
        .find(|format| format.depth == depth)
        .with_context(|| format!("Server has no pixmap format for depth {depth}"))?;

    // Windows without their own visual inherit the root one
    let visual_id = if visual == x11rb::NONE { ctx.screen().root_visual } else { visual };
    let visual_type = setup
        .roots
        .iter()
        .flat_map(|screen| &screen.allowed_depths)
        .flat_map(|depth| &depth.visuals)
        .find(|v| v.visual_id == visual_id)
        .with_context(|| format!("Visual {visual_id} not found on the server"))?;
    check_visual_class(visual_type.class)?;

    Ok(PixelLayout {
        bits_per_pixel: format.bits_per_pixel,
        stride: PixelLayout::padded_stride(width, format.bits_per_pixel, format.scanline_pad),
        red_mask: visual_type.red_mask,
        green_mask: visual_type.green_mask,
        blue_mask: visual_type.blue_mask,
        msb_first: setup.image_byte_order == ImageOrder::MSB_FIRST,
    })
}

/// Only TrueColor pixels carry the color in their channel masks; DirectColor
/// pixels still index a colormap
fn check_visual_class(class: VisualClass) -> Result<()> {
    if class != VisualClass::TRUE_COLOR {
        anyhow::bail!("Unsupported visual class {class:?}, need TrueColor");
    }
    Ok(())
}

/// Refresh rate of the screen in Hz, 60 when RandR has no answer
pub fn monitor_refresh_rate(ctx: &X11Context) -> u16 {
    let rate = ctx
        .conn
        .randr_get_screen_info(ctx.root())
        .context("Failed to request RandR screen info")
        .and_then(|cookie| cookie.reply().context("Failed to get RandR screen info reply"));

    match rate {
        Ok(info) if info.rate > 0 => {
            info!(rate = info.rate, "Screen refresh rate");
            info.rate
        }
        Ok(_) => {
            warn!(fallback = window::FALLBACK_REFRESH_RATE, "RandR reported a 0 Hz refresh rate");
            window::FALLBACK_REFRESH_RATE
        }
        Err(e) => {
            warn!(error = %e, fallback = window::FALLBACK_REFRESH_RATE, "Could not query refresh rate");
            window::FALLBACK_REFRESH_RATE
        }
    }
}

/// Pointer position relative to the root window
pub fn pointer_position(ctx: &X11Context) -> Result<Vec2> {
    let pointer = ctx
        .conn
        .query_pointer(ctx.root())
        .context("Failed to query pointer")?
        .reply()
        .context("Failed to get reply for pointer query")?;
    Ok(Vec2::from((pointer.root_x, pointer.root_y)))
}
