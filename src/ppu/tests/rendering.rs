//! PPU Rendering Tests
//!
//! Tests for background rendering and the color buffer:
//! - Backdrop output with rendering disabled
//! - Background tiles, attributes and fine X scroll
//! - Mask effects (left clipping, greyscale)

use super::*;

/// Fill the first nametable with `tile`
fn fill_nametable(ppu: &mut Ppu, tile: u8) {
    write_vram(ppu, 0x2000, &[tile; 960]);
}

/// Backdrop $0F, background palette 0 color 1 = $30, palette 1 color 1 = $16
fn load_palettes(ppu: &mut Ppu) {
    write_vram(ppu, 0x3F00, &[0x0F, 0x30, 0x00, 0x00, 0x0F, 0x16]);
}

/// Enable rendering with v and t at the top-left of nametable 0
fn start_rendering(ppu: &mut Ppu, mask: u8) {
    set_vram_address(ppu, 0x0000);
    ppu.write_register(PPUMASK, mask).unwrap();
}

// ========================================
// Rendering disabled
// ========================================

#[test]
fn test_rendering_disabled_outputs_backdrop_everywhere() {
    let mut ppu = create_test_ppu();
    write_vram(&mut ppu, 0x3F00, &[0x21]);
    set_vram_address(&mut ppu, 0x2000);

    run_frame(&mut ppu);

    let backdrop = palette_to_rgb(0x21);
    assert!(ppu.color_buffer().iter().all(|&color| color == backdrop));
    assert_eq!(ppu.color_buffer().len(), COLOR_BUFFER_SIZE);
}

#[test]
fn test_palette_hack_when_v_points_at_palette() {
    let mut ppu = create_test_ppu();
    write_vram(&mut ppu, 0x3F00, &[0x21, 0x00, 0x00, 0x00, 0x00, 0x16]);
    set_vram_address(&mut ppu, 0x3F05);

    run_frame(&mut ppu);

    assert_eq!(ppu.color_at(0, 0), palette_to_rgb(0x16));
    assert_eq!(ppu.color_at(120, 128), palette_to_rgb(0x16));
}

#[test]
fn test_greyscale_masks_color() {
    let mut ppu = create_test_ppu();
    write_vram(&mut ppu, 0x3F00, &[0x21]);
    set_vram_address(&mut ppu, 0x2000);
    ppu.write_register(PPUMASK, 0x01).unwrap();

    run_frame(&mut ppu);

    assert_eq!(ppu.color_at(100, 100), palette_to_rgb(0x20));
}

// ========================================
// Background
// ========================================

#[test]
fn test_solid_background() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    fill_nametable(&mut ppu, 1);
    load_palettes(&mut ppu);
    start_rendering(&mut ppu, 0x0A);

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    let tile_color = palette_to_rgb(0x30);
    let backdrop = palette_to_rgb(0x0F);
    for dot in 1..=256 {
        assert_eq!(ppu.color_at(100, dot), tile_color, "dot {}", dot);
    }
    assert_eq!(ppu.color_at(0, 1), tile_color);
    assert_eq!(ppu.color_at(239, 256), tile_color);

    // Cells outside the picture hold the backdrop
    assert_eq!(ppu.color_at(100, 0), backdrop);
    assert_eq!(ppu.color_at(100, 300), backdrop);
    assert_eq!(ppu.color_at(245, 50), backdrop);
}

#[test]
fn test_background_left_clipping() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    fill_nametable(&mut ppu, 1);
    load_palettes(&mut ppu);
    start_rendering(&mut ppu, 0x08);

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    assert_eq!(ppu.color_at(50, 1), palette_to_rgb(0x0F));
    assert_eq!(ppu.color_at(50, 8), palette_to_rgb(0x0F));
    assert_eq!(ppu.color_at(50, 9), palette_to_rgb(0x30));
}

#[test]
fn test_background_table_select() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x1000, 1);
    fill_nametable(&mut ppu, 1);
    load_palettes(&mut ppu);
    start_rendering(&mut ppu, 0x0A);

    run_frame(&mut ppu);
    assert_eq!(ppu.color_at(50, 50), palette_to_rgb(0x0F), "Table 0 is blank");

    ppu.write_register(PPUCTRL, 0x10).unwrap();
    run_frame(&mut ppu);
    assert_eq!(ppu.color_at(50, 50), palette_to_rgb(0x30));
}

#[test]
fn test_attribute_selects_palette_per_quadrant() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    fill_nametable(&mut ppu, 1);
    load_palettes(&mut ppu);
    // Top-left 16×16 quadrant of the first 32×32 block uses palette 1
    write_vram(&mut ppu, 0x23C0, &[0x01]);
    start_rendering(&mut ppu, 0x0A);

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    assert_eq!(ppu.color_at(5, 4), palette_to_rgb(0x16));
    assert_eq!(ppu.color_at(15, 16), palette_to_rgb(0x16));
    assert_eq!(ppu.color_at(5, 17), palette_to_rgb(0x30));
    assert_eq!(ppu.color_at(16, 4), palette_to_rgb(0x30));
}

#[test]
fn test_fine_x_scroll() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    load_palettes(&mut ppu);
    // Only the top-left tile is drawn
    write_vram(&mut ppu, 0x2000, &[1]);
    set_vram_address(&mut ppu, 0x0000);
    ppu.write_register(PPUSCROLL, 3).unwrap();
    ppu.write_register(PPUSCROLL, 0).unwrap();
    ppu.write_register(PPUMASK, 0x0A).unwrap();

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    let tile_color = palette_to_rgb(0x30);
    let backdrop = palette_to_rgb(0x0F);
    for x in 0..5 {
        assert_eq!(ppu.color_at(4, x + 1), tile_color, "x {}", x);
    }
    assert_eq!(ppu.color_at(4, 6), backdrop);
    assert_eq!(ppu.color_at(4, 253), backdrop);
    // Column 32 is column 0 of the horizontally adjacent nametable (a mirror here)
    assert_eq!(ppu.color_at(4, 254), tile_color);
    assert_eq!(ppu.color_at(8, 1), backdrop, "Second tile row is blank");
}

#[test]
fn test_coarse_y_scroll() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    load_palettes(&mut ppu);
    // Tile row 2, column 0
    write_vram(&mut ppu, 0x2040, &[1]);
    set_vram_address(&mut ppu, 0x0000);
    ppu.write_register(PPUSCROLL, 0).unwrap();
    ppu.write_register(PPUSCROLL, 16).unwrap();
    ppu.write_register(PPUMASK, 0x0A).unwrap();

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    assert_eq!(ppu.color_at(0, 1), palette_to_rgb(0x30));
    assert_eq!(ppu.color_at(7, 8), palette_to_rgb(0x30));
    assert_eq!(ppu.color_at(8, 1), palette_to_rgb(0x0F));
}

#[test]
fn test_visible_frame_crops_picture() {
    let mut ppu = create_test_ppu();
    draw_solid_tile(&mut ppu, 0x0000, 1);
    fill_nametable(&mut ppu, 1);
    load_palettes(&mut ppu);
    start_rendering(&mut ppu, 0x08);

    run_frame(&mut ppu);
    run_frame(&mut ppu);

    let frame = ppu.visible_frame();
    assert_eq!(frame.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    assert_eq!(frame[100 * SCREEN_WIDTH], ppu.color_at(100, 1));
    assert_eq!(frame[100 * SCREEN_WIDTH + 255], ppu.color_at(100, 256));
    assert_eq!(frame[0], palette_to_rgb(0x0F), "Left 8 pixels are clipped");
}
