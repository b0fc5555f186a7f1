// PPU module - Picture Processing Unit (2C02) emulation
//
// The engine advances one dot per `step`. Timing lives in the event tables
// (`events.rs`); the operations those events trigger live in `rendering.rs`
// (background pipeline and pixel output) and `sprites.rs` (sprite
// evaluation and fetch). `registers.rs` is the CPU-facing side.

mod bus;
mod constants;
mod events;
mod palette;
mod registers;
mod rendering;
mod scroll;
mod sprites;
mod state;

#[cfg(test)]
mod tests;

pub use bus::{mirror_address, PpuBus};
pub use constants::{
    DOTS_PER_FRAME, DOTS_PER_SCANLINE, SCANLINES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH,
};
pub use events::{Event, EventTables, ScanlineKind, EVENTS_PER_DOT};
pub use palette::{palette_to_rgb, Rgb, NES_PALETTE};
pub use scroll::VramAddress;
pub use state::PpuState;

use constants::*;

use crate::cartridge::SharedMapper;
use crate::config::{PpuConfig, SpriteOverflow};
use crate::interrupt::InterruptLine;

/// Number of cells in the color buffer (one per dot of every scanline)
pub const COLOR_BUFFER_SIZE: usize = DOTS_PER_FRAME as usize;

/// PPU structure representing the Picture Processing Unit state
pub struct Ppu {
    // ========================================
    // CPU-visible registers
    // ========================================
    /// PPUCTRL ($2000)
    pub(crate) ppuctrl: u8,
    /// PPUMASK ($2001)
    pub(crate) ppumask: u8,
    /// PPUSTATUS ($2002)
    pub(crate) ppustatus: u8,
    /// OAMADDR ($2003)
    pub(crate) oam_addr: u8,
    /// Last page written to OAMDMA ($4014)
    pub(crate) oam_dma: u8,
    /// Last value driven on the CPU data bus; write-only registers read it back
    pub(crate) io_databus: u8,
    /// PPUDATA read buffer
    pub(crate) read_buffer: u8,

    // ========================================
    // Scroll state
    // ========================================
    /// Current VRAM address (v)
    pub(crate) v: VramAddress,
    /// Temporary VRAM address (t)
    pub(crate) t: VramAddress,
    /// Fine X scroll (3 bits)
    pub(crate) fine_x: u8,
    /// Write toggle (w): false = first write, true = second write
    pub(crate) write_latch: bool,

    // ========================================
    // Background pipeline
    // ========================================
    pub(crate) nametable_latch: u8,
    /// Attribute palette (2 bits) for the tile being fetched
    pub(crate) attribute_latch: u8,
    /// Low and high pattern planes for the tile being fetched
    pub(crate) pattern_latches: [u8; 2],
    /// Pattern shift registers; high byte is the tile being drawn, low byte the next tile
    pub(crate) pattern_shift: [u16; 2],
    /// Attribute shift registers, expanded to one bit per pixel
    pub(crate) attribute_shift: [u16; 2],

    // ========================================
    // Object memory
    // ========================================
    /// Primary OAM (64 sprites × 4 bytes)
    pub(crate) oam: [u8; OAM_SIZE],
    /// Secondary OAM (8 sprites × 4 bytes) for the next scanline
    pub(crate) secondary_oam: [u8; SECONDARY_OAM_SIZE],
    /// Sprites copied into secondary OAM so far
    pub(crate) sprite_eval_count: usize,
    /// Sprite 0 was copied into secondary OAM
    pub(crate) sprite_zero_next: bool,
    /// Byte offset of the buggy overflow scan
    pub(crate) overflow_offset: usize,
    /// The overflow scan already found its ninth sprite
    pub(crate) overflow_found: bool,
    /// Sprite output units for the scanline being drawn
    pub(crate) sprite_count: usize,
    pub(crate) sprite_zero_current: bool,
    pub(crate) sprite_patterns: [[u8; 2]; MAX_SPRITES_PER_LINE],
    pub(crate) sprite_attributes: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) sprite_x: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) overflow_mode: SpriteOverflow,

    // ========================================
    // VBlank race latches
    // ========================================
    /// Skip setting the VBlank flag on the next VBlank dot
    pub(crate) suppress_vbl: bool,
    /// Skip asserting NMI on the next VBlank dot
    pub(crate) suppress_nmi: bool,

    // ========================================
    // Timing
    // ========================================
    pub(crate) cycles: u64,
    /// Current scanline (0-261)
    pub(crate) scanline: u16,
    /// Current dot (0-340); the dot that the next `step` executes
    pub(crate) dot: u16,
    pub(crate) odd_frame: bool,
    pub(crate) frame_count: u64,
    /// Set by the odd-frame skip event; ends the frame one dot early
    pub(crate) skip_pending: bool,

    /// Output color buffer, `SCANLINES_PER_FRAME` rows of `DOTS_PER_SCANLINE` cells
    pub(crate) color_buffer: Vec<Rgb>,

    pub(crate) bus: PpuBus,
    pub(crate) interrupt: InterruptLine,
    events: EventTables,
}

impl Ppu {
    /// Create a new PPU over a cartridge mapper, raising NMI on `interrupt`
    pub fn new(mapper: SharedMapper, interrupt: InterruptLine) -> Self {
        Self::with_config(mapper, interrupt, &PpuConfig::default())
    }

    /// Create a new PPU with explicit configuration
    pub fn with_config(mapper: SharedMapper, interrupt: InterruptLine, config: &PpuConfig) -> Self {
        Ppu {
            ppuctrl: 0,
            ppumask: 0,
            ppustatus: 0,
            oam_addr: 0,
            oam_dma: 0,
            io_databus: 0,
            read_buffer: 0,
            v: VramAddress::default(),
            t: VramAddress::default(),
            fine_x: 0,
            write_latch: false,
            nametable_latch: 0,
            attribute_latch: 0,
            pattern_latches: [0; 2],
            pattern_shift: [0; 2],
            attribute_shift: [0; 2],
            oam: [0; OAM_SIZE],
            secondary_oam: [0xFF; SECONDARY_OAM_SIZE],
            sprite_eval_count: 0,
            sprite_zero_next: false,
            overflow_offset: 0,
            overflow_found: false,
            sprite_count: 0,
            sprite_zero_current: false,
            sprite_patterns: [[0; 2]; MAX_SPRITES_PER_LINE],
            sprite_attributes: [0; MAX_SPRITES_PER_LINE],
            sprite_x: [0xFF; MAX_SPRITES_PER_LINE],
            overflow_mode: config.sprites.overflow,
            suppress_vbl: false,
            suppress_nmi: false,
            cycles: 0,
            scanline: 0,
            dot: 0,
            odd_frame: false,
            frame_count: 0,
            skip_pending: false,
            color_buffer: vec![palette_to_rgb(0); COLOR_BUFFER_SIZE],
            bus: PpuBus::new(mapper),
            interrupt,
            events: EventTables::build(),
        }
    }

    /// Power-cycle the PPU
    ///
    /// Registers, latches, OAM, counters and VRAM return to zero. The color
    /// buffer keeps the last picture and the event tables are untouched.
    pub fn reset(&mut self) {
        log::debug!("PPU reset at frame {}", self.frame_count);

        self.ppuctrl = 0;
        self.ppumask = 0;
        self.ppustatus = 0;
        self.oam_addr = 0;
        self.oam_dma = 0;
        self.io_databus = 0;
        self.read_buffer = 0;
        self.v = VramAddress::default();
        self.t = VramAddress::default();
        self.fine_x = 0;
        self.write_latch = false;
        self.nametable_latch = 0;
        self.attribute_latch = 0;
        self.pattern_latches = [0; 2];
        self.pattern_shift = [0; 2];
        self.attribute_shift = [0; 2];
        self.oam = [0; OAM_SIZE];
        self.secondary_oam = [0xFF; SECONDARY_OAM_SIZE];
        self.sprite_eval_count = 0;
        self.sprite_zero_next = false;
        self.overflow_offset = 0;
        self.overflow_found = false;
        self.clear_sprite_units();
        self.suppress_vbl = false;
        self.suppress_nmi = false;
        self.cycles = 0;
        self.scanline = 0;
        self.dot = 0;
        self.odd_frame = false;
        self.frame_count = 0;
        self.skip_pending = false;
        self.bus.reset();
    }

    /// Advance the PPU by one dot
    ///
    /// Runs the events scheduled for the current (scanline, dot), emits the
    /// color for that cell and moves to the next dot.
    ///
    /// # Returns
    ///
    /// `true` when this dot completed a frame
    pub fn step(&mut self) -> bool {
        let kind = ScanlineKind::of(self.scanline);
        let events = self.events.list(kind, self.dot);

        for &event in events.as_slice() {
            self.execute(event);
        }

        self.output_dot(kind);
        self.advance()
    }

    fn execute(&mut self, event: Event) {
        match event {
            Event::Idle => {}
            Event::ClearFlags => self.clear_frame_flags(),
            Event::SetVblank => self.enter_vblank(),
            Event::BeginSpriteLine => self.begin_sprite_line(),

            // Everything below only happens while rendering
            _ if !self.rendering_enabled() => {}

            Event::FetchName => self.fetch_name(),
            Event::FetchAttribute => self.fetch_attribute(),
            Event::FetchPatternLo => self.fetch_pattern(0),
            Event::FetchPatternHi => self.fetch_pattern(1),
            Event::ShiftRegisters => self.shift_registers(),
            Event::ReloadShifters => self.reload_shifters(),
            Event::IncrementX => self.v.increment_x(),
            Event::IncrementY => self.v.increment_y(),
            Event::CopyX => self.v.copy_x(self.t),
            Event::CopyY => self.v.copy_y(self.t),
            Event::ClearOamAddr => self.oam_addr = 0,
            Event::ClearSecondaryOam => self.clear_secondary_oam(),
            Event::EvaluateSprite => self.evaluate_sprite(),
            Event::FetchSprite => self.fetch_sprite(),
            Event::SkipCycle => {
                if self.odd_frame {
                    log::trace!("Odd frame {}: skipping last pre-render dot", self.frame_count);
                    self.skip_pending = true;
                }
            }
        }
    }

    /// Pre-render dot 1: a new frame starts with clean status flags
    fn clear_frame_flags(&mut self) {
        self.ppustatus &= !(STATUS_VBLANK | STATUS_SPRITE_ZERO_HIT | STATUS_SPRITE_OVERFLOW);
        self.clear_sprite_units();
    }

    /// VBlank dot: set the flag and raise NMI unless a status read raced it
    fn enter_vblank(&mut self) {
        if self.suppress_vbl {
            log::trace!("VBlank suppressed by status read in frame {}", self.frame_count);
        } else {
            self.ppustatus |= STATUS_VBLANK;

            let nmi_enabled = self.ppuctrl & CTRL_NMI_ENABLE != 0;
            if nmi_enabled && !self.suppress_nmi {
                self.interrupt.assert();
            }
            log::trace!(
                "VBlank in frame {} (NMI {})",
                self.frame_count,
                if !nmi_enabled {
                    "disabled"
                } else if self.suppress_nmi {
                    "suppressed"
                } else {
                    "asserted"
                }
            );
        }

        // One-dot window: consumed whether or not they fired
        self.suppress_vbl = false;
        self.suppress_nmi = false;
    }

    fn advance(&mut self) -> bool {
        self.cycles += 1;

        if self.skip_pending {
            self.skip_pending = false;
            self.dot = DOTS_PER_SCANLINE - 1;
        }

        self.dot += 1;
        if self.dot < DOTS_PER_SCANLINE {
            return false;
        }

        self.dot = 0;
        self.scanline += 1;
        if self.scanline < SCANLINES_PER_FRAME {
            return false;
        }

        self.scanline = 0;
        self.odd_frame = !self.odd_frame;
        self.frame_count += 1;
        true
    }

    // ========================================
    // Queries
    // ========================================

    /// Whether background or sprite rendering is enabled in PPUMASK
    pub fn rendering_enabled(&self) -> bool {
        self.ppumask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    /// Whether the PPU is drawing right now (rendering enabled on a visible or pre-render line)
    pub fn is_rendering(&self) -> bool {
        self.rendering_enabled()
            && matches!(
                ScanlineKind::of(self.scanline),
                ScanlineKind::Visible | ScanlineKind::PreRender
            )
    }

    /// Current scanline (0-261)
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340)
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Dots executed since power-on
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Frames completed since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Whether the frame in progress is an odd frame
    pub fn is_odd_frame(&self) -> bool {
        self.odd_frame
    }

    /// Raw PPUSTATUS bits (without the read side effects)
    pub fn status(&self) -> u8 {
        self.ppustatus
    }

    /// Current VRAM address (v)
    pub fn vram_address(&self) -> VramAddress {
        self.v
    }

    /// Temporary VRAM address (t)
    pub fn temp_address(&self) -> VramAddress {
        self.t
    }

    /// Fine X scroll
    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    /// Write toggle state
    pub fn write_toggle(&self) -> bool {
        self.write_latch
    }

    /// Primary OAM
    pub fn oam(&self) -> &[u8; 256] {
        &self.oam
    }

    /// Secondary OAM entries found for the next scanline
    pub fn secondary_oam(&self) -> &[u8] {
        &self.secondary_oam[..self.sprite_eval_count * 4]
    }

    /// The PPU bus
    pub fn bus(&self) -> &PpuBus {
        &self.bus
    }

    /// The interrupt line the PPU drives
    pub fn interrupt(&self) -> &InterruptLine {
        &self.interrupt
    }

    /// Full color buffer, `SCANLINES_PER_FRAME` rows of `DOTS_PER_SCANLINE` cells
    ///
    /// Cell (scanline, dot) holds the color output on that dot; picture pixel
    /// x of a visible line is at dot x + 1.
    pub fn color_buffer(&self) -> &[Rgb] {
        &self.color_buffer
    }

    /// Color output at (scanline, dot)
    pub fn color_at(&self, scanline: u16, dot: u16) -> Rgb {
        assert!(scanline < SCANLINES_PER_FRAME && dot < DOTS_PER_SCANLINE);
        self.color_buffer[scanline as usize * DOTS_PER_SCANLINE as usize + dot as usize]
    }

    /// The 256×240 picture cropped out of the color buffer
    pub fn visible_frame(&self) -> Vec<Rgb> {
        let width = DOTS_PER_SCANLINE as usize;
        self.color_buffer
            .chunks_exact(width)
            .take(SCREEN_HEIGHT)
            .flat_map(|row| row[1..=SCREEN_WIDTH].iter().copied())
            .collect()
    }
}
