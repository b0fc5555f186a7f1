// PPU state snapshot for debugging and trace output

use std::fmt;

use super::constants::*;
use super::Ppu;

/// Snapshot of the PPU registers and timing at one dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpuState {
    /// Current scanline (0-261)
    pub scanline: u16,

    /// Current dot (0-340)
    pub dot: u16,

    /// Frames completed
    pub frame: u64,

    /// Whether the frame in progress is odd
    pub odd_frame: bool,

    /// PPUCTRL register ($2000)
    pub ppuctrl: u8,

    /// PPUMASK register ($2001)
    pub ppumask: u8,

    /// PPUSTATUS register ($2002)
    pub ppustatus: u8,

    /// OAMADDR register ($2003)
    pub oam_addr: u8,

    /// Last page copied by OAM DMA ($4014)
    pub oam_dma: u8,

    /// Current VRAM address (v)
    pub v: u16,

    /// Temporary VRAM address (t)
    pub t: u16,

    /// Fine X scroll
    pub fine_x: u8,

    /// Write toggle (w)
    pub write_toggle: bool,

    /// Sprites loaded in the output units for this scanline
    pub sprites_on_line: usize,

    /// NMI line state
    pub nmi_asserted: bool,
}

impl PpuState {
    /// Describe the PPUCTRL flags, e.g. `NMI SPR8x8 BG@$1000 SPR@$0000 +1 NT$2000`
    pub fn format_ppuctrl(&self) -> String {
        let ctrl = self.ppuctrl;
        let mut flags = Vec::new();

        if ctrl & CTRL_NMI_ENABLE != 0 {
            flags.push("NMI");
        }
        flags.push(if ctrl & CTRL_SPRITE_SIZE_16 != 0 {
            "SPR8x16"
        } else {
            "SPR8x8"
        });
        flags.push(if ctrl & CTRL_BG_TABLE != 0 {
            "BG@$1000"
        } else {
            "BG@$0000"
        });
        flags.push(if ctrl & CTRL_SPRITE_TABLE != 0 {
            "SPR@$1000"
        } else {
            "SPR@$0000"
        });
        flags.push(if ctrl & CTRL_VRAM_INC_32 != 0 { "+32" } else { "+1" });
        flags.push(["NT$2000", "NT$2400", "NT$2800", "NT$2C00"][(ctrl & CTRL_NAMETABLE) as usize]);

        flags.join(" ")
    }

    /// Describe the PPUMASK flags
    pub fn format_ppumask(&self) -> String {
        const NAMES: [(u8, &str); 8] = [
            (0x80, "EmpB"),
            (0x40, "EmpG"),
            (0x20, "EmpR"),
            (MASK_SHOW_SPRITES, "ShowSPR"),
            (MASK_SHOW_BG, "ShowBG"),
            (MASK_SHOW_SPRITES_LEFT, "SPRLeft"),
            (MASK_SHOW_BG_LEFT, "BGLeft"),
            (MASK_GREYSCALE, "Gray"),
        ];
        join_flags(self.ppumask, &NAMES)
    }

    /// Describe the PPUSTATUS flags
    pub fn format_ppustatus(&self) -> String {
        const NAMES: [(u8, &str); 3] = [
            (STATUS_VBLANK, "VBlank"),
            (STATUS_SPRITE_ZERO_HIT, "Spr0Hit"),
            (STATUS_SPRITE_OVERFLOW, "SprOvf"),
        ];
        join_flags(self.ppustatus, &NAMES)
    }
}

fn join_flags(value: u8, names: &[(u8, &str)]) -> String {
    let flags: Vec<&str> = names
        .iter()
        .filter(|(bit, _)| value & bit != 0)
        .map(|&(_, name)| name)
        .collect();

    if flags.is_empty() {
        "None".to_string()
    } else {
        flags.join(" ")
    }
}

impl fmt::Display for PpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scanline: {} Dot: {} Frame: {}{}",
            self.scanline,
            self.dot,
            self.frame,
            if self.odd_frame { " (odd)" } else { "" }
        )?;
        writeln!(f, "PPUCTRL:   ${:02X} [{}]", self.ppuctrl, self.format_ppuctrl())?;
        writeln!(f, "PPUMASK:   ${:02X} [{}]", self.ppumask, self.format_ppumask())?;
        writeln!(
            f,
            "PPUSTATUS: ${:02X} [{}]",
            self.ppustatus,
            self.format_ppustatus()
        )?;
        writeln!(f, "OAMADDR:   ${:02X} DMA page: ${:02X}", self.oam_addr, self.oam_dma)?;
        writeln!(
            f,
            "v: ${:04X} t: ${:04X} x: {} w: {}",
            self.v, self.t, self.fine_x, self.write_toggle as u8
        )?;
        write!(
            f,
            "Sprites: {} NMI: {}",
            self.sprites_on_line,
            if self.nmi_asserted { "Asserted" } else { "None" }
        )
    }
}

impl Ppu {
    /// Capture the current PPU state
    pub fn state(&self) -> PpuState {
        PpuState {
            scanline: self.scanline,
            dot: self.dot,
            frame: self.frame_count,
            odd_frame: self.odd_frame,
            ppuctrl: self.ppuctrl,
            ppumask: self.ppumask,
            ppustatus: self.ppustatus,
            oam_addr: self.oam_addr,
            oam_dma: self.oam_dma,
            v: self.v.get(),
            t: self.t.get(),
            fine_x: self.fine_x,
            write_toggle: self.write_latch,
            sprites_on_line: self.sprite_count,
            nmi_asserted: self.interrupt.is_asserted(),
        }
    }
}
