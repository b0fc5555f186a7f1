// PPU register handling - the CPU-facing side of the PPU
//
// The eight registers at $2000-$2007 repeat every 8 bytes up to $3FFF.
// Write-only registers read back the last value driven on the data bus.

use super::constants::*;
use super::Ppu;
use crate::cartridge::BusFault;

impl Ppu {
    /// Read a PPU register from CPU address space
    ///
    /// # Arguments
    ///
    /// * `address` - Any address in $2000-$3FFF; only the low 3 bits matter
    ///
    /// # Register Behaviors
    ///
    /// - PPUSTATUS ($2002): status bits over the data bus; clears VBlank and
    ///   the write toggle, and races the VBlank dot
    /// - OAMDATA ($2004): OAM byte at OAMADDR
    /// - PPUDATA ($2007): buffered VRAM read (palette reads are immediate)
    /// - Write-only registers: the data bus
    pub fn read_register(&mut self, address: u16) -> u8 {
        let value = match address & PPU_REGISTER_MASK {
            2 => self.read_status(),
            4 => {
                let value = self.oam[self.oam_addr as usize];
                // Attribute bytes have no bits 2-4
                if self.oam_addr & 0x03 == 2 {
                    value & 0xE3
                } else {
                    value
                }
            }
            7 => self.read_data(),
            _ => self.io_databus,
        };

        self.io_databus = value;
        value
    }

    fn read_status(&mut self) -> u8 {
        if self.scanline == VBLANK_SCANLINE {
            match self.dot {
                // About to set the flag: it stays clear and NMI never fires
                1 => {
                    log::trace!("PPUSTATUS read races VBlank in frame {}", self.frame_count);
                    self.suppress_vbl = true;
                    self.suppress_nmi = true;
                }
                // Flag just set: the read sees it but the NMI is cancelled
                2 | 3 => self.interrupt.clear(),
                _ => {}
            }
        }

        let value = (self.ppustatus & 0xE0) | (self.io_databus & 0x1F);

        self.ppustatus &= !STATUS_VBLANK;
        self.write_latch = false;
        value
    }

    fn read_data(&mut self) -> u8 {
        let address = self.v.get() & 0x3FFF;

        let value = if address >= PALETTE_BASE {
            // Palette reads are immediate; the buffer gets the nametable byte underneath
            self.read_buffer = self.bus.read(address & 0x2FFF);
            self.bus.read(address)
        } else {
            let value = self.read_buffer;
            self.read_buffer = self.bus.read(address);
            value
        };

        self.increment_vram_address();
        value
    }

    /// Write a PPU register from CPU address space
    ///
    /// # Arguments
    ///
    /// * `address` - Any address in $2000-$3FFF; only the low 3 bits matter
    /// * `data` - The value to write
    ///
    /// # Register Behaviors
    ///
    /// - PPUCTRL ($2000): control flags; nametable select goes into t
    /// - PPUMASK ($2001): rendering flags
    /// - OAMADDR ($2003) / OAMDATA ($2004): OAM access
    /// - PPUSCROLL ($2005): two writes into t and fine X
    /// - PPUADDR ($2006): two writes into t, then t is copied to v
    /// - PPUDATA ($2007): VRAM write at v, then v advances
    ///
    /// # Errors
    ///
    /// Returns the mapper's `BusFault` when PPUDATA writes into CHR-ROM. The
    /// VRAM address still advances.
    pub fn write_register(&mut self, address: u16, data: u8) -> Result<(), BusFault> {
        self.io_databus = data;

        match address & PPU_REGISTER_MASK {
            0 => self.write_ctrl(data),
            1 => self.ppumask = data,
            2 => {}
            3 => self.oam_addr = data,
            4 => {
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.write_latch {
                    // t: ....... ...ABCDE <- d: ABCDEFGH
                    // x:              FGH <- d: ABCDEFGH
                    self.t.set_coarse_x(data >> 3);
                    self.fine_x = data & 0x07;
                } else {
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.t.set_fine_y(data & 0x07);
                    self.t.set_coarse_y(data >> 3);
                }
                self.write_latch = !self.write_latch;
            }
            6 => {
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH, bit 14 cleared
                    let t = self.t.get();
                    self.t.set((t & 0x00FF) | (((data as u16) & 0x3F) << 8));
                } else {
                    let t = self.t.get();
                    self.t.set((t & 0xFF00) | data as u16);
                    self.v = self.t;
                }
                self.write_latch = !self.write_latch;
            }
            7 => {
                let result = self.bus.write(self.v.get() & 0x3FFF, data);
                self.increment_vram_address();
                result?;
            }
            _ => unreachable!(),
        }

        Ok(())
    }

    fn write_ctrl(&mut self, data: u8) {
        let was_enabled = self.ppuctrl & CTRL_NMI_ENABLE != 0;

        self.ppuctrl = data;
        self.t.set_nametable(data & CTRL_NAMETABLE);

        // Enabling NMI during VBlank fires it immediately
        let enabled = data & CTRL_NMI_ENABLE != 0;
        if !was_enabled && enabled && self.ppustatus & STATUS_VBLANK != 0 {
            log::trace!("NMI enabled during VBlank");
            self.interrupt.assert();
        }
    }

    fn increment_vram_address(&mut self) {
        let increment = if self.ppuctrl & CTRL_VRAM_INC_32 != 0 {
            32
        } else {
            1
        };
        self.v.set(self.v.get().wrapping_add(increment));
    }

    /// Copy a 256-byte page into OAM, starting at OAMADDR and wrapping
    ///
    /// This is the PPU half of a $4014 write; the CPU side reads the page
    /// and stalls.
    pub fn write_oam_dma(&mut self, page: u8, data: &[u8; 256]) {
        self.oam_dma = page;

        let start = self.oam_addr as usize;
        for (offset, &byte) in data.iter().enumerate() {
            self.oam[(start + offset) & 0xFF] = byte;
        }
    }

    /// Skip the VBlank flag on the next VBlank dot
    ///
    /// For CPU cores that resolve the status-read race at sub-dot precision.
    pub fn suppress_vblank(&mut self) {
        self.suppress_vbl = true;
    }

    /// Skip NMI assertion on the next VBlank dot
    pub fn suppress_nmi(&mut self) {
        self.suppress_nmi = true;
    }
}
