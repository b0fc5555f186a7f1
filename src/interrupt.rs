// Interrupt line shared between the PPU and the CPU
//
// The top-level emulator owns the line and hands clones to both sides. The
// PPU asserts it on VBlank; the CPU polls and clears it.

use std::cell::Cell;
use std::rc::Rc;

/// Shared NMI signal
///
/// Cloning yields another handle onto the same line.
#[derive(Debug, Clone, Default)]
pub struct InterruptLine {
    asserted: Rc<Cell<bool>>,
}

impl InterruptLine {
    /// Create a new, deasserted line
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the line active
    pub fn assert(&self) {
        self.asserted.set(true);
    }

    /// Release the line
    pub fn clear(&self) {
        self.asserted.set(false);
    }

    /// Whether the line is currently active
    pub fn is_asserted(&self) -> bool {
        self.asserted.get()
    }

    /// Read and clear the line in one step, as the CPU does when it services the NMI
    pub fn take(&self) -> bool {
        self.asserted.replace(false)
    }
}
