//! PPU Quirk Tests
//!
//! Hardware races between PPUSTATUS reads, PPUCTRL writes and the VBlank dot.

use super::*;

#[test]
fn test_status_read_before_vblank_suppresses_flag_and_nmi() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 241, 1);
    let status = ppu.read_register(PPUSTATUS);
    assert_eq!(status & 0x80, 0);

    ppu.step();
    assert_eq!(ppu.status() & 0x80, 0, "VBlank flag never set");
    assert!(!ppu.interrupt().is_asserted(), "NMI never fires");
}

#[test]
fn test_suppression_lasts_one_frame() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 241, 1);
    ppu.read_register(PPUSTATUS);
    run_frame(&mut ppu);

    run_to(&mut ppu, 241, 2);
    assert_ne!(ppu.status() & 0x80, 0);
    assert!(ppu.interrupt().is_asserted());
}

#[test]
fn test_status_read_just_after_vblank_cancels_nmi() {
    for dot in [2, 3] {
        let mut ppu = create_test_ppu();
        ppu.write_register(PPUCTRL, 0x80).unwrap();

        run_to(&mut ppu, 241, dot);
        assert!(ppu.interrupt().is_asserted());

        let status = ppu.read_register(PPUSTATUS);
        assert_ne!(status & 0x80, 0, "The read still sees VBlank");
        assert!(!ppu.interrupt().is_asserted());
    }
}

#[test]
fn test_status_read_later_keeps_nmi() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 241, 10);
    ppu.read_register(PPUSTATUS);

    assert!(ppu.interrupt().is_asserted());
    assert_eq!(ppu.status() & 0x80, 0);
}

#[test]
fn test_suppress_nmi_alone_keeps_flag() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 241, 1);
    ppu.suppress_nmi();
    ppu.step();

    assert_ne!(ppu.status() & 0x80, 0);
    assert!(!ppu.interrupt().is_asserted());
}

#[test]
fn test_suppress_vblank_blocks_nmi_too() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 241, 1);
    ppu.suppress_vblank();
    ppu.step();

    assert_eq!(ppu.status() & 0x80, 0);
    assert!(!ppu.interrupt().is_asserted());
}

#[test]
fn test_enabling_nmi_during_vblank_fires() {
    let mut ppu = create_test_ppu();

    run_to(&mut ppu, 245, 0);
    assert!(!ppu.interrupt().is_asserted());

    ppu.write_register(PPUCTRL, 0x80).unwrap();
    assert!(ppu.interrupt().is_asserted());
}

#[test]
fn test_rewriting_nmi_enable_does_not_refire() {
    let mut ppu = create_test_ppu();
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    run_to(&mut ppu, 245, 0);
    assert!(ppu.interrupt().take());

    ppu.write_register(PPUCTRL, 0x80).unwrap();
    assert!(!ppu.interrupt().is_asserted());
}

#[test]
fn test_enabling_nmi_after_status_read_does_not_fire() {
    let mut ppu = create_test_ppu();

    run_to(&mut ppu, 245, 0);
    ppu.read_register(PPUSTATUS);
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    assert!(!ppu.interrupt().is_asserted());
}

#[test]
fn test_enabling_nmi_outside_vblank_does_not_fire() {
    let mut ppu = create_test_ppu();

    run_to(&mut ppu, 100, 0);
    ppu.write_register(PPUCTRL, 0x80).unwrap();

    assert!(!ppu.interrupt().is_asserted());
}
