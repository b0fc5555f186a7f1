// Per-dot event tables
//
// The PPU's timing is encoded as data: for every scanline kind and every dot,
// an ordered list of micro-operations that fire on that dot. The engine looks
// up the list and executes it; it never decides timing itself.

use super::constants::{
    DOTS_PER_SCANLINE, LAST_VISIBLE_SCANLINE, POSTRENDER_SCANLINE, PRERENDER_SCANLINE,
    VBLANK_SCANLINE,
};

/// Upper bound on events queued for a single dot
pub const EVENTS_PER_DOT: usize = 8;

const DOTS: usize = DOTS_PER_SCANLINE as usize;

/// One micro-operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Filler for unused slots
    Idle,
    /// Fetch the nametable byte for the tile under `v`
    FetchName,
    /// Fetch the attribute byte for the tile under `v`
    FetchAttribute,
    /// Fetch the low pattern plane
    FetchPatternLo,
    /// Fetch the high pattern plane
    FetchPatternHi,
    /// Shift the background shift registers by one pixel
    ShiftRegisters,
    /// Load the latched tile into the low bytes of the shift registers
    ReloadShifters,
    /// Coarse X increment of `v`
    IncrementX,
    /// Fine/coarse Y increment of `v`
    IncrementY,
    /// Horizontal bits `t` -> `v`
    CopyX,
    /// Vertical bits `t` -> `v`
    CopyY,
    /// OAMADDR is forced to zero during sprite fetches
    ClearOamAddr,
    /// Start a visible line: evaluation state from the previous line is dropped
    BeginSpriteLine,
    /// Write $FF into one secondary OAM byte
    ClearSecondaryOam,
    /// Examine one primary OAM entry for the next scanline
    EvaluateSprite,
    /// Load one sprite output unit from secondary OAM
    FetchSprite,
    /// Clear VBlank, sprite-0 hit and overflow
    ClearFlags,
    /// Raise VBlank and possibly NMI
    SetVblank,
    /// Skip the last dot of the pre-render scanline on odd frames
    SkipCycle,
}

/// Bounded, ordered list of events for one dot
#[derive(Debug, Clone, Copy)]
pub struct EventList {
    events: [Event; EVENTS_PER_DOT],
    len: u8,
}

impl EventList {
    const EMPTY: EventList = EventList {
        events: [Event::Idle; EVENTS_PER_DOT],
        len: 0,
    };

    fn push(&mut self, event: Event) {
        let len = self.len as usize;
        assert!(len < EVENTS_PER_DOT, "event list overflow: {:?}", event);
        self.events[len] = event;
        self.len += 1;
    }

    /// Queued events in firing order
    pub fn as_slice(&self) -> &[Event] {
        &self.events[..self.len as usize]
    }
}

/// Kind of scanline, each with its own timing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlineKind {
    /// 0-239: rendered lines
    Visible,
    /// 240 and 242-260: no PPU activity
    Idle,
    /// 241: VBlank starts
    VBlank,
    /// 261: prepares the next frame
    PreRender,
}

impl ScanlineKind {
    /// Classify a scanline index
    pub fn of(scanline: u16) -> Self {
        match scanline {
            0..=LAST_VISIBLE_SCANLINE => ScanlineKind::Visible,
            POSTRENDER_SCANLINE => ScanlineKind::Idle,
            VBLANK_SCANLINE => ScanlineKind::VBlank,
            PRERENDER_SCANLINE => ScanlineKind::PreRender,
            s if s < PRERENDER_SCANLINE => ScanlineKind::Idle,
            s => panic!("scanline {} out of range", s),
        }
    }
}

type Table = Box<[EventList; DOTS]>;

/// The three timing tables
///
/// Built once when the engine is constructed and never modified.
pub struct EventTables {
    visible: Table,
    prerender: Table,
    vblank: Table,
}

impl EventTables {
    /// Build all tables
    pub fn build() -> Self {
        log::debug!("Building PPU event tables");

        let mut visible = Box::new([EventList::EMPTY; DOTS]);
        let mut prerender = Box::new([EventList::EMPTY; DOTS]);
        let mut vblank = Box::new([EventList::EMPTY; DOTS]);

        for dot in 0..DOTS {
            if dot == 1 {
                prerender[dot].push(Event::ClearFlags);
            }

            add_background_events(&mut visible[dot], dot);
            add_background_events(&mut prerender[dot], dot);
            // Sprite evaluation for the next line happens only on rendered lines
            add_sprite_events(&mut visible[dot], dot);

            if (280..=304).contains(&dot) {
                prerender[dot].push(Event::CopyY);
            }
            if dot == 339 {
                prerender[dot].push(Event::SkipCycle);
            }
            if dot == 1 {
                vblank[dot].push(Event::SetVblank);
            }
        }

        EventTables {
            visible,
            prerender,
            vblank,
        }
    }

    /// Events that fire on `dot` of a scanline of the given kind
    pub fn events(&self, kind: ScanlineKind, dot: u16) -> &[Event] {
        let dot = dot as usize;
        match kind {
            ScanlineKind::Visible => self.visible[dot].as_slice(),
            ScanlineKind::PreRender => self.prerender[dot].as_slice(),
            ScanlineKind::VBlank => self.vblank[dot].as_slice(),
            ScanlineKind::Idle => &[],
        }
    }

    /// Owned copy of the list at (kind, dot), for callers that mutate while iterating
    pub(crate) fn list(&self, kind: ScanlineKind, dot: u16) -> EventList {
        let dot = dot as usize;
        match kind {
            ScanlineKind::Visible => self.visible[dot],
            ScanlineKind::PreRender => self.prerender[dot],
            ScanlineKind::VBlank => self.vblank[dot],
            ScanlineKind::Idle => EventList::EMPTY,
        }
    }
}

/// Is `dot` inside one of the two tile-fetch windows
fn is_fetch_dot(dot: usize) -> bool {
    (1..=256).contains(&dot) || (321..=336).contains(&dot)
}

/// Background pipeline shared by visible and pre-render scanlines
fn add_background_events(list: &mut EventList, dot: usize) {
    if (2..=257).contains(&dot) || (322..=337).contains(&dot) {
        list.push(Event::ShiftRegisters);
    }
    if ((9..=257).contains(&dot) && (dot - 1) % 8 == 0) || dot == 329 || dot == 337 {
        list.push(Event::ReloadShifters);
    }

    if is_fetch_dot(dot) {
        match (dot - 1) % 8 {
            0 => list.push(Event::FetchName),
            2 => list.push(Event::FetchAttribute),
            4 => list.push(Event::FetchPatternLo),
            6 => list.push(Event::FetchPatternHi),
            7 => list.push(Event::IncrementX),
            _ => {}
        }
    }

    // Unused nametable fetches at the end of the line
    if dot == 337 || dot == 339 {
        list.push(Event::FetchName);
    }

    if dot == 256 {
        list.push(Event::IncrementY);
    }
    if dot == 257 {
        list.push(Event::CopyX);
    }
    if (257..=320).contains(&dot) {
        list.push(Event::ClearOamAddr);
    }
}

/// Sprite evaluation and fetch, interleaved with the background fetches
fn add_sprite_events(list: &mut EventList, dot: usize) {
    if dot == 0 {
        list.push(Event::BeginSpriteLine);
    }
    // 32 bytes of secondary OAM, one byte every other dot
    if (2..=64).contains(&dot) && dot % 2 == 0 {
        list.push(Event::ClearSecondaryOam);
    }
    // 64 primary entries, one every other dot
    if (65..=191).contains(&dot) && dot % 2 == 1 {
        list.push(Event::EvaluateSprite);
    }
    // 8 sprite slots, loaded at the end of each 8-dot fetch group
    if (264..=320).contains(&dot) && dot % 8 == 0 {
        list.push(Event::FetchSprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(tables: &EventTables, kind: ScanlineKind, event: Event) -> usize {
        (0..DOTS_PER_SCANLINE)
            .map(|dot| tables.events(kind, dot).iter().filter(|&&e| e == event).count())
            .sum()
    }

    #[test]
    fn test_scanline_kinds() {
        assert_eq!(ScanlineKind::of(0), ScanlineKind::Visible);
        assert_eq!(ScanlineKind::of(239), ScanlineKind::Visible);
        assert_eq!(ScanlineKind::of(240), ScanlineKind::Idle);
        assert_eq!(ScanlineKind::of(241), ScanlineKind::VBlank);
        assert_eq!(ScanlineKind::of(250), ScanlineKind::Idle);
        assert_eq!(ScanlineKind::of(261), ScanlineKind::PreRender);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_scanline_out_of_range() {
        ScanlineKind::of(262);
    }

    #[test]
    fn test_fetch_cadence() {
        let tables = EventTables::build();
        let kind = ScanlineKind::Visible;

        assert!(tables.events(kind, 1).contains(&Event::FetchName));
        assert!(tables.events(kind, 3).contains(&Event::FetchAttribute));
        assert!(tables.events(kind, 5).contains(&Event::FetchPatternLo));
        assert!(tables.events(kind, 7).contains(&Event::FetchPatternHi));
        assert!(tables.events(kind, 8).contains(&Event::IncrementX));
        assert!(tables.events(kind, 321).contains(&Event::FetchName));
        assert!(tables.events(kind, 336).contains(&Event::IncrementX));

        // 32 visible tiles + 2 prefetched tiles
        assert_eq!(count(&tables, kind, Event::IncrementX), 34);
        // 34 tile fetches + 2 unused fetches
        assert_eq!(count(&tables, kind, Event::FetchName), 36);
        assert_eq!(count(&tables, kind, Event::FetchPatternHi), 34);
    }

    #[test]
    fn test_shift_and_reload() {
        let tables = EventTables::build();
        let kind = ScanlineKind::Visible;

        assert!(!tables.events(kind, 1).contains(&Event::ShiftRegisters));
        assert_eq!(
            &tables.events(kind, 9)[..2],
            &[Event::ShiftRegisters, Event::ReloadShifters]
        );
        assert_eq!(count(&tables, kind, Event::ShiftRegisters), 256 + 16);
        assert_eq!(count(&tables, kind, Event::ReloadShifters), 32 + 2);
    }

    #[test]
    fn test_scroll_copies() {
        let tables = EventTables::build();

        assert_eq!(count(&tables, ScanlineKind::Visible, Event::IncrementY), 1);
        assert!(tables.events(ScanlineKind::Visible, 256).contains(&Event::IncrementY));
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::CopyX), 1);
        assert!(tables.events(ScanlineKind::Visible, 257).contains(&Event::CopyX));
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::CopyY), 0);
        assert_eq!(count(&tables, ScanlineKind::PreRender, Event::CopyY), 25);
        assert!(tables.events(ScanlineKind::PreRender, 280).contains(&Event::CopyY));
        assert!(tables.events(ScanlineKind::PreRender, 304).contains(&Event::CopyY));
    }

    #[test]
    fn test_increment_y_follows_increment_x() {
        let tables = EventTables::build();
        let events = tables.events(ScanlineKind::Visible, 256);
        let x = events.iter().position(|&e| e == Event::IncrementX).unwrap();
        let y = events.iter().position(|&e| e == Event::IncrementY).unwrap();
        assert!(x < y);
    }

    #[test]
    fn test_oam_addr_cleared_on_sprite_fetch_dots() {
        let tables = EventTables::build();
        for kind in [ScanlineKind::Visible, ScanlineKind::PreRender] {
            assert_eq!(count(&tables, kind, Event::ClearOamAddr), 64);
            assert!(tables.events(kind, 257).contains(&Event::ClearOamAddr));
            assert!(tables.events(kind, 320).contains(&Event::ClearOamAddr));
        }
    }

    #[test]
    fn test_vblank_and_prerender_markers() {
        let tables = EventTables::build();

        assert_eq!(tables.events(ScanlineKind::VBlank, 1), &[Event::SetVblank]);
        assert_eq!(count(&tables, ScanlineKind::VBlank, Event::SetVblank), 1);
        assert_eq!(tables.events(ScanlineKind::PreRender, 1)[0], Event::ClearFlags);
        assert_eq!(count(&tables, ScanlineKind::PreRender, Event::SkipCycle), 1);
        assert!(tables.events(ScanlineKind::PreRender, 339).contains(&Event::SkipCycle));
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::ClearFlags), 0);
    }

    #[test]
    fn test_sprite_events_only_on_visible_lines() {
        let tables = EventTables::build();

        assert_eq!(tables.events(ScanlineKind::Visible, 0), &[Event::BeginSpriteLine]);
        assert_eq!(count(&tables, ScanlineKind::PreRender, Event::BeginSpriteLine), 0);
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::ClearSecondaryOam), 32);
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::EvaluateSprite), 64);
        assert_eq!(count(&tables, ScanlineKind::Visible, Event::FetchSprite), 8);
        assert_eq!(count(&tables, ScanlineKind::PreRender, Event::EvaluateSprite), 0);
    }

    #[test]
    fn test_idle_lines_have_no_events() {
        let tables = EventTables::build();
        for dot in 0..DOTS_PER_SCANLINE {
            assert!(tables.events(ScanlineKind::Idle, dot).is_empty());
        }
    }
}
