//! Rhythm note data model.
//!
//! Durations are counted in ticks, where one tick is a thirty-second note.
//! A duration class `num` in `0..=3` has a base duration of `2^num` ticks:
//! 1, 2, 4, 8 ticks for a 32nd, 16th, 8th, and quarter note respectively.
//! Dots extend a base duration by `base / (2 * dot_index)` ticks per dot,
//! in integer arithmetic.

use serde::Serialize;

/// Base duration of a class in thirty-second-note ticks.
pub fn base_ticks(num: u8) -> u32 {
    1u32 << num
}

/// Extra ticks contributed by `dots` dots on a note of class `num`.
pub fn dot_extra(num: u8, dots: u8) -> u32 {
    let base = base_ticks(num);
    (1..=dots as u32).map(|i| base / (2 * i)).sum()
}

/// Full tick duration of a (possibly dotted) note of class `num`.
pub fn dotted_ticks(num: u8, dots: u8) -> u32 {
    base_ticks(num) + dot_extra(num, dots)
}

/// Layout flags attached to every note.
///
/// Computed by the generator and the grammar parser; consumed only by
/// notation rendering. `on_beat` doubles as the beat-delimiter marker when
/// serializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// First item starting exactly at a beat boundary.
    pub on_beat: bool,
    /// First non-rest item of its beat (or of its enclosing group).
    pub first_on_group: bool,
    /// Last item of its beat (or of its enclosing group).
    pub last_on_beat: bool,
    /// Item starting exactly at the beat's half-point.
    pub middle_beat: bool,
    /// Item crossing the beat's half-point from below.
    pub last_before_middle: bool,
}

/// A rest of a given duration class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestNote {
    pub num: u8,
    pub dots: u8,
    pub layout: Layout,
}

impl RestNote {
    pub fn new(num: u8) -> Self {
        RestNote {
            num,
            dots: 0,
            layout: Layout::default(),
        }
    }

    pub fn ticks(&self) -> u32 {
        dotted_ticks(self.num, self.dots)
    }
}

/// A sounded note, optionally accented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainNote {
    pub num: u8,
    pub dots: u8,
    pub accent: bool,
    pub layout: Layout,
}

impl PlainNote {
    pub fn new(num: u8, accent: bool) -> Self {
        PlainNote {
            num,
            dots: 0,
            accent,
            layout: Layout::default(),
        }
    }

    pub fn ticks(&self) -> u32 {
        dotted_ticks(self.num, self.dots)
    }
}

/// A member of a tuplet group: a plain note or a rest, never another group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GroupItem {
    Rest(RestNote),
    Note(PlainNote),
}

impl GroupItem {
    pub fn ticks(&self) -> u32 {
        match self {
            GroupItem::Rest(r) => r.ticks(),
            GroupItem::Note(n) => n.ticks(),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, GroupItem::Rest(_))
    }

    pub fn layout(&self) -> &Layout {
        match self {
            GroupItem::Rest(r) => &r.layout,
            GroupItem::Note(n) => &n.layout,
        }
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        match self {
            GroupItem::Rest(r) => &mut r.layout,
            GroupItem::Note(n) => &mut n.layout,
        }
    }
}

/// A tuplet group: `tuplet` notes in the nominal span of a note of class
/// `num`. The inner tick budget is `base_ticks(num - 1) * tuplet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNote {
    pub num: u8,
    pub tuplet: u8,
    pub notes: Vec<GroupItem>,
    pub layout: Layout,
}

impl GroupNote {
    /// Nominal span of the group in ticks (the tuplet squeezes its members
    /// into the time of a single note of class `num`).
    pub fn ticks(&self) -> u32 {
        base_ticks(self.num)
    }

    /// Inner tick budget available to the group's members.
    pub fn inner_ticks(&self) -> u32 {
        base_ticks(self.num - 1) * self.tuplet as u32
    }
}

/// A riff element: rest, sounded note, or tuplet group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Note {
    Rest(RestNote),
    Note(PlainNote),
    Group(GroupNote),
}

impl Note {
    pub fn ticks(&self) -> u32 {
        match self {
            Note::Rest(r) => r.ticks(),
            Note::Note(n) => n.ticks(),
            Note::Group(g) => g.ticks(),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Note::Rest(_))
    }

    pub fn layout(&self) -> &Layout {
        match self {
            Note::Rest(r) => &r.layout,
            Note::Note(n) => &n.layout,
            Note::Group(g) => &g.layout,
        }
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        match self {
            Note::Rest(r) => &mut r.layout,
            Note::Note(n) => &mut n.layout,
            Note::Group(g) => &mut g.layout,
        }
    }
}

/// Assign layout flags across one beat's worth of top-level notes.
///
/// The first item is on the beat, the first non-rest item opens the beam
/// group, the last item closes the beat. The half-point flags split an
/// eight-tick beat into two beamable halves; the threshold is the beat's
/// half-point in ticks.
pub(crate) fn annotate_beat(notes: &mut [Note], beat_ticks: u32) {
    let half = beat_ticks / 2;
    let len = notes.len();
    let mut acc = 0u32;
    let mut first_sounded = true;
    for (i, note) in notes.iter_mut().enumerate() {
        let ticks = note.ticks();
        let is_rest = note.is_rest();
        let layout = note.layout_mut();
        layout.on_beat = i == 0;
        layout.last_on_beat = i + 1 == len;
        layout.middle_beat = acc == half && i != 0;
        layout.last_before_middle = acc < half && acc + ticks >= half;
        layout.first_on_group = false;
        if first_sounded && !is_rest {
            layout.first_on_group = true;
            first_sounded = false;
        }
        acc += ticks;
    }
}

/// Assign layout flags across a tuplet group's members.
///
/// Same shape as [`annotate_beat`] but scoped to the group's span: the
/// half-point flags stay clear, members beam as one unit.
pub(crate) fn annotate_group(notes: &mut [GroupItem]) {
    let len = notes.len();
    let mut first_sounded = true;
    for (i, item) in notes.iter_mut().enumerate() {
        let is_rest = item.is_rest();
        let layout = item.layout_mut();
        layout.on_beat = i == 0;
        layout.last_on_beat = i + 1 == len;
        layout.middle_beat = false;
        layout.last_before_middle = false;
        layout.first_on_group = false;
        if first_sounded && !is_rest {
            layout.first_on_group = true;
            first_sounded = false;
        }
    }
}
