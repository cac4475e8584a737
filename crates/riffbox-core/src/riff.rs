//! The riff container and its text grammar.
//!
//! A riff serializes to one compact ASCII line, beat-delimited by `|`:
//!
//! ```text
//! |an2r2|n2.n1|g3(3){n2n2n2}|r3
//! ```
//!
//! Plain tokens are `<kind><num>[.]*` with kind `n` (note), `a` (accented
//! note), or `r` (rest) and a duration digit 0-3. Tuplet groups wrap their
//! member tokens in `g<num>(<tuplet>){...}`; members are plain tokens only,
//! never nested groups or beat delimiters. Parsing rebuilds every layout
//! flag from running tick totals, so `parse` and `Display` are exact
//! inverses field-for-field.

use std::fmt::{self, Write as _};

use serde::Serialize;
use thiserror::Error;

use crate::note::{annotate_beat, annotate_group, GroupItem, GroupNote, Layout, Note, PlainNote, RestNote};

/// Grammar parse failure, pointing at the offending byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRiffError {
    #[error("riff must start with '|' (offset {offset})")]
    MissingBeatDelimiter { offset: usize },
    #[error("unknown token kind '{found}' at offset {offset}")]
    UnknownKind { found: char, offset: usize },
    #[error("invalid duration digit '{found}' at offset {offset} (expected 0-3)")]
    InvalidDuration { found: char, offset: usize },
    #[error("invalid tuplet index '{found}' at offset {offset} (expected 3, 5, or 7)")]
    InvalidTuplet { found: char, offset: usize },
    #[error("invalid group class '{found}' at offset {offset} (groups subdivide eighths or quarters)")]
    InvalidGroupClass { found: char, offset: usize },
    #[error("expected '{expected}' at offset {offset}, found '{found}'")]
    Expected {
        expected: char,
        found: char,
        offset: usize,
    },
    #[error("group opened at offset {offset} is never closed")]
    UnterminatedGroup { offset: usize },
    #[error("groups cannot nest (offset {offset})")]
    NestedGroup { offset: usize },
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },
}

/// An ordered sequence of notes spanning one measure.
///
/// Riffs are created whole, by [`crate::generate::generate_riff`] or by
/// [`Riff::parse`], and are read-only afterwards; edits produce a new riff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Riff {
    notes: Vec<Note>,
}

impl Riff {
    pub(crate) fn from_notes(notes: Vec<Note>) -> Self {
        Riff { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total tick duration across the measure.
    pub fn ticks(&self) -> u32 {
        self.notes.iter().map(Note::ticks).sum()
    }

    /// Parse a riff from its grammar line.
    pub fn parse(input: &str) -> Result<Riff, MalformedRiffError> {
        let bytes = input.as_bytes();
        if bytes.first() != Some(&b'|') {
            return Err(MalformedRiffError::MissingBeatDelimiter { offset: 0 });
        }
        let mut notes = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            // loop invariant: bytes[pos] == b'|'
            pos += 1;
            let mut beat = Vec::new();
            while pos < bytes.len() && bytes[pos] != b'|' {
                beat.push(parse_note(bytes, &mut pos)?);
            }
            let beat_ticks = beat.iter().map(Note::ticks).sum();
            annotate_beat(&mut beat, beat_ticks);
            notes.append(&mut beat);
        }
        Ok(Riff { notes })
    }
}

fn parse_note(bytes: &[u8], pos: &mut usize) -> Result<Note, MalformedRiffError> {
    let offset = *pos;
    match bytes[*pos] {
        b'r' => {
            *pos += 1;
            let num = parse_duration(bytes, pos)?;
            let dots = parse_dots(bytes, pos);
            Ok(Note::Rest(RestNote {
                num,
                dots,
                layout: Layout::default(),
            }))
        }
        kind @ (b'n' | b'a') => {
            *pos += 1;
            let num = parse_duration(bytes, pos)?;
            let dots = parse_dots(bytes, pos);
            Ok(Note::Note(PlainNote {
                num,
                dots,
                accent: kind == b'a',
                layout: Layout::default(),
            }))
        }
        b'g' => parse_group(bytes, pos),
        other => Err(MalformedRiffError::UnknownKind {
            found: other as char,
            offset,
        }),
    }
}

fn parse_group(bytes: &[u8], pos: &mut usize) -> Result<Note, MalformedRiffError> {
    *pos += 1; // 'g'
    let class_offset = *pos;
    let num = parse_duration(bytes, pos)?;
    if num < 2 {
        return Err(MalformedRiffError::InvalidGroupClass {
            found: (b'0' + num) as char,
            offset: class_offset,
        });
    }
    expect(bytes, pos, b'(')?;
    let tuplet_offset = *pos;
    let tuplet = match bytes.get(*pos) {
        None => return Err(MalformedRiffError::UnexpectedEnd { offset: tuplet_offset }),
        Some(b'3') => 3,
        Some(b'5') => 5,
        Some(b'7') => 7,
        Some(&other) => {
            return Err(MalformedRiffError::InvalidTuplet {
                found: other as char,
                offset: tuplet_offset,
            })
        }
    };
    *pos += 1;
    expect(bytes, pos, b')')?;
    let brace_offset = *pos;
    expect(bytes, pos, b'{')?;

    let mut items = Vec::new();
    loop {
        match bytes.get(*pos) {
            None => {
                return Err(MalformedRiffError::UnterminatedGroup {
                    offset: brace_offset,
                })
            }
            Some(b'}') => {
                *pos += 1;
                break;
            }
            Some(b'g') => return Err(MalformedRiffError::NestedGroup { offset: *pos }),
            Some(&kind @ (b'n' | b'a' | b'r')) => {
                *pos += 1;
                let num = parse_duration(bytes, pos)?;
                let dots = parse_dots(bytes, pos);
                items.push(if kind == b'r' {
                    GroupItem::Rest(RestNote {
                        num,
                        dots,
                        layout: Layout::default(),
                    })
                } else {
                    GroupItem::Note(PlainNote {
                        num,
                        dots,
                        accent: kind == b'a',
                        layout: Layout::default(),
                    })
                });
            }
            Some(&other) => {
                return Err(MalformedRiffError::UnknownKind {
                    found: other as char,
                    offset: *pos,
                })
            }
        }
    }
    annotate_group(&mut items);
    Ok(Note::Group(GroupNote {
        num,
        tuplet,
        notes: items,
        layout: Layout::default(),
    }))
}

fn parse_duration(bytes: &[u8], pos: &mut usize) -> Result<u8, MalformedRiffError> {
    let offset = *pos;
    match bytes.get(*pos) {
        None => Err(MalformedRiffError::UnexpectedEnd { offset }),
        Some(&b) if (b'0'..=b'3').contains(&b) => {
            *pos += 1;
            Ok(b - b'0')
        }
        Some(&b) => Err(MalformedRiffError::InvalidDuration {
            found: b as char,
            offset,
        }),
    }
}

fn parse_dots(bytes: &[u8], pos: &mut usize) -> u8 {
    let mut dots = 0;
    while bytes.get(*pos) == Some(&b'.') {
        dots += 1;
        *pos += 1;
    }
    dots
}

fn expect(bytes: &[u8], pos: &mut usize, expected: u8) -> Result<(), MalformedRiffError> {
    let offset = *pos;
    match bytes.get(*pos) {
        None => Err(MalformedRiffError::UnexpectedEnd { offset }),
        Some(&b) if b == expected => {
            *pos += 1;
            Ok(())
        }
        Some(&b) => Err(MalformedRiffError::Expected {
            expected: expected as char,
            found: b as char,
            offset,
        }),
    }
}

fn kind_char(accent: bool) -> char {
    if accent {
        'a'
    } else {
        'n'
    }
}

fn write_plain(f: &mut fmt::Formatter<'_>, kind: char, num: u8, dots: u8) -> fmt::Result {
    f.write_char(kind)?;
    write!(f, "{num}")?;
    for _ in 0..dots {
        f.write_char('.')?;
    }
    Ok(())
}

impl fmt::Display for Riff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            if note.layout().on_beat {
                f.write_char('|')?;
            }
            match note {
                Note::Rest(r) => write_plain(f, 'r', r.num, r.dots)?,
                Note::Note(n) => write_plain(f, kind_char(n.accent), n.num, n.dots)?,
                Note::Group(g) => {
                    write!(f, "g{}({}){{", g.num, g.tuplet)?;
                    for item in &g.notes {
                        match item {
                            GroupItem::Rest(r) => write_plain(f, 'r', r.num, r.dots)?,
                            GroupItem::Note(n) => {
                                write_plain(f, kind_char(n.accent), n.num, n.dots)?
                            }
                        }
                    }
                    f.write_char('}')?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_four_quarters() {
        let riff = Riff::parse("|n3|n3|n3|n3").unwrap();
        assert_eq!(riff.len(), 4);
        assert_eq!(riff.ticks(), 32);
        for note in riff.notes() {
            assert!(note.layout().on_beat);
            assert!(note.layout().last_on_beat);
            assert!(note.layout().first_on_group);
        }
    }

    #[test]
    fn text_round_trip() {
        for line in [
            "|n3|n3|n3|n3",
            "|an2r2|n2.n1|g3(3){n2n2n2}|r3",
            "|n1n1n1n1n2|r2n2",
            "|g2(5){n1n1an1n1n1}|n2n2",
            "|n2..n0|an3",
        ] {
            let riff = Riff::parse(line).unwrap();
            assert_eq!(riff.to_string(), line);
        }
    }

    #[test]
    fn structural_round_trip() {
        let riff = Riff::parse("|an2r2|n2.n1|g3(3){r2n2n2}|r3").unwrap();
        let back = Riff::parse(&riff.to_string()).unwrap();
        assert_eq!(riff, back);
    }

    #[test]
    fn beat_flags_follow_tick_totals() {
        let riff = Riff::parse("|n1n1n2").unwrap();
        let notes = riff.notes();
        assert!(notes[0].layout().on_beat);
        // The sixteenth starting at tick 2 crosses the half-point of the
        // 8-tick beat; the eighth after it sits exactly on it.
        assert!(notes[1].layout().last_before_middle);
        assert!(notes[2].layout().middle_beat);
        assert!(notes[2].layout().last_on_beat);
    }

    #[test]
    fn rest_does_not_open_the_beam_group() {
        let riff = Riff::parse("|r2n2n2").unwrap();
        let notes = riff.notes();
        assert!(notes[0].layout().on_beat);
        assert!(!notes[0].layout().first_on_group);
        assert!(notes[1].layout().first_on_group);
        assert!(!notes[2].layout().first_on_group);
    }

    #[test]
    fn group_members_are_annotated() {
        let riff = Riff::parse("|g3(3){r2n2n2}").unwrap();
        let Note::Group(group) = &riff.notes()[0] else {
            panic!("expected a group");
        };
        assert_eq!(group.num, 3);
        assert_eq!(group.tuplet, 3);
        assert_eq!(group.notes.len(), 3);
        assert!(group.notes[0].layout().on_beat);
        assert!(!group.notes[0].layout().first_on_group);
        assert!(group.notes[1].layout().first_on_group);
        assert!(group.notes[2].layout().last_on_beat);
        // The group itself is the beat's only item.
        assert!(group.layout.on_beat);
        assert!(group.layout.last_on_beat);
        assert!(group.layout.first_on_group);
    }

    #[test]
    fn multiple_dots_parse() {
        let riff = Riff::parse("|n2..").unwrap();
        let Note::Note(note) = &riff.notes()[0] else {
            panic!("expected a note");
        };
        assert_eq!(note.dots, 2);
        assert_eq!(note.ticks(), 7);
    }

    #[test]
    fn empty_beats_are_skipped() {
        let riff = Riff::parse("|n3||n3").unwrap();
        assert_eq!(riff.len(), 2);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            Riff::parse("|x2").unwrap_err(),
            MalformedRiffError::UnknownKind {
                found: 'x',
                offset: 1
            }
        );
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert_eq!(
            Riff::parse("n3").unwrap_err(),
            MalformedRiffError::MissingBeatDelimiter { offset: 0 }
        );
        assert_eq!(
            Riff::parse("").unwrap_err(),
            MalformedRiffError::MissingBeatDelimiter { offset: 0 }
        );
    }

    #[test]
    fn rejects_bad_duration_digit() {
        assert_eq!(
            Riff::parse("|n9").unwrap_err(),
            MalformedRiffError::InvalidDuration {
                found: '9',
                offset: 2
            }
        );
    }

    #[test]
    fn rejects_truncated_token() {
        assert_eq!(
            Riff::parse("|n").unwrap_err(),
            MalformedRiffError::UnexpectedEnd { offset: 2 }
        );
    }

    #[test]
    fn rejects_unterminated_group() {
        assert_eq!(
            Riff::parse("|g3(3){n2n2").unwrap_err(),
            MalformedRiffError::UnterminatedGroup { offset: 6 }
        );
    }

    #[test]
    fn rejects_bad_tuplet_index() {
        assert_eq!(
            Riff::parse("|g3(4){n2}").unwrap_err(),
            MalformedRiffError::InvalidTuplet {
                found: '4',
                offset: 4
            }
        );
    }

    #[test]
    fn rejects_group_of_fine_classes() {
        assert_eq!(
            Riff::parse("|g1(3){n0}").unwrap_err(),
            MalformedRiffError::InvalidGroupClass {
                found: '1',
                offset: 2
            }
        );
    }

    #[test]
    fn rejects_nested_group() {
        assert_eq!(
            Riff::parse("|g3(3){g3(3){n2}}").unwrap_err(),
            MalformedRiffError::NestedGroup { offset: 7 }
        );
    }

    #[test]
    fn rejects_missing_group_body() {
        assert_eq!(
            Riff::parse("|g3(3)n2").unwrap_err(),
            MalformedRiffError::Expected {
                expected: '{',
                found: 'n',
                offset: 6
            }
        );
    }
}
