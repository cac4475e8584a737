//! Tuplet group generation.
//!
//! A group squeezes `tuplet` members into the nominal span of one note of
//! class `num`. Two fill strategies exist: uniform subdivision (every
//! member is a plain note of the next-finer class) and combination mode,
//! which treats the group as a miniature measure of
//! `base_ticks(num - 1) * tuplet` ticks and rejection-samples members from
//! the group's own class and the one below it.

use rand::Rng;

use crate::config::RiffConfig;
use crate::note::{annotate_group, base_ticks, GroupItem, GroupNote, Layout, PlainNote, RestNote};

use super::{GenerateError, MAX_DRAWS};

/// Build a tuplet group of `tuplet` members over class `num`.
///
/// The strategy is picked by `config.combi_groups`. Only combination mode
/// can fail, and only when the enabled classes cannot fill the inner
/// budget.
pub fn make_group<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    num: u8,
    tuplet: u8,
) -> Result<GroupNote, GenerateError> {
    let mut items = if config.combi_groups {
        combination_items(config, rng, num, tuplet)?
    } else {
        uniform_items(config, rng, num, tuplet)
    };
    annotate_group(&mut items);
    Ok(GroupNote {
        num,
        tuplet,
        notes: items,
        layout: Layout::default(),
    })
}

/// Uniform subdivision: `tuplet` plain notes of the next-finer class, an
/// accent coin per member, no rests or dots.
fn uniform_items<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    num: u8,
    tuplet: u8,
) -> Vec<GroupItem> {
    (0..tuplet)
        .map(|_| GroupItem::Note(PlainNote::new(num - 1, config.accent && rng.gen_bool(0.5))))
        .collect()
}

/// Combination mode: fill the inner tick budget by rejection sampling over
/// the classes `{num - 1, num}`. A rest may only open the group; dots are
/// never added.
fn combination_items<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    num: u8,
    tuplet: u8,
) -> Result<Vec<GroupItem>, GenerateError> {
    let mut remaining = base_ticks(num - 1) * tuplet as u32;
    let mut items = Vec::new();

    while remaining > 0 {
        let mut placed = None;
        for _ in 0..MAX_DRAWS {
            let rest_p = rng.gen_bool(0.5);
            let accent_p = rng.gen_bool(0.5);
            let fine_p = rng.gen_bool(0.5);
            // The group's own class is the coarse fallback.
            let child_num = if config.class_enabled(num - 1) && fine_p {
                num - 1
            } else {
                num
            };
            if base_ticks(child_num) <= remaining {
                placed = Some((child_num, rest_p, accent_p));
                break;
            }
        }
        let Some((child_num, rest_p, accent_p)) = placed else {
            return Err(GenerateError::Exhausted { remaining });
        };

        let item = if rest_p && items.is_empty() {
            GroupItem::Rest(RestNote::new(child_num))
        } else {
            GroupItem::Note(PlainNote::new(child_num, config.accent && accent_p))
        };
        remaining -= item.ticks();
        items.push(item);
    }
    Ok(items)
}
