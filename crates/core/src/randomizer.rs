//! Page-group randomization.
//!
//! A permutation of page-group ids is generated once per document, stored in
//! `RandomizedPageGroupIndices`, and re-read on every later rebuild so a resumed
//! session sees the same order. Group 0 is never shuffled and always leads.

use crate::error::QuizError;
use crate::navigation::NavigationList;
use itertools::Itertools;
use log::{debug, info, warn};
use quizflow_traits::DocumentStore;
use quizflow_types::{FIXED_PAGE_GROUP, tag};
use rand_mt::Mt19937GenRand32;

/// Shuffles the non-zero group ids, keeping group 0 (if present) in front.
///
/// With a seed the result is reproducible: the generator is MT19937 keyed with
/// the seed's 32-bit words and each swap index is drawn by rejection sampling on
/// the top bits, so `seed = 100` over groups `0..=9` yields
/// `[0, 5, 1, 6, 9, 7, 2, 4, 8, 3]`. Without a seed a fresh one is drawn.
///
/// Fails with [`QuizError::InsufficientGroups`] when fewer than two non-zero
/// groups remain.
pub fn randomize_page_groups(groups: &[u32], seed: Option<u64>) -> Result<Vec<u32>, QuizError> {
    let has_fixed = groups.contains(&FIXED_PAGE_GROUP);
    let mut shuffled: Vec<u32> = groups
        .iter()
        .copied()
        .filter(|g| *g != FIXED_PAGE_GROUP)
        .unique()
        .collect();
    if shuffled.len() < 2 {
        return Err(QuizError::InsufficientGroups {
            found: shuffled.len(),
        });
    }

    let seed = seed.unwrap_or_else(rand::random);
    debug!("Shuffling {} page groups with seed {seed}", shuffled.len());
    let mut rng = Mt19937GenRand32::new_with_key(seed_key(seed));
    for i in (1..shuffled.len()).rev() {
        let j = below(&mut rng, (i + 1) as u32) as usize;
        shuffled.swap(i, j);
    }

    if has_fixed {
        shuffled.insert(0, FIXED_PAGE_GROUP);
    }
    Ok(shuffled)
}

/// Splits a seed into little-endian 32-bit key words, without high zero words.
fn seed_key(seed: u64) -> Vec<u32> {
    let low = seed as u32;
    let high = (seed >> 32) as u32;
    if high == 0 { vec![low] } else { vec![low, high] }
}

/// Uniform integer in `0..n` using only the top `bit_length(n)` bits of each draw.
fn below(rng: &mut Mt19937GenRand32, n: u32) -> u32 {
    let bits = u32::BITS - n.leading_zeros();
    loop {
        let candidate = rng.next_u32() >> (u32::BITS - bits);
        if candidate < n {
            return candidate;
        }
    }
}

/// Reorders navigation entries group by group, following `permutation`.
///
/// Within a group, entries keep their original relative order, so the question
/// sets of one page and the pages of one group are never reordered internally.
/// Entries whose group is missing from the permutation are kept at the end.
pub fn shuffle_navigation_list(list: &NavigationList, permutation: &[u32]) -> NavigationList {
    let mut entries = Vec::with_capacity(list.len());
    for group in permutation.iter().unique() {
        entries.extend(list.iter().filter(|e| e.page_group == *group).copied());
    }
    if entries.len() < list.len() {
        warn!(
            "{} navigation entries belong to groups outside the stored order",
            list.len() - entries.len()
        );
        entries.extend(
            list.iter()
                .filter(|e| !permutation.contains(&e.page_group))
                .copied(),
        );
    }
    NavigationList::new(entries)
}

/// Reads the persisted permutation, if the document has one.
pub fn read_persisted_order(doc: &dyn DocumentStore) -> Result<Option<Vec<u32>>, QuizError> {
    let Some(node) = doc.last_child(doc.root(), tag::RANDOMIZED_PAGE_GROUP_INDICES) else {
        return Ok(None);
    };
    let text = doc.text(node).unwrap_or_default();
    let order = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| {
                QuizError::structure(format!(
                    "{} contains non-integer value '{s}'",
                    tag::RANDOMIZED_PAGE_GROUP_INDICES
                ))
            })
        })
        .collect::<Result<Vec<u32>, QuizError>>()?;
    Ok(Some(order))
}

/// Stores `order` as a comma-separated list, replacing any earlier one. Does not save.
pub fn persist_order(doc: &mut dyn DocumentStore, order: &[u32]) -> Result<(), QuizError> {
    let root = doc.root();
    let text = order.iter().join(",");
    let node = match doc.last_child(root, tag::RANDOMIZED_PAGE_GROUP_INDICES) {
        Some(node) => node,
        None => {
            let node = doc.create_element(tag::RANDOMIZED_PAGE_GROUP_INDICES, &[]);
            doc.append_element(root, node)?;
            node
        }
    };
    doc.set_text(node, &text)?;
    Ok(())
}

/// Builds the navigation list and applies the persisted group order, if any.
///
/// This is the rebuild every structural change goes through; it never
/// generates a new order.
pub fn rebuild_navigation(doc: &dyn DocumentStore) -> Result<NavigationList, QuizError> {
    let list = NavigationList::build(doc)?;
    match read_persisted_order(doc)? {
        Some(order) => Ok(shuffle_navigation_list(&list, &order)),
        None => Ok(list),
    }
}

/// Randomizes the navigation list for a session.
///
/// The first call on a document generates and persists a permutation; later
/// calls re-read it. Returns the shuffled list and the order used.
pub fn randomize_navigation(
    doc: &mut dyn DocumentStore,
    seed: Option<u64>,
) -> Result<(NavigationList, Vec<u32>), QuizError> {
    let list = NavigationList::build(doc)?;
    let order = match read_persisted_order(doc)? {
        Some(order) => {
            debug!("Reusing stored page group order {order:?}");
            order
        }
        None => {
            let order = randomize_page_groups(&list.unique_page_groups(), seed)?;
            persist_order(doc, &order)?;
            info!("Randomized page group order {order:?}");
            order
        }
    };
    Ok((shuffle_navigation_list(&list, &order), order))
}
