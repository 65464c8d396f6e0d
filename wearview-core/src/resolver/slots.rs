// File: wearview-core/src/resolver/slots.rs
//
// Slot Resolution Engine: turns an ordered candidate list into the final
// category -> wearable assignment, applying hide/replace rules and the
// skin override.

use std::collections::{HashMap, HashSet};

use wearview_common::models::{
    BodyShape, CatalogItem, HideableCategory, WearableCategory, WearableDefinition,
};

/// Categories a full-body skin covers. A skin wearable wipes all of them.
pub const BODY_PART_CATEGORIES: [WearableCategory; 8] = [
    WearableCategory::Hair,
    WearableCategory::FacialHair,
    WearableCategory::Mouth,
    WearableCategory::Eyebrows,
    WearableCategory::Eyes,
    WearableCategory::UpperBody,
    WearableCategory::LowerBody,
    WearableCategory::Feet,
];

/// Insertion-ordered category -> wearable map. Overwriting a live key
/// keeps its original position; deleting and re-inserting moves it to
/// the end.
#[derive(Debug, Default, Clone)]
pub struct SlotMap {
    order: Vec<WearableCategory>,
    map: HashMap<WearableCategory, WearableDefinition>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: WearableCategory, wearable: WearableDefinition) {
        if !self.map.contains_key(&category) {
            self.order.push(category);
        }
        self.map.insert(category, wearable);
    }

    pub fn delete(&mut self, category: WearableCategory) -> bool {
        if self.map.remove(&category).is_some() {
            self.order.retain(|c| *c != category);
            true
        } else {
            false
        }
    }

    pub fn get(&self, category: WearableCategory) -> Option<&WearableDefinition> {
        self.map.get(&category)
    }

    pub fn contains(&self, category: WearableCategory) -> bool {
        self.map.contains_key(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = WearableCategory> + '_ {
        self.order.iter().copied()
    }

    /// Assigned wearables in insertion order.
    pub fn wearables(&self) -> Vec<&WearableDefinition> {
        self.order.iter().filter_map(|c| self.map.get(c)).collect()
    }

    pub fn into_wearables(mut self) -> Vec<WearableDefinition> {
        let order = std::mem::take(&mut self.order);
        order.into_iter().filter_map(|c| self.map.remove(&c)).collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn slot_categories(entries: &[HideableCategory]) -> impl Iterator<Item = WearableCategory> + '_ {
    entries.iter().filter_map(|entry| entry.as_slot())
}

fn names_head(entries: &[HideableCategory]) -> bool {
    entries.contains(&HideableCategory::Head)
}

/// True when the featured wearable's rules would suppress `candidate`.
fn suppressed_by_featured(
    featured: &WearableDefinition,
    featured_hides: &[HideableCategory],
    featured_replaces: &[HideableCategory],
    candidate: &WearableDefinition,
    shape: BodyShape,
) -> bool {
    let category = candidate.category();
    if category == featured.category() {
        return true;
    }
    if slot_categories(featured_hides).any(|c| c == category)
        || slot_categories(featured_replaces).any(|c| c == category)
    {
        return true;
    }
    if featured.category() == WearableCategory::Skin {
        if BODY_PART_CATEGORIES.contains(&category) {
            return true;
        }
        // A skin also suppresses anything that would fight it over the head.
        if let Some(rep) = candidate.representation_for(shape) {
            if names_head(candidate.hides_for(rep)) || names_head(candidate.replaces_for(rep)) {
                return true;
            }
        }
    }
    false
}

/// Resolves the final slot assignment for one body shape.
///
/// `candidates` must already be ordered lowest-precedence first (profile
/// wearables, then explicit overrides); the featured item, when present
/// and not an emote, is appended last so it always wins its own slot.
/// Emote candidates never occupy slots. Candidates without a
/// representation for `shape` are inert: they neither occupy a slot nor
/// exercise hide/replace rules.
pub fn resolve_slots(
    shape: BodyShape,
    candidates: &[CatalogItem],
    featured: Option<&CatalogItem>,
) -> SlotMap {
    // 1. Emotes out.
    let mut wearables: Vec<&WearableDefinition> =
        candidates.iter().filter_map(|c| c.as_wearable()).collect();

    // 2. Featured wearable pre-filters the list, then goes last.
    if let Some(featured) = featured.and_then(|f| f.as_wearable()) {
        if let Some(rep) = featured.representation_for(shape) {
            let hides = featured.hides_for(rep).to_vec();
            let replaces = featured.replaces_for(rep).to_vec();
            wearables.retain(|candidate| {
                !suppressed_by_featured(featured, &hides, &replaces, candidate, shape)
            });
        }
        wearables.push(featured);
    }

    // 3. Assign slots in order; later candidates overwrite earlier ones.
    let mut slots = SlotMap::new();
    for wearable in &wearables {
        if wearable.representation_for(shape).is_some() {
            slots.set(wearable.category(), (*wearable).clone());
        }
    }

    // 4. Hide/replace walk over the assigned wearables, newest first. A
    // wearable whose own category has already been removed loses its
    // hide/replace power.
    let assigned: Vec<WearableDefinition> = slots.wearables().into_iter().cloned().collect();
    let mut removed: HashSet<WearableCategory> = HashSet::new();
    for wearable in assigned.iter().rev() {
        let category = wearable.category();
        if removed.contains(&category) {
            continue;
        }
        let Some(rep) = wearable.representation_for(shape) else {
            continue;
        };
        let to_remove: HashSet<WearableCategory> = slot_categories(wearable.hides_for(rep))
            .chain(slot_categories(wearable.replaces_for(rep)))
            .filter(|c| *c != category)
            .collect();
        for target in to_remove {
            slots.delete(target);
            removed.insert(target);
        }
    }

    // 5. A skin wipes every body-part category, whatever survived above.
    if slots.contains(WearableCategory::Skin) {
        for category in BODY_PART_CATEGORIES {
            slots.delete(category);
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearview_common::models::wearable::{EmoteData, EmoteDefinition, Representation, WearableData};

    fn make_wearable(
        id: &str,
        category: WearableCategory,
        hides: Vec<HideableCategory>,
        replaces: Vec<HideableCategory>,
        shapes: Vec<BodyShape>,
    ) -> CatalogItem {
        CatalogItem::Wearable(WearableDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            thumbnail: None,
            rarity: None,
            data: WearableData {
                category,
                hides,
                replaces,
                representations: vec![Representation {
                    body_shapes: shapes,
                    main_file: format!("{id}.glb"),
                    contents: vec![],
                    override_hides: vec![],
                    override_replaces: vec![],
                }],
                tags: vec![],
            },
        })
    }

    fn make_emote(id: &str) -> CatalogItem {
        CatalogItem::Emote(EmoteDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            thumbnail: None,
            rarity: None,
            emote_data: EmoteData {
                loops: false,
                category: None,
                representations: vec![],
                tags: vec![],
            },
        })
    }

    #[test]
    fn test_empty_candidates_yield_empty_map() {
        let slots = resolve_slots(BodyShape::Male, &[], None);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_later_candidate_wins_category() {
        let a = make_wearable("urn:a", WearableCategory::UpperBody, vec![], vec![], vec![BodyShape::Male]);
        let b = make_wearable(
            "urn:b",
            WearableCategory::UpperBody,
            vec![HideableCategory::Wearable(WearableCategory::LowerBody)],
            vec![],
            vec![BodyShape::Male],
        );
        let slots = resolve_slots(BodyShape::Male, &[a, b], None);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.get(WearableCategory::UpperBody).unwrap().id, "urn:b");
        assert!(!slots.contains(WearableCategory::LowerBody));
    }

    #[test]
    fn test_unrepresented_candidate_is_inert() {
        // Female-only wearable in a male resolution: it must not occupy a
        // slot and its hides list must not fire.
        let ghost = make_wearable(
            "urn:ghost",
            WearableCategory::Hat,
            vec![HideableCategory::Wearable(WearableCategory::Hair)],
            vec![],
            vec![BodyShape::Female],
        );
        let hair = make_wearable("urn:hair", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let slots = resolve_slots(BodyShape::Male, &[ghost, hair], None);
        assert_eq!(slots.len(), 1);
        assert!(slots.contains(WearableCategory::Hair));
        assert!(!slots.contains(WearableCategory::Hat));
    }

    #[test]
    fn test_emote_candidates_are_dropped() {
        let emote = make_emote("urn:emote");
        let hair = make_wearable("urn:hair", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let slots = resolve_slots(BodyShape::Male, &[emote, hair], None);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_first_remover_wins() {
        // hat hides eyebrows; top_head (inserted later) hides hat. The
        // top_head acts first in the reverse walk, removing hat; the hat
        // then loses its power and eyebrows survive.
        let eyebrows =
            make_wearable("urn:brows", WearableCategory::Eyebrows, vec![], vec![], vec![BodyShape::Male]);
        let hat = make_wearable(
            "urn:hat",
            WearableCategory::Hat,
            vec![HideableCategory::Wearable(WearableCategory::Eyebrows)],
            vec![],
            vec![BodyShape::Male],
        );
        let top_head = make_wearable(
            "urn:top",
            WearableCategory::TopHead,
            vec![HideableCategory::Wearable(WearableCategory::Hat)],
            vec![],
            vec![BodyShape::Male],
        );
        let slots = resolve_slots(BodyShape::Male, &[eyebrows, hat, top_head], None);
        assert!(slots.contains(WearableCategory::Eyebrows));
        assert!(!slots.contains(WearableCategory::Hat));
        assert!(slots.contains(WearableCategory::TopHead));
    }

    #[test]
    fn test_own_category_never_self_removed() {
        let hat = make_wearable(
            "urn:hat",
            WearableCategory::Hat,
            vec![HideableCategory::Wearable(WearableCategory::Hat)],
            vec![],
            vec![BodyShape::Male],
        );
        let slots = resolve_slots(BodyShape::Male, &[hat], None);
        assert!(slots.contains(WearableCategory::Hat));
    }

    #[test]
    fn test_skin_wipes_body_parts_in_any_order() {
        let skin = make_wearable("urn:skin", WearableCategory::Skin, vec![], vec![], vec![BodyShape::Male]);
        let hair = make_wearable("urn:hair", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let feet = make_wearable("urn:feet", WearableCategory::Feet, vec![], vec![], vec![BodyShape::Male]);
        let hat = make_wearable("urn:hat", WearableCategory::Hat, vec![], vec![], vec![BodyShape::Male]);

        for candidates in [
            vec![skin.clone(), hair.clone(), feet.clone(), hat.clone()],
            vec![hair.clone(), feet.clone(), skin.clone(), hat.clone()],
            vec![hat.clone(), hair.clone(), feet.clone(), skin.clone()],
        ] {
            let slots = resolve_slots(BodyShape::Male, &candidates, None);
            for category in BODY_PART_CATEGORIES {
                assert!(!slots.contains(category), "{category} should be wiped by skin");
            }
            assert!(slots.contains(WearableCategory::Skin));
            assert!(slots.contains(WearableCategory::Hat));
        }
    }

    #[test]
    fn test_featured_wins_its_slot_and_prefilters() {
        let profile_hat =
            make_wearable("urn:profile-hat", WearableCategory::Hat, vec![], vec![], vec![BodyShape::Male]);
        let mask = make_wearable("urn:mask", WearableCategory::Mask, vec![], vec![], vec![BodyShape::Male]);
        let featured = make_wearable(
            "urn:featured-hat",
            WearableCategory::Hat,
            vec![HideableCategory::Wearable(WearableCategory::Mask)],
            vec![],
            vec![BodyShape::Male],
        );
        let slots = resolve_slots(BodyShape::Male, &[profile_hat, mask], Some(&featured));
        assert_eq!(slots.get(WearableCategory::Hat).unwrap().id, "urn:featured-hat");
        assert!(!slots.contains(WearableCategory::Mask));
    }

    #[test]
    fn test_featured_skin_suppresses_head_hiders() {
        let helmet = make_wearable(
            "urn:helmet",
            WearableCategory::Helmet,
            vec![HideableCategory::Head],
            vec![],
            vec![BodyShape::Male],
        );
        let hair = make_wearable("urn:hair", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let featured_skin =
            make_wearable("urn:skin", WearableCategory::Skin, vec![], vec![], vec![BodyShape::Male]);
        let slots = resolve_slots(BodyShape::Male, &[helmet, hair], Some(&featured_skin));
        // The helmet hides the head, so the featured skin drops it up front;
        // hair goes in the skin wipe.
        assert!(!slots.contains(WearableCategory::Helmet));
        assert!(!slots.contains(WearableCategory::Hair));
        assert!(slots.contains(WearableCategory::Skin));
    }

    #[test]
    fn test_featured_emote_occupies_nothing() {
        let hair = make_wearable("urn:hair", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let emote = make_emote("urn:emote");
        let slots = resolve_slots(BodyShape::Male, &[hair], Some(&emote));
        assert_eq!(slots.len(), 1);
        assert!(slots.contains(WearableCategory::Hair));
    }

    #[test]
    fn test_insertion_order_preserved_on_overwrite() {
        let mut slots = SlotMap::new();
        let first = make_wearable("urn:1", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        let second = make_wearable("urn:2", WearableCategory::Feet, vec![], vec![], vec![BodyShape::Male]);
        let third = make_wearable("urn:3", WearableCategory::Hair, vec![], vec![], vec![BodyShape::Male]);
        slots.set(WearableCategory::Hair, first.as_wearable().unwrap().clone());
        slots.set(WearableCategory::Feet, second.as_wearable().unwrap().clone());
        slots.set(WearableCategory::Hair, third.as_wearable().unwrap().clone());

        let order: Vec<WearableCategory> = slots.categories().collect();
        assert_eq!(order, vec![WearableCategory::Hair, WearableCategory::Feet]);
        assert_eq!(slots.get(WearableCategory::Hair).unwrap().id, "urn:3");
    }
}
