//! Category hierarchy resolution.
//!
//! Categories are stored flat, each optionally pointing at a parent. Nothing
//! at the data layer prevents dangling or cyclic parent references, so every
//! read goes through [`resolve_hierarchy`], which links each category to its
//! parent, computes its depth and never fails on malformed data:
//!
//! - a dangling `parent_id` degrades the category to a root ([`ParentLink::DanglingParent`])
//! - a category on a parent cycle degrades to a root ([`ParentLink::CyclicParent`])
//! - categories hanging below a cycle count hops to the first cycle member
//!
//! Anomalies are reported in [`HierarchyDiagnostics`]. [`compute_level`] is the
//! strict counterpart and reports a cycle as [`HierarchyError::CycleDetected`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::categories::models::Category;

/// Resolved parent projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParentRef {
    pub id: Uuid,
    pub name: String,
}

/// How a category's `parent_id` resolved against the full category set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// No parent
    Root,
    /// Parent exists and is not a descendant of the category
    ChildOf(ParentRef),
    /// `parent_id` points at no existing category
    DanglingParent(Uuid),
    /// The category is its own ancestor
    CyclicParent(Uuid),
}

impl ParentLink {
    /// Parent as shown to the display layer: only a real parent counts
    pub fn parent(&self) -> Option<&ParentRef> {
        match self {
            ParentLink::ChildOf(parent) => Some(parent),
            _ => None,
        }
    }
}

/// A category together with its resolved parent and depth
#[derive(Debug, Clone)]
pub struct CategoryWithLevel {
    pub category: Category,
    pub link: ParentLink,
    pub level: u32,
}

impl CategoryWithLevel {
    pub fn parent(&self) -> Option<&ParentRef> {
        self.link.parent()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HierarchyDiagnostics {
    /// Categories whose parent does not exist
    pub dangling: Vec<Uuid>,
    /// Categories that are their own ancestor
    pub cyclic: Vec<Uuid>,
}

impl HierarchyDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.cyclic.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedHierarchy {
    pub categories: Vec<CategoryWithLevel>,
    pub diagnostics: HierarchyDiagnostics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// By level, then display order, then name
    #[default]
    #[serde(rename = "level", alias = "level_grouped")]
    LevelGrouped,
    /// Pre-order traversal: each parent directly followed by its descendants
    Tree,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Category {id} is part of a parent cycle")]
    CycleDetected { id: Uuid, cycle: Vec<Uuid> },

    #[error("A category cannot be its own parent")]
    SelfParent(Uuid),

    #[error("Parent category {0} not found")]
    UnknownParent(Uuid),

    #[error("Category {parent} is a descendant of {id} and cannot be its parent")]
    WouldCreateCycle { id: Uuid, parent: Uuid },
}

impl From<HierarchyError> for AppError {
    fn from(e: HierarchyError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

type Index<'a> = HashMap<Uuid, &'a Category>;

fn index(all: &[Category]) -> Index<'_> {
    all.iter().map(|c| (c.id, c)).collect()
}

/// Resolve the parent of one category against the full set
pub fn resolve_parent(category: &Category, all: &[Category]) -> ParentLink {
    link_with(category, &index(all))
}

fn link_with(category: &Category, index: &Index<'_>) -> ParentLink {
    let Some(parent_id) = category.parent_id else {
        return ParentLink::Root;
    };

    let Some(parent) = index.get(&parent_id).copied() else {
        return ParentLink::DanglingParent(parent_id);
    };

    if has_ancestor(parent, category.id, index) {
        return ParentLink::CyclicParent(parent_id);
    }

    ParentLink::ChildOf(ParentRef {
        id: parent.id,
        name: parent.name.clone(),
    })
}

/// Whether `target` is `start` or one of its ancestors
fn has_ancestor(start: &Category, target: Uuid, index: &Index<'_>) -> bool {
    let mut seen = HashSet::new();
    let mut current = start;
    loop {
        if current.id == target {
            return true;
        }
        if !seen.insert(current.id) {
            // Looped without meeting target
            return false;
        }
        match current.parent_id.and_then(|id| index.get(&id).copied()) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Number of ancestor hops from `category` to its root.
///
/// A missing or dangling parent ends the walk. Revisiting a category means
/// the ancestor chain loops, reported with the looping ids in walk order.
pub fn compute_level(category: &Category, all: &[Category]) -> Result<u32, HierarchyError> {
    let index = index(all);
    let mut path = vec![category.id];
    let mut current = category;

    while let Some(parent) = current.parent_id.and_then(|id| index.get(&id).copied()) {
        if let Some(pos) = path.iter().position(|id| *id == parent.id) {
            return Err(HierarchyError::CycleDetected {
                id: category.id,
                cycle: path[pos..].to_vec(),
            });
        }
        path.push(parent.id);
        current = parent;
    }

    Ok((path.len() - 1) as u32)
}

/// Ids of every category that sits on a parent cycle
fn cycle_members(all: &[Category], index: &Index<'_>) -> HashSet<Uuid> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InWalk(usize),
        Done,
    }

    let mut marks: HashMap<Uuid, Mark> = HashMap::with_capacity(all.len());
    let mut members = HashSet::new();

    for (walk, start) in all.iter().enumerate() {
        let mut path = Vec::new();
        let mut current = Some(start);

        while let Some(node) = current {
            match marks.get(&node.id) {
                Some(Mark::InWalk(w)) if *w == walk => {
                    // Closed a loop within this walk
                    if let Some(pos) = path.iter().position(|id| *id == node.id) {
                        members.extend(path[pos..].iter().copied());
                    }
                    break;
                }
                Some(_) => break,
                None => {
                    marks.insert(node.id, Mark::InWalk(walk));
                    path.push(node.id);
                    current = node.parent_id.and_then(|id| index.get(&id).copied());
                }
            }
        }

        for id in path {
            marks.insert(id, Mark::Done);
        }
    }

    members
}

/// Link every category to its parent and compute its depth.
///
/// Never fails: dangling and cyclic references degrade to roots and are
/// listed in the diagnostics. Output keeps input order and cardinality.
pub fn resolve_hierarchy(all: &[Category]) -> ResolvedHierarchy {
    let index = index(all);
    let cyclic = cycle_members(all, &index);
    let mut levels: HashMap<Uuid, u32> = HashMap::with_capacity(all.len());
    let mut diagnostics = HierarchyDiagnostics::default();

    let categories = all
        .iter()
        .map(|category| {
            let link = if cyclic.contains(&category.id) {
                // parent_id is necessarily set for a cycle member
                ParentLink::CyclicParent(category.parent_id.unwrap_or(category.id))
            } else {
                link_with(category, &index)
            };

            match &link {
                ParentLink::DanglingParent(_) => diagnostics.dangling.push(category.id),
                ParentLink::CyclicParent(_) => diagnostics.cyclic.push(category.id),
                _ => {}
            }

            let level = memoized_level(category, &index, &cyclic, &mut levels);

            CategoryWithLevel {
                category: category.clone(),
                link,
                level,
            }
        })
        .collect();

    ResolvedHierarchy {
        categories,
        diagnostics,
    }
}

/// Depth where roots, dangling children and cycle members sit at level 0
fn memoized_level(
    category: &Category,
    index: &Index<'_>,
    cyclic: &HashSet<Uuid>,
    levels: &mut HashMap<Uuid, u32>,
) -> u32 {
    let mut path: Vec<Uuid> = Vec::new();
    let mut current = category;

    let base = loop {
        if let Some(level) = levels.get(&current.id) {
            break *level;
        }
        if cyclic.contains(&current.id) {
            break 0;
        }
        match current.parent_id.and_then(|id| index.get(&id).copied()) {
            Some(parent) => {
                path.push(current.id);
                current = parent;
            }
            None => break 0,
        }
    };

    levels.insert(current.id, base);
    for (hops, id) in path.iter().rev().enumerate() {
        levels.insert(*id, base + hops as u32 + 1);
    }

    levels.get(&category.id).copied().unwrap_or(base)
}

/// Case-insensitive; on a case-only tie lowercase sorts first ("mirrors" < "Mirrors")
fn name_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn sibling_cmp(a: &Category, b: &Category) -> Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| name_cmp(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Level-grouped display comparator: level, display order, name, id
pub fn display_cmp(a: &CategoryWithLevel, b: &CategoryWithLevel) -> Ordering {
    a.level
        .cmp(&b.level)
        .then_with(|| sibling_cmp(&a.category, &b.category))
}

/// Order resolved categories for indented display
pub fn order_for_display(
    mut records: Vec<CategoryWithLevel>,
    order: DisplayOrder,
) -> Vec<CategoryWithLevel> {
    match order {
        DisplayOrder::LevelGrouped => {
            records.sort_by(display_cmp);
            records
        }
        DisplayOrder::Tree => tree_order(records),
    }
}

fn tree_order(records: Vec<CategoryWithLevel>) -> Vec<CategoryWithLevel> {
    let mut roots: Vec<usize> = Vec::new();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();

    for (i, record) in records.iter().enumerate() {
        match record.parent() {
            Some(parent) => children.entry(parent.id).or_default().push(i),
            None => roots.push(i),
        }
    }

    let by_sibling_order = |a: &usize, b: &usize| sibling_cmp(&records[*a].category, &records[*b].category);
    roots.sort_by(by_sibling_order);
    for siblings in children.values_mut() {
        siblings.sort_by(by_sibling_order);
    }

    let mut visit_order = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(i) = stack.pop() {
        visit_order.push(i);
        if let Some(kids) = children.get(&records[i].category.id) {
            stack.extend(kids.iter().rev().copied());
        }
    }

    let mut slots: Vec<Option<CategoryWithLevel>> = records.into_iter().map(Some).collect();
    let mut ordered: Vec<CategoryWithLevel> = visit_order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    // Records unreachable from a root (duplicate ids) keep their input order at the end
    ordered.extend(slots.into_iter().flatten());
    ordered
}

/// Check that `id` may be re-parented under `new_parent`
pub fn ensure_parent_assignable(
    all: &[Category],
    id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<(), HierarchyError> {
    let Some(parent_id) = new_parent else {
        return Ok(());
    };

    if parent_id == id {
        return Err(HierarchyError::SelfParent(id));
    }

    let index = index(all);
    let parent = index
        .get(&parent_id)
        .copied()
        .ok_or(HierarchyError::UnknownParent(parent_id))?;

    if has_ancestor(parent, id, &index) {
        return Err(HierarchyError::WouldCreateCycle {
            id,
            parent: parent_id,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn cat(n: u128, name: &str, parent: Option<u128>, display_order: i32) -> Category {
        Category {
            id: id(n),
            parent_id: parent.map(id),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
            image_url: None,
            display_order,
            is_active: true,
            meta_title: None,
            meta_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn names(records: &[CategoryWithLevel]) -> Vec<&str> {
        records.iter().map(|r| r.category.name.as_str()).collect()
    }

    fn level_of(resolved: &ResolvedHierarchy, n: u128) -> u32 {
        resolved
            .categories
            .iter()
            .find(|r| r.category.id == id(n))
            .map(|r| r.level)
            .unwrap()
    }

    fn scenario_a() -> Vec<Category> {
        vec![
            cat(3, "Single Vanities", Some(1), 0),
            cat(2, "Mirrors", None, 1),
            cat(1, "Vanities", None, 0),
        ]
    }

    #[test]
    fn test_scenario_a_levels_and_order() {
        let all = scenario_a();
        let resolved = resolve_hierarchy(&all);

        assert_eq!(level_of(&resolved, 1), 0);
        assert_eq!(level_of(&resolved, 2), 0);
        assert_eq!(level_of(&resolved, 3), 1);
        assert!(resolved.diagnostics.is_clean());

        let ordered = order_for_display(resolved.categories, DisplayOrder::LevelGrouped);
        assert_eq!(names(&ordered), vec!["Vanities", "Mirrors", "Single Vanities"]);
        assert_eq!(
            ordered[2].parent(),
            Some(&ParentRef {
                id: id(1),
                name: "Vanities".to_string()
            })
        );
    }

    #[test]
    fn test_scenario_a_tree_order_keeps_children_under_parent() {
        let resolved = resolve_hierarchy(&scenario_a());
        let ordered = order_for_display(resolved.categories, DisplayOrder::Tree);
        assert_eq!(names(&ordered), vec!["Vanities", "Single Vanities", "Mirrors"]);
    }

    #[test]
    fn test_scenario_b_dangling_parent() {
        let all = vec![cat(4, "Orphan", Some(999), 0)];

        assert_eq!(resolve_parent(&all[0], &all), ParentLink::DanglingParent(id(999)));
        assert_eq!(compute_level(&all[0], &all), Ok(0));

        let resolved = resolve_hierarchy(&all);
        let orphan = &resolved.categories[0];
        assert_eq!(orphan.level, 0);
        assert_eq!(orphan.parent(), None);
        assert_eq!(resolved.diagnostics.dangling, vec![id(4)]);
        assert!(resolved.diagnostics.cyclic.is_empty());
    }

    #[test]
    fn test_scenario_c_cycle_is_detected_not_looped() {
        let all = vec![cat(5, "Five", Some(6), 0), cat(6, "Six", Some(5), 0)];

        match compute_level(&all[0], &all) {
            Err(HierarchyError::CycleDetected { id: start, cycle }) => {
                assert_eq!(start, id(5));
                assert_eq!(cycle, vec![id(5), id(6)]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }

        let resolved = resolve_hierarchy(&all);
        for record in &resolved.categories {
            assert_eq!(record.level, 0);
            assert!(matches!(record.link, ParentLink::CyclicParent(_)));
            assert_eq!(record.parent(), None);
        }
        assert_eq!(resolved.diagnostics.cyclic, vec![id(5), id(6)]);

        let ordered = order_for_display(resolved.categories, DisplayOrder::Tree);
        assert_eq!(ordered.len(), 2);
    }

    #[test]
    fn test_self_parent_is_cyclic() {
        let all = vec![cat(7, "Loop", Some(7), 0)];
        assert_eq!(resolve_parent(&all[0], &all), ParentLink::CyclicParent(id(7)));
        assert!(compute_level(&all[0], &all).is_err());

        let resolved = resolve_hierarchy(&all);
        assert_eq!(resolved.categories[0].level, 0);
        assert_eq!(resolved.diagnostics.cyclic, vec![id(7)]);
    }

    #[test]
    fn test_nodes_below_a_cycle_count_hops_to_it() {
        let all = vec![
            cat(5, "Five", Some(6), 0),
            cat(6, "Six", Some(5), 0),
            cat(8, "Below", Some(5), 0),
            cat(9, "Further Below", Some(8), 0),
        ];

        assert!(compute_level(&all[2], &all).is_err());

        let resolved = resolve_hierarchy(&all);
        assert_eq!(level_of(&resolved, 8), 1);
        assert_eq!(level_of(&resolved, 9), 2);
        assert!(matches!(resolved.categories[2].link, ParentLink::ChildOf(_)));
        assert_eq!(resolved.diagnostics.cyclic, vec![id(5), id(6)]);

        let ordered = order_for_display(resolved.categories, DisplayOrder::Tree);
        assert_eq!(names(&ordered), vec!["Five", "Below", "Further Below", "Six"]);
    }

    #[test]
    fn test_level_is_one_plus_parent_level() {
        let all = vec![
            cat(1, "Root", None, 0),
            cat(2, "Child", Some(1), 0),
            cat(3, "Grandchild", Some(2), 0),
            cat(4, "Great Grandchild", Some(3), 0),
        ];
        let resolved = resolve_hierarchy(&all);

        for record in &resolved.categories {
            assert_eq!(Ok(record.level), compute_level(&record.category, &all));
            match record.parent() {
                None => assert_eq!(record.level, 0),
                Some(parent) => {
                    let parent_level = level_of(&resolved, parent.id.as_u128());
                    assert_eq!(record.level, parent_level + 1);
                }
            }
        }
        assert_eq!(level_of(&resolved, 4), 3);
    }

    #[test]
    fn test_empty_input() {
        let resolved = resolve_hierarchy(&[]);
        assert!(resolved.categories.is_empty());
        assert!(resolved.diagnostics.is_clean());
        assert!(order_for_display(resolved.categories, DisplayOrder::LevelGrouped).is_empty());
        assert!(order_for_display(Vec::new(), DisplayOrder::Tree).is_empty());
    }

    fn mixed() -> Vec<Category> {
        vec![
            cat(1, "Vanities", None, 0),
            cat(2, "mirrors", None, 0),
            cat(3, "Mirrors", None, 0),
            cat(4, "Lighting", None, 2),
            cat(5, "Double", Some(1), 1),
            cat(6, "Single", Some(1), 0),
            cat(7, "Round", Some(3), 0),
            cat(8, "Orphan", Some(999), 0),
            cat(9, "Wall", Some(4), 0),
        ]
    }

    #[test]
    fn test_level_grouped_order() {
        let resolved = resolve_hierarchy(&mixed());
        let ordered = order_for_display(resolved.categories, DisplayOrder::LevelGrouped);
        assert_eq!(
            names(&ordered),
            vec![
                "mirrors", "Mirrors", "Orphan", "Vanities", "Lighting", "Round", "Single",
                "Wall", "Double"
            ]
        );
    }

    #[test]
    fn test_tree_order() {
        let resolved = resolve_hierarchy(&mixed());
        let ordered = order_for_display(resolved.categories, DisplayOrder::Tree);
        assert_eq!(
            names(&ordered),
            vec![
                "mirrors", "Mirrors", "Round", "Orphan", "Vanities", "Single", "Double",
                "Lighting", "Wall"
            ]
        );
    }

    #[test]
    fn test_comparator_is_a_total_order() {
        let records = resolve_hierarchy(&mixed()).categories;

        for a in &records {
            assert_eq!(display_cmp(a, a), Ordering::Equal);
            for b in &records {
                assert_eq!(display_cmp(a, b), display_cmp(b, a).reverse());
                if a.category.id != b.category.id {
                    assert_ne!(display_cmp(a, b), Ordering::Equal);
                }
                for c in &records {
                    if display_cmp(a, b) == Ordering::Less && display_cmp(b, c) == Ordering::Less {
                        assert_eq!(display_cmp(a, c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sorting_is_idempotent() {
        for order in [DisplayOrder::LevelGrouped, DisplayOrder::Tree] {
            let once = order_for_display(resolve_hierarchy(&mixed()).categories, order);
            let first: Vec<Uuid> = once.iter().map(|r| r.category.id).collect();
            let twice = order_for_display(once, order);
            let second: Vec<Uuid> = twice.iter().map(|r| r.category.id).collect();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_output_is_independent_of_input_order() {
        let mut reversed = mixed();
        reversed.reverse();

        let a = order_for_display(resolve_hierarchy(&mixed()).categories, DisplayOrder::LevelGrouped);
        let b = order_for_display(resolve_hierarchy(&reversed).categories, DisplayOrder::LevelGrouped);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_ensure_parent_assignable() {
        let all = mixed();

        assert_eq!(ensure_parent_assignable(&all, id(6), None), Ok(()));
        assert_eq!(ensure_parent_assignable(&all, id(6), Some(id(3))), Ok(()));
        assert_eq!(
            ensure_parent_assignable(&all, id(1), Some(id(1))),
            Err(HierarchyError::SelfParent(id(1)))
        );
        assert_eq!(
            ensure_parent_assignable(&all, id(1), Some(id(6))),
            Err(HierarchyError::WouldCreateCycle {
                id: id(1),
                parent: id(6)
            })
        );
        assert_eq!(
            ensure_parent_assignable(&all, id(1), Some(id(404))),
            Err(HierarchyError::UnknownParent(id(404)))
        );
    }

    #[test]
    fn test_ensure_parent_assignable_terminates_on_existing_cycle() {
        let all = vec![
            cat(5, "Five", Some(6), 0),
            cat(6, "Six", Some(5), 0),
            cat(1, "Other", None, 0),
        ];
        assert_eq!(ensure_parent_assignable(&all, id(1), Some(id(5))), Ok(()));
    }
}
