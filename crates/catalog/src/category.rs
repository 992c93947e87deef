//! Product categories (a tree).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::input::check_length;
use pricelens_core::{CategoryId, DomainResult, Entity, FieldErrors, Input, RawInput};

use crate::slug::is_valid_slug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
    pub icon: Option<String>,
    pub sort_order: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Category {
    pub fn create(request: &CreateCategoryRequest, slug: String, now: DateTime<Utc>) -> Self {
        Self {
            id: CategoryId::new(),
            name: request.name.clone(),
            slug,
            parent_id: request.parent_id,
            icon: request.icon.clone(),
            sort_order: request.sort_order,
            active: request.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn apply(&mut self, request: &UpdateCategoryRequest, now: DateTime<Utc>) {
        if let Some(name) = &request.name {
            self.name = name.clone();
        }
        if let Some(slug) = &request.slug {
            self.slug = slug.clone();
        }
        if let Some(parent_id) = request.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(icon) = &request.icon {
            self.icon = icon.clone();
        }
        if let Some(sort_order) = request.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

/// A category with its descendants, for tree rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

fn sibling_order(a: &Category, b: &Category) -> std::cmp::Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Nest a flat category list. Categories whose parent is missing from the
/// list are treated as roots.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: Vec<CategoryId> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<CategoryId>, Vec<Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }
    attach(None, &mut by_parent)
}

fn attach(
    parent: Option<CategoryId>,
    by_parent: &mut HashMap<Option<CategoryId>, Vec<Category>>,
) -> Vec<CategoryNode> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    level.sort_by(sibling_order);
    level
        .into_iter()
        .map(|category| {
            let children = attach(Some(category.id), by_parent);
            CategoryNode { category, children }
        })
        .collect()
}

/// Whether making `new_parent` the parent of `id` would put `id` among its own
/// ancestors.
pub fn creates_cycle(categories: &[Category], id: CategoryId, new_parent: CategoryId) -> bool {
    let parents: HashMap<CategoryId, Option<CategoryId>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();
    let mut cursor = Some(new_parent);
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            // Stored data already contains a loop.
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

fn validate_name(errors: &mut FieldErrors, name: &str) {
    check_length(errors, "name", name, 2, 100);
}

fn validate_slug(errors: &mut FieldErrors, slug: &str) {
    if !is_valid_slug(slug) {
        errors.add("slug", "slug may only contain lowercase letters, digits and single dashes");
    }
}

fn validate_icon(errors: &mut FieldErrors, icon: &str) {
    if icon.chars().count() > 50 {
        errors.add("icon", "icon must not exceed 50 characters");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub icon: Option<String>,
    pub sort_order: u32,
    pub active: bool,
}

impl CreateCategoryRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let name = input.string("name");
        match &name {
            Some(n) => validate_name(&mut errors, n),
            None => errors.add("name", "name is required"),
        }

        let slug = input.string("slug");
        if let Some(s) = &slug {
            validate_slug(&mut errors, s);
        }

        let parent_id = input.parse::<CategoryId>("parent_id", &mut errors);

        let icon = input.string("icon");
        if let Some(i) = &icon {
            validate_icon(&mut errors, i);
        }

        let sort_order = input.u32("sort_order", &mut errors).unwrap_or(0);
        let active = input.bool("active", &mut errors).unwrap_or(true);

        errors.into_result()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            slug,
            parent_id,
            icon,
            sort_order,
            active,
        })
    }
}

/// Partial category update; `parent_id: Some(None)` moves the category to the
/// root level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub parent_id: Option<Option<CategoryId>>,
    pub icon: Option<Option<String>>,
    pub sort_order: Option<u32>,
    pub active: Option<bool>,
}

impl UpdateCategoryRequest {
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();
        let mut request = Self::default();

        if input.has("name") {
            match input.string("name") {
                Some(n) => {
                    validate_name(&mut errors, &n);
                    request.name = Some(n);
                }
                None => errors.add("name", "name cannot be empty"),
            }
        }

        if let Some(s) = input.string("slug") {
            validate_slug(&mut errors, &s);
            request.slug = Some(s);
        }

        if input.has("parent_id") {
            request.parent_id = Some(input.parse::<CategoryId>("parent_id", &mut errors));
        }

        if input.has("icon") {
            let icon = input.string("icon");
            if let Some(i) = &icon {
                validate_icon(&mut errors, i);
            }
            request.icon = Some(icon);
        }

        request.sort_order = input.u32("sort_order", &mut errors);
        request.active = input.bool("active", &mut errors);

        errors.into_result()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(name: &str, parent: Option<CategoryId>, sort_order: u32) -> Category {
        let req = CreateCategoryRequest {
            name: name.to_string(),
            slug: None,
            parent_id: parent,
            icon: None,
            sort_order,
            active: true,
        };
        Category::create(&req, crate::slug::slugify(name), Utc::now())
    }

    #[test]
    fn tree_nests_and_orders_siblings() {
        let elektronik = category("Elektronik", None, 1);
        let fashion = category("Fashion", None, 0);
        let hp = category("Handphone", Some(elektronik.id), 2);
        let laptop = category("Laptop", Some(elektronik.id), 1);
        let gaming = category("Laptop Gaming", Some(laptop.id), 0);

        let tree = build_tree(vec![hp, gaming, elektronik, laptop, fashion]);
        let roots: Vec<_> = tree.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(roots, vec!["Fashion", "Elektronik"]);

        let children: Vec<_> = tree[1].children.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(children, vec!["Laptop", "Handphone"]);
        assert_eq!(tree[1].children[0].children[0].category.name, "Laptop Gaming");
    }

    #[test]
    fn orphans_become_roots() {
        let orphan = category("Yatim", Some(CategoryId::new()), 0);
        let tree = build_tree(vec![orphan]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn cycle_detection() {
        let a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        let c = category("C", Some(b.id), 0);
        let all = vec![a.clone(), b.clone(), c.clone()];

        assert!(creates_cycle(&all, a.id, c.id));
        assert!(creates_cycle(&all, a.id, a.id));
        assert!(!creates_cycle(&all, c.id, a.id));
    }

    #[test]
    fn create_request_validation() {
        let raw = json!({"name": "X", "slug": "Bad Slug", "sort_order": "-1"});
        let err = CreateCategoryRequest::from_request(raw.as_object().unwrap()).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("slug"));
        assert!(fields.contains("sort_order"));

        let raw = json!({"name": "Elektronik"});
        let req = CreateCategoryRequest::from_request(raw.as_object().unwrap()).unwrap();
        assert!(req.active);
        assert_eq!(req.sort_order, 0);
    }

    #[test]
    fn update_can_move_to_root() {
        let raw = json!({"parent_id": null, "active": "off"});
        let req = UpdateCategoryRequest::from_request(raw.as_object().unwrap()).unwrap();
        assert_eq!(req.parent_id, Some(None));
        assert_eq!(req.active, Some(false));
        assert!(req.name.is_none());
    }
}
